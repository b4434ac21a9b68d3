use landscapes::config::Config;
use landscapes::mesh::strip_len;
use landscapes::render::{
    CLEAR_COLOR, FrameSetup, Light, OrbitCamera, PolygonMode, Projection, Renderer,
    SoftwareRenderer,
};
use landscapes::{ColorMapper, GenerationParams, Mesh, PerlinSource, build, generate};

fn small_island(seed: u32) -> (landscapes::HeightField, Mesh) {
    let noise = PerlinSource::new(seed);
    let field = generate(32, 24, 16.0, &GenerationParams::island(), &noise).unwrap();
    let mesh = build(&field, &ColorMapper::default(), &noise);
    (field, mesh)
}

fn render(field: &landscapes::HeightField, mesh: &Mesh, mode: PolygonMode) -> image::RgbImage {
    let mut renderer = SoftwareRenderer::new(96, 72);
    let camera = OrbitCamera::framing(field, 0.15, 2000.0, 30.0, 0.125);
    let setup = FrameSetup {
        view: camera.view(),
        projection: Projection {
            fov: 60.0,
            aspect: renderer.aspect(),
            near: 1.0,
            far: 4096.0,
        }
        .matrix(),
        light: Light::default(),
        clear_color: CLEAR_COLOR,
        polygon_mode: mode,
    };
    renderer.begin_frame(&setup);
    renderer.draw_strip(&mesh.strip()).unwrap();
    renderer.end_frame().unwrap()
}

#[test]
fn island_pipeline_produces_a_consistent_strip() {
    let (field, mesh) = small_island(2024);
    assert_eq!(field.heights().len(), 32 * 24);
    assert_eq!(mesh.vertex_count(), strip_len(32, 24));
    assert!(field.min_height() >= 120.0);
    assert!(mesh.normals().iter().all(|n| n[1] >= 0.0));
    assert!(
        mesh.colors()
            .iter()
            .flatten()
            .all(|c| (0.0..=1.0).contains(c))
    );
}

#[test]
fn same_seed_same_terrain() {
    let (a_field, a_mesh) = small_island(5);
    let (b_field, b_mesh) = small_island(5);
    assert_eq!(a_field, b_field);
    assert_eq!(a_mesh, b_mesh);
}

#[test]
fn rendered_frame_shows_terrain() {
    let (field, mesh) = small_island(11);
    let clear = CLEAR_COLOR.map(|c| (c * 255.0).round() as u8);
    for mode in [PolygonMode::Fill, PolygonMode::Line] {
        let img = render(&field, &mesh, mode);
        let drawn = img.pixels().filter(|px| px.0 != clear).count();
        assert!(drawn > 0, "{mode:?} frame is empty");
    }
}

#[test]
fn rendering_is_deterministic() {
    let (field, mesh) = small_island(77);
    let a = render(&field, &mesh, PolygonMode::Fill);
    let b = render(&field, &mesh, PolygonMode::Fill);
    assert_eq!(a.as_raw(), b.as_raw());
}

#[test]
fn default_config_drives_the_pipeline() {
    let mut config = Config::default();
    config.terrain.width = 12;
    config.terrain.depth = 10;
    config.validate().unwrap();

    let noise = PerlinSource::new(1);
    let t = &config.terrain;
    let field = generate(t.width, t.depth, t.grid_size, &t.generation_params(), &noise).unwrap();
    let mesh = build(&field, &t.color_mapper().unwrap(), &noise);
    assert_eq!(mesh.vertex_count(), strip_len(12, 10));
}
