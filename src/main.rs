use anyhow::{Context, Result};
use landscapes::config::Config;
use landscapes::export;
use landscapes::render::{
    CLEAR_COLOR, FrameSetup, Light, OrbitCamera, Projection, Renderer, SoftwareRenderer,
};
use landscapes::{PerlinSource, build, generate};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,landscapes=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    // Optional JSON config as the only argument; defaults otherwise.
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("loading configuration")?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let noise = PerlinSource::new(seed);
    tracing::info!(seed, preset = %config.terrain.preset, "starting terrain run");

    // ── Synthesis ─────────────────────────────────────────────────────────────
    let terrain = &config.terrain;
    let params = terrain.generation_params();
    let field = generate(terrain.width, terrain.depth, terrain.grid_size, &params, &noise)
        .context("generating height field")?;
    let mapper = terrain.color_mapper()?;
    let mesh = build(&field, &mapper, &noise);

    let dir = config.output.dir.join(seed.to_string());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    // ── Static exports ────────────────────────────────────────────────────────
    export::export_preview(&field, &mapper, &noise, &dir.join("preview.png"))
        .context("writing preview")?;

    let meta = [
        ("Seed", noise.seed().to_string()),
        (
            "Grid",
            format!("{} x {} @ {}", field.width(), field.depth(), field.grid_size()),
        ),
        ("Preset", terrain.preset.to_string()),
        ("Blend", params.blend.to_string()),
        (
            "Height",
            format!("{:.0} - {:.0}", field.min_height(), field.max_height()),
        ),
        ("Vertices", mesh.vertex_count().to_string()),
    ];
    export::export_legend(&field, mapper.palette(), &meta, &dir.join("legend.png"))
        .context("writing legend")?;

    // ── Orbit frames ──────────────────────────────────────────────────────────
    let viewport = &config.viewport;
    let mut renderer = SoftwareRenderer::new(viewport.width, viewport.height);
    let projection = Projection {
        fov: viewport.fov_degrees,
        aspect: renderer.aspect(),
        near: viewport.near,
        far: viewport.far,
    }
    .matrix();

    let cam = &config.camera;
    let mut camera = OrbitCamera::framing(
        &field,
        cam.target_height_fraction,
        cam.distance,
        cam.tilt_degrees,
        cam.degrees_per_frame,
    );

    let strip = mesh.strip();
    for frame in 0..config.output.frames {
        let setup = FrameSetup {
            view: camera.view(),
            projection,
            light: Light::default(),
            clear_color: CLEAR_COLOR,
            polygon_mode: viewport.polygon_mode,
        };
        renderer.begin_frame(&setup);
        renderer.draw_strip(&strip)?;
        let img = renderer.end_frame()?;
        export::save(&img, &dir.join(format!("frame_{frame:03}.png")))
            .with_context(|| format!("writing frame {frame}"))?;
        tracing::debug!(frame, rotation = camera.rotation, "frame rendered");

        camera.advance(config.output.frame_stride);
    }

    tracing::info!("terrain rendered → {}/", dir.display());
    Ok(())
}
