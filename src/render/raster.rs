/// CPU rasterizer for terrain strips.
///
/// Vertices are lit per vertex and colours interpolated across each triangle
/// (Gouraud), with a less-or-equal depth test.
use super::{FrameSetup, PolygonMode, RenderError, Renderer, validate_strip};
use crate::mesh::StripArrays;
use glam::{Mat4, Vec3, Vec4Swizzles};
use image::{Rgb, RgbImage};

/// A vertex after projection to the viewport.
#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    x: f32,
    y: f32,
    /// NDC depth in `[-1, 1]`.
    z: f32,
    color: [f32; 3],
}

pub struct SoftwareRenderer {
    width: u32,
    height: u32,
    color: Vec<[f32; 3]>,
    depth: Vec<f32>,
    frame: Option<FrameSetup>,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![[0.0; 3]; n],
            depth: vec![f32::INFINITY; n],
            frame: None,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Transforms and lights one vertex.  `None` when it sits in front of the
    /// near plane or behind the eye.
    fn project(
        &self,
        view_proj: Mat4,
        normal_matrix: Mat4,
        setup: &FrameSetup,
        position: Vec3,
        normal: Vec3,
        color: [f32; 3],
    ) -> Option<ScreenVertex> {
        let clip = view_proj * position.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if ndc.z < -1.0 {
            return None;
        }
        let eye_normal = normal_matrix.transform_vector3(normal).normalize_or_zero();
        Some(ScreenVertex {
            x: (ndc.x + 1.0) * 0.5 * self.width as f32,
            y: (1.0 - ndc.y) * 0.5 * self.height as f32,
            z: ndc.z,
            color: setup.light.shade(color, eye_normal),
        })
    }

    /// Depth-tested fragment write.
    fn plot(&mut self, x: i64, y: i64, z: f32, color: [f32; 3]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        if !(-1.0..=1.0).contains(&z) {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        if z <= self.depth[idx] {
            self.depth[idx] = z;
            self.color[idx] = color;
        }
    }

    fn fill_triangle(&mut self, a: ScreenVertex, b: ScreenVertex, c: ScreenVertex) {
        let area = edge(a.x, a.y, b.x, b.y, c.x, c.y);
        if area == 0.0 {
            return;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as i64;
        let max_x = a.x.max(b.x).max(c.x).ceil().min(self.width as f32 - 1.0) as i64;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as i64;
        let max_y = a.y.max(b.y).max(c.y).ceil().min(self.height as f32 - 1.0) as i64;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let (sx, sy) = (px as f32 + 0.5, py as f32 + 0.5);
                let w0 = edge(b.x, b.y, c.x, c.y, sx, sy) / area;
                let w1 = edge(c.x, c.y, a.x, a.y, sx, sy) / area;
                let w2 = edge(a.x, a.y, b.x, b.y, sx, sy) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let z = a.z * w0 + b.z * w1 + c.z * w2;
                let color = std::array::from_fn(|i| {
                    a.color[i] * w0 + b.color[i] * w1 + c.color[i] * w2
                });
                self.plot(px, py, z, color);
            }
        }
    }

    fn draw_line(&mut self, a: ScreenVertex, b: ScreenVertex) {
        let span = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0) as usize;
        // Lines reaching far off-screen are sampled more coarsely.
        let steps = span.min(4 * (self.width + self.height) as usize);
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            let z = a.z + (b.z - a.z) * t;
            let color = std::array::from_fn(|i| a.color[i] + (b.color[i] - a.color[i]) * t);
            self.plot(x.floor() as i64, y.floor() as i64, z, color);
        }
    }
}

/// Twice the signed area of triangle `(a, b, p)`.
#[inline]
fn edge(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> f32 {
    (bx - ax) * (py - ay) - (by - ay) * (px - ax)
}

#[inline]
fn triple(slice: &[f32], i: usize) -> [f32; 3] {
    [slice[i * 3], slice[i * 3 + 1], slice[i * 3 + 2]]
}

impl Renderer for SoftwareRenderer {
    fn begin_frame(&mut self, setup: &FrameSetup) {
        self.color.fill(setup.clear_color);
        self.depth.fill(f32::INFINITY);
        self.frame = Some(*setup);
    }

    fn draw_strip(&mut self, strip: &StripArrays<'_>) -> Result<(), RenderError> {
        let setup = self.frame.ok_or(RenderError::NoActiveFrame)?;
        validate_strip(strip)?;

        let view_proj = setup.projection * setup.view;
        // Terrain transforms are rigid, so the view matrix itself carries normals.
        let normal_matrix = setup.view;

        let projected: Vec<Option<ScreenVertex>> = (0..strip.count)
            .map(|i| {
                self.project(
                    view_proj,
                    normal_matrix,
                    &setup,
                    Vec3::from_array(triple(strip.positions, i)),
                    Vec3::from_array(triple(strip.normals, i)),
                    triple(strip.colors, i),
                )
            })
            .collect();

        for tri in projected.windows(3) {
            let (Some(a), Some(b), Some(c)) = (tri[0], tri[1], tri[2]) else {
                continue;
            };
            match setup.polygon_mode {
                PolygonMode::Fill => self.fill_triangle(a, b, c),
                PolygonMode::Line => {
                    self.draw_line(a, b);
                    self.draw_line(b, c);
                    self.draw_line(c, a);
                }
            }
        }

        tracing::trace!(vertices = strip.count, "strip drawn");
        Ok(())
    }

    fn end_frame(&mut self) -> Result<RgbImage, RenderError> {
        if self.frame.take().is_none() {
            return Err(RenderError::NoActiveFrame);
        }
        let mut img = RgbImage::new(self.width, self.height);
        for (i, px) in img.pixels_mut().enumerate() {
            *px = Rgb(self.color[i].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
        }
        Ok(img)
    }
}
