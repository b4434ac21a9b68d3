/// Frame rendering: camera, projection, lighting and strip rasterization.
///
/// The terrain pipeline hands a renderer three flat arrays and a vertex count;
/// everything about how a frame is set up lives here.
pub mod camera;
pub mod raster;

pub use camera::{OrbitCamera, Projection};
pub use raster::SoftwareRenderer;

use crate::mesh::StripArrays;
use glam::{Mat4, Vec3};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("strip arrays disagree with vertex count {count}: {positions} position, {normals} normal and {colors} colour floats")]
    MismatchedArrays {
        count: usize,
        positions: usize,
        normals: usize,
        colors: usize,
    },

    #[error("draw issued outside begin_frame/end_frame")]
    NoActiveFrame,
}

/// How strip triangles are rasterized.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolygonMode {
    #[default]
    Fill,
    /// Triangle edges only.
    Line,
}

/// Single directional light, fixed relative to the viewer.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Light {
    /// Direction towards the light, in eye space.
    pub direction: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
    /// Scene-wide ambient term applied regardless of the light.
    pub global_ambient: f32,
}

impl Light {
    /// Lambert-shaded colour for a vertex with eye-space normal `normal`.
    pub fn shade(&self, color: [f32; 3], normal: Vec3) -> [f32; 3] {
        let l = self.direction.normalize_or_zero();
        let lambert = normal.dot(l).max(0.0);
        let k = self.global_ambient + self.ambient + self.diffuse * lambert;
        color.map(|c| (c * k).clamp(0.0, 1.0))
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, 1.0, 0.2),
            ambient: 0.0,
            diffuse: 0.75,
            global_ambient: 0.2,
        }
    }
}

/// Per-frame state a renderer needs before drawing.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FrameSetup {
    pub view: Mat4,
    pub projection: Mat4,
    pub light: Light,
    pub clear_color: [f32; 3],
    pub polygon_mode: PolygonMode,
}

pub const CLEAR_COLOR: [f32; 3] = [0.1, 0.05, 0.0];

/// Consumer of terrain strips.  One `draw_strip` per frame between
/// `begin_frame` and `end_frame`.
pub trait Renderer {
    fn begin_frame(&mut self, setup: &FrameSetup);

    fn draw_strip(&mut self, strip: &StripArrays<'_>) -> Result<(), RenderError>;

    fn end_frame(&mut self) -> Result<RgbImage, RenderError>;
}

/// Checks the flat arrays hold exactly three floats per vertex.
pub fn validate_strip(strip: &StripArrays<'_>) -> Result<(), RenderError> {
    let expected = strip.count * 3;
    if strip.positions.len() != expected
        || strip.normals.len() != expected
        || strip.colors.len() != expected
    {
        return Err(RenderError::MismatchedArrays {
            count: strip.count,
            positions: strip.positions.len(),
            normals: strip.normals.len(),
            colors: strip.colors.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_facing_surface_gets_full_diffuse() {
        let light = Light {
            direction: Vec3::Y,
            ..Light::default()
        };
        let c = light.shade([1.0, 0.5, 0.0], Vec3::Y);
        assert!((c[0] - 0.95).abs() < 1e-6);
        assert!((c[1] - 0.475).abs() < 1e-6);
        assert_eq!(c[2], 0.0);
    }

    #[test]
    fn back_facing_surface_keeps_only_ambient() {
        let light = Light::default();
        let c = light.shade([1.0, 1.0, 1.0], -Vec3::Y);
        assert!((c[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let positions = [0.0; 9];
        let normals = [0.0; 6];
        let colors = [0.0; 9];
        let strip = StripArrays {
            positions: &positions,
            normals: &normals,
            colors: &colors,
            count: 3,
        };
        assert!(matches!(
            validate_strip(&strip),
            Err(RenderError::MismatchedArrays { normals: 6, .. })
        ));
    }
}
