use crate::heightfield::HeightField;
use glam::{Mat4, Vec3};

/// Camera circling the terrain at a fixed distance and downward tilt.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Downward tilt, degrees.
    pub tilt: f32,
    /// Current orbit angle around +Y, degrees.
    pub rotation: f32,
    /// Orbit angle advanced per frame, degrees.
    pub step: f32,
}

impl OrbitCamera {
    /// Orbits the horizontal centre of `field`, aimed at `height_fraction`
    /// of its tallest point.
    pub fn framing(
        field: &HeightField,
        height_fraction: f32,
        distance: f32,
        tilt: f32,
        step: f32,
    ) -> Self {
        let (w, d) = field.extent();
        Self {
            target: Vec3::new(w * 0.5, field.max_height() * height_fraction, d * 0.5),
            distance,
            tilt,
            rotation: 0.0,
            step,
        }
    }

    pub fn advance(&mut self, frames: u32) {
        self.rotation = (self.rotation + self.step * frames as f32).rem_euclid(360.0);
    }

    /// World → eye transform: pull back, tilt down, spin, recentre on target.
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_rotation_x(self.tilt.to_radians())
            * Mat4::from_rotation_y(self.rotation.to_radians())
            * Mat4::from_translation(-self.target)
    }

    pub fn eye(&self) -> Vec3 {
        self.view().inverse().transform_point3(Vec3::ZERO)
    }
}

/// Perspective projection, OpenGL depth convention.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Projection {
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
    }
}
