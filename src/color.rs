/// Height → colour mapping over an interpolated palette.
use crate::error::{Result, TerrainError};
use crate::noise::NoiseSource;
use glam::Vec3;
use serde::{Deserialize, Serialize};

pub type Rgb = [f32; 3];

/// Interpolated fractions below this snap to the lower palette entry.
const SNAP_EPSILON: f64 = 0.01;

// ── Palette ───────────────────────────────────────────────────────────────────

/// Ordered gradient control colours, lowest terrain first.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self> {
        if colors.is_empty() {
            return Err(TerrainError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Water, sand, grass, a long band of rock and a snow cap.
    pub fn terrain() -> Self {
        let mut colors = vec![
            [0.0, 0.0, 0.7], // deep water
            [0.2, 0.5, 1.0], // shallow water
            [0.5, 0.5, 0.4], // wet sand
            [1.0, 1.0, 0.9], // dry sand
            [0.1, 0.4, 0.1], // grass
            [0.2, 0.2, 0.2], // dark rock
        ];
        colors.extend(std::iter::repeat_n([0.3, 0.3, 0.3], 10));
        colors.push([1.0, 1.0, 1.0]); // snow
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Colour at fractional gradient position `n` in `[0, len - 1]`.
    pub fn sample(&self, n: f64) -> Rgb {
        let last = (self.colors.len() - 1) as f64;
        let n = n.clamp(0.0, last);
        let i0 = n.floor() as usize;
        let mut i1 = n.ceil() as usize;
        let f = n - n.floor();
        if f < SNAP_EPSILON {
            i1 = i0;
        }

        let c0 = self.colors[i0];
        let c1 = self.colors[i1];
        let f = f as f32;
        std::array::from_fn(|i| c0[i] + (c1[i] - c0[i]) * f)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::terrain()
    }
}

// ── Dither ────────────────────────────────────────────────────────────────────

/// Noise-driven brightness jitter that breaks up banding on higher terrain.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Debug)]
#[serde(default)]
pub struct Dither {
    /// Peak per-channel offset.
    pub amplitude: f32,
    pub frequency: f64,
    pub octaves: u32,
    pub persistence: f64,
    /// Gradient position above which jitter applies; the bands below
    /// (water and wet sand) stay clean.
    pub threshold: f64,
}

impl Dither {
    pub fn off() -> Self {
        Self {
            amplitude: 0.0,
            ..Self::default()
        }
    }
}

impl Default for Dither {
    fn default() -> Self {
        Self {
            amplitude: 0.04,
            frequency: 1.0 / 32.0,
            octaves: 1,
            persistence: 0.25,
            threshold: 2.0,
        }
    }
}

// ── Mapper ────────────────────────────────────────────────────────────────────

/// Maps vertex heights onto a [`Palette`], with optional [`Dither`].
///
/// Output channels are clamped to `[0, 1]` after jitter.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMapper {
    palette: Palette,
    dither: Dither,
}

impl ColorMapper {
    pub fn new(palette: Palette, dither: Dither) -> Self {
        Self { palette, dither }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Fractional palette position of height `y` within `[min, max]`.
    ///
    /// A degenerate range (`max <= min`) has no gradient to index, so every
    /// height maps to the first entry.
    pub fn gradient_position(&self, y: f32, min_height: f32, max_height: f32) -> f64 {
        let range = max_height as f64 - min_height as f64;
        if range <= 0.0 {
            return 0.0;
        }
        let last = (self.palette.len() - 1) as f64;
        ((y as f64 - min_height as f64) / range * last).clamp(0.0, last)
    }

    /// Colour for a world-space vertex.
    pub fn color_for(
        &self,
        vertex: Vec3,
        min_height: f32,
        max_height: f32,
        noise: &impl NoiseSource,
    ) -> Rgb {
        let n = self.gradient_position(vertex.y, min_height, max_height);
        let mut color = self.palette.sample(n);

        if n > self.dither.threshold && self.dither.amplitude != 0.0 {
            let jitter = noise.noise2d(
                vertex.x as f64,
                vertex.z as f64,
                self.dither.octaves,
                self.dither.persistence,
                self.dither.frequency,
            ) as f32
                * self.dither.amplitude;
            for c in &mut color {
                *c = (*c + jitter).clamp(0.0, 1.0);
            }
        }
        color
    }
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self::new(Palette::terrain(), Dither::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantNoise(f64);

    impl NoiseSource for ConstantNoise {
        fn noise2d(&self, _: f64, _: f64, _: u32, _: f64, _: f64) -> f64 {
            self.0
        }
        fn noise3d(&self, _: f64, _: f64, _: f64, _: u32, _: f64, _: f64) -> f64 {
            self.0
        }
    }

    fn small_palette() -> Palette {
        Palette::new(vec![
            [0.0, 0.0, 0.0],
            [0.2, 0.4, 0.6],
            [1.0, 1.0, 1.0],
            [0.5, 0.25, 0.0],
            [0.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert_eq!(Palette::new(Vec::new()), Err(TerrainError::EmptyPalette));
    }

    #[test]
    fn terrain_palette_has_seventeen_bands() {
        let p = Palette::terrain();
        assert_eq!(p.len(), 17);
        assert_eq!(p.colors()[0], [0.0, 0.0, 0.7]);
        assert_eq!(p.colors()[16], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn extremes_map_to_first_and_last_entries() {
        let mapper = ColorMapper::new(small_palette(), Dither::default());
        let noise = ConstantNoise(0.0);
        let low = mapper.color_for(Vec3::new(3.0, 10.0, 4.0), 10.0, 50.0, &noise);
        let high = mapper.color_for(Vec3::new(3.0, 50.0, 4.0), 10.0, 50.0, &noise);
        assert_eq!(low, [0.0, 0.0, 0.0]);
        assert_eq!(high, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn midpoint_interpolates_between_neighbours() {
        let mapper = ColorMapper::new(small_palette(), Dither::default());
        // n = 0.5 of the way from entry 0 to entry 1 (range 0..4, y = 0.5).
        let c = mapper.color_for(Vec3::new(0.0, 0.5, 0.0), 0.0, 4.0, &ConstantNoise(0.9));
        assert_eq!(c, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn tiny_fractions_snap_to_lower_entry() {
        let p = small_palette();
        assert_eq!(p.sample(1.005), p.colors()[1]);
        assert_ne!(p.sample(1.02), p.colors()[1]);
    }

    #[test]
    fn jitter_only_above_threshold() {
        let mapper = ColorMapper::new(small_palette(), Dither::default());
        let noise = ConstantNoise(1.0);
        // n = 2 exactly: not above the threshold, entry 2 untouched.
        let at_threshold = mapper.color_for(Vec3::new(0.0, 2.0, 0.0), 0.0, 4.0, &noise);
        assert_eq!(at_threshold, [1.0, 1.0, 1.0]);
        // n = 3: jittered by +0.04 on every channel.
        let above = mapper.color_for(Vec3::new(0.0, 3.0, 0.0), 0.0, 4.0, &noise);
        assert!((above[0] - 0.54).abs() < 1e-6);
        assert!((above[1] - 0.29).abs() < 1e-6);
        assert!((above[2] - 0.04).abs() < 1e-6);
    }

    #[test]
    fn jitter_is_clamped_to_unit_range() {
        let mapper = ColorMapper::new(small_palette(), Dither::default());
        let c = mapper.color_for(Vec3::new(0.0, 3.0, 0.0), 0.0, 4.0, &ConstantNoise(-1.0));
        // Blue channel of entry 3 is 0.0; jitter would push it negative.
        assert_eq!(c[2], 0.0);
        let top = mapper.color_for(Vec3::new(0.0, 4.0, 0.0), 0.0, 4.0, &ConstantNoise(1.0));
        assert_eq!(top[1], 1.0);
    }

    #[test]
    fn disabled_dither_leaves_palette_untouched() {
        let mapper = ColorMapper::new(small_palette(), Dither::off());
        let c = mapper.color_for(Vec3::new(0.0, 3.0, 0.0), 0.0, 4.0, &ConstantNoise(1.0));
        assert_eq!(c, [0.5, 0.25, 0.0]);
    }

    #[test]
    fn degenerate_range_maps_to_first_entry() {
        let mapper = ColorMapper::new(small_palette(), Dither::default());
        assert_eq!(mapper.gradient_position(7.0, 7.0, 7.0), 0.0);
        let c = mapper.color_for(Vec3::new(0.0, 7.0, 0.0), 7.0, 7.0, &ConstantNoise(1.0));
        assert_eq!(c, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn single_entry_palette_is_constant() {
        let mapper = ColorMapper::new(Palette::new(vec![[0.3, 0.6, 0.9]]).unwrap(), Dither::off());
        let c = mapper.color_for(Vec3::new(0.0, 5.0, 0.0), 0.0, 10.0, &ConstantNoise(0.0));
        assert_eq!(c, [0.3, 0.6, 0.9]);
    }
}
