/// Height field generation: multi-octave noise shaped by a radial falloff.
use crate::error::{Result, TerrainError};
use crate::noise::NoiseSource;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How noise and radial falloff combine into the final height.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum BlendPolicy {
    /// `sqrt(noise) * scale * d²`, clamped from below by `floor`.
    /// Bowl-shaped island rising out of a flat plain.
    PowerClamp,
    /// `(noise + d * 0.25) * scale * d²`, unclamped.
    /// Softer, continuous relief.
    AdditivePower,
}

impl fmt::Display for BlendPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlendPolicy::PowerClamp => "power-clamp",
            BlendPolicy::AdditivePower => "additive-power",
        };
        f.write_str(s)
    }
}

/// Tunables for [`generate`].
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Debug)]
pub struct GenerationParams {
    pub blend: BlendPolicy,
    /// Base noise frequency in grid units.  Higher = smaller, more frequent bumps.
    pub frequency: f64,
    /// Peak height multiplier.
    pub scale: f64,
    /// Minimum height for [`BlendPolicy::PowerClamp`]; ignored otherwise.
    pub floor: f64,
    pub octaves: u32,
    pub persistence: f64,
    /// Shift odd rows by half a grid cell when sampling noise, matching the
    /// staggered mesh layout.
    pub stagger_sampling: bool,
}

impl GenerationParams {
    /// Island with a flat plain around it.
    pub fn island() -> Self {
        Self {
            blend: BlendPolicy::PowerClamp,
            frequency: 1.0 / 28.0,
            scale: 1024.0,
            floor: 120.0,
            octaves: 4,
            persistence: 0.25,
            stagger_sampling: true,
        }
    }

    /// Broad rolling hills, no floor.
    pub fn rolling() -> Self {
        Self {
            blend: BlendPolicy::AdditivePower,
            frequency: 1.0 / 120.0,
            scale: 768.0,
            floor: 0.0,
            octaves: 4,
            persistence: 0.25,
            stagger_sampling: false,
        }
    }

    fn validate(&self) -> Result<()> {
        let positive = |name: &'static str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(TerrainError::InvalidParameter {
                    name,
                    reason: format!("expected a positive finite value, got {v}"),
                })
            }
        };
        positive("frequency", self.frequency)?;
        positive("scale", self.scale)?;
        if !self.persistence.is_finite() {
            return Err(TerrainError::InvalidParameter {
                name: "persistence",
                reason: format!("expected a finite value, got {}", self.persistence),
            });
        }
        if !self.floor.is_finite() {
            return Err(TerrainError::InvalidParameter {
                name: "floor",
                reason: format!("expected a finite value, got {}", self.floor),
            });
        }
        if self.octaves == 0 {
            return Err(TerrainError::InvalidParameter {
                name: "octaves",
                reason: "at least one octave is required".to_string(),
            });
        }
        Ok(())
    }

    fn blend(&self, noise: f64, falloff: f64) -> f64 {
        match self.blend {
            BlendPolicy::PowerClamp => {
                (noise.sqrt() * self.scale * falloff.powi(2)).max(self.floor)
            }
            BlendPolicy::AdditivePower => (noise + falloff * 0.25) * self.scale * falloff.powi(2),
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::island()
    }
}

/// Row-major grid of heights with the range observed during generation.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: usize,
    depth: usize,
    grid_size: f32,
    heights: Vec<f32>,
    min_height: f32,
    max_height: f32,
}

impl HeightField {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    #[inline]
    pub fn index(&self, x: usize, z: usize) -> usize {
        debug_assert!(x < self.width && z < self.depth);
        z * self.width + x
    }

    #[inline]
    pub fn height(&self, x: usize, z: usize) -> f32 {
        self.heights[self.index(x, z)]
    }

    /// World-space position of grid vertex `(x, z)`.
    ///
    /// Odd rows sit half a cell to the right, giving the brick layout the
    /// triangle strip is wound for.
    pub fn place_vertex(&self, x: usize, z: usize) -> Vec3 {
        let s = self.grid_size;
        let offset = (z % 2) as f32 * s * 0.5;
        Vec3::new(offset + x as f32 * s, self.height(x, z), z as f32 * s)
    }

    /// World-space extent of the grid on the horizontal plane.
    pub fn extent(&self) -> (f32, f32) {
        (
            self.width as f32 * self.grid_size,
            self.depth as f32 * self.grid_size,
        )
    }

    /// Builds a field from precomputed heights.  Mostly useful for tests and
    /// hand-authored terrain; `heights` must hold `width * depth` finite values.
    pub fn from_heights(
        width: usize,
        depth: usize,
        grid_size: f32,
        heights: Vec<f32>,
    ) -> Result<Self> {
        check_dimensions(width, depth, grid_size)?;
        if heights.len() != width * depth {
            return Err(TerrainError::InvalidParameter {
                name: "heights",
                reason: format!("expected {} values, got {}", width * depth, heights.len()),
            });
        }
        if let Some(i) = heights.iter().position(|h| !h.is_finite()) {
            return Err(TerrainError::InvalidParameter {
                name: "heights",
                reason: format!("value {} at index {i} is not finite", heights[i]),
            });
        }
        let (min_height, max_height) = heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            });
        Ok(Self {
            width,
            depth,
            grid_size,
            heights,
            min_height,
            max_height,
        })
    }
}

fn check_dimensions(width: usize, depth: usize, grid_size: f32) -> Result<()> {
    if width == 0 || depth == 0 {
        return Err(TerrainError::InvalidDimension { width, depth });
    }
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return Err(TerrainError::InvalidGridSize(grid_size));
    }
    Ok(())
}

/// Generates a `width × depth` height field.
///
/// * `grid_size`: world spacing between adjacent columns/rows.
/// * `params`   : blend policy, frequency and scale.
/// * `noise`    : coherent noise source; sampled in grid units.
///
/// Deterministic: identical inputs yield identical heights.
pub fn generate(
    width: usize,
    depth: usize,
    grid_size: f32,
    params: &GenerationParams,
    noise: &impl NoiseSource,
) -> Result<HeightField> {
    check_dimensions(width, depth, grid_size)?;
    params.validate()?;

    tracing::debug!(width, depth, grid_size, blend = %params.blend, "generating height field");

    // Integer halves keep the falloff centred on a grid column.
    let cx = (width / 2) as f64;
    let cz = (depth / 2) as f64;
    let diag = cx.hypot(cz);

    let mut heights = Vec::with_capacity(width * depth);
    let mut min_height = f32::INFINITY;
    let mut max_height = f32::NEG_INFINITY;

    for z in 0..depth {
        for x in 0..width {
            let stagger = if params.stagger_sampling {
                (z % 2) as f64 * 0.5
            } else {
                0.0
            };
            let fx = x as f64 + stagger;
            let fz = z as f64;

            // Staggered samples past the last column lie beyond `diag`.
            let falloff = if diag > 0.0 {
                (1.0 - (cx - fx).hypot(cz - fz) / diag).max(0.0)
            } else {
                1.0
            };

            let n = noise.noise2d(fx, fz, params.octaves, params.persistence, params.frequency);
            let n = (n + 1.0) * 0.5;

            let h = params.blend(n, falloff) as f32;
            heights.push(h);
            min_height = min_height.min(h);
            max_height = max_height.max(h);
        }
    }

    tracing::info!(
        width,
        depth,
        min_height,
        max_height,
        "height field generated"
    );

    Ok(HeightField {
        width,
        depth,
        grid_size,
        heights,
        min_height,
        max_height,
    })
}
