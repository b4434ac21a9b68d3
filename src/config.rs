/// Run configuration, read from an optional JSON file.
///
/// Every field has a default, so an empty object (or no file at all) gives
/// the stock 160×160 island viewed from a slow orbit.
use crate::color::{ColorMapper, Dither, Palette, Rgb};
use crate::error::TerrainError;
use crate::heightfield::GenerationParams;
use crate::render::PolygonMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

/// Named starting points for [`GenerationParams`].
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Island,
    Rolling,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Preset::Island => "island",
            Preset::Rolling => "rolling",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(default)]
pub struct TerrainConfig {
    pub width: usize,
    pub depth: usize,
    pub grid_size: f32,
    pub preset: Preset,
    /// Overrides on top of the preset.
    pub frequency: Option<f64>,
    pub scale: Option<f64>,
    pub floor: Option<f64>,
    pub stagger_sampling: Option<bool>,
    /// Custom gradient, lowest terrain first.  `None` uses the stock palette.
    pub palette: Option<Vec<Rgb>>,
    pub dither: Dither,
}

impl TerrainConfig {
    pub fn generation_params(&self) -> GenerationParams {
        let mut params = match self.preset {
            Preset::Island => GenerationParams::island(),
            Preset::Rolling => GenerationParams::rolling(),
        };
        if let Some(frequency) = self.frequency {
            params.frequency = frequency;
        }
        if let Some(scale) = self.scale {
            params.scale = scale;
        }
        if let Some(floor) = self.floor {
            params.floor = floor;
        }
        if let Some(stagger) = self.stagger_sampling {
            params.stagger_sampling = stagger;
        }
        params
    }

    pub fn color_mapper(&self) -> Result<ColorMapper, TerrainError> {
        let palette = match &self.palette {
            Some(colors) => Palette::new(colors.clone())?,
            None => Palette::terrain(),
        };
        Ok(ColorMapper::new(palette, self.dither))
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 160,
            depth: 160,
            grid_size: 16.0,
            preset: Preset::Island,
            frequency: None,
            scale: None,
            floor: None,
            stagger_sampling: None,
            palette: None,
            dither: Dither::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub polygon_mode: PolygonMode,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            fov_degrees: 60.0,
            near: 1.0,
            far: 4096.0,
            polygon_mode: PolygonMode::Fill,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub tilt_degrees: f32,
    pub degrees_per_frame: f32,
    /// Fraction of the tallest peak the camera aims at.
    pub target_height_fraction: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 2000.0,
            tilt_degrees: 30.0,
            degrees_per_frame: 0.125,
            target_height_fraction: 0.15,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(default)]
pub struct OutputConfig {
    /// Images written per run.
    pub frames: u32,
    /// Orbit frames advanced between written images.
    pub frame_stride: u32,
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frames: 8,
            frame_stride: 90,
            dir: PathBuf::from("renders"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug, Default)]
#[serde(default)]
pub struct Config {
    /// Noise seed; `None` picks one at random.
    pub seed: Option<u32>,
    pub terrain: TerrainConfig,
    pub viewport: ViewportConfig,
    pub camera: CameraConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Reads and validates `path`, or returns the defaults when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let config: Config =
                    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })?;
                tracing::debug!(path = %path.display(), "loaded config");
                config
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.viewport;
        if v.width == 0 || v.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                v.width, v.height
            )));
        }
        if v.width.checked_mul(v.height).is_none() {
            return Err(ConfigError::Invalid(format!(
                "viewport {}x{} holds more pixels than a frame buffer can address",
                v.width, v.height
            )));
        }
        if !(v.near > 0.0 && v.far > v.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes need 0 < near < far, got near {} far {}",
                v.near, v.far
            )));
        }
        if !(v.fov_degrees > 0.0 && v.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "field of view must be within (0, 180) degrees, got {}",
                v.fov_degrees
            )));
        }
        if self.output.frames == 0 {
            return Err(ConfigError::Invalid(
                "at least one frame must be rendered".to_string(),
            ));
        }
        // Surface palette problems before any work is done.
        self.terrain.color_mapper()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::BlendPolicy;

    #[test]
    fn defaults_describe_the_stock_island() {
        let config = Config::default();
        assert_eq!(config.terrain.width, 160);
        assert_eq!(config.terrain.depth, 160);
        assert_eq!(config.terrain.grid_size, 16.0);
        assert_eq!(config.terrain.generation_params(), GenerationParams::island());
        assert_eq!(config.viewport.width, 800);
        assert_eq!(config.camera.distance, 2000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let json = r#"{
            "seed": 17,
            "terrain": { "width": 64, "preset": "rolling", "frequency": 0.05 },
            "viewport": { "polygon_mode": "line" }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.terrain.width, 64);
        assert_eq!(config.terrain.depth, 160);
        assert_eq!(config.viewport.polygon_mode, PolygonMode::Line);
        assert_eq!(config.viewport.height, 600);

        let params = config.terrain.generation_params();
        assert_eq!(params.blend, BlendPolicy::AdditivePower);
        assert_eq!(params.frequency, 0.05);
        assert_eq!(params.scale, GenerationParams::rolling().scale);
    }

    #[test]
    fn empty_palette_fails_validation() {
        let mut config = Config::default();
        config.terrain.palette = Some(Vec::new());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Terrain(TerrainError::EmptyPalette))
        ));
    }

    #[test]
    fn bad_viewport_fails_validation() {
        let mut config = Config::default();
        config.viewport.far = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.viewport.width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.viewport.width = 65_536;
        config.viewport.height = 65_536;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.output.frames = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = Path::new("definitely/not/here.json");
        let err = Config::load(Some(path)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("not/here.json"));
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
