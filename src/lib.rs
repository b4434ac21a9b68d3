//! Procedural heightfield terrain: layered noise → staggered triangle strip
//! with per-vertex normals and height-banded colours, plus an offscreen
//! orbit renderer.

pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod heightfield;
pub mod mesh;
pub mod noise;
pub mod normals;
pub mod render;

pub use color::{ColorMapper, Dither, Palette};
pub use error::{Result, TerrainError};
pub use heightfield::{BlendPolicy, GenerationParams, HeightField, generate};
pub use mesh::{Mesh, StripArrays, build};
pub use self::noise::{NoiseSource, PerlinSource};
pub use normals::estimate_normal;
