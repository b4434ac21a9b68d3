/// Image exports: top-down preview, palette legend and rendered frames.
pub mod png;

pub use png::{export_legend, export_preview, save};
