//! Split-TurboID SAINT-score heatmap.
//!
//! Loads a merged proteomics export, keeps confident preys, orders them by
//! curated category and renders the score matrix as an annotated PNG.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod summary;

pub use config::HeatmapConfig;
pub use error::HeatmapError;
pub use pipeline::{load_input, prepare, run, PreparedHeatmap, RunReport};
