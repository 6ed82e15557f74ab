use std::path::PathBuf;

use thiserror::Error;

/// Domain failures of the heatmap pipeline.
///
/// I/O and parser errors are carried through `anyhow` with context; this enum
/// covers the conditions the pipeline itself detects.
#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("row {row}: column '{column}' holds '{value}', expected a number")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: identifier column '{column}' is empty")]
    MissingIdentifier { row: usize, column: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("no rows passed the filters; nothing to draw")]
    EmptyMatrix,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("score matrix shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("cannot write image to {path}: {reason}")]
    Save { path: PathBuf, reason: String },
}

pub type Result<T, E = HeatmapError> = std::result::Result<T, E>;
