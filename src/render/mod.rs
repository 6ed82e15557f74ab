/// Heatmap rendering: layout geometry, drawing, and raster post-processing.

pub mod heatmap;
pub mod layout;
pub mod raster;

use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::color::ColorMap;
use crate::config::FigureStyle;
use crate::data::matrix::ScoreMatrix;
use crate::error::{HeatmapError, Result};

/// What was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFigure {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Draw `matrix`, crop it tight and write it as PNG to `path`.
pub fn render_heatmap(
    matrix: &ScoreMatrix,
    style: &FigureStyle,
    path: &Path,
) -> Result<RenderedFigure> {
    let cmap = ColorMap::from_style(style)?;
    let canvas = heatmap::draw_figure(matrix, style, &cmap)?;
    let img = raster::crop_to_content(&canvas, style.px(style.crop_pad_in));

    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| HeatmapError::Save {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    log::info!(
        "Wrote {}×{} px heatmap ({} dpi) to {}",
        img.width(),
        img.height(),
        style.dpi,
        path.display()
    );

    Ok(RenderedFigure {
        path: path.to_path_buf(),
        width: img.width(),
        height: img.height(),
    })
}
