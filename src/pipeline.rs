use anyhow::{Context, Result};

use crate::config::HeatmapConfig;
use crate::data::filter::filtered_indices;
use crate::data::loader::load_table;
use crate::data::matrix::{build_matrix, ScoreMatrix};
use crate::data::model::ProteinTable;
use crate::data::order::{order_rows, RowOrder};
use crate::error::HeatmapError;
use crate::render::{render_heatmap, RenderedFigure};
use crate::summary::summary_lines;

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Ordered matrix ready to draw, with the ordering that produced it.
#[derive(Debug, Clone)]
pub struct PreparedHeatmap {
    pub matrix: ScoreMatrix,
    pub order: RowOrder,
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub figure: RenderedFigure,
    pub summary: Vec<String>,
}

/// Filter, project and order an already loaded table.
pub fn prepare(table: &ProteinTable, config: &HeatmapConfig) -> Result<PreparedHeatmap, HeatmapError> {
    config.validate()?;
    let kept = filtered_indices(table, config)?;
    let unordered = build_matrix(table, &kept, &config.id_column, &config.conditions)?;
    let order = order_rows(&unordered, &config.categories, &config.ranking_labels)?;
    let matrix = unordered.select_rows(&order.rows);
    Ok(PreparedHeatmap { matrix, order })
}

/// Read `config.input`, keeping identifier and tag cells as written.
pub fn load_input(config: &HeatmapConfig) -> Result<ProteinTable> {
    let text_columns = [config.id_column.as_str(), config.exclusion.tag_column.as_str()];
    let table = load_table(&config.input, &text_columns)
        .with_context(|| format!("loading {}", config.input.display()))?;
    if table.is_empty() {
        log::warn!("{} has no data rows", config.input.display());
    }
    Ok(table)
}

/// load → filter → reorder → render → save.
pub fn run(config: &HeatmapConfig) -> Result<RunReport> {
    let table = load_input(config)?;
    let prepared = prepare(&table, config)?;
    if prepared.matrix.is_empty() {
        return Err(HeatmapError::EmptyMatrix.into());
    }
    log::info!(
        "Ordered {} rows, {} ranked by score after the categories",
        prepared.order.rows.len(),
        prepared.order.unlisted
    );

    let figure = render_heatmap(&prepared.matrix, &config.style, &config.output)?;
    Ok(RunReport {
        figure,
        summary: summary_lines(&prepared.order),
    })
}
