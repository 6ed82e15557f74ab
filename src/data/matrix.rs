use crate::config::Condition;
use crate::error::{HeatmapError, Result};

use super::model::ProteinTable;

// ---------------------------------------------------------------------------
// ScoreMatrix – the grid that gets drawn
// ---------------------------------------------------------------------------

/// Dense row-major grid of optional scores with row and column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    values: Vec<Option<f64>>,
}

impl ScoreMatrix {
    /// Assemble a matrix from per-row value vectors.
    pub fn from_rows(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if rows.len() != row_labels.len() {
            return Err(HeatmapError::ShapeMismatch(format!(
                "{} row labels for {} rows",
                row_labels.len(),
                rows.len()
            )));
        }
        let n_cols = col_labels.len();
        if let Some(bad) = rows.iter().position(|r| r.len() != n_cols) {
            return Err(HeatmapError::ShapeMismatch(format!(
                "row {bad} has {} values, expected {n_cols}",
                rows[bad].len()
            )));
        }
        Ok(ScoreMatrix {
            row_labels,
            col_labels,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values[row * self.n_cols() + col]
    }

    pub fn row(&self, row: usize) -> &[Option<f64>] {
        let n = self.n_cols();
        &self.values[row * n..(row + 1) * n]
    }

    pub fn column_index(&self, label: &str) -> Result<usize> {
        self.col_labels
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| HeatmapError::MissingColumn(label.to_string()))
    }

    /// New matrix holding the rows at `order`, in that sequence.
    pub fn select_rows(&self, order: &[usize]) -> ScoreMatrix {
        let mut values = Vec::with_capacity(order.len() * self.n_cols());
        for &r in order {
            values.extend_from_slice(self.row(r));
        }
        ScoreMatrix {
            row_labels: order.iter().map(|&r| self.row_labels[r].clone()).collect(),
            col_labels: self.col_labels.clone(),
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// Matrix builder
// ---------------------------------------------------------------------------

/// Project the filtered rows onto the condition mapping.
///
/// Columns follow `conditions` and carry their display labels; rows keep the
/// relative order of `rows`. Missing scores stay missing.
pub fn build_matrix(
    table: &ProteinTable,
    rows: &[usize],
    id_column: &str,
    conditions: &[Condition],
) -> Result<ScoreMatrix> {
    table.require_column(id_column)?;
    for c in conditions {
        table.require_column(&c.column)?;
    }

    let mut labels = Vec::with_capacity(rows.len());
    let mut grid = Vec::with_capacity(rows.len());
    for &r in rows {
        labels.push(table.identifier(r, id_column)?);
        let values = conditions
            .iter()
            .map(|c| table.score(r, &c.column))
            .collect::<Result<Vec<_>>>()?;
        grid.push(values);
    }

    let matrix = ScoreMatrix::from_rows(
        labels,
        conditions.iter().map(|c| c.label.clone()).collect(),
        grid,
    )?;
    log::info!("Score matrix: {} rows × {} conditions", matrix.n_rows(), matrix.n_cols());
    Ok(matrix)
}
