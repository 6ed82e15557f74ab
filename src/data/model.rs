use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{HeatmapError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the input table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a proteomics export carries.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` score. NaN counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// The string payload, only for text cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null) || matches!(self, CellValue::Float(v) if v.is_nan())
    }
}

// ---------------------------------------------------------------------------
// ProteinRow – one prey of the merged export
// ---------------------------------------------------------------------------

/// One row of the source table: column_name → value.
#[derive(Debug, Clone, Default)]
pub struct ProteinRow {
    pub cells: BTreeMap<String, CellValue>,
}

impl ProteinRow {
    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, CellValue)>,
        S: Into<String>,
    {
        ProteinRow {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Look up a cell; an absent key reads as `Null`.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// ProteinTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table plus its column index.
#[derive(Debug, Clone, Default)]
pub struct ProteinTable {
    /// Rows in file order.
    pub rows: Vec<ProteinRow>,
    /// Column names in file order (header order for CSV/Parquet).
    pub columns: Vec<String>,
}

impl ProteinTable {
    /// Table with a known header order.
    pub fn new(columns: Vec<String>, rows: Vec<ProteinRow>) -> Self {
        ProteinTable { rows, columns }
    }

    /// Table whose columns are the union of the rows' keys, sorted.
    /// Used for record-oriented inputs without a header.
    pub fn from_rows(rows: Vec<ProteinRow>) -> Self {
        let columns: BTreeSet<String> = rows
            .iter()
            .flat_map(|r| r.cells.keys().cloned())
            .collect();
        ProteinTable {
            rows,
            columns: columns.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Fail unless `column` is part of the table.
    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(HeatmapError::MissingColumn(column.to_string()))
        }
    }

    /// Numeric value of `column` in row `row`. Missing cells give `None`;
    /// text that is not a number is an error.
    pub fn score(&self, row: usize, column: &str) -> Result<Option<f64>> {
        let value = self.rows[row].get(column);
        if value.is_null() {
            return Ok(None);
        }
        match value.as_f64() {
            Some(v) => Ok(Some(v)),
            None => Err(HeatmapError::NotNumeric {
                row,
                column: column.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Row identifier rendered as text.
    pub fn identifier(&self, row: usize, column: &str) -> Result<String> {
        let value = self.rows[row].get(column);
        if value.is_null() {
            return Err(HeatmapError::MissingIdentifier {
                row,
                column: column.to_string(),
            });
        }
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ProteinTable {
        ProteinTable::new(
            vec!["PreyGene".into(), "score".into()],
            vec![
                ProteinRow::from_pairs([
                    ("PreyGene", CellValue::Text("VCP".into())),
                    ("score", CellValue::Float(0.8)),
                ]),
                ProteinRow::from_pairs([
                    ("PreyGene", CellValue::Integer(42)),
                    ("score", CellValue::Text("high".into())),
                ]),
                ProteinRow::from_pairs([("score", CellValue::Float(f64::NAN))]),
            ],
        )
    }

    #[test]
    fn score_reads_numbers_and_missing() {
        let t = table();
        assert_eq!(t.score(0, "score").unwrap(), Some(0.8));
        assert_eq!(t.score(2, "score").unwrap(), None);
        assert!(matches!(
            t.score(1, "score"),
            Err(HeatmapError::NotNumeric { row: 1, .. })
        ));
    }

    #[test]
    fn identifiers_render_as_text() {
        let t = table();
        assert_eq!(t.identifier(0, "PreyGene").unwrap(), "VCP");
        assert_eq!(t.identifier(1, "PreyGene").unwrap(), "42");
        assert!(t.identifier(2, "PreyGene").is_err());
    }

    #[test]
    fn require_column_reports_name() {
        let err = table().require_column("nope").unwrap_err();
        assert_eq!(err.to_string(), "column 'nope' not found in dataset");
    }

    #[test]
    fn from_rows_unions_keys() {
        let t = ProteinTable::from_rows(vec![
            ProteinRow::from_pairs([("b", CellValue::Null)]),
            ProteinRow::from_pairs([("a", CellValue::Bool(true))]),
        ]);
        assert_eq!(t.columns, vec!["a", "b"]);
    }
}
