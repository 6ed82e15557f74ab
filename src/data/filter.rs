use crate::config::{ExclusionRules, HeatmapConfig, ScoreGate};
use crate::error::Result;

use super::model::ProteinTable;

// ---------------------------------------------------------------------------
// Row predicates
// ---------------------------------------------------------------------------

/// True when the row is a contaminant or an explicitly excluded identifier.
///
/// The prefix test only applies to text cells; a missing tag is kept.
pub fn is_excluded(
    table: &ProteinTable,
    row: usize,
    id_column: &str,
    rules: &ExclusionRules,
) -> bool {
    let tag = table.rows[row].get(&rules.tag_column);
    if let Some(text) = tag.as_text() {
        if !rules.prefix.is_empty() && text.starts_with(&rules.prefix) {
            return true;
        }
    }
    let id = table.rows[row].get(id_column);
    if id.is_null() {
        return false;
    }
    let id = id.to_string();
    rules.identifiers.iter().any(|x| *x == id)
}

/// True when any gate column is strictly above the threshold.
/// Missing scores never pass.
pub fn passes_gate(table: &ProteinTable, row: usize, gate: &ScoreGate) -> Result<bool> {
    for column in &gate.columns {
        if let Some(v) = table.score(row, column)? {
            if v > gate.threshold {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

// ---------------------------------------------------------------------------
// Filter stage
// ---------------------------------------------------------------------------

/// Return indices (file order) of rows surviving exclusion and thresholding.
///
/// Every column the predicates touch must exist, even when the table is
/// empty.
pub fn filtered_indices(table: &ProteinTable, config: &HeatmapConfig) -> Result<Vec<usize>> {
    table.require_column(&config.id_column)?;
    table.require_column(&config.exclusion.tag_column)?;
    for column in &config.gate.columns {
        table.require_column(column)?;
    }

    let mut kept_after_exclusion = 0usize;
    let mut kept = Vec::new();
    for row in 0..table.len() {
        if is_excluded(table, row, &config.id_column, &config.exclusion) {
            continue;
        }
        kept_after_exclusion += 1;
        if passes_gate(table, row, &config.gate)? {
            kept.push(row);
        }
    }

    log::info!(
        "Filter: {} rows → {} after exclusions → {} with {} > {}",
        table.len(),
        kept_after_exclusion,
        kept.len(),
        config.gate.columns.join(" or "),
        config.gate.threshold
    );
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, ProteinRow};

    const SE: &str = "SE_UB_WT_BR_SaintScore";
    const SE_MG: &str = "SE_UB_WT_BR_MG_SaintScore";

    fn row(id: CellValue, se: CellValue, se_mg: CellValue) -> ProteinRow {
        ProteinRow::from_pairs([("PreyGene", id), (SE, se), (SE_MG, se_mg)])
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn table(rows: Vec<ProteinRow>) -> ProteinTable {
        ProteinTable::new(vec!["PreyGene".into(), SE.into(), SE_MG.into()], rows)
    }

    #[test]
    fn threshold_is_strict() {
        let t = table(vec![
            row(text("A"), CellValue::Float(0.65), CellValue::Float(0.65)),
            row(text("B"), CellValue::Float(0.651), CellValue::Null),
            row(text("C"), CellValue::Null, CellValue::Float(0.9)),
            row(text("D"), CellValue::Null, CellValue::Null),
        ]);
        let kept = filtered_indices(&t, &HeatmapConfig::default()).unwrap();
        assert_eq!(kept, vec![1, 2]);
    }

    #[test]
    fn prefix_is_case_sensitive() {
        let t = table(vec![
            row(text("Cont_KRT1"), CellValue::Float(1.0), CellValue::Float(1.0)),
            row(text("cont_KRT2"), CellValue::Float(1.0), CellValue::Float(1.0)),
            row(text("CONTRA"), CellValue::Float(1.0), CellValue::Float(1.0)),
        ]);
        let kept = filtered_indices(&t, &HeatmapConfig::default()).unwrap();
        assert_eq!(kept, vec![1, 2]);
    }

    #[test]
    fn exact_identifier_is_dropped_regardless_of_score() {
        let t = table(vec![
            row(text("TXP0CG47"), CellValue::Float(1.0), CellValue::Float(1.0)),
            row(text("TXP0CG47X"), CellValue::Float(1.0), CellValue::Float(1.0)),
        ]);
        let kept = filtered_indices(&t, &HeatmapConfig::default()).unwrap();
        assert_eq!(kept, vec![1]);
    }

    #[test]
    fn missing_tag_is_not_excluded() {
        let mut config = HeatmapConfig::default();
        config.exclusion.tag_column = "Tag".into();
        let t = ProteinTable::new(
            vec!["PreyGene".into(), "Tag".into(), SE.into(), SE_MG.into()],
            vec![ProteinRow::from_pairs([
                ("PreyGene", text("VCP")),
                ("Tag", CellValue::Null),
                (SE, CellValue::Float(0.9)),
                (SE_MG, CellValue::Null),
            ])],
        );
        assert_eq!(filtered_indices(&t, &config).unwrap(), vec![0]);
    }

    #[test]
    fn missing_gate_column_fails() {
        let t = ProteinTable::new(vec!["PreyGene".into(), SE.into()], Vec::new());
        let err = filtered_indices(&t, &HeatmapConfig::default()).unwrap_err();
        assert!(err.to_string().contains(SE_MG));
    }
}
