use std::collections::{BTreeMap, BTreeSet};

use crate::config::Category;
use crate::error::Result;

use super::matrix::ScoreMatrix;

// ---------------------------------------------------------------------------
// RowOrder – final permutation plus where each category landed
// ---------------------------------------------------------------------------

/// Contiguous run of rows contributed by one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBand {
    pub name: String,
    /// First row (0-based) of the band in the ordered matrix.
    pub start: usize,
    pub len: usize,
}

impl CategoryBand {
    /// Last row of the band, if it has any.
    pub fn end(&self) -> Option<usize> {
        (self.len > 0).then(|| self.start + self.len - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOrder {
    /// Indices into the unordered matrix, in display order.
    pub rows: Vec<usize>,
    /// One band per category, in priority order.
    pub bands: Vec<CategoryBand>,
    /// Rows not claimed by any category (ranked by score).
    pub unlisted: usize,
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Arrange matrix rows: category members first (category priority, then list
/// order, first occurrence wins), then everything else by descending sum of
/// the `ranking` columns with missing values counted as zero.
///
/// The result is a permutation of `0..matrix.n_rows()`. An identifier that
/// occurs on several rows places all of them, in matrix order, at its slot.
pub fn order_rows(
    matrix: &ScoreMatrix,
    categories: &[Category],
    ranking: &[String],
) -> Result<RowOrder> {
    let ranking_cols = ranking
        .iter()
        .map(|label| matrix.column_index(label))
        .collect::<Result<Vec<_>>>()?;

    let mut positions: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in matrix.row_labels.iter().enumerate() {
        positions.entry(label.as_str()).or_default().push(i);
    }

    let mut rows = Vec::with_capacity(matrix.n_rows());
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut bands = Vec::with_capacity(categories.len());

    for category in categories {
        let start = rows.len();
        for id in &category.members {
            let Some(hits) = positions.get(id.as_str()) else {
                continue;
            };
            if !seen.insert(id.as_str()) {
                continue;
            }
            if hits.len() > 1 {
                log::warn!("{id} occurs on {} rows; keeping all of them", hits.len());
            }
            rows.extend_from_slice(hits);
        }
        log::debug!("{}: {} rows", category.name, rows.len() - start);
        bands.push(CategoryBand {
            name: category.name.clone(),
            start,
            len: rows.len() - start,
        });
    }

    let score = |r: usize| -> f64 {
        ranking_cols
            .iter()
            .map(|&c| matrix.get(r, c).unwrap_or(0.0))
            .sum()
    };
    let mut remaining: Vec<(usize, f64)> = (0..matrix.n_rows())
        .filter(|&r| !seen.contains(matrix.row_labels[r].as_str()))
        .map(|r| (r, score(r)))
        .collect();
    // `sort_by` is stable: equal scores keep matrix order.
    remaining.sort_by(|a, b| b.1.total_cmp(&a.1));

    let unlisted = remaining.len();
    rows.extend(remaining.into_iter().map(|(r, _)| r));

    Ok(RowOrder {
        rows,
        bands,
        unlisted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["SE/WT-Ub".into(), "SE/WT-Ub+MG".into()]
    }

    fn matrix(rows: &[(&str, Option<f64>, Option<f64>)]) -> ScoreMatrix {
        ScoreMatrix::from_rows(
            rows.iter().map(|r| r.0.to_string()).collect(),
            labels(),
            rows.iter().map(|r| vec![r.1, r.2]).collect(),
        )
        .unwrap()
    }

    fn category(name: &str, members: &[&str]) -> Category {
        Category {
            name: name.into(),
            members: members.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn ordered_labels(m: &ScoreMatrix, order: &RowOrder) -> Vec<String> {
        m.select_rows(&order.rows).row_labels
    }

    #[test]
    fn categories_first_then_score() {
        let m = matrix(&[
            ("X", Some(0.1), None),
            ("VCP", Some(0.7), None),
            ("Y", Some(0.9), Some(0.9)),
            ("RPL5", Some(0.7), None),
        ]);
        let cats = [category("T", &["RPL5"]), category("U", &["VCP"])];
        let order = order_rows(&m, &cats, &labels()).unwrap();
        assert_eq!(ordered_labels(&m, &order), vec!["RPL5", "VCP", "Y", "X"]);
        assert_eq!(order.unlisted, 2);
        assert_eq!(order.bands[1], CategoryBand { name: "U".into(), start: 1, len: 1 });
    }

    #[test]
    fn first_occurrence_wins_across_lists() {
        let m = matrix(&[("A", None, None), ("B", None, None), ("C", None, None)]);
        let cats = [
            category("one", &["B", "MISSING", "A"]),
            category("two", &["A", "C", "B"]),
        ];
        let order = order_rows(&m, &cats, &labels()).unwrap();
        assert_eq!(ordered_labels(&m, &order), vec!["B", "A", "C"]);
        assert_eq!(order.bands[0].len, 2);
        assert_eq!(order.bands[1], CategoryBand { name: "two".into(), start: 2, len: 1 });
    }

    #[test]
    fn ties_keep_original_order() {
        let m = matrix(&[
            ("a", Some(0.9), None),
            ("b", Some(0.3), None),
            ("c", Some(0.7), None),
            ("d", None, Some(0.3)),
            ("e", Some(0.1), None),
        ]);
        let order = order_rows(&m, &[], &labels()).unwrap();
        assert_eq!(ordered_labels(&m, &order), vec!["a", "c", "b", "d", "e"]);
    }

    #[test]
    fn duplicate_identifiers_stay_together() {
        let m = matrix(&[("A", None, None), ("B", None, None), ("A", Some(1.0), None)]);
        let order = order_rows(&m, &[category("c", &["A"])], &labels()).unwrap();
        assert_eq!(order.rows, vec![0, 2, 1]);
        assert_eq!(order.bands[0].len, 2);
    }

    #[test]
    fn empty_band_has_no_end() {
        let band = CategoryBand { name: "n".into(), start: 4, len: 0 };
        assert_eq!(band.end(), None);
        let band = CategoryBand { name: "n".into(), start: 4, len: 3 };
        assert_eq!(band.end(), Some(6));
    }

    #[test]
    fn unknown_ranking_label_fails() {
        let m = matrix(&[("A", None, None)]);
        assert!(order_rows(&m, &[], &["nope".to_string()]).is_err());
    }
}
