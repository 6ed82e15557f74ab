use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, Result};

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Everything the pipeline needs, passed by reference into each stage.
/// `Default` reproduces the supplemental figure 4b constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Column holding the prey gene symbol used as row identifier.
    pub id_column: String,
    pub exclusion: ExclusionRules,
    pub gate: ScoreGate,
    /// Source columns projected into the matrix, in display order.
    pub conditions: Vec<Condition>,
    /// Curated groupings, highest priority first.
    pub categories: Vec<Category>,
    /// Display labels summed to rank the rows no category claims.
    pub ranking_labels: Vec<String>,
    pub style: FigureStyle,
}

/// Rows dropped before thresholding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionRules {
    /// Column tested against `prefix`.
    pub tag_column: String,
    /// Case-sensitive prefix marking contaminants.
    pub prefix: String,
    /// Identifiers removed regardless of score.
    pub identifiers: Vec<String>,
}

/// A row is kept when any of `columns` is strictly above `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreGate {
    pub columns: Vec<String>,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub label: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub members: Vec<String>,
}

/// Visual constants of the figure. Lengths are in inches or points and are
/// converted to pixels through `dpi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureStyle {
    /// Hex stops of the diverging scale, low to high.
    pub color_stops: Vec<String>,
    /// Number of discrete levels the scale is quantised to.
    pub levels: usize,
    pub vmin: f64,
    pub vmax: f64,
    pub dpi: u32,
    pub cell_in: f64,
    pub margin_left_in: f64,
    pub margin_right_in: f64,
    pub margin_top_in: f64,
    pub margin_bottom_in: f64,
    /// Whitespace kept around the drawn content after cropping.
    pub crop_pad_in: f64,
    pub font_family: String,
    pub title: Vec<String>,
    pub title_pt: f64,
    pub title_pad_pt: f64,
    pub row_label_pt: f64,
    pub col_label_pt: f64,
    pub col_label_rotation_deg: f64,
    pub colorbar_label: String,
    pub colorbar_label_pt: f64,
    pub colorbar_tick_pt: f64,
    pub colorbar_ticks: Vec<f64>,
    /// Colour bar width as a fraction of the grid width.
    pub colorbar_fraction: f64,
    /// Gap between grid and colour bar as a fraction of the grid width.
    pub colorbar_pad: f64,
    pub grid_line_pt: f64,
    pub frame_line_pt: f64,
    pub tick_len_pt: f64,
    pub tick_width_pt: f64,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        let conditions = [
            ("WT/WT-Ub", "WT_UB_WT_BR_SaintScore"),
            ("WT/WT-Ub+MG", "WT_UB_WT_BR_MG_SaintScore"),
            ("WT/K0-Ub", "WT_KO_BR_SaintScore"),
            ("WT/K0-Ub+MG", "WT_KO_BR_MG_SaintScore"),
            ("SE/WT-Ub", "SE_UB_WT_BR_SaintScore"),
            ("SE/WT-Ub+MG", "SE_UB_WT_BR_MG_SaintScore"),
            ("SE/K0-Ub", "SE_KO_BR_SaintScore"),
            ("SE/K0-Ub+MG", "SE_KO_BR_MG_SaintScore"),
        ]
        .iter()
        .map(|(label, column)| Condition {
            label: label.to_string(),
            column: column.to_string(),
        })
        .collect();

        let categories = vec![
            Category {
                name: "Translation/RQC".into(),
                members: strings(&[
                    "RPL5", "EIF4B", "PABPC1", "PABPC3", "PABPC4", "UPF1", "RPL13", "RPL18",
                    "RPS8", "RPS27A", "EIF6", "HNRNPA2B1", "HNRNPA1", "PEG10", "SRP72",
                ]),
            },
            Category {
                name: "UPS/Proteostasis".into(),
                members: strings(&[
                    "VCP", "PSMC1", "PSMC2", "PSMC5", "PSMC6", "PSMA1", "PSMA6", "PSMB5",
                    "PSMB6", "SQSTM1", "HSP90B1", "HSP90AA1", "HSPB1", "HSPA1A", "CCT8",
                    "FKBP1A", "CSNK2A1", "VBL", "THOC1", "CYLD", "SPATA2",
                ]),
            },
            Category {
                name: "Cytoskeletal/Membrane".into(),
                members: strings(&[
                    "MYO6", "FLNA", "FLNC", "MAP4", "MAP1B", "MAP2", "MYH9", "TLN1", "CTTN",
                    "ANXA1", "ANXA2", "ACTN4", "TUBB4B", "SPTA2", "DPYSL2", "DPYSL3",
                    "DPYSL4", "MYOF", "EZR", "MYL9", "MYL12A", "IGF2R", "DES", "TAGLN2",
                ]),
            },
            Category {
                name: "Regulators".into(),
                members: strings(&["AHNAK", "IFI16", "DESI1", "MVP", "DSG1", "ALDH18A1"]),
            },
        ];

        HeatmapConfig {
            input: PathBuf::from("merged_proteomics_data.csv"),
            output: PathBuf::from("supplemental_fig4b_heatmap.png"),
            id_column: "PreyGene".into(),
            exclusion: ExclusionRules::default(),
            gate: ScoreGate::default(),
            conditions,
            categories,
            ranking_labels: strings(&["SE/WT-Ub", "SE/WT-Ub+MG"]),
            style: FigureStyle::default(),
        }
    }
}

impl Default for ExclusionRules {
    fn default() -> Self {
        ExclusionRules {
            tag_column: "PreyGene".into(),
            prefix: "Cont".into(),
            identifiers: strings(&["TXP0CG47"]),
        }
    }
}

impl Default for ScoreGate {
    fn default() -> Self {
        ScoreGate {
            columns: strings(&["SE_UB_WT_BR_SaintScore", "SE_UB_WT_BR_MG_SaintScore"]),
            threshold: 0.65,
        }
    }
}

impl Default for FigureStyle {
    fn default() -> Self {
        FigureStyle {
            color_stops: strings(&[
                "#deebf7", "#c6dbef", "#9ecae1", "#ffffff", "#fee0d2", "#fc9272", "#de2d26",
                "#a50f15", "#67000d",
            ]),
            levels: 100,
            vmin: 0.0,
            vmax: 1.0,
            dpi: 300,
            cell_in: 0.3,
            margin_left_in: 1.2,
            margin_right_in: 1.8,
            margin_top_in: 0.8,
            margin_bottom_in: 1.2,
            crop_pad_in: 0.1,
            font_family: "serif".into(),
            title: strings(&[
                "Split-TurboID: WT-Ub vs K0-Ub Control",
                "DeSI1 WT and SE Interactions",
            ]),
            title_pt: 13.0,
            title_pad_pt: 15.0,
            row_label_pt: 7.0,
            col_label_pt: 8.0,
            col_label_rotation_deg: 45.0,
            colorbar_label: "SAINT Score".into(),
            colorbar_label_pt: 11.0,
            colorbar_tick_pt: 10.0,
            colorbar_ticks: vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0],
            colorbar_fraction: 0.046,
            colorbar_pad: 0.04,
            grid_line_pt: 0.5,
            frame_line_pt: 1.5,
            tick_len_pt: 3.5,
            tick_width_pt: 0.8,
        }
    }
}

impl FigureStyle {
    /// Inches to whole pixels at the figure resolution.
    pub fn px(&self, inches: f64) -> u32 {
        (inches * self.dpi as f64).round().max(0.0) as u32
    }

    /// Points (1/72 in) to whole pixels, never below one.
    pub fn pt(&self, points: f64) -> u32 {
        ((points / 72.0) * self.dpi as f64).round().max(1.0) as u32
    }
}

impl HeatmapConfig {
    /// Read a full or partial configuration; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: HeatmapConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Source column behind a display label.
    pub fn column_for_label(&self, label: &str) -> Option<&str> {
        self.conditions
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.column.as_str())
    }

    /// Reject configurations the stages cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(HeatmapError::InvalidConfig(msg));

        if self.conditions.is_empty() {
            return invalid("condition mapping is empty".into());
        }
        for (i, c) in self.conditions.iter().enumerate() {
            if self.conditions[..i].iter().any(|p| p.label == c.label) {
                return invalid(format!("duplicate condition label '{}'", c.label));
            }
        }
        for label in &self.ranking_labels {
            if self.column_for_label(label).is_none() {
                return invalid(format!("ranking label '{label}' is not a condition label"));
            }
        }
        if self.gate.columns.is_empty() {
            return invalid("score gate names no columns".into());
        }
        if !self.gate.threshold.is_finite() {
            return invalid("score gate threshold must be finite".into());
        }

        let s = &self.style;
        if s.color_stops.len() < 2 {
            return invalid("need at least two color stops".into());
        }
        if s.levels < 2 {
            return invalid("color scale needs at least two levels".into());
        }
        if !(s.vmax > s.vmin) {
            return invalid(format!("vmax {} must exceed vmin {}", s.vmax, s.vmin));
        }
        if s.dpi == 0 || s.cell_in <= 0.0 {
            return invalid("dpi and cell size must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = HeatmapConfig::default();
        config.validate().unwrap();
        assert_eq!(config.conditions.len(), 8);
        assert_eq!(config.categories.len(), 4);
        assert_eq!(config.column_for_label("SE/WT-Ub"), Some("SE_UB_WT_BR_SaintScore"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: HeatmapConfig =
            serde_json::from_str(r#"{ "gate": { "threshold": 0.8 }, "output": "x.png" }"#)
                .unwrap();
        assert_eq!(config.gate.threshold, 0.8);
        assert_eq!(config.gate.columns.len(), 2);
        assert_eq!(config.output, PathBuf::from("x.png"));
        assert_eq!(config.style.dpi, 300);
    }

    #[test]
    fn unknown_ranking_label_is_rejected() {
        let mut config = HeatmapConfig::default();
        config.ranking_labels = vec!["SE/XX".into()];
        assert!(matches!(config.validate(), Err(HeatmapError::InvalidConfig(_))));
    }

    #[test]
    fn inverted_domain_is_rejected() {
        let mut config = HeatmapConfig::default();
        config.style.vmin = 1.0;
        config.style.vmax = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unit_conversion() {
        let style = FigureStyle::default();
        assert_eq!(style.px(0.3), 90);
        assert_eq!(style.pt(72.0), 300);
        assert_eq!(style.pt(0.01), 1);
    }
}
