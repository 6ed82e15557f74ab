use std::str::FromStr;

use palette::{Mix, Srgb};
use plotters::style::RGBColor;

use crate::config::FigureStyle;
use crate::error::{HeatmapError, Result};

// ---------------------------------------------------------------------------
// Colour map: score → RGBColor
// ---------------------------------------------------------------------------

/// Evenly spaced colour stops interpolated into a fixed number of levels.
///
/// Scores are normalised against a fixed `[vmin, vmax]` domain, never the
/// data range; anything outside takes the end colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    lut: Vec<RGBColor>,
    vmin: f64,
    vmax: f64,
}

impl ColorMap {
    /// Build the colour map from hex stops (`#rrggbb`).
    pub fn new(stops: &[String], levels: usize, vmin: f64, vmax: f64) -> Result<Self> {
        if stops.len() < 2 || levels < 2 {
            return Err(HeatmapError::InvalidConfig(
                "colour map needs two stops and two levels".into(),
            ));
        }
        let stops: Vec<Srgb<f32>> = stops
            .iter()
            .map(|hex| {
                Srgb::<u8>::from_str(hex)
                    .map(|c| c.into_format::<f32>())
                    .map_err(|e| HeatmapError::InvalidConfig(format!("colour '{hex}': {e}")))
            })
            .collect::<Result<_>>()?;

        let segments = (stops.len() - 1) as f32;
        let lut = (0..levels)
            .map(|k| {
                let x = k as f32 / (levels - 1) as f32 * segments;
                let i = (x.floor() as usize).min(stops.len() - 2);
                let c = stops[i].mix(stops[i + 1], x - i as f32);
                let c: Srgb<u8> = c.into_format();
                RGBColor(c.red, c.green, c.blue)
            })
            .collect();

        Ok(ColorMap { lut, vmin, vmax })
    }

    pub fn from_style(style: &FigureStyle) -> Result<Self> {
        ColorMap::new(&style.color_stops, style.levels, style.vmin, style.vmax)
    }

    /// Index into the quantised scale for a score.
    pub fn level(&self, value: f64) -> usize {
        let n = self.lut.len();
        let x = (value - self.vmin) / (self.vmax - self.vmin);
        if x <= 0.0 {
            0
        } else if x >= 1.0 {
            n - 1
        } else {
            ((x * n as f64) as usize).min(n - 1)
        }
    }

    /// Look up the colour for a score.
    pub fn color_for(&self, value: f64) -> RGBColor {
        self.lut[self.level(value)]
    }

    /// Cell colour; `None` for missing scores, which stay background.
    pub fn cell_color(&self, value: Option<f64>) -> Option<RGBColor> {
        value.filter(|v| !v.is_nan()).map(|v| self.color_for(v))
    }

    /// Colour at fraction `t` of the domain (0 = vmin, 1 = vmax).
    pub fn at_fraction(&self, t: f64) -> RGBColor {
        self.color_for(self.vmin + t * (self.vmax - self.vmin))
    }
}
