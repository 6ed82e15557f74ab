use crate::data::order::{CategoryBand, RowOrder};

/// Console lines printed after a successful run: the row total and one line
/// per category band, with boundaries taken from the computed order.
pub fn summary_lines(order: &RowOrder) -> Vec<String> {
    let mut lines = Vec::with_capacity(order.bands.len() + 1);
    lines.push(format!("Heatmap generated: {} proteins", order.rows.len()));
    lines.extend(order.bands.iter().map(band_line));
    lines
}

fn band_line(band: &CategoryBand) -> String {
    match band.end() {
        Some(end) => format!(
            "{}: rows {}-{} ({} proteins)",
            band.name, band.start, end, band.len
        ),
        None => format!("{}: none (0 proteins)", band.name),
    }
}
