use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::layout::{FigureLayout, LabelExtents, Rect};
use super::raster::blit_rotated;
use crate::color::ColorMap;
use crate::config::FigureStyle;
use crate::data::matrix::ScoreMatrix;
use crate::error::{HeatmapError, Result};

/// Margin around text rasterised off-screen before rotation.
const TEXT_PAD: u32 = 4;

fn render_err<E: std::fmt::Display>(e: E) -> HeatmapError {
    HeatmapError::Render(e.to_string())
}

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

struct Fonts<'a> {
    title: FontDesc<'a>,
    row: FontDesc<'a>,
    col: FontDesc<'a>,
    cbar_tick: FontDesc<'a>,
    cbar_label: FontDesc<'a>,
}

impl<'a> Fonts<'a> {
    fn new(style: &'a FigureStyle) -> Self {
        let family = || FontFamily::from(style.font_family.as_str());
        let font = |pt: f64, weight: FontStyle| {
            FontDesc::new(family(), style.pt(pt) as f64, weight)
        };
        Fonts {
            title: font(style.title_pt, FontStyle::Bold),
            row: font(style.row_label_pt, FontStyle::Normal),
            col: font(style.col_label_pt, FontStyle::Normal),
            cbar_tick: font(style.colorbar_tick_pt, FontStyle::Normal),
            cbar_label: font(style.colorbar_label_pt, FontStyle::Normal),
        }
    }
}

fn max_box<'s>(font: &FontDesc, texts: impl IntoIterator<Item = &'s str>) -> Result<(u32, u32)> {
    let mut best = (0, 0);
    for text in texts {
        let (w, h) = font.box_size(text).map_err(render_err)?;
        best = (best.0.max(w), best.1.max(h));
    }
    Ok(best)
}

fn tick_text(value: f64) -> String {
    format!("{value:.1}")
}

fn measure(matrix: &ScoreMatrix, style: &FigureStyle, fonts: &Fonts) -> Result<LabelExtents> {
    let (row_label_w, _) = max_box(&fonts.row, matrix.row_labels.iter().map(String::as_str))?;
    let (col_label_w, col_label_h) =
        max_box(&fonts.col, matrix.col_labels.iter().map(String::as_str))?;
    let ticks: Vec<String> = style.colorbar_ticks.iter().map(|&v| tick_text(v)).collect();
    let (colorbar_tick_w, _) = max_box(&fonts.cbar_tick, ticks.iter().map(String::as_str))?;
    let (_, colorbar_label_h) = max_box(&fonts.cbar_label, [style.colorbar_label.as_str()])?;

    let mut title_h = 0;
    for line in &style.title {
        let (_, h) = fonts.title.box_size(line).map_err(render_err)?;
        title_h += h + h / 5;
    }

    Ok(LabelExtents {
        row_label_w,
        col_label_w,
        col_label_h,
        colorbar_tick_w,
        colorbar_label_h,
        title_h,
    })
}

// ---------------------------------------------------------------------------
// Primitive helpers
// ---------------------------------------------------------------------------

type Area<'b> = DrawingArea<BitMapBackend<'b>, Shift>;

/// Fill `w × h` pixels starting at `(x, y)`.
///
/// The bitmap backend paints nothing for a rectangle whose corners share a
/// row or column, so one-pixel strips are set pixel by pixel.
fn fill_rect(area: &Area, x: i32, y: i32, w: u32, h: u32, color: RGBColor) -> Result<()> {
    if w == 0 || h == 0 {
        return Ok(());
    }
    if w == 1 || h == 1 {
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                area.draw_pixel((x + dx, y + dy), &color).map_err(render_err)?;
            }
        }
        return Ok(());
    }
    area.draw(&Rectangle::new(
        [(x, y), (x + w as i32 - 1, y + h as i32 - 1)],
        color.filled(),
    ))
    .map_err(render_err)
}

/// Outline drawn as four bars of `thickness` centred on the edges of `r`.
fn outline(area: &Area, r: Rect, thickness: u32, color: RGBColor) -> Result<()> {
    let half = (thickness / 2) as i32;
    let outer_w = r.w + thickness;
    let outer_h = r.h + thickness;
    fill_rect(area, r.x - half, r.y - half, outer_w, thickness, color)?;
    fill_rect(area, r.x - half, r.bottom() - half, outer_w, thickness, color)?;
    fill_rect(area, r.x - half, r.y - half, thickness, outer_h, color)?;
    fill_rect(area, r.right() - half, r.y - half, thickness, outer_h, color)
}

fn text(area: &Area, s: &str, at: (i32, i32), font: &FontDesc, pos: Pos) -> Result<()> {
    area.draw(&Text::new(s.to_string(), at, font.color(&BLACK).pos(pos)))
        .map_err(render_err)
}

/// Rasterise `s` horizontally on a white tile for later rotation.
fn text_tile(s: &str, font: &FontDesc) -> Result<RgbImage> {
    let (w, h) = font.box_size(s).map_err(render_err)?;
    let (w, h) = (w + 2 * TEXT_PAD, h + 2 * TEXT_PAD);
    let mut buf = vec![255u8; (w * h * 3) as usize];
    {
        let area = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        text(&area, s, (TEXT_PAD as i32, TEXT_PAD as i32), font, Pos::new(HPos::Left, VPos::Top))?;
        area.present().map_err(render_err)?;
    }
    RgbImage::from_raw(w, h, buf).ok_or_else(|| render_err("text tile buffer size mismatch"))
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// Draw the ordered matrix into an uncropped RGB image.
pub fn draw_figure(matrix: &ScoreMatrix, style: &FigureStyle, cmap: &ColorMap) -> Result<RgbImage> {
    if matrix.is_empty() || matrix.n_cols() == 0 {
        return Err(HeatmapError::EmptyMatrix);
    }
    let fonts = Fonts::new(style);
    let extents = measure(matrix, style, &fonts)?;
    let layout = FigureLayout::compute(matrix.n_rows(), matrix.n_cols(), style, &extents);
    log::debug!(
        "Canvas {}×{} px, cell {} px, grid at ({}, {})",
        layout.width,
        layout.height,
        layout.cell,
        layout.grid.x,
        layout.grid.y
    );

    let mut buf = vec![255u8; layout.width as usize * layout.height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (layout.width, layout.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        draw_grid(&root, matrix, style, cmap, &layout)?;
        draw_row_labels(&root, matrix, style, &fonts, &layout)?;
        draw_colorbar(&root, style, cmap, &layout)?;
        draw_colorbar_tick_labels(&root, style, &fonts, &layout)?;
        draw_title(&root, style, &fonts, &layout)?;
        root.present().map_err(render_err)?;
    }
    let mut img = RgbImage::from_raw(layout.width, layout.height, buf)
        .ok_or_else(|| render_err("canvas buffer size mismatch"))?;

    draw_col_labels(&mut img, matrix, style, &fonts, &layout)?;
    draw_colorbar_label(&mut img, style, &fonts, &extents, &layout)?;
    Ok(img)
}

fn draw_grid(
    area: &Area,
    matrix: &ScoreMatrix,
    style: &FigureStyle,
    cmap: &ColorMap,
    layout: &FigureLayout,
) -> Result<()> {
    let cell = layout.cell;
    for r in 0..matrix.n_rows() {
        for (c, value) in matrix.row(r).iter().enumerate() {
            if let Some(color) = cmap.cell_color(*value) {
                let (x, y) = layout.cell_origin(r, c);
                fill_rect(area, x, y, cell, cell, color)?;
            }
        }
    }

    // White separators on every cell boundary, then the black frame.
    let line = style.pt(style.grid_line_pt);
    let half = (line / 2) as i32;
    let g = layout.grid;
    for i in 0..=matrix.n_rows() {
        let y = g.y + (i as u32 * cell) as i32;
        fill_rect(area, g.x, y - half, g.w, line, WHITE)?;
    }
    for j in 0..=matrix.n_cols() {
        let x = g.x + (j as u32 * cell) as i32;
        fill_rect(area, x - half, g.y, line, g.h, WHITE)?;
    }
    let frame = style.pt(style.frame_line_pt);
    outline(area, g, frame, BLACK)?;

    // One tick per column below the grid, one per row to its left.
    let tick_w = style.pt(style.tick_width_pt);
    let tick_half = (tick_w / 2) as i32;
    let frame_half = (frame / 2) as i32;
    for j in 0..matrix.n_cols() {
        let (cx, _) = layout.cell_center(0, j);
        fill_rect(area, cx - tick_half, g.bottom() + frame_half, tick_w, layout.tick, BLACK)?;
    }
    for i in 0..matrix.n_rows() {
        let (_, cy) = layout.cell_center(i, 0);
        let x = g.x - frame_half - layout.tick as i32;
        fill_rect(area, x, cy - tick_half, layout.tick, tick_w, BLACK)?;
    }
    Ok(())
}

fn draw_row_labels(
    area: &Area,
    matrix: &ScoreMatrix,
    style: &FigureStyle,
    fonts: &Fonts,
    layout: &FigureLayout,
) -> Result<()> {
    let frame_half = (style.pt(style.frame_line_pt) / 2) as i32;
    let x = layout.grid.x - frame_half - (layout.tick + layout.label_gap) as i32;
    for (i, label) in matrix.row_labels.iter().enumerate() {
        let (_, cy) = layout.cell_center(i, 0);
        text(area, label, (x, cy), &fonts.row, Pos::new(HPos::Right, VPos::Center))?;
    }
    Ok(())
}

/// Colour of the colour bar's `dy`-th pixel row, top (vmax) to bottom.
fn colorbar_row_color(cmap: &ColorMap, dy: u32, h: u32) -> RGBColor {
    cmap.at_fraction(1.0 - (dy as f64 + 0.5) / h as f64)
}

/// Gradient, frame and tick marks of the colour bar.
fn draw_colorbar(
    area: &Area,
    style: &FigureStyle,
    cmap: &ColorMap,
    layout: &FigureLayout,
) -> Result<()> {
    let cb = layout.colorbar;
    // Consecutive rows share a quantised level; paint each run as one block.
    let mut run_start = 0;
    while run_start < cb.h {
        let color = colorbar_row_color(cmap, run_start, cb.h);
        let mut run_end = run_start + 1;
        while run_end < cb.h && colorbar_row_color(cmap, run_end, cb.h) == color {
            run_end += 1;
        }
        fill_rect(area, cb.x, cb.y + run_start as i32, cb.w, run_end - run_start, color)?;
        run_start = run_end;
    }
    let frame = style.pt(style.frame_line_pt);
    outline(area, cb, frame, BLACK)?;

    let tick_w = style.pt(style.tick_width_pt);
    let x = cb.right() + (frame / 2) as i32;
    for (_, fraction) in colorbar_ticks(style) {
        let y = layout.colorbar_y(fraction);
        fill_rect(area, x, y - (tick_w / 2) as i32, layout.tick, tick_w, BLACK)?;
    }
    Ok(())
}

/// Tick values inside the colour domain with their bar fraction.
fn colorbar_ticks(style: &FigureStyle) -> impl Iterator<Item = (f64, f64)> + '_ {
    let span = style.vmax - style.vmin;
    style
        .colorbar_ticks
        .iter()
        .map(move |&value| (value, (value - style.vmin) / span))
        .filter(|(_, fraction)| (0.0..=1.0).contains(fraction))
}

fn draw_colorbar_tick_labels(
    area: &Area,
    style: &FigureStyle,
    fonts: &Fonts,
    layout: &FigureLayout,
) -> Result<()> {
    let frame = style.pt(style.frame_line_pt);
    let x = layout.colorbar.right() + (frame / 2) as i32 + (layout.tick + layout.label_gap) as i32;
    for (value, fraction) in colorbar_ticks(style) {
        text(
            area,
            &tick_text(value),
            (x, layout.colorbar_y(fraction)),
            &fonts.cbar_tick,
            Pos::new(HPos::Left, VPos::Center),
        )?;
    }
    Ok(())
}

fn draw_title(area: &Area, style: &FigureStyle, fonts: &Fonts, layout: &FigureLayout) -> Result<()> {
    let cx = layout.grid.x + (layout.grid.w / 2) as i32;
    // Lines stack upwards from the title baseline, last line lowest.
    let mut y = layout.title_bottom;
    for line in style.title.iter().rev() {
        let (_, h) = fonts.title.box_size(line).map_err(render_err)?;
        text(area, line, (cx, y), &fonts.title, Pos::new(HPos::Center, VPos::Bottom))?;
        y -= (h + h / 5) as i32;
    }
    Ok(())
}

/// Column labels are rotated so their right end sits under the column tick.
fn draw_col_labels(
    img: &mut RgbImage,
    matrix: &ScoreMatrix,
    style: &FigureStyle,
    fonts: &Fonts,
    layout: &FigureLayout,
) -> Result<()> {
    let angle = style.col_label_rotation_deg;
    let frame_half = (style.pt(style.frame_line_pt) / 2) as f64;
    let top = layout.grid.bottom() as f64 + frame_half + (layout.tick + layout.label_gap) as f64;
    for (j, label) in matrix.col_labels.iter().enumerate() {
        let tile = text_tile(label, &fonts.col)?;
        let (cx, _) = layout.cell_center(0, j);
        let half_h = (tile.height() - 2 * TEXT_PAD) as f64 / 2.0;
        let src_anchor = ((tile.width() - TEXT_PAD) as f64, tile.height() as f64 / 2.0);
        let dst_anchor = (cx as f64, top + half_h * angle.to_radians().cos());
        blit_rotated(img, &tile, src_anchor, dst_anchor, angle);
    }
    Ok(())
}

/// Colour bar label, reading bottom to top beside the tick labels.
fn draw_colorbar_label(
    img: &mut RgbImage,
    style: &FigureStyle,
    fonts: &Fonts,
    extents: &LabelExtents,
    layout: &FigureLayout,
) -> Result<()> {
    if style.colorbar_label.is_empty() {
        return Ok(());
    }
    let tile = text_tile(&style.colorbar_label, &fonts.cbar_label)?;
    let cb = layout.colorbar;
    let x = cb.right() as f64
        + (style.pt(style.frame_line_pt) / 2) as f64
        + (layout.tick + 2 * layout.label_gap) as f64
        + extents.colorbar_tick_w as f64
        + tile.height() as f64 / 2.0;
    let y = cb.y as f64 + cb.h as f64 / 2.0;
    let src_anchor = (tile.width() as f64 / 2.0, tile.height() as f64 / 2.0);
    blit_rotated(img, &tile, src_anchor, (x, y), 90.0);
    Ok(())
}
