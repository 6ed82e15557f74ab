use crate::config::FigureStyle;

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }
}

/// Measured text sizes (pixels) the margins must accommodate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelExtents {
    pub row_label_w: u32,
    pub col_label_w: u32,
    pub col_label_h: u32,
    pub colorbar_tick_w: u32,
    pub colorbar_label_h: u32,
    pub title_h: u32,
}

/// Pixel geometry of the whole figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureLayout {
    pub width: u32,
    pub height: u32,
    /// Edge length of one square cell.
    pub cell: u32,
    pub grid: Rect,
    pub colorbar: Rect,
    /// Tick length and the gap between a tick and its label.
    pub tick: u32,
    pub label_gap: u32,
    /// Bottom edge of the title block.
    pub title_bottom: i32,
}

impl FigureLayout {
    /// Lay out a `n_rows × n_cols` grid.
    ///
    /// The canvas is the grid plus the style's fixed margins; a margin only
    /// grows when the measured labels would not fit in it.
    pub fn compute(
        n_rows: usize,
        n_cols: usize,
        style: &FigureStyle,
        extents: &LabelExtents,
    ) -> Self {
        let cell = style.px(style.cell_in).max(1);
        let grid_w = cell * n_cols as u32;
        let grid_h = cell * n_rows as u32;
        let tick = style.pt(style.tick_len_pt);
        let label_gap = style.pt(3.5);
        let frame = style.pt(style.frame_line_pt);
        let pad = style.px(style.crop_pad_in);

        let (sin, cos) = style.col_label_rotation_deg.to_radians().sin_cos();
        let rotated_w = extents.col_label_w as f64 * cos + extents.col_label_h as f64 * sin;
        let rotated_h = extents.col_label_w as f64 * sin + extents.col_label_h as f64 * cos;

        let left_needed = (extents.row_label_w + tick + label_gap + frame + pad)
            .max((rotated_w - cell as f64 / 2.0).max(0.0).ceil() as u32 + pad);
        let left = style.px(style.margin_left_in).max(left_needed);

        let title_pad = style.pt(style.title_pad_pt);
        let top = style
            .px(style.margin_top_in)
            .max(extents.title_h + title_pad + pad);

        let bottom_needed = frame + tick + label_gap + rotated_h.ceil() as u32 + pad;
        let bottom = style.px(style.margin_bottom_in).max(bottom_needed);

        let cb_pad = ((grid_w as f64 * style.colorbar_pad).round() as u32).max(label_gap);
        let cb_w = ((grid_w as f64 * style.colorbar_fraction).round() as u32).max(frame * 2);
        let right_needed = cb_pad
            + cb_w
            + tick
            + label_gap
            + extents.colorbar_tick_w
            + label_gap
            + extents.colorbar_label_h
            + pad;
        let right = style.px(style.margin_right_in).max(right_needed);

        let grid = Rect {
            x: left as i32,
            y: top as i32,
            w: grid_w,
            h: grid_h,
        };
        let colorbar = Rect {
            x: grid.right() + cb_pad as i32,
            y: grid.y,
            w: cb_w,
            h: grid_h,
        };

        FigureLayout {
            width: left + grid_w + right,
            height: top + grid_h + bottom,
            cell,
            grid,
            colorbar,
            tick,
            label_gap,
            title_bottom: grid.y - title_pad as i32,
        }
    }

    /// Top-left corner of a cell.
    pub fn cell_origin(&self, row: usize, col: usize) -> (i32, i32) {
        (
            self.grid.x + (col as u32 * self.cell) as i32,
            self.grid.y + (row as u32 * self.cell) as i32,
        )
    }

    /// Centre of a cell, where its ticks sit.
    pub fn cell_center(&self, row: usize, col: usize) -> (i32, i32) {
        let (x, y) = self.cell_origin(row, col);
        let half = (self.cell / 2) as i32;
        (x + half, y + half)
    }

    /// Vertical pixel of a score on the colour bar (vmax at the top).
    pub fn colorbar_y(&self, fraction: f64) -> i32 {
        let f = fraction.clamp(0.0, 1.0);
        self.colorbar.bottom() - (f * self.colorbar.h as f64).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(rows: usize, cols: usize) -> FigureLayout {
        FigureLayout::compute(rows, cols, &FigureStyle::default(), &LabelExtents::default())
    }

    #[test]
    fn default_figure_size_matches_inches() {
        // 0.3 in cells, 3 in extra width, 2 in extra height, 300 dpi.
        let l = layout(35, 8);
        assert_eq!(l.cell, 90);
        assert_eq!(l.width, ((8.0 * 0.3 + 3.0) * 300.0_f64).round() as u32);
        assert_eq!(l.height, ((35.0 * 0.3 + 2.0) * 300.0_f64).round() as u32);
    }

    #[test]
    fn canvas_grows_by_one_cell_per_row_and_column() {
        let a = layout(10, 8);
        let b = layout(11, 8);
        let c = layout(10, 9);
        assert_eq!(b.height - a.height, a.cell);
        assert_eq!(b.width, a.width);
        assert_eq!(c.width - a.width, a.cell);
    }

    #[test]
    fn cells_are_square_and_tile_the_grid() {
        let l = layout(4, 3);
        assert_eq!(l.grid.w, 3 * l.cell);
        assert_eq!(l.grid.h, 4 * l.cell);
        let (x0, y0) = l.cell_origin(0, 0);
        let (x1, y1) = l.cell_origin(1, 1);
        assert_eq!((x1 - x0, y1 - y0), (l.cell as i32, l.cell as i32));
        assert_eq!(l.cell_center(0, 0), (x0 + 45, y0 + 45));
    }

    #[test]
    fn colorbar_spans_grid_height_beside_it() {
        let l = layout(20, 8);
        assert_eq!(l.colorbar.y, l.grid.y);
        assert_eq!(l.colorbar.h, l.grid.h);
        assert!(l.colorbar.x > l.grid.right());
        assert!(l.colorbar.right() < l.width as i32);
        assert_eq!(l.colorbar_y(1.0), l.colorbar.y);
        assert_eq!(l.colorbar_y(0.0), l.colorbar.bottom());
    }

    #[test]
    fn long_labels_widen_margins() {
        let base = layout(5, 8);
        let extents = LabelExtents {
            row_label_w: 900,
            col_label_w: 800,
            col_label_h: 40,
            ..LabelExtents::default()
        };
        let wide = FigureLayout::compute(5, 8, &FigureStyle::default(), &extents);
        assert!(wide.grid.x > base.grid.x);
        assert!(wide.height > base.height);
        assert_eq!(wide.cell, base.cell);
    }
}
