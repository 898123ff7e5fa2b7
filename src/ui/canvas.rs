#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use ratatui::{buffer::Buffer, layout::Rect, style::Color};

use crate::fx::{DrawingSurface, surface::{PixelRect, Point, Rgba}};

/// Logical pixels covered by one terminal cell.
pub const CELL_WIDTH_PX: f32 = 8.0;
pub const CELL_HEIGHT_PX: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub color: Rgba,
}

/// A drawing surface rasterized onto terminal cells.
///
/// Each cell keeps the most opaque glyph drawn into it; gradients become a
/// per-row haze that tints the cell background.
#[derive(Debug, Clone, Default)]
pub struct CellCanvas {
    cols: u16,
    rows: u16,
    cells: Vec<Option<Glyph>>,
    haze: Vec<Option<Rgba>>,
}

impl CellCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn glyph(&self, col: u16, row: u16) -> Option<Glyph> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells[usize::from(row) * usize::from(self.cols) + usize::from(col)]
    }

    pub fn haze(&self, row: u16) -> Option<Rgba> {
        self.haze.get(usize::from(row)).copied().flatten()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none) && self.haze.iter().all(Option::is_none)
    }

    /// Composites this layer over whatever `buf` already holds in `area`.
    pub fn paint(&self, area: Rect, buf: &mut Buffer) {
        let rows = self.rows.min(area.height);
        let cols = self.cols.min(area.width);
        for row in 0..rows {
            let haze = self.haze(row);
            for col in 0..cols {
                let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) else {
                    continue;
                };
                let under = color_to_rgb(cell.bg);
                let bg = haze.map_or(under, |tint| blend(tint, under));
                cell.set_bg(Color::Rgb(bg.0, bg.1, bg.2));
                if let Some(glyph) = self.glyph(col, row) {
                    let fg = blend(glyph.color, bg);
                    cell.set_char(glyph.ch).set_fg(Color::Rgb(fg.0, fg.1, fg.2));
                }
            }
        }
    }

    fn cell_at(&self, x: f32, y: f32) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / CELL_WIDTH_PX) as usize;
        let row = (y / CELL_HEIGHT_PX) as usize;
        (col < usize::from(self.cols) && row < usize::from(self.rows))
            .then(|| row * usize::from(self.cols) + col)
    }

    fn plot(&mut self, x: f32, y: f32, ch: char, color: Rgba) {
        let Some(idx) = self.cell_at(x, y) else {
            return;
        };
        let slot = &mut self.cells[idx];
        if slot.is_none_or(|existing| existing.color.a < color.a) {
            *slot = Some(Glyph { ch, color });
        }
    }
}

impl DrawingSurface for CellCanvas {
    fn set_backing_size(&mut self, width: u32, height: u32, scale: f32) {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let to_cells = |px: u32, cell: f32| {
            ((px as f32 / scale) / cell).ceil().clamp(0.0, f32::from(u16::MAX)) as u16
        };
        self.cols = to_cells(width, CELL_WIDTH_PX);
        self.rows = to_cells(height, CELL_HEIGHT_PX);
        let len = usize::from(self.cols) * usize::from(self.rows);
        self.cells = vec![None; len];
        self.haze = vec![None; usize::from(self.rows)];
    }

    fn clear(&mut self) {
        self.cells.fill(None);
        self.haze.fill(None);
    }

    fn fill_vertical_gradient(&mut self, area: PixelRect, top: Rgba, bottom: Rgba) {
        if area.height.is_nan() || area.height <= 0.0 {
            return;
        }
        for row in 0..self.rows {
            let center = (f32::from(row) + 0.5) * CELL_HEIGHT_PX;
            if center < area.y || center > area.y + area.height {
                continue;
            }
            let t = ((center - area.y) / area.height).clamp(0.0, 1.0);
            self.haze[usize::from(row)] = Some(mix_rgba(top, bottom, t));
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, _width: f32, color: Rgba) {
        let dx = (to.x - from.x) / CELL_WIDTH_PX;
        let dy = (to.y - from.y) / CELL_HEIGHT_PX;
        let ch = if dx.abs() * 3.0 < dy.abs() {
            '│'
        } else if (dx < 0.0) == (dy > 0.0) {
            '╱'
        } else {
            '╲'
        };
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.plot(
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
                ch,
                color,
            );
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        let ch = if radius < 2.0 {
            '·'
        } else if radius < 3.0 {
            '•'
        } else {
            '*'
        };
        self.plot(center.x, center.y, ch, color);
    }

    fn stroke_ellipse(
        &mut self,
        center: Point,
        radius_x: f32,
        _radius_y: f32,
        _width: f32,
        color: Rgba,
    ) {
        self.plot(center.x - radius_x, center.y, '.', color);
        self.plot(center.x + radius_x, center.y, '.', color);
    }
}

fn mix_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    Rgba::new(
        mix(a.r, b.r),
        mix(a.g, b.g),
        mix(a.b, b.b),
        a.a + (b.a - a.a) * t,
    )
}

/// Source-over blend of `over` onto an opaque colour.
pub fn blend(over: Rgba, under: (u8, u8, u8)) -> (u8, u8, u8) {
    let a = over.a.clamp(0.0, 1.0);
    let mix = |src: u8, dst: u8| {
        (f32::from(src) * a + f32::from(dst) * (1.0 - a))
            .round()
            .clamp(0.0, 255.0) as u8
    };
    (mix(over.r, under.0), mix(over.g, under.1), mix(over.b, under.2))
}

fn color_to_rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::White => (255, 255, 255),
        Color::Gray => (170, 170, 170),
        Color::DarkGray => (85, 85, 85),
        _ => (0, 0, 0),
    }
}
