//! Drawing Primitives
//!
//! Bounds-safe cell, text, line, and box routines shared by every layer.
//! All writes silently clip to the target buffer: drawing off-grid is
//! always a no-op, never a panic.

use ratatui::buffer::Buffer;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;

use crate::palette::{gradient, Palette, Rgb};

/// Top-left, top-right, bottom-left, bottom-right corner glyphs
pub const CORNERS: [char; 4] = ['╭', '╮', '╰', '╯'];

/// Horizontal and vertical wall glyphs
pub const WALL_H: char = '─';
pub const WALL_V: char = '│';

/// Glyph for rooms collapsed below 2x2 cells by zoom
const COLLAPSED_BOX: char = '□';

/// Write one glyph, silently dropping out-of-buffer coordinates
pub fn put_glyph(buf: &mut Buffer, x: i32, y: i32, glyph: char, style: Style) {
    let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
        return;
    };
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(glyph);
        cell.set_style(style);
    }
}

/// Write a string left-to-right, clipping per glyph
///
/// Wide glyphs advance by their display width so following glyphs never
/// overlap them.
pub fn draw_text(buf: &mut Buffer, x: i32, y: i32, text: &str, style: Style) {
    let mut cx = x;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0) as i32;
        if w == 0 {
            continue;
        }
        put_glyph(buf, cx, y, ch, style);
        cx += w;
    }
}

/// Cells along a Bresenham line, endpoints inclusive
#[must_use]
pub fn line_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;

    loop {
        points.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Draw a line of one glyph/style
pub fn draw_line(buf: &mut Buffer, x0: i32, y0: i32, x1: i32, y1: i32, glyph: char, style: Style) {
    for (x, y) in line_points(x0, y0, x1, y1) {
        put_glyph(buf, x, y, glyph, style);
    }
}

/// Draw a line whose color walks the gradient per line step
///
/// The gradient is interpolated over the number of steps, not pixel
/// distance, so a 3-cell line and a 300-cell line both traverse the full
/// `start..end` range. `offset` rotates the color assignment, which a
/// caller can advance each tick for a moving-pulse effect.
pub fn draw_gradient_line(
    buf: &mut Buffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    glyph: char,
    start: Rgb,
    end: Rgb,
    palette: &Palette,
    offset: usize,
) {
    let points = line_points(x0, y0, x1, y1);
    let colors = gradient(start, end, points.len());
    for (i, (x, y)) in points.iter().enumerate() {
        let color = colors[(i + offset) % colors.len().max(1)];
        put_glyph(buf, *x, *y, glyph, palette.style(color));
    }
}

/// Draw a box outline: four distinct corners, straight walls, and an
/// optional centered label truncated to the interior width
pub fn draw_box(
    buf: &mut Buffer,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    style: Style,
    label: Option<(&str, Style)>,
) {
    if width <= 0 || height <= 0 {
        return;
    }
    if width < 2 || height < 2 {
        put_glyph(buf, x, y, COLLAPSED_BOX, style);
        return;
    }

    let right = x + width - 1;
    let bottom = y + height - 1;

    put_glyph(buf, x, y, CORNERS[0], style);
    put_glyph(buf, right, y, CORNERS[1], style);
    put_glyph(buf, x, bottom, CORNERS[2], style);
    put_glyph(buf, right, bottom, CORNERS[3], style);

    for cx in (x + 1)..right {
        put_glyph(buf, cx, y, WALL_H, style);
        put_glyph(buf, cx, bottom, WALL_H, style);
    }
    for cy in (y + 1)..bottom {
        put_glyph(buf, x, cy, WALL_V, style);
        put_glyph(buf, right, cy, WALL_V, style);
    }

    if let Some((text, label_style)) = label {
        let interior = width - 2;
        if interior <= 0 || height < 3 || text.is_empty() {
            return;
        }
        let truncated = truncate_to_width(text, interior as usize);
        let used = truncated
            .chars()
            .map(|c| c.width().unwrap_or(0))
            .sum::<usize>() as i32;
        let label_x = x + 1 + (interior - used) / 2;
        let label_y = y + height / 2;
        draw_text(buf, label_x, label_y, &truncated, label_style);
    }
}

/// Truncate a string to a display-cell budget
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}
