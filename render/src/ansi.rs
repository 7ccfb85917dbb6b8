//! ANSI Frame Formatter
//!
//! Thin serializer from a composited frame to ANSI text. Color changes
//! are emitted as runs (one escape per change, reset at row end), and
//! under a glyph-only capability the color channel is dropped entirely
//! while every glyph survives. Writing the result to a real terminal is
//! the host's job; nothing here touches stdout.

use std::fmt::Write;

use crossterm::style::{ResetColor, SetForegroundColor};
use ratatui::buffer::Buffer;
use ratatui::style::Color;

use crate::palette::ColorSupport;

/// Serialize a frame to ANSI text, one line per row
#[must_use]
pub fn to_ansi(buffer: &Buffer, support: ColorSupport) -> String {
    let area = buffer.area;
    let mut out = String::with_capacity(area.area() as usize * 2);

    for y in 0..area.height {
        let mut current: Option<Color> = None;
        for x in 0..area.width {
            let Some(cell) = buffer.cell((x, y)) else {
                continue;
            };
            if support == ColorSupport::Indexed256 {
                let fg = cell.fg;
                if current != Some(fg) {
                    if fg == Color::Reset {
                        let _ = write!(out, "{ResetColor}");
                    } else {
                        let _ = write!(out, "{}", SetForegroundColor(fg.into()));
                    }
                    current = Some(fg);
                }
            }
            out.push_str(cell.symbol());
        }
        if current.is_some_and(|c| c != Color::Reset) {
            let _ = write!(out, "{ResetColor}");
        }
        out.push('\n');
    }
    out
}
