//! Compositor
//!
//! Merges ordered layer grids into one frame with painter's-algorithm
//! occlusion: the output starts as background fill, then each grid is
//! applied in ascending z and every non-transparent cell overwrites the
//! accumulated cell. Glyph+color pairs don't blend, so there is no alpha;
//! a cell whose symbol is a plain space counts as transparent and lets
//! lower layers show through.

use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::Style;

/// Symbol treated as "unwritten" in layer grids
const TRANSPARENT: &str = " ";

/// Merges layer grids over a background cell
#[derive(Clone, Debug)]
pub struct Compositor {
    background: Cell,
}

impl Compositor {
    /// Compositor with the given background glyph and style
    #[must_use]
    pub fn new(glyph: char, style: Style) -> Self {
        let mut background = Cell::default();
        background.set_char(glyph);
        background.set_style(style);
        Self { background }
    }

    /// Swap the background cell (palette mode changes re-derive this)
    pub fn set_background(&mut self, glyph: char, style: Style) {
        let mut background = Cell::default();
        background.set_char(glyph);
        background.set_style(style);
        self.background = background;
    }

    #[must_use]
    pub fn background(&self) -> &Cell {
        &self.background
    }

    /// Composite grids (ascending z) into a `width` x `height` frame
    ///
    /// The output size is always exactly `width` x `height`: source cells
    /// beyond those bounds are dropped, never an error.
    #[must_use]
    pub fn composite(&self, grids: &[Buffer], width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut output = Buffer::filled(area, self.background.clone());

        for grid in grids {
            let src_area = grid.area;
            let copy_w = src_area.width.min(width);
            let copy_h = src_area.height.min(height);
            for y in 0..copy_h {
                for x in 0..copy_w {
                    let Some(src) = grid.cell((x, y)) else {
                        continue;
                    };
                    if src.symbol() == TRANSPARENT {
                        continue;
                    }
                    if let Some(dst) = output.cell_mut((x, y)) {
                        *dst = src.clone();
                    }
                }
            }
        }
        output
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(' ', Style::default())
    }
}
