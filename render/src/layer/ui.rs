//! UI Layer
//!
//! Screen-anchored HUD: a status line with the current floor, zoom, and
//! palette mode, plus any host-provided lines pinned to the top-left.
//! Unlike every other built-in this layer ignores world projection.

use std::time::Duration;

use ratatui::buffer::Buffer;

use super::{layer_buffer, Layer, LayerZ};
use crate::draw::draw_text;
use crate::palette::{PaletteMode, Rgb, SharedPalette};
use crate::viewport::Viewport;

/// Dim HUD text
const HUD_RGB: Rgb = Rgb::new(100, 100, 100);

fn mode_label(mode: PaletteMode) -> &'static str {
    match mode {
        PaletteMode::Default => "default",
        PaletteMode::Monochrome => "mono",
        PaletteMode::Accessibility => "access",
    }
}

/// Heads-up display layer
pub struct UiLayer {
    name: String,
    visible: bool,
    palette: SharedPalette,
    lines: Vec<String>,
    show_status: bool,
}

impl UiLayer {
    #[must_use]
    pub fn new(name: impl Into<String>, palette: SharedPalette) -> Self {
        Self {
            name: name.into(),
            visible: true,
            palette,
            lines: Vec::new(),
            show_status: true,
        }
    }

    /// Replace the host-provided lines shown at the top-left
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    /// Toggle the bottom status line
    pub fn set_show_status(&mut self, show: bool) {
        self.show_status = show;
    }
}

impl Layer for UiLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn z(&self) -> LayerZ {
        LayerZ::Ui
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn update(&mut self, _dt: Duration) {}

    fn render(&self, viewport: &Viewport) -> Buffer {
        let mut buf = layer_buffer(viewport);
        let palette = *self.palette.read().expect("palette lock poisoned");
        let style = palette.style(HUD_RGB);

        for (row, line) in self.lines.iter().enumerate() {
            draw_text(&mut buf, 0, row as i32, line, style);
        }

        if self.show_status && viewport.height > 0 {
            let status = format!(
                "floor {}  zoom {:.1}x  {}",
                viewport.floor,
                viewport.zoom(),
                mode_label(palette.mode()),
            );
            draw_text(
                &mut buf,
                0,
                i32::from(viewport.height) - 1,
                &status,
                style,
            );
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{ColorSupport, Palette};
    use std::sync::{Arc, RwLock};

    fn palette() -> SharedPalette {
        Arc::new(RwLock::new(Palette::new(
            PaletteMode::Default,
            ColorSupport::Indexed256,
        )))
    }

    #[test]
    fn test_status_line_contents() {
        let layer = UiLayer::new("hud", palette());
        let mut vp = Viewport::new(40, 10);
        vp.floor = 3;
        let buf = layer.render(&vp);
        let row: String = (0..40u16)
            .map(|x| buf.cell((x, 9u16)).unwrap().symbol().to_string())
            .collect();
        assert!(row.starts_with("floor 3  zoom 1.0x  default"));
    }

    #[test]
    fn test_host_lines_pinned_top_left() {
        let mut layer = UiLayer::new("hud", palette());
        layer.set_lines(vec!["Building A".into(), "12 alerts".into()]);
        let buf = layer.render(&Viewport::new(40, 10));
        assert_eq!(buf.cell((0u16, 0u16)).unwrap().symbol(), "B");
        assert_eq!(buf.cell((0u16, 1u16)).unwrap().symbol(), "1");
    }

    #[test]
    fn test_status_can_be_hidden() {
        let mut layer = UiLayer::new("hud", palette());
        layer.set_show_status(false);
        let vp = Viewport::new(40, 10);
        assert_eq!(layer.render(&vp), layer_buffer(&vp));
    }
}
