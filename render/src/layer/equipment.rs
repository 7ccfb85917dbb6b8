//! Equipment Layer
//!
//! One glyph per equipment item, colored by operational status. The
//! kind→glyph mapping is a runtime-extensible lookup table, so hosts can
//! register new equipment kinds without touching this module; unknown
//! kinds fall back to a bullet.
//!
//! Status overlays are additive: a Failed item keeps its base glyph and
//! gains a 3x3 bordered `!` ring, a NeedsRepair item gains a `?` marker.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::style::Style;

use super::{layer_buffer, Layer, LayerZ};
use crate::draw::put_glyph;
use crate::palette::SharedPalette;
use crate::region::Region;
use crate::source::{EquipmentSource, EquipmentState, EquipmentStatus};
use crate::viewport::Viewport;

/// Default kind→glyph table
const DEFAULT_GLYPHS: &[(&str, char)] = &[
    ("outlet", '◉'),
    ("switch", '⊕'),
    ("panel", '▣'),
    ("light", '◎'),
    ("sensor", '◈'),
    ("alarm", '▲'),
    ("junction", '◫'),
    ("junction_box", '◫'),
    ("junction box", '◫'),
    ("appliance", '■'),
];

/// Glyph for kinds missing from the table
const FALLBACK_GLYPH: char = '•';

/// Draws equipment glyphs and status overlays from an equipment source
pub struct EquipmentLayer {
    name: String,
    visible: bool,
    source: Arc<dyn EquipmentSource>,
    palette: SharedPalette,
    glyphs: HashMap<String, char>,
    /// Equipment snapshot taken at the last update
    items: Vec<EquipmentState>,
    dirty: Vec<Region>,
}

impl EquipmentLayer {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn EquipmentSource>,
        palette: SharedPalette,
    ) -> Self {
        Self {
            name: name.into(),
            visible: true,
            source,
            palette,
            glyphs: DEFAULT_GLYPHS
                .iter()
                .map(|(kind, glyph)| ((*kind).to_string(), *glyph))
                .collect(),
            items: Vec::new(),
            dirty: vec![Region::FULL],
        }
    }

    /// Register or replace the glyph for an equipment kind
    pub fn set_glyph(&mut self, kind: impl Into<String>, glyph: char) {
        self.glyphs.insert(kind.into().to_lowercase(), glyph);
    }

    #[must_use]
    pub fn glyph_for(&self, kind: &str) -> char {
        self.glyphs
            .get(&kind.to_lowercase())
            .copied()
            .unwrap_or(FALLBACK_GLYPH)
    }

    /// Draw the 3x3 bordered `!` ring around a failed item
    ///
    /// The ring occupies the eight neighbors; the center keeps the base
    /// glyph, and the top edge carries the `!`.
    fn draw_failed_ring(buf: &mut Buffer, x: i32, y: i32, style: Style) {
        put_glyph(buf, x - 1, y - 1, '╭', style);
        put_glyph(buf, x + 1, y - 1, '╮', style);
        put_glyph(buf, x - 1, y + 1, '╰', style);
        put_glyph(buf, x + 1, y + 1, '╯', style);
        put_glyph(buf, x, y - 1, '!', style);
        put_glyph(buf, x, y + 1, '─', style);
        put_glyph(buf, x - 1, y, '│', style);
        put_glyph(buf, x + 1, y, '│', style);
    }
}

impl Layer for EquipmentLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn z(&self) -> LayerZ {
        LayerZ::Equipment
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn update(&mut self, _dt: Duration) {
        let items = self.source.equipment();
        if items != self.items {
            self.items = items;
            self.dirty.push(Region::FULL);
        }
    }

    fn render(&self, viewport: &Viewport) -> Buffer {
        let mut buf = layer_buffer(viewport);
        let palette = *self.palette.read().expect("palette lock poisoned");

        for item in self.items.iter().filter(|i| i.floor == viewport.floor) {
            let (x, y) = viewport.to_cell(item.x, item.y);
            let style = palette.style(palette.equipment_color(item.status));
            put_glyph(&mut buf, x, y, self.glyph_for(&item.kind), style);

            match item.status {
                EquipmentStatus::Failed => Self::draw_failed_ring(&mut buf, x, y, style),
                EquipmentStatus::NeedsRepair => put_glyph(&mut buf, x, y - 1, '?', style),
                _ => {}
            }
        }
        buf
    }

    fn mark_dirty(&mut self, region: Region) {
        self.dirty.push(region);
    }

    fn take_dirty(&mut self) -> Vec<Region> {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{ColorSupport, Palette, PaletteMode};
    use crate::source::StaticEquipment;
    use std::sync::RwLock;

    fn palette() -> SharedPalette {
        Arc::new(RwLock::new(Palette::new(
            PaletteMode::Default,
            ColorSupport::Indexed256,
        )))
    }

    fn item(id: &str, kind: &str, status: EquipmentStatus, x: f64, y: f64) -> EquipmentState {
        EquipmentState {
            id: id.into(),
            kind: kind.into(),
            status,
            x,
            y,
            floor: 0,
        }
    }

    fn rendered(items: Vec<EquipmentState>) -> Buffer {
        let source = Arc::new(StaticEquipment::new(items));
        let mut layer = EquipmentLayer::new("equipment", source, palette());
        layer.update(Duration::from_millis(33));
        layer.render(&Viewport::new(20, 10))
    }

    fn symbol(buf: &Buffer, x: u16, y: u16) -> String {
        buf.cell((x, y)).map(|c| c.symbol().to_string()).unwrap()
    }

    #[test]
    fn test_known_kind_glyph() {
        let buf = rendered(vec![item("o1", "outlet", EquipmentStatus::Operational, 5.0, 5.0)]);
        assert_eq!(symbol(&buf, 5, 5), "◉");
    }

    #[test]
    fn test_unknown_kind_falls_back() {
        let buf = rendered(vec![item("x", "quantum_flux", EquipmentStatus::Operational, 5.0, 5.0)]);
        assert_eq!(symbol(&buf, 5, 5), "•");
    }

    #[test]
    fn test_failed_ring_keeps_base_glyph() {
        let buf = rendered(vec![item("p1", "panel", EquipmentStatus::Failed, 5.0, 5.0)]);
        assert_eq!(symbol(&buf, 5, 5), "▣");
        assert_eq!(symbol(&buf, 5, 4), "!");
        assert_eq!(symbol(&buf, 4, 4), "╭");
        assert_eq!(symbol(&buf, 6, 4), "╮");
        assert_eq!(symbol(&buf, 4, 6), "╰");
        assert_eq!(symbol(&buf, 6, 6), "╯");
        assert_eq!(symbol(&buf, 4, 5), "│");
        assert_eq!(symbol(&buf, 5, 6), "─");
    }

    #[test]
    fn test_needs_repair_marker() {
        let buf = rendered(vec![item("s1", "sensor", EquipmentStatus::NeedsRepair, 3.0, 3.0)]);
        assert_eq!(symbol(&buf, 3, 3), "◈");
        assert_eq!(symbol(&buf, 3, 2), "?");
        // No ring for repairs
        assert_eq!(symbol(&buf, 2, 2), " ");
    }

    #[test]
    fn test_edge_item_clips_overlay() {
        // Failed at the origin: the ring's off-grid cells drop silently
        let buf = rendered(vec![item("a", "alarm", EquipmentStatus::Failed, 0.0, 0.0)]);
        assert_eq!(symbol(&buf, 0, 0), "▲");
        assert_eq!(symbol(&buf, 1, 0), "│");
        assert_eq!(symbol(&buf, 0, 1), "─");
        assert_eq!(symbol(&buf, 1, 1), "╯");
    }

    #[test]
    fn test_runtime_glyph_extension() {
        let source = Arc::new(StaticEquipment::new(vec![item(
            "t1",
            "turbine",
            EquipmentStatus::Operational,
            2.0,
            2.0,
        )]));
        let mut layer = EquipmentLayer::new("equipment", source, palette());
        layer.set_glyph("turbine", '✪');
        layer.update(Duration::from_millis(33));
        let buf = layer.render(&Viewport::new(10, 10));
        assert_eq!(symbol(&buf, 2, 2), "✪");
    }
}
