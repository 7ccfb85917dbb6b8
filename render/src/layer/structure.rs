//! Structure Layer
//!
//! Static room boundaries: box-drawing outlines with centered, truncating
//! labels. Label color comes from keyword matching on the room kind/name
//! ("mechanical" rooms read blue, "electrical" yellow) so a floor plan is
//! scannable without a legend.

use std::sync::Arc;
use std::time::Duration;

use ratatui::buffer::Buffer;

use super::{layer_buffer, Layer, LayerZ};
use crate::draw::draw_box;
use crate::palette::{Rgb, SharedPalette};
use crate::region::Region;
use crate::source::{Room, StructureSource};
use crate::viewport::Viewport;

/// Wall color, fixed so rooms of every kind share one outline weight
const WALL_RGB: Rgb = Rgb::new(110, 110, 120);

/// Draws room outlines and labels from a structure source
pub struct StructureLayer {
    name: String,
    visible: bool,
    source: Arc<dyn StructureSource>,
    palette: SharedPalette,
    /// Room snapshot taken at the last update
    rooms: Vec<Room>,
    dirty: Vec<Region>,
}

impl StructureLayer {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn StructureSource>,
        palette: SharedPalette,
    ) -> Self {
        Self {
            name: name.into(),
            visible: true,
            source,
            palette,
            rooms: Vec::new(),
            dirty: vec![Region::FULL],
        }
    }

    /// Rooms currently cached from the source
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Layer for StructureLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn z(&self) -> LayerZ {
        LayerZ::Structure
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn update(&mut self, _dt: Duration) {
        let rooms = self.source.rooms();
        if rooms != self.rooms {
            self.rooms = rooms;
            self.dirty.push(Region::FULL);
        }
    }

    fn render(&self, viewport: &Viewport) -> Buffer {
        let mut buf = layer_buffer(viewport);
        let palette = *self.palette.read().expect("palette lock poisoned");

        for room in self.rooms.iter().filter(|r| r.floor == viewport.floor) {
            let (x0, y0) = viewport.to_cell(room.x, room.y);
            let (x1, y1) = viewport.to_cell(room.x + room.width, room.y + room.height);
            let width = x1 - x0 + 1;
            let height = y1 - y0 + 1;

            let label_rgb = palette.structural_color(&room.kind);
            let label = if room.name.is_empty() {
                None
            } else {
                Some((room.name.as_str(), palette.style(label_rgb)))
            };
            draw_box(
                &mut buf,
                x0,
                y0,
                width,
                height,
                palette.style(WALL_RGB),
                label,
            );
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
