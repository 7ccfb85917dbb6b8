//! Annotation Layer
//!
//! World-anchored text markers: inspection notes, sensor readouts,
//! anything a host wants pinned to a position on a floor.

use std::time::Duration;

use ratatui::buffer::Buffer;

use super::{layer_buffer, Layer, LayerZ};
use crate::draw::draw_text;
use crate::palette::{Rgb, SharedPalette};
use crate::viewport::{FloorId, Viewport};

/// One pinned marker
#[derive(Clone, Debug)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub floor: FloorId,
    pub text: String,
    pub color: Rgb,
}

/// Renders pinned text markers
pub struct AnnotationLayer {
    name: String,
    visible: bool,
    palette: SharedPalette,
    annotations: Vec<Annotation>,
}

impl AnnotationLayer {
    #[must_use]
    pub fn new(name: impl Into<String>, palette: SharedPalette) -> Self {
        Self {
            name: name.into(),
            visible: true,
            palette,
            annotations: Vec::new(),
        }
    }

    pub fn add(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Keep only the annotations matching a predicate
    pub fn retain(&mut self, keep: impl FnMut(&Annotation) -> bool) {
        self.annotations.retain(keep);
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

impl Layer for AnnotationLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn z(&self) -> LayerZ {
        LayerZ::Annotations
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

        for note in self
            .annotations
            .iter()
            .filter(|a| a.floor == viewport.floor)
        {
            let (x, y) = viewport.to_cell(note.x, note.y);
            draw_text(&mut buf, x, y, &note.text, palette.style(note.color));
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{ColorSupport, Palette, PaletteMode};
    use std::sync::{Arc, RwLock};

    fn palette() -> SharedPalette {
        Arc::new(RwLock::new(Palette::new(
            PaletteMode::Default,
            ColorSupport::Indexed256,
        )))
    }

    #[test]
    fn test_marker_lands_at_projection() {
        let mut layer = AnnotationLayer::new("notes", palette());
        layer.add(Annotation {
            x: 4.0,
            y: 2.0,
            floor: 0,
            text: "leak?".into(),
            color: Rgb::new(255, 210, 80),
        });
        let buf = layer.render(&Viewport::new(20, 10));
        assert_eq!(buf.cell((4u16, 2u16)).unwrap().symbol(), "l");
        assert_eq!(buf.cell((8u16, 2u16)).unwrap().symbol(), "?");
    }

    #[test]
    fn test_other_floor_hidden() {
        let mut layer = AnnotationLayer::new("notes", palette());
        layer.add(Annotation {
            x: 4.0,
            y: 2.0,
            floor: 5,
            text: "hi".into(),
            color: Rgb::new(255, 255, 255),
        });
        let vp = Viewport::new(20, 10);
        assert_eq!(layer.render(&vp), layer_buffer(&vp));
    }

    #[test]
    fn test_retain_and_clear() {
        let mut layer = AnnotationLayer::new("notes", palette());
        for floor in 0..3 {
            layer.add(Annotation {
                x: 0.0,
                y: 0.0,
                floor,
                text: "x".into(),
                color: Rgb::new(255, 255, 255),
            });
        }
        layer.retain(|a| a.floor != 1);
        assert_eq!(layer.len(), 2);
        layer.clear();
        assert!(layer.is_empty());
    }
}
