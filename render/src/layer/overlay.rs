//! Color Overlay Layer
//!
//! Heat-map style overlays for scalar fields (temperature, energy). Each
//! cell gets both a density glyph and a palette color, double-encoding
//! intensity so the overlay survives glyph-only terminals unchanged.
//!
//! Flow paths add animated gradient lines: the gradient's color
//! assignment rotates a step per tick, which reads as a pulse traveling
//! along the path.

use std::sync::Arc;
use std::time::Duration;

use ratatui::buffer::Buffer;

use super::{layer_buffer, Layer, LayerZ};
use crate::animation::{Easing, Pulse};
use crate::draw::{draw_gradient_line, put_glyph};
use crate::motion::{detect_motion_preference, MotionPreference};
use crate::palette::{Palette, Rgb, SharedPalette};
use crate::source::FieldSource;
use crate::viewport::{FloorId, Viewport};

/// Which semantic ramp the overlay reads
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    Temperature,
    Energy,
}

/// Density glyph thresholds: below the first value the cell stays clear
const DENSITY_THRESHOLDS: [(f32, char); 3] = [(0.5, '░'), (0.75, '▒'), (f32::MAX, '▓')];

/// Intensity below which a cell stays transparent
const DENSITY_FLOOR: f32 = 0.25;

/// Glyph used along flow paths
const FLOW_GLYPH: char = '~';

/// Seconds for a pulse to travel one full gradient cycle
const PULSE_PERIOD_SECS: f32 = 1.2;

/// An animated gradient path in world coordinates
#[derive(Clone, Debug)]
pub struct FlowPath {
    pub points: Vec<(f64, f64)>,
    pub start: Rgb,
    pub end: Rgb,
    pub floor: FloorId,
}

/// Scalar-field overlay with animated flow effects
pub struct ColorOverlayLayer {
    name: String,
    visible: bool,
    kind: OverlayKind,
    field: Arc<dyn FieldSource>,
    palette: SharedPalette,
    flows: Vec<FlowPath>,
    pulse: Pulse,
    motion: MotionPreference,
}

impl ColorOverlayLayer {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: OverlayKind,
        field: Arc<dyn FieldSource>,
        palette: SharedPalette,
    ) -> Self {
        Self {
            name: name.into(),
            visible: true,
            kind,
            field,
            palette,
            flows: Vec::new(),
            pulse: Pulse::new(PULSE_PERIOD_SECS),
            motion: detect_motion_preference(),
        }
    }

    pub fn add_flow(&mut self, flow: FlowPath) {
        self.flows.push(flow);
    }

    pub fn clear_flows(&mut self) {
        self.flows.clear();
    }

    pub fn set_motion(&mut self, motion: MotionPreference) {
        self.motion = motion;
    }

    /// Density glyph for an intensity, `None` below the floor
    #[must_use]
    pub fn density_glyph(intensity: f32) -> Option<char> {
        if !intensity.is_finite() || intensity < DENSITY_FLOOR {
            return None;
        }
        DENSITY_THRESHOLDS
            .iter()
            .find(|(threshold, _)| intensity <= *threshold)
            .map(|(_, glyph)| *glyph)
    }

    fn ramp_color(&self, palette: &Palette, intensity: f32) -> Rgb {
        match self.kind {
            OverlayKind::Temperature => palette.temperature_color(intensity),
            OverlayKind::Energy => palette.energy_color(intensity),
        }
    }
}

impl Layer for ColorOverlayLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn z(&self) -> LayerZ {
        LayerZ::EnergyOverlay
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn update(&mut self, dt: Duration) {
        self.pulse.advance(dt, self.motion.speed_multiplier());
    }

    fn render(&self, viewport: &Viewport) -> Buffer {
        let mut buf = layer_buffer(viewport);
        let palette = *self.palette.read().expect("palette lock poisoned");

        for cy in 0..viewport.height {
            for cx in 0..viewport.width {
                let (wx, wy) = viewport.cell_to_world(cx, cy);
                let Some(intensity) = self.field.sample(viewport.floor, wx, wy) else {
                    continue;
                };
                let intensity = intensity.clamp(0.0, 1.0);
                let Some(glyph) = Self::density_glyph(intensity) else {
                    continue;
                };
                let style = palette.style(self.ramp_color(&palette, intensity));
                put_glyph(&mut buf, i32::from(cx), i32::from(cy), glyph, style);
            }
        }

        let offset = (Easing::SmoothStep.apply(self.pulse.phase()) * 64.0) as usize;
        for flow in self.flows.iter().filter(|f| f.floor == viewport.floor) {
            for pair in flow.points.windows(2) {
                let (x0, y0) = viewport.to_cell(pair[0].0, pair[0].1);
                let (x1, y1) = viewport.to_cell(pair[1].0, pair[1].1);
                draw_gradient_line(
                    &mut buf, x0, y0, x1, y1, FLOW_GLYPH, flow.start, flow.end, &palette, offset,
                );
            }
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{ColorSupport, PaletteMode};
    use std::sync::RwLock;

    struct UniformField(f32);

    impl FieldSource for UniformField {
        fn sample(&self, _floor: FloorId, _wx: f64, _wy: f64) -> Option<f32> {
            Some(self.0)
        }
    }

    struct EmptyField;

    impl FieldSource for EmptyField {
        fn sample(&self, _floor: FloorId, _wx: f64, _wy: f64) -> Option<f32> {
            None
        }
    }

    fn palette() -> SharedPalette {
        Arc::new(RwLock::new(Palette::new(
            PaletteMode::Default,
            ColorSupport::Indexed256,
        )))
    }

    #[test]
    fn test_density_thresholds() {
        assert_eq!(ColorOverlayLayer::density_glyph(0.0), None);
        assert_eq!(ColorOverlayLayer::density_glyph(0.2), None);
        assert_eq!(ColorOverlayLayer::density_glyph(0.3), Some('░'));
        assert_eq!(ColorOverlayLayer::density_glyph(0.6), Some('▒'));
        assert_eq!(ColorOverlayLayer::density_glyph(0.9), Some('▓'));
        assert_eq!(ColorOverlayLayer::density_glyph(f32::NAN), None);
    }

    #[test]
    fn test_hot_field_fills_grid() {
        let layer = ColorOverlayLayer::new(
            "heat",
            OverlayKind::Temperature,
            Arc::new(UniformField(0.9)),
            palette(),
        );
        let buf = layer.render(&Viewport::new(8, 4));
        for y in 0..4u16 {
            for x in 0..8u16 {
                assert_eq!(buf.cell((x, y)).unwrap().symbol(), "▓");
            }
        }
    }

    #[test]
    fn test_cool_field_stays_transparent() {
        let layer = ColorOverlayLayer::new(
            "heat",
            OverlayKind::Temperature,
            Arc::new(UniformField(0.1)),
            palette(),
        );
        let vp = Viewport::new(8, 4);
        assert_eq!(layer.render(&vp), layer_buffer(&vp));
    }

    #[test]
    fn test_no_reading_stays_transparent() {
        let layer = ColorOverlayLayer::new(
            "heat",
            OverlayKind::Temperature,
            Arc::new(EmptyField),
            palette(),
        );
        let vp = Viewport::new(8, 4);
        assert_eq!(layer.render(&vp), layer_buffer(&vp));
    }

    #[test]
    fn test_flow_pulse_moves_with_ticks() {
        let mut layer = ColorOverlayLayer::new(
            "energy",
            OverlayKind::Energy,
            Arc::new(EmptyField),
            palette(),
        );
        layer.add_flow(FlowPath {
            points: vec![(0.0, 0.0), (15.0, 0.0)],
            start: Rgb::new(0, 0, 0),
            end: Rgb::new(255, 0, 0),
            floor: 0,
        });

        let vp = Viewport::new(16, 2);
        let before = layer.render(&vp);
        layer.update(Duration::from_millis(200));
        let after = layer.render(&vp);
        assert_ne!(before, after);
        // Glyph channel is stable; only colors moved
        assert_eq!(before.cell((4u16, 0u16)).unwrap().symbol(), "~");
        assert_eq!(after.cell((4u16, 0u16)).unwrap().symbol(), "~");
    }

    #[test]
    fn test_flow_on_other_floor_hidden() {
        let mut layer = ColorOverlayLayer::new(
            "energy",
            OverlayKind::Energy,
            Arc::new(EmptyField),
            palette(),
        );
        layer.add_flow(FlowPath {
            points: vec![(0.0, 0.0), (5.0, 0.0)],
            start: Rgb::new(0, 255, 0),
            end: Rgb::new(0, 0, 255),
            floor: 4,
        });
        let vp = Viewport::new(8, 2);
        assert_eq!(layer.render(&vp), layer_buffer(&vp));
    }
}
