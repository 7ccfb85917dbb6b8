//! Layer Framework
//!
//! A layer is an independently updatable visual contributor to one frame,
//! with a fixed stacking position. The renderer owns registered layers,
//! ticks them on the update cadence, and collects their rendered grids for
//! the compositor.
//!
//! No layer method may panic on out-of-range coordinates: all cell writes
//! go through the bounds-checked drawing primitives and are silently
//! dropped outside the buffer.

mod annotation;
mod equipment;
mod overlay;
mod particles;
mod structure;
mod ui;

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

use crate::region::Region;
use crate::viewport::{FloorId, Viewport};

pub use annotation::{Annotation, AnnotationLayer};
pub use equipment::EquipmentLayer;
pub use overlay::{ColorOverlayLayer, FlowPath, OverlayKind};
pub use particles::{ParticleEmitter, ParticleLayer};
pub use structure::StructureLayer;
pub use ui::UiLayer;

/// Fixed stacking bands, bottom to top
///
/// Every layer declares exactly one band; the renderer keeps iteration in
/// ascending band order with stable insertion-order tie-breaking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LayerZ {
    Structure,
    Equipment,
    Connections,
    Particles,
    EnergyOverlay,
    FailureOverlay,
    Annotations,
    Ui,
}

impl LayerZ {
    /// Numeric stacking value
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Structure => 0,
            Self::Equipment => 10,
            Self::Connections => 20,
            Self::Particles => 30,
            Self::EnergyOverlay => 35,
            Self::FailureOverlay => 40,
            Self::Annotations => 50,
            Self::Ui => 100,
        }
    }
}

/// One visual contributor to the composited frame
///
/// `render` must be side-effect-free and deterministic for unchanged state
/// so that repeated renders without an intervening `update` produce
/// identical grids. There is no per-call deadline: a pathologically slow
/// implementation stalls the frame it participates in (accepted for a
/// visual system; all built-ins are bounded by the viewport size).
pub trait Layer: Send {
    /// Layer name; the renderer registry enforces uniqueness
    fn name(&self) -> &str;

    /// Fixed stacking band
    fn z(&self) -> LayerZ;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Consume external state and advance animations by `dt`
    fn update(&mut self, dt: Duration);

    /// Produce this layer's grid for the given camera
    ///
    /// The returned buffer is viewport-sized; unwritten cells stay
    /// transparent and let lower layers show through.
    fn render(&self, viewport: &Viewport) -> Buffer;

    /// Advisory: mark a region as changed (optimization hint only)
    fn mark_dirty(&mut self, region: Region) {
        let _ = region;
    }

    /// Advisory: drain regions changed since the last call
    fn take_dirty(&mut self) -> Vec<Region> {
        Vec::new()
    }

    /// The active floor changed (particle layers clear, for example)
    fn floor_changed(&mut self, floor: FloorId) {
        let _ = floor;
    }
}

/// A transparent viewport-sized buffer for a layer to draw into
#[must_use]
pub fn layer_buffer(viewport: &Viewport) -> Buffer {
    Buffer::empty(Rect::new(0, 0, viewport.width, viewport.height))
}
