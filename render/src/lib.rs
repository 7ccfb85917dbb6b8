//! gridtwin-render - layered ASCII/ANSI engine for building digital twins
//!
//! This crate renders a live building view as layered terminal graphics:
//! static structure (rooms, walls), equipment state, animated particle
//! effects, and color-coded overlays, composited into one glyph+color grid.
//!
//! # Architecture
//!
//! - **Renderer**: layer registry, z-order, viewport, background update loop
//! - **Layers**: structure, equipment, particles, color overlays,
//!   annotations, HUD - each an independent visual contributor
//! - **Compositor**: painter's-algorithm merge with opaque-overwrite cells
//! - **Particles**: bounded physics simulation (gravity/wind/drag/lifetime)
//! - **Palette**: semantic color tables, runtime-swappable modes,
//!   capability-aware degradation to glyph-only output
//!
//! The engine consumes building state as read-only data and emits frames;
//! it performs no terminal, file, or network I/O itself.

pub mod animation;
pub mod ansi;
pub mod compositor;
pub mod config;
pub mod draw;
pub mod error;
pub mod layer;
pub mod motion;
pub mod palette;
pub mod particles;
pub mod region;
pub mod renderer;
pub mod source;
pub mod viewport;

pub use compositor::Compositor;
pub use config::RendererConfig;
pub use error::RenderError;
pub use layer::{
    Annotation, AnnotationLayer, ColorOverlayLayer, EquipmentLayer, FlowPath, Layer, LayerZ,
    OverlayKind, ParticleEmitter, ParticleLayer, StructureLayer, UiLayer,
};
pub use palette::{ColorSupport, Palette, PaletteMode, Rgb, SharedPalette};
pub use particles::{ParticleKind, ParticleSystem, PhysicsProfile};
pub use region::Region;
pub use renderer::Renderer;
pub use source::{
    EntityLocator, EquipmentSource, EquipmentState, EquipmentStatus, FieldSource, Room,
    StaticEquipment, StaticStructure, StructureSource,
};
pub use viewport::{FloorId, Viewport};
