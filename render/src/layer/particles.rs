//! Particle Layer
//!
//! Owns the particle simulation and renders its current snapshot into the
//! viewport. External spawn requests (an "equipment failed" event, say)
//! go through a `ParticleEmitter` handle: requests queue on a channel and
//! are applied at the start of the next update tick, so all simulation
//! mutation happens on the update thread.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

use ratatui::buffer::Buffer;

use super::{layer_buffer, Layer, LayerZ};
use crate::draw::put_glyph;
use crate::motion::{detect_motion_preference, MotionPreference};
use crate::palette::SharedPalette;
use crate::particles::{ParticleKind, ParticleSystem, PhysicsProfile};
use crate::viewport::{FloorId, Viewport};

/// A queued external spawn request
struct SpawnRequest {
    x: f64,
    y: f64,
    kind: ParticleKind,
    count: usize,
}

/// Clonable handle for spawning particles from outside the update thread
#[derive(Clone)]
pub struct ParticleEmitter {
    tx: Sender<SpawnRequest>,
}

impl ParticleEmitter {
    /// Queue a spawn; applied at the next update tick
    ///
    /// Silently drops the request if the owning layer is gone.
    pub fn spawn(&self, x: f64, y: f64, kind: ParticleKind, count: usize) {
        let _ = self.tx.send(SpawnRequest { x, y, kind, count });
    }
}

/// Renders the particle simulation
pub struct ParticleLayer {
    name: String,
    visible: bool,
    system: ParticleSystem,
    palette: SharedPalette,
    motion: MotionPreference,
    tx: Sender<SpawnRequest>,
    rx: Receiver<SpawnRequest>,
}

impl ParticleLayer {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        system: ParticleSystem,
        palette: SharedPalette,
    ) -> Self {
        let (tx, rx) = channel();
        Self {
            name: name.into(),
            visible: true,
            system,
            palette,
            motion: detect_motion_preference(),
            tx,
            rx,
        }
    }

    /// Handle for external spawn requests
    #[must_use]
    pub fn emitter(&self) -> ParticleEmitter {
        ParticleEmitter {
            tx: self.tx.clone(),
        }
    }

    /// Spawn immediately; callers off the update thread use `emitter()`
    pub fn spawn_particles(&mut self, x: f64, y: f64, kind: ParticleKind, count: usize) {
        self.system.spawn(x, y, kind, count);
    }

    pub fn set_physics(&mut self, physics: PhysicsProfile) {
        self.system.set_physics(physics);
    }

    pub fn set_motion(&mut self, motion: MotionPreference) {
        self.motion = motion;
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.system.len()
    }
}

impl Layer for ParticleLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn z(&self) -> LayerZ {
        LayerZ::Particles
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn update(&mut self, dt: Duration) {
        // Apply queued external spawns first so they get this tick's physics
        while let Ok(req) = self.rx.try_recv() {
            self.system.spawn(req.x, req.y, req.kind, req.count);
        }
        let scaled = dt.mul_f64(f64::from(self.motion.speed_multiplier()));
        self.system.update(scaled);
    }

    fn render(&self, viewport: &Viewport) -> Buffer {
        let mut buf = layer_buffer(viewport);
        let palette = *self.palette.read().expect("palette lock poisoned");

        // Oldest first: the newest particle wins an overlapping cell
        for particle in self.system.iter() {
            let Some((x, y)) = viewport.project(particle.x, particle.y) else {
                continue;
            };
            put_glyph(
                &mut buf,
                i32::from(x),
                i32::from(y),
                particle.glyph(),
                palette.style(particle.color),
            );
        }
        buf
    }

    fn floor_changed(&mut self, _floor: FloorId) {
        self.system.clear();
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

    fn layer() -> ParticleLayer {
        ParticleLayer::new(
            "particles",
            ParticleSystem::with_seed((100.0, 100.0), 256, 7),
            palette(),
        )
    }

    #[test]
    fn test_emitter_spawns_on_next_tick() {
        let mut layer = layer();
        let emitter = layer.emitter();
        emitter.spawn(10.0, 10.0, ParticleKind::Spark, 12);
        assert_eq!(layer.particle_count(), 0);

        layer.update(Duration::from_millis(33));
        assert_eq!(layer.particle_count(), 12);
    }

    #[test]
    fn test_floor_change_clears() {
        let mut layer = layer();
        layer.spawn_particles(10.0, 10.0, ParticleKind::Smoke, 5);
        layer.floor_changed(2);
        assert_eq!(layer.particle_count(), 0);
    }

    #[test]
    fn test_offscreen_particles_dropped() {
        let mut layer = layer();
        layer.spawn_particles(90.0, 90.0, ParticleKind::Spark, 4);
        let vp = Viewport::new(10, 10);
        let buf = layer.render(&vp);
        assert_eq!(buf, layer_buffer(&vp));
    }

    #[test]
    fn test_render_draws_glyphs() {
        let mut layer = layer();
        layer.spawn_particles(5.0, 5.0, ParticleKind::Spark, 1);
        let buf = layer.render(&Viewport::new(20, 20));
        assert_eq!(buf.cell((5u16, 5u16)).unwrap().symbol(), "✦");
    }

    #[test]
    fn test_motion_none_freezes_simulation() {
        let mut layer = layer();
        layer.set_motion(MotionPreference::None);
        layer.spawn_particles(50.0, 50.0, ParticleKind::Spark, 8);
        layer.update(Duration::from_secs(60));
        // Frozen simulation never expires anything
        assert_eq!(layer.particle_count(), 8);
    }
}
