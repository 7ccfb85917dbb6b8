//! Renderer
//!
//! Owns the layer registry, z-order, viewport, and the background update
//! loop, and orchestrates update/render. One renderer per active building
//! view. `Renderer` is a cheap-clone handle: clones share the same
//! registry, viewport, and loop, so a host can keep one handle for input
//! wiring and another for output.
//!
//! # Locking
//!
//! The registry sits behind one RwLock, but update and render only hold it
//! long enough to snapshot the layer handles; per-layer work happens
//! outside, serialized by each layer's own mutex. A slow layer therefore
//! never blocks `add_layer`/`remove_layer`, at the cost of
//! snapshot-at-tick-start semantics: a layer added mid-tick waits for the
//! next tick, and a layer removed mid-tick may receive one final update.
//!
//! # Lifecycle
//!
//! `start` spawns a tokio task driving `update` at the configured cadence
//! (so it must be called from within a runtime); `stop` is idempotent,
//! callable from any task, and joins the loop within the configured grace
//! period, aborting it on overrun. `render` is synchronous and fully
//! decoupled from the update cadence: a slow terminal skips frames without
//! losing simulation fidelity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use ratatui::buffer::Buffer;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use crate::ansi;
use crate::compositor::Compositor;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::layer::{Layer, ParticleLayer};
use crate::palette::{Palette, PaletteMode, SharedPalette};
use crate::particles::ParticleSystem;
use crate::region::{DirtyRegions, Region};
use crate::source::EntityLocator;
use crate::viewport::{FloorId, Viewport};

/// A registered layer: shared so update/render can run outside the
/// registry lock
type SharedLayer = Arc<Mutex<dyn Layer>>;

struct Slot {
    name: String,
    z_value: u8,
    layer: SharedLayer,
}

/// Slot list in ascending-z order plus a name index
#[derive(Default)]
struct Registry {
    slots: Vec<Slot>,
    by_name: HashMap<String, SharedLayer>,
}

impl Registry {
    fn snapshot(&self) -> Vec<SharedLayer> {
        self.slots.iter().map(|slot| slot.layer.clone()).collect()
    }
}

struct Inner {
    config: RendererConfig,
    registry: RwLock<Registry>,
    viewport: RwLock<Viewport>,
    palette: SharedPalette,
    compositor: Mutex<Compositor>,
    dirty: Mutex<DirtyRegions>,
    locator: RwLock<Option<Arc<dyn EntityLocator>>>,
    running: AtomicBool,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// The layered rendering engine
#[derive(Clone)]
pub struct Renderer {
    inner: Arc<Inner>,
}

impl Renderer {
    /// Renderer with capability detected from the environment
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self::with_palette(config, Palette::detect())
    }

    /// Renderer with an explicit palette (tests, fixed deployments)
    #[must_use]
    pub fn with_palette(config: RendererConfig, palette: Palette) -> Self {
        let viewport = Viewport::default();
        let background = palette.style(palette.background());
        let compositor = Compositor::new(config.background_glyph, background);
        let dirty = DirtyRegions::new(viewport.width, viewport.height);
        Self {
            inner: Arc::new(Inner {
                config,
                registry: RwLock::new(Registry::default()),
                viewport: RwLock::new(viewport),
                palette: Arc::new(RwLock::new(palette)),
                compositor: Mutex::new(compositor),
                dirty: Mutex::new(dirty),
                locator: RwLock::new(None),
                running: AtomicBool::new(false),
                stop_tx: Mutex::new(None),
                task: Mutex::new(None),
            }),
        }
    }

    /// Attach the entity locator used for camera follow targets
    pub fn set_locator(&self, locator: Arc<dyn EntityLocator>) {
        *self
            .inner
            .locator
            .write()
            .expect("locator lock poisoned") = Some(locator);
    }

    /// Shared palette handle for constructing layers
    #[must_use]
    pub fn palette(&self) -> SharedPalette {
        self.inner.palette.clone()
    }

    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.inner.config
    }

    /// Particle layer preconfigured from this renderer's bounds and cap
    ///
    /// Grab the `emitter()` before registering it with `add_layer`.
    #[must_use]
    pub fn particle_layer(&self, name: impl Into<String>) -> ParticleLayer {
        ParticleLayer::new(
            name,
            ParticleSystem::new(self.inner.config.sim_bounds, self.inner.config.particle_cap),
            self.palette(),
        )
    }

    // === Layer composition ===

    /// Register a layer under a unique name
    ///
    /// Insertion preserves ascending z with stable tie-break on
    /// registration order.
    pub fn add_layer(
        &self,
        name: impl Into<String>,
        layer: impl Layer + 'static,
    ) -> Result<(), RenderError> {
        let name = name.into();
        let mut registry = self.inner.registry.write().expect("registry lock poisoned");
        if registry.by_name.contains_key(&name) {
            return Err(RenderError::DuplicateLayer(name));
        }
        let z_value = layer.z().value();
        let shared: SharedLayer = Arc::new(Mutex::new(layer));
        let index = registry
            .slots
            .partition_point(|slot| slot.z_value <= z_value);
        registry.slots.insert(
            index,
            Slot {
                name: name.clone(),
                z_value,
                layer: shared.clone(),
            },
        );
        registry.by_name.insert(name.clone(), shared);
        drop(registry);

        self.mark_all_dirty();
        debug!(name = %name, z = z_value, "layer added");
        Ok(())
    }

    /// Unregister a layer
    pub fn remove_layer(&self, name: &str) -> Result<(), RenderError> {
        let mut registry = self.inner.registry.write().expect("registry lock poisoned");
        if registry.by_name.remove(name).is_none() {
            return Err(RenderError::UnknownLayer(name.to_string()));
        }
        registry.slots.retain(|slot| slot.name != name);
        drop(registry);

        self.mark_all_dirty();
        debug!(name, "layer removed");
        Ok(())
    }

    /// Show or hide a layer; the full viewport becomes dirty
    pub fn set_layer_visible(&self, name: &str, visible: bool) -> Result<(), RenderError> {
        let layer = {
            let registry = self.inner.registry.read().expect("registry lock poisoned");
            registry
                .by_name
                .get(name)
                .cloned()
                .ok_or_else(|| RenderError::UnknownLayer(name.to_string()))?
        };
        layer
            .lock()
            .expect("layer lock poisoned")
            .set_visible(visible);
        self.mark_all_dirty();
        Ok(())
    }

    /// Registered layer names in ascending-z iteration order
    #[must_use]
    pub fn layer_names(&self) -> Vec<String> {
        self.inner
            .registry
            .read()
            .expect("registry lock poisoned")
            .slots
            .iter()
            .map(|slot| slot.name.clone())
            .collect()
    }

    // === Lifecycle ===

    /// Spawn the background update loop
    ///
    /// Must be called from within a tokio runtime. Fails if the loop is
    /// already running.
    pub fn start(&self) -> Result<(), RenderError> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return Err(RenderError::AlreadyRunning);
        }
        let (tx, mut rx) = watch::channel(false);
        *self.inner.stop_tx.lock().expect("stop lock poisoned") = Some(tx);

        let renderer = self.clone();
        let dt = self.inner.config.update_interval();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(dt);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = rx.changed() => break,
                    _ = ticker.tick() => renderer.update(dt),
                }
            }
            debug!("update loop exited");
        });
        *self.inner.task.lock().expect("task lock poisoned") = Some(handle);
        debug!(hz = self.inner.config.update_hz, "update loop started");
        Ok(())
    }

    /// Stop the background update loop
    ///
    /// Idempotent and callable from any task: a no-op when not running,
    /// otherwise returns once the loop task has exited, aborting it after
    /// the configured grace period.
    pub async fn stop(&self) {
        if let Some(tx) = self.inner.stop_tx.lock().expect("stop lock poisoned").take() {
            let _ = tx.send(true);
        }
        let handle = self.inner.task.lock().expect("task lock poisoned").take();
        let Some(mut handle) = handle else {
            return;
        };
        match tokio::time::timeout(self.inner.config.stop_grace(), &mut handle).await {
            Ok(_) => debug!("update loop joined"),
            Err(_) => {
                warn!(
                    grace_ms = self.inner.config.stop_grace_ms,
                    "update loop missed stop grace, aborting"
                );
                handle.abort();
            }
        }
        self.inner.running.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    // === Update & render ===

    /// Tick every registered layer by `dt`
    ///
    /// Snapshot-at-tick-start: the layer set is cloned under a brief read
    /// lock and ticked outside it. A layer added mid-snapshot is not
    /// guaranteed this tick's update, and a layer removed mid-tick may
    /// receive one final update (acceptable eventual consistency for a
    /// visual system). Afterwards a follow-target viewport recenters from
    /// the entity locator.
    pub fn update(&self, dt: Duration) {
        let snapshot = self
            .inner
            .registry
            .read()
            .expect("registry lock poisoned")
            .snapshot();
        trace!(layers = snapshot.len(), "update tick");

        for layer in snapshot {
            let mut guard = layer.lock().expect("layer lock poisoned");
            guard.update(dt);
            let marks = guard.take_dirty();
            drop(guard);
            if !marks.is_empty() {
                let mut dirty = self.inner.dirty.lock().expect("dirty lock poisoned");
                for region in marks {
                    dirty.mark(region);
                }
            }
        }

        let locator = self
            .inner
            .locator
            .read()
            .expect("locator lock poisoned")
            .clone();
        if let Some(locator) = locator {
            let follow = self
                .inner
                .viewport
                .read()
                .expect("viewport lock poisoned")
                .follow
                .clone();
            if let Some(id) = follow {
                if let Some((x, y, _floor)) = locator.locate(&id) {
                    let mut viewport =
                        self.inner.viewport.write().expect("viewport lock poisoned");
                    viewport.center_on(x, y);
                }
            }
        }
    }

    /// Produce one composited frame
    ///
    /// Synchronous and side-effect-free: visible layers render in
    /// ascending z against the current viewport, and the compositor merges
    /// them. Two renders without an intervening update or viewport change
    /// are identical.
    #[must_use]
    pub fn render(&self) -> Buffer {
        let viewport = self
            .inner
            .viewport
            .read()
            .expect("viewport lock poisoned")
            .clone();
        let snapshot = self
            .inner
            .registry
            .read()
            .expect("registry lock poisoned")
            .snapshot();

        let mut grids = Vec::with_capacity(snapshot.len());
        for layer in snapshot {
            let guard = layer.lock().expect("layer lock poisoned");
            if guard.is_visible() {
                grids.push(guard.render(&viewport));
            }
        }

        self.inner
            .compositor
            .lock()
            .expect("compositor lock poisoned")
            .composite(&grids, viewport.width, viewport.height)
    }

    /// Render and serialize to ANSI text
    #[must_use]
    pub fn render_ansi(&self) -> String {
        let support = self
            .inner
            .palette
            .read()
            .expect("palette lock poisoned")
            .support();
        ansi::to_ansi(&self.render(), support)
    }

    // === Viewport control ===

    /// Current viewport snapshot
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.inner
            .viewport
            .read()
            .expect("viewport lock poisoned")
            .clone()
    }

    /// Shift the camera; effective on the next render
    pub fn pan(&self, dx: f64, dy: f64) {
        self.inner
            .viewport
            .write()
            .expect("viewport lock poisoned")
            .pan(dx, dy);
        self.mark_all_dirty();
    }

    /// Scale the zoom by `factor`, clamped to the valid range
    pub fn zoom(&self, factor: f64) {
        self.inner
            .viewport
            .write()
            .expect("viewport lock poisoned")
            .zoom_by(factor);
        self.mark_all_dirty();
    }

    /// Switch the active floor and notify layers
    pub fn set_floor(&self, floor: FloorId) {
        {
            let mut viewport = self.inner.viewport.write().expect("viewport lock poisoned");
            if viewport.floor == floor {
                return;
            }
            viewport.floor = floor;
        }
        let snapshot = self
            .inner
            .registry
            .read()
            .expect("registry lock poisoned")
            .snapshot();
        for layer in snapshot {
            layer
                .lock()
                .expect("layer lock poisoned")
                .floor_changed(floor);
        }
        self.mark_all_dirty();
        debug!(floor, "active floor changed");
    }

    /// Replace the whole viewport atomically
    pub fn set_viewport(&self, viewport: Viewport) {
        let (width, height) = (viewport.width, viewport.height);
        *self.inner.viewport.write().expect("viewport lock poisoned") = viewport;
        self.inner
            .dirty
            .lock()
            .expect("dirty lock poisoned")
            .resize(width, height);
    }

    // === Palette ===

    /// Swap the palette mode
    ///
    /// The compositor background is re-derived immediately; colors already
    /// drawn into a frame stay as-is until the next full render.
    pub fn set_palette_mode(&self, mode: PaletteMode) {
        let background = {
            let mut palette = self.inner.palette.write().expect("palette lock poisoned");
            palette.set_mode(mode);
            palette.style(palette.background())
        };
        self.inner
            .compositor
            .lock()
            .expect("compositor lock poisoned")
            .set_background(self.inner.config.background_glyph, background);
        self.mark_all_dirty();
        debug!(?mode, "palette mode changed");
    }

    #[must_use]
    pub fn palette_mode(&self) -> PaletteMode {
        self.inner
            .palette
            .read()
            .expect("palette lock poisoned")
            .mode()
    }

    // === Dirty regions (advisory) ===

    /// Drain accumulated dirty regions (partial-redraw hint only)
    #[must_use]
    pub fn take_dirty(&self) -> Vec<Region> {
        self.inner.dirty.lock().expect("dirty lock poisoned").take()
    }

    /// Mark a region dirty on behalf of external state changes
    pub fn mark_dirty(&self, region: Region) {
        self.inner
            .dirty
            .lock()
            .expect("dirty lock poisoned")
            .mark(region);
    }

    fn mark_all_dirty(&self) {
        self.inner
            .dirty
            .lock()
            .expect("dirty lock poisoned")
            .mark_all();
    }
}
