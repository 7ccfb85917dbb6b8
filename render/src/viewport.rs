//! Viewport
//!
//! The camera: world offset, terminal size, zoom, active floor, and an
//! optional follow target. Layers receive an immutable snapshot at render
//! time and map world coordinates to terminal cells through it.

use serde::{Deserialize, Serialize};

/// Building floor identifier (negative floors are basements)
pub type FloorId = i32;

/// Minimum zoom factor
pub const ZOOM_MIN: f64 = 0.1;

/// Maximum zoom factor
pub const ZOOM_MAX: f64 = 10.0;

/// Camera state for one renderer
///
/// The projection is `cell = world / zoom + offset`, so `x`/`y` are the
/// screen offset of the world origin in cells. Zoom is always kept inside
/// `[ZOOM_MIN, ZOOM_MAX]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen offset of the world origin (cells, fractional)
    pub x: f64,
    /// Screen offset of the world origin (cells, fractional)
    pub y: f64,
    /// Terminal width in cells
    pub width: u16,
    /// Terminal height in cells
    pub height: u16,
    /// Zoom factor, clamped to `[ZOOM_MIN, ZOOM_MAX]`
    zoom: f64,
    /// Active floor
    pub floor: FloorId,
    /// Entity id the camera follows, if any
    pub follow: Option<String>,
}

impl Viewport {
    /// Create a viewport of the given terminal size at the world origin
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            zoom: 1.0,
            floor: 0,
            follow: None,
        }
    }

    /// Current zoom factor
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamping to the valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = if zoom.is_finite() {
            zoom.clamp(ZOOM_MIN, ZOOM_MAX)
        } else {
            1.0
        };
    }

    /// Multiply the zoom factor, clamping to the valid range
    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    /// Shift the camera by whole-cell deltas
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Center the camera on a world position
    pub fn center_on(&mut self, world_x: f64, world_y: f64) {
        self.x = f64::from(self.width) / 2.0 - world_x / self.zoom;
        self.y = f64::from(self.height) / 2.0 - world_y / self.zoom;
    }

    /// Project a world position to a cell, without bounds checking
    ///
    /// Returns possibly-negative coordinates; the drawing primitives clip.
    #[must_use]
    pub fn to_cell(&self, world_x: f64, world_y: f64) -> (i32, i32) {
        let cx = (world_x / self.zoom + self.x).round();
        let cy = (world_y / self.zoom + self.y).round();
        (cx as i32, cy as i32)
    }

    /// Project a world position to a cell inside the viewport
    ///
    /// Returns `None` when the mapped cell falls outside the grid.
    #[must_use]
    pub fn project(&self, world_x: f64, world_y: f64) -> Option<(u16, u16)> {
        let (cx, cy) = self.to_cell(world_x, world_y);
        if cx < 0 || cy < 0 || cx >= i32::from(self.width) || cy >= i32::from(self.height) {
            return None;
        }
        Some((cx as u16, cy as u16))
    }

    /// Inverse projection: the world position at the center of a cell
    #[must_use]
    pub fn cell_to_world(&self, cell_x: u16, cell_y: u16) -> (f64, f64) {
        let wx = (f64::from(cell_x) - self.x) * self.zoom;
        let wy = (f64::from(cell_y) - self.y) * self.zoom;
        (wx, wy)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_clamp_low() {
        let mut vp = Viewport::new(80, 24);
        for _ in 0..50 {
            vp.zoom_by(0.001);
        }
        assert_eq!(vp.zoom(), ZOOM_MIN);
    }

    #[test]
    fn test_zoom_clamp_high() {
        let mut vp = Viewport::new(80, 24);
        for _ in 0..50 {
            vp.zoom_by(1000.0);
        }
        assert_eq!(vp.zoom(), ZOOM_MAX);
    }

    #[test]
    fn test_zoom_rejects_non_finite() {
        let mut vp = Viewport::new(80, 24);
        vp.set_zoom(f64::NAN);
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_identity_projection() {
        let vp = Viewport::new(20, 10);
        assert_eq!(vp.project(3.0, 4.0), Some((3, 4)));
        assert_eq!(vp.project(19.0, 9.0), Some((19, 9)));
        assert_eq!(vp.project(20.0, 9.0), None);
        assert_eq!(vp.project(-1.0, 0.0), None);
    }

    #[test]
    fn test_pan_shifts_projection() {
        let mut vp = Viewport::new(20, 10);
        vp.pan(5.0, 2.0);
        assert_eq!(vp.project(0.0, 0.0), Some((5, 2)));
    }

    #[test]
    fn test_zoom_scales_world() {
        let mut vp = Viewport::new(20, 10);
        vp.set_zoom(2.0);
        // world x=10 lands at cell 5 when zoomed out 2x
        assert_eq!(vp.project(10.0, 4.0), Some((5, 2)));
    }

    #[test]
    fn test_center_on() {
        let mut vp = Viewport::new(20, 10);
        vp.center_on(100.0, 40.0);
        assert_eq!(vp.project(100.0, 40.0), Some((10, 5)));
    }

    #[test]
    fn test_cell_to_world_roundtrip() {
        let mut vp = Viewport::new(20, 10);
        vp.set_zoom(2.0);
        vp.pan(3.0, 1.0);
        let (wx, wy) = vp.cell_to_world(7, 4);
        assert_eq!(vp.project(wx, wy), Some((7, 4)));
    }
}
