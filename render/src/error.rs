//! Engine Errors
//!
//! Configuration-time failures are surfaced as explicit `RenderError`
//! values at the call site. Render-time anomalies (out-of-range writes,
//! missing palette entries, malformed particle state) are never errors:
//! they are clamped, defaulted, or dropped so a partially-imperfect frame
//! beats an aborted render loop.

use thiserror::Error;

/// Errors returned by renderer configuration operations
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// A layer with this name is already registered
    #[error("layer \"{0}\" is already registered")]
    DuplicateLayer(String),

    /// No layer with this name exists
    #[error("no layer named \"{0}\"")]
    UnknownLayer(String),

    /// The background update loop is already running
    #[error("update loop is already running")]
    AlreadyRunning,
}
