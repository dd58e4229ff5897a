//! Rendering
//!
//! The dispatcher walks every active viewport, refreshes the derived
//! transforms of its subtree and hands the visible sprites to a
//! [`RenderBackend`]. Painting itself happens behind that trait.
//!
//! ```text
//! viewports (creation order)
//!      ↓ derive_viewport
//! draw list (painter's order)
//!      ↓ cull
//! RenderBackend: pre_render → draw* → post_render
//! ```

mod backend;
mod commands;
mod dispatcher;

pub use backend::{BackendResult, DrawNode, RenderBackend, ViewportFrame};
pub use commands::{CommandRecorder, DrawCommand};
pub use dispatcher::{is_culled, render_frame, RenderSettings, RenderStats};

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The surface selector does not name a surface the backend can draw to
    #[error("Cannot find drawing surface '{0}'")]
    UnknownSurface(String),
}
