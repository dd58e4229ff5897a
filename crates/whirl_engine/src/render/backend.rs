//! Drawing backend contract

use crate::foundation::geometry::{Rectangle, Shape};
use crate::object::ObjectId;
use crate::render::RenderError;
use crate::scene::Fill;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Per-viewport drawing context handed to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportFrame {
    /// Viewport entity
    pub id: ObjectId,
    /// Surface selector the viewport draws to
    pub surface: String,
    /// Region on the surface; its origin is the translation for every node
    pub bounds: Rectangle,
    /// Restrict drawing to `bounds`
    pub clip: bool,
    /// Clear `bounds` before drawing
    pub clear: bool,
    /// Smooth scaled images
    pub smoothing: bool,
}

/// One sprite, already placed by the derived-transform pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawNode {
    /// Sprite entity
    pub id: ObjectId,
    /// Bounds relative to the viewport origin
    pub bounds: Shape,
    /// Effective opacity
    pub alpha: f32,
    /// Paint
    pub fill: Fill,
}

/// Drawing backend
///
/// The dispatcher calls `bind_surface` then `pre_render`, `draw` for each
/// visible node and `post_render` once per viewport. Implementations must
/// accept several viewports, possibly on different surfaces, within one frame.
pub trait RenderBackend {
    /// Select the surface for the following viewport
    fn bind_surface(&mut self, selector: &str) -> BackendResult<()>;

    /// Establish the origin translation, clip and optional clear
    fn pre_render(&mut self, viewport: &ViewportFrame);

    /// Paint one node
    fn draw(&mut self, viewport: &ViewportFrame, node: &DrawNode);

    /// Restore any state changed by `pre_render`
    fn post_render(&mut self, viewport: &ViewportFrame);
}
