//! Scene graph
//!
//! Containers own an ordered child list, viewports root a renderable subtree,
//! and sprites carry a shape plus fill. Hierarchy edits live on
//! [`ObjectRegistry`](crate::object::ObjectRegistry) because both ends of an
//! edge are registry entries.
//!
//! ```text
//! viewport
//!  ├── container ── sprite
//!  └── sprite
//! ```
//!
//! Derived transforms are recomputed top-down by [`derive_viewport`] once per
//! rendered viewport and are never updated in response to edits.

mod hierarchy;
mod sprite;
mod transform;
mod viewport;

pub use hierarchy::SceneError;
pub use sprite::{Colour, Fill, Sprite};
pub use transform::{derive_viewport, DerivedTransform, Transform2D};
pub use viewport::{Viewport, ViewportFlags, ViewportOptions};
