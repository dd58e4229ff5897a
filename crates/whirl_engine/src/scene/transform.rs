//! Local transforms and the per-frame derived-transform pass
//!
//! Derived state is never updated reactively. It is recomputed for a whole
//! viewport subtree when that viewport is rendered, so every node sees its
//! ancestors as they were at the start of the render pass.

use crate::foundation::geometry::Shape;
use crate::foundation::math::Vec2;
use crate::object::{ObjectId, ObjectRegistry};
use serde::{Deserialize, Serialize};

/// Placement of an entity relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Offset of the local origin in parent space
    pub position: Vec2,
    /// Uniform scale applied to the entity and everything below it
    pub scale: f32,
    /// Opacity multiplier applied to the entity and everything below it
    pub alpha: f32,
}

impl Transform2D {
    /// Transform at `(x, y)` with unit scale and full opacity
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// Replace the scale
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Replace the alpha
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            scale: 1.0,
            alpha: 1.0,
        }
    }
}

/// Effective on-screen placement, relative to the viewport origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedTransform {
    /// Screen position of the entity's local origin
    pub origin: Vec2,
    /// Product of the viewport zoom and every scale down to this entity
    pub scale: f32,
    /// Product of every alpha down to this entity
    pub alpha: f32,
    /// Sprite bounds after placement; `None` for entities that draw nothing
    pub bounds: Option<Shape>,
}

impl Default for DerivedTransform {
    fn default() -> Self {
        Self {
            origin: Vec2::zeros(),
            scale: 1.0,
            alpha: 1.0,
            bounds: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    offset: Vec2,
    scale: f32,
    alpha: f32,
}

/// Recompute derived transforms below `viewport` and return the active
/// drawable entities in painter's order (parents before children, siblings
/// in insertion order).
///
/// Inactive entities are skipped together with their subtrees.
pub fn derive_viewport(registry: &mut ObjectRegistry, viewport: ObjectId) -> Vec<ObjectId> {
    let Some(root) = registry.get_mut(viewport) else {
        return Vec::new();
    };
    let Some(state) = root.viewport() else {
        log::warn!("{viewport} has no viewport state; nothing to derive");
        return Vec::new();
    };

    let (zoom, scroll, origin) = (state.zoom, state.scroll(), state.bounds.origin());
    let base = Frame {
        offset: -scroll * zoom,
        scale: zoom,
        alpha: root.transform.alpha,
    };
    root.derived = DerivedTransform {
        origin,
        scale: zoom,
        alpha: base.alpha,
        bounds: None,
    };

    let mut draw_list = Vec::new();
    let mut stack: Vec<(ObjectId, Frame)> = root
        .children()
        .iter()
        .rev()
        .map(|child| (*child, base))
        .collect();

    while let Some((id, parent)) = stack.pop() {
        let Some(entity) = registry.get_mut(id) else {
            continue;
        };
        if !entity.active {
            continue;
        }

        let local = entity.transform;
        let frame = Frame {
            offset: parent.offset + local.position * parent.scale,
            scale: parent.scale * local.scale,
            alpha: parent.alpha * local.alpha,
        };
        let bounds = entity
            .sprite()
            .map(|sprite| sprite.shape.transformed(frame.offset, parent.scale, local.scale));

        entity.derived = DerivedTransform {
            origin: frame.offset,
            scale: frame.scale,
            alpha: frame.alpha,
            bounds,
        };

        if bounds.is_some() {
            draw_list.push(id);
        }
        stack.extend(entity.children().iter().rev().map(|child| (*child, frame)));
    }

    draw_list
}
