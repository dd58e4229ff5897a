//! Per-frame render pass over every viewport

use crate::object::{ObjectId, ObjectRegistry};
use crate::render::{DrawNode, RenderBackend, ViewportFrame};
use crate::scene::{derive_viewport, DerivedTransform, Fill};

/// Game-wide render switches
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Surface used by viewports that do not name one
    pub default_surface: String,
    /// When false, no viewport is cleared regardless of its own flag
    pub clear_viewports: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            default_surface: "#canvas".to_string(),
            clear_viewports: true,
        }
    }
}

/// Counters for one render pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Viewports handed to the backend
    pub viewports: usize,
    /// Viewports skipped because their surface could not be bound
    pub skipped_viewports: usize,
    /// Nodes drawn
    pub drawn: usize,
    /// Nodes skipped as invisible
    pub culled: usize,
}

/// Whether a node would paint nothing.
///
/// Zero opacity, zero scale or a transparent fill each make a node invisible.
pub fn is_culled(derived: &DerivedTransform, fill: &Fill) -> bool {
    derived.alpha <= 0.0 || derived.scale == 0.0 || fill.is_transparent()
}

/// Render every active viewport in `viewports`, in order.
///
/// A viewport whose surface cannot be bound is reported and skipped; the rest
/// of the frame still renders.
pub fn render_frame(
    registry: &mut ObjectRegistry,
    viewports: &[ObjectId],
    backend: &mut dyn RenderBackend,
    settings: &RenderSettings,
) -> RenderStats {
    let mut stats = RenderStats::default();

    for &id in viewports {
        let Some(frame) = viewport_frame(registry, id, settings) else {
            continue;
        };

        if let Err(err) = backend.bind_surface(&frame.surface) {
            log::error!("Skipping {id}: {err}");
            stats.skipped_viewports += 1;
            continue;
        }

        let draw_list = derive_viewport(registry, id);

        backend.pre_render(&frame);
        for node in draw_list {
            let Some(entity) = registry.get(node) else {
                continue;
            };
            let (Some(sprite), Some(bounds)) = (entity.sprite(), entity.derived().bounds) else {
                continue;
            };
            let derived = entity.derived();
            if is_culled(derived, &sprite.fill) {
                stats.culled += 1;
                continue;
            }
            backend.draw(
                &frame,
                &DrawNode {
                    id: node,
                    bounds,
                    alpha: derived.alpha,
                    fill: sprite.fill,
                },
            );
            stats.drawn += 1;
        }
        backend.post_render(&frame);

        stats.viewports += 1;
    }

    log::trace!(
        "Rendered {} viewports: {} drawn, {} culled",
        stats.viewports,
        stats.drawn,
        stats.culled
    );
    stats
}

fn viewport_frame(registry: &ObjectRegistry, id: ObjectId, settings: &RenderSettings) -> Option<ViewportFrame> {
    let entity = registry.get(id)?;
    if !entity.active {
        return None;
    }
    let Some(viewport) = entity.viewport() else {
        log::warn!("{id} is listed as a viewport but has no viewport state");
        return None;
    };

    Some(ViewportFrame {
        id,
        surface: viewport
            .surface
            .clone()
            .unwrap_or_else(|| settings.default_surface.clone()),
        bounds: viewport.bounds,
        clip: viewport.clips(),
        clear: settings.clear_viewports && viewport.clears(),
        smoothing: viewport.smooths(),
    })
}
