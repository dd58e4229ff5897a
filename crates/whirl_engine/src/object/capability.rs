//! Capability installers

use super::Entity;

/// A named unit of behaviour that can be attached to an entity.
///
/// Installers mutate the entity in place. The registry guarantees an
/// installer runs at most once per entity.
pub trait Capability {
    /// Install the capability onto `entity`
    fn install(&self, entity: &mut Entity) -> anyhow::Result<()>;
}

impl<F> Capability for F
where
    F: Fn(&mut Entity) -> anyhow::Result<()>,
{
    fn install(&self, entity: &mut Entity) -> anyhow::Result<()> {
        self(entity)
    }
}

/// Capabilities every registry knows about
pub mod builtin {
    use crate::events::EventHub;
    use crate::object::Entity;
    use crate::scene::{Sprite, Viewport};

    /// Per-entity notification hub
    pub const EVENTS: &str = "events";
    /// Ordered child list (makes the entity a container)
    pub const CHILDREN: &str = "children";
    /// Viewport state: bounds, scroll, zoom and render flags
    pub const VIEWPORT: &str = "viewport";
    /// Drawable shape and fill
    pub const SPRITE: &str = "sprite";

    pub(crate) fn install_events(entity: &mut Entity) -> anyhow::Result<()> {
        entity.events = Some(EventHub::new());
        Ok(())
    }

    pub(crate) fn install_children(entity: &mut Entity) -> anyhow::Result<()> {
        entity.children.get_or_insert_with(Vec::new);
        Ok(())
    }

    pub(crate) fn install_viewport(entity: &mut Entity) -> anyhow::Result<()> {
        entity.children.get_or_insert_with(Vec::new);
        entity.viewport = Some(Viewport::default());
        Ok(())
    }

    pub(crate) fn install_sprite(entity: &mut Entity) -> anyhow::Result<()> {
        entity.sprite = Some(Sprite::default());
        Ok(())
    }
}
