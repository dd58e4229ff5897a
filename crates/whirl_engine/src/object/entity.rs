//! Entity representation

use super::ObjectId;
use crate::events::EventHub;
use crate::frame::FrameSnapshot;
use crate::scene::{DerivedTransform, Sprite, Transform2D, Viewport};
use serde::Serialize;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Per-frame update hook attached to an entity
pub trait Behaviour {
    /// Called once per tick while the entity is active and indexed
    fn update(&mut self, entity: &mut Entity, frame: &FrameSnapshot) -> anyhow::Result<()>;
}

impl<F> Behaviour for F
where
    F: FnMut(&mut Entity, &FrameSnapshot) -> anyhow::Result<()>,
{
    fn update(&mut self, entity: &mut Entity, frame: &FrameSnapshot) -> anyhow::Result<()> {
        self(entity, frame)
    }
}

/// Presets for an entity that has not been registered yet
#[derive(Debug, Clone)]
pub struct EntityDesc {
    /// Type tag; when unset the registry applies the one passed to `init`
    pub type_tag: Option<String>,
    /// Optional user-facing name used by name queries
    pub name: Option<String>,
    /// Whether the entity participates in update and render passes
    pub active: bool,
    /// Local transform relative to the parent
    pub transform: Transform2D,
    /// Initial contents of the data bag
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Default for EntityDesc {
    fn default() -> Self {
        Self {
            type_tag: None,
            name: None,
            active: true,
            transform: Transform2D::default(),
            data: serde_json::Map::new(),
        }
    }
}

impl EntityDesc {
    /// Empty presets
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset the type tag
    #[must_use]
    pub fn typed(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    /// Preset the name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Preset the local transform
    #[must_use]
    pub fn with_transform(mut self, transform: Transform2D) -> Self {
        self.transform = transform;
        self
    }

    /// Start inactive
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// The atomic unit of game state.
///
/// Identity, type tag and capability list are fixed by the registry; the
/// optional slots are filled by capability installers.
pub struct Entity {
    id: ObjectId,
    type_tag: String,
    /// Optional user-facing name
    pub name: Option<String>,
    /// Participates in update and render passes iff true
    pub active: bool,
    /// Free-form user data; must stay JSON-serialisable
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Local transform relative to the parent
    pub transform: Transform2D,
    capabilities: Vec<String>,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) derived: DerivedTransform,
    pub(crate) events: Option<EventHub>,
    pub(crate) children: Option<Vec<ObjectId>>,
    pub(crate) viewport: Option<Viewport>,
    pub(crate) sprite: Option<Sprite>,
    pub(crate) behaviour: Option<Box<dyn Behaviour>>,
    /// Set by `clear_behaviour`; keeps a running hook from being put back
    pub(crate) behaviour_cleared: bool,
    extensions: HashMap<TypeId, Box<dyn Any>>,
}

impl Entity {
    pub(crate) fn from_desc(id: ObjectId, desc: EntityDesc, type_tag: &str) -> Self {
        Self {
            id,
            type_tag: desc.type_tag.unwrap_or_else(|| type_tag.to_string()),
            name: desc.name,
            active: desc.active,
            data: desc.data,
            transform: desc.transform,
            capabilities: Vec::new(),
            parent: None,
            derived: DerivedTransform::default(),
            events: None,
            children: None,
            viewport: None,
            sprite: None,
            behaviour: None,
            behaviour_cleared: false,
            extensions: HashMap::new(),
        }
    }

    /// Registry-assigned identifier
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Type tag
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Attached capability names, in attachment order
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Whether the named capability is attached
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.iter().any(|attached| attached == name)
    }

    pub(crate) fn record_capability(&mut self, name: &str) {
        self.capabilities.push(name.to_string());
    }

    /// Containing node, if any. Structural only; the parent does not own the
    /// child.
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Whether the entity can hold children
    pub fn is_container(&self) -> bool {
        self.children.is_some()
    }

    /// Children in draw order; empty for non-containers
    pub fn children(&self) -> &[ObjectId] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Effective on-screen bounds and alpha from the last render pass.
    ///
    /// Read-only outside the derivation step.
    pub fn derived(&self) -> &DerivedTransform {
        &self.derived
    }

    /// Notification hub, when the `events` capability is attached
    pub fn events(&self) -> Option<&EventHub> {
        self.events.as_ref()
    }

    /// Mutable notification hub
    pub fn events_mut(&mut self) -> Option<&mut EventHub> {
        self.events.as_mut()
    }

    /// Viewport state, when the `viewport` capability is attached
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Mutable viewport state
    pub fn viewport_mut(&mut self) -> Option<&mut Viewport> {
        self.viewport.as_mut()
    }

    /// Drawable state, when the `sprite` capability is attached
    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    /// Mutable drawable state
    pub fn sprite_mut(&mut self) -> Option<&mut Sprite> {
        self.sprite.as_mut()
    }

    /// Set the per-frame update hook
    pub fn set_behaviour(&mut self, behaviour: impl Behaviour + 'static) {
        self.behaviour = Some(Box::new(behaviour));
        self.behaviour_cleared = false;
    }

    /// Remove the per-frame update hook.
    ///
    /// A hook may call this on its own entity to retire itself.
    pub fn clear_behaviour(&mut self) {
        self.behaviour = None;
        self.behaviour_cleared = true;
    }

    /// Whether an update hook is set
    pub fn has_behaviour(&self) -> bool {
        self.behaviour.is_some()
    }

    /// Store state for a user capability, keyed by its type
    pub fn insert_extension<T: Any>(&mut self, value: T) -> Option<T> {
        self.extensions
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Borrow user capability state
    pub fn extension<T: Any>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Mutably borrow user capability state
    pub fn extension_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Serialisable view of the entity
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            type_tag: self.type_tag.clone(),
            name: self.name.clone(),
            active: self.active,
            parent: self.parent,
            children: self.children().to_vec(),
            capabilities: self.capabilities.clone(),
            data: self.data.clone(),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("type_tag", &self.type_tag)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("capabilities", &self.capabilities)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Serialisable summary of an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    /// Identifier
    pub id: ObjectId,
    /// Type tag
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Name
    pub name: Option<String>,
    /// Active flag
    pub active: bool,
    /// Parent container
    pub parent: Option<ObjectId>,
    /// Children in draw order
    pub children: Vec<ObjectId>,
    /// Attached capabilities
    pub capabilities: Vec<String>,
    /// Data bag
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Health(u32);

    #[test]
    fn desc_type_tag_wins_over_default() {
        let entity = Entity::from_desc(ObjectId(1), EntityDesc::new().typed("Player"), "unit");
        assert_eq!(entity.type_tag(), "Player");

        let entity = Entity::from_desc(ObjectId(2), EntityDesc::new(), "unit");
        assert_eq!(entity.type_tag(), "unit");
        assert!(entity.active);
    }

    #[test]
    fn extensions_are_keyed_by_type() {
        let mut entity = Entity::from_desc(ObjectId(1), EntityDesc::new(), "unit");
        assert!(entity.extension::<Health>().is_none());

        assert_eq!(entity.insert_extension(Health(10)), None);
        entity.extension_mut::<Health>().unwrap().0 -= 3;
        assert_eq!(entity.extension::<Health>(), Some(&Health(7)));
        assert_eq!(entity.insert_extension(Health(1)), Some(Health(7)));
    }

    #[test]
    fn snapshot_serialises_to_json() {
        let mut entity = Entity::from_desc(ObjectId(4), EntityDesc::new().named("hero"), "unit");
        entity.data.insert("health".into(), serde_json::json!(100));

        let json = serde_json::to_value(entity.snapshot()).unwrap();
        assert_eq!(json["id"], serde_json::json!(4));
        assert_eq!(json["type"], serde_json::json!("unit"));
        assert_eq!(json["name"], serde_json::json!("hero"));
        assert_eq!(json["data"]["health"], serde_json::json!(100));
    }
}
