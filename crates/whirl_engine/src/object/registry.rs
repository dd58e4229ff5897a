//! Object registry: identifier allocation, capability attachment and queries

use super::capability::builtin;
use super::{Capability, Entity, EntityDesc, EntitySnapshot, ObjectId};
use crate::events::{names, EventData, EventError, EventHub};
use crate::frame::FrameSnapshot;
use std::collections::HashMap;

/// Owning collection of every live entity in one game instance.
///
/// Entities are stored by id for O(1) access. The *index* is the ordered list
/// of entities registered with `store = true`; queries scan it linearly.
pub struct ObjectRegistry {
    entities: HashMap<ObjectId, Entity>,
    index: Vec<ObjectId>,
    installers: HashMap<String, Box<dyn Capability>>,
    next_id: u64,
}

impl ObjectRegistry {
    /// Create an empty registry with the built-in capabilities installed
    pub fn new() -> Self {
        let mut registry = Self {
            entities: HashMap::new(),
            index: Vec::new(),
            installers: HashMap::new(),
            next_id: 0,
        };

        registry.register_capability(builtin::EVENTS, builtin::install_events);
        registry.register_capability(builtin::CHILDREN, builtin::install_children);
        registry.register_capability(builtin::VIEWPORT, builtin::install_viewport);
        registry.register_capability(builtin::SPRITE, builtin::install_sprite);

        registry
    }

    /// Make a capability available to `init` and `attach_capabilities`.
    ///
    /// Registering a name twice replaces the earlier installer for future
    /// attachments only.
    pub fn register_capability(&mut self, name: &str, installer: impl Capability + 'static) {
        if self
            .installers
            .insert(name.to_string(), Box::new(installer))
            .is_some()
        {
            log::warn!("Capability \"{name}\" installer replaced");
        }
    }

    /// Whether a capability with this name can be attached
    pub fn knows_capability(&self, name: &str) -> bool {
        self.installers.contains_key(name)
    }

    fn next_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a new entity.
    ///
    /// Assigns the next identifier, applies `type_tag` unless the presets
    /// carry one, attaches the requested capabilities and, if `store` is set,
    /// appends the entity to the index. Announces `didInitObject` on `hub`.
    ///
    /// The entity stays registered even if a `didInitObject` listener fails.
    pub fn init(
        &mut self,
        desc: EntityDesc,
        type_tag: &str,
        capabilities: &[&str],
        store: bool,
        hub: &mut EventHub,
    ) -> Result<ObjectId, EventError> {
        let id = self.next_id();
        let entity = Entity::from_desc(id, desc, type_tag);
        log::debug!("Registered {} as {id}", entity.type_tag());

        self.entities.insert(id, entity);
        self.attach_capabilities(id, capabilities);

        if store {
            self.index.push(id);
        }

        hub.emit(
            names::DID_INIT_OBJECT,
            EventData::new().with("object", id).with(
                "capabilities",
                capabilities.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ),
        )?;

        Ok(id)
    }

    /// Attach capabilities to a registered entity.
    ///
    /// Each name is attached at most once; repeats, unknown names and failing
    /// installers are reported and skipped without affecting the rest.
    /// Returns `false` only when `id` is not registered.
    pub fn attach_capabilities(&mut self, id: ObjectId, capabilities: &[&str]) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            log::warn!("{id} is not registered; cannot attach capabilities");
            return false;
        };

        for &name in capabilities {
            if entity.has_capability(name) {
                log::warn!("Capability \"{name}\" has already been attached to {id}");
                continue;
            }

            let Some(installer) = self.installers.get(name) else {
                log::warn!("Unknown capability \"{name}\" requested for {id}");
                continue;
            };

            match installer.install(entity) {
                Ok(()) => entity.record_capability(name),
                Err(err) => log::warn!("Capability \"{name}\" failed to install on {id}: {err:#}"),
            }
        }

        true
    }

    /// Borrow an entity by id, indexed or not
    pub fn get(&self, id: ObjectId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutably borrow an entity by id
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Whether an entity with this id is alive
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entities.contains_key(&id)
    }

    fn filter_index(&self, predicate: impl Fn(&Entity) -> bool) -> Vec<&Entity> {
        self.get_all().filter(|entity| predicate(entity)).collect()
    }

    /// Indexed entities whose name equals `name`
    pub fn get_by_name(&self, name: &str) -> Vec<&Entity> {
        self.filter_index(|entity| entity.name.as_deref() == Some(name))
    }

    /// Indexed entities with this id (zero or one)
    pub fn get_by_id(&self, id: ObjectId) -> Vec<&Entity> {
        self.filter_index(|entity| entity.id() == id)
    }

    /// Indexed entities whose type tag equals `type_tag`
    pub fn get_by_type(&self, type_tag: &str) -> Vec<&Entity> {
        self.filter_index(|entity| entity.type_tag() == type_tag)
    }

    /// Every indexed entity, in registration order
    pub fn get_all(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.index.iter().filter_map(|id| self.entities.get(id))
    }

    /// Ids of the indexed entities, in registration order
    pub fn index(&self) -> &[ObjectId] {
        &self.index
    }

    /// Number of indexed entities
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Remove an indexed entity and return it.
    ///
    /// The entity is detached from its parent and its own children are
    /// orphaned, not destroyed. Returns `None` if no indexed entity has this id.
    pub fn destroy_by_id(&mut self, id: ObjectId) -> Option<Entity> {
        if !self.index.contains(&id) {
            log::warn!("Cannot destroy {id}: not found");
            return None;
        }
        self.remove(id)
    }

    /// Remove any registered entity, indexed or not, with the same unlinking
    /// as [`ObjectRegistry::destroy_by_id`]
    pub fn remove(&mut self, id: ObjectId) -> Option<Entity> {
        let mut entity = self.entities.remove(&id)?;
        self.index.retain(|indexed| *indexed != id);

        if let Some(parent) = entity.parent.take() {
            if let Some(children) = self
                .entities
                .get_mut(&parent)
                .and_then(|parent| parent.children.as_mut())
            {
                children.retain(|child| *child != id);
            }
        }

        for child in entity.children() {
            if let Some(child) = self.entities.get_mut(child) {
                child.parent = None;
            }
        }

        log::debug!("Destroyed {id} ({})", entity.type_tag());
        Some(entity)
    }

    /// Run the update hook of every active indexed entity, in index order.
    ///
    /// A failing hook does not prevent the others from running; the first
    /// failure is returned.
    pub(crate) fn run_behaviours(&mut self, frame: &FrameSnapshot) -> anyhow::Result<()> {
        let mut first_error = None;

        for id in &self.index {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            if !entity.active {
                continue;
            }
            let Some(mut behaviour) = entity.behaviour.take() else {
                continue;
            };

            entity.behaviour_cleared = false;
            if let Err(err) = behaviour.update(entity, frame) {
                log::warn!("Update hook of {id} failed: {err:#}");
                first_error.get_or_insert(err.context(format!("update hook of {id}")));
            }

            // The hook may have replaced or cleared itself.
            if !entity.behaviour_cleared {
                entity.behaviour.get_or_insert(behaviour);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Serialisable view of every indexed entity
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.get_all().map(Entity::snapshot).collect()
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
