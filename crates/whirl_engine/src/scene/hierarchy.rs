//! Parent/child links between registered entities
//!
//! The tree lives in the registry: a container's child list holds ids and
//! each child keeps a non-owning parent id. Every mutation keeps the two
//! sides consistent and rejects links that would make an entity its own
//! ancestor.

use crate::object::{ObjectId, ObjectRegistry};
use thiserror::Error;

/// Structural errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id does not belong to a live entity
    #[error("{0} is not registered")]
    UnknownEntity(ObjectId),

    /// The target cannot hold children
    #[error("{0} is not a container")]
    NotAContainer(ObjectId),

    /// The link would make an entity its own ancestor
    #[error("adding {child} to {container} would create a cycle")]
    Cycle {
        /// Prospective parent
        container: ObjectId,
        /// Prospective child
        child: ObjectId,
    },

    /// The entity is not a child of the container
    #[error("{child} is not a child of {container}")]
    NotAChild {
        /// Container
        container: ObjectId,
        /// Entity that was expected among its children
        child: ObjectId,
    },
}

impl ObjectRegistry {
    /// Append `child` to `container`'s children.
    ///
    /// A child already owned by another container is detached from it first;
    /// re-adding to the same container moves it to the end of the draw order.
    pub fn add_child(&mut self, container: ObjectId, child: ObjectId) -> Result<(), SceneError> {
        let target = self.get(container).ok_or(SceneError::UnknownEntity(container))?;
        if !target.is_container() {
            return Err(SceneError::NotAContainer(container));
        }
        if !self.contains(child) {
            return Err(SceneError::UnknownEntity(child));
        }
        if child == container || self.is_ancestor(child, container) {
            return Err(SceneError::Cycle { container, child });
        }

        self.detach(child);

        if let Some(children) = self.get_mut(container).and_then(|c| c.children.as_mut()) {
            children.push(child);
        }
        if let Some(entity) = self.get_mut(child) {
            entity.parent = Some(container);
        }

        log::debug!("Added {child} to {container}");
        Ok(())
    }

    /// Remove `child` from `container`, leaving it parentless
    pub fn remove_child(&mut self, container: ObjectId, child: ObjectId) -> Result<(), SceneError> {
        let target = self.get(container).ok_or(SceneError::UnknownEntity(container))?;
        if !target.is_container() {
            return Err(SceneError::NotAContainer(container));
        }
        if self.get(child).and_then(|c| c.parent()) != Some(container) {
            return Err(SceneError::NotAChild { container, child });
        }

        self.detach(child);
        log::debug!("Removed {child} from {container}");
        Ok(())
    }

    /// Clear `child`'s parent link on both sides; returns the former parent
    fn detach(&mut self, child: ObjectId) -> Option<ObjectId> {
        let parent = self.get_mut(child)?.parent.take()?;
        if let Some(children) = self.get_mut(parent).and_then(|p| p.children.as_mut()) {
            children.retain(|id| *id != child);
        }
        Some(parent)
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|e| e.parent());
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).and_then(|e| e.parent());
        }
        chain
    }

    /// Whether `ancestor` appears above `id` in the tree
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }
}
