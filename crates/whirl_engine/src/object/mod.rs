//! Object registry: identity, capabilities and the live-object index
//!
//! Every live object in a game instance is an [`Entity`] owned by that
//! instance's [`ObjectRegistry`]. Extended behaviour is attached at runtime as
//! named capabilities rather than through a type hierarchy: a container is an
//! entity with the `children` capability, a viewport one with `viewport`, and
//! so on.

mod capability;
mod entity;
mod registry;

pub use capability::{builtin, Capability};
pub use entity::{Behaviour, Entity, EntityDesc, EntitySnapshot};
pub use registry::ObjectRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object identifier, unique within its registry, assigned once at
/// registration and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.0)
    }
}
