//! Notification hub: per-object publish/subscribe channels
//!
//! Key principles:
//! - Listeners are keyed by event name and fire in registration order
//! - Payloads are key-value arguments (no order dependency)
//! - The firing listener's id is injected into every delivery
//! - One-shot listeners are removed right after they fire
//!
//! The game instance owns one hub for its lifecycle notifications; any entity
//! with the `events` capability owns another.

mod hub;

pub use hub::{Callback, EventHub};

use crate::object::ObjectId;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Names of the notifications the runtime itself emits
pub mod names {
    /// Game `start` invoked, before any state changes
    pub const WILL_START: &str = "willStart";
    /// Game started, running flag and start time set
    pub const DID_START: &str = "didStart";
    /// Tick begins, payload carries the pre-update counters
    pub const WILL_UPDATE: &str = "willUpdate";
    /// Tick bookkeeping done, payload carries the post-update counters
    pub const DID_UPDATE: &str = "didUpdate";
    /// Game `stop` requested
    pub const WILL_STOP: &str = "willStop";
    /// Final tick after a stop request has completed
    pub const DID_STOP: &str = "didStop";
    /// An object was registered
    pub const DID_INIT_OBJECT: &str = "didInitObject";
    /// An object was destroyed
    pub const DID_DESTROY_OBJECT: &str = "didDestroyObject";
    /// A child was added to the emitting container
    pub const DID_ADD_CHILD: &str = "didAddChild";
    /// A child was removed from the emitting container
    pub const DID_REMOVE_CHILD: &str = "didRemoveChild";
    /// An asset finished loading
    pub const DID_LOAD: &str = "didLoad";
    /// An asset failed to load
    pub const DID_FAIL: &str = "didFail";
}

/// Per-hub listener identifier, allocated in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Variant for type-safe event arguments
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Frame counter or other count
    Count(u64),
    /// Millisecond timestamps, deltas and other measurements
    Number(f64),
    /// Reference to a registered object
    Object(ObjectId),
    /// Ordered list of names (e.g. requested capabilities)
    Names(Vec<String>),
    /// Free text
    Text(String),
    /// Boolean flag
    Flag(bool),
    /// Arbitrary JSON value
    Json(serde_json::Value),
}

impl From<u64> for EventArg {
    fn from(value: u64) -> Self {
        Self::Count(value)
    }
}

impl From<f64> for EventArg {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<ObjectId> for EventArg {
    fn from(value: ObjectId) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<String>> for EventArg {
    fn from(value: Vec<String>) -> Self {
        Self::Names(value)
    }
}

impl From<&str> for EventArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EventArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for EventArg {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<serde_json::Value> for EventArg {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Event payload: key-value arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventData {
    args: HashMap<&'static str, EventArg>,
}

impl EventData {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument (builder pattern)
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<EventArg>) -> Self {
        self.args.insert(key, value.into());
        self
    }

    /// Insert or replace an argument
    pub fn insert(&mut self, key: &'static str, value: impl Into<EventArg>) {
        self.args.insert(key, value.into());
    }

    /// Get an argument by key
    pub fn get(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get a count argument
    pub fn count(&self, key: &str) -> Option<u64> {
        match self.get(key) {
            Some(EventArg::Count(value)) => Some(*value),
            _ => None,
        }
    }

    /// Get a numeric argument; counts are widened
    #[allow(clippy::cast_precision_loss)]
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            Some(EventArg::Number(value)) => Some(*value),
            Some(EventArg::Count(value)) => Some(*value as f64),
            _ => None,
        }
    }

    /// Get an object argument
    pub fn object(&self, key: &str) -> Option<ObjectId> {
        match self.get(key) {
            Some(EventArg::Object(id)) => Some(*id),
            _ => None,
        }
    }

    /// Get a list-of-names argument
    pub fn names(&self, key: &str) -> Option<&[String]> {
        match self.get(key) {
            Some(EventArg::Names(names)) => Some(names),
            _ => None,
        }
    }

    /// Get a text argument
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(EventArg::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Get a flag argument
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(EventArg::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether the payload carries no arguments
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// A single delivery of a payload to one listener
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// Event name the listener was registered under
    pub name: &'a str,
    /// Id of the listener being invoked
    pub listener_id: ListenerId,
    /// Payload passed to `emit`
    pub data: &'a EventData,
}

/// Failure raised by a listener callback, propagated unmodified to the emitter
#[derive(Error, Debug)]
pub enum EventError {
    /// A listener returned an error
    #[error("listener {listener} for \"{event}\" failed: {source}")]
    Listener {
        /// Event being emitted
        event: String,
        /// Listener that failed
        listener: ListenerId,
        /// Error returned by the callback
        #[source]
        source: anyhow::Error,
    },
}
