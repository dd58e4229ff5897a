//! Listener table and dispatch

use super::{Event, EventData, EventError, ListenerId};
use std::collections::HashMap;
use std::fmt;

/// Listener callback.
///
/// Callbacks only see the delivery, never the hub itself, so a listener
/// cannot add or remove listeners while an emit is iterating.
pub type Callback = Box<dyn FnMut(&Event<'_>) -> anyhow::Result<()>>;

struct Listener {
    id: ListenerId,
    once: bool,
    callback: Callback,
}

/// Mapping from event name to an ordered list of listeners.
///
/// An event name with no listeners has no entry at all, so
/// [`EventHub::has_listeners`] distinguishes "never registered / all removed"
/// from a populated list.
#[derive(Default)]
pub struct EventHub {
    listeners: HashMap<String, Vec<Listener>>,
    next_id: u64,
}

impl EventHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its id
    pub fn add_listener<F>(&mut self, name: &str, callback: F, once: bool) -> ListenerId
    where
        F: FnMut(&Event<'_>) -> anyhow::Result<()> + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        self.listeners
            .entry(name.to_string())
            .or_default()
            .push(Listener {
                id,
                once,
                callback: Box::new(callback),
            });

        id
    }

    /// Register a listener; returns the hub for chaining
    pub fn on<F>(&mut self, name: &str, callback: F) -> &mut Self
    where
        F: FnMut(&Event<'_>) -> anyhow::Result<()> + 'static,
    {
        self.add_listener(name, callback, false);
        self
    }

    /// Register a listener that is removed after it fires once
    pub fn on_once<F>(&mut self, name: &str, callback: F) -> &mut Self
    where
        F: FnMut(&Event<'_>) -> anyhow::Result<()> + 'static,
    {
        self.add_listener(name, callback, true);
        self
    }

    /// Deliver `data` to the listeners of `name` in registration order.
    ///
    /// When a one-shot listener fires it is removed and the remaining
    /// listeners are not invoked for this emit. A failing listener stops the
    /// emit and its error is returned as-is.
    pub fn emit(&mut self, name: &str, data: EventData) -> Result<(), EventError> {
        let Some(listeners) = self.listeners.get_mut(name) else {
            return Ok(());
        };

        let mut fired_once = None;
        for listener in listeners.iter_mut() {
            let event = Event {
                name,
                listener_id: listener.id,
                data: &data,
            };

            (listener.callback)(&event).map_err(|source| EventError::Listener {
                event: name.to_string(),
                listener: listener.id,
                source,
            })?;

            if listener.once {
                fired_once = Some(listener.id);
                break;
            }
        }

        if let Some(id) = fired_once {
            self.remove_by_id(name, id);
        }

        Ok(())
    }

    /// Remove one listener. Drops the event entry when it was the last one.
    ///
    /// Returns whether a listener was removed.
    pub fn remove_by_id(&mut self, name: &str, id: ListenerId) -> bool {
        let Some(listeners) = self.listeners.get_mut(name) else {
            log::warn!("No listeners registered for \"{name}\"; cannot remove {id}");
            return false;
        };

        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        let removed = listeners.len() != before;

        if listeners.is_empty() {
            self.listeners.remove(name);
        }

        removed
    }

    /// Remove every listener for `name`
    pub fn remove_all(&mut self, name: &str) -> bool {
        self.listeners.remove(name).is_some()
    }

    /// Whether any listener is registered for `name`
    pub fn has_listeners(&self, name: &str) -> bool {
        self.listeners.contains_key(name)
    }

    /// Number of listeners registered for `name`
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }

    /// Ids of the listeners for `name`, in firing order
    pub fn listener_ids(&self, name: &str) -> Vec<ListenerId> {
        self.listeners
            .get(name)
            .map(|listeners| listeners.iter().map(|listener| listener.id).collect())
            .unwrap_or_default()
    }

    /// Event names with at least one listener
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.listeners.keys().map(String::as_str)
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(name, listeners)| (name.as_str(), listeners.len()))
            .collect();
        f.debug_struct("EventHub")
            .field("listeners", &counts)
            .field("next_id", &self.next_id)
            .finish()
    }
}
