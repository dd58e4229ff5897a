//! Asset collaborator
//!
//! Assets are registry entities with the `events` capability. The manager
//! never loads anything itself: it queues [`LoadRequest`]s for an external
//! loader, which reports back through a channel from any thread. Completions
//! are drained between frames by [`AssetManager::poll`], which flips the
//! asset's `loaded` flag and fires `didLoad` or `didFail` on the asset's hub.

use crate::events::{names, EventData, EventError, EventHub};
use crate::object::{builtin, EntityDesc, ObjectId, ObjectRegistry};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Type tag of asset entities
pub const ASSET_TYPE: &str = "Whirl.Asset";

/// Kind of data an asset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Bitmap image
    Image,
    /// Audio clip
    Audio,
    /// JSON document
    Json,
    /// Plain text
    Text,
}

/// What to load and under which name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Lookup name
    pub name: String,
    /// Kind of data
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Source location, interpreted by the loader
    pub src: String,
}

impl AssetDescriptor {
    /// Create a descriptor
    pub fn new(name: impl Into<String>, kind: AssetKind, src: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            src: src.into(),
        }
    }
}

/// Handle to a registered asset
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Registry entity carrying the asset's hub
    pub id: ObjectId,
    /// Lookup name
    pub name: String,
    /// Kind of data
    pub kind: AssetKind,
    /// Source location
    pub src: String,
    loaded: bool,
    requested_at: f64,
}

impl Asset {
    /// Whether loading has completed; flips to true exactly once
    pub fn loaded(&self) -> bool {
        self.loaded
    }
}

/// Work item for an external loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Asset to report back for
    pub asset: ObjectId,
    /// Kind of data
    pub kind: AssetKind,
    /// Source location
    pub src: String,
}

/// Outcome reported by an external loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCompletion {
    /// The asset's data is available
    Loaded(ObjectId),
    /// Loading gave up
    Failed(ObjectId, String),
}

/// Asset list in registration order plus the completion channel
#[derive(Debug)]
pub struct AssetManager {
    assets: Vec<Asset>,
    requests: Vec<LoadRequest>,
    sender: Sender<LoadCompletion>,
    receiver: Receiver<LoadCompletion>,
}

impl AssetManager {
    /// Create an empty manager with its own completion channel
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            assets: Vec::new(),
            requests: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Register an asset and queue its load request.
    ///
    /// The asset entity is announced through `didInitObject` on `hub`.
    pub fn add(
        &mut self,
        registry: &mut ObjectRegistry,
        hub: &mut EventHub,
        descriptor: AssetDescriptor,
        now: f64,
    ) -> Result<ObjectId, EventError> {
        let id = registry.init(
            EntityDesc::new().named(descriptor.name.clone()),
            ASSET_TYPE,
            &[builtin::EVENTS],
            true,
            hub,
        )?;

        log::debug!("Queued {:?} asset '{}' from {}", descriptor.kind, descriptor.name, descriptor.src);
        self.requests.push(LoadRequest {
            asset: id,
            kind: descriptor.kind,
            src: descriptor.src.clone(),
        });
        self.assets.push(Asset {
            id,
            name: descriptor.name,
            kind: descriptor.kind,
            src: descriptor.src,
            loaded: false,
            requested_at: now,
        });
        Ok(id)
    }

    /// Register several assets, in order
    pub fn add_all(
        &mut self,
        registry: &mut ObjectRegistry,
        hub: &mut EventHub,
        descriptors: impl IntoIterator<Item = AssetDescriptor>,
        now: f64,
    ) -> Result<Vec<ObjectId>, EventError> {
        descriptors
            .into_iter()
            .map(|descriptor| self.add(registry, hub, descriptor, now))
            .collect()
    }

    /// First asset registered under `name`
    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.name == name)
    }

    /// Asset by entity id
    pub fn get_by_id(&self, id: ObjectId) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.id == id)
    }

    /// Every asset in registration order
    pub fn get_all(&self) -> &[Asset] {
        &self.assets
    }

    /// Drop the entry for a destroyed asset entity, along with any request
    /// still queued for it. Later completions for `id` are ignored.
    pub fn forget(&mut self, id: ObjectId) -> Option<Asset> {
        self.requests.retain(|request| request.asset != id);
        let position = self.assets.iter().position(|asset| asset.id == id)?;
        log::debug!("Forgot asset '{}'", self.assets[position].name);
        Some(self.assets.remove(position))
    }

    /// Hand the queued requests to a loader
    pub fn take_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Channel end for reporting completions; clone freely across threads
    pub fn completions(&self) -> Sender<LoadCompletion> {
        self.sender.clone()
    }

    /// Apply every completion reported so far.
    ///
    /// Completions for unknown or already settled assets are ignored with a
    /// warning. All pending completions are applied even if a listener fails;
    /// the first listener error is returned. Returns how many were applied.
    pub fn poll(&mut self, registry: &mut ObjectRegistry, now: f64) -> Result<usize, EventError> {
        let mut applied = 0;
        let mut first_error = None;

        for completion in self.receiver.try_iter() {
            let (id, failure) = match completion {
                LoadCompletion::Loaded(id) => (id, None),
                LoadCompletion::Failed(id, reason) => (id, Some(reason)),
            };

            let Some(asset) = self.assets.iter_mut().find(|asset| asset.id == id) else {
                log::warn!("Load completion for unknown asset {id}");
                continue;
            };
            if asset.loaded {
                log::warn!("Asset '{}' already loaded; ignoring completion", asset.name);
                continue;
            }

            let (event, data) = match failure {
                None => {
                    asset.loaded = true;
                    let taken = now - asset.requested_at;
                    log::debug!("Loaded asset '{}' in {taken:.2}ms", asset.name);
                    (
                        names::DID_LOAD,
                        EventData::new()
                            .with("name", asset.name.as_str())
                            .with("asset", id)
                            .with("timeTaken", taken),
                    )
                }
                Some(reason) => {
                    log::warn!("Failed to load asset '{}': {reason}", asset.name);
                    (
                        names::DID_FAIL,
                        EventData::new()
                            .with("name", asset.name.as_str())
                            .with("asset", id)
                            .with("reason", reason),
                    )
                }
            };
            applied += 1;

            let hub = registry.get_mut(id).and_then(|entity| entity.events_mut());
            if let Some(hub) = hub {
                if let Err(err) = hub.emit(event, data) {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(applied),
        }
    }
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        registry: ObjectRegistry,
        hub: EventHub,
        assets: AssetManager,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: ObjectRegistry::new(),
                hub: EventHub::new(),
                assets: AssetManager::new(),
            }
        }

        fn add(&mut self, name: &str, now: f64) -> ObjectId {
            self.assets
                .add(
                    &mut self.registry,
                    &mut self.hub,
                    AssetDescriptor::new(name, AssetKind::Image, format!("{name}.png")),
                    now,
                )
                .unwrap()
        }

        fn record(&mut self, id: ObjectId, event: &str) -> Rc<RefCell<Vec<EventData>>> {
            let seen: Rc<RefCell<Vec<EventData>>> = Rc::default();
            let sink = Rc::clone(&seen);
            self.registry.get_mut(id).unwrap().events_mut().unwrap().on(event, move |e| {
                sink.borrow_mut().push(e.data.clone());
                Ok(())
            });
            seen
        }
    }

    #[test]
    fn add_registers_an_entity_and_a_request() {
        let mut fx = Fixture::new();
        let id = fx.add("ship", 0.0);

        let entity = fx.registry.get(id).unwrap();
        assert_eq!(entity.type_tag(), ASSET_TYPE);
        assert_eq!(entity.name.as_deref(), Some("ship"));
        assert!(entity.events().is_some());
        assert!(!fx.assets.get("ship").unwrap().loaded());
        assert_eq!(fx.assets.take_requests()[0].src, "ship.png");
        assert!(fx.assets.take_requests().is_empty());
    }

    #[test]
    fn add_all_keeps_order() {
        let mut fx = Fixture::new();
        let ids = fx
            .assets
            .add_all(
                &mut fx.registry,
                &mut fx.hub,
                vec![
                    AssetDescriptor::new("a", AssetKind::Audio, "a.ogg"),
                    AssetDescriptor::new("b", AssetKind::Json, "b.json"),
                ],
                0.0,
            )
            .unwrap();

        let names: Vec<_> = fx.assets.get_all().iter().map(|asset| asset.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(fx.assets.get_by_id(ids[1]).unwrap().kind, AssetKind::Json);
        assert!(fx.assets.get("c").is_none());
    }

    #[test]
    fn completion_flips_loaded_once_and_fires_did_load() {
        let mut fx = Fixture::new();
        let id = fx.add("ship", 100.0);
        let seen = fx.record(id, names::DID_LOAD);
        let sender = fx.assets.completions();

        sender.send(LoadCompletion::Loaded(id)).unwrap();
        sender.send(LoadCompletion::Loaded(id)).unwrap();
        assert_eq!(fx.assets.poll(&mut fx.registry, 130.0).unwrap(), 1);

        assert!(fx.assets.get("ship").unwrap().loaded());
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text("name"), Some("ship"));
        assert_eq!(seen[0].object("asset"), Some(id));
        assert_eq!(seen[0].number("timeTaken"), Some(30.0));
    }

    #[test]
    fn failure_fires_did_fail_and_stays_unloaded() {
        let mut fx = Fixture::new();
        let id = fx.add("ship", 0.0);
        let seen = fx.record(id, names::DID_FAIL);

        fx.assets
            .completions()
            .send(LoadCompletion::Failed(id, "404".into()))
            .unwrap();
        fx.assets.poll(&mut fx.registry, 5.0).unwrap();

        assert!(!fx.assets.get("ship").unwrap().loaded());
        assert_eq!(seen.borrow()[0].text("reason"), Some("404"));
    }

    #[test]
    fn completions_arrive_from_loader_threads() {
        let mut fx = Fixture::new();
        let id = fx.add("ship", 0.0);
        let requests = fx.assets.take_requests();
        let sender = fx.assets.completions();

        std::thread::spawn(move || {
            for request in requests {
                sender.send(LoadCompletion::Loaded(request.asset)).unwrap();
            }
        })
        .join()
        .unwrap();

        assert_eq!(fx.assets.poll(&mut fx.registry, 1.0).unwrap(), 1);
        assert!(fx.assets.get_by_id(id).unwrap().loaded());
    }

    #[test]
    fn forgotten_assets_lose_their_request_and_completion() {
        let mut fx = Fixture::new();
        let ship = fx.add("ship", 0.0);
        let rock = fx.add("rock", 0.0);

        assert_eq!(fx.assets.forget(ship).map(|asset| asset.name), Some("ship".to_string()));
        assert!(fx.assets.forget(ship).is_none());
        assert!(fx.assets.get("ship").is_none());
        let requests = fx.assets.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].asset, rock);

        fx.assets.completions().send(LoadCompletion::Loaded(ship)).unwrap();
        assert_eq!(fx.assets.poll(&mut fx.registry, 1.0).unwrap(), 0);
    }

    #[test]
    fn unknown_assets_are_ignored() {
        let mut fx = Fixture::new();
        fx.assets.completions().send(LoadCompletion::Loaded(ObjectId(404))).unwrap();
        assert_eq!(fx.assets.poll(&mut fx.registry, 0.0).unwrap(), 0);
    }
}
