//! Game instance
//!
//! [`Game`] owns one of everything: the game-wide event hub, the object
//! registry, the frame scheduler, the asset manager, the viewport list and
//! the drawing backend. Nothing here is global; several games can coexist
//! in one process.

use crate::application::{AppError, Application};
use crate::assets::AssetManager;
use crate::config::{ConfigError, GameConfig};
use crate::events::{names, EventData, EventError, EventHub};
use crate::foundation::time::{MonotonicClock, Stopwatch, TimeSource};
use crate::frame::{FrameScheduler, FrameSnapshot, TickOutcome};
use crate::object::{builtin, Entity, EntityDesc, ObjectId, ObjectRegistry};
use crate::render::{render_frame, RenderBackend, RenderSettings, RenderStats};
use crate::scene::{SceneError, Sprite, Viewport, ViewportOptions};
use std::time::Duration;
use thiserror::Error;

/// Type tag of containers created through [`Game::create_container`]
pub const CONTAINER_TYPE: &str = "Whirl.Container";
/// Type tag of viewports created through [`Game::create_viewport`]
pub const VIEWPORT_TYPE: &str = "Whirl.Viewport";
/// Type tag of sprites created through [`Game::create_sprite`]
pub const SPRITE_TYPE: &str = "Whirl.Sprite";

/// Game-level errors
#[derive(Error, Debug)]
pub enum GameError {
    /// Configuration rejected
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A listener failed
    #[error(transparent)]
    Event(#[from] EventError),

    /// A hierarchy edit was refused
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// An entity update hook failed
    #[error("Update hook failed: {0}")]
    Behaviour(#[source] anyhow::Error),
}

/// A running game instance
pub struct Game<B: RenderBackend> {
    events: EventHub,
    registry: ObjectRegistry,
    scheduler: FrameScheduler,
    assets: AssetManager,
    viewports: Vec<ObjectId>,
    backend: B,
    clock: Box<dyn TimeSource>,
    render: RenderSettings,
    last_render: RenderStats,
    config: GameConfig,
}

impl<B: RenderBackend> Game<B> {
    /// Create a game timed by the monotonic system clock
    pub fn new(config: GameConfig, backend: B) -> Result<Self, GameError> {
        Self::with_clock(config, backend, MonotonicClock::new())
    }

    /// Create a game timed by `clock`.
    ///
    /// Viewports listed in the configuration are created immediately, in order.
    pub fn with_clock(
        config: GameConfig,
        backend: B,
        clock: impl TimeSource + 'static,
    ) -> Result<Self, GameError> {
        config.validate()?;

        let init_time = clock.now_ms();
        let mut game = Self {
            events: EventHub::new(),
            registry: ObjectRegistry::new(),
            scheduler: FrameScheduler::new(init_time, config.frame_rate, config.timestep),
            assets: AssetManager::new(),
            viewports: Vec::new(),
            backend,
            clock: Box::new(clock),
            render: RenderSettings {
                default_surface: config.default_surface.clone(),
                clear_viewports: config.clear_viewports,
            },
            last_render: RenderStats::default(),
            config,
        };

        for options in game.config.viewports.clone() {
            game.create_viewport(EntityDesc::new(), options)?;
        }

        log::info!(
            "Game created: {} fps, {:?} timestep, surface '{}'",
            game.config.frame_rate,
            game.config.timestep,
            game.config.default_surface
        );
        Ok(game)
    }

    /// Register an entity with the given capabilities and add it to the index
    pub fn spawn(
        &mut self,
        desc: EntityDesc,
        type_tag: &str,
        capabilities: &[&str],
    ) -> Result<ObjectId, GameError> {
        Ok(self
            .registry
            .init(desc, type_tag, capabilities, true, &mut self.events)?)
    }

    /// Create an empty container with its own event hub
    pub fn create_container(&mut self, desc: EntityDesc) -> Result<ObjectId, GameError> {
        self.spawn(desc, CONTAINER_TYPE, &[builtin::EVENTS, builtin::CHILDREN])
    }

    /// Create a viewport from `options` and append it to the render order
    pub fn create_viewport(
        &mut self,
        desc: EntityDesc,
        options: ViewportOptions,
    ) -> Result<ObjectId, GameError> {
        let id = self.spawn(desc, VIEWPORT_TYPE, &[builtin::EVENTS, builtin::VIEWPORT])?;
        if let Some(viewport) = self.registry.get_mut(id).and_then(Entity::viewport_mut) {
            *viewport = Viewport::from(options);
        }
        self.viewports.push(id);
        Ok(id)
    }

    /// Create a sprite
    pub fn create_sprite(&mut self, desc: EntityDesc, sprite: Sprite) -> Result<ObjectId, GameError> {
        let id = self.spawn(desc, SPRITE_TYPE, &[builtin::EVENTS, builtin::SPRITE])?;
        if let Some(slot) = self.registry.get_mut(id).and_then(Entity::sprite_mut) {
            *slot = sprite;
        }
        Ok(id)
    }

    /// Move `child` under `container` and announce `didAddChild` on the
    /// container's hub
    pub fn add_child(&mut self, container: ObjectId, child: ObjectId) -> Result<(), GameError> {
        self.registry.add_child(container, child)?;
        self.emit_on(container, names::DID_ADD_CHILD, child)
    }

    /// Detach `child` from `container` and announce `didRemoveChild` on the
    /// container's hub
    pub fn remove_child(&mut self, container: ObjectId, child: ObjectId) -> Result<(), GameError> {
        self.registry.remove_child(container, child)?;
        self.emit_on(container, names::DID_REMOVE_CHILD, child)
    }

    fn emit_on(&mut self, container: ObjectId, event: &str, child: ObjectId) -> Result<(), GameError> {
        if let Some(hub) = self.registry.get_mut(container).and_then(Entity::events_mut) {
            hub.emit(
                event,
                EventData::new().with("container", container).with("child", child),
            )?;
        }
        Ok(())
    }

    /// Remove an entity from the game.
    ///
    /// Children are orphaned, not destroyed, and an asset entity's entry
    /// leaves the asset manager. Announces `didDestroyObject` on the game
    /// hub. Returns `None` with a warning for unknown ids.
    pub fn destroy(&mut self, id: ObjectId) -> Result<Option<Entity>, GameError> {
        let Some(entity) = self.registry.remove(id) else {
            log::warn!("Cannot destroy {id}: not registered");
            return Ok(None);
        };
        self.viewports.retain(|viewport| *viewport != id);
        self.assets.forget(id);

        self.events.emit(
            names::DID_DESTROY_OBJECT,
            EventData::new()
                .with("object", id)
                .with("type", entity.type_tag()),
        )?;
        Ok(Some(entity))
    }

    /// Start the frame clock
    pub fn start(&mut self) -> Result<(), GameError> {
        let now = self.clock.now_ms();
        Ok(self.scheduler.start(&mut self.events, now)?)
    }

    /// Ask the frame clock to stop after one more tick
    pub fn stop(&mut self) -> Result<(), GameError> {
        Ok(self.scheduler.stop(&mut self.events)?)
    }

    /// Apply asset completions, then run a tick if one is due.
    ///
    /// A tick runs the update hooks of all active entities and renders every
    /// viewport. Returns `None` when no tick was due. Failures never leave the
    /// clock half-updated; the first one is returned once the tick is over.
    pub fn step(&mut self) -> Result<Option<TickOutcome>, GameError> {
        let now = self.clock.now_ms();
        let polled = self.assets.poll(&mut self.registry, now);

        if !self.scheduler.is_due(now) {
            polled?;
            return Ok(None);
        }

        let registry = &mut self.registry;
        let backend = &mut self.backend;
        let viewports = &self.viewports;
        let render = &self.render;
        let last_render = &mut self.last_render;

        let ticked = self.scheduler.tick(&mut self.events, now, |frame: &FrameSnapshot| {
            let updated = registry.run_behaviours(frame).map_err(GameError::Behaviour);
            *last_render = render_frame(registry, viewports, backend, render);
            updated
        });

        polled?;
        ticked.map(Some)
    }

    /// Drive `app` until the clock stops.
    ///
    /// Starts the clock after `app.initialize`, sleeps until each tick is due
    /// and calls `app.after_frame` after every tick. Listener and update hook
    /// failures are logged and the loop keeps going; application errors end
    /// the loop. `app.cleanup` runs in every case once the loop has begun.
    pub fn run(&mut self, app: &mut impl Application<B>) -> Result<(), AppError> {
        app.initialize(self)?;
        self.start()?;
        log::info!("Starting main loop...");

        let stopwatch = Stopwatch::start_new();
        let result = self.main_loop(app);
        app.cleanup(self);

        log::info!(
            "Game loop finished after {} frames in {:.1}ms",
            self.scheduler.frame_count(),
            stopwatch.elapsed_millis()
        );
        result
    }

    fn main_loop(&mut self, app: &mut impl Application<B>) -> Result<(), AppError> {
        loop {
            match self.step() {
                Ok(Some(TickOutcome::Stopped | TickOutcome::Idle)) => return Ok(()),
                Ok(Some(TickOutcome::Scheduled(_))) => app.after_frame(self)?,
                Ok(None) => {}
                Err(err) => {
                    log::error!("Frame {} failed: {err}", self.scheduler.frame_count());
                    app.after_frame(self)?;
                }
            }

            match self.scheduler.next_tick() {
                Some(due) => {
                    let wait = due - self.clock.now_ms();
                    if wait > 0.0 {
                        std::thread::sleep(pause_for(wait));
                    }
                }
                None if !self.scheduler.is_running() => return Ok(()),
                None => {}
            }
        }
    }

    /// Current clock reading in milliseconds
    pub fn now(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Game-wide hub carrying lifecycle notifications
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Mutable access to the game-wide hub
    pub fn events_mut(&mut self) -> &mut EventHub {
        &mut self.events
    }

    /// Every entity this game has spawned
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Mutable registry access
    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    /// Frame clock driving `step` and `run`
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Clock values as of the last tick
    pub fn frame(&self) -> FrameSnapshot {
        self.scheduler.snapshot()
    }

    /// Registered assets
    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    /// Asset manager plus the registry and hub it registers into
    pub fn assets_mut(&mut self) -> (&mut AssetManager, &mut ObjectRegistry, &mut EventHub) {
        (&mut self.assets, &mut self.registry, &mut self.events)
    }

    /// Viewports in render order
    pub fn viewports(&self) -> &[ObjectId] {
        &self.viewports
    }

    /// Viewport state of `id`
    pub fn viewport_mut(&mut self, id: ObjectId) -> Option<&mut Viewport> {
        self.registry.get_mut(id).and_then(Entity::viewport_mut)
    }

    /// Backend the render pass draws through
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend access
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Counters from the most recent render pass
    pub fn last_render_stats(&self) -> RenderStats {
        self.last_render
    }

    /// Configuration the game was built from
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

/// Sleep length for a wait in milliseconds; saturates instead of panicking
fn pause_for(wait_ms: f64) -> Duration {
    Duration::try_from_secs_f64(wait_ms / 1000.0).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetDescriptor, AssetKind};
    use crate::foundation::geometry::Rectangle;
    use crate::foundation::time::ManualClock;
    use crate::render::CommandRecorder;
    use crate::scene::{Colour, Transform2D};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn game() -> (Game<CommandRecorder>, ManualClock) {
        let clock = ManualClock::new(0.0);
        let config = GameConfig {
            frame_rate: 50.0,
            ..GameConfig::default()
        };
        let game = Game::with_clock(config, CommandRecorder::with_surface("#canvas"), clock.clone()).unwrap();
        (game, clock)
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            frame_rate: -1.0,
            ..GameConfig::default()
        };
        let result = Game::new(config, CommandRecorder::new());
        assert!(matches!(result, Err(GameError::Config(ConfigError::Invalid { .. }))));
    }

    #[test]
    fn configured_viewports_are_created_in_order() {
        let config = GameConfig {
            viewports: vec![
                ViewportOptions::default(),
                ViewportOptions {
                    surface: Some("#hud".into()),
                    ..ViewportOptions::default()
                },
            ],
            ..GameConfig::default()
        };
        let game = Game::new(config, CommandRecorder::new()).unwrap();

        assert_eq!(game.viewports().len(), 2);
        let hud = game.registry().get(game.viewports()[1]).unwrap();
        assert_eq!(hud.type_tag(), VIEWPORT_TYPE);
        assert_eq!(hud.viewport().unwrap().surface.as_deref(), Some("#hud"));
    }

    #[test]
    fn child_events_fire_on_the_container() {
        let (mut game, _) = game();
        let container = game.create_container(EntityDesc::new()).unwrap();
        let sprite = game.create_sprite(EntityDesc::new(), Sprite::default()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for event in [names::DID_ADD_CHILD, names::DID_REMOVE_CHILD] {
            let seen = Rc::clone(&seen);
            game.registry_mut()
                .get_mut(container)
                .unwrap()
                .events_mut()
                .unwrap()
                .on(event, move |e| {
                    seen.borrow_mut().push((e.name.to_string(), e.data.object("child")));
                    Ok(())
                });
        }

        game.add_child(container, sprite).unwrap();
        game.remove_child(container, sprite).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                (names::DID_ADD_CHILD.to_string(), Some(sprite)),
                (names::DID_REMOVE_CHILD.to_string(), Some(sprite)),
            ]
        );
    }

    #[test]
    fn refused_edits_surface_as_scene_errors() {
        let (mut game, _) = game();
        let sprite = game.create_sprite(EntityDesc::new(), Sprite::default()).unwrap();
        let other = game.create_sprite(EntityDesc::new(), Sprite::default()).unwrap();

        let err = game.add_child(sprite, other).unwrap_err();
        assert!(matches!(err, GameError::Scene(SceneError::NotAContainer(id)) if id == sprite));
    }

    #[test]
    fn destroy_announces_and_unlists_viewports() {
        let (mut game, _) = game();
        let viewport = game.create_viewport(EntityDesc::new(), ViewportOptions::default()).unwrap();
        let destroyed = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&destroyed);
        game.events_mut().on(names::DID_DESTROY_OBJECT, move |e| {
            *sink.borrow_mut() = e.data.object("object");
            Ok(())
        });

        assert!(game.destroy(viewport).unwrap().is_some());
        assert!(game.viewports().is_empty());
        assert_eq!(*destroyed.borrow(), Some(viewport));
        assert!(game.destroy(viewport).unwrap().is_none());
    }

    #[test]
    fn destroying_an_asset_entity_forgets_the_asset() {
        let (mut game, _) = game();
        let (assets, registry, events) = game.assets_mut();
        let id = assets
            .add(registry, events, AssetDescriptor::new("ship", AssetKind::Image, "ship.png"), 0.0)
            .unwrap();

        assert!(game.destroy(id).unwrap().is_some());
        assert!(game.assets().get("ship").is_none());
        assert!(game.assets().get_all().is_empty());
        assert!(game.assets_mut().0.take_requests().is_empty());
    }

    #[test]
    fn pauses_saturate_instead_of_panicking() {
        assert_eq!(pause_for(250.0), Duration::from_millis(250));
        assert_eq!(pause_for(1e300), Duration::MAX);
        assert_eq!(pause_for(f64::INFINITY), Duration::MAX);
    }

    #[test]
    fn step_waits_for_the_deadline() {
        let (mut game, clock) = game();
        assert_eq!(game.step().unwrap(), None);

        game.start().unwrap();
        assert_eq!(game.step().unwrap(), Some(TickOutcome::Scheduled(20.0)));
        clock.advance(10.0);
        assert_eq!(game.step().unwrap(), None);
        clock.advance(10.0);
        assert_eq!(game.step().unwrap(), Some(TickOutcome::Scheduled(40.0)));
        assert_eq!(game.frame().frame_count, 2);
    }

    #[test]
    fn a_tick_updates_then_renders() {
        let (mut game, clock) = game();
        let viewport = game
            .create_viewport(
                EntityDesc::new(),
                ViewportOptions {
                    bounds: Rectangle::new(0.0, 0.0, 320.0, 240.0),
                    ..ViewportOptions::default()
                },
            )
            .unwrap();
        let ship = game
            .create_sprite(
                EntityDesc::new().with_transform(Transform2D::at(10.0, 10.0)),
                Sprite::new(Rectangle::new(0.0, 0.0, 4.0, 4.0), Colour::WHITE),
            )
            .unwrap();
        game.add_child(viewport, ship).unwrap();
        game.registry_mut().get_mut(ship).unwrap().set_behaviour(
            |entity: &mut Entity, frame: &FrameSnapshot| -> anyhow::Result<()> {
                entity.transform.position.x += frame.frame_count as f32;
                Ok(())
            },
        );

        game.start().unwrap();
        game.step().unwrap();
        clock.advance(20.0);
        game.step().unwrap();

        assert_eq!(game.last_render_stats().drawn, 1);
        assert_eq!(game.backend().painted(), vec![ship, ship]);
        let x = game.registry().get(ship).unwrap().derived().origin.x;
        assert!((x - 13.0).abs() < f32::EPSILON);
    }

    #[test]
    fn failing_behaviour_is_reported_after_the_frame() {
        let (mut game, _) = game();
        let id = game.spawn(EntityDesc::new(), "unit", &[]).unwrap();
        game.registry_mut().get_mut(id).unwrap().set_behaviour(
            |_: &mut Entity, _: &FrameSnapshot| -> anyhow::Result<()> { anyhow::bail!("boom") },
        );

        game.start().unwrap();
        let err = game.step().unwrap_err();

        assert!(matches!(err, GameError::Behaviour(_)));
        assert_eq!(game.frame().frame_count, 1);
        assert!(game.scheduler().next_tick().is_some());
    }
}
