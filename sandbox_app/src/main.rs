//! Headless sandbox: builds a small asteroid field, runs it for a few seconds
//! against a recording backend and prints what would have been drawn.

use rand::Rng;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;
use whirl_engine::foundation::math::{easing, map_range};
use whirl_engine::prelude::*;

const DEMO_FRAMES: u64 = 180;
const ASTEROIDS: usize = 24;
const FIELD: Rectangle = Rectangle::new(0.0, 0.0, 2000.0, 1500.0);
const SHIP_SPEED: f32 = 120.0;
const BLIP_PERIOD: u64 = 30;

#[derive(Error, Debug)]
enum SandboxError {
    #[error("Config error: {0}")]
    Config(#[from] whirl_engine::config::ConfigError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

struct Sandbox {
    camera: Option<ObjectId>,
    ship: Option<ObjectId>,
    blip: Option<ObjectId>,
    texture: Option<ObjectId>,
    textured: bool,
    loads_seen: Rc<Cell<u32>>,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            camera: None,
            ship: None,
            blip: None,
            texture: None,
            textured: false,
            loads_seen: Rc::new(Cell::new(0)),
        }
    }

    fn build_field(game: &mut Game<CommandRecorder>) -> Result<ObjectId, GameError> {
        let field = game.create_container(EntityDesc::new().named("field"))?;
        let mut rng = rand::thread_rng();

        for i in 0..ASTEROIDS {
            let radius = rng.gen_range(8.0..40.0);
            let position = Transform2D::at(rng.gen_range(0.0..FIELD.w), rng.gen_range(0.0..FIELD.h))
                .with_alpha(rng.gen_range(0.4..1.0));
            let rock = game.create_sprite(
                EntityDesc::new().named(format!("asteroid-{i}")).with_transform(position),
                Sprite::new(Circle::new(0.0, 0.0, radius), Colour::rgb(0.6, 0.55, 0.5)),
            )?;
            game.add_child(field, rock)?;
        }

        Ok(field)
    }
}

impl Application<CommandRecorder> for Sandbox {
    fn initialize(&mut self, game: &mut Game<CommandRecorder>) -> Result<(), AppError> {
        let Some(&camera) = game.viewports().first() else {
            return Err(AppError::Config("at least one viewport must be configured".into()));
        };
        self.camera = Some(camera);

        let field = Self::build_field(game)?;
        let ship = game.create_sprite(
            EntityDesc::new()
                .named("ship")
                .with_transform(Transform2D::at(FIELD.w / 2.0, FIELD.h / 2.0)),
            Sprite::new(Rectangle::new(-8.0, -8.0, 16.0, 16.0), Colour::WHITE),
        )?;
        game.add_child(field, ship)?;
        game.add_child(camera, field)?;

        if let Some(&minimap) = game.viewports().get(1) {
            let blip = game.create_sprite(
                EntityDesc::new().named("blip"),
                Sprite::new(Rectangle::new(-16.0, -16.0, 32.0, 32.0), Colour::rgb(1.0, 0.2, 0.2)),
            )?;
            game.add_child(minimap, blip)?;
            self.blip = Some(blip);
        }
        game.registry_mut()
            .get_mut(ship)
            .ok_or_else(|| AppError::GameLogic("ship vanished".into()))?
            .set_behaviour(|entity: &mut Entity, frame: &FrameSnapshot| -> anyhow::Result<()> {
                let step = SHIP_SPEED * frame.delta_seconds();
                entity.transform.position += Vec2::new(step, step * 0.5);
                Ok(())
            });
        self.ship = Some(ship);

        let now = game.now();
        let (assets, registry, events) = game.assets_mut();
        let texture = assets
            .add(registry, events, AssetDescriptor::new("ship", AssetKind::Image, "ship.png"), now)
            .map_err(GameError::from)?;
        let loads = Rc::clone(&self.loads_seen);
        if let Some(hub) = registry.get_mut(texture).and_then(Entity::events_mut) {
            hub.on_once(names::DID_LOAD, move |event| {
                log::info!(
                    "Asset {:?} loaded in {:.1}ms",
                    event.data.text("name"),
                    event.data.number("timeTaken").unwrap_or_default()
                );
                loads.set(loads.get() + 1);
                Ok(())
            });
        }

        let requests = assets.take_requests();
        let completions = assets.completions();
        std::thread::spawn(move || {
            for request in requests {
                std::thread::sleep(std::time::Duration::from_millis(50));
                log::debug!("Pretending to decode {}", request.src);
                if completions.send(LoadCompletion::Loaded(request.asset)).is_err() {
                    break;
                }
            }
        });
        self.texture = Some(texture);

        game.events_mut().on(names::DID_STOP, |event| {
            log::info!("Stopped after {:?} frames", event.data.count("frameCount"));
            Ok(())
        });
        Ok(())
    }

    fn after_frame(&mut self, game: &mut Game<CommandRecorder>) -> Result<(), AppError> {
        let loaded = self
            .texture
            .filter(|id| game.assets().get_by_id(*id).is_some_and(Asset::loaded));
        if let (false, Some(texture), Some(ship)) = (self.textured, loaded, self.ship) {
            if let Some(sprite) = game.registry_mut().get_mut(ship).and_then(Entity::sprite_mut) {
                sprite.fill = Fill::Image(texture);
                self.textured = true;
            }
        }

        let position = self
            .ship
            .and_then(|ship| game.registry().get(ship))
            .map(|ship| ship.transform.position);
        if let Some(position) = position {
            if let Some(camera) = self.camera.and_then(|camera| game.viewport_mut(camera)) {
                camera.ease_towards(position - Vec2::new(320.0, 240.0), 1.0);
            }
            let frame = game.frame().frame_count;
            if let Some(blip) = self.blip.and_then(|blip| game.registry_mut().get_mut(blip)) {
                let phase = (frame % BLIP_PERIOD) as f32 / BLIP_PERIOD as f32;
                blip.transform.position = position;
                blip.transform.alpha = map_range(easing::cubic_in_out(phase), 0.0, 1.0, 0.3, 1.0);
            }
        }

        if game.frame().frame_count == DEMO_FRAMES {
            game.stop()?;
        }
        Ok(())
    }

    fn cleanup(&mut self, game: &mut Game<CommandRecorder>) {
        let stats = game.last_render_stats();
        log::info!(
            "Last frame: {} viewports, {} drawn, {} culled, {} skipped",
            stats.viewports,
            stats.drawn,
            stats.culled,
            stats.skipped_viewports
        );
        log::info!("Recorded {} draw commands, {} asset loads", game.backend().len(), self.loads_seen.get());
    }
}

fn main() -> Result<(), SandboxError> {
    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load_from_file(path)?,
        None => GameConfig::default(),
    };
    whirl_engine::foundation::logging::init_with(&config.logging);

    let mut backend = CommandRecorder::with_surface(config.default_surface.clone());
    backend.register_surface("#minimap");

    let mut game = Game::new(config, backend)?;
    if game.viewports().is_empty() {
        game.create_viewport(
            EntityDesc::new().named("camera"),
            ViewportOptions {
                bounds: Rectangle::new(0.0, 0.0, 640.0, 480.0),
                lerp: 0.1,
                ..ViewportOptions::default()
            },
        )?;
    }

    game.run(&mut Sandbox::new())?;

    let snapshot = serde_json::to_string_pretty(&game.registry().snapshot())?;
    println!("{snapshot}");
    Ok(())
}
