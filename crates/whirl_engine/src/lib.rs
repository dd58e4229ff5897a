//! # Whirl Engine
//!
//! The runtime core of a 2D game engine: live entities with optional
//! capabilities, per-entity notifications, a scene graph of containers and
//! viewports, and a frame scheduler that drives update and render passes.
//!
//! ## Features
//!
//! - **Object Registry**: Identity, capability attachment and queries
//! - **Notification Hub**: Ordered listeners with one-shot support
//! - **Scene Graph**: Containers, viewports and derived transforms
//! - **Frame Scheduler**: Start/stop semantics with precise timing bookkeeping
//! - **Render Dispatch**: Backend-agnostic drawing with visibility culling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whirl_engine::prelude::*;
//!
//! struct MyGame;
//!
//! impl Application<CommandRecorder> for MyGame {
//!     fn initialize(&mut self, game: &mut Game<CommandRecorder>) -> Result<(), AppError> {
//!         let viewport = game.create_viewport(EntityDesc::new(), ViewportOptions::default())?;
//!         let ship = game.create_sprite(
//!             EntityDesc::new().named("ship"),
//!             Sprite::new(Rectangle::new(0.0, 0.0, 16.0, 16.0), Colour::WHITE),
//!         )?;
//!         game.add_child(viewport, ship)?;
//!         game.events_mut().on(names::DID_UPDATE, |event| {
//!             log::trace!("frame {:?}", event.data.count("frameCount"));
//!             Ok(())
//!         });
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _game: &mut Game<CommandRecorder>) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     whirl_engine::foundation::logging::init();
//!     let mut game = Game::new(GameConfig::default(), CommandRecorder::with_surface("#canvas"))?;
//!     game.run(&mut MyGame)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod events;
pub mod object;
pub mod scene;
pub mod frame;
pub mod render;
pub mod assets;
pub mod config;

mod application;
mod game;

#[cfg(test)]
mod tests;

pub use application::{AppError, Application};
pub use game::{Game, GameError, CONTAINER_TYPE, SPRITE_TYPE, VIEWPORT_TYPE};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, Application, Game, GameError,
        assets::{Asset, AssetDescriptor, AssetKind, AssetManager, LoadCompletion},
        config::{Config, GameConfig},
        events::{names, Event, EventData, EventHub, ListenerId},
        foundation::{
            geometry::{Circle, Rectangle, Shape},
            math::Vec2,
            time::{ManualClock, MonotonicClock, TimeSource},
        },
        frame::{FrameSnapshot, TimestepMode},
        object::{builtin, Behaviour, Capability, Entity, EntityDesc, ObjectId, ObjectRegistry},
        render::{CommandRecorder, DrawCommand, RenderBackend},
        scene::{Colour, Fill, Sprite, Transform2D, Viewport, ViewportOptions},
    };
}
