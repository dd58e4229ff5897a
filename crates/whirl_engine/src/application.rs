//! Application trait and lifecycle management

use crate::game::{Game, GameError};
use crate::render::RenderBackend;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive a game with [`Game::run`].
pub trait Application<B: RenderBackend> {
    /// Initialize the application
    ///
    /// Called once before the frame clock starts. Use this to build the
    /// initial scene, register listeners and queue assets.
    fn initialize(&mut self, game: &mut Game<B>) -> Result<(), AppError>;

    /// Called after every tick, in the gap before the next one.
    ///
    /// Scene edits made here are picked up by the next tick. Call
    /// [`Game::stop`] to end the loop after one more tick.
    fn after_frame(&mut self, game: &mut Game<B>) -> Result<(), AppError> {
        let _ = game;
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once the loop has ended, whether or not it ended with an error.
    fn cleanup(&mut self, game: &mut Game<B>);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Game error propagated to application level
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Game logic error
    #[error("Game logic error: {0}")]
    GameLogic(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::foundation::time::ManualClock;
    use crate::frame::FrameSnapshot;
    use crate::object::EntityDesc;
    use crate::render::CommandRecorder;

    struct CountDown {
        clock: ManualClock,
        frames: u64,
        seen: Vec<FrameSnapshot>,
        cleaned_up: bool,
    }

    impl Application<CommandRecorder> for CountDown {
        fn initialize(&mut self, game: &mut Game<CommandRecorder>) -> Result<(), AppError> {
            game.spawn(EntityDesc::new().named("player"), "unit", &[])?;
            Ok(())
        }

        fn after_frame(&mut self, game: &mut Game<CommandRecorder>) -> Result<(), AppError> {
            self.seen.push(game.frame());
            if game.frame().frame_count == self.frames {
                game.stop()?;
            }
            self.clock.advance(1.0);
            Ok(())
        }

        fn cleanup(&mut self, _: &mut Game<CommandRecorder>) {
            self.cleaned_up = true;
        }
    }

    #[test]
    fn run_ends_one_tick_after_stop() {
        let clock = ManualClock::new(0.0);
        let config = GameConfig {
            frame_rate: 1000.0,
            ..GameConfig::default()
        };
        let mut game = Game::with_clock(config, CommandRecorder::new(), clock.clone()).unwrap();
        let mut app = CountDown {
            clock,
            frames: 3,
            seen: Vec::new(),
            cleaned_up: false,
        };

        game.run(&mut app).unwrap();

        assert!(app.cleaned_up);
        assert_eq!(app.seen.len(), 3);
        assert_eq!(game.frame().frame_count, 4);
        assert!(!game.scheduler().is_running());
        assert_eq!(game.registry().get_by_name("player").len(), 1);
    }

    struct Refuses;

    impl Application<CommandRecorder> for Refuses {
        fn initialize(&mut self, _: &mut Game<CommandRecorder>) -> Result<(), AppError> {
            Err(AppError::GameLogic("no level".into()))
        }

        fn cleanup(&mut self, _: &mut Game<CommandRecorder>) {}
    }

    #[test]
    fn failed_initialize_never_starts_the_clock() {
        let mut game = Game::new(GameConfig::default(), CommandRecorder::new()).unwrap();
        let err = game.run(&mut Refuses).unwrap_err();
        assert!(matches!(err, AppError::GameLogic(ref reason) if reason == "no level"));
        assert!(!game.scheduler().is_running());
    }
}
