//! Recording backend
//!
//! [`CommandRecorder`] turns backend calls into a flat list of
//! [`DrawCommand`]s instead of painting. The headless demo prints them and the
//! tests assert on them.

use crate::foundation::geometry::{Rectangle, Shape};
use crate::foundation::math::Vec2;
use crate::object::ObjectId;
use crate::render::{BackendResult, DrawNode, RenderBackend, RenderError, ViewportFrame};
use crate::scene::Fill;
use std::collections::HashSet;

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Viewport setup
    Begin {
        /// Viewport entity
        viewport: ObjectId,
        /// Bound surface
        surface: String,
        /// Origin translation
        translate: Vec2,
        /// Clip region, when clipping
        clip: Option<Rectangle>,
        /// Cleared region, when clearing
        clear: Option<Rectangle>,
    },
    /// Filled shape
    Fill {
        /// Viewport entity
        viewport: ObjectId,
        /// Sprite entity
        node: ObjectId,
        /// Placed bounds
        shape: Shape,
        /// Paint
        fill: Fill,
        /// Global alpha for the fill
        alpha: f32,
        /// Image smoothing state
        smoothing: bool,
    },
    /// Viewport teardown
    End {
        /// Viewport entity
        viewport: ObjectId,
    },
}

/// Backend that records commands for a fixed set of named surfaces
#[derive(Debug, Default)]
pub struct CommandRecorder {
    surfaces: HashSet<String>,
    bound: Option<String>,
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    /// Recorder with no surfaces; every bind fails until one is registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder that accepts `selector`
    pub fn with_surface(selector: impl Into<String>) -> Self {
        let mut recorder = Self::new();
        recorder.register_surface(selector);
        recorder
    }

    /// Make `selector` resolvable
    pub fn register_surface(&mut self, selector: impl Into<String>) {
        self.surfaces.insert(selector.into());
    }

    /// Recorded commands, oldest first
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the recorder empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Ids of the nodes filled so far, in paint order
    pub fn painted(&self) -> Vec<ObjectId> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Fill { node, .. } => Some(*node),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderBackend for CommandRecorder {
    fn bind_surface(&mut self, selector: &str) -> BackendResult<()> {
        if !self.surfaces.contains(selector) {
            return Err(RenderError::UnknownSurface(selector.to_string()));
        }
        self.bound = Some(selector.to_string());
        Ok(())
    }

    fn pre_render(&mut self, viewport: &ViewportFrame) {
        self.commands.push(DrawCommand::Begin {
            viewport: viewport.id,
            surface: self.bound.clone().unwrap_or_default(),
            translate: viewport.bounds.origin(),
            clip: viewport.clip.then_some(viewport.bounds),
            clear: viewport.clear.then_some(viewport.bounds),
        });
    }

    fn draw(&mut self, viewport: &ViewportFrame, node: &DrawNode) {
        self.commands.push(DrawCommand::Fill {
            viewport: viewport.id,
            node: node.id,
            shape: node.bounds,
            fill: node.fill,
            alpha: node.alpha,
            smoothing: viewport.smoothing,
        });
    }

    fn post_render(&mut self, viewport: &ViewportFrame) {
        self.commands.push(DrawCommand::End { viewport: viewport.id });
    }
}
