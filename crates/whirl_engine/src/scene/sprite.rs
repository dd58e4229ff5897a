//! Drawable state: shape and fill

use crate::foundation::geometry::Shape;
use crate::object::ObjectId;
use serde::{Deserialize, Serialize};

/// RGBA colour with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Colour {
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Colour with explicit alpha
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Whether painting this colour leaves the surface unchanged
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

/// How a sprite's bounds are painted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fill {
    /// Solid colour
    Colour(Colour),
    /// Image asset, referenced by its registry id
    Image(ObjectId),
}

impl Fill {
    /// Whether painting this fill leaves the surface unchanged
    pub fn is_transparent(&self) -> bool {
        match self {
            Self::Colour(colour) => colour.is_transparent(),
            Self::Image(_) => false,
        }
    }
}

impl Default for Fill {
    fn default() -> Self {
        Self::Colour(Colour::TRANSPARENT)
    }
}

impl From<Colour> for Fill {
    fn from(colour: Colour) -> Self {
        Self::Colour(colour)
    }
}

/// State installed by the `sprite` capability
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Bounds relative to the owning entity's origin
    pub shape: Shape,
    /// Paint
    pub fill: Fill,
}

impl Sprite {
    /// Create sprite state
    pub fn new(shape: impl Into<Shape>, fill: impl Into<Fill>) -> Self {
        Self {
            shape: shape.into(),
            fill: fill.into(),
        }
    }
}
