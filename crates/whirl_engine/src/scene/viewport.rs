//! Viewport state: the root of a renderable, clipped, scrollable subtree

use crate::foundation::geometry::Rectangle;
use crate::foundation::math::{lerp, Vec2};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Render behaviour switches for a viewport
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ViewportFlags: u8 {
        /// Restrict drawing to the viewport bounds
        const CLIP = 1 << 0;
        /// Smooth (filter) scaled images
        const SMOOTHING = 1 << 1;
        /// Clear the viewport region before drawing
        const CLEAR = 1 << 2;
    }
}

/// Presets for a new viewport, usually loaded from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportOptions {
    /// Bounds in world units
    pub bounds: Rectangle,
    /// Initial scroll offset
    pub scroll: [f32; 2],
    /// Zoom factor
    pub zoom: f32,
    /// Interpolation strength for eased camera motion, in `(0, 1]`
    pub lerp: f32,
    /// Clip to bounds
    pub clip: bool,
    /// Smooth scaled images
    pub smoothing: bool,
    /// Clear before drawing
    pub clear: bool,
    /// Drawing surface selector; the game's default surface when unset
    pub surface: Option<String>,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            bounds: Rectangle::default(),
            scroll: [0.0, 0.0],
            zoom: 1.0,
            lerp: 1.0,
            clip: true,
            smoothing: true,
            clear: true,
            surface: None,
        }
    }
}

/// State installed by the `viewport` capability
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Bounds in world units
    pub bounds: Rectangle,
    scroll: Vec2,
    /// Zoom factor
    pub zoom: f32,
    /// Interpolation strength for [`Viewport::ease_towards`]
    pub lerp: f32,
    /// Render switches
    pub flags: ViewportFlags,
    /// Drawing surface selector
    pub surface: Option<String>,
}

impl Viewport {
    /// Current scroll offset
    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Set both scroll coordinates at once
    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.scroll = Vec2::new(x, y);
    }

    /// Set the scroll offset from a point
    pub fn scroll_to_point(&mut self, point: Vec2) {
        self.scroll = point;
    }

    /// Move scroll and zoom toward a target by the lerp factor.
    ///
    /// Call once per frame for smoothed camera motion; a lerp of 1 snaps.
    pub fn ease_towards(&mut self, scroll: Vec2, zoom: f32) {
        self.scroll = Vec2::new(
            lerp(self.scroll.x, scroll.x, self.lerp),
            lerp(self.scroll.y, scroll.y, self.lerp),
        );
        self.zoom = lerp(self.zoom, zoom, self.lerp);
    }

    /// Whether drawing is clipped to the bounds
    pub fn clips(&self) -> bool {
        self.flags.contains(ViewportFlags::CLIP)
    }

    /// Whether the region is cleared before drawing
    pub fn clears(&self) -> bool {
        self.flags.contains(ViewportFlags::CLEAR)
    }

    /// Whether scaled images are smoothed
    pub fn smooths(&self) -> bool {
        self.flags.contains(ViewportFlags::SMOOTHING)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from(ViewportOptions::default())
    }
}

impl From<ViewportOptions> for Viewport {
    fn from(options: ViewportOptions) -> Self {
        let mut flags = ViewportFlags::empty();
        flags.set(ViewportFlags::CLIP, options.clip);
        flags.set(ViewportFlags::SMOOTHING, options.smoothing);
        flags.set(ViewportFlags::CLEAR, options.clear);

        Self {
            bounds: options.bounds,
            scroll: Vec2::new(options.scroll[0], options.scroll[1]),
            zoom: options.zoom,
            lerp: options.lerp,
            flags,
            surface: options.surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn options_map_onto_flags() {
        let viewport = Viewport::from(ViewportOptions {
            clip: false,
            clear: false,
            ..ViewportOptions::default()
        });
        assert!(!viewport.clips());
        assert!(!viewport.clears());
        assert!(viewport.smooths());
        assert_relative_eq!(viewport.zoom, 1.0);
    }

    #[test]
    fn scroll_to_sets_both_coordinates() {
        let mut viewport = Viewport::default();
        viewport.scroll_to(12.0, -4.0);
        assert_eq!(viewport.scroll(), Vec2::new(12.0, -4.0));
        viewport.scroll_to_point(Vec2::new(1.0, 2.0));
        assert_eq!(viewport.scroll(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn easing_moves_by_lerp_factor() {
        let mut viewport = Viewport::from(ViewportOptions {
            lerp: 0.5,
            ..ViewportOptions::default()
        });
        viewport.ease_towards(Vec2::new(100.0, 50.0), 2.0);
        assert_relative_eq!(viewport.scroll().x, 50.0);
        assert_relative_eq!(viewport.scroll().y, 25.0);
        assert_relative_eq!(viewport.zoom, 1.5);

        viewport.lerp = 1.0;
        viewport.ease_towards(Vec2::new(100.0, 50.0), 2.0);
        assert_eq!(viewport.scroll(), Vec2::new(100.0, 50.0));
        assert_relative_eq!(viewport.zoom, 2.0);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ViewportOptions = toml::from_str(
            r##"
            zoom = 2.0
            surface = "#main"
            [bounds]
            x = 0.0
            y = 0.0
            w = 640.0
            h = 480.0
            "##,
        )
        .unwrap();
        assert_relative_eq!(options.zoom, 2.0);
        assert_relative_eq!(options.lerp, 1.0);
        assert!(options.clip);
        assert_eq!(options.surface.as_deref(), Some("#main"));
        assert_relative_eq!(options.bounds.w, 640.0);
    }
}
