//! Geometry value types: rectangles, circles and the shapes sprites use
//!
//! Pure value semantics, no identity. Containment tests are inclusive of the
//! boundary.

use super::math::Vec2;
use serde::{Deserialize, Serialize};

/// Rectangle defined by its top-left origin and its width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// X-coordinate of the top-left corner
    pub x: f32,
    /// Y-coordinate of the top-left corner
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rectangle {
    /// Create a rectangle from origin and size
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle spanning two corner points
    pub fn from_corners(top_left: Vec2, bottom_right: Vec2) -> Self {
        Self {
            x: top_left.x,
            y: top_left.y,
            w: bottom_right.x - top_left.x,
            h: bottom_right.y - top_left.y,
        }
    }

    /// Top-left origin
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Centre point
    pub fn midpoint(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Area
    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Vertices ordered top-left, top-right, bottom-right, bottom-left
    pub fn vertices(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.w, self.y),
            Vec2::new(self.x + self.w, self.y + self.h),
            Vec2::new(self.x, self.y + self.h),
        ]
    }

    /// Whether the point lies inside or on the edge
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.x <= point.x
            && self.x + self.w >= point.x
            && self.y <= point.y
            && self.y + self.h >= point.y
    }
}

/// Circle defined by its centre and radius
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// X-coordinate of the centre
    pub x: f32,
    /// Y-coordinate of the centre
    pub y: f32,
    /// Radius
    pub r: f32,
}

impl Circle {
    /// Create a circle
    pub const fn new(x: f32, y: f32, r: f32) -> Self {
        Self { x, y, r }
    }

    /// Centre point
    pub fn midpoint(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Area
    pub fn area(&self) -> f32 {
        std::f32::consts::PI * self.r * self.r
    }

    /// Whether the point lies inside or on the circumference
    pub fn contains_point(&self, point: Vec2) -> bool {
        (point - self.midpoint()).norm_squared() <= self.r * self.r
    }
}

/// Bounds of a drawable node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned rectangle
    Rect(Rectangle),
    /// Circle
    Circle(Circle),
}

impl Shape {
    /// Place the shape in a parent space: positions are scaled by
    /// `offset_scale` and moved by `offset`, extents are scaled by
    /// `offset_scale * own_scale`.
    pub fn transformed(&self, offset: Vec2, offset_scale: f32, own_scale: f32) -> Self {
        let extent = offset_scale * own_scale;
        match *self {
            Self::Rect(rect) => Self::Rect(Rectangle::new(
                offset.x + rect.x * offset_scale,
                offset.y + rect.y * offset_scale,
                rect.w * extent,
                rect.h * extent,
            )),
            Self::Circle(circle) => Self::Circle(Circle::new(
                offset.x + circle.x * offset_scale,
                offset.y + circle.y * offset_scale,
                circle.r * extent,
            )),
        }
    }

    /// Whether the point lies inside the shape
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self {
            Self::Rect(rect) => rect.contains_point(point),
            Self::Circle(circle) => circle.contains_point(point),
        }
    }

    /// Centre point
    pub fn midpoint(&self) -> Vec2 {
        match self {
            Self::Rect(rect) => rect.midpoint(),
            Self::Circle(circle) => circle.midpoint(),
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::Rect(Rectangle::default())
    }
}

impl From<Rectangle> for Shape {
    fn from(rect: Rectangle) -> Self {
        Self::Rect(rect)
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Self::Circle(circle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rectangle_queries() {
        let rect = Rectangle::new(40.0, 30.0, 100.0, 100.0);
        assert_relative_eq!(rect.area(), 10_000.0);
        assert_eq!(rect.midpoint(), Vec2::new(90.0, 80.0));
        assert!(rect.contains_point(Vec2::new(45.0, 79.0)));
        assert!(rect.contains_point(Vec2::new(140.0, 130.0)));
        assert!(!rect.contains_point(Vec2::new(141.0, 79.0)));

        let vertices = rect.vertices();
        assert_eq!(vertices[0], Vec2::new(40.0, 30.0));
        assert_eq!(vertices[2], Vec2::new(140.0, 130.0));
        assert_eq!(vertices[3], Vec2::new(40.0, 130.0));
    }

    #[test]
    fn rectangle_from_corners() {
        let rect = Rectangle::from_corners(Vec2::new(40.0, 30.0), Vec2::new(140.0, 130.0));
        assert_eq!(rect, Rectangle::new(40.0, 30.0, 100.0, 100.0));
    }

    #[test]
    fn circle_containment() {
        let circle = Circle::new(0.0, 0.0, 5.0);
        assert!(circle.contains_point(Vec2::new(3.0, 4.0)));
        assert!(!circle.contains_point(Vec2::new(4.0, 4.0)));
    }

    #[test]
    fn shape_transform_scales_position_and_extent() {
        let shape = Shape::Rect(Rectangle::new(10.0, 10.0, 20.0, 5.0));
        let placed = shape.transformed(Vec2::new(100.0, 50.0), 2.0, 0.5);
        assert_eq!(placed, Shape::Rect(Rectangle::new(120.0, 70.0, 20.0, 5.0)));

        let circle = Shape::Circle(Circle::new(1.0, 2.0, 3.0));
        let placed = circle.transformed(Vec2::zeros(), 1.0, 2.0);
        assert_eq!(placed, Shape::Circle(Circle::new(1.0, 2.0, 6.0)));
    }
}
