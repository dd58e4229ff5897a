//! Math utilities and types
//!
//! 2D vector alias over `nalgebra`, range mapping and easing curves.

pub use nalgebra::Vector2;

/// 2D vector type, also used for points and offsets
pub type Vec2 = Vector2<f32>;

/// Map `value` from the range `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// The mapping is linear and not clamped; values outside the input range
/// extrapolate.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Linear interpolation from `from` toward `to` by factor `t`
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Cubic easing curves over an interpolant in `[0, 1]`
pub mod easing {
    /// Starts slowly and speeds up
    pub fn cubic_in(t: f32) -> f32 {
        t * t * t
    }

    /// Starts quickly and slows down
    pub fn cubic_out(t: f32) -> f32 {
        let inv = t - 1.0;
        inv * inv * inv + 1.0
    }

    /// Slow at both ends
    pub fn cubic_in_out(t: f32) -> f32 {
        if t < 0.5 {
            4.0 * t * t * t
        } else {
            let inv = 2.0 * t - 2.0;
            0.5 * inv * inv * inv + 1.0
        }
    }
}
