//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and easing curves
//! - Geometry value types
//! - Time sources
//! - Logging utilities

pub mod math;
pub mod geometry;
pub mod time;
pub mod logging;
