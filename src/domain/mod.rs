// SPDX-License-Identifier: MPL-2.0
//! Domain layer - coordinate and transform logic with no external dependencies.
//!
//! # Modules
//!
//! - [`geometry`]: [`Point`], [`PixelPoint`], [`Rect`]
//! - [`orientation`]: geo-referencing descriptor ([`Orientation`])
//! - [`transform`]: per-layer view transform ([`LayerTransform`], [`Rotation`])
//! - [`newtypes`]: range-checked values ([`ZoomFactor`], [`EventCapacity`])

pub mod geometry;
pub mod newtypes;
pub mod orientation;
pub mod transform;

pub use geometry::{PixelPoint, Point, Rect};
pub use newtypes::{event_capacity_bounds, zoom_factor_bounds, EventCapacity, ZoomFactor};
pub use orientation::Orientation;
pub use transform::{CoordinateMode, LayerTransform, Rotation};
