// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Navigation**: Zoom factors and pan steps applied to the whole stack
//! - **Transform**: Zoom factor bounds and pixel-center rounding
//! - **Layers**: Row label length and vector hit tolerance
//! - **Diagnostics**: Event log capacity

// ==========================================================================
// Navigation Defaults
// ==========================================================================

/// Zoom factor applied when zooming in (local units per view unit halve).
pub const DEFAULT_ZOOM_IN_FACTOR: f64 = 0.5;

/// Zoom factor applied when zooming out.
pub const DEFAULT_ZOOM_OUT_FACTOR: f64 = 2.0;

/// Pan step in view pixels.
pub const DEFAULT_PAN_STEP: f64 = 1.0;

/// Pan step in view pixels when the fast modifier is held.
pub const DEFAULT_FAST_PAN_STEP: f64 = 50.0;

// ==========================================================================
// Transform Defaults
// ==========================================================================

/// Smallest zoom factor a transform accepts.
pub const MIN_ZOOM_FACTOR: f64 = 1e-6;

/// Largest zoom factor a transform accepts.
pub const MAX_ZOOM_FACTOR: f64 = 1e6;

/// Offset added before truncation in integer coordinate conversions.
pub const DEFAULT_PIXEL_CENTER_OFFSET: f64 = 0.5;

// ==========================================================================
// Layer Defaults
// ==========================================================================

/// Row labels are truncated to this many characters.
pub const MAX_LAYER_LABEL_CHARS: usize = 50;

/// Distance in view pixels within which a vector feature answers a query.
/// Scaled by the layer zoom before hit testing in local units.
pub const DEFAULT_VECTOR_HIT_TOLERANCE: f64 = 3.0;

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

/// Default number of stack events kept in memory.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 256;

/// Minimum event log capacity.
pub const MIN_EVENT_LOG_CAPACITY: usize = 16;

/// Maximum event log capacity.
pub const MAX_EVENT_LOG_CAPACITY: usize = 10_000;
