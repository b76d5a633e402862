// SPDX-License-Identifier: MPL-2.0
//! Value newtypes that keep transform and diagnostics values in range.

// =============================================================================
// Zoom Factor Bounds
// =============================================================================

/// Zoom factor bounds (local units per view unit).
pub mod zoom_factor_bounds {
    /// Smallest accepted zoom factor.
    pub const MIN: f64 = 1e-6;
    /// Largest accepted zoom factor.
    pub const MAX: f64 = 1e6;
    /// Identity zoom.
    pub const DEFAULT: f64 = 1.0;
}

// =============================================================================
// ZoomFactor
// =============================================================================

/// Number of local units covered by one global (view) unit.
///
/// Always strictly positive and finite, so the inverse transform can divide
/// by it. Values outside the range are clamped; NaN and non-positive input
/// collapse to the minimum.
///
/// # Example
///
/// ```
/// use layer_lens::domain::ZoomFactor;
///
/// assert_eq!(ZoomFactor::new(2.0).value(), 2.0);
/// assert!(ZoomFactor::new(0.0).value() > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ZoomFactor(f64);

impl ZoomFactor {
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() || value <= 0.0 {
            return Self(zoom_factor_bounds::MIN);
        }
        Self(value.clamp(zoom_factor_bounds::MIN, zoom_factor_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Multiplies by `factor`, clamping the result.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.0 * factor)
    }

    /// Zoom expressed as a display percentage (`100 / zoom`).
    #[must_use]
    pub fn as_percent(self) -> f64 {
        100.0 / self.0
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self(zoom_factor_bounds::DEFAULT)
    }
}

// =============================================================================
// Event Capacity Bounds
// =============================================================================

/// Event log capacity bounds (16 to 10000 events).
pub mod event_capacity_bounds {
    pub const MIN: usize = 16;
    pub const MAX: usize = 10_000;
    pub const DEFAULT: usize = 256;
}

// =============================================================================
// EventCapacity
// =============================================================================

/// Capacity of the stack event log, clamped to its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCapacity(usize);

impl EventCapacity {
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(event_capacity_bounds::MIN, event_capacity_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl Default for EventCapacity {
    fn default() -> Self {
        Self(event_capacity_bounds::DEFAULT)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DEFAULT_EVENT_LOG_CAPACITY, MAX_EVENT_LOG_CAPACITY, MAX_ZOOM_FACTOR,
        MIN_EVENT_LOG_CAPACITY, MIN_ZOOM_FACTOR,
    };

    #[test]
    fn domain_bounds_match_config() {
        assert_eq!(zoom_factor_bounds::MIN, MIN_ZOOM_FACTOR);
        assert_eq!(zoom_factor_bounds::MAX, MAX_ZOOM_FACTOR);
        assert_eq!(event_capacity_bounds::MIN, MIN_EVENT_LOG_CAPACITY);
        assert_eq!(event_capacity_bounds::MAX, MAX_EVENT_LOG_CAPACITY);
        assert_eq!(event_capacity_bounds::DEFAULT, DEFAULT_EVENT_LOG_CAPACITY);
    }

    #[test]
    fn zoom_factor_rejects_non_positive_values() {
        assert_eq!(ZoomFactor::new(0.0).value(), zoom_factor_bounds::MIN);
        assert_eq!(ZoomFactor::new(-3.0).value(), zoom_factor_bounds::MIN);
        assert_eq!(ZoomFactor::new(f64::NAN).value(), zoom_factor_bounds::MIN);
    }

    #[test]
    fn zoom_factor_clamps_to_max() {
        assert_eq!(ZoomFactor::new(f64::INFINITY).value(), zoom_factor_bounds::MAX);
    }

    #[test]
    fn zoom_factor_scaled_multiplies() {
        let zoom = ZoomFactor::new(2.0).scaled(0.5);
        assert_eq!(zoom.value(), 1.0);
    }

    #[test]
    fn zoom_factor_percent() {
        assert_eq!(ZoomFactor::new(0.5).as_percent(), 200.0);
        assert_eq!(ZoomFactor::default().as_percent(), 100.0);
    }

    #[test]
    fn event_capacity_clamps() {
        assert_eq!(EventCapacity::new(0).value(), event_capacity_bounds::MIN);
        assert_eq!(
            EventCapacity::new(1_000_000).value(),
            event_capacity_bounds::MAX
        );
        assert_eq!(EventCapacity::new(500).value(), 500);
    }
}
