//! Tunables for the viewer session and gesture interpreter

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Viewer tunables, deserialized from the `viewer` section of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Smallest allowed zoom factor
    pub min_scale: f32,
    /// Largest allowed zoom factor
    pub max_scale: f32,
    /// Scale a double-tap zooms to from 1.0
    pub zoomed_scale: f32,
    /// Zoom change per keyboard step
    pub zoom_step: f32,
    /// Minimum horizontal travel for a swipe
    pub swipe_threshold: f32,
    /// Maximum duration of a swipe
    pub swipe_max_duration_ms: u64,
    /// Maximum gap between the two taps of a double-tap
    pub double_tap_window_ms: u64,
    /// Maximum distance between the two taps of a double-tap
    pub double_tap_radius: f32,
    /// Movement below which a touch still counts as a tap
    pub tap_slop: f32,
    /// Finger distance change that re-announces the zoom level during a pinch
    pub pinch_sensitivity: f32,
    /// How long page and zoom indicators stay visible
    pub indicator_delay_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 3.0,
            zoomed_scale: 2.0,
            zoom_step: 0.2,
            swipe_threshold: 30.0,
            swipe_max_duration_ms: 300,
            double_tap_window_ms: 300,
            double_tap_radius: 30.0,
            tap_slop: 10.0,
            pinch_sensitivity: 5.0,
            indicator_delay_ms: 1500,
        }
    }
}

impl ViewerConfig {
    pub fn swipe_max_duration(&self) -> Duration {
        Duration::from_millis(self.swipe_max_duration_ms)
    }

    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_window_ms)
    }

    pub fn indicator_delay(&self) -> Duration {
        Duration::from_millis(self.indicator_delay_ms)
    }

    /// Clamp a scale into the configured range, handling NaN/Inf
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if !scale.is_finite() {
            1.0_f32.clamp(self.min_scale, self.max_scale)
        } else {
            scale.clamp(self.min_scale, self.max_scale)
        }
    }

    /// Repair values a hand-edited settings file may have broken
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            self.min_scale = defaults.min_scale;
        }
        if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
            self.max_scale = defaults.max_scale.max(self.min_scale);
        }
        self.zoomed_scale = self.clamp_scale(self.zoomed_scale);
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            self.zoom_step = defaults.zoom_step;
        }
        self
    }
}
