//! Parameters structure for LineCorrection

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{LineCorrectionError, COLD_START_GAIN};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default period of the line correction task.
pub const DEFAULT_PERIOD_MS: u64 = 10;

/// Default length of one floor tile (one foot).
pub const DEFAULT_TILE_CM: f64 = 30.48;

/// Default reflectance at or below which the sensor is over a line.
pub const DEFAULT_THRESHOLD: f64 = 0.32;

/// Default distance from the sensor to the drive axle along the direction of travel.
pub const DEFAULT_SENSOR_OFFSET_CM: f64 = 1.75;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for line correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Time between the start of two consecutive ticks.
    ///
    /// Units: milliseconds
    pub period_ms: u64,

    /// Spacing between two grid lines.
    ///
    /// Units: centimeters
    pub tile_cm: f64,

    /// Reflectance threshold. Scaled by the cold start gain to give the limit on the filter
    /// metric.
    pub threshold: f64,

    /// Offset between the sensor and the axle, applied against the direction of travel.
    ///
    /// Units: centimeters
    pub sensor_offset_cm: f64,

    /// If `true` a crossing is only reported when the metric first drops to the threshold,
    /// rather than on every tick it stays there.
    pub latch_crossings: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn period(&self) -> Duration {
        util::time::period_from_millis(self.period_ms)
    }

    /// The limit on the filter metric at or below which a line is detected.
    ///
    /// The same limit applies to the single sample and the full window metrics.
    pub fn metric_threshold(&self) -> f64 {
        self.threshold * COLD_START_GAIN
    }

    pub(crate) fn validate(&self) -> Result<(), LineCorrectionError> {
        if !(self.tile_cm.is_finite() && self.tile_cm > 0.0) {
            return Err(LineCorrectionError::InvalidParams(format!(
                "tile_cm must be finite and positive, found {}",
                self.tile_cm
            )));
        }
        if !self.threshold.is_finite() {
            return Err(LineCorrectionError::InvalidParams(format!(
                "threshold must be finite, found {}",
                self.threshold
            )));
        }
        if !self.sensor_offset_cm.is_finite() {
            return Err(LineCorrectionError::InvalidParams(format!(
                "sensor_offset_cm must be finite, found {}",
                self.sensor_offset_cm
            )));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            tile_cm: DEFAULT_TILE_CM,
            threshold: DEFAULT_THRESHOLD,
            sensor_offset_cm: DEFAULT_SENSOR_OFFSET_CM,
            latch_crossings: false,
        }
    }
}
