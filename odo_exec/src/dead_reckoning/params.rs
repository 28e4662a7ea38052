//! Parameters structure for DeadReckoning

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default period of the dead reckoning task.
pub const DEFAULT_PERIOD_MS: u64 = 25;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The physical constants of the drive base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelGeometry {
    /// Distance between the contact points of the left and right wheels.
    ///
    /// Units: centimeters
    pub track_cm: f64,

    /// Radius of the drive wheels.
    ///
    /// Units: centimeters
    pub wheel_radius_cm: f64,
}

/// Parameters for the dead reckoning task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Time between the start of two consecutive ticks.
    ///
    /// Units: milliseconds
    pub period_ms: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelGeometry {
    /// Both dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.track_cm.is_finite()
            && self.wheel_radius_cm.is_finite()
            && self.track_cm > 0.0
            && self.wheel_radius_cm > 0.0
    }
}

impl Params {
    pub fn period(&self) -> Duration {
        util::time::period_from_millis(self.period_ms)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}
