//! # Pose Store
//!
//! Shared storage for the current pose estimate. Both the dead reckoning and
//! line correction tasks write into the same store, so every access goes
//! through a single mutex and is held only for the duration of the
//! read/modify/write.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use util::maths::wrap_deg_360;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The planar pose of the vehicle.
///
/// Heading is measured clockwise from the +Y axis, so a heading of 90 degrees points along +X.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position along the X axis.
    ///
    /// Units: centimeters
    pub x_cm: f64,

    /// Position along the Y axis.
    ///
    /// Units: centimeters
    pub y_cm: f64,

    /// Heading of the vehicle.
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

/// Mutually exclusive storage for the current [`Pose`].
#[derive(Debug, Default)]
pub struct PoseStore {
    pose: Mutex<Pose>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(x_cm: f64, y_cm: f64, heading_deg: f64) -> Self {
        Self {
            x_cm,
            y_cm,
            heading_deg,
        }
    }
}

impl PoseStore {
    /// Create a new store holding the origin pose `(0, 0, 0)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store holding the given pose.
    pub fn from_pose(pose: Pose) -> Self {
        Self {
            pose: Mutex::new(pose),
        }
    }

    /// Get a copy of the current pose.
    pub fn get_pose(&self) -> Pose {
        *self.lock()
    }

    /// Overwrite the whole pose.
    ///
    /// The heading is stored as given, without normalisation.
    pub fn set_pose(&self, x_cm: f64, y_cm: f64, heading_deg: f64) {
        *self.lock() = Pose::new(x_cm, y_cm, heading_deg);
    }

    /// Overwrite only the X position.
    pub fn set_x(&self, x_cm: f64) {
        self.lock().x_cm = x_cm;
    }

    /// Overwrite only the Y position.
    pub fn set_y(&self, y_cm: f64) {
        self.lock().y_cm = y_cm;
    }

    /// Overwrite only the heading.
    pub fn set_heading(&self, heading_deg: f64) {
        self.lock().heading_deg = heading_deg;
    }

    /// Add the given increments to the current pose in a single critical section.
    ///
    /// The resulting heading is wrapped into [0, 360). Returns the updated pose.
    pub fn update(&self, dx_cm: f64, dy_cm: f64, dheading_deg: f64) -> Pose {
        let mut pose = self.lock();

        pose.x_cm += dx_cm;
        pose.y_cm += dy_cm;
        pose.heading_deg = wrap_deg_360(pose.heading_deg + dheading_deg);

        *pose
    }

    /// Lock the pose.
    ///
    /// A poisoned lock still holds a complete `Pose` since every write is a plain assignment,
    /// so the guard is recovered rather than propagating the panic.
    fn lock(&self) -> MutexGuard<'_, Pose> {
        self.pose.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
