//! # Odometry library.
//!
//! Dead reckoning of a two wheeled vehicle from its motor encoders, with absolute corrections
//! taken whenever a floor sensor crosses one of the lines of a tiled floor. The executable and
//! the integration tests access the modules through this library.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Pose store - the shared, mutually exclusive pose estimate
pub mod pose_store;

/// Odometer - the process-wide pose store and vehicle constants
pub mod odometer;

/// Equipment - capabilities the vehicle provides to the odometry tasks
pub mod eqpt;

/// Dead reckoning - integrates the wheel encoders into the pose
pub mod dead_reckoning;

/// Line correction - detects floor lines and corrects the pose
pub mod line_correction;

/// Periodic tasks - runs a tick function at a fixed period on its own thread
pub mod periodic;

/// Simulation - a simulated vehicle on a tiled floor
pub mod sim;

/// Executable parameters
pub mod params;
