//! # Dead Reckoning module
//!
//! Converts the cumulative rotation of the two drive wheels into increments of position and
//! heading. The computation lives in [`DeadReckoning`], which knows nothing about timing, and is
//! driven periodically by the task in [`task`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;
pub mod task;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DeadReckoning operation.
#[derive(Debug, thiserror::Error)]
pub enum DeadReckoningError {
    #[error("Invalid wheel geometry, both dimensions must be finite and positive: {0:?}")]
    InvalidGeometry(WheelGeometry),

    #[error("DeadReckoning has not been initialised")]
    NotInitialised,
}
