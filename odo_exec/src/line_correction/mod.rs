//! # Line Correction module
//!
//! The floor is covered in square tiles separated by dark lines. A reflectance sensor mounted
//! ahead of the drive axle sees each line as the vehicle drives over it, which gives an absolute
//! position along the direction of travel. This module smooths the sensor signal, detects the
//! crossings, and pulls the pose estimate back onto the expected line position.
//!
//! Only the axis the vehicle is travelling along is corrected, and only while the heading is
//! within a narrow sector around one of the four cardinal directions.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod sector;
mod state;
pub mod task;
mod window;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use sector::*;
pub use state::*;
pub use window::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LineCorrection operation.
#[derive(Debug, thiserror::Error)]
pub enum LineCorrectionError {
    #[error("Invalid line correction parameters: {0}")]
    InvalidParams(String),

    #[error("LineCorrection has not been initialised")]
    NotInitialised,
}
