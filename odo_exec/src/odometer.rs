//! # Odometer
//!
//! Process-wide access point to the pose store and the physical constants of the vehicle. The
//! first call to [`init`] creates the odometer, later calls return the same instance. Tasks
//! should be handed the [`PoseStore`] from [`Odometer::store`] at construction rather than
//! looking it up themselves.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::Arc;

use conquer_once::OnceCell;
use log::{debug, info, warn};

use crate::{dead_reckoning::WheelGeometry, pose_store::PoseStore};

// ------------------------------------------------------------------------------------------------
// GLOBALS
// ------------------------------------------------------------------------------------------------

static ODOMETER: OnceCell<Odometer> = OnceCell::uninit();

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The single odometer of the process.
#[derive(Debug)]
pub struct Odometer {
    geometry: WheelGeometry,
    store: Arc<PoseStore>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum OdometerError {
    #[error("The odometer has not been initialised")]
    NotInitialized,

    #[error(
        "The odometer is already initialised with {existing:?}, cannot reinitialise with \
         {requested:?}"
    )]
    AlreadyInitialized {
        existing: WheelGeometry,
        requested: WheelGeometry,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Odometer {
    /// The physical constants the odometer was created with.
    pub fn geometry(&self) -> WheelGeometry {
        self.geometry
    }

    /// A handle to the shared pose store.
    pub fn store(&self) -> Arc<PoseStore> {
        self.store.clone()
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create the odometer with the given geometry, or get the existing one.
///
/// Asking for a different geometry than the one the odometer was created with is rejected with
/// `AlreadyInitialized`.
pub fn init(geometry: WheelGeometry) -> Result<&'static Odometer, OdometerError> {
    let mut created = false;

    let odo = ODOMETER.get_or_init(|| {
        created = true;
        Odometer {
            geometry,
            store: Arc::new(PoseStore::new()),
        }
    });

    if created {
        info!("Odometer initialised with {:?}", geometry);
    } else if odo.geometry == geometry {
        debug!("Odometer already initialised with identical geometry");
    } else {
        warn!(
            "Rejecting odometer reinitialisation: have {:?}, requested {:?}",
            odo.geometry, geometry
        );
        return Err(OdometerError::AlreadyInitialized {
            existing: odo.geometry,
            requested: geometry,
        });
    }

    Ok(odo)
}

/// Get the odometer, which must already have been created by [`init`].
pub fn get() -> Result<&'static Odometer, OdometerError> {
    ODOMETER.get().ok_or(OdometerError::NotInitialized)
}
