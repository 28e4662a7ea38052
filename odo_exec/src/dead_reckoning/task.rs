//! Periodic dead reckoning task
//!
//! Each tick reads both encoders, integrates the sample and adds the result to the pose store.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use super::{DeadReckoning, DeadReckoningError, EncoderSample, Params};
use crate::{
    eqpt::{EqptError, MotorEncoders, Wheel},
    periodic::{PeriodicTask, TaskError},
    pose_store::PoseStore,
};
use util::module::State;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the dead reckoning task thread.
pub const TASK_NAME: &str = "dead_reckoning";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything one tick of the integrator needs.
pub struct Integrator<M> {
    encoders: M,
    dead_reckoning: DeadReckoning,
    store: Arc<PoseStore>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a single integrator tick can fail.
#[derive(Debug, thiserror::Error)]
pub enum IntegratorTickError {
    #[error("Could not read the encoders: {0}")]
    EncoderError(#[from] EqptError),

    #[error("Could not integrate the sample: {0}")]
    ProcError(#[from] DeadReckoningError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<M: MotorEncoders> Integrator<M> {
    pub fn new(encoders: M, dead_reckoning: DeadReckoning, store: Arc<PoseStore>) -> Self {
        Self {
            encoders,
            dead_reckoning,
            store,
        }
    }

    /// Execute one tick.
    ///
    /// If either encoder can't be read nothing is accumulated, and the next successful tick
    /// covers the missed motion since the previous sample is kept.
    pub fn tick(&mut self) -> Result<(), IntegratorTickError> {
        let sample = EncoderSample {
            left_deg: self.encoders.cumulative_rotation_deg(Wheel::Left)?,
            right_deg: self.encoders.cumulative_rotation_deg(Wheel::Right)?,
        };

        let (delta, _) = self.dead_reckoning.proc(&sample)?;

        self.store.update(delta.dx_cm, delta.dy_cm, delta.dheading_deg);

        Ok(())
    }

    pub fn dead_reckoning(&self) -> &DeadReckoning {
        &self.dead_reckoning
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Start the dead reckoning task.
pub fn spawn<M>(mut integrator: Integrator<M>, params: &Params) -> Result<PeriodicTask, TaskError>
where
    M: MotorEncoders + 'static,
{
    PeriodicTask::spawn(TASK_NAME, params.period(), move || integrator.tick())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
