//! Periodic line correction task
//!
//! Each tick samples the floor sensor and filters it. When a crossing is detected the operator is
//! notified, the pose is read once and the axis matching the direction of travel is overwritten
//! with the corrected value.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use log::{debug, info};

use super::{Axis, Correction, LineCorrectionError, LineCorrector, Params};
use crate::{
    eqpt::{Annunciator, EqptError, FloorSensor},
    periodic::{PeriodicTask, TaskError},
    pose_store::PoseStore,
};
use util::module::State;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the line correction task thread.
pub const TASK_NAME: &str = "line_correction";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything one tick of the corrector needs.
pub struct Corrector<S, A> {
    sensor: S,
    annunciator: A,
    line_corrector: LineCorrector,
    store: Arc<PoseStore>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a single corrector tick can fail.
#[derive(Debug, thiserror::Error)]
pub enum CorrectorTickError {
    #[error("Could not sample the floor sensor: {0}")]
    SensorError(#[from] EqptError),

    #[error("Could not process the sample: {0}")]
    ProcError(#[from] LineCorrectionError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S: FloorSensor, A: Annunciator> Corrector<S, A> {
    pub fn new(
        sensor: S,
        annunciator: A,
        line_corrector: LineCorrector,
        store: Arc<PoseStore>,
    ) -> Self {
        Self {
            sensor,
            annunciator,
            line_corrector,
            store,
        }
    }

    /// Execute one tick, returning the correction applied to the store if any.
    pub fn tick(&mut self) -> Result<Option<Correction>, CorrectorTickError> {
        let sample = self.sensor.sample()?;

        let (detection, _) = self.line_corrector.proc(&sample)?;
        if !detection.crossing {
            return Ok(None);
        }

        debug!("Line detected, metric {:.01}", detection.metric);
        self.annunciator.beep();

        let pose = self.store.get_pose();
        let correction = match self.line_corrector.correct(&pose)? {
            Some(c) => c,
            None => return Ok(None),
        };

        match correction.sector.axis() {
            Axis::X => self.store.set_x(correction.corrected_cm),
            Axis::Y => self.store.set_y(correction.corrected_cm),
        }

        info!(
            "Line crossed travelling {:?}: {:?} {:.02} cm -> {:.02} cm, counters {:?}",
            correction.sector,
            correction.sector.axis(),
            correction.previous_cm,
            correction.corrected_cm,
            correction.counters
        );

        Ok(Some(correction))
    }

    pub fn line_corrector(&self) -> &LineCorrector {
        &self.line_corrector
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Start the line correction task.
pub fn spawn<S, A>(
    mut corrector: Corrector<S, A>,
    params: &Params,
) -> Result<PeriodicTask, TaskError>
where
    S: FloorSensor + 'static,
    A: Annunciator + 'static,
{
    PeriodicTask::spawn(TASK_NAME, params.period(), move || corrector.tick().map(|_| ()))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
