//! Implementations for the DeadReckoning state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{DeadReckoningError, WheelGeometry};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Dead reckoning module state.
#[derive(Debug, Default)]
pub struct DeadReckoning {
    geometry: Option<WheelGeometry>,

    /// Encoder sample from the previous cycle.
    prev_sample: EncoderSample,

    /// Accumulated heading.
    ///
    /// Units: radians
    heading_rad: f64,
}

/// Cumulative wheel rotations at one sampling instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EncoderSample {
    /// Units: degrees
    pub left_deg: i32,

    /// Units: degrees
    pub right_deg: i32,
}

/// Motion of the vehicle centre between two samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Displacement {
    /// Distance travelled by the centre of the axle.
    ///
    /// Units: centimeters
    pub disp_cm: f64,

    /// Change in heading, positive clockwise.
    ///
    /// Units: radians
    pub dheading_rad: f64,
}

/// Increment to apply to the pose store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PoseDelta {
    /// Units: centimeters
    pub dx_cm: f64,

    /// Units: centimeters
    pub dy_cm: f64,

    /// Units: degrees
    pub dheading_deg: f64,
}

/// Status report for DeadReckoning processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub left_delta_deg: i32,
    pub right_delta_deg: i32,
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DeadReckoning {
    /// Create and initialise a new instance.
    pub fn new(geometry: WheelGeometry) -> Result<Self, DeadReckoningError> {
        util::module::create(geometry)
    }

    /// The heading accumulated by this module since initialisation, in radians.
    pub fn heading_rad(&self) -> f64 {
        self.heading_rad
    }
}

impl State for DeadReckoning {
    type InitData = WheelGeometry;
    type InitError = DeadReckoningError;

    type InputData = EncoderSample;
    type OutputData = PoseDelta;
    type StatusReport = StatusReport;
    type ProcError = DeadReckoningError;

    /// Initialise the module with the vehicle geometry.
    ///
    /// The previous sample is reset to zero on both wheels, i.e. the encoders are expected to
    /// have been reset when the vehicle was at the origin.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        if !init_data.is_valid() {
            return Err(DeadReckoningError::InvalidGeometry(init_data));
        }

        *self = Self {
            geometry: Some(init_data),
            ..Default::default()
        };

        Ok(())
    }

    /// Integrate one encoder sample.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let geometry = self.geometry.ok_or(DeadReckoningError::NotInitialised)?;

        // The counters may wrap, a wrapping difference gives the true step across the wrap
        let left_delta_deg = input_data.left_deg.wrapping_sub(self.prev_sample.left_deg);
        let right_delta_deg = input_data.right_deg.wrapping_sub(self.prev_sample.right_deg);
        self.prev_sample = *input_data;

        let disp = calc_displacement(&geometry, left_delta_deg, right_delta_deg);

        // Position increments are projected on the updated heading
        self.heading_rad += disp.dheading_rad;

        let output = PoseDelta {
            dx_cm: self.heading_rad.sin() * disp.disp_cm,
            dy_cm: self.heading_rad.cos() * disp.disp_cm,
            dheading_deg: disp.dheading_rad.to_degrees(),
        };

        trace!(
            "DeadReckoning deltas L: {} deg, R: {} deg -> {:?}",
            left_delta_deg,
            right_delta_deg,
            output
        );

        Ok((
            output,
            StatusReport {
                left_delta_deg,
                right_delta_deg,
                heading_rad: self.heading_rad,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the displacement of the vehicle from the rotation of each wheel.
pub fn calc_displacement(
    geometry: &WheelGeometry,
    left_delta_deg: i32,
    right_delta_deg: i32,
) -> Displacement {
    let left_cm = wheel_distance_cm(geometry.wheel_radius_cm, left_delta_deg);
    let right_cm = wheel_distance_cm(geometry.wheel_radius_cm, right_delta_deg);

    Displacement {
        disp_cm: 0.5 * (left_cm + right_cm),
        dheading_rad: (left_cm - right_cm) / geometry.track_cm,
    }
}

/// Arc length rolled by a wheel turning through the given angle.
fn wheel_distance_cm(wheel_radius_cm: f64, delta_deg: i32) -> f64 {
    wheel_radius_cm * (delta_deg as f64).to_radians()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
