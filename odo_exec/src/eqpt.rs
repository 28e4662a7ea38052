//! # Equipment Interfaces
//!
//! The odometry tasks never talk to hardware directly. Instead they are given implementors of the
//! traits in this module, which may be real drivers or the simulated equipment in [`crate::sim`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The drive wheels of the vehicle.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum Wheel {
    Left,
    Right,
}

/// Errors reported by equipment.
#[derive(Debug, thiserror::Error)]
pub enum EqptError {
    #[error("{0} is not available")]
    Unavailable(String),

    #[error("Could not read from {device}: {reason}")]
    ReadFailed { device: String, reason: String },
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Rotation sensors on the drive motors.
pub trait MotorEncoders: Send {
    /// Get the total rotation of the given wheel since the sensor was last reset.
    ///
    /// Units: degrees
    fn cumulative_rotation_deg(&mut self, wheel: Wheel) -> Result<i32, EqptError>;
}

/// Downwards-facing reflectance sensor used to detect the floor grid lines.
pub trait FloorSensor: Send {
    /// Acquire a single reflectance sample in the range [0, 1].
    fn sample(&mut self) -> Result<f64, EqptError>;
}

/// Something that can make the operator aware of an event, such as a buzzer.
pub trait Annunciator: Send {
    /// Emit a short acknowledgement. Failures are not reported.
    fn beep(&mut self);
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: MotorEncoders + ?Sized> MotorEncoders for Box<T> {
    fn cumulative_rotation_deg(&mut self, wheel: Wheel) -> Result<i32, EqptError> {
        (**self).cumulative_rotation_deg(wheel)
    }
}

impl<T: FloorSensor + ?Sized> FloorSensor for Box<T> {
    fn sample(&mut self) -> Result<f64, EqptError> {
        (**self).sample()
    }
}

impl<T: Annunciator + ?Sized> Annunciator for Box<T> {
    fn beep(&mut self) {
        (**self).beep()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dead_reckoning::WheelGeometry,
        sim::{ClockMode, Sim, SimParams},
    };

    #[test]
    fn test_boxed_equipment_forwards() {
        let sim = Sim::new(
            WheelGeometry {
                track_cm: 15.8,
                wheel_radius_cm: 2.1,
            },
            SimParams::default(),
            ClockMode::Manual,
        )
        .unwrap();
        sim.set_wheel_rates(10.0, -20.0);
        sim.step(1.0);

        let mut encoders: Box<dyn MotorEncoders> = Box::new(sim.encoders());
        let mut sensor: Box<dyn FloorSensor> = Box::new(sim.floor_sensor());
        let mut annunciator: Box<dyn Annunciator> = Box::new(sim.annunciator());

        assert_eq!(encoders.cumulative_rotation_deg(Wheel::Left).unwrap(), 10);
        assert_eq!(encoders.cumulative_rotation_deg(Wheel::Right).unwrap(), -20);
        assert!(sensor.sample().is_ok());
        annunciator.beep();
        assert_eq!(sim.num_beeps(), 1);
    }
}
