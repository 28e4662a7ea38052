//! # Simulated Equipment
//!
//! A differential drive vehicle on a floor of square tiles. The simulation keeps the true pose of
//! the vehicle and exposes the encoders, floor sensor and annunciator through the traits in
//! [`crate::eqpt`], so the odometry tasks can run against it exactly as they would against the
//! real vehicle.
//!
//! The world either follows the wall clock, advancing whenever one of the equipment handles is
//! used, or is stepped manually with [`Sim::step`] for deterministic tests.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Instant,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    dead_reckoning::WheelGeometry,
    eqpt::{Annunciator, EqptError, FloorSensor, MotorEncoders, Wheel},
    pose_store::Pose,
};
use util::maths::{rem_euclid, wrap_deg_360};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Longest step the world is integrated over in one go.
///
/// Units: seconds
const MAX_INTEGRATION_STEP_S: f64 = 0.001;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated vehicle and floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Ratio of the true wheel radius to the nominal one, used to introduce odometry drift.
    pub radius_scale: f64,

    /// True pose of the vehicle at the start of the simulation.
    ///
    /// The estimate always starts at the origin, so any offset here is an initial position error
    /// for the line correction to remove.
    pub start_pose: Pose,

    /// Spacing of the floor lines.
    ///
    /// Units: centimeters
    pub tile_cm: f64,

    /// Width of the floor lines.
    ///
    /// Units: centimeters
    pub line_width_cm: f64,

    /// Distance of the floor sensor ahead of the drive axle.
    ///
    /// Units: centimeters
    pub sensor_offset_cm: f64,

    /// Reflectance reported over a line.
    pub line_intensity: f64,

    /// Reflectance reported over a tile.
    pub floor_intensity: f64,

    /// Scripted wheel rates, executed in order.
    pub legs: Vec<DriveLeg>,
}

/// Constant wheel rates held for a duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveLeg {
    /// Units: degrees/second
    pub left_dps: f64,

    /// Units: degrees/second
    pub right_dps: f64,

    /// Units: seconds
    pub duration_s: f64,
}

/// Shared handle to a simulated world.
#[derive(Clone)]
pub struct Sim {
    world: Arc<Mutex<SimWorld>>,
    num_beeps: Arc<AtomicU64>,
}

/// Simulated rotation sensors of both drive motors.
pub struct SimEncoders(Sim);

/// Simulated floor reflectance sensor.
pub struct SimFloorSensor(Sim);

/// Simulated buzzer which counts the beeps.
pub struct SimAnnunciator(Sim);

struct SimWorld {
    geometry: WheelGeometry,
    params: SimParams,
    clock: SimClock,

    /// True pose.
    pose: Pose,
    heading_rad: f64,

    /// Total rotation of each wheel.
    left_deg: f64,
    right_deg: f64,

    left_dps: f64,
    right_dps: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// How time passes in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// The world follows the wall clock.
    WallClock,

    /// The world only moves on [`Sim::step`].
    Manual,
}

#[derive(Debug, Clone, Copy)]
enum SimClock {
    WallClock(Instant),
    Manual,
}

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid simulation parameters: {0}")]
    InvalidParams(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            radius_scale: 1.0,
            start_pose: Pose::default(),
            tile_cm: 30.48,
            line_width_cm: 0.5,
            sensor_offset_cm: 1.75,
            line_intensity: 0.1,
            floor_intensity: 0.6,
            legs: Vec::new(),
        }
    }
}

impl SimParams {
    /// Total duration of all legs.
    ///
    /// Units: seconds
    pub fn script_duration_s(&self) -> f64 {
        self.legs.iter().map(|l| l.duration_s).sum()
    }

    /// The leg being executed `elapsed_s` seconds after the start of the script, or `None` once
    /// the script has ended.
    pub fn leg_at(&self, elapsed_s: f64) -> Option<(usize, &DriveLeg)> {
        let mut leg_end_s = 0.0;

        for (i, leg) in self.legs.iter().enumerate() {
            leg_end_s += leg.duration_s;
            if elapsed_s < leg_end_s {
                return Some((i, leg));
            }
        }

        None
    }
}

impl Sim {
    pub fn new(
        geometry: WheelGeometry,
        params: SimParams,
        mode: ClockMode,
    ) -> Result<Self, SimError> {
        if !geometry.is_valid() {
            return Err(SimError::InvalidParams(format!("invalid geometry {:?}", geometry)));
        }
        if !(params.radius_scale.is_finite() && params.radius_scale > 0.0) {
            return Err(SimError::InvalidParams(format!(
                "radius_scale must be finite and positive, found {}",
                params.radius_scale
            )));
        }
        if !(params.tile_cm.is_finite() && params.tile_cm > 0.0) {
            return Err(SimError::InvalidParams(format!(
                "tile_cm must be finite and positive, found {}",
                params.tile_cm
            )));
        }
        if params
            .legs
            .iter()
            .any(|l| l.duration_s.is_nan() || l.duration_s < 0.0)
        {
            return Err(SimError::InvalidParams("leg durations must not be negative".into()));
        }

        let clock = match mode {
            ClockMode::WallClock => SimClock::WallClock(Instant::now()),
            ClockMode::Manual => SimClock::Manual,
        };

        let pose = Pose {
            heading_deg: wrap_deg_360(params.start_pose.heading_deg),
            ..params.start_pose
        };

        Ok(Self {
            world: Arc::new(Mutex::new(SimWorld {
                geometry,
                clock,
                pose,
                heading_rad: pose.heading_deg.to_radians(),
                left_deg: 0.0,
                right_deg: 0.0,
                left_dps: 0.0,
                right_dps: 0.0,
                params,
            })),
            num_beeps: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn encoders(&self) -> SimEncoders {
        SimEncoders(self.clone())
    }

    pub fn floor_sensor(&self) -> SimFloorSensor {
        SimFloorSensor(self.clone())
    }

    pub fn annunciator(&self) -> SimAnnunciator {
        SimAnnunciator(self.clone())
    }

    /// Command new wheel rates, in degrees/second.
    pub fn set_wheel_rates(&self, left_dps: f64, right_dps: f64) {
        let mut world = self.lock();
        world.sync();
        world.left_dps = left_dps;
        world.right_dps = right_dps;
    }

    /// Advance a manually clocked world by `dt_s` seconds.
    ///
    /// Has no effect on a wall clock world.
    pub fn step(&self, dt_s: f64) {
        let mut world = self.lock();
        if let SimClock::Manual = world.clock {
            world.advance(dt_s);
        }
    }

    /// The true pose of the vehicle.
    pub fn true_pose(&self) -> Pose {
        let mut world = self.lock();
        world.sync();
        world.pose
    }

    /// Number of beeps emitted so far.
    pub fn num_beeps(&self) -> u64 {
        self.num_beeps.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, SimWorld> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SimWorld {
    /// Bring a wall clock world up to the current time.
    fn sync(&mut self) {
        if let SimClock::WallClock(last) = self.clock {
            let now = Instant::now();
            self.advance((now - last).as_secs_f64());
            self.clock = SimClock::WallClock(now);
        }
    }

    fn advance(&mut self, dt_s: f64) {
        if !dt_s.is_finite() || dt_s <= 0.0 {
            return;
        }

        let num_steps = (dt_s / MAX_INTEGRATION_STEP_S).ceil().max(1.0) as u64;
        let h = dt_s / num_steps as f64;
        let true_radius_cm = self.geometry.wheel_radius_cm * self.params.radius_scale;

        for _ in 0..num_steps {
            let dleft_deg = self.left_dps * h;
            let dright_deg = self.right_dps * h;
            self.left_deg += dleft_deg;
            self.right_deg += dright_deg;

            let left_cm = true_radius_cm * dleft_deg.to_radians();
            let right_cm = true_radius_cm * dright_deg.to_radians();
            let disp_cm = 0.5 * (left_cm + right_cm);
            let dheading_rad = (left_cm - right_cm) / self.geometry.track_cm;

            // Project along the mid-step heading
            let mid_heading_rad = self.heading_rad + 0.5 * dheading_rad;
            self.pose.x_cm += mid_heading_rad.sin() * disp_cm;
            self.pose.y_cm += mid_heading_rad.cos() * disp_cm;
            self.heading_rad += dheading_rad;
        }

        self.pose.heading_deg = wrap_deg_360(self.heading_rad.to_degrees());
    }

    /// Reflectance under the sensor at the current pose.
    fn reflectance(&self) -> f64 {
        let sensor_x_cm = self.pose.x_cm + self.heading_rad.sin() * self.params.sensor_offset_cm;
        let sensor_y_cm = self.pose.y_cm + self.heading_rad.cos() * self.params.sensor_offset_cm;

        let on_line = |pos_cm: f64| {
            let tile = self.params.tile_cm;
            let r = rem_euclid(pos_cm, tile);
            r.min(tile - r) <= 0.5 * self.params.line_width_cm
        };

        if on_line(sensor_x_cm) || on_line(sensor_y_cm) {
            self.params.line_intensity
        } else {
            self.params.floor_intensity
        }
    }
}

impl MotorEncoders for SimEncoders {
    fn cumulative_rotation_deg(&mut self, wheel: Wheel) -> Result<i32, EqptError> {
        let mut world = self.0.lock();
        world.sync();

        let (device, rotation_deg) = match wheel {
            Wheel::Left => ("left encoder", world.left_deg),
            Wheel::Right => ("right encoder", world.right_deg),
        };

        if !rotation_deg.is_finite() {
            return Err(EqptError::ReadFailed {
                device: device.into(),
                reason: format!("rotation is {}", rotation_deg),
            });
        }

        // Counters wrap like a 32 bit register
        Ok(rotation_deg.round() as i64 as i32)
    }
}

impl FloorSensor for SimFloorSensor {
    fn sample(&mut self) -> Result<f64, EqptError> {
        let mut world = self.0.lock();
        world.sync();

        Ok(world.reflectance().max(0.0).min(1.0))
    }
}

impl Annunciator for SimAnnunciator {
    fn beep(&mut self) {
        let n = self.0.num_beeps.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Beep ({})", n);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const GEOM: WheelGeometry = WheelGeometry {
        track_cm: 15.8,
        wheel_radius_cm: 2.1,
    };

    fn manual(params: SimParams) -> Sim {
        Sim::new(GEOM, params, ClockMode::Manual).unwrap()
    }

    #[test]
    fn test_straight_drive() {
        let sim = manual(SimParams::default());
        sim.set_wheel_rates(180.0, 180.0);
        sim.step(2.0);

        let pose = sim.true_pose();
        let expected = 2.1 * 360f64.to_radians();
        assert!(pose.x_cm.abs() < 1e-9);
        assert!((pose.y_cm - expected).abs() < 1e-6);
        assert_eq!(pose.heading_deg, 0.0);

        let mut enc = sim.encoders();
        assert_eq!(enc.cumulative_rotation_deg(Wheel::Left).unwrap(), 360);
        assert_eq!(enc.cumulative_rotation_deg(Wheel::Right).unwrap(), 360);
    }

    #[test]
    fn test_point_turn() {
        let sim = manual(SimParams::default());

        // Quarter turn clockwise
        let quarter_turn_deg = 90.0 * GEOM.track_cm / (2.0 * GEOM.wheel_radius_cm);
        sim.set_wheel_rates(quarter_turn_deg, -quarter_turn_deg);
        sim.step(1.0);

        let pose = sim.true_pose();
        assert!((pose.heading_deg - 90.0).abs() < 1e-6);
        assert!(pose.x_cm.abs() < 1e-9);
        assert!(pose.y_cm.abs() < 1e-9);
    }

    #[test]
    fn test_radius_scale() {
        let sim = manual(SimParams {
            radius_scale: 1.1,
            ..Default::default()
        });
        sim.set_wheel_rates(100.0, 100.0);
        sim.step(1.0);

        let expected = 1.1 * 2.1 * 100f64.to_radians();
        assert!((sim.true_pose().y_cm - expected).abs() < 1e-6);
        assert_eq!(sim.encoders().cumulative_rotation_deg(Wheel::Left).unwrap(), 100);
    }

    #[test]
    fn test_floor_sensor_sees_lines() {
        let sim = manual(SimParams {
            start_pose: Pose::new(15.0, -10.0, 0.0),
            ..Default::default()
        });
        let mut sensor = sim.floor_sensor();

        // Sensor at y = -8.25
        assert_eq!(sensor.sample().unwrap(), 0.6);

        // Drive until the sensor is over the line at y = 0
        let dist_cm = 8.25;
        let rate_dps = (dist_cm / 2.1f64).to_degrees();
        sim.set_wheel_rates(rate_dps, rate_dps);
        sim.step(1.0);
        sim.set_wheel_rates(0.0, 0.0);

        assert!((sim.true_pose().y_cm - -1.75).abs() < 1e-6);
        assert_eq!(sensor.sample().unwrap(), 0.1);
    }

    #[test]
    fn test_non_finite_steps_are_ignored() {
        let sim = manual(SimParams::default());
        sim.set_wheel_rates(180.0, 180.0);

        sim.step(f64::INFINITY);
        sim.step(f64::NAN);
        sim.step(-1.0);

        assert_eq!(sim.true_pose(), Pose::default());
        assert_eq!(sim.encoders().cumulative_rotation_deg(Wheel::Left).unwrap(), 0);
    }

    #[test]
    fn test_encoders_wrap() {
        let sim = manual(SimParams::default());
        sim.set_wheel_rates(3.0e9, 0.0);
        sim.step(1.0);

        let mut enc = sim.encoders();
        let expected = (3_000_000_000i64 - (1i64 << 32)) as i32;
        assert_eq!(enc.cumulative_rotation_deg(Wheel::Left).unwrap(), expected);
        assert_eq!(enc.cumulative_rotation_deg(Wheel::Right).unwrap(), 0);
    }

    #[test]
    fn test_non_finite_rotation_fails_read() {
        let sim = manual(SimParams::default());
        sim.set_wheel_rates(f64::NAN, 10.0);
        sim.step(1.0);

        let mut enc = sim.encoders();
        match enc.cumulative_rotation_deg(Wheel::Left) {
            Err(EqptError::ReadFailed { device, .. }) => assert_eq!(device, "left encoder"),
            r => panic!("expected ReadFailed, got {:?}", r),
        }
        assert_eq!(enc.cumulative_rotation_deg(Wheel::Right).unwrap(), 10);
    }

    #[test]
    fn test_beeps_are_counted() {
        let sim = manual(SimParams::default());
        let mut a = sim.annunciator();
        a.beep();
        a.beep();
        assert_eq!(sim.num_beeps(), 2);
    }

    #[test]
    fn test_leg_at() {
        let params = SimParams {
            legs: vec![
                DriveLeg {
                    left_dps: 1.0,
                    right_dps: 1.0,
                    duration_s: 2.0,
                },
                DriveLeg {
                    left_dps: 1.0,
                    right_dps: -1.0,
                    duration_s: 0.5,
                },
            ],
            ..Default::default()
        };

        assert_eq!(params.script_duration_s(), 2.5);
        assert_eq!(params.leg_at(0.0).map(|l| l.0), Some(0));
        assert_eq!(params.leg_at(1.99).map(|l| l.0), Some(0));
        assert_eq!(params.leg_at(2.0).map(|l| l.0), Some(1));
        assert_eq!(params.leg_at(2.5), None);
    }

    #[test]
    fn test_invalid_params() {
        assert!(Sim::new(
            GEOM,
            SimParams {
                radius_scale: 0.0,
                ..Default::default()
            },
            ClockMode::Manual
        )
        .is_err());

        assert!(Sim::new(
            WheelGeometry {
                track_cm: -1.0,
                wheel_radius_cm: 2.1
            },
            SimParams::default(),
            ClockMode::Manual
        )
        .is_err());
    }
}
