//! Implementations for the LineCorrection state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{Axis, IntensityWindow, LineCorrectionError, Params, Sector};
use crate::pose_store::Pose;
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Line correction module state.
#[derive(Debug, Default)]
pub struct LineCorrector {
    params: Option<Params>,

    window: IntensityWindow,

    counters: GridLineCounters,

    /// Whether the previous metric was at or below the threshold.
    was_below: bool,
}

/// Number of grid lines crossed along each axis, counting down when travelling towards negative
/// coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GridLineCounters {
    pub x: i32,
    pub y: i32,
}

/// Result of filtering one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    /// Filter decision metric.
    pub metric: f64,

    /// `true` if a line crossing should be handled on this cycle.
    pub crossing: bool,
}

/// A correction of one axis of the pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correction {
    /// Direction of travel the correction was calculated for.
    pub sector: Sector,

    /// Position on the corrected axis before correction.
    ///
    /// Units: centimeters
    pub previous_cm: f64,

    /// Position on the corrected axis after correction.
    ///
    /// Units: centimeters
    pub corrected_cm: f64,

    /// Counters once the crossing has been accounted for.
    pub counters: GridLineCounters,
}

/// Status report for LineCorrection processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub window_len: usize,
    pub window_sum: f64,
    pub below_threshold: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineCorrector {
    /// Create and initialise a new instance.
    pub fn new(params: Params) -> Result<Self, LineCorrectionError> {
        util::module::create(params)
    }

    pub fn counters(&self) -> GridLineCounters {
        self.counters
    }

    /// Correct the pose for a line crossing.
    ///
    /// The heading of `pose` selects the axis to correct. If the heading isn't within one of the
    /// sectors `None` is returned and the counters are left untouched.
    pub fn correct(&mut self, pose: &Pose) -> Result<Option<Correction>, LineCorrectionError> {
        let params = self
            .params
            .as_ref()
            .ok_or(LineCorrectionError::NotInitialised)?;

        let sector = match Sector::classify(pose.heading_deg) {
            Some(s) => s,
            None => {
                debug!(
                    "Line crossed with heading {:.02} deg outside all sectors, not correcting",
                    pose.heading_deg
                );
                return Ok(None);
            }
        };

        let previous_cm = match sector.axis() {
            Axis::X => pose.x_cm,
            Axis::Y => pose.y_cm,
        };

        let corrected_cm = apply_crossing(&mut self.counters, sector, previous_cm, params);

        Ok(Some(Correction {
            sector,
            previous_cm,
            corrected_cm,
            counters: self.counters,
        }))
    }
}

impl State for LineCorrector {
    type InitData = Params;
    type InitError = LineCorrectionError;

    type InputData = f64;
    type OutputData = Detection;
    type StatusReport = StatusReport;
    type ProcError = LineCorrectionError;

    /// Initialise the module, clearing the filter and the counters.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.validate()?;

        *self = Self {
            params: Some(init_data),
            window: IntensityWindow::new(),
            ..Default::default()
        };

        Ok(())
    }

    /// Filter one reflectance sample.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let params = self
            .params
            .as_ref()
            .ok_or(LineCorrectionError::NotInitialised)?;

        let metric = self.window.push(*input_data);
        let below = metric <= params.metric_threshold();

        let crossing = if params.latch_crossings {
            below && !self.was_below
        } else {
            below
        };
        self.was_below = below;

        trace!(
            "LineCorrection sample {:.03}, metric {:.01}, crossing {}",
            input_data,
            metric,
            crossing
        );

        Ok((
            Detection { metric, crossing },
            StatusReport {
                window_len: self.window.len(),
                window_sum: self.window.sum(),
                below_threshold: below,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Update the counters for a crossing in the given sector and return the corrected position on
/// the sector's axis.
///
/// Travelling towards positive coordinates the line just crossed is the one at the current count,
/// which is then incremented. Travelling towards negative coordinates the count is decremented
/// first. The sensor offset is removed in the direction of travel.
pub fn apply_crossing(
    counters: &mut GridLineCounters,
    sector: Sector,
    position_cm: f64,
    params: &Params,
) -> f64 {
    let count = match sector.axis() {
        Axis::X => &mut counters.x,
        Axis::Y => &mut counters.y,
    };

    if !sector.is_positive() {
        *count -= 1;
    }

    let expected_cm = params.tile_cm * (*count as f64);
    let difference = position_cm - expected_cm;

    if sector.is_positive() {
        *count += 1;
        position_cm - difference - params.sensor_offset_cm
    } else {
        position_cm - difference + params.sensor_offset_cm
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const DARK: f64 = 0.1;
    const LIGHT: f64 = 0.6;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_not_initialised() {
        let mut lc = LineCorrector::default();
        assert!(matches!(
            lc.proc(&0.5),
            Err(LineCorrectionError::NotInitialised)
        ));
        assert!(matches!(
            lc.correct(&Pose::default()),
            Err(LineCorrectionError::NotInitialised)
        ));
    }

    #[test]
    fn test_invalid_params() {
        let params = Params {
            tile_cm: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            LineCorrector::new(params),
            Err(LineCorrectionError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_threshold() {
        assert!(approx(Params::default().metric_threshold(), 1600.0));

        let mut lc = LineCorrector::new(Params::default()).unwrap();

        // Cold start: single sample decides
        assert!(!lc.proc(&0.33).unwrap().0.crossing);
        assert!(lc.proc(&0.31).unwrap().0.crossing);
        assert!(!lc.proc(&LIGHT).unwrap().0.crossing);
        assert!(!lc.proc(&LIGHT).unwrap().0.crossing);
        assert!(!lc.proc(&LIGHT).unwrap().0.crossing);

        // Steady state: two dark samples in a light window are not enough
        assert!(!lc.proc(&DARK).unwrap().0.crossing);
        assert!(!lc.proc(&DARK).unwrap().0.crossing);

        // A third is: 3 * 0.1 + 2 * 0.6 = 1.5
        let (det, report) = lc.proc(&DARK).unwrap();
        assert!(det.crossing);
        assert!(approx(det.metric, 1500.0));
        assert_eq!(report.window_len, 5);
        assert!(report.below_threshold);

        // Without latching every dark cycle is a crossing
        assert!(lc.proc(&DARK).unwrap().0.crossing);
    }

    #[test]
    fn test_latched_crossings() {
        let mut lc = LineCorrector::new(Params {
            latch_crossings: true,
            ..Default::default()
        })
        .unwrap();

        let mut crossings = Vec::new();
        let signal = [
            LIGHT, LIGHT, LIGHT, LIGHT, LIGHT, DARK, DARK, DARK, DARK, DARK, LIGHT, LIGHT, LIGHT,
            LIGHT, DARK, DARK, DARK,
        ];
        for (i, s) in signal.iter().enumerate() {
            if lc.proc(s).unwrap().0.crossing {
                crossings.push(i);
            }
        }

        assert_eq!(crossings, vec![7, 16]);
    }

    #[test]
    fn test_crossing_in_pos_y() {
        let mut lc = LineCorrector::new(Params::default()).unwrap();

        let pose = Pose::new(0.0, 32.0, 5.0);
        let c = lc.correct(&pose).unwrap().unwrap();

        assert_eq!(c.sector, Sector::PosY);
        assert_eq!(c.previous_cm, 32.0);
        assert!(approx(c.corrected_cm, 32.0 - (32.0 - 30.48 * 0.0) - 1.75));
        assert_eq!(lc.counters(), GridLineCounters { x: 0, y: 1 });
        assert_eq!(c.counters, lc.counters());

        // Next line along is one tile further
        let c = lc.correct(&Pose::new(0.0, 29.0, 358.0)).unwrap().unwrap();
        assert!(approx(c.corrected_cm, 30.48 - 1.75));
        assert_eq!(lc.counters().y, 2);
    }

    #[test]
    fn test_crossing_in_neg_y() {
        let mut lc = LineCorrector::new(Params::default()).unwrap();
        lc.counters = GridLineCounters { x: 0, y: 2 };

        let c = lc.correct(&Pose::new(3.0, 33.0, 181.0)).unwrap().unwrap();

        assert_eq!(c.sector, Sector::NegY);
        assert_eq!(lc.counters().y, 1);
        assert!(approx(c.corrected_cm, 30.48 + 1.75));
    }

    #[test]
    fn test_crossing_in_x() {
        let mut lc = LineCorrector::new(Params::default()).unwrap();

        let c = lc.correct(&Pose::new(2.0, 10.0, 91.0)).unwrap().unwrap();
        assert_eq!(c.sector, Sector::PosX);
        assert_eq!(c.previous_cm, 2.0);
        assert!(approx(c.corrected_cm, -1.75));
        assert_eq!(lc.counters(), GridLineCounters { x: 1, y: 0 });

        let c = lc.correct(&Pose::new(-1.0, 10.0, 269.0)).unwrap().unwrap();
        assert_eq!(c.sector, Sector::NegX);
        assert!(approx(c.corrected_cm, 1.75));
        assert_eq!(lc.counters(), GridLineCounters { x: 0, y: 0 });
    }

    #[test]
    fn test_no_correction_outside_sectors() {
        let mut lc = LineCorrector::new(Params::default()).unwrap();

        for &h in &[10.0, 45.0, 350.0, 100.0] {
            assert_eq!(lc.correct(&Pose::new(1.0, 1.0, h)).unwrap(), None);
        }
        assert_eq!(lc.counters(), GridLineCounters::default());
    }

    #[test]
    fn test_custom_tile_and_offset() {
        let params = Params {
            tile_cm: 50.0,
            sensor_offset_cm: -2.0,
            ..Default::default()
        };
        let mut counters = GridLineCounters { x: 3, y: 0 };

        let corrected = apply_crossing(&mut counters, Sector::PosX, 148.0, &params);
        assert!(approx(corrected, 152.0));
        assert_eq!(counters.x, 4);
    }
}
