//! Parameters of the odometry executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{dead_reckoning, line_correction, sim::SimParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Contents of `odo_exec.toml`.
///
/// Only the geometry is required, every other table falls back to its defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct OdoExecParams {
    pub geometry: dead_reckoning::WheelGeometry,

    #[serde(default)]
    pub dead_reckoning: dead_reckoning::Params,

    #[serde(default)]
    pub line_correction: line_correction::Params,

    #[serde(default)]
    pub exec: ExecParams,

    #[serde(default)]
    pub sim: SimParams,
}

/// Parameters of the controller loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecParams {
    /// Period at which the pose is polled and archived.
    ///
    /// Units: milliseconds
    pub poll_period_ms: u64,

    /// Log level used when none is given on the command line.
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ExecParams {
    fn default() -> Self {
        Self {
            poll_period_ms: 100,
            log_level: "info".into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let params: OdoExecParams = util::params::from_str(
            r#"
            [geometry]
            track_cm = 12.5
            wheel_radius_cm = 2.0

            [line_correction]
            latch_crossings = true

            [[sim.legs]]
            left_dps = 90.0
            right_dps = 90.0
            duration_s = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(params.geometry.track_cm, 12.5);
        assert_eq!(params.dead_reckoning.period_ms, 25);
        assert_eq!(params.line_correction.period_ms, 10);
        assert_eq!(params.line_correction.tile_cm, 30.48);
        assert!(params.line_correction.latch_crossings);
        assert_eq!(params.exec.poll_period_ms, 100);
        assert_eq!(params.sim.legs.len(), 1);
        assert_eq!(params.sim.radius_scale, 1.0);
    }

    #[test]
    fn test_geometry_is_required() {
        assert!(util::params::from_str::<OdoExecParams>("[exec]\npoll_period_ms = 50\n").is_err());
    }
}
