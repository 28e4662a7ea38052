//! Main odometry executable entry point.
//!
//! # Architecture
//!
//! The executable drives a simulated vehicle through a scripted set of legs while the two
//! odometry tasks run in the background:
//!
//!     - Initialise the session, parameters and logging
//!     - Create the odometer
//!     - Start the tasks:
//!         - Dead reckoning, integrating the wheel encoders into the pose
//!         - Line correction, correcting the pose on floor line crossings
//!     - Main loop, until the drive script ends:
//!         - Command the wheel rates of the current leg
//!         - Poll the pose estimate and archive it alongside the true pose
//!     - Stop both tasks and write the run summary

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use serde::Serialize;
use std::{path::Path, thread, time::Instant};
use structopt::StructOpt;

// Internal
use odo_lib::{
    dead_reckoning::{self, task::Integrator, DeadReckoning},
    line_correction::{self, task::Corrector, LineCorrector},
    odometer,
    params::OdoExecParams,
    periodic::TaskReport,
    pose_store::Pose,
    sim::{ClockMode, Sim},
};
use util::{
    archive::Archiver,
    logger::{logger_init, parse_level},
    params::LoadError,
    session::{self, Session},
    time::period_from_millis,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line arguments.
#[derive(Debug, StructOpt)]
#[structopt(name = "odo_exec", about = "Encoder odometry with floor line correction")]
struct Args {
    /// Parameter file, relative to `$ODO_SW_ROOT/params` unless absolute
    #[structopt(long, default_value = "odo_exec.toml")]
    params: String,

    /// Minimum log level, overriding the one in the parameter file
    #[structopt(long)]
    log_level: Option<String>,
}

/// One row of the pose trace archive.
#[derive(Serialize)]
struct TraceRecord {
    time_s: f64,
    leg: usize,
    est_x_cm: f64,
    est_y_cm: f64,
    est_heading_deg: f64,
    true_x_cm: f64,
    true_y_cm: f64,
    true_heading_deg: f64,
}

/// Summary of a run, saved at the end of the session.
#[derive(Serialize)]
struct RunSummary {
    final_estimate: Pose,
    final_truth: Pose,
    num_beeps: u64,
    dead_reckoning: TaskReport,
    line_correction: TaskReport,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("odo_exec", "sessions").wrap_err("Failed to create the session")?;

    // Parameters are loaded before the logger as they hold the default log level
    let params = load_params(&args.params)
        .wrap_err_with(|| format!("Could not load parameters from {}", args.params))?;

    // Initialise logger
    let level_str = args
        .log_level
        .clone()
        .unwrap_or_else(|| params.exec.log_level.clone());
    let level = parse_level(&level_str).wrap_err("Invalid log level")?;
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    info!("Odometry Executable\n");
    info!("Session directory: {:?}", session.session_root);
    info!("Parameters loaded from {}\n", args.params);

    // ---- INITIALISE ODOMETER AND EQUIPMENT ----

    let odometer =
        odometer::init(params.geometry).wrap_err("Failed to initialise the odometer")?;

    let sim = Sim::new(params.geometry, params.sim.clone(), ClockMode::WallClock)
        .wrap_err("Failed to create the simulation")?;

    // ---- START TASKS ----

    let integrator = Integrator::new(
        sim.encoders(),
        DeadReckoning::new(params.geometry).wrap_err("Failed to initialise DeadReckoning")?,
        odometer.store(),
    );
    let corrector = Corrector::new(
        sim.floor_sensor(),
        sim.annunciator(),
        LineCorrector::new(params.line_correction.clone())
            .wrap_err("Failed to initialise LineCorrection")?,
        odometer.store(),
    );

    let dr_task = dead_reckoning::task::spawn(integrator, &params.dead_reckoning)
        .wrap_err("Failed to start the dead reckoning task")?;
    let lc_task = line_correction::task::spawn(corrector, &params.line_correction)
        .wrap_err("Failed to start the line correction task")?;

    // ---- MAIN LOOP ----

    let mut trace =
        Archiver::from_path(&session, "pose_trace.csv").wrap_err("Failed to create pose trace")?;
    let poll_period = period_from_millis(params.exec.poll_period_ms);

    info!(
        "Driving {} legs over {:.02} s",
        params.sim.legs.len(),
        params.sim.script_duration_s()
    );

    let script_start = Instant::now();
    let mut current_leg = None;

    loop {
        let cycle_start = Instant::now();

        // ---- DRIVE SCRIPT ----

        let leg_idx = match params.sim.leg_at(script_start.elapsed().as_secs_f64()) {
            Some((i, leg)) => {
                if current_leg != Some(i) {
                    info!(
                        "Leg {}: left {:.01} deg/s, right {:.01} deg/s for {:.02} s",
                        i, leg.left_dps, leg.right_dps, leg.duration_s
                    );
                    sim.set_wheel_rates(leg.left_dps, leg.right_dps);
                    current_leg = Some(i);
                }
                i
            }
            None => break,
        };

        // ---- POSE POLLING ----

        let est = odometer.store().get_pose();
        let truth = sim.true_pose();

        trace
            .serialise(TraceRecord {
                time_s: session::get_elapsed_seconds(),
                leg: leg_idx,
                est_x_cm: est.x_cm,
                est_y_cm: est.y_cm,
                est_heading_deg: est.heading_deg,
                true_x_cm: truth.x_cm,
                true_y_cm: truth.y_cm,
                true_heading_deg: truth.heading_deg,
            })
            .wrap_err("Failed to archive the pose")?;

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = cycle_start.elapsed();

        match poll_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - poll_period.as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    sim.set_wheel_rates(0.0, 0.0);

    let dr_report = dr_task
        .stop()
        .wrap_err("The dead reckoning task did not stop cleanly")?;
    let lc_report = lc_task
        .stop()
        .wrap_err("The line correction task did not stop cleanly")?;

    let summary = RunSummary {
        final_estimate: odometer.store().get_pose(),
        final_truth: sim.true_pose(),
        num_beeps: sim.num_beeps(),
        dead_reckoning: dr_report,
        line_correction: lc_report,
    };

    info!("Final estimate: {:?}", summary.final_estimate);
    info!("Final truth:    {:?}", summary.final_truth);
    info!(
        "Final error: x {:.02} cm, y {:.02} cm",
        summary.final_estimate.x_cm - summary.final_truth.x_cm,
        summary.final_estimate.y_cm - summary.final_truth.y_cm
    );

    session
        .save_json("summary.json", &summary)
        .wrap_err("Failed to save the run summary")?;

    info!("End of execution");

    Ok(())
}

/// Load the executable parameters from a file in the params directory, or from an absolute path.
fn load_params(path: &str) -> Result<OdoExecParams, LoadError> {
    if Path::new(path).is_absolute() {
        util::params::load_from_path(path)
    } else {
        util::params::load(path)
    }
}
