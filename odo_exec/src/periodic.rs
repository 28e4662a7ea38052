//! # Periodic Tasks
//!
//! Runs a tick function on a dedicated thread at a fixed period. The period is measured from the
//! start of one tick to the start of the next: the thread sleeps for whatever is left of the
//! period once the tick completes, or starts the next tick straight away if the period was
//! overrun. Overruns are not compensated for.
//!
//! A task runs until [`PeriodicTask::stop`] is called (or the task is dropped). The stop flag is
//! checked before each tick, and stopping joins the thread, so a tick which is in progress always
//! completes before the task is torn down.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{info, warn};
use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to a running periodic task.
pub struct PeriodicTask {
    name: String,
    run: Arc<AtomicBool>,
    jh: Option<JoinHandle<TaskReport>>,
}

/// Statistics gathered over the lifetime of a periodic task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    /// Number of ticks executed, including failed ones.
    pub num_ticks: u64,

    /// Number of ticks which returned an error.
    pub num_failed_ticks: u64,

    /// Number of ticks which took longer than the period.
    pub num_overruns: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Could not spawn the task thread: {0}")]
    SpawnFailed(std::io::Error),

    #[error("The {0} task panicked")]
    Panicked(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PeriodicTask {
    /// Spawn a new task which calls `tick` once every `period`.
    ///
    /// Errors returned by `tick` are logged and counted, and the next tick proceeds as normal.
    pub fn spawn<F, E>(name: &str, period: Duration, tick: F) -> Result<Self, TaskError>
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
        E: Display,
    {
        let run = Arc::new(AtomicBool::new(true));

        let run_clone = run.clone();
        let thread_name = name.to_string();
        let jh = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || task_thread(&thread_name, period, &run_clone, tick))
            .map_err(TaskError::SpawnFailed)?;

        info!("Started {} task with period {:?}", name, period);

        Ok(Self {
            name: name.to_string(),
            run,
            jh: Some(jh),
        })
    }

    /// Name of the task, also used as the thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` until the task has been asked to stop.
    pub fn is_running(&self) -> bool {
        self.run.load(Ordering::Relaxed)
    }

    /// Stop the task, waiting for the current tick to complete.
    pub fn stop(mut self) -> Result<TaskReport, TaskError> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Result<TaskReport, TaskError> {
        self.run.store(false, Ordering::Relaxed);

        match self.jh.take() {
            Some(jh) => {
                let report = jh
                    .join()
                    .map_err(|_| TaskError::Panicked(self.name.clone()))?;
                info!("Stopped {} task: {:?}", self.name, report);
                Ok(report)
            }
            None => Ok(TaskReport::default()),
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Err(e) = self.stop_and_join() {
            warn!("{}", e);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn task_thread<F, E>(name: &str, period: Duration, run: &AtomicBool, mut tick: F) -> TaskReport
where
    F: FnMut() -> Result<(), E>,
    E: Display,
{
    let mut report = TaskReport::default();

    while run.load(Ordering::Relaxed) {
        // Get tick start time
        let tick_start_instant = Instant::now();

        if let Err(e) = tick() {
            warn!("{} tick failed: {}", name, e);
            report.num_failed_ticks += 1;
        }
        report.num_ticks += 1;

        let tick_dur = tick_start_instant.elapsed();

        // Get sleep duration
        match period.checked_sub(tick_dur) {
            Some(d) => thread::sleep(d),
            None => {
                warn!(
                    "{} tick overran by {:.06} s",
                    name,
                    tick_dur.as_secs_f64() - period.as_secs_f64()
                );
                report.num_overruns += 1;
            }
        }
    }

    report
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_ticks_until_stopped() {
        let count = Arc::new(AtomicU64::new(0));

        let c = count.clone();
        let task = PeriodicTask::spawn("counter", Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        })
        .unwrap();

        assert_eq!(task.name(), "counter");
        assert!(task.is_running());

        thread::sleep(Duration::from_millis(200));
        let report = task.stop().unwrap();

        // Stopping joins the thread so the count no longer changes
        let final_count = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), final_count);

        assert_eq!(report.num_ticks, final_count);
        assert_eq!(report.num_failed_ticks, 0);
        assert!(final_count >= 5, "only {} ticks in 200 ms", final_count);
        assert!(final_count <= 25, "{} ticks in 200 ms", final_count);
    }

    #[test]
    fn test_failed_ticks_are_counted() {
        let mut n = 0u32;
        let task = PeriodicTask::spawn("flaky", Duration::from_millis(5), move || {
            n += 1;
            if n % 2 == 0 {
                Err(format!("tick {} failed", n))
            } else {
                Ok(())
            }
        })
        .unwrap();

        thread::sleep(Duration::from_millis(100));
        let report = task.stop().unwrap();

        assert!(report.num_ticks >= 2);
        assert_eq!(report.num_failed_ticks, report.num_ticks / 2);
    }

    #[test]
    fn test_overruns_are_counted() {
        let task = PeriodicTask::spawn("slow", Duration::from_millis(2), || {
            thread::sleep(Duration::from_millis(10));
            Ok::<(), String>(())
        })
        .unwrap();

        thread::sleep(Duration::from_millis(100));
        let report = task.stop().unwrap();

        assert!(report.num_ticks >= 1);
        assert_eq!(report.num_overruns, report.num_ticks);
    }

    #[test]
    fn test_drop_stops_task() {
        let count = Arc::new(AtomicU64::new(0));

        let c = count.clone();
        let task = PeriodicTask::spawn("dropped", Duration::from_millis(5), move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        })
        .unwrap();

        thread::sleep(Duration::from_millis(20));
        drop(task);

        let final_count = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), final_count);
    }

    #[test]
    fn test_panicking_task_is_reported() {
        let task = PeriodicTask::spawn("panics", Duration::from_millis(5), || {
            if true {
                panic!("tick panicked");
            }
            Ok::<(), String>(())
        })
        .unwrap();

        thread::sleep(Duration::from_millis(20));
        assert!(matches!(task.stop(), Err(TaskError::Panicked(_))));
    }
}
