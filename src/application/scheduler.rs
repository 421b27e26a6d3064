//! Wall-clock aligned refresh scheduling
//!
//! Scheduled cycles fire on local wall-clock boundaries (every ten minutes by
//! default: :00, :10, :20 ...). The delay to the next boundary is recomputed
//! from the clock after every firing, so a late or missed cycle never shifts
//! the ones after it.

use crate::application::pipeline::{RefreshPipeline, RefreshTrigger};
use chrono::{DateTime, Local, TimeZone, Timelike};
use nutype::nutype;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Wake-up tolerance; a firing this close to a boundary counts as that boundary
pub const SCHEDULE_SLACK: Duration = Duration::from_secs(1);

/// Minutes between scheduled refreshes
///
/// Must divide a day evenly so every boundary lands on the same wall-clock
/// minutes each hour.
#[nutype(
    validate(predicate = |minutes: &u32| *minutes > 0 && 1440 % *minutes == 0),
    default = 10,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Default,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct RefreshInterval(u32);

impl RefreshInterval {
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.into_inner()) * 60)
    }
}

/// Time from `now` until the next interval boundary strictly after it
///
/// Boundaries are measured from local midnight in `now`'s time zone. An
/// instant exactly on a boundary waits a full interval.
pub fn delay_until_next_boundary<Tz: TimeZone>(
    now: &DateTime<Tz>,
    interval: RefreshInterval,
) -> Duration {
    let local = now.naive_local();
    let period_secs = u64::from(interval.into_inner()) * 60;
    let secs_into_period = u64::from(local.num_seconds_from_midnight()) % period_secs;
    let nanos = u64::from(local.nanosecond().min(999_999_999));

    let elapsed = Duration::from_secs(secs_into_period) + Duration::from_nanos(nanos);
    Duration::from_secs(period_secs) - elapsed
}

/// Delay the scheduler sleeps before its next cycle
///
/// A timer that wakes a hair before its boundary would otherwise schedule
/// that same boundary again.
pub fn scheduled_delay<Tz: TimeZone>(now: &DateTime<Tz>, interval: RefreshInterval) -> Duration {
    let slack = chrono::Duration::from_std(SCHEDULE_SLACK).unwrap_or_default();
    SCHEDULE_SLACK + delay_until_next_boundary(&(now.clone() + slack), interval)
}

struct ScheduledTask {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Background task running the startup cycle and then aligned refreshes
pub struct RefreshScheduler {
    pipeline: Arc<RefreshPipeline>,
    interval: RefreshInterval,
    task: Option<ScheduledTask>,
}

impl RefreshScheduler {
    pub fn new(pipeline: Arc<RefreshPipeline>, interval: RefreshInterval) -> Self {
        Self {
            pipeline,
            interval,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Spawn the schedule; returns `false` if it is already running
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let pipeline = Arc::clone(&self.pipeline);
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            run_schedule(pipeline, interval, shutdown_rx).await;
        });

        self.task = Some(ScheduledTask {
            shutdown_tx,
            handle,
        });
        true
    }

    /// Cancel the pending wait and wait for the task to exit
    ///
    /// A cycle already fetching finishes first; close the board beforehand
    /// to have its result discarded.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        // The task may already be gone; either way there is nothing to signal
        let _ = task.shutdown_tx.try_send(());
        if let Err(e) = task.handle.await {
            if !e.is_cancelled() {
                warn!("Refresh scheduler task failed: {e}");
            }
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.handle.abort();
        }
    }
}

async fn run_schedule(
    pipeline: Arc<RefreshPipeline>,
    interval: RefreshInterval,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    info!(%interval, "Refresh scheduler started");
    // Failures are recorded on the board by the pipeline itself
    let _ = pipeline.run(RefreshTrigger::Startup).await;

    loop {
        let delay = scheduled_delay(&Local::now(), interval);
        debug!(delay_ms = delay.as_millis() as u64, "Waiting for next refresh boundary");

        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(delay) => {
                let _ = pipeline.run(RefreshTrigger::Scheduled).await;
            }
        }
    }

    info!("Refresh scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use rstest::rstest;

    fn at(hour: u32, minute: u32, second: u32, millis: u32) -> DateTime<FixedOffset> {
        let naive = NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_milli_opt(hour, minute, second, millis)
            .unwrap();
        FixedOffset::east_opt(0)
            .unwrap()
            .from_local_datetime(&naive)
            .unwrap()
    }

    fn ten() -> RefreshInterval {
        RefreshInterval::default()
    }

    #[test]
    fn test_interval_must_divide_a_day() {
        assert!(RefreshInterval::try_new(10).is_ok());
        assert!(RefreshInterval::try_new(15).is_ok());
        assert!(RefreshInterval::try_new(1440).is_ok());
        assert!(RefreshInterval::try_new(0).is_err());
        assert!(RefreshInterval::try_new(7).is_err());
        assert!(RefreshInterval::try_new(2880).is_err());
        assert_eq!(ten().into_inner(), 10);
        assert_eq!(ten().as_duration(), Duration::from_secs(600));
    }

    #[rstest]
    #[case::mid_period(at(12, 3, 0, 0), Duration::from_secs(7 * 60))]
    #[case::on_boundary(at(12, 10, 0, 0), Duration::from_secs(10 * 60))]
    #[case::just_before(at(12, 9, 59, 500), Duration::from_millis(500))]
    #[case::before_midnight(at(23, 55, 30, 0), Duration::from_secs(4 * 60 + 30))]
    fn test_delay_until_next_boundary(#[case] now: DateTime<FixedOffset>, #[case] expected: Duration) {
        assert_eq!(delay_until_next_boundary(&now, ten()), expected);
    }

    #[test]
    fn test_boundaries_follow_local_wall_clock() {
        // 12:03 in a +05:45 zone is 06:18 UTC; the local boundary is 12:10
        let kathmandu = FixedOffset::east_opt(5 * 3600 + 45 * 60).unwrap();
        let now = kathmandu.with_ymd_and_hms(2024, 5, 15, 12, 3, 0).unwrap();
        assert_eq!(
            delay_until_next_boundary(&now, ten()),
            Duration::from_secs(7 * 60)
        );
    }

    #[test]
    fn test_scheduled_delay_lands_on_boundary() {
        assert_eq!(
            scheduled_delay(&at(12, 3, 0, 0), ten()),
            Duration::from_secs(7 * 60)
        );
    }

    #[test]
    fn test_early_wakeup_does_not_repeat_boundary() {
        // Woke 0.5s before 12:10 for the 12:10 run; the next one is 12:20
        let delay = scheduled_delay(&at(12, 9, 59, 500), ten());
        assert_eq!(delay, Duration::from_millis(10 * 60 * 1000 + 500));
    }

    #[test]
    fn test_late_wakeup_realigns() {
        // Woke 4s late for 12:10; the next run is still 12:20
        let delay = scheduled_delay(&at(12, 10, 4, 0), ten());
        assert_eq!(delay, Duration::from_secs(10 * 60 - 4));
    }
}
