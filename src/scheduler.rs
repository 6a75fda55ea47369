//! Periodic job runner with an explicit stop.
//!
//! The job runs once immediately, then on a fixed grid anchored at a start
//! time. Runs never overlap: grid points a run overshoots are skipped.

use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const DEFAULT_START_HOUR: u32 = 8;

#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> AppResult<()>;
}

pub struct Scheduler {
    job: Arc<dyn Job>,
    anchor: NaiveDateTime,
    interval: Duration,
    cancel: CancellationToken,
}

impl Scheduler {
    /// `start_at` anchors the grid; `None` means the next 08:00 local time.
    pub fn new(job: Arc<dyn Job>, start_at: Option<NaiveDateTime>, interval: Duration) -> Self {
        let anchor = start_at.unwrap_or_else(|| default_anchor(Local::now().naive_local()));
        Self {
            job,
            anchor,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancelling this token stops the loop after the current run.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(self) {
        if self.cancel.is_cancelled() {
            return;
        }
        log::info!(
            "Scheduler started for '{}' (every {:.1} hours from {})",
            self.job.name(),
            self.interval.as_secs_f64() / 3600.0,
            self.anchor.format("%Y-%m-%d %H:%M")
        );

        self.tick().await;

        let now = Local::now().naive_local();
        let first = next_run(now, self.anchor, self.interval);
        let wait = (first - now).to_std().unwrap_or(Duration::ZERO);
        log::info!(
            "Next run scheduled for {} (in {:.1} hours)",
            first.format("%Y-%m-%d %H:%M"),
            wait.as_secs_f64() / 3600.0
        );
        let mut deadline = Instant::now() + wait;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    log::info!("Scheduler stopped");
                    break;
                }
                _ = tokio::time::sleep_until(deadline) => {}
            }

            self.tick().await;
            deadline = next_deadline(deadline, Instant::now(), self.interval);
        }
    }

    async fn tick(&self) {
        let name = self.job.name();
        log::info!("Running job '{}'", name);
        match self.job.run().await {
            Ok(()) => log::info!("Job '{}' completed", name),
            Err(e) => log::error!("Job '{}' failed: {}", name, e),
        }
    }
}

/// First point on the `anchor + k * interval` grid strictly after `now`,
/// or `anchor` itself if it is still ahead.
pub fn next_run(now: NaiveDateTime, anchor: NaiveDateTime, interval: Duration) -> NaiveDateTime {
    if now < anchor {
        return anchor;
    }
    let step = interval.as_secs().max(1) as i64;
    let elapsed = (now - anchor).num_seconds();
    let periods = elapsed / step + 1;
    anchor + chrono::Duration::seconds(periods * step)
}

/// Next grid point after `previous`, measured from the scheduled time
/// rather than from when the run finished. Points a long run overshot are
/// skipped.
pub fn next_deadline(previous: Instant, now: Instant, interval: Duration) -> Instant {
    let step = interval.max(Duration::from_secs(1));
    let mut next = previous + step;
    while next <= now {
        next += step;
    }
    next
}

/// Today at 08:00 if that is still ahead, otherwise tomorrow at 08:00.
pub fn default_anchor(now: NaiveDateTime) -> NaiveDateTime {
    let start = NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(start);
    if now < today {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}
