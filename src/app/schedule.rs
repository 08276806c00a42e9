//! Cooperative poll loop: sleep, check the wall clock, run one blocking
//! reporting cycle when the configured time of day has passed. A failed
//! cycle is logged and the loop keeps going; the next tick matters more
//! than surfacing today's failure loudly.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{error, info};

use super::{run_cycle, ReportContext};
use crate::clock::Clock;

/// Due once per day, the first tick at or after the configured time.
fn cycle_is_due(now: NaiveDateTime, at: NaiveTime, last_run: Option<NaiveDate>) -> bool {
    now.time() >= at && last_run != Some(now.date())
}

/// Starting past today's scheduled time counts as already run; the first
/// cycle fires at the next day's occurrence, not immediately.
fn initial_last_run(start: NaiveDateTime, at: NaiveTime) -> Option<NaiveDate> {
    (start.time() >= at).then(|| start.date())
}

pub async fn run_scheduled(ctx: &ReportContext<'_>, clock: &dyn Clock) -> Result<()> {
    info!(at = %ctx.config.schedule_at, "scheduler started");
    let mut last_run = initial_last_run(clock.now(), ctx.config.schedule_at);

    loop {
        let now = clock.now();
        if cycle_is_due(now, ctx.config.schedule_at, last_run) {
            last_run = Some(now.date());
            match run_cycle(ctx).await {
                Ok(outcome) => {
                    info!(rows = outcome.rows_appended, "scheduled cycle completed")
                }
                Err(err) => error!(error = %format!("{err:#}"), "scheduled cycle failed"),
            }
        }
        tokio::time::sleep(ctx.config.poll_interval).await;
    }
}
