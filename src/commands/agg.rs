//! `agg <interval>`: run the fetch scheduler until Ctrl-C.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{Command, CommandHandler, State};
use crate::feed::{FeedFetcher, FetchScheduler};
use crate::{GatorError, Result};

const USAGE: &str = "agg <interval, e.g. 30s or 1m>";

/// `agg <interval>`
pub struct AggCommand;

#[async_trait]
impl CommandHandler for AggCommand {
    async fn run(&self, state: &mut State, cmd: &Command) -> Result<()> {
        let interval = parse_interval(cmd.arg(0, USAGE)?)?;

        let fetcher = FeedFetcher::new(&state.config.fetcher)?;
        let scheduler = FetchScheduler::new(
            state.db.clone(),
            fetcher,
            state.config.ingest.policy,
            interval,
        )?;

        state.say(format!(
            "Collecting feeds every {}",
            humantime::format_duration(interval)
        ));
        scheduler
            .run_until(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
            })
            .await;
        Ok(())
    }
}

/// Parse a human readable, non-zero interval such as `30s` or `1m`.
pub(crate) fn parse_interval(raw: &str) -> Result<Duration> {
    let interval = humantime::parse_duration(raw.trim())
        .map_err(|e| GatorError::Usage(format!("usage: {} ({})", USAGE, e)))?;
    if interval.is_zero() {
        return Err(GatorError::Usage(format!(
            "usage: {} (interval must be greater than zero)",
            USAGE
        )));
    }
    Ok(interval)
}
