//! Fetch scheduler for gator.
//!
//! Processes one feed per tick, always the one fetched longest ago (never
//! fetched feeds first), so every feed is visited in turn.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::feed::fetcher::FetchFeed;
use crate::feed::ingest::{IngestReport, IngestionPipeline};
use crate::feed::repository::FeedRepository;
use crate::feed::types::{Feed, IngestPolicy};
use crate::{GatorError, Result};

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// There are no feeds to fetch.
    NoFeeds,
    /// `feed` was fetched and its document ingested.
    Ingested { feed: Feed, report: IngestReport },
}

/// Round-robin feed scheduler.
pub struct FetchScheduler<F> {
    db: Database,
    fetcher: F,
    policy: IngestPolicy,
    interval: Duration,
}

impl<F: FetchFeed> FetchScheduler<F> {
    /// Create a scheduler ticking every `interval`.
    pub fn new(db: Database, fetcher: F, policy: IngestPolicy, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(GatorError::Validation(
                "fetch interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            db,
            fetcher,
            policy,
            interval,
        })
    }

    /// The configured tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one cycle: select, stamp, fetch, ingest.
    ///
    /// The feed is stamped before the network call, so it moves to the back
    /// of the queue even when the fetch fails.
    pub async fn tick(&self) -> Result<TickOutcome> {
        let feeds = FeedRepository::new(self.db.pool());

        let Some(feed) = feeds.next_to_fetch().await? else {
            debug!("No feeds to fetch");
            return Ok(TickOutcome::NoFeeds);
        };

        if !feeds.mark_fetched(&feed.id, Utc::now()).await? {
            debug!("Feed {} vanished before it could be stamped", feed.id);
        }

        info!("Fetching feed {} ({})", feed.name, feed.url);
        let document = self.fetcher.fetch(&feed.url).await?;

        let report = IngestionPipeline::new(&self.db, self.policy)
            .ingest(&feed, &document)
            .await?;

        info!(
            "Feed {}: {} new post(s), {} already stored",
            feed.name, report.created, report.duplicates
        );

        Ok(TickOutcome::Ingested { feed, report })
    }

    /// Tick on a fixed-rate timer until `shutdown` completes.
    ///
    /// The first tick fires immediately. A cycle that overruns the interval
    /// is followed by one immediate tick; missed ticks are not replayed.
    /// Errors are logged and never stop the loop.
    pub async fn run_until<S>(&self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        info!(
            "Collecting feeds every {}",
            humantime::format_duration(self.interval)
        );

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Feed collection stopped");
                    break;
                }
                _ = timer.tick() => {}
            }

            if let Err(e) = self.tick().await {
                warn!("Feed collection tick failed: {}", e);
            }
        }
    }
}
