//! Post ingestion.
//!
//! Turns the entries of a fetched document into posts. Storage enforces
//! (feed, url) uniqueness; a conflicting insert means the post was already
//! ingested and counts as a success.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::datetime::parse_pub_date;
use crate::db::Database;
use crate::feed::repository::PostRepository;
use crate::feed::types::{Feed, FeedDocument, FeedEntry, IngestPolicy, NewPost};
use crate::Result;

/// What one ingestion did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Posts newly stored.
    pub created: usize,
    /// Entries that were already stored.
    pub duplicates: usize,
}

impl IngestReport {
    /// Whether nothing was considered (document without entries).
    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.duplicates == 0
    }
}

/// Ingestion pipeline for one feed document at a time.
pub struct IngestionPipeline<'a> {
    db: &'a Database,
    policy: IngestPolicy,
}

impl<'a> IngestionPipeline<'a> {
    /// Create a pipeline writing to `db`.
    pub fn new(db: &'a Database, policy: IngestPolicy) -> Self {
        Self { db, policy }
    }

    /// Store the posts derived from `document` for `feed`.
    ///
    /// Duplicates are counted, not reported. Any other storage failure stops
    /// the ingestion and is returned.
    pub async fn ingest(&self, feed: &Feed, document: &FeedDocument) -> Result<IngestReport> {
        let fetched_at = Utc::now();
        let posts = derive_posts(feed, document, self.policy, fetched_at);
        let repo = PostRepository::new(self.db.pool());

        let mut report = IngestReport::default();
        for post in posts {
            match repo.create(&post).await {
                Ok(created) => {
                    debug!("Stored post {} for feed {}", created.url, feed.url);
                    report.created += 1;
                }
                Err(e) if e.is_conflict() => {
                    debug!("Post {} already ingested for feed {}", post.url, feed.url);
                    report.duplicates += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }
}

/// Build the posts to store for `document` under `policy`.
///
/// `fetched_at` stands in for publication dates that do not parse.
pub fn derive_posts(
    feed: &Feed,
    document: &FeedDocument,
    policy: IngestPolicy,
    fetched_at: DateTime<Utc>,
) -> Vec<NewPost> {
    match policy {
        IngestPolicy::First => document
            .entries
            .first()
            .map(|entry| NewPost {
                feed_id: feed.id.clone(),
                title: document.title.clone(),
                url: feed.url.clone(),
                description: document.description.clone(),
                published_at: published_at(feed, entry, fetched_at),
            })
            .into_iter()
            .collect(),
        IngestPolicy::All => document
            .entries
            .iter()
            .map(|entry| NewPost {
                feed_id: feed.id.clone(),
                title: entry.title.clone(),
                url: if entry.link.is_empty() {
                    feed.url.clone()
                } else {
                    entry.link.clone()
                },
                description: entry.description.clone(),
                published_at: published_at(feed, entry, fetched_at),
            })
            .collect(),
    }
}

fn published_at(feed: &Feed, entry: &FeedEntry, fetched_at: DateTime<Utc>) -> DateTime<Utc> {
    match parse_pub_date(&entry.pub_date) {
        Ok(dt) => dt,
        Err(e) => {
            warn!("Feed {}: {}; using fetch time", feed.url, e);
            fetched_at
        }
    }
}
