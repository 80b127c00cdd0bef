//! Feed aggregation for gator.
//!
//! Fetching, ingestion and scheduling of subscribed feeds, plus the storage
//! for feeds, follows and posts.

pub mod fetcher;
pub mod ingest;
pub mod repository;
pub mod scheduler;
pub mod types;

pub use fetcher::{decode_entities, parse_document, validate_url, FeedFetcher, FetchFeed};
pub use ingest::{derive_posts, IngestReport, IngestionPipeline};
pub use repository::{FeedFollowRepository, FeedRepository, PostRepository};
pub use scheduler::{FetchScheduler, TickOutcome};
pub use types::{
    Feed, FeedDocument, FeedEntry, FeedFollow, FeedWithOwner, IngestPolicy, NewPost, Post,
};
