//! gator - command-line RSS feed aggregator
//!
//! Users follow feeds; `agg` fetches them round-robin in the background and
//! stores new posts, which `browse` shows newest first.

pub mod commands;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod feed;
pub mod logging;

pub use commands::{builtin_registry, Command, CommandRegistry, LoggedIn, State};
pub use config::Config;
pub use db::{Database, User, UserRepository};
pub use error::{GatorError, Result};
pub use feed::{FeedFetcher, FetchFeed, FetchScheduler, IngestPolicy, IngestionPipeline};
