//! Feed types for gator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which entries of a fetched document are turned into posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestPolicy {
    /// Only the first entry; the post carries the channel title and
    /// description and the feed URL.
    #[default]
    First,
    /// Every entry becomes a post keyed by its own link.
    All,
}

/// A subscribed feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Feed ID (UUID).
    pub id: String,
    /// Display name given when the feed was added.
    pub name: String,
    /// Feed URL (globally unique).
    pub url: String,
    /// ID of the user who added the feed.
    pub user_id: String,
    /// When the feed was created.
    pub created_at: DateTime<Utc>,
    /// When the feed was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last time the scheduler picked the feed; `None` if never.
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// Feed together with the name of the user who added it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedWithOwner {
    /// Feed name.
    pub name: String,
    /// Feed URL.
    pub url: String,
    /// Owner's user name.
    pub owner_name: String,
}

/// A user's follow of a feed, with names resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFollow {
    /// Follow ID (UUID).
    pub id: String,
    /// Follower's user ID.
    pub user_id: String,
    /// Followed feed ID.
    pub feed_id: String,
    /// Follower's user name.
    pub user_name: String,
    /// Followed feed name.
    pub feed_name: String,
    /// When the follow was created.
    pub created_at: DateTime<Utc>,
}

/// A stored post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Post ID (UUID).
    pub id: String,
    /// Feed ID this post belongs to.
    pub feed_id: String,
    /// Post title.
    pub title: String,
    /// Canonical URL; unique per feed.
    pub url: String,
    /// Post description.
    pub description: String,
    /// When the post was published.
    pub published_at: DateTime<Utc>,
    /// When the post was ingested.
    pub created_at: DateTime<Utc>,
}

/// New post for creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Feed ID.
    pub feed_id: String,
    /// Post title.
    pub title: String,
    /// Canonical URL.
    pub url: String,
    /// Post description.
    pub description: String,
    /// When the post was published.
    pub published_at: DateTime<Utc>,
}

/// A fetched and decoded syndication document.
///
/// Lives only between a fetch and the ingestion of its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    /// Channel title.
    pub title: String,
    /// Channel link.
    pub link: String,
    /// Channel description.
    pub description: String,
    /// Entries in document order.
    pub entries: Vec<FeedEntry>,
}

/// One entry of a [`FeedDocument`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry title.
    pub title: String,
    /// Entry link.
    pub link: String,
    /// Entry description.
    pub description: String,
    /// Publication date exactly as found in the document.
    pub pub_date: String,
}
