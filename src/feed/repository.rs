//! Feed, follow and post repositories for gator.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{Feed, FeedFollow, FeedWithOwner, NewPost, Post};
use crate::datetime::{parse_db_datetime, to_db_string};
use crate::db::DbPool;
use crate::{GatorError, Result};

/// Row type for feeds from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: String,
    name: String,
    url: String,
    user_id: String,
    created_at: String,
    updated_at: String,
    last_fetched_at: Option<String>,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            user_id: row.user_id,
            created_at: parse_db_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_db_datetime(&row.updated_at).unwrap_or_else(Utc::now),
            last_fetched_at: row.last_fetched_at.and_then(|s| parse_db_datetime(&s)),
        }
    }
}

/// Row type for feeds joined with their owner.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedWithOwnerRow {
    name: String,
    url: String,
    owner_name: String,
}

impl From<FeedWithOwnerRow> for FeedWithOwner {
    fn from(row: FeedWithOwnerRow) -> Self {
        FeedWithOwner {
            name: row.name,
            url: row.url,
            owner_name: row.owner_name,
        }
    }
}

/// Row type for feed follows joined with user and feed names.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedFollowRow {
    id: String,
    user_id: String,
    feed_id: String,
    user_name: String,
    feed_name: String,
    created_at: String,
}

impl From<FeedFollowRow> for FeedFollow {
    fn from(row: FeedFollowRow) -> Self {
        FeedFollow {
            id: row.id,
            user_id: row.user_id,
            feed_id: row.feed_id,
            user_name: row.user_name,
            feed_name: row.feed_name,
            created_at: parse_db_datetime(&row.created_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Row type for posts from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: String,
    feed_id: String,
    title: String,
    url: String,
    description: String,
    published_at: String,
    created_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            feed_id: row.feed_id,
            title: row.title,
            url: row.url,
            description: row.description,
            published_at: parse_db_datetime(&row.published_at).unwrap_or_else(Utc::now),
            created_at: parse_db_datetime(&row.created_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for feed operations.
pub struct FeedRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new feed owned by `user_id`.
    ///
    /// A URL that is already registered is reported as `GatorError::Conflict`.
    pub async fn create(&self, name: &str, url: &str, user_id: &str) -> Result<Feed> {
        let id = Uuid::new_v4().to_string();
        let now = to_db_string(&Utc::now());

        sqlx::query(
            r#"
            INSERT INTO feeds (id, name, url, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(url)
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .map_err(|e| GatorError::from_insert(e, "feed"))?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| GatorError::NotFound("feed".to_string()))
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT id, name, url, user_id, created_at, updated_at, last_fetched_at
            FROM feeds
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(row.map(Feed::from))
    }

    /// Get a feed by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT id, name, url, user_id, created_at, updated_at, last_fetched_at
            FROM feeds
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(row.map(Feed::from))
    }

    /// List all feeds with the names of their owners (registration order).
    pub async fn list_with_owners(&self) -> Result<Vec<FeedWithOwner>> {
        let rows = sqlx::query_as::<_, FeedWithOwnerRow>(
            r#"
            SELECT f.name, f.url, u.name AS owner_name
            FROM feeds f
            JOIN users u ON u.id = f.user_id
            ORDER BY f.created_at ASC, f.id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(FeedWithOwner::from).collect())
    }

    /// Select the feed that was fetched least recently.
    ///
    /// Feeds that were never fetched come first; ties go to the older feed.
    pub async fn next_to_fetch(&self) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT id, name, url, user_id, created_at, updated_at, last_fetched_at
            FROM feeds
            ORDER BY last_fetched_at ASC NULLS FIRST, created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(row.map(Feed::from))
    }

    /// Stamp the fetch time of a feed.
    ///
    /// Returns false if the feed no longer exists.
    pub async fn mark_fetched(&self, id: &str, fetched_at: DateTime<Utc>) -> Result<bool> {
        let stamp = to_db_string(&fetched_at);
        let result =
            sqlx::query("UPDATE feeds SET last_fetched_at = $1, updated_at = $2 WHERE id = $3")
                .bind(&stamp)
                .bind(&stamp)
                .bind(id)
                .execute(self.pool)
                .await
                .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for feed follow operations.
pub struct FeedFollowRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedFollowRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Make `user_id` follow `feed_id`.
    ///
    /// Following the same feed twice is reported as `GatorError::Conflict`.
    pub async fn create(&self, user_id: &str, feed_id: &str) -> Result<FeedFollow> {
        let id = Uuid::new_v4().to_string();
        let now = to_db_string(&Utc::now());

        sqlx::query(
            r#"
            INSERT INTO feed_follows (id, user_id, feed_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(feed_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .map_err(|e| GatorError::from_insert(e, "feed follow"))?;

        let row = sqlx::query_as::<_, FeedFollowRow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id, u.name AS user_name, f.name AS feed_name,
                   ff.created_at
            FROM feed_follows ff
            JOIN users u ON u.id = ff.user_id
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.id = $1
            "#,
        )
        .bind(&id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(FeedFollow::from(row))
    }

    /// List the follows of a user (oldest first).
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<FeedFollow>> {
        let rows = sqlx::query_as::<_, FeedFollowRow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id, u.name AS user_name, f.name AS feed_name,
                   ff.created_at
            FROM feed_follows ff
            JOIN users u ON u.id = ff.user_id
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.user_id = $1
            ORDER BY ff.created_at ASC, ff.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(FeedFollow::from).collect())
    }

    /// Remove the follow of the feed at `url` by `user_id`.
    ///
    /// Returns false if there was nothing to remove.
    pub async fn delete_by_user_and_url(&self, user_id: &str, url: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM feed_follows
            WHERE user_id = $1
              AND feed_id IN (SELECT id FROM feeds WHERE url = $2)
            "#,
        )
        .bind(user_id)
        .bind(url)
        .execute(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a post.
    ///
    /// A post with the same (feed, url) is reported as `GatorError::Conflict`.
    pub async fn create(&self, post: &NewPost) -> Result<Post> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let stamp = to_db_string(&now);

        sqlx::query(
            r#"
            INSERT INTO posts (id, feed_id, title, url, description, published_at,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&id)
        .bind(&post.feed_id)
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(to_db_string(&post.published_at))
        .bind(&stamp)
        .bind(&stamp)
        .execute(self.pool)
        .await
        .map_err(|e| GatorError::from_insert(e, "post"))?;

        Ok(Post {
            id,
            feed_id: post.feed_id.clone(),
            title: post.title.clone(),
            url: post.url.clone(),
            description: post.description.clone(),
            published_at: post.published_at,
            created_at: now,
        })
    }

    /// Count the posts of a feed.
    pub async fn count_by_feed(&self, feed_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE feed_id = $1")
            .bind(feed_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(count)
    }

    /// List posts from the feeds a user follows, newest first.
    pub async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.feed_id, p.title, p.url, p.description, p.published_at, p.created_at
            FROM posts p
            JOIN feed_follows ff ON ff.feed_id = p.feed_id
            WHERE ff.user_id = $1
            ORDER BY p.published_at DESC, p.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }
}
