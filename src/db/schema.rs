//! Database schema and migrations for gator.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded. Identifiers are UUID strings; timestamps are fixed-width
//! RFC 3339 UTC strings (see [`crate::datetime::to_db_string`]).

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
"#,
    // v2: feeds, owned by the user who added them
    r#"
CREATE TABLE feeds (
    id               TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    url              TEXT NOT NULL UNIQUE,
    user_id          TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    last_fetched_at  TEXT
);

CREATE INDEX idx_feeds_last_fetched_at ON feeds(last_fetched_at);
"#,
    // v3: feed follows
    r#"
CREATE TABLE feed_follows (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    feed_id     TEXT NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (user_id, feed_id)
);

CREATE INDEX idx_feed_follows_feed_id ON feed_follows(feed_id);
"#,
    // v4: posts, unique per (feed, canonical url)
    r#"
CREATE TABLE posts (
    id            TEXT PRIMARY KEY,
    feed_id       TEXT NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
    title         TEXT NOT NULL,
    url           TEXT NOT NULL,
    description   TEXT NOT NULL DEFAULT '',
    published_at  TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    UNIQUE (feed_id, url)
);

CREATE INDEX idx_posts_published_at ON posts(published_at);
"#,
];
