//! User model for gator.

use chrono::{DateTime, Utc};

use crate::datetime::parse_db_datetime;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID (UUID).
    pub id: String,
    /// User name (unique).
    pub name: String,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row type for users from database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            created_at: parse_db_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_db_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}
