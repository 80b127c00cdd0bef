//! User repository for gator.
//!
//! This module provides the user operations the commands need.

use chrono::Utc;
use uuid::Uuid;

use super::user::{User, UserRow};
use super::DbPool;
use crate::datetime::to_db_string;
use crate::{GatorError, Result};

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// A taken name is reported as `GatorError::Conflict`.
    pub async fn create(&self, name: &str) -> Result<User> {
        let id = Uuid::new_v4().to_string();
        let now = to_db_string(&Utc::now());

        sqlx::query("INSERT INTO users (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(&now)
            .bind(&now)
            .execute(self.pool)
            .await
            .map_err(|e| GatorError::from_insert(e, "user"))?;

        self.get_by_name(name)
            .await?
            .ok_or_else(|| GatorError::NotFound("user".to_string()))
    }

    /// Get a user by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(row.map(User::from))
    }

    /// List all users ordered by name.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users ORDER BY name",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| GatorError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Delete every user. Feeds, follows and posts go with them.
    ///
    /// Returns the number of deleted users.
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users")
            .execute(self.pool)
            .await
            .map_err(|e| GatorError::Database(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
