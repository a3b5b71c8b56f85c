//! Activity repository
//!
//! Store gateway for weekly activity templates.
//!
//! This module provides:
//! - `ActivityRepository` trait defining the interface for activity data access
//! - `SqlxActivityRepository` implementing the trait for SQLite and MySQL

use crate::db::DatabasePool;
use crate::models::{Activity, Weekday};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Activity repository trait
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// List all activities in store order
    async fn list(&self) -> Result<Vec<Activity>>;

    /// Get an activity by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Activity>>;

    /// Insert a new activity, returning it with its assigned ID
    async fn create(&self, activity: &Activity) -> Result<Activity>;

    /// Replace the fields of an existing activity in place
    async fn update(&self, activity: &Activity) -> Result<Activity>;

    /// Remove an activity; returns whether a row was deleted
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check whether an activity with the exact same dedup tuple exists
    async fn exists_duplicate(
        &self,
        title: &str,
        day_of_week: Weekday,
        start_hour: &str,
        end_hour: &str,
    ) -> Result<bool>;
}

/// SQLx-based activity repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxActivityRepository {
    pool: DatabasePool,
}

impl SqlxActivityRepository {
    /// Create a new SQLx activity repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn shared(pool: DatabasePool) -> Arc<dyn ActivityRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ActivityRepository for SqlxActivityRepository {
    async fn list(&self) -> Result<Vec<Activity>> {
        match &self.pool {
            DatabasePool::Sqlite(pool) => list_sqlite(pool).await,
            DatabasePool::Mysql(pool) => list_mysql(pool).await,
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Activity>> {
        match &self.pool {
            DatabasePool::Sqlite(pool) => find_by_id_sqlite(pool, id).await,
            DatabasePool::Mysql(pool) => find_by_id_mysql(pool, id).await,
        }
    }

    async fn create(&self, activity: &Activity) -> Result<Activity> {
        match &self.pool {
            DatabasePool::Sqlite(pool) => create_sqlite(pool, activity).await,
            DatabasePool::Mysql(pool) => create_mysql(pool, activity).await,
        }
    }

    async fn update(&self, activity: &Activity) -> Result<Activity> {
        match &self.pool {
            DatabasePool::Sqlite(pool) => update_sqlite(pool, activity).await,
            DatabasePool::Mysql(pool) => update_mysql(pool, activity).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let sql = "DELETE FROM activities WHERE id = ?";
        let affected = match &self.pool {
            DatabasePool::Sqlite(pool) => sqlx::query(sql)
                .bind(id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            DatabasePool::Mysql(pool) => sqlx::query(sql)
                .bind(id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete activity")?;
        Ok(affected > 0)
    }

    async fn exists_duplicate(
        &self,
        title: &str,
        day_of_week: Weekday,
        start_hour: &str,
        end_hour: &str,
    ) -> Result<bool> {
        let sql = "SELECT COUNT(*) AS n FROM activities \
                   WHERE title = ? AND day_of_week = ? AND start_hour = ? AND end_hour = ?";
        let count: i64 = match &self.pool {
            DatabasePool::Sqlite(pool) => sqlx::query(sql)
                .bind(title)
                .bind(day_of_week.as_str())
                .bind(start_hour)
                .bind(end_hour)
                .fetch_one(pool)
                .await
                .context("Failed to check for duplicate activity")?
                .get("n"),
            DatabasePool::Mysql(pool) => sqlx::query(sql)
                .bind(title)
                .bind(day_of_week.as_str())
                .bind(start_hour)
                .bind(end_hour)
                .fetch_one(pool)
                .await
                .context("Failed to check for duplicate activity")?
                .get("n"),
        };
        Ok(count > 0)
    }
}

/// Check whether a repository error is a store-level uniqueness violation.
///
/// The UNIQUE index on the dedup tuple is the backstop for two creates
/// racing past the application-level duplicate check; the loser's insert
/// surfaces here.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Activity>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, day_of_week, start_hour, end_hour,
               location, instructor, created_at, updated_at
        FROM activities
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list activities")?;

    rows.iter().map(row_to_activity_sqlite).collect()
}

async fn find_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Activity>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, day_of_week, start_hour, end_hour,
               location, instructor, created_at, updated_at
        FROM activities
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get activity by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_activity_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn create_sqlite(pool: &SqlitePool, activity: &Activity) -> Result<Activity> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO activities
            (title, description, day_of_week, start_hour, end_hour,
             location, instructor, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&activity.title)
    .bind(&activity.description)
    .bind(activity.day_of_week.as_str())
    .bind(&activity.start_hour)
    .bind(&activity.end_hour)
    .bind(&activity.location)
    .bind(&activity.instructor)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(anyhow::Error::from)?;

    Ok(Activity {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..activity.clone()
    })
}

async fn update_sqlite(pool: &SqlitePool, activity: &Activity) -> Result<Activity> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE activities
        SET title = ?, description = ?, day_of_week = ?, start_hour = ?,
            end_hour = ?, location = ?, instructor = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&activity.title)
    .bind(&activity.description)
    .bind(activity.day_of_week.as_str())
    .bind(&activity.start_hour)
    .bind(&activity.end_hour)
    .bind(&activity.location)
    .bind(&activity.instructor)
    .bind(now)
    .bind(activity.id)
    .execute(pool)
    .await
    .map_err(anyhow::Error::from)?;

    Ok(Activity {
        updated_at: now,
        ..activity.clone()
    })
}

fn row_to_activity_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Activity> {
    let label: String = row.get("day_of_week");
    let day_of_week: Weekday = label
        .parse()
        .with_context(|| format!("Corrupt day_of_week label in store: {}", label))?;

    Ok(Activity {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        day_of_week,
        start_hour: row.get("start_hour"),
        end_hour: row.get("end_hour"),
        location: row.get("location"),
        instructor: row.get("instructor"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Activity>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, day_of_week, start_hour, end_hour,
               location, instructor, created_at, updated_at
        FROM activities
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list activities")?;

    rows.iter().map(row_to_activity_mysql).collect()
}

async fn find_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Activity>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, day_of_week, start_hour, end_hour,
               location, instructor, created_at, updated_at
        FROM activities
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get activity by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_activity_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn create_mysql(pool: &MySqlPool, activity: &Activity) -> Result<Activity> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO activities
            (title, description, day_of_week, start_hour, end_hour,
             location, instructor, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&activity.title)
    .bind(&activity.description)
    .bind(activity.day_of_week.as_str())
    .bind(&activity.start_hour)
    .bind(&activity.end_hour)
    .bind(&activity.location)
    .bind(&activity.instructor)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(anyhow::Error::from)?;

    Ok(Activity {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..activity.clone()
    })
}

async fn update_mysql(pool: &MySqlPool, activity: &Activity) -> Result<Activity> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE activities
        SET title = ?, description = ?, day_of_week = ?, start_hour = ?,
            end_hour = ?, location = ?, instructor = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&activity.title)
    .bind(&activity.description)
    .bind(activity.day_of_week.as_str())
    .bind(&activity.start_hour)
    .bind(&activity.end_hour)
    .bind(&activity.location)
    .bind(&activity.instructor)
    .bind(now)
    .bind(activity.id)
    .execute(pool)
    .await
    .map_err(anyhow::Error::from)?;

    Ok(Activity {
        updated_at: now,
        ..activity.clone()
    })
}

fn row_to_activity_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Activity> {
    let label: String = row.get("day_of_week");
    let day_of_week: Weekday = label
        .parse()
        .with_context(|| format!("Corrupt day_of_week label in store: {}", label))?;

    Ok(Activity {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        day_of_week,
        start_hour: row.get("start_hour"),
        end_hour: row.get("end_hour"),
        location: row.get("location"),
        instructor: row.get("instructor"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
