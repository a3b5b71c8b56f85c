//! Database migrations
//!
//! Code-based migrations embedded in the binary, one SQL body per
//! supported backend. Applied versions are tracked in a `_migrations`
//! table so startup is idempotent.

use anyhow::{Context, Result};
use sqlx::Row;

use super::DatabasePool;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (unique, sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements for SQLite
    pub up_sqlite: &'static str,
    /// SQL statements for MySQL
    pub up_mysql: &'static str,
}

/// All migrations for the Agendo scheduling core.
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: user accounts, for credential minting only
    Migration {
        version: 1,
        name: "create_users",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                display_name VARCHAR(100),
                is_admin BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                display_name VARCHAR(100),
                is_admin BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX idx_users_username ON users(username);
        "#,
    },
    // Migration 2: weekly activity templates.
    // The UNIQUE index on the dedup tuple makes two racing creates of the
    // same recurrence impossible to both commit; the application-level
    // duplicate check exists for the friendly error message.
    Migration {
        version: 2,
        name: "create_activities",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(200) NOT NULL,
                description TEXT,
                day_of_week VARCHAR(16) NOT NULL,
                start_hour VARCHAR(5) NOT NULL,
                end_hour VARCHAR(5) NOT NULL,
                location VARCHAR(200),
                instructor VARCHAR(200),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_activities_slot
                ON activities(title, day_of_week, start_hour, end_hour);
            CREATE INDEX IF NOT EXISTS idx_activities_day ON activities(day_of_week);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS activities (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                title VARCHAR(200) NOT NULL,
                description TEXT,
                day_of_week VARCHAR(16) NOT NULL,
                start_hour VARCHAR(5) NOT NULL,
                end_hour VARCHAR(5) NOT NULL,
                location VARCHAR(200),
                instructor VARCHAR(200),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            );
            CREATE UNIQUE INDEX idx_activities_slot
                ON activities(title, day_of_week, start_hour, end_hour);
            CREATE INDEX idx_activities_day ON activities(day_of_week);
        "#,
    },
];

/// Run all pending migrations, returning how many were applied.
pub async fn run_migrations(pool: &DatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;
    let mut count = 0;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }
        tracing::info!("Applying migration {}: {}", migration.version, migration.name);
        apply_migration(pool, migration)
            .await
            .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
        count += 1;
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &DatabasePool) -> Result<()> {
    let sql = match pool {
        DatabasePool::Sqlite(_) => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabasePool::Mysql(_) => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };
    pool.execute(sql).await?;
    Ok(())
}

async fn applied_versions(pool: &DatabasePool) -> Result<Vec<i32>> {
    let sql = "SELECT version FROM _migrations ORDER BY version";
    let versions = match pool {
        DatabasePool::Sqlite(p) => sqlx::query(sql)
            .fetch_all(p)
            .await
            .context("Failed to read applied migrations")?
            .iter()
            .map(|row| row.get::<i64, _>("version") as i32)
            .collect(),
        DatabasePool::Mysql(p) => sqlx::query(sql)
            .fetch_all(p)
            .await
            .context("Failed to read applied migrations")?
            .iter()
            .map(|row| row.get::<i32, _>("version"))
            .collect(),
    };
    Ok(versions)
}

async fn apply_migration(pool: &DatabasePool, migration: &Migration) -> Result<()> {
    let body = match pool {
        DatabasePool::Sqlite(_) => migration.up_sqlite,
        DatabasePool::Mysql(_) => migration.up_mysql,
    };

    // Migration bodies may hold several statements
    for statement in body.split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            pool.execute(statement).await?;
        }
    }

    let record = "INSERT INTO _migrations (version, name) VALUES (?, ?)";
    match pool {
        DatabasePool::Sqlite(p) => {
            sqlx::query(record)
                .bind(migration.version)
                .bind(migration.name)
                .execute(p)
                .await
                .context("Failed to record migration")?;
        }
        DatabasePool::Mysql(p) => {
            sqlx::query(record)
                .bind(migration.version)
                .bind(migration.name)
                .execute(p)
                .await
                .context("Failed to record migration")?;
        }
    }

    Ok(())
}
