//! Database connection pool
//!
//! A single pool type wrapping either SQLite (default, single-binary
//! deployment) or MySQL (larger deployments). The pool is opened once at
//! process start, handed to repositories explicitly, and closed at
//! shutdown; nothing holds a hidden global connection.

use anyhow::{Context, Result};
use sqlx::{
    mysql::{MySqlPool, MySqlPoolOptions},
    sqlite::{SqlitePool, SqlitePoolOptions},
};

use crate::config::{DatabaseConfig, DatabaseDriver};

/// A connection pool for one of the supported database backends.
#[derive(Clone)]
pub enum DatabasePool {
    /// SQLite backend
    Sqlite(SqlitePool),
    /// MySQL backend
    Mysql(MySqlPool),
}

impl DatabasePool {
    /// Open a pool based on configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match config.driver {
            DatabaseDriver::Sqlite => Self::connect_sqlite(&config.url).await,
            DatabaseDriver::Mysql => Self::connect_mysql(&config.url).await,
        }
    }

    async fn connect_sqlite(url: &str) -> Result<Self> {
        // File-based databases need their parent directory to exist
        if !url.starts_with(":memory:") && !url.starts_with("sqlite::memory:") {
            let path = url.trim_start_matches("sqlite:");
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory: {:?}", parent)
                    })?;
                }
            }
        }

        let connection_url = if url.starts_with("sqlite:") {
            if url.contains('?') {
                url.to_string()
            } else {
                format!("{}?mode=rwc", url)
            }
        } else if url == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", url)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(20)
            .connect(&connection_url)
            .await
            .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .context("Failed to enable foreign keys")?;

        Ok(Self::Sqlite(pool))
    }

    async fn connect_mysql(url: &str) -> Result<Self> {
        let connection_url = if url.starts_with("mysql://") {
            url.to_string()
        } else {
            format!("mysql://{}", url)
        };

        let pool = MySqlPoolOptions::new()
            .max_connections(30)
            .connect(&connection_url)
            .await
            .with_context(|| format!("Failed to connect to MySQL database: {}", url))?;

        Ok(Self::Mysql(pool))
    }

    /// Which backend this pool talks to.
    pub fn driver(&self) -> DatabaseDriver {
        match self {
            Self::Sqlite(_) => DatabaseDriver::Sqlite,
            Self::Mysql(_) => DatabaseDriver::Mysql,
        }
    }

    /// The underlying SQLite pool, if this is a SQLite connection.
    pub fn as_sqlite(&self) -> Option<&SqlitePool> {
        match self {
            Self::Sqlite(pool) => Some(pool),
            Self::Mysql(_) => None,
        }
    }

    /// The underlying MySQL pool, if this is a MySQL connection.
    pub fn as_mysql(&self) -> Option<&MySqlPool> {
        match self {
            Self::Mysql(pool) => Some(pool),
            Self::Sqlite(_) => None,
        }
    }

    /// Execute a raw SQL statement that doesn't return rows.
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        let affected = match self {
            Self::Sqlite(pool) => sqlx::query(sql)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            Self::Mysql(pool) => sqlx::query(sql)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .with_context(|| format!("Failed to execute statement: {}", sql))?;
        Ok(affected)
    }

    /// Check that the connection is healthy.
    pub async fn ping(&self) -> Result<()> {
        match self {
            Self::Sqlite(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.map(|_| ()),
            Self::Mysql(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.map(|_| ()),
        }
        .context("Database ping failed")
    }

    /// Close the pool.
    pub async fn close(&self) {
        match self {
            Self::Sqlite(pool) => pool.close().await,
            Self::Mysql(pool) => pool.close().await,
        }
    }
}

/// Create a database connection pool based on configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool> {
    DatabasePool::connect(config).await
}

/// Create a SQLite in-memory pool for tests.
pub async fn create_test_pool() -> Result<DatabasePool> {
    let config = DatabaseConfig {
        driver: DatabaseDriver::Sqlite,
        url: ":memory:".to_string(),
    };
    create_pool(&config).await
}
