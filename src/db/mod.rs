//! Database layer
//!
//! Persistence for the scheduling core:
//! - SQLite (default, for single-binary deployment)
//! - MySQL (for larger deployments)
//!
//! The layer realizes the store gateway as repository traits over an
//! explicitly passed [`DatabasePool`]; the pool is opened at process
//! start and closed at shutdown, never held as a hidden singleton.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool};
