//! Database repositories
//!
//! Repository pattern implementations for store access. Each repository
//! is a trait (the seam the services depend on) plus a SQLx
//! implementation covering both supported backends.

pub mod activity;
pub mod user;

pub use activity::{is_unique_violation, ActivityRepository, SqlxActivityRepository};
pub use user::{SqlxUserRepository, UserRepository};
