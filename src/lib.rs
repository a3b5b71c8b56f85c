//! Agendo - weekly activity scheduling core for community portals
//!
//! This library provides the scheduling-and-authorization core: weekly
//! recurrence templates, on-demand projection to upcoming occurrences,
//! duplicate-template rejection, and admin-gated mutation behind signed
//! session credentials.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
