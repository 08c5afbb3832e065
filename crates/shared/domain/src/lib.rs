//! # Domain Models
//!
//! Pure data shared by every Helm crate: the service configuration and the dashboard
//! configuration document it persists. Only `serde` and `serde_json` are allowed here.

pub mod config;
pub mod constants;
pub mod dashboard;
