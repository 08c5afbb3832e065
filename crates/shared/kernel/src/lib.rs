//! Kernel utilities shared across Helm slices.
//!
//! * [`config`]: layered configuration (optional file, then `HELM__` environment overrides).
//! * `server` (feature): the system router with `/health` and the shared error body.
//!
//! ```rust,no_run
//! use helm_kernel::config::ConfigLoader;
//!
//! let cfg = ConfigLoader::new().file("helm.toml").load_api().unwrap();
//! println!("listening on {}:{}", cfg.server.address, cfg.server.port);
//! ```

pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use helm_domain as domain;
