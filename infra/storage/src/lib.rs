//! Sandboxed access to Helm's data directory.
//!
//! * **Containment**: relative paths only; `..` and symlinks cannot leave the root.
//! * **Atomic replacement**: temp file, `fsync`, `rename`. A crash never leaves a
//!   half-written config behind.
//! * **Self-healing**: temp files abandoned by a crash are swept on connect.

mod builder;
mod engine;
mod error;
mod maintenance;
mod security;

pub use builder::{NoRoot, StorageBuilder, WithRoot};
pub use engine::Storage;
pub use error::{StorageError, StorageErrorExt};
