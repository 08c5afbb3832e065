//! HTTP building blocks shared by every slice.

mod health;
mod response;
mod router;

pub use response::{ErrorResponse, NO_STORE};
pub use router::system_router;

/// `OpenAPI` tag for service endpoints.
pub const SYSTEM_TAG: &str = "System";
