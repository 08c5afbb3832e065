use helm_storage::StorageError;
use helm_vault::VaultError;
use std::borrow::Cow;

/// Failures of the settings slice.
///
/// `Validation` is the caller's fault (HTTP 400). Everything else means the configuration
/// could not be persisted (HTTP 500).
#[helm_derive::helm_error]
pub enum SettingsError {
    #[error("{message}")]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Encryption failure{}: {source}", format_context(.context))]
    Vault { source: VaultError, context: Option<Cow<'static, str>> },

    #[error("Serialization failure{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal settings error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl SettingsError {
    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    /// Whether the caller sent something unacceptable, as opposed to a server-side failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for SettingsError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use helm_kernel::server::ErrorResponse;

        let status = if self.is_client_error() {
            tracing::debug!(error = %self, "Rejected configuration request");
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self, "Configuration request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        ErrorResponse::new(self.to_string()).with_status(status)
    }
}
