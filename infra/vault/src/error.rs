//! # Vault Errors
//!
//! This module defines the [`VaultError`] enum used throughout the vault crate for
//! reporting key, format, and authentication failures.

use std::borrow::Cow;

/// A specialized [`VaultError`] enum for vault-related failures.
#[helm_derive::helm_error]
pub enum VaultError {
    /// Encrypted data was presented but no key is configured to open it.
    #[error("Missing key{}: {message}", format_context(.context))]
    MissingKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The AEAD tag did not verify.
    ///
    /// This indicates a wrong key, tampered data, or an encrypted payload that could not
    /// be decoded far enough to attempt decryption.
    #[error("Authentication failed{}: {message}", format_context(.context))]
    AuthenticationFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A sealed string carried a format tag this crate does not understand.
    #[error("Unknown sealed format{}: {message}", format_context(.context))]
    UnknownFormat { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A stored string does not have the expected structure.
    #[error("Invalid format{}: {message}", format_context(.context))]
    InvalidFormat { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// JSON encoding of a value, or decoding of an opened payload, failed.
    #[error("Serialization error{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Failure during the encryption process (RNG or cipher setup).
    #[error("Encryption error{}: {message}", format_context(.context))]
    Encryption { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal vault error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl VaultError {
    pub(crate) fn authentication(context: &'static str) -> Self {
        Self::AuthenticationFailed { message: "AEAD authentication failed".into(), context: Some(context.into()) }
    }

    pub(crate) fn invalid_format(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidFormat { message: message.into(), context: None }
    }
}
