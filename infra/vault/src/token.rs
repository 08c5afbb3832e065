//! # Token Codec
//!
//! Field-level encryption for the gateway token in the file backend. The stored form is
//! `base64(iv):base64(ciphertext):base64(tag)`, encrypted with whichever key
//! [`KeyManager::resolve_key`] yields (secret-derived or generated).

use crate::cipher::{self, NONCE_LEN, TAG_LEN};
use crate::error::VaultError;
use crate::keys::KeyManager;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const SEPARATOR: char = ':';

/// Encrypts and decrypts single string values.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: KeyManager,
}

impl TokenCodec {
    #[must_use]
    pub const fn new(keys: KeyManager) -> Self {
        Self { keys }
    }

    /// Encrypts `plaintext` under a fresh IV. Two calls never yield the same output.
    ///
    /// # Errors
    /// Returns [`VaultError::Encryption`] if the RNG fails.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        let key = self.keys.resolve_key()?;
        let parts = cipher::encrypt(key, plaintext.as_bytes())?;

        Ok(format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            STANDARD.encode(&parts.nonce),
            STANDARD.encode(&parts.ciphertext),
            STANDARD.encode(&parts.tag)
        ))
    }

    /// Decrypts a value produced by [`TokenCodec::encrypt`].
    ///
    /// # Errors
    /// * [`VaultError::InvalidFormat`] for a wrong segment count, bad base64, a wrong IV or
    ///   tag length, or plaintext that is not UTF-8.
    /// * [`VaultError::AuthenticationFailed`] if the tag does not verify.
    pub fn decrypt(&self, encoded: &str) -> Result<String, VaultError> {
        let [iv, ciphertext, tag] = split_segments(encoded)
            .ok_or_else(|| VaultError::invalid_format("expected iv:ciphertext:tag"))?;

        let iv = decode_segment(iv, "iv")?;
        let ciphertext = decode_segment(ciphertext, "ciphertext")?;
        let tag = decode_segment(tag, "tag")?;

        if iv.len() != NONCE_LEN {
            return Err(VaultError::invalid_format(format!("iv must be {NONCE_LEN} bytes, got {}", iv.len())));
        }
        if tag.len() != TAG_LEN {
            return Err(VaultError::invalid_format(format!("tag must be {TAG_LEN} bytes, got {}", tag.len())));
        }

        let key = self.keys.resolve_key()?;
        let plaintext = cipher::decrypt(key, &iv, &ciphertext, &tag)?;
        String::from_utf8(plaintext).map_err(|_| VaultError::invalid_format("decrypted token is not UTF-8"))
    }

    /// Structural check: three `:`-separated base64 segments with non-empty IV and tag.
    ///
    /// A heuristic only. A plaintext token that happens to look like this is treated as
    /// encrypted, and its later decryption fails.
    #[must_use]
    pub fn is_encrypted(value: &str) -> bool {
        split_segments(value).is_some_and(|[iv, ciphertext, tag]| {
            !iv.is_empty() && !tag.is_empty() && [iv, ciphertext, tag].iter().all(|s| STANDARD.decode(s).is_ok())
        })
    }
}

fn split_segments(value: &str) -> Option<[&str; 3]> {
    let mut parts = value.split(SEPARATOR);
    let segments = [parts.next()?, parts.next()?, parts.next()?];
    parts.next().is_none().then_some(segments)
}

fn decode_segment(segment: &str, name: &'static str) -> Result<Vec<u8>, VaultError> {
    STANDARD.decode(segment).map_err(|e| VaultError::invalid_format(format!("{name} segment is not base64: {e}")))
}
