//! # Sealer
//!
//! Self-describing envelope for values that travel through an untrusted medium (a
//! browser cookie). The first two characters say how to read the rest:
//!
//! * `e:` + base64(`nonce[12] ‖ ciphertext ‖ tag[16]`), AES-256-GCM under the secret key.
//! * `b:` + base64(`json`), plain encoding used when no secret is configured.
//!
//! Only the secret-derived key is ever used here. A generated key file is private to one
//! machine, and a sealed cookie must stay readable wherever the same secret is set.

use crate::cipher::{self, NONCE_LEN, TAG_LEN};
use crate::error::{VaultError, VaultErrorExt};
use crate::keys::KeyManager;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

/// Prefix of an AES-GCM sealed payload.
pub const ENCRYPTED_TAG: &str = "e:";
/// Prefix of a plain base64 payload.
pub const PLAIN_TAG: &str = "b:";

/// A parsed sealed string.
#[derive(Clone, PartialEq, Eq)]
pub enum Sealed {
    /// `nonce ‖ ciphertext ‖ tag`, still encrypted.
    Encrypted(Vec<u8>),
    /// Raw JSON bytes.
    Plain(Vec<u8>),
}

impl Sealed {
    /// Parses the tagged string form.
    ///
    /// # Errors
    /// * [`VaultError::UnknownFormat`] for any prefix other than `e:` or `b:`.
    /// * [`VaultError::AuthenticationFailed`] if an `e:` body is not valid base64.
    /// * [`VaultError::InvalidFormat`] if a `b:` body is not valid base64.
    pub fn parse(raw: &str) -> Result<Self, VaultError> {
        if let Some(body) = raw.strip_prefix(ENCRYPTED_TAG) {
            let bytes =
                STANDARD.decode(body).map_err(|_| VaultError::authentication("Decoding encrypted payload"))?;
            return Ok(Self::Encrypted(bytes));
        }
        if let Some(body) = raw.strip_prefix(PLAIN_TAG) {
            let bytes = STANDARD
                .decode(body)
                .map_err(|e| VaultError::invalid_format(format!("plain payload is not base64: {e}")))?;
            return Ok(Self::Plain(bytes));
        }

        let prefix: String = raw.chars().take(2).collect();
        Err(VaultError::UnknownFormat { message: format!("unrecognized prefix {prefix:?}").into(), context: None })
    }

    /// Renders the tagged string form.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Encrypted(bytes) => format!("{ENCRYPTED_TAG}{}", STANDARD.encode(bytes)),
            Self::Plain(bytes) => format!("{PLAIN_TAG}{}", STANDARD.encode(bytes)),
        }
    }

    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }
}

impl FromStr for Sealed {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Sealed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Sealed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypted(bytes) => write!(f, "Sealed::Encrypted({} bytes)", bytes.len()),
            Self::Plain(bytes) => write!(f, "Sealed::Plain({} bytes)", bytes.len()),
        }
    }
}

/// Seals and unseals serializable values.
#[derive(Debug, Clone)]
pub struct Sealer {
    keys: KeyManager,
}

impl Sealer {
    #[must_use]
    pub const fn new(keys: KeyManager) -> Self {
        Self { keys }
    }

    /// Whether sealed output will be encrypted.
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        self.keys.secret_key().is_some()
    }

    /// Serializes `value` to JSON and wraps it. Encrypts when a secret key exists.
    ///
    /// # Errors
    /// Returns [`VaultError::Serialization`] or [`VaultError::Encryption`].
    pub fn seal<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, VaultError> {
        self.seal_value(value).map(|sealed| sealed.encode())
    }

    /// Like [`Sealer::seal`] but returns the parsed form.
    ///
    /// # Errors
    /// Returns [`VaultError::Serialization`] or [`VaultError::Encryption`].
    pub fn seal_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<Sealed, VaultError> {
        let json = serde_json::to_vec(value).context("Encoding sealed value")?;

        let Some(key) = self.keys.secret_key() else {
            return Ok(Sealed::Plain(json));
        };

        let parts = cipher::encrypt(key, &json)?;
        let mut payload = Vec::with_capacity(NONCE_LEN + TAG_LEN + parts.ciphertext.len());
        payload.extend_from_slice(&parts.nonce);
        payload.extend_from_slice(&parts.ciphertext);
        payload.extend_from_slice(&parts.tag);
        Ok(Sealed::Encrypted(payload))
    }

    /// Parses, opens and deserializes a sealed string.
    ///
    /// Plain payloads are accepted whether or not a key is configured, so cookies written
    /// before a secret was set stay readable.
    ///
    /// # Errors
    /// * [`VaultError::MissingKey`] for an `e:` payload without a secret key.
    /// * [`VaultError::AuthenticationFailed`] for a bad tag, wrong key or truncated payload.
    /// * [`VaultError::UnknownFormat`], [`VaultError::InvalidFormat`] from [`Sealed::parse`].
    /// * [`VaultError::Serialization`] if the opened bytes are not the expected JSON.
    pub fn unseal<T: DeserializeOwned>(&self, raw: &str) -> Result<T, VaultError> {
        let bytes = self.open(&Sealed::parse(raw)?)?;
        serde_json::from_slice(&bytes).context("Decoding sealed value")
    }

    /// Returns the JSON bytes inside a parsed payload.
    ///
    /// # Errors
    /// See [`Sealer::unseal`].
    pub fn open(&self, sealed: &Sealed) -> Result<Vec<u8>, VaultError> {
        let payload = match sealed {
            Sealed::Plain(bytes) => return Ok(bytes.clone()),
            Sealed::Encrypted(payload) => payload,
        };

        let Some(key) = self.keys.secret_key() else {
            return Err(VaultError::MissingKey {
                message: "encrypted payload but no secret is configured".into(),
                context: None,
            });
        };

        if payload.len() < NONCE_LEN + TAG_LEN {
            return Err(VaultError::authentication("Payload shorter than nonce and tag"));
        }
        let (nonce, rest) = payload.split_at(NONCE_LEN);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);

        cipher::decrypt(key, nonce, ciphertext, tag)
    }
}
