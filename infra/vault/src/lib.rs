//! Key management and authenticated encryption for Helm's persisted configuration.
//!
//! Two wire formats share one AES-256-GCM primitive (12-byte random nonce, 16-byte tag,
//! no associated data):
//!
//! ## Sealed Envelope
//!
//! Used for whole-config cookies. Self-describing by prefix:
//!
//! ```text
//! e:<base64( NONCE(12) | CIPHERTEXT(N) | TAG(16) )>
//! b:<base64( JSON )>
//! ```
//!
//! Only a key derived from the operator secret can produce or open `e:` payloads.
//!
//! ## Token Field
//!
//! Used for the gateway token in the config file:
//!
//! ```text
//! base64(IV):base64(CIPHERTEXT):base64(TAG)
//! ```
//!
//! Encrypted with the secret-derived key when set, otherwise with a key generated on
//! first use and persisted to a hex key file (mode `0600`).
//!
//! ## Example
//!
//! ```rust
//! use helm_vault::{KeyManager, Sealer, TokenCodec};
//!
//! # fn main() -> Result<(), helm_vault::VaultError> {
//! let keys = KeyManager::builder().secret(Some("operator-secret")).build();
//!
//! let sealer = Sealer::new(keys.clone());
//! let cookie = sealer.seal(&serde_json::json!({ "editMode": true }))?;
//! assert!(cookie.starts_with("e:"));
//! let opened: serde_json::Value = sealer.unseal(&cookie)?;
//! assert_eq!(opened["editMode"], true);
//!
//! let codec = TokenCodec::new(keys);
//! let stored = codec.encrypt("gw-token")?;
//! assert!(TokenCodec::is_encrypted(&stored));
//! assert_eq!(codec.decrypt(&stored)?, "gw-token");
//! # Ok(())
//! # }
//! ```

mod cipher;
mod error;
mod keys;
mod sealer;
mod token;

pub use cipher::{NONCE_LEN, TAG_LEN};
pub use error::{VaultError, VaultErrorExt};
pub use keys::{DEFAULT_KEY_FILE, KEY_LEN, KeyManager, KeyManagerBuilder, SecretKey};
pub use sealer::{ENCRYPTED_TAG, PLAIN_TAG, Sealed, Sealer};
pub use token::TokenCodec;

pub mod prelude {
    pub use crate::error::{VaultError, VaultErrorExt};
    pub use crate::keys::KeyManager;
    pub use crate::sealer::{Sealed, Sealer};
    pub use crate::token::TokenCodec;
}
