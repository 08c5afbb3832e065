use crate::error::VaultError;
use crate::keys::SecretKey;
use aead::inout::InOutBuf;
use aead::{AeadInOut, Key, KeyInit, Nonce, Tag};
use aes_gcm::Aes256Gcm;
use getrandom::fill;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Output of a detached encryption: the three parts each wire format lays out its own way.
pub(crate) struct Detached {
    pub(crate) nonce: Vec<u8>,
    pub(crate) ciphertext: Vec<u8>,
    pub(crate) tag: Vec<u8>,
}

fn cipher(key: &SecretKey) -> Result<Aes256Gcm, VaultError> {
    let key = Key::<Aes256Gcm>::try_from(&key.as_bytes()[..])
        .map_err(|_| VaultError::Encryption { message: "Invalid key length".into(), context: None })?;
    Ok(Aes256Gcm::new(&key))
}

/// Encrypts `plaintext` under a fresh random nonce with empty associated data.
pub(crate) fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<Detached, VaultError> {
    let cipher = cipher(key)?;

    let mut nonce = Nonce::<Aes256Gcm>::default();
    fill(&mut nonce).map_err(|e| VaultError::Encryption {
        message: format!("System RNG unavailable: {e}").into(),
        context: Some("Nonce generation".into()),
    })?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_inout_detached(&nonce, &[], InOutBuf::from(&mut buffer[..]))
        .map_err(|_| VaultError::Encryption { message: "AEAD encryption failed".into(), context: None })?;

    Ok(Detached { nonce: nonce.to_vec(), ciphertext: buffer, tag: tag.to_vec() })
}

/// Verifies and decrypts. Callers validate part lengths against their own wire format
/// before getting here.
pub(crate) fn decrypt(
    key: &SecretKey,
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, VaultError> {
    let nonce: Nonce<Aes256Gcm> =
        nonce.try_into().map_err(|_| VaultError::invalid_format("nonce must be 12 bytes"))?;
    let tag: Tag<Aes256Gcm> = tag.try_into().map_err(|_| VaultError::invalid_format("tag must be 16 bytes"))?;

    let cipher = cipher(key)?;
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_inout_detached(&nonce, &[], InOutBuf::from(&mut buffer[..]), &tag)
        .map_err(|_| VaultError::authentication("Tag verification"))?;

    Ok(buffer)
}
