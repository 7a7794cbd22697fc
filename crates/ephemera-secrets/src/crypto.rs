//! AES-256-GCM encryption keyed by a per-secret password.
//!
//! The key is a single SHA-256 pass over the password bytes. A fresh random
//! nonce is prepended to the ciphertext, so the stored blob is
//! `nonce || ciphertext || tag` and nothing else needs to be kept.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{Result, SecretError};

const NONCE_SIZE: usize = 12;

/// AES block size; passwords shorter than this are rejected outright.
pub const MIN_PASSWORD_LEN: usize = 16;

/// Bytes of randomness behind a generated password (32 chars once encoded).
pub const PASSWORD_BYTES: usize = 24;

/// Derive a 256-bit key from `password`.
pub fn derive_key(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

/// Encrypt `plaintext` under `password`.
///
/// Returns `nonce || ciphertext_with_tag`.
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| SecretError::Crypto(format!("nonce generation failed: {e}")))?;

    let key = derive_key(password);
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|e| SecretError::Crypto(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| SecretError::Crypto(e.to_string()))?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// A blob shorter than the nonce, a wrong password and a tampered blob are
/// indistinguishable to the caller: all yield [`SecretError::Authentication`].
pub fn decrypt(blob: &[u8], password: &str) -> Result<Vec<u8>> {
    if blob.len() < NONCE_SIZE {
        return Err(SecretError::Authentication);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);

    let key = derive_key(password);
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|e| SecretError::Crypto(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| SecretError::Authentication)
}

/// Reject passwords that could not have been issued by [`random_token`].
pub fn check_password_shape(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(SecretError::Validation("password is empty".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(SecretError::Validation(format!(
            "password shorter than {MIN_PASSWORD_LEN} bytes"
        )));
    }
    Ok(())
}

/// `byte_len` bytes from the OS RNG, URL-safe base64 without padding.
pub fn random_token(byte_len: usize) -> Result<String> {
    let mut bytes = vec![0u8; byte_len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| SecretError::Crypto(format!("random generation failed: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Fresh time-sortable secret identifier.
pub fn new_secret_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}

/// Encoding used for ciphertext at rest.
pub fn to_base64(data: &[u8]) -> String {
    STANDARD_NO_PAD.encode(data)
}

pub fn from_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD_NO_PAD
        .decode(data)
        .map_err(|_| SecretError::Authentication)
}
