//! AES-256-GCM encryption for stored provider tokens.
//!
//! Uses random 12-byte nonces prepended to the ciphertext. Output is
//! base64-encoded for storage in TEXT columns.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::CredentialError;

const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;
const TAG_SIZE: usize = 16;

/// Derive a 32-byte key from a passphrase using SHA-256.
fn derive_key(passphrase: &str) -> [u8; KEY_SIZE] {
    let digest = Sha256::digest(passphrase.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest);
    key
}

fn cipher(passphrase: &str) -> Result<Aes256Gcm, CredentialError> {
    Aes256Gcm::new_from_slice(&derive_key(passphrase))
        .map_err(|e| CredentialError::Encryption(format!("Key init failed: {e}")))
}

/// Encrypt a token, returning base64 `nonce || ciphertext || tag`.
pub fn encrypt_token(plaintext: &str, passphrase: &str) -> Result<String, CredentialError> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher(passphrase)?
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| CredentialError::Encryption(format!("Encryption failed: {e}")))?;

    let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(&combined))
}

/// Decrypt a value produced by [`encrypt_token`].
pub fn decrypt_token(encrypted_b64: &str, passphrase: &str) -> Result<String, CredentialError> {
    let combined = STANDARD
        .decode(encrypted_b64)
        .map_err(|e| CredentialError::Encryption(format!("Base64 decode failed: {e}")))?;

    if combined.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CredentialError::Encryption("Ciphertext too short".into()));
    }

    let (nonce, ciphertext) = combined.split_at(NONCE_SIZE);
    let plaintext = cipher(passphrase)?
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| CredentialError::Encryption(format!("Decryption failed: {e}")))?;

    String::from_utf8(plaintext)
        .map_err(|e| CredentialError::Encryption(format!("UTF-8 decode failed: {e}")))
}
