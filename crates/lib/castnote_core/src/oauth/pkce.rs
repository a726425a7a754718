//! PKCE and CSRF state helpers.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

const VERIFIER_BYTES: usize = 32;
const STATE_BYTES: usize = 24;

fn random_token<const N: usize>() -> String {
    let mut buf = [0u8; N];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Random PKCE code verifier, 43 URL-safe characters.
pub fn generate_code_verifier() -> String {
    random_token::<VERIFIER_BYTES>()
}

/// S256 challenge sent with the authorize redirect.
pub fn compute_code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Opaque `state` value tying the callback to a login attempt.
pub fn generate_state() -> String {
    random_token::<STATE_BYTES>()
}
