//! Opaque random tokens for session identifiers.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;

/// Generate a URL-safe random token with the given prefix.
///
/// 18 random bytes encode to 24 characters, so `generate_token("sess")`
/// yields `sess_` followed by 24 characters.
pub fn generate_token(prefix: &str) -> String {
    let bytes: [u8; 18] = rand::thread_rng().gen();
    format!("{prefix}_{}", URL_SAFE_NO_PAD.encode(bytes))
}
