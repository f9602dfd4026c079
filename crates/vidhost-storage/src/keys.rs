//! Storage key derivation for processed videos.
//!
//! Keys take the form `{class}/{token}.{ext}` where the class prefix is the
//! aspect-ratio bucket and the token comes from 32 bytes of OS randomness,
//! URL-safe base64 without padding. Uniqueness is probabilistic only; no
//! check against existing storage is performed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::traits::{StorageError, StorageResult};

const TOKEN_BYTES: usize = 32;

/// Derive a namespaced storage key: `{class_prefix}/{random_token}.{extension}`.
pub fn derive_video_key(class_prefix: &str, extension: &str) -> StorageResult<String> {
    let mut token = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut token)
        .map_err(|e| StorageError::WriteFailed(format!("Random source unavailable: {}", e)))?;

    Ok(format!(
        "{}/{}.{}",
        class_prefix,
        URL_SAFE_NO_PAD.encode(token),
        extension
    ))
}
