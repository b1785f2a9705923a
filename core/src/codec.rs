//! Save codec: snapshot ↔ opaque text blob.
//!
//! json → deterministic authenticated stream cipher → hex.
//!   key       = SHA-256(APP_SECRET)
//!   siv       = HMAC-SHA256(key, json)[..16]   (IV and tag in one)
//!   keystream = ChaCha20 seeded with SHA-256(key || siv)
//!   blob      = hex(siv || json XOR keystream)
//!
//! The stored form appends a marker derived from the storage key.
//! Both directions fail closed; the `try_*` wrappers turn failures
//! into `None` for callers that fall back to a fresh game.

use crate::{
    error::{GameError, GameResult},
    snapshot::Snapshot,
};
use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const APP_SECRET: &str = "outpost";
const TAG_LEN: usize = 16;

fn key() -> [u8; 32] {
    Sha256::digest(APP_SECRET.as_bytes()).into()
}

fn mac(key: &[u8]) -> GameResult<HmacSha256> {
    HmacSha256::new_from_slice(key).map_err(|e| GameError::EncodeFailure { reason: e.to_string() })
}

fn apply_keystream(key: &[u8], siv: &[u8], data: &mut [u8]) {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(siv);
    let seed: [u8; 32] = hasher.finalize().into();
    let mut stream = vec![0u8; data.len()];
    ChaCha20Rng::from_seed(seed).fill_bytes(&mut stream);
    for (byte, k) in data.iter_mut().zip(stream) {
        *byte ^= k;
    }
}

pub fn encode(snapshot: &Snapshot) -> GameResult<String> {
    let mut body = serde_json::to_vec(snapshot)
        .map_err(|e| GameError::EncodeFailure { reason: e.to_string() })?;
    let key = key();

    let mut tag = mac(&key)?;
    tag.update(&body);
    let tag = tag.finalize().into_bytes();
    let siv = &tag[..TAG_LEN];

    apply_keystream(&key, siv, &mut body);
    let mut out = Vec::with_capacity(TAG_LEN + body.len());
    out.extend_from_slice(siv);
    out.extend_from_slice(&body);
    Ok(hex::encode(out))
}

pub fn decode(blob: &str) -> GameResult<Snapshot> {
    let fail = |reason: &str| GameError::DecodeFailure { reason: reason.to_string() };

    let bytes = hex::decode(blob.trim()).map_err(|e| fail(&e.to_string()))?;
    if bytes.len() <= TAG_LEN {
        return Err(fail("blob too short"));
    }
    let (siv, cipher) = bytes.split_at(TAG_LEN);
    let key = key();

    let mut body = cipher.to_vec();
    apply_keystream(&key, siv, &mut body);

    let mut check = mac(&key).map_err(|_| fail("bad key"))?;
    check.update(&body);
    check.verify_truncated_left(siv).map_err(|_| fail("authentication tag mismatch"))?;

    serde_json::from_slice(&body).map_err(|e| fail(&e.to_string()))
}

/// Suffix appended to every stored blob: hex("+++" + storage_key).
pub fn marker(storage_key: &str) -> String {
    hex::encode(format!("+++{storage_key}"))
}

pub fn seal(storage_key: &str, snapshot: &Snapshot) -> GameResult<String> {
    Ok(encode(snapshot)? + &marker(storage_key))
}

/// Strip the marker when present, then decode.
pub fn unseal(storage_key: &str, stored: &str) -> GameResult<Snapshot> {
    let marker = marker(storage_key);
    decode(stored.strip_suffix(marker.as_str()).unwrap_or(stored))
}

pub fn try_encode(snapshot: &Snapshot) -> Option<String> {
    encode(snapshot)
        .map_err(|e| log::warn!("encode failed: {e}"))
        .ok()
}

pub fn try_decode(blob: &str) -> Option<Snapshot> {
    decode(blob)
        .map_err(|e| log::warn!("decode failed: {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_hex_of_prefixed_key() {
        assert_eq!(marker("save"), hex::encode("+++save"));
    }

    #[test]
    fn short_and_garbled_blobs_fail() {
        assert!(decode("").is_err());
        assert!(decode("zz").is_err());
        assert!(decode(&"00".repeat(TAG_LEN)).is_err());
    }
}
