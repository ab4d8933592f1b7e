//! Bearer credential generation and fingerprinting.
//!
//! Raw key format: `aj_<org prefix>_<base36 timestamp>_<random>`, where the
//! org prefix is the first 4 hex characters of the organization id, and the
//! random part is 32 OS-random bytes in URL-safe unpadded base64 (43 chars).
//! Only the SHA-256 fingerprint and the first 8 characters are ever stored.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Characters of the raw secret retained for display purposes.
pub const KEY_PREFIX_LEN: usize = 8;

/// Generate a raw bearer secret for an organization.
pub fn generate_raw_key(org_id: &Uuid, issued_at: DateTime<Utc>, secret_bytes: usize) -> String {
    let org_prefix: String = org_id.simple().to_string().chars().take(4).collect();

    let mut bytes = vec![0u8; secret_bytes];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let random = URL_SAFE_NO_PAD.encode(&bytes);

    format!(
        "aj_{}_{}_{}",
        org_prefix,
        base36(issued_at.timestamp_millis().max(0) as u64),
        random
    )
}

/// One-way fingerprint stored and compared in place of the secret.
pub fn fingerprint(raw_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Display prefix: the first [`KEY_PREFIX_LEN`] characters of the raw secret.
pub fn key_prefix(raw_key: &str) -> String {
    raw_key.chars().take(KEY_PREFIX_LEN).collect()
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_key_shape() {
        let org_id = Uuid::new_v4();
        let raw = generate_raw_key(&org_id, Utc::now(), 32);

        let parts: Vec<&str> = raw.splitn(4, '_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "aj");
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[1], &org_id.simple().to_string()[..4]);
        // 32 bytes of base64 without padding
        assert_eq!(parts[3].len(), 43);
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let a = fingerprint("aj_abcd_x_y");
        let b = fingerprint("aj_abcd_x_y");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, fingerprint("aj_abcd_x_z"));
    }

    #[test]
    fn prefix_is_first_eight_chars() {
        let org_id = Uuid::new_v4();
        let raw = generate_raw_key(&org_id, Utc::now(), 32);
        let prefix = key_prefix(&raw);
        assert_eq!(prefix.len(), 8);
        assert!(raw.starts_with(&prefix));
        assert!(prefix.starts_with("aj_"));
    }

    #[test]
    fn base36_round_numbers() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
    }

    #[test]
    fn distinct_keys_per_call() {
        let org_id = Uuid::new_v4();
        let now = Utc::now();
        assert_ne!(
            generate_raw_key(&org_id, now, 32),
            generate_raw_key(&org_id, now, 32)
        );
    }
}
