//! Keyed, timestamped anti-forgery tokens.
//!
//! # Responsibilities
//! - Generate tokens scoped to a (user, action) pair
//! - Validate tokens with constant-time digest comparison and expiry
//!
//! # Design Decisions
//! - Wire format is `<unix-timestamp>:<hex-hmac-sha1-digest>`; the
//!   timestamp is embedded in the signed message so tokens are
//!   statelessly verifiable and self-expiring
//! - Validation fails closed on any malformed input

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Separates the fields of the signed message and of the serialized token.
const DELIMITER: char = ':';

/// Default token lifetime: 24 hours.
pub const DEFAULT_MAX_AGE_SECS: u64 = 86_400;

/// Action scope used when a handler does not narrow the token to a
/// specific operation.
pub const DEFAULT_ACTION: &str = "*";

/// Generate an XSRF token for the given user and action at time `now`.
///
/// The returned token is opaque to callers beyond its serialized form.
pub fn generate_token(key: &[u8], user: &str, action: &str, now: u64) -> String {
    let message = format!("{user}{DELIMITER}{action}{DELIMITER}{now}");
    // HMAC accepts keys of any length.
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC key of any length");
    mac.update(message.as_bytes());
    let digest = hex::encode(mac.finalize().into_bytes());
    format!("{now}{DELIMITER}{digest}")
}

/// Validate an XSRF token for the given user and action at time `now`.
///
/// Returns `false` when the token or user is empty, the token does not
/// split into exactly two fields, the digest does not match, or the
/// token is at least `max_age_secs` old. Expiry uses a strict
/// less-than: a token generated at `T` is still valid at
/// `T + max_age_secs - 1` and invalid at `T + max_age_secs`.
pub fn validate_token(
    key: &[u8],
    user: &str,
    token: &str,
    action: &str,
    max_age_secs: u64,
    now: u64,
) -> bool {
    if token.is_empty() || user.is_empty() {
        return false;
    }
    let fields: Vec<&str> = token.split(DELIMITER).collect();
    let &[timestamp, digest] = fields.as_slice() else {
        return false;
    };
    let Ok(timestamp) = timestamp.parse::<u64>() else {
        return false;
    };
    let expected = generate_token(key, user, action, timestamp);
    let Some((_, expected_digest)) = expected.split_once(DELIMITER) else {
        return false;
    };
    constant_time_eq(expected_digest.as_bytes(), digest.as_bytes())
        && now < timestamp.saturating_add(max_age_secs)
}

/// Compare two byte sequences in constant time.
///
/// Every position is XOR-accumulated and the accumulator checked once at
/// the end. Known limitation: the length check itself short-circuits, so
/// only same-length comparisons are constant-time. Digests compared here
/// are fixed-length, which keeps that path off the hot comparison.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"k";

    #[test]
    fn test_round_trip() {
        let token = generate_token(KEY, "u@example.com", DEFAULT_ACTION, 1000);
        assert!(validate_token(
            KEY,
            "u@example.com",
            &token,
            DEFAULT_ACTION,
            DEFAULT_MAX_AGE_SECS,
            1000
        ));
    }

    #[test]
    fn test_action_mismatch() {
        let token = generate_token(KEY, "u@example.com", "delete", 1000);
        assert!(!validate_token(
            KEY,
            "u@example.com",
            &token,
            "create",
            DEFAULT_MAX_AGE_SECS,
            1000
        ));
    }

    #[test]
    fn test_user_mismatch() {
        let token = generate_token(KEY, "alice@example.com", DEFAULT_ACTION, 1000);
        assert!(!validate_token(
            KEY,
            "bob@example.com",
            &token,
            DEFAULT_ACTION,
            DEFAULT_MAX_AGE_SECS,
            1000
        ));
    }

    #[test]
    fn test_key_mismatch() {
        let token = generate_token(b"other", "u@example.com", DEFAULT_ACTION, 1000);
        assert!(!validate_token(
            KEY,
            "u@example.com",
            &token,
            DEFAULT_ACTION,
            DEFAULT_MAX_AGE_SECS,
            1000
        ));
    }

    #[test]
    fn test_expiry_boundary() {
        // Generated at T=1000, max age 86400: valid strictly below the
        // boundary, invalid at and past it.
        let token = generate_token(KEY, "u", DEFAULT_ACTION, 1000);
        assert!(validate_token(KEY, "u", &token, DEFAULT_ACTION, 86_400, 1000 + 86_399));
        assert!(!validate_token(KEY, "u", &token, DEFAULT_ACTION, 86_400, 1000 + 86_400));
        assert!(!validate_token(KEY, "u", &token, DEFAULT_ACTION, 86_400, 1000 + 86_401));
    }

    #[test]
    fn test_fails_closed_on_malformed_input() {
        let token = generate_token(KEY, "u", DEFAULT_ACTION, 1000);
        assert!(!validate_token(KEY, "u", "", DEFAULT_ACTION, 86_400, 1000));
        assert!(!validate_token(KEY, "", &token, DEFAULT_ACTION, 86_400, 1000));
        // Wrong field counts.
        assert!(!validate_token(KEY, "u", "1000", DEFAULT_ACTION, 86_400, 1000));
        assert!(!validate_token(KEY, "u", "1000:aa:bb", DEFAULT_ACTION, 86_400, 1000));
        // Non-numeric timestamp.
        assert!(!validate_token(KEY, "u", "soon:aabbcc", DEFAULT_ACTION, 86_400, 1000));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
        assert!(!constant_time_eq(b"abc", b"abcdef"));
        assert!(constant_time_eq(b"", b""));
    }
}
