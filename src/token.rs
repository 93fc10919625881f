//! Opaque token generation.
//!
//! Tokens are capabilities, not signed credentials: uniqueness is the only
//! property the session manager relies on. A production deployment swaps in
//! collaborator-issued tokens (see `VerifyOutcome`/`RotateOutcome`), and the
//! manager prefers those when present.

use chrono::Utc;
use rand::Rng;

/// Generates an opaque token: 128 bits from the thread RNG, hex-encoded,
/// suffixed with a nanosecond timestamp so two issuances in the same process
/// can never collide even under a broken RNG.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    let entropy: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{entropy}{nanos:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_nonempty_hex() {
        let token = generate_token();
        assert!(token.len() > 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_successive_calls_differ() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_token_burst_has_no_collisions() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_token()));
        }
    }
}
