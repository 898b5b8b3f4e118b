// Token Provider Port
//
// Confirmation tokens must be unguessable; uniqueness is enforced by the
// storage layer's unique index and insertion is retried on collision.

use rand::RngCore;

/// Token provider interface (allows deterministic tokens in tests)
pub trait TokenProvider: Send + Sync {
    /// Generate an opaque token of `length` hex characters.
    fn generate(&self, length: usize) -> String;
}

/// Cryptographically-random hex token provider (production)
pub struct HexTokenProvider;

impl TokenProvider for HexTokenProvider {
    fn generate(&self, length: usize) -> String {
        let mut bytes = vec![0u8; length.div_ceil(2)];
        rand::thread_rng().fill_bytes(&mut bytes);

        let mut token = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            token.push_str(&format!("{:02x}", b));
        }
        token.truncate(length);
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_have_the_requested_length() {
        let provider = HexTokenProvider;
        assert_eq!(provider.generate(32).len(), 32);
        assert_eq!(provider.generate(7).len(), 7);
    }

    #[test]
    fn tokens_are_lowercase_hex() {
        let provider = HexTokenProvider;
        let token = provider.generate(32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn tokens_are_distinct() {
        let provider = HexTokenProvider;
        let tokens: HashSet<String> = (0..1000).map(|_| provider.generate(32)).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
