//! Registration confirmation token
//!
//! The raw token leaves the system once (in the confirmation message).
//! Only its SHA-256 digest is stored, so a database leak does not allow
//! confirming someone else's account.

use platform::crypto::{random_token, sha256, to_base64url};

/// Entropy of a confirmation token in bytes
const TOKEN_BYTES: usize = 32;

pub struct ConfirmationToken(String);

impl ConfirmationToken {
    pub fn generate() -> Self {
        Self(random_token(TOKEN_BYTES))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn digest(&self) -> String {
        Self::digest_of(&self.0)
    }

    /// Lookup key for a token presented by a client
    pub fn digest_of(raw: &str) -> String {
        to_base64url(&sha256(raw.as_bytes()))
    }
}

impl std::fmt::Debug for ConfirmationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ConfirmationToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let token = ConfirmationToken::generate();
        assert_eq!(token.digest(), ConfirmationToken::digest_of(token.as_str()));
        assert_ne!(token.digest(), token.as_str());
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(
            ConfirmationToken::generate().as_str(),
            ConfirmationToken::generate().as_str()
        );
    }
}
