//! Password Hashing and Verification
//!
//! - [`ClearTextPassword`]: NFKC-normalized, policy-checked, zeroized on drop
//! - [`HashedPassword`]: Argon2id PHC string, safe to store
//! - [`HashCost`]: Argon2id cost parameters; hashes made under a different
//!   cost report [`HashedPassword::needs_rehash`]
//!
//! A pepper, when configured, is appended to the password bytes before
//! hashing and must be supplied again for verification.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// NIST SP 800-63B: SHALL be at least 8
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// NIST SP 800-63B: SHOULD permit at least 64
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Cost
// ============================================================================

/// Argon2id cost parameters.
///
/// The default is the OWASP recommendation: 19 MiB, 2 passes, 1 lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashCost {
    pub const OWASP: Self = Self {
        memory_kib: 19_456,
        iterations: 2,
        parallelism: 1,
    };

    fn hasher(self) -> Result<Argon2<'static>, PasswordHashError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self::OWASP
    }
}

// ============================================================================
// Clear Text Password
// ============================================================================

/// Clear text password, erased from memory on drop.
///
/// Not `Clone`; `Debug` is redacted.
///
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
/// assert!(format!("{password:?}").contains("REDACTED"));
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize (NFKC) and apply the password policy.
    ///
    /// Length is counted in code points after normalization.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let candidate = Self::for_verification(raw);
        check_policy(&candidate.0)?;
        Ok(candidate)
    }

    /// Normalize a submitted password for comparison against a stored hash.
    ///
    /// No policy is applied: the policy in force today may be stricter than
    /// the one the stored hash was created under.
    pub fn for_verification(raw: String) -> Self {
        let normalized = raw.nfkc().collect();
        let mut raw = raw;
        raw.zeroize();
        Self(normalized)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash with a fresh random salt at the default cost.
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        self.hash_with_cost(pepper, HashCost::default())
    }

    pub fn hash_with_cost(
        &self,
        pepper: Option<&[u8]>,
        cost: HashCost,
    ) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(OsRng);
        let hash = cost
            .hasher()?
            .hash_password(&peppered(self, pepper), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password
// ============================================================================

/// Argon2id hash in PHC format (algorithm, version, cost, salt, digest).
///
/// ```rust
/// use platform::password::{ClearTextPassword, HashedPassword};
///
/// let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
/// let hashed = password.hash(None).unwrap();
///
/// let stored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
/// let submitted = ClearTextPassword::for_verification("correct horse battery".to_string());
/// assert!(stored.verify(&submitted, None));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse a stored PHC string. Only the format is checked.
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Constant-time check of `password` against this hash.
    ///
    /// The cost recorded in the hash is used, not the current default.
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(&peppered(password, pepper), &parsed)
            .is_ok()
    }

    /// True unless the hash is Argon2id v0x13 at exactly the default cost.
    pub fn needs_rehash(&self) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return true;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident()
            || parsed.version != Some(Version::V0x13 as u32)
        {
            return true;
        }

        let current = HashCost::default();
        match Params::try_from(&parsed) {
            Ok(params) => {
                params.m_cost() != current.memory_kib
                    || params.t_cost() != current.iterations
                    || params.p_cost() != current.parallelism
            }
            Err(_) => true,
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Policy
// ============================================================================

const KEYBOARD_RUNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "abcdefgh",
    "letmein",
    "welcome",
    "admin123",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "monkey",
    "shadow",
    "master",
    "dragon",
    "baseball",
    "michael",
    "trustno1",
];

fn check_policy(normalized: &str) -> Result<(), PasswordPolicyError> {
    if normalized.trim().is_empty() {
        return Err(PasswordPolicyError::EmptyOrWhitespace);
    }

    let actual = normalized.chars().count();
    if actual < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual,
        });
    }
    if actual > MAX_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooLong {
            max: MAX_PASSWORD_LENGTH,
            actual,
        });
    }

    // Space, tab and newline are allowed
    if normalized
        .chars()
        .any(|c| c.is_control() && !matches!(c, ' ' | '\t' | '\n'))
    {
        return Err(PasswordPolicyError::InvalidCharacter);
    }

    if is_predictable(normalized) {
        return Err(PasswordPolicyError::CommonPattern);
    }
    Ok(())
}

fn is_predictable(password: &str) -> bool {
    let lower = password.to_lowercase();

    let mut chars = lower.chars();
    let single_char = chars
        .next()
        .is_some_and(|first| chars.all(|c| c == first));

    single_char
        || is_digit_run(&lower)
        || KEYBOARD_RUNS.iter().any(|run| lower.contains(run))
        || COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Ascending or descending digits, wrapping between 9 and 0 ("78901234")
fn is_digit_run(s: &str) -> bool {
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 4 {
        return false;
    }

    let steps = |delta: u32| digits.windows(2).all(|w| (w[0] + delta) % 10 == w[1]);
    steps(1) || steps(9)
}

fn peppered(password: &ClearTextPassword, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
    let mut combined = password.as_bytes().to_vec();
    if let Some(p) = pepper {
        combined.extend_from_slice(p);
    }
    Zeroizing::new(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHEAP: HashCost = HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn test_policy_rejections() {
        assert!(matches!(
            ClearTextPassword::new("short".into()),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        ));
        assert!(matches!(
            ClearTextPassword::new("a".repeat(MAX_PASSWORD_LENGTH + 1)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        assert!(matches!(
            ClearTextPassword::new("        ".into()),
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
        assert!(matches!(
            ClearTextPassword::new("abc\u{0007}defgh".into()),
            Err(PasswordPolicyError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_predictable_passwords() {
        for weak in ["password123", "qwertyuiop", "12345678", "98765432", "zzzzzzzzz"] {
            assert!(
                matches!(
                    ClearTextPassword::new(weak.into()),
                    Err(PasswordPolicyError::CommonPattern)
                ),
                "{weak} accepted"
            );
        }
    }

    #[test]
    fn test_accepted_passwords() {
        assert!(ClearTextPassword::new("MySecure#Pass2024!".into()).is_ok());
        assert!(ClearTextPassword::new("パスワード安全です!".into()).is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::for_verification("TestPassword123!".into());
        let hashed = password.hash(None).unwrap();
        assert!(hashed.verify(&password, None));

        let wrong = ClearTextPassword::for_verification("WrongPassword123!".into());
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_pepper_must_match() {
        let password = ClearTextPassword::for_verification("TestPassword123!".into());
        let pepper = b"my_secret_pepper";
        let hashed = password.hash(Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)));
        assert!(!hashed.verify(&password, None));
        assert!(!hashed.verify(&password, Some(b"wrong_pepper")));
    }

    #[test]
    fn test_invalid_phc_string() {
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::for_verification("secret".into());
        let debug_output = format!("{password:?}");
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));
    }

    #[test]
    fn test_verification_skips_policy_but_normalizes() {
        let short = ClearTextPassword::for_verification("abc".into());
        assert_eq!(short.as_bytes(), b"abc");

        // Fullwidth "ＡＢＣ" normalizes to "ABC" under NFKC
        let wide = ClearTextPassword::for_verification("\u{FF21}\u{FF22}\u{FF23}".into());
        assert_eq!(wide.as_bytes(), b"ABC");
    }

    #[test]
    fn test_needs_rehash_tracks_cost() {
        let password = ClearTextPassword::for_verification("TestPassword123!".into());
        assert!(!password.hash(None).unwrap().needs_rehash());

        let cheap = password.hash_with_cost(None, CHEAP).unwrap();
        assert!(cheap.needs_rehash());
        // Old-cost hashes still verify
        assert!(cheap.verify(&password, None));
    }

    #[test]
    fn test_needs_rehash_for_other_algorithms() {
        let password = ClearTextPassword::for_verification("TestPassword123!".into());
        let salt = SaltString::generate(OsRng);
        let argon2i = Argon2::new(Algorithm::Argon2i, Version::V0x13, Params::default())
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string();

        assert!(
            HashedPassword::from_phc_string(argon2i)
                .unwrap()
                .needs_rehash()
        );
    }
}
