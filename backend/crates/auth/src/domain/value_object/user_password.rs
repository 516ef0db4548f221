//! User Password Value Objects
//!
//! Domain wrappers over `platform::password`:
//! - [`RawPassword`] is what a client submitted (zeroized on drop)
//! - [`UserPassword`] is the Argon2id PHC string kept by the credential store
//!
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//!
//! let raw = RawPassword::new("correct horse battery".to_string()).unwrap();
//! let stored = UserPassword::from_raw(&raw, None).unwrap();
//!
//! let submitted = RawPassword::submitted("correct horse battery".to_string());
//! assert!(stored.verify(&submitted, None).unwrap());
//! ```

use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

use crate::error::{AuthError, AuthResult};

pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// A new password chosen by the user; the NIST SP 800-63B policy applies.
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| {
            let message = match e {
                PasswordPolicyError::TooShort { min, .. } => {
                    format!("password must be at least {min} characters")
                }
                PasswordPolicyError::TooLong { max, .. } => {
                    format!("password must be at most {max} characters")
                }
                PasswordPolicyError::EmptyOrWhitespace => "password cannot be empty".to_string(),
                PasswordPolicyError::InvalidCharacter => {
                    "password contains invalid control characters".to_string()
                }
                PasswordPolicyError::CommonPattern => {
                    "password is too common or follows a predictable pattern".to_string()
                }
            };
            AuthError::PasswordValidation(message)
        })?;

        Ok(Self(clear_text))
    }

    /// A password presented at sign-in. Only normalized; never rejected here.
    pub fn submitted(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

/// Stored password hash (PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(String);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<Self> {
        let hashed = raw
            .inner()
            .hash(pepper)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(Self(hashed.as_phc_string().to_owned()))
    }

    pub fn from_db(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time verification. A corrupt stored hash is an internal error.
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<bool> {
        let hashed = HashedPassword::from_phc_string(self.0.as_str())
            .map_err(|e| AuthError::Internal(format!("stored password hash: {e}")))?;
        Ok(hashed.verify(raw.inner(), pepper))
    }

    /// Hash made under an outdated algorithm or cost; unparseable counts too
    pub fn needs_rehash(&self) -> bool {
        HashedPassword::from_phc_string(self.0.as_str()).map_or(true, |h| h.needs_rehash())
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}
