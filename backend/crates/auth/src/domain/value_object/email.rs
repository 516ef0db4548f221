//! Email Value Object
//!
//! Represents a syntactically valid, lowercased email address.
//! Ownership is proven separately through the registration confirmation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{AuthError, AuthResult};

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Maximum local part length (per RFC 5321)
const LOCAL_PART_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(email: impl Into<String>) -> AuthResult<Self> {
        let email = email.into().trim().to_lowercase();

        if email.is_empty() {
            return Err(AuthError::InvalidEmail("email cannot be empty".into()));
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AuthError::InvalidEmail(format!(
                "email must be at most {EMAIL_MAX_LENGTH} characters"
            )));
        }

        if !is_valid_format(&email) {
            return Err(AuthError::InvalidEmail("invalid email format".into()));
        }

        Ok(Self(email))
    }

    /// Rebuild from a stored value (validated on the way in)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

fn is_valid_format(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > LOCAL_PART_MAX_LENGTH || domain.contains('@') {
        return false;
    }

    if domain.is_empty() || !domain.contains('.') {
        return false;
    }

    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }

    !(domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']) || domain.contains(".."))
}

impl FromStr for Email {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        Email::new(s)
    }
}

impl TryFrom<String> for Email {
    type Error = AuthError;

    fn try_from(s: String) -> AuthResult<Self> {
        Email::new(s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("user@example.com").is_ok());
        assert!(Email::new("user.name@example.co.jp").is_ok());
        assert!(Email::new("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        for bad in [
            "",
            "userexample.com",
            "user@",
            "@example.com",
            "user@@example.com",
            "user@example",
            "user@-example.com",
            "user@example..com",
        ] {
            assert!(
                matches!(Email::new(bad), Err(AuthError::InvalidEmail(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_email_case_and_whitespace_normalization() {
        let email = Email::new("  User@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Email>("\"a@b.io\"").is_ok());
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }
}
