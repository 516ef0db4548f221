//! Application Configuration
//!
//! Built once at startup and shared through `Arc`. Holds every secret the
//! token lifecycle needs; nothing is read from ambient globals.

use std::fmt;
use std::time::Duration;

use platform::jwt::{JwtSecret, MIN_SECRET_LENGTH};

use crate::error::{AuthError, AuthResult};

/// Initial administrator created at startup when absent.
#[derive(Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    /// Signs access tokens
    pub access_secret: JwtSecret,
    /// Signs refresh tokens; must differ from `access_secret`
    pub refresh_secret: JwtSecret,
    /// Access token lifetime (15 minutes)
    pub access_ttl: Duration,
    /// Refresh token lifetime (7 days)
    pub refresh_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    pub admin: Option<AdminCredentials>,
    /// Rotation also deletes the consumed pair's access record
    pub revoke_access_on_rotate: bool,
    /// Upper bound for a single credential or token store call
    pub store_timeout: Duration,
    /// How often expired token records are purged
    pub purge_interval: Duration,
}

impl Default for AuthConfig {
    /// Random per-process secrets: tokens do not survive a restart.
    fn default() -> Self {
        Self {
            access_secret: JwtSecret::random(),
            refresh_secret: JwtSecret::random(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
            password_pepper: None,
            admin: None,
            revoke_access_on_rotate: false,
            store_timeout: Duration::from_secs(5),
            purge_interval: Duration::from_secs(3600),
        }
    }
}

impl AuthConfig {
    pub fn new(access_secret: JwtSecret, refresh_secret: JwtSecret) -> Self {
        Self {
            access_secret,
            refresh_secret,
            ..Default::default()
        }
    }

    /// Create config for development (random secrets)
    pub fn development() -> Self {
        tracing::warn!("Using random token secrets; issued tokens die with the process");
        Self::default()
    }

    /// Reject configurations that would weaken token separation.
    pub fn validate(&self) -> AuthResult<()> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(AuthError::InvalidConfig("token secrets must not be empty".into()));
        }
        if self.access_secret == self.refresh_secret {
            return Err(AuthError::InvalidConfig(
                "access and refresh secrets must differ".into(),
            ));
        }
        if self.access_ttl.is_zero() || self.refresh_ttl.is_zero() {
            return Err(AuthError::InvalidConfig("token lifetimes must be positive".into()));
        }
        if self.store_timeout.is_zero() {
            return Err(AuthError::InvalidConfig("store timeout must be positive".into()));
        }
        if self.purge_interval.is_zero() {
            return Err(AuthError::InvalidConfig("purge interval must be positive".into()));
        }
        for (name, secret) in [("access", &self.access_secret), ("refresh", &self.refresh_secret)] {
            if secret.len() < MIN_SECRET_LENGTH {
                tracing::warn!(
                    secret = name,
                    length = secret.len(),
                    recommended = MIN_SECRET_LENGTH,
                    "Token secret is shorter than recommended"
                );
            }
        }
        Ok(())
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("admin", &self.admin)
            .field("revoke_access_on_rotate", &self.revoke_access_on_rotate)
            .field("store_timeout", &self.store_timeout)
            .field("purge_interval", &self.purge_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.access_ttl, Duration::from_secs(900));
        assert_eq!(config.refresh_ttl, Duration::from_secs(604_800));
        assert!(!config.revoke_access_on_rotate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_equal_secrets_rejected() {
        let secret = JwtSecret::new(b"same-secret-same-secret-same-sec".to_vec());
        let config = AuthConfig::new(secret.clone(), secret);
        assert!(matches!(config.validate(), Err(AuthError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let config = AuthConfig {
            store_timeout: Duration::ZERO,
            ..AuthConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuthError::InvalidConfig(_))));

        let config = AuthConfig {
            purge_interval: Duration::ZERO,
            ..AuthConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuthError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = AuthConfig::new(JwtSecret::new(Vec::new()), JwtSecret::random());
        assert!(matches!(config.validate(), Err(AuthError::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = AuthConfig {
            password_pepper: Some(b"pepper-value".to_vec()),
            admin: Some(AdminCredentials {
                email: "admin@example.com".into(),
                password: "admin-password".into(),
            }),
            ..AuthConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("pepper-value"));
        assert!(!debug.contains("admin-password"));
    }
}
