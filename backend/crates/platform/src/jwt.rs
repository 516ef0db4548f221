//! HMAC-signed JSON Web Tokens
//!
//! Thin layer over `jsonwebtoken` that:
//! - signs with HS256 only and refuses every other algorithm on decode
//! - checks `exp` with zero leeway
//! - folds the library's error kinds into three verification outcomes
//!   ([`JwtError::InvalidSignature`], [`JwtError::Expired`], [`JwtError::Malformed`])

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Minimum secret length in bytes (RFC 7518 §3.2: key >= hash output size)
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    /// MAC mismatch, or the header names an algorithm other than HS256
    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    /// Not a JWT, bad base64, or claims that do not fit the expected shape
    #[error("Token is malformed")]
    Malformed,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => JwtError::InvalidSignature,
            _ => JwtError::Malformed,
        }
    }
}

/// Symmetric signing secret, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct JwtSecret(Vec<u8>);

impl JwtSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Fresh random secret of [`MIN_SECRET_LENGTH`] bytes.
    pub fn random() -> Self {
        Self(crate::crypto::random_bytes(MIN_SECRET_LENGTH))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for JwtSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JwtSecret").field(&"[REDACTED]").finish()
    }
}

/// HS256 signer/verifier bound to one secret.
#[derive(Clone)]
pub struct HmacJwt {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl HmacJwt {
    pub fn new(secret: &JwtSecret) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn encode<C: Serialize>(&self, claims: &C) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, then deserialize the claims.
    pub fn decode<C: DeserializeOwned>(&self, token: &str) -> Result<C, JwtError> {
        let data = jsonwebtoken::decode::<C>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl fmt::Debug for HmacJwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacJwt")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::get_current_timestamp;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestClaims {
        sub: u64,
        exp: u64,
    }

    fn claims(exp: u64) -> TestClaims {
        TestClaims { sub: 42, exp }
    }

    fn jwt(secret: &[u8]) -> HmacJwt {
        HmacJwt::new(&JwtSecret::new(secret.to_vec()))
    }

    #[test]
    fn test_roundtrip() {
        let codec = jwt(b"0123456789abcdef0123456789abcdef");
        let original = claims(get_current_timestamp() + 600);

        let token = codec.encode(&original).unwrap();
        let decoded: TestClaims = codec.decode(&token).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_other_secret_is_invalid_signature() {
        let a = jwt(b"secret-a-secret-a-secret-a-secret-a");
        let b = jwt(b"secret-b-secret-b-secret-b-secret-b");

        let token = a.encode(&claims(get_current_timestamp() + 600)).unwrap();
        assert_eq!(
            b.decode::<TestClaims>(&token),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_expired() {
        let codec = jwt(b"0123456789abcdef0123456789abcdef");
        let token = codec.encode(&claims(get_current_timestamp() - 1)).unwrap();
        assert_eq!(codec.decode::<TestClaims>(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_other_hmac_algorithm_is_rejected() {
        let secret = b"0123456789abcdef0123456789abcdef";
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims(get_current_timestamp() + 600),
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        assert_eq!(
            jwt(secret).decode::<TestClaims>(&token),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_unsigned_token_is_rejected() {
        // {"alg":"none","typ":"JWT"}.{"sub":42,"exp":9999999999}.
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOjQyLCJleHAiOjk5OTk5OTk5OTl9.";
        let result = jwt(b"0123456789abcdef0123456789abcdef").decode::<TestClaims>(token);
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = jwt(b"0123456789abcdef0123456789abcdef");
        assert_eq!(
            codec.decode::<TestClaims>("not-a-token"),
            Err(JwtError::Malformed)
        );
    }

    #[test]
    fn test_wrong_claims_shape_is_malformed() {
        #[derive(Serialize)]
        struct Other {
            name: &'static str,
            exp: u64,
        }

        let codec = jwt(b"0123456789abcdef0123456789abcdef");
        let token = codec
            .encode(&Other {
                name: "x",
                exp: get_current_timestamp() + 600,
            })
            .unwrap();
        assert_eq!(
            codec.decode::<TestClaims>(&token),
            Err(JwtError::Malformed)
        );
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = JwtSecret::new(b"super-secret".to_vec());
        assert!(!format!("{secret:?}").contains("super"));
    }
}
