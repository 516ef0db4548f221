//! Token Codec
//!
//! Closed claim sets for the two token kinds and their HS256 encoding.
//! Access and refresh tokens are signed with different secrets, so a token
//! minted for one purpose never verifies as the other.

use kernel::id::{AccessId, PairId, RefreshId};
use platform::jwt::{HmacJwt, JwtSecret};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult, TokenError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub authorized: bool,
    pub access_id: AccessId,
    pub pair_id: PairId,
    pub user_id: UserId,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub refresh_id: RefreshId,
    pub pair_id: PairId,
    pub user_id: UserId,
    pub iat: i64,
    pub exp: i64,
}

/// Every payload this service signs. The `token_use` tag is part of the
/// signed body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "token_use", rename_all = "snake_case")]
pub enum TokenClaims {
    Access(AccessClaims),
    Refresh(RefreshClaims),
}

#[derive(Debug, Clone)]
pub struct TokenCodec {
    access: HmacJwt,
    refresh: HmacJwt,
}

impl TokenCodec {
    pub fn new(access_secret: &JwtSecret, refresh_secret: &JwtSecret) -> Self {
        Self {
            access: HmacJwt::new(access_secret),
            refresh: HmacJwt::new(refresh_secret),
        }
    }

    pub fn encode(&self, claims: &TokenClaims) -> AuthResult<String> {
        let jwt = match claims {
            TokenClaims::Access(_) => &self.access,
            TokenClaims::Refresh(_) => &self.refresh,
        };
        jwt.encode(claims)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    pub fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        match decode(&self.access, token)? {
            TokenClaims::Access(claims) if claims.authorized => Ok(claims),
            _ => Err(TokenError::Malformed),
        }
    }

    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        match decode(&self.refresh, token)? {
            TokenClaims::Refresh(claims) => Ok(claims),
            TokenClaims::Access(_) => Err(TokenError::Malformed),
        }
    }
}

fn decode(jwt: &HmacJwt, token: &str) -> Result<TokenClaims, TokenError> {
    jwt.decode::<TokenClaims>(token).map_err(|e| {
        TokenError::try_from(e).unwrap_or(TokenError::Malformed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn codec() -> TokenCodec {
        TokenCodec::new(
            &JwtSecret::new(b"access-secret-access-secret-0001".to_vec()),
            &JwtSecret::new(b"refresh-secret-refresh-secret-01".to_vec()),
        )
    }

    fn access_claims(exp_offset: i64) -> AccessClaims {
        let now = Utc::now().timestamp();
        AccessClaims {
            authorized: true,
            access_id: AccessId::new(),
            pair_id: PairId::new(),
            user_id: UserId::new(42),
            iat: now,
            exp: now + exp_offset,
        }
    }

    fn refresh_claims(exp_offset: i64) -> RefreshClaims {
        let now = Utc::now().timestamp();
        RefreshClaims {
            refresh_id: RefreshId::new(),
            pair_id: PairId::new(),
            user_id: UserId::new(42),
            iat: now,
            exp: now + exp_offset,
        }
    }

    #[test]
    fn test_access_roundtrip() {
        let codec = codec();
        let claims = access_claims(900);
        let token = codec.encode(&TokenClaims::Access(claims.clone())).unwrap();
        assert_eq!(codec.decode_access(&token), Ok(claims));
    }

    #[test]
    fn test_refresh_roundtrip() {
        let codec = codec();
        let claims = refresh_claims(3600);
        let token = codec.encode(&TokenClaims::Refresh(claims.clone())).unwrap();
        assert_eq!(codec.decode_refresh(&token), Ok(claims));
    }

    #[test]
    fn test_refresh_token_never_verifies_as_access() {
        let codec = codec();
        let token = codec
            .encode(&TokenClaims::Refresh(refresh_claims(3600)))
            .unwrap();
        assert_eq!(codec.decode_access(&token), Err(TokenError::InvalidSignature));

        let token = codec
            .encode(&TokenClaims::Access(access_claims(900)))
            .unwrap();
        assert_eq!(codec.decode_refresh(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_foreign_secret_is_invalid_signature() {
        let other = TokenCodec::new(
            &JwtSecret::new(b"another-access-secret-0000000001".to_vec()),
            &JwtSecret::new(b"another-refresh-secret-000000001".to_vec()),
        );
        let token = other
            .encode(&TokenClaims::Access(access_claims(900)))
            .unwrap();
        assert_eq!(codec().decode_access(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_expired() {
        let codec = codec();
        let token = codec
            .encode(&TokenClaims::Access(access_claims(-5)))
            .unwrap();
        assert_eq!(codec.decode_access(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_variant_under_right_secret_is_malformed() {
        // Same secret for both kinds: only the tag tells them apart
        let secret = JwtSecret::new(b"shared-secret-shared-secret-0001".to_vec());
        let codec = TokenCodec::new(&secret, &secret);
        let token = codec
            .encode(&TokenClaims::Refresh(refresh_claims(3600)))
            .unwrap();
        assert_eq!(codec.decode_access(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_unauthorized_access_claims_are_malformed() {
        let codec = codec();
        let mut claims = access_claims(900);
        claims.authorized = false;
        let token = codec.encode(&TokenClaims::Access(claims)).unwrap();
        assert_eq!(codec.decode_access(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_claims_carry_token_use_tag() {
        let json = serde_json::to_value(TokenClaims::Refresh(refresh_claims(60))).unwrap();
        assert_eq!(json["token_use"], "refresh");
        assert_eq!(json["user_id"], 42);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(codec().decode_refresh("garbage"), Err(TokenError::Malformed));
    }
}
