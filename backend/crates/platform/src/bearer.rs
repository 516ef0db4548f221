//! `Authorization: Bearer` extraction

use axum::http::{HeaderMap, header};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BearerError {
    #[error("Authorization header is missing")]
    Missing,

    #[error("Authorization header is not a bearer credential")]
    Malformed,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively (RFC 7235). Anything other than
/// exactly one scheme and one non-empty token is `Malformed`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(BearerError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer abc.def.ghi")),
            Ok("abc.def.ghi")
        );
        assert_eq!(extract_bearer_token(&headers_with("bearer xyz")), Ok("xyz"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            extract_bearer_token(&HeaderMap::new()),
            Err(BearerError::Missing)
        );
    }

    #[test]
    fn test_malformed_header() {
        for value in ["Bearer", "Basic dXNlcjpwYXNz", "Bearer a b", "abc.def.ghi", ""] {
            assert_eq!(
                extract_bearer_token(&headers_with(value)),
                Err(BearerError::Malformed),
                "{value:?}"
            );
        }
    }
}
