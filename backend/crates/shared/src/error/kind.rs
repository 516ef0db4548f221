//! Error classification shared by every crate.

use serde::Serialize;

/// Coarse error category, mapped one-to-one onto an HTTP status code.
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
/// assert_eq!(ErrorKind::Unauthorized.as_str(), "Unauthorized");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400
    BadRequest,
    /// 401 - missing, invalid, expired or revoked credentials
    Unauthorized,
    /// 403 - authenticated but not allowed
    Forbidden,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 500
    InternalServerError,
    /// 503 - transient backend failure, safe for the client to retry
    ServiceUnavailable,
}

impl ErrorKind {
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// Standard reason phrase for the status code.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 5xx errors. Their details must never reach the client.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::InternalServerError.status_code(), 500);
        assert_eq!(ErrorKind::ServiceUnavailable.status_code(), 503);
    }

    #[test]
    fn test_server_and_client_classes() {
        assert!(ErrorKind::ServiceUnavailable.is_server_error());
        assert!(!ErrorKind::ServiceUnavailable.is_client_error());
        assert!(ErrorKind::Forbidden.is_client_error());
        assert!(!ErrorKind::Forbidden.is_server_error());
    }

    #[test]
    fn test_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ServiceUnavailable).unwrap();
        assert_eq!(json, "\"SERVICE_UNAVAILABLE\"");
    }
}
