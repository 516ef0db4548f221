//! Conversions between [`AppError`] and framework types.

use super::app_error::AppError;
#[cfg(feature = "axum")]
use super::kind::ErrorKind;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() {
            AppError::bad_request(format!("JSON parse error: {err}")).with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// SQLx (feature-gated)
// ============================================================================

/// Whether a database failure is transient: the store could not be reached
/// in time, as opposed to rejecting the statement.
#[cfg(feature = "sqlx")]
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            // Class 53 (insufficient resources) and 57 (operator intervention)
            .is_some_and(|code| code.starts_with("53") || code.starts_with("57")),
        _ => false,
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if is_transient(&err) {
            return AppError::service_unavailable("Database unavailable")
                .with_code("STORE_UNAVAILABLE")
                .with_source(err);
        }
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found").with_source(err),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Duplicate key value").with_source(err)
            }
            _ => AppError::internal("Database error").with_source(err),
        }
    }
}

// ============================================================================
// Axum (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let detail = if self.kind().is_server_error() {
            ErrorKind::InternalServerError.as_str().to_owned()
        } else {
            self.message().to_owned()
        };

        // RFC 7807 Problem Details
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": detail,
            "code": self.code(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let app_err: AppError = json_err.into();
        assert_eq!(app_err.status_code(), 400);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_pool_timeout_is_transient() {
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
        assert!(!is_transient(&sqlx::Error::RowNotFound));

        let app_err: AppError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(app_err.status_code(), 503);
        assert_eq!(app_err.code(), Some("STORE_UNAVAILABLE"));
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_server_error_detail_is_generic() {
        use axum::response::IntoResponse;

        let response = AppError::internal("relation \"auth_tokens\" does not exist").into_response();
        assert_eq!(response.status(), 500);
    }
}
