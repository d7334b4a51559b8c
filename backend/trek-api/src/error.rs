/// Error types for the trek API.
///
/// Every failure is mapped at the actix boundary to an HTTP status plus a
/// JSON `{"error": message}` body, which the mobile client surfaces verbatim.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for trek-api operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input fields
    #[error("{0}")]
    Validation(String),

    /// Referenced post/group/user does not exist
    #[error("{0}")]
    NotFound(String),

    /// Duplicate state change (already a member, email already registered)
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid session
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (non-creator delete)
    #[error("{0}")]
    Forbidden(String),

    /// Database operation failed
    #[error("Server error")]
    Database(#[source] sqlx::Error),

    /// Session store operation failed
    #[error("Server error")]
    Session(#[source] redis::RedisError),

    /// Anything else unexpected
    #[error("Server error")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // The client contract maps duplicate joins to 400, not 409.
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Session(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Database(err) = self {
            tracing::error!("database failure: {}", err);
        }
        if let AppError::Session(err) = self {
            tracing::error!("session store failure: {}", err);
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Session(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_client_contract() {
        assert_eq!(
            AppError::Validation("All fields are required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("You are already in this group".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("Post not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("Not logged in".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("Only the post creator can delete this post".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        assert_eq!(
            AppError::Internal("pool exhausted at 10.0.0.3".into()).to_string(),
            "Server error"
        );
    }

    #[test]
    fn response_body_is_an_error_object() {
        let resp = AppError::NotFound("Post not found".into()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = actix_web::body::to_bytes(resp.into_body());
        let bytes = futures::executor::block_on(body).expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["error"], "Post not found");
    }
}
