//! HTTP response handling for errors

use super::types::{ErrorKind, WardenError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for WardenError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::AuthenticationFailure => StatusCode::UNAUTHORIZED,
            ErrorKind::AuthorizationDenied => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Invalid => StatusCode::BAD_REQUEST,
            ErrorKind::DependencyFailure => StatusCode::BAD_GATEWAY,
            ErrorKind::Exhaustion => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            WardenError::Database(_) => ("DATABASE_ERROR", "Database operation failed".to_string()),
            WardenError::Redis(_) | WardenError::Cache(_) => {
                ("CACHE_ERROR", "Cache operation failed".to_string())
            }
            WardenError::Engine(_) => ("ENGINE_ERROR", "Policy engine operation failed".to_string()),
            WardenError::Directory(_) => {
                ("DIRECTORY_ERROR", "Directory operation failed".to_string())
            }
            WardenError::Unauthorized(_) | WardenError::Jwt(_) => {
                ("AUTH_ERROR", "authentication failed".to_string())
            }
            WardenError::Forbidden(_) => ("FORBIDDEN", "permission denied".to_string()),
            WardenError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            WardenError::Conflict(_) => ("CONFLICT", self.to_string()),
            WardenError::Validation(_) => ("VALIDATION_ERROR", self.to_string()),
            WardenError::Exhaustion(_) => ("EXHAUSTED", self.to_string()),
            _ => ("INTERNAL_ERROR", "Internal server error".to_string()),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(self.status_code()).json(error_response)
    }
}

/// Standard error response format
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}
