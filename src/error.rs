// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::models::participant::ParticipantError;
use crate::supabase::identity::IdentityError;
use crate::supabase::SupabaseError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (hosted service issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert hosted-service and domain error types to ApiError
impl From<SupabaseError> for ApiError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::NotFound => ApiError::not_found("record not found"),
            SupabaseError::Upstream { status, message } => {
                tracing::error!("hosted database rejected request ({}): {}", status, message);
                ApiError::bad_gateway(message)
            }
            SupabaseError::Transport(e) => {
                tracing::error!("hosted service unreachable: {}", e);
                ApiError::bad_gateway("hosted service unreachable")
            }
            SupabaseError::InvalidUrl(e) => {
                tracing::error!("invalid hosted service url: {}", e);
                ApiError::internal_server_error("service misconfigured")
            }
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Unauthorized => ApiError::unauthorized("bearer token rejected"),
            IdentityError::Rejected { status, message } => {
                tracing::error!("identity provider rejected request ({}): {}", status, message);
                ApiError::bad_gateway(message)
            }
            IdentityError::Transport(e) => {
                tracing::error!("identity provider unreachable: {}", e);
                ApiError::bad_gateway("identity provider unreachable")
            }
            IdentityError::InvalidUrl(e) => {
                tracing::error!("invalid identity provider url: {}", e);
                ApiError::internal_server_error("service misconfigured")
            }
        }
    }
}

impl From<ParticipantError> for ApiError {
    fn from(err: ParticipantError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<crate::agora::RtcTokenError> for ApiError {
    fn from(err: crate::agora::RtcTokenError) -> Self {
        tracing::error!("video token signing failed: {}", err);
        ApiError::internal_server_error("failed to issue video token")
    }
}

impl From<crate::services::session_service::SessionError> for ApiError {
    fn from(err: crate::services::session_service::SessionError) -> Self {
        use crate::services::session_service::SessionError::*;
        match err {
            Supabase(inner) => inner.into(),
            NotAssigned => ApiError::forbidden(err.to_string()),
            PractitionerOffline(_) | PractitionerBusy | NotWaiting => {
                ApiError::conflict(err.to_string())
            }
            NotFound(_) | PractitionerNotFound(_) | ChannelNotFound | NotParticipant => {
                ApiError::not_found(err.to_string())
            }
        }
    }
}

impl From<crate::services::profile_service::ProfileError> for ApiError {
    fn from(err: crate::services::profile_service::ProfileError) -> Self {
        use crate::services::profile_service::ProfileError::*;
        match err {
            EmailTaken(message) => ApiError::conflict(message),
            InvalidCredentials => ApiError::unauthorized("invalid credentials"),
            NotFound(_) => ApiError::not_found(err.to_string()),
            EmptyPatch => ApiError::bad_request(err.to_string()),
            UnexpectedIdentityResponse => {
                tracing::error!("identity provider returned an unexpected response shape");
                ApiError::bad_gateway(err.to_string())
            }
            Identity(inner) => inner.into(),
            Supabase(inner) => inner.into(),
        }
    }
}

impl From<crate::services::practitioner_service::PractitionerError> for ApiError {
    fn from(err: crate::services::practitioner_service::PractitionerError) -> Self {
        use crate::services::practitioner_service::PractitionerError::*;
        match err {
            NotFound(_) => ApiError::not_found(err.to_string()),
            NotPractitioner => ApiError::forbidden(err.to_string()),
            Supabase(inner) => inner.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
