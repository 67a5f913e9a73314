// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuraError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Authorization required")]
    AuthRequired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Add at least {required} wardrobe items to receive VIP looks (found {found})")]
    InsufficientInput { required: usize, found: usize },

    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Too many requests. Try again in a few seconds.")]
    RateLimited,

    #[error("AI credits exhausted.")]
    QuotaExceeded,

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuraError {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AuraError::Decode(_) => "decode_error",
            AuraError::Encode(_) => "encode_error",
            AuraError::AuthRequired => "auth_required",
            AuraError::Unauthorized => "unauthorized",
            AuraError::InsufficientInput { .. } => "insufficient_wardrobe",
            AuraError::ServiceUnavailable(_) => "service_unavailable",
            AuraError::RateLimited => "rate_limited",
            AuraError::QuotaExceeded => "quota_exceeded",
            AuraError::MalformedResponse(_) => "malformed_response",
            AuraError::Validation(_) => "validation_error",
            AuraError::Redis(_) => "storage_error",
            AuraError::Serialization(_) => "serialization_error",
            AuraError::Configuration(_) => "configuration_error",
        }
    }
}

impl ResponseError for AuraError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuraError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuraError::AuthRequired | AuraError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuraError::InsufficientInput { .. } | AuraError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AuraError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuraError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuraError::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            AuraError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AuraError::Encode(_)
            | AuraError::Redis(_)
            | AuraError::Serialization(_)
            | AuraError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string()
        }))
    }
}
