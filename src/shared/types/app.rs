use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Serialize)]
pub struct Response {
    pub success: bool,
    pub message: String
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>
}

/// One rejected input field
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> FieldError {
        FieldError { field, message: message.into() }
    }
}

/// Error returned by every route. Renders as a JSON body with
/// `success: false`; internal details only ever reach the log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}: {} invalid field(s)", .errors.len())]
    Validation { message: &'static str, errors: Vec<FieldError> },

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{message}: {detail}")]
    Internal { message: &'static str, detail: String }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation { message, errors } => ErrorResponse {
                success: false,
                message: message.to_string(),
                errors: errors.clone()
            },
            ApiError::NotFound(message) => ErrorResponse {
                success: false,
                message: message.to_string(),
                errors: Vec::new()
            },
            ApiError::Internal { message, detail } => {
                log::error!("{}: {}", message, detail);
                ErrorResponse {
                    success: false,
                    message: message.to_string(),
                    errors: Vec::new()
                }
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
