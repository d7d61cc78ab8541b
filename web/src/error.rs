//! The HTTP error surface.
//!
//! [`AppError`] is the one error type handlers return. It maps domain
//! failures onto status codes and renders every error as a
//! `{code, message}` JSON body with a stable, client-switchable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use the_knife_core::DomainError;

/// Error carried by every fallible handler.
///
/// Handlers mostly rely on the `From<DomainError>` conversion and `?`:
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Client>, AppError> {
///     let client = state.clients.get(&id).await?;
///     Ok(Json(client))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status of the response.
    status: StatusCode,
    /// Message shown to the caller.
    message: String,
    /// Stable code clients can match on.
    code: String,
    /// Underlying cause, logged but never serialized.
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Assemble an error from status, message, and code.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach the underlying cause for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// 404 for a reference that resolves to nothing.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// 409 when the request collides with existing state.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            message.into(),
            "CONFLICT".to_string(),
        )
    }

    /// 412 when the target exists but is in the wrong state.
    #[must_use]
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PRECONDITION_FAILED,
            message.into(),
            "PRECONDITION_FAILED".to_string(),
        )
    }

    /// 422 for input that fails domain validation.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// 500 for a storage failure.
    ///
    /// The detail goes to the log via the error source; the response
    /// body carries a generic message.
    #[must_use]
    pub fn store(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "A storage error occurred".to_string(),
            "STORE_ERROR".to_string(),
        )
        .with_source(anyhow::anyhow!(detail.into()))
    }

    /// 500 with a caller-visible message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Serialized shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Stable code clients can match on.
    code: String,
    /// Text shown to the caller.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Server errors hit the log with their cause; caller errors do not
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Request failed"
                ),
            }
        }

        let body = ErrorBody {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Blanket conversion for unexpected failures.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("Unexpected internal error").with_source(err)
    }
}

/// Convert domain errors into their HTTP form.
///
/// Caller errors keep their message; storage failures collapse to a
/// generic 500 with the detail preserved for logging.
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(message) => Self::validation(message),
            DomainError::NotFound { entity, id } => Self::not_found(entity, id),
            DomainError::Precondition(message) => Self::precondition_failed(message),
            DomainError::Conflict(message) => Self::conflict(message),
            DomainError::Store(message) => Self::store(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = AppError::validation("Invalid input");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] Invalid input");
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("client", "04821733Z");
        assert_eq!(err.to_string(), "[NOT_FOUND] client 04821733Z not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_precondition_failed() {
        let err = AppError::precondition_failed("reservation is cancelled");
        assert_eq!(err.status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(err.code, "PRECONDITION_FAILED");
    }

    #[test]
    fn test_domain_validation_maps_to_422() {
        let err = AppError::from(DomainError::validation("party size must be positive"));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.message, "party size must be positive");
    }

    #[test]
    fn test_domain_not_found_maps_to_404() {
        let err = AppError::from(DomainError::not_found("restaurant", "R999"));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "NOT_FOUND");
    }

    #[test]
    fn test_domain_store_hides_detail() {
        let err = AppError::from(DomainError::Store("connection reset".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "STORE_ERROR");
        assert_eq!(err.message, "A storage error occurred");
    }
}
