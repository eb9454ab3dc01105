use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tenderhub_core::{DomainError, EntityKind};

/// Map a domain failure to its HTTP response.
///
/// Storage diagnostics are logged here and never reach the client.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.public_message();
    match err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        DomainError::AlreadyExists(_) => json_error(StatusCode::BAD_REQUEST, "already_exists", message),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
        DomainError::Storage { operation, message: detail } => {
            tracing::error!(operation, error = %detail, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
        }
    }
}

/// Failures while resolving the acting user. An unknown username is 401.
pub fn requester_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound(EntityKind::User) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "User not found")
        }
        other => domain_error_to_response(other),
    }
}

/// Malformed body, query string or path parameter.
pub fn invalid_request(detail: impl std::fmt::Display) -> axum::response::Response {
    tracing::debug!(%detail, "rejected request");
    json_error(StatusCode::BAD_REQUEST, "invalid_request", "Invalid request")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
