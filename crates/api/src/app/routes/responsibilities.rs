use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use tenderhub_core::ResponsibilityId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/create", post(create_responsibility))
        .route("/:id", get(get_responsibility))
}

/// Both ends must exist; a dangling organization or user is 404 and a repeated
/// pair is 400.
pub async fn create_responsibility(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateResponsibilityRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_request(e),
    };

    match services
        .engines
        .gate
        .create_responsibility(body.organization_id, body.user_id)
        .await
    {
        Ok(r) => (StatusCode::OK, Json(dto::responsibility_to_json(&r))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_responsibility(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ResponsibilityId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.engines.gate.get_responsibility(id).await {
        Ok(r) => (StatusCode::OK, Json(dto::responsibility_to_json(&r))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
