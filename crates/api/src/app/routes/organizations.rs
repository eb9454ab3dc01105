use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use tenderhub_core::OrganizationId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/create", post(create_organization))
        .route("/:id", get(get_organization))
}

pub async fn create_organization(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateOrganizationRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_request(e),
    };

    match services.engines.organizations.create_organization(body.into()).await {
        Ok(org) => (StatusCode::OK, Json(dto::organization_to_json(&org))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrganizationId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.engines.organizations.get_organization_by_id(id).await {
        Ok(org) => (StatusCode::OK, Json(dto::organization_to_json(&org))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
