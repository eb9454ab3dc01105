use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use tenderhub_core::TenderId;

use crate::app::routes::requester;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tenders))
        .route("/new", post(create_tender))
        .route("/my", get(list_my_tenders))
        .route("/:id/status", get(get_tender_status).put(set_tender_status))
        .route("/:id/edit", patch(edit_tender))
}

/// The creator must be responsible for the organization the tender is filed under.
pub async fn create_tender(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateTenderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_request(e),
    };

    let user = match requester(&services, &body.creator_username).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    if let Err(e) = services
        .engines
        .gate
        .assert_responsible(body.organization_id, user.id)
        .await
    {
        return errors::domain_error_to_response(e);
    }

    match services.engines.tenders.create(body.into()).await {
        Ok(tender) => (StatusCode::OK, Json(dto::tender_to_json(&tender))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_tenders(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> axum::response::Response {
    let Query(pairs) = match query {
        Ok(q) => q,
        Err(e) => return errors::invalid_request(e),
    };
    let query = match dto::ListTendersQuery::from_pairs(pairs) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    match services
        .engines
        .tenders
        .list_by_type(&query.service_types, query.page)
        .await
    {
        Ok(tenders) => tenders_response(&tenders),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_my_tenders(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::RequesterPageQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::invalid_request(e),
    };
    let user = match requester(&services, &query.username).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match services.engines.tenders.list_mine(&user.username, query.page()).await {
        Ok(tenders) => tenders_response(&tenders),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_tender_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::RequesterQuery>, QueryRejection>,
) -> axum::response::Response {
    let id: TenderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::invalid_request(e),
    };
    let user = match requester(&services, &query.username).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match services.engines.tenders.get_status(id, user.id).await {
        Ok(status) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": status.as_str() })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_tender_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::SetStatusQuery>, QueryRejection>,
) -> axum::response::Response {
    let id: TenderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::invalid_request(e),
    };
    let user = match requester(&services, &query.username).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match services.engines.tenders.set_status(id, query.status, user.id).await {
        Ok(tender) => (StatusCode::OK, Json(dto::tender_to_json(&tender))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn edit_tender(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::RequesterQuery>, QueryRejection>,
    body: Result<Json<dto::EditTenderRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: TenderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::invalid_request(e),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_request(e),
    };
    let user = match requester(&services, &query.username).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match services.engines.tenders.edit_as(id, body.into(), user.id).await {
        Ok(tender) => (StatusCode::OK, Json(dto::tender_to_json(&tender))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn tenders_response(tenders: &[tenderhub_tenders::Tender]) -> axum::response::Response {
    let items = tenders.iter().map(dto::tender_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::Value::Array(items))).into_response()
}
