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

use tenderhub_bids::{Bid, BidAuthor};
use tenderhub_core::{BidId, TenderId};

use crate::app::routes::requester;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/new", post(create_bid))
        .route("/my", get(list_my_bids))
        .route("/:id/list", get(list_tender_bids))
        .route("/:id/status", get(get_bid_status).put(set_bid_status))
        .route("/:id/edit", patch(edit_bid))
}

pub async fn create_bid(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateBidRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_request(e),
    };
    let input: tenderhub_bids::NewBid = body.into();

    let author_check = match input.author {
        BidAuthor::User(user_id) => services
            .engines
            .identity
            .get_user_by_id(user_id)
            .await
            .map(|_| ())
            .map_err(errors::requester_error_to_response),
        BidAuthor::Organization(org_id) => services
            .engines
            .organizations
            .get_organization_by_id(org_id)
            .await
            .map(|_| ())
            .map_err(errors::domain_error_to_response),
    };
    if let Err(resp) = author_check {
        return resp;
    }

    match services.engines.bids.create(input).await {
        Ok(bid) => (StatusCode::OK, Json(dto::bid_to_json(&bid))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_my_bids(
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

    match services.engines.bids.list_mine(user.id, query.page()).await {
        Ok(bids) => bids_response(&bids),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// The requester's bids on one tender; `:id` is the tender id.
pub async fn list_tender_bids(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::RequesterPageQuery>, QueryRejection>,
) -> axum::response::Response {
    let tender_id: TenderId = match id.parse() {
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

    match services
        .engines
        .bids
        .get_by_tender_id(tender_id, user.id, query.page())
        .await
    {
        Ok(bids) => bids_response(&bids),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_bid_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::RequesterQuery>, QueryRejection>,
) -> axum::response::Response {
    let id: BidId = match id.parse() {
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

    match services.engines.bids.get_status(id, user.id).await {
        Ok(status) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": status.as_str() })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_bid_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::SetStatusQuery>, QueryRejection>,
) -> axum::response::Response {
    let id: BidId = match id.parse() {
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

    match services.engines.bids.set_status(id, query.status, user.id).await {
        Ok(bid) => (StatusCode::OK, Json(dto::bid_to_json(&bid))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn edit_bid(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::RequesterQuery>, QueryRejection>,
    body: Result<Json<dto::EditBidRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: BidId = match id.parse() {
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

    match services.engines.bids.edit_as(id, body.into(), user.id).await {
        Ok(bid) => (StatusCode::OK, Json(dto::bid_to_json(&bid))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn bids_response(bids: &[Bid]) -> axum::response::Response {
    let items = bids.iter().map(dto::bid_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::Value::Array(items))).into_response()
}
