use axum::{routing::get, Router};

pub mod bids;
pub mod organizations;
pub mod responsibilities;
pub mod system;
pub mod tenders;
pub mod users;

/// Router for every endpoint under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/ping", get(system::ping))
        .nest("/user", users::router())
        .nest("/org", organizations::router())
        .nest("/orgresp", responsibilities::router())
        .nest("/tenders", tenders::router())
        .nest("/bids", bids::router())
}

/// Resolve `username` to a user, or answer 401 when it is unknown.
pub(crate) async fn requester(
    services: &crate::app::services::AppServices,
    username: &str,
) -> Result<tenderhub_auth::User, axum::response::Response> {
    services
        .requester(username)
        .await
        .map_err(crate::app::errors::requester_error_to_response)
}
