//! Router assembly.

mod camps;
mod common;

pub use camps::camp_routes;
pub use common::common_routes;

use crate::links::API_BASE;
use crate::openapi::openapi_routes;
use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Full application: common routes at the root, camps and the OpenAPI document under `/api`.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    let api = Router::new()
        .merge(camp_routes(state.clone()))
        .merge(openapi_routes());
    Router::new()
        .merge(common_routes(state))
        .nest(API_BASE, api)
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
}
