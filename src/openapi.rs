//! OpenAPI document for the camp API.

use crate::handlers;
use crate::model::{CampModel, SpeakerModel, TalkModel};
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::camps::list_camps,
        handlers::camps::get_camp,
        handlers::camps::search_camps,
        handlers::camps::create_camp,
        handlers::camps::update_camp,
        handlers::camps::delete_camp,
        handlers::talks::list_talks,
        handlers::talks::get_talk,
    ),
    components(schemas(CampModel, TalkModel, SpeakerModel)),
    tags((name = "camps", description = "Code camps and their talks"))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /openapi.json
pub fn openapi_routes() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}
