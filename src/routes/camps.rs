//! Camp routes, mounted under [`crate::links::API_BASE`].
//! `/camps/search` is a static segment and wins over `/camps/:moniker`.

use crate::handlers::{create_camp, delete_camp, get_camp, get_talk, list_camps, list_talks, search_camps, update_camp};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn camp_routes(state: AppState) -> Router {
    Router::new()
        .route("/camps", get(list_camps).post(create_camp))
        .route("/camps/search", get(search_camps))
        .route(
            "/camps/:moniker",
            get(get_camp).put(update_camp).delete(delete_camp),
        )
        .route("/camps/:moniker/talks", get(list_talks))
        .route("/camps/:moniker/talks/:id", get(get_talk))
        .with_state(state)
}
