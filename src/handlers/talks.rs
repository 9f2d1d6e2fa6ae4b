//! Read-only talk handlers nested under a camp.

use crate::error::AppError;
use crate::model::{Camp, TalkModel};
use crate::response;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

async fn camp_with_talks(state: &AppState, moniker: &str) -> Result<Camp, AppError> {
    state
        .repo
        .camp_by_moniker(moniker, true)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("camp {}", moniker)))
}

#[utoipa::path(
    get,
    path = "/api/camps/{moniker}/talks",
    params(("moniker" = String, Path, description = "Camp moniker")),
    responses(
        (status = 200, description = "Talks of the camp", body = [TalkModel]),
        (status = 404, description = "Unknown moniker"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_talks(
    State(state): State<AppState>,
    Path(moniker): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let camp = camp_with_talks(&state, &moniker).await?;
    let talks: Vec<TalkModel> = camp.talks.iter().map(|t| state.profile.talk_model(t)).collect();
    Ok(response::ok(talks))
}

#[utoipa::path(
    get,
    path = "/api/camps/{moniker}/talks/{id}",
    params(
        ("moniker" = String, Path, description = "Camp moniker"),
        ("id" = i32, Path, description = "Talk id")
    ),
    responses(
        (status = 200, description = "The talk", body = TalkModel),
        (status = 404, description = "Unknown moniker or talk"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn get_talk(
    State(state): State<AppState>,
    Path((moniker, id)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let camp = camp_with_talks(&state, &moniker).await?;
    let talk = camp
        .talks
        .iter()
        .find(|t| t.talk_id == id)
        .ok_or_else(|| AppError::NotFound(format!("talk {} of camp {}", id, moniker)))?;
    Ok(response::ok(state.profile.talk_model(talk)))
}
