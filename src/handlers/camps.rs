//! Camp handlers: list, read, search by date, create, update, delete.

use crate::error::AppError;
use crate::mapping::{MapInto, MapOnto};
use crate::model::{parse_event_date, Camp, CampModel};
use crate::repository::ChangeSet;
use crate::response;
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeTalks {
    #[serde(default, deserialize_with = "de_flag")]
    pub include_talks: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub the_date: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub include_talks: bool,
}

/// Query flags accept `true`/`false` in any letter case.
fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(de::Error::custom(format!("'{}' is not a boolean", raw))),
    }
}

fn camp_body(body: Result<Json<Value>, JsonRejection>) -> Result<CampModel, AppError> {
    let Json(value) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    RequestValidator::camp_model(value)
}

#[utoipa::path(
    get,
    path = "/api/camps",
    params(("includeTalks" = Option<bool>, Query, description = "Populate each camp's talks")),
    responses(
        (status = 200, description = "All camps", body = [CampModel]),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_camps(
    State(state): State<AppState>,
    Query(params): Query<IncludeTalks>,
) -> Result<impl IntoResponse, AppError> {
    let camps = state.repo.all_camps(params.include_talks).await?;
    Ok(response::ok(state.profile.camp_models(&camps)))
}

#[utoipa::path(
    get,
    path = "/api/camps/{moniker}",
    params(
        ("moniker" = String, Path, description = "Camp moniker"),
        ("includeTalks" = Option<bool>, Query, description = "Populate the camp's talks")
    ),
    responses(
        (status = 200, description = "The camp", body = CampModel),
        (status = 404, description = "Unknown moniker"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn get_camp(
    State(state): State<AppState>,
    Path(moniker): Path<String>,
    Query(params): Query<IncludeTalks>,
) -> Result<impl IntoResponse, AppError> {
    let camp = state
        .repo
        .camp_by_moniker(&moniker, params.include_talks)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("camp {}", moniker)))?;
    Ok(response::ok(state.profile.camp_model(&camp)))
}

#[utoipa::path(
    get,
    path = "/api/camps/search",
    params(
        ("theDate" = String, Query, description = "Event date, YYYY-MM-DD or ISO date-time; the time is ignored"),
        ("includeTalks" = Option<bool>, Query, description = "Populate each camp's talks")
    ),
    responses(
        (status = 200, description = "Camps on that date", body = [CampModel]),
        (status = 400, description = "Missing or malformed date"),
        (status = 404, description = "No camp on that date"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn search_camps(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let raw = params
        .the_date
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("theDate is required".into()))?;
    let date = parse_event_date(raw)
        .ok_or_else(|| AppError::BadRequest(format!("theDate '{}' is not a date", raw)))?
        .date();
    let camps = state.repo.camps_by_event_date(date, params.include_talks).await?;
    if camps.is_empty() {
        return Err(AppError::NotFound(format!("no camps on {}", date)));
    }
    Ok(response::ok(state.profile.camp_models(&camps)))
}

#[utoipa::path(
    post,
    path = "/api/camps",
    request_body = CampModel,
    responses(
        (status = 201, description = "Camp created", body = CampModel),
        (status = 400, description = "Invalid payload, duplicate or unroutable moniker, or nothing saved"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn create_camp(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let model = camp_body(body)?;

    if state.repo.camp_by_moniker(&model.moniker, false).await?.is_some() {
        return Err(AppError::Conflict(format!("moniker {} is already in use", model.moniker)));
    }

    let location = state
        .links
        .camp_path(&model.moniker)
        .ok_or_else(|| AppError::BadRequest(format!("moniker {} cannot be used in a resource path", model.moniker)))?;

    let camp: Camp = state.profile.map(&model);
    let mut changes = ChangeSet::new();
    changes.add(camp);
    if !state.repo.save_changes(&mut changes).await? {
        return Err(AppError::BadRequest("camp was not saved".into()));
    }
    let saved = changes
        .first_camp()
        .ok_or_else(|| AppError::Internal("committed change set is empty".into()))?;
    tracing::info!(moniker = %saved.moniker, camp_id = saved.camp_id, "camp created");
    Ok(response::created(&location, state.profile.camp_model(saved)))
}

#[utoipa::path(
    put,
    path = "/api/camps/{moniker}",
    params(("moniker" = String, Path, description = "Camp moniker")),
    request_body = CampModel,
    responses(
        (status = 200, description = "Camp updated", body = CampModel),
        (status = 400, description = "Invalid payload, duplicate or unroutable moniker, or nothing saved"),
        (status = 404, description = "Unknown moniker"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn update_camp(
    State(state): State<AppState>,
    Path(moniker): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let model = camp_body(body)?;
    let existing = state
        .repo
        .camp_by_moniker(&moniker, false)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("camp {}", moniker)))?;

    if model.moniker != moniker && state.links.camp_path(&model.moniker).is_none() {
        return Err(AppError::BadRequest(format!(
            "moniker {} cannot be used in a resource path",
            model.moniker
        )));
    }

    let mut updated = existing.clone();
    state.profile.map_onto(&model, &mut updated);
    let mut changes = ChangeSet::new();
    changes.update(&existing, updated);
    if !state.repo.save_changes(&mut changes).await? {
        return Err(AppError::BadRequest("camp was not changed".into()));
    }
    let saved = changes
        .first_camp()
        .ok_or_else(|| AppError::Internal("committed change set is empty".into()))?;
    tracing::info!(moniker = %moniker, camp_id = saved.camp_id, "camp updated");
    Ok(response::ok(state.profile.camp_model(saved)))
}

#[utoipa::path(
    delete,
    path = "/api/camps/{moniker}",
    params(("moniker" = String, Path, description = "Camp moniker")),
    responses(
        (status = 200, description = "Camp deleted"),
        (status = 400, description = "Nothing deleted"),
        (status = 404, description = "Unknown moniker"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn delete_camp(
    State(state): State<AppState>,
    Path(moniker): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let existing = state
        .repo
        .camp_by_moniker(&moniker, false)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("camp {}", moniker)))?;

    let mut changes = ChangeSet::new();
    changes.delete(existing);
    if !state.repo.save_changes(&mut changes).await? {
        return Err(AppError::BadRequest("camp was not deleted".into()));
    }
    tracing::info!(moniker = %moniker, "camp deleted");
    Ok(response::ok_empty())
}
