//! TV record routes.
//!
//! - GET /tv - List the caller's records (paginate | search | filter)
//! - POST /tv - Create a record
//! - GET /tv/{id} - Read one record
//! - PUT /tv/{id} - Replace a record (optimistic concurrency on `version`)
//! - DELETE /tv/{id} - Delete a record

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use catalog_core::{QueryPage, QueryParams, Tv, TvDraft, TvId};

use crate::error::ApiResult;
use crate::extract::CallerIdentity;
use crate::state::AppState;

/// GET /tv
///
/// # Response
///
/// - 200 OK: `{ "items": [...], "totalPages": n }`
/// - 400 Bad Request: unparsable `startDate` / `endDate`
async fn list_tvs(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<QueryPage<Tv>>> {
    let page = state.service().get_all(&caller, &params).await?;
    Ok(Json(page))
}

/// GET /tv/{id}
///
/// - 200 OK: the record
/// - 403 Forbidden: owned by someone else
/// - 404 Not Found: no such record
async fn get_tv(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    id: Result<Path<TvId>, PathRejection>,
) -> ApiResult<Json<Tv>> {
    let Path(id) = id?;
    let tv = state.service().get_by_id(&caller, id).await?;
    Ok(Json(tv))
}

/// POST /tv
///
/// - 201 Created: the stored record with `id` and `version: 1`
/// - 400 Bad Request: missing or invalid fields
async fn create_tv(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    body: Result<Json<TvDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tv>)> {
    let Json(draft) = body?;
    let tv = state.service().create(&caller, &draft).await?;
    Ok((StatusCode::CREATED, Json(tv)))
}

/// PUT /tv/{id}
///
/// Body is a full record; `version` is the version the client last read.
///
/// - 200 OK: the record with its new version
/// - 400 Bad Request: invalid fields, id mismatch, stale write, or
///   `{ "versionError": true, ... }` on a version conflict
/// - 403 / 404 as for GET
async fn update_tv(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    id: Result<Path<TvId>, PathRejection>,
    body: Result<Json<TvDraft>, JsonRejection>,
) -> ApiResult<Json<Tv>> {
    let Path(id) = id?;
    let Json(draft) = body?;
    let tv = state.service().update(&caller, id, &draft).await?;
    Ok(Json(tv))
}

/// DELETE /tv/{id}
///
/// - 204 No Content
/// - 403 / 404 as for GET
async fn delete_tv(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    id: Result<Path<TvId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.service().remove(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build record routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tv", get(list_tvs).post(create_tv))
        .route("/tv/{id}", get(get_tv).put(update_tv).delete(delete_tv))
}
