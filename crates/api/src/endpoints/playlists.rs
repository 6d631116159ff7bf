//! Playlists endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use vv_common::AppResult;
use vv_core::{CreatePlaylistInput, ResolvedEntry, UpdatePlaylistInput};
use vv_db::entities::{playlist, playlist_entry};

use super::{ContentTarget, default_limit};
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

// ==================== Playlists ====================

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePlaylistInput>,
) -> AppResult<ApiResponse<playlist::Model>> {
    let playlist = state.playlist_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(playlist))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistRequest {
    pub playlist_id: String,
    #[serde(flatten)]
    pub input: UpdatePlaylistInput,
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdatePlaylistRequest>,
) -> AppResult<ApiResponse<playlist::Model>> {
    let playlist = state
        .playlist_service
        .update(&user.id, &req.playlist_id, req.input)
        .await?;
    Ok(ApiResponse::ok(playlist))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistIdRequest {
    pub playlist_id: String,
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PlaylistIdRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .playlist_service
        .delete(&user.id, &req.playlist_id)
        .await?;
    Ok(no_content())
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<PlaylistIdRequest>,
) -> AppResult<ApiResponse<playlist::Model>> {
    let playlist = state
        .playlist_service
        .get(&req.playlist_id, viewer.id())
        .await?;
    Ok(ApiResponse::ok(playlist))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUserPlaylistsRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// A user's playlists. Private ones are included only for the owner.
async fn list_user(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListUserPlaylistsRequest>,
) -> AppResult<ApiResponse<Vec<playlist::Model>>> {
    let limit = state.page_limit(req.limit);
    let playlists = state
        .playlist_service
        .list_by_user(&req.user_id, viewer.id(), limit, req.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(playlists))
}

// ==================== Entries ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryRequest {
    pub playlist_id: String,
    #[serde(flatten)]
    pub target: ContentTarget,
}

async fn add_entry(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddEntryRequest>,
) -> AppResult<ApiResponse<playlist_entry::Model>> {
    let entry = state
        .playlist_service
        .add_entry(&user.id, &req.playlist_id, &req.target.to_ref())
        .await?;
    Ok(ApiResponse::ok(entry))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveEntryRequest {
    pub playlist_id: String,
    pub entry_id: String,
}

async fn remove_entry(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RemoveEntryRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .playlist_service
        .remove_entry(&user.id, &req.playlist_id, &req.entry_id)
        .await?;
    Ok(no_content())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesRequest {
    pub playlist_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

async fn entries(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListEntriesRequest>,
) -> AppResult<ApiResponse<Vec<ResolvedEntry>>> {
    let limit = state.page_limit(req.limit);
    let entries = state
        .playlist_service
        .list_entries(&req.playlist_id, viewer.id(), limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(entries))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/list-user", post(list_user))
        .route("/add-entry", post(add_entry))
        .route("/remove-entry", post(remove_entry))
        .route("/entries", post(entries))
}
