//! Friendship endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use vv_common::AppResult;
use vv_core::{FriendshipListing, SendFriendRequestInput};
use vv_db::entities::friendship;

use super::default_limit;
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipIdRequest {
    pub friendship_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFriendshipsRequest {
    pub kind: FriendshipListing,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

async fn request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SendFriendRequestInput>,
) -> AppResult<ApiResponse<friendship::Model>> {
    let created = state.friendship_service.request(&user.id, input).await?;
    Ok(ApiResponse::ok(created))
}

async fn accept(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FriendshipIdRequest>,
) -> AppResult<ApiResponse<friendship::Model>> {
    let updated = state
        .friendship_service
        .accept(&user.id, &req.friendship_id)
        .await?;
    Ok(ApiResponse::ok(updated))
}

async fn reject(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FriendshipIdRequest>,
) -> AppResult<ApiResponse<friendship::Model>> {
    let updated = state
        .friendship_service
        .reject(&user.id, &req.friendship_id)
        .await?;
    Ok(ApiResponse::ok(updated))
}

/// Withdraw a request or unfriend.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FriendshipIdRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .friendship_service
        .delete(&user.id, &req.friendship_id)
        .await?;
    Ok(no_content())
}

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListFriendshipsRequest>,
) -> AppResult<ApiResponse<Vec<friendship::Model>>> {
    let limit = state.page_limit(req.limit);
    let rows = state
        .friendship_service
        .list(&user.id, req.kind, limit)
        .await?;
    Ok(ApiResponse::ok(rows))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(request))
        .route("/accept", post(accept))
        .route("/reject", post(reject))
        .route("/delete", post(delete))
        .route("/list", post(list))
}
