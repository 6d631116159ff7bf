//! Comments endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use vv_common::AppResult;
use vv_core::{CreateCommentInput, UpdateCommentInput};
use vv_db::entities::comment;

use super::{ContentTarget, default_limit};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state.comment_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(comment))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub comment_id: String,
    #[serde(flatten)]
    pub input: UpdateCommentInput,
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state
        .comment_service
        .update(&user.id, &req.comment_id, req.input)
        .await?;
    Ok(ApiResponse::ok(comment))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentIdRequest {
    pub comment_id: String,
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .comment_service
        .delete(&user.id, &req.comment_id)
        .await?;
    Ok(no_content())
}

async fn show(
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state.comment_service.get(&req.comment_id).await?;
    Ok(ApiResponse::ok(comment))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListCommentsRequest>,
) -> AppResult<ApiResponse<Vec<comment::Model>>> {
    let limit = state.page_limit(req.limit);
    let comments = state
        .comment_service
        .list_for_target(&req.target.to_ref(), limit, req.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(comments))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/list", post(list))
}
