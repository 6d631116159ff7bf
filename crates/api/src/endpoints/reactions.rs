//! Reactions endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};
use vv_common::AppResult;
use vv_core::ReactionTally;
use vv_db::entities::reaction;

use super::{ContentTarget, default_limit};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Reaction response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub posted_by: Option<String>,
    pub content_type: String,
    pub content_id: String,
    pub is_like: bool,
}

impl From<reaction::Model> for ReactionResponse {
    fn from(r: reaction::Model) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.map(|t| t.to_rfc3339()),
            posted_by: r.posted_by,
            content_type: r.content_type,
            content_id: r.content_id,
            is_like: r.is_like,
        }
    }
}

/// React to content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReactionRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    pub is_like: bool,
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReactionRequest>,
) -> AppResult<ApiResponse<ReactionResponse>> {
    let reaction = state
        .reaction_service
        .create(&user.id, &req.target.to_ref(), req.is_like)
        .await?;
    Ok(ApiResponse::ok(reaction.into()))
}

/// Create or change the caller's reaction on content.
async fn set(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReactionRequest>,
) -> AppResult<ApiResponse<ReactionResponse>> {
    let reaction = state
        .reaction_service
        .set(&user.id, &req.target.to_ref(), req.is_like)
        .await?;
    Ok(ApiResponse::ok(reaction.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReactionRequest {
    pub reaction_id: String,
    pub is_like: bool,
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateReactionRequest>,
) -> AppResult<ApiResponse<ReactionResponse>> {
    let reaction = state
        .reaction_service
        .update(&user.id, &req.reaction_id, req.is_like)
        .await?;
    Ok(ApiResponse::ok(reaction.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionIdRequest {
    pub reaction_id: String,
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReactionIdRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .reaction_service
        .delete(&user.id, &req.reaction_id)
        .await?;
    Ok(no_content())
}

async fn show(
    State(state): State<AppState>,
    Json(req): Json<ReactionIdRequest>,
) -> AppResult<ApiResponse<ReactionResponse>> {
    let reaction = state.reaction_service.get(&req.reaction_id).await?;
    Ok(ApiResponse::ok(reaction.into()))
}

/// List reactions on content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReactionsRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListReactionsRequest>,
) -> AppResult<ApiResponse<Vec<ReactionResponse>>> {
    let limit = state.page_limit(req.limit);
    let reactions = state
        .reaction_service
        .list_for_target(&req.target.to_ref(), limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        reactions.into_iter().map(Into::into).collect(),
    ))
}

/// List reactions left by a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUserReactionsRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

async fn list_user(
    State(state): State<AppState>,
    Json(req): Json<ListUserReactionsRequest>,
) -> AppResult<ApiResponse<Vec<ReactionResponse>>> {
    let limit = state.page_limit(req.limit);
    let reactions = state
        .reaction_service
        .list_by_actor(&req.user_id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        reactions.into_iter().map(Into::into).collect(),
    ))
}

/// Rebuild like/dislike counters from reaction rows.
async fn recount(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(target): Json<ContentTarget>,
) -> AppResult<ApiResponse<ReactionTally>> {
    let tally = state.reaction_service.recount(&target.to_ref()).await?;
    Ok(ApiResponse::ok(tally))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/set", post(set))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/list-user", post(list_user))
        .route("/recount", post(recount))
}
