//! Category, hashtag and tag endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use vv_common::AppResult;
use vv_core::NamedEntryInput;
use vv_db::{
    content::ContentRef,
    entities::{category, content_category, hashtag, tag},
};

use super::{ContentTarget, default_limit};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryIdRequest {
    pub category_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLinkRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    pub category_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagLinkRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagQuery {
    pub name: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagLinkRequest {
    pub video_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoTagsRequest {
    pub video_id: String,
}

// ==================== Categories ====================

async fn create_category(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NamedEntryInput>,
) -> AppResult<ApiResponse<category::Model>> {
    Ok(ApiResponse::ok(
        state.taxonomy_service.create_category(input).await?,
    ))
}

async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<category::Model>>> {
    Ok(ApiResponse::ok(
        state.taxonomy_service.list_categories().await?,
    ))
}

async fn delete_category(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CategoryIdRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .taxonomy_service
        .delete_category(&req.category_id)
        .await?;
    Ok(no_content())
}

async fn categorize(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CategoryLinkRequest>,
) -> AppResult<ApiResponse<content_category::Model>> {
    let link = state
        .taxonomy_service
        .categorize(&user.id, &req.target.to_ref(), &req.category_id)
        .await?;
    Ok(ApiResponse::ok(link))
}

async fn uncategorize(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CategoryLinkRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .taxonomy_service
        .uncategorize(&user.id, &req.target.to_ref(), &req.category_id)
        .await?;
    Ok(no_content())
}

async fn categories_of(
    State(state): State<AppState>,
    Json(target): Json<ContentTarget>,
) -> AppResult<ApiResponse<Vec<category::Model>>> {
    Ok(ApiResponse::ok(
        state.taxonomy_service.categories_of(&target.to_ref()).await?,
    ))
}

async fn in_category(
    State(state): State<AppState>,
    Json(req): Json<CategoryIdRequest>,
) -> AppResult<ApiResponse<Vec<ContentRef>>> {
    let limit = state.page_limit(req.limit);
    Ok(ApiResponse::ok(
        state
            .taxonomy_service
            .in_category(&req.category_id, limit)
            .await?,
    ))
}

// ==================== Hashtags ====================

async fn add_hashtag(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<HashtagLinkRequest>,
) -> AppResult<ApiResponse<hashtag::Model>> {
    let hashtag = state
        .taxonomy_service
        .add_hashtag(&user.id, &req.target.to_ref(), &req.name)
        .await?;
    Ok(ApiResponse::ok(hashtag))
}

async fn remove_hashtag(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<HashtagLinkRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .taxonomy_service
        .remove_hashtag(&user.id, &req.target.to_ref(), &req.name)
        .await?;
    Ok(no_content())
}

async fn hashtags_of(
    State(state): State<AppState>,
    Json(target): Json<ContentTarget>,
) -> AppResult<ApiResponse<Vec<hashtag::Model>>> {
    Ok(ApiResponse::ok(
        state.taxonomy_service.hashtags_of(&target.to_ref()).await?,
    ))
}

async fn with_hashtag(
    State(state): State<AppState>,
    Json(req): Json<HashtagQuery>,
) -> AppResult<ApiResponse<Vec<ContentRef>>> {
    let limit = state.page_limit(req.limit);
    Ok(ApiResponse::ok(
        state.taxonomy_service.with_hashtag(&req.name, limit).await?,
    ))
}

async fn search_hashtags(
    State(state): State<AppState>,
    Json(req): Json<HashtagQuery>,
) -> AppResult<ApiResponse<Vec<hashtag::Model>>> {
    let limit = state.page_limit(req.limit);
    Ok(ApiResponse::ok(
        state
            .taxonomy_service
            .search_hashtags(&req.name, limit)
            .await?,
    ))
}

// ==================== Tags ====================

async fn add_tag(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TagLinkRequest>,
) -> AppResult<ApiResponse<tag::Model>> {
    let tag = state
        .taxonomy_service
        .add_tag(&user.id, &req.video_id, &req.name)
        .await?;
    Ok(ApiResponse::ok(tag))
}

async fn remove_tag(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TagLinkRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .taxonomy_service
        .remove_tag(&user.id, &req.video_id, &req.name)
        .await?;
    Ok(no_content())
}

async fn tags_of(
    State(state): State<AppState>,
    Json(req): Json<VideoTagsRequest>,
) -> AppResult<ApiResponse<Vec<tag::Model>>> {
    Ok(ApiResponse::ok(
        state.taxonomy_service.tags_of(&req.video_id).await?,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories/create", post(create_category))
        .route("/categories/list", post(list_categories))
        .route("/categories/delete", post(delete_category))
        .route("/categories/add", post(categorize))
        .route("/categories/remove", post(uncategorize))
        .route("/categories/of", post(categories_of))
        .route("/categories/contents", post(in_category))
        .route("/hashtags/add", post(add_hashtag))
        .route("/hashtags/remove", post(remove_hashtag))
        .route("/hashtags/of", post(hashtags_of))
        .route("/hashtags/contents", post(with_hashtag))
        .route("/hashtags/search", post(search_hashtags))
        .route("/tags/add", post(add_tag))
        .route("/tags/remove", post(remove_tag))
        .route("/tags/of", post(tags_of))
}
