//! Content endpoints: videos, podcasts and their catalog metadata.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use vv_common::AppResult;
use vv_core::{
    AddCastInput, AddProduceInput, AddThumbnailInput, AddTitleInput, CascadeReport,
    CreatePersonnelInput, CreatePodcastInput, CreateVideoInput, Credits, NamedEntryInput,
    SetChannelInput, SetLocalizationInput,
};
use vv_db::{
    content::{ContentItem, ContentKind, DependentRef},
    entities::{
        cast_credit, channel_detail, content_title, language, personnel, podcast,
        produce_credit, region, thumbnail_detail, video, video_localization,
    },
};

use super::{ContentTarget, default_limit};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

// ==================== Request Types ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUploadsRequest {
    pub user_id: String,
    pub content_type: ContentKind,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPersonnelRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCastRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    #[serde(flatten)]
    pub input: AddCastInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProduceRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    #[serde(flatten)]
    pub input: AddProduceInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTitleRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    #[serde(flatten)]
    pub input: AddTitleInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoIdRequest {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLocalizationRequest {
    pub video_id: String,
    #[serde(flatten)]
    pub input: SetLocalizationInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLocalizationRequest {
    pub video_id: String,
    pub language: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetChannelRequest {
    pub video_id: String,
    #[serde(flatten)]
    pub input: SetChannelInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddThumbnailRequest {
    pub video_id: String,
    #[serde(flatten)]
    pub input: AddThumbnailInput,
}

// ==================== Content ====================

async fn create_video(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateVideoInput>,
) -> AppResult<ApiResponse<video::Model>> {
    let video = state.catalog_service.create_video(&user.id, input).await?;
    Ok(ApiResponse::ok(video))
}

async fn create_podcast(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePodcastInput>,
) -> AppResult<ApiResponse<podcast::Model>> {
    let podcast = state
        .catalog_service
        .create_podcast(&user.id, input)
        .await?;
    Ok(ApiResponse::ok(podcast))
}

async fn show_video(
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<ApiResponse<video::Model>> {
    Ok(ApiResponse::ok(state.catalog_service.get_video(&req.id).await?))
}

async fn show_podcast(
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<ApiResponse<podcast::Model>> {
    Ok(ApiResponse::ok(
        state.catalog_service.get_podcast(&req.id).await?,
    ))
}

async fn list_videos(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<Vec<video::Model>>> {
    let limit = state.page_limit(req.limit);
    let videos = state
        .catalog_service
        .list_videos(limit, req.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(videos))
}

async fn list_podcasts(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<Vec<podcast::Model>>> {
    let limit = state.page_limit(req.limit);
    let podcasts = state
        .catalog_service
        .list_podcasts(limit, req.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(podcasts))
}

/// Any content item by type tag and id.
async fn show(
    State(state): State<AppState>,
    Json(target): Json<ContentTarget>,
) -> AppResult<ApiResponse<ContentItem>> {
    let item = state.catalog_service.get_item(&target.to_ref()).await?;
    Ok(ApiResponse::ok(item))
}

async fn uploads(
    State(state): State<AppState>,
    Json(req): Json<ListUploadsRequest>,
) -> AppResult<ApiResponse<Vec<ContentItem>>> {
    let limit = state.page_limit(req.limit);
    let items = state
        .catalog_service
        .list_uploads(req.content_type, &req.user_id, limit, req.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(items))
}

async fn view(
    State(state): State<AppState>,
    Json(target): Json<ContentTarget>,
) -> AppResult<ApiResponse<()>> {
    state.catalog_service.record_view(&target.to_ref()).await?;
    Ok(ApiResponse::ok(()))
}

/// Delete an upload and everything referencing it.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(target): Json<ContentTarget>,
) -> AppResult<ApiResponse<CascadeReport>> {
    let report = state
        .catalog_service
        .delete(&user.id, &target.to_ref())
        .await?;
    Ok(ApiResponse::ok(report))
}

/// Rows that would go with the content if it were deleted.
async fn references(
    State(state): State<AppState>,
    Json(target): Json<ContentTarget>,
) -> AppResult<ApiResponse<Vec<DependentRef>>> {
    let refs = state
        .association_service
        .references_for(&target.to_ref())
        .await?;
    Ok(ApiResponse::ok(refs))
}

// ==================== Languages & Regions ====================

async fn create_language(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NamedEntryInput>,
) -> AppResult<ApiResponse<language::Model>> {
    Ok(ApiResponse::ok(
        state.catalog_service.create_language(input).await?,
    ))
}

async fn list_languages(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<language::Model>>> {
    Ok(ApiResponse::ok(state.catalog_service.list_languages().await?))
}

async fn create_region(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NamedEntryInput>,
) -> AppResult<ApiResponse<region::Model>> {
    Ok(ApiResponse::ok(
        state.catalog_service.create_region(input).await?,
    ))
}

async fn list_regions(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<region::Model>>> {
    Ok(ApiResponse::ok(state.catalog_service.list_regions().await?))
}

/// Content that used the language keeps its rows.
async fn delete_language(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<impl IntoResponse> {
    state.catalog_service.delete_language(&req.id).await?;
    Ok(no_content())
}

async fn delete_region(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<impl IntoResponse> {
    state.catalog_service.delete_region(&req.id).await?;
    Ok(no_content())
}

// ==================== Personnel & Credits ====================

async fn create_personnel(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePersonnelInput>,
) -> AppResult<ApiResponse<personnel::Model>> {
    Ok(ApiResponse::ok(
        state.catalog_service.create_personnel(input).await?,
    ))
}

async fn show_personnel(
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<ApiResponse<personnel::Model>> {
    Ok(ApiResponse::ok(
        state.catalog_service.get_personnel(&req.id).await?,
    ))
}

async fn list_personnel(
    State(state): State<AppState>,
    Json(req): Json<ListPersonnelRequest>,
) -> AppResult<ApiResponse<Vec<personnel::Model>>> {
    let limit = state.page_limit(req.limit);
    Ok(ApiResponse::ok(
        state
            .catalog_service
            .list_personnel(limit, req.offset)
            .await?,
    ))
}

async fn add_cast(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddCastRequest>,
) -> AppResult<ApiResponse<cast_credit::Model>> {
    let credit = state
        .catalog_service
        .add_cast(&user.id, &req.target.to_ref(), req.input)
        .await?;
    Ok(ApiResponse::ok(credit))
}

async fn add_produce(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddProduceRequest>,
) -> AppResult<ApiResponse<produce_credit::Model>> {
    let credit = state
        .catalog_service
        .add_produce(&user.id, &req.target.to_ref(), req.input)
        .await?;
    Ok(ApiResponse::ok(credit))
}

async fn credits(
    State(state): State<AppState>,
    Json(target): Json<ContentTarget>,
) -> AppResult<ApiResponse<Credits>> {
    Ok(ApiResponse::ok(
        state.catalog_service.credits(&target.to_ref()).await?,
    ))
}

// ==================== Titles ====================

async fn add_title(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddTitleRequest>,
) -> AppResult<ApiResponse<content_title::Model>> {
    let title = state
        .catalog_service
        .add_title(&user.id, &req.target.to_ref(), req.input)
        .await?;
    Ok(ApiResponse::ok(title))
}

async fn titles(
    State(state): State<AppState>,
    Json(target): Json<ContentTarget>,
) -> AppResult<ApiResponse<Vec<content_title::Model>>> {
    Ok(ApiResponse::ok(
        state.catalog_service.titles(&target.to_ref()).await?,
    ))
}

// ==================== Video details ====================

async fn set_localization(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetLocalizationRequest>,
) -> AppResult<ApiResponse<video_localization::Model>> {
    let saved = state
        .catalog_service
        .set_localization(&user.id, &req.video_id, req.input)
        .await?;
    Ok(ApiResponse::ok(saved))
}

async fn delete_localization(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteLocalizationRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .catalog_service
        .delete_localization(&user.id, &req.video_id, &req.language)
        .await?;
    Ok(no_content())
}

async fn localizations(
    State(state): State<AppState>,
    Json(req): Json<VideoIdRequest>,
) -> AppResult<ApiResponse<Vec<video_localization::Model>>> {
    Ok(ApiResponse::ok(
        state.catalog_service.localizations(&req.video_id).await?,
    ))
}

async fn set_channel(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetChannelRequest>,
) -> AppResult<ApiResponse<channel_detail::Model>> {
    let saved = state
        .catalog_service
        .set_channel(&user.id, &req.video_id, req.input)
        .await?;
    Ok(ApiResponse::ok(saved))
}

async fn channel(
    State(state): State<AppState>,
    Json(req): Json<VideoIdRequest>,
) -> AppResult<ApiResponse<Option<channel_detail::Model>>> {
    Ok(ApiResponse::ok(
        state.catalog_service.channel(&req.video_id).await?,
    ))
}

async fn add_thumbnail(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddThumbnailRequest>,
) -> AppResult<ApiResponse<thumbnail_detail::Model>> {
    let thumbnail = state
        .catalog_service
        .add_thumbnail(&user.id, &req.video_id, req.input)
        .await?;
    Ok(ApiResponse::ok(thumbnail))
}

async fn thumbnails(
    State(state): State<AppState>,
    Json(req): Json<VideoIdRequest>,
) -> AppResult<ApiResponse<Vec<thumbnail_detail::Model>>> {
    Ok(ApiResponse::ok(
        state.catalog_service.thumbnails(&req.video_id).await?,
    ))
}

async fn delete_thumbnail(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .catalog_service
        .delete_thumbnail(&user.id, &req.id)
        .await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/videos/create", post(create_video))
        .route("/videos/show", post(show_video))
        .route("/videos/list", post(list_videos))
        .route("/podcasts/create", post(create_podcast))
        .route("/podcasts/show", post(show_podcast))
        .route("/podcasts/list", post(list_podcasts))
        .route("/show", post(show))
        .route("/uploads", post(uploads))
        .route("/view", post(view))
        .route("/delete", post(delete))
        .route("/references", post(references))
        .route("/languages/create", post(create_language))
        .route("/languages/list", post(list_languages))
        .route("/languages/delete", post(delete_language))
        .route("/regions/create", post(create_region))
        .route("/regions/list", post(list_regions))
        .route("/regions/delete", post(delete_region))
        .route("/personnel/create", post(create_personnel))
        .route("/personnel/show", post(show_personnel))
        .route("/personnel/list", post(list_personnel))
        .route("/credits/add-cast", post(add_cast))
        .route("/credits/add-produce", post(add_produce))
        .route("/credits", post(credits))
        .route("/titles/add", post(add_title))
        .route("/titles", post(titles))
        .route("/videos/localizations/set", post(set_localization))
        .route("/videos/localizations/delete", post(delete_localization))
        .route("/videos/localizations", post(localizations))
        .route("/videos/channel/set", post(set_channel))
        .route("/videos/channel", post(channel))
        .route("/videos/thumbnails/add", post(add_thumbnail))
        .route("/videos/thumbnails/delete", post(delete_thumbnail))
        .route("/videos/thumbnails", post(thumbnails))
}
