//! Users endpoints.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use vv_common::AppResult;
use vv_core::{CreateUserInput, ProfileUpdate, UpdateProfileInput};
use vv_db::entities::user::{self, Gender};

use super::default_limit;
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// User response. The token is never part of it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub is_verified: bool,
    pub created_at: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub preferred_language: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            is_verified: u.is_verified,
            created_at: u.created_at.to_rfc3339(),
            first_name: u.first_name,
            last_name: u.last_name,
            gender: u.gender,
            city: u.city,
            state: u.state,
            country: u.country,
            bio: u.bio,
            preferred_language: u.preferred_language,
        }
    }
}

/// The caller's own account, including the private fields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub email: String,
    pub dob: Option<String>,
    pub has_agreed_to_terms: bool,
    pub has_agreed_to_privacy_policy: bool,
    pub has_finished_onboarding: bool,
}

impl From<user::Model> for MeResponse {
    fn from(u: user::Model) -> Self {
        Self {
            email: u.email.clone(),
            dob: u.dob.map(|d| d.to_string()),
            has_agreed_to_terms: u.has_agreed_to_terms,
            has_agreed_to_privacy_policy: u.has_agreed_to_privacy_policy,
            has_finished_onboarding: u.has_finished_onboarding,
            user: u.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let created = state.user_service.create(input).await?;
    Ok(ApiResponse::ok(TokenResponse {
        user: created.user.into(),
        token: created.token,
    }))
}

async fn me(AuthUser(user): AuthUser) -> ApiResponse<MeResponse> {
    ApiResponse::ok(user.into())
}

/// Update the caller's profile. Answers 204 when nothing changed.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Response> {
    match state.user_service.update_profile(&user.id, input).await? {
        ProfileUpdate::Updated(user) => Ok(ApiResponse::ok(MeResponse::from(user)).into_response()),
        ProfileUpdate::Unchanged(_) => Ok(no_content().into_response()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUserRequest {
    pub user_id: String,
}

async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&req.user_id).await?;
    Ok(ApiResponse::ok(user.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListUsersRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let limit = state.page_limit(req.limit);
    let users = state
        .user_service
        .list(limit, req.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

async fn regenerate_token(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state.user_service.regenerate_token(&user.id).await?;
    Ok(ApiResponse::ok(TokenResponse {
        user: user.into(),
        token,
    }))
}

/// Delete the caller's account.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.user_service.delete(&user.id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/me", post(me))
        .route("/update", post(update))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/regenerate-token", post(regenerate_token))
        .route("/delete", post(delete))
}
