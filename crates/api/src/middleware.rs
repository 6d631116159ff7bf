//! API middleware and shared state.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use sea_orm::DatabaseConnection;
use vv_common::{AppResult, config::InteractionsConfig};
use vv_core::{
    AssociationService, CatalogService, CommentService, ContentRegistry, FriendshipService,
    PlaylistService, ReactionService, TaxonomyService, UserService,
};
use vv_db::repositories::{
    CastCreditRepository, CommentRepository, ContentCategoryRepository,
    ContentHashtagRepository, ContentTitleRepository, PlaylistEntryRepository,
    PlaylistRepository, PodcastRepository, ProduceCreditRepository, ReactionRepository,
    UserRepository, VideoRepository,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub catalog_service: CatalogService,
    pub reaction_service: ReactionService,
    pub comment_service: CommentService,
    pub playlist_service: PlaylistService,
    pub association_service: AssociationService,
    pub taxonomy_service: TaxonomyService,
    pub friendship_service: FriendshipService,
    pub max_page_size: u64,
}

impl AppState {
    /// Wire every service over one connection pool.
    ///
    /// Each content table is registered with the content registry and every
    /// table holding a content reference with the association service, so a
    /// content deletion reaches all of them.
    pub fn new(db: Arc<DatabaseConnection>, interactions: &InteractionsConfig) -> AppResult<Self> {
        let registry = Arc::new(
            ContentRegistry::new()
                .with_store(Arc::new(VideoRepository::new(db.clone())))?
                .with_store(Arc::new(PodcastRepository::new(db.clone())))?,
        );

        let comment_repo = CommentRepository::new(db.clone());
        let reaction_repo = ReactionRepository::new(db.clone());
        let entry_repo = PlaylistEntryRepository::new(db.clone());

        let association_service = AssociationService::new(db.clone(), registry.clone())
            .with_dependent(Arc::new(comment_repo.clone()))?
            .with_dependent(Arc::new(reaction_repo.clone()))?
            .with_dependent(Arc::new(entry_repo.clone()))?
            .with_dependent(Arc::new(CastCreditRepository::new(db.clone())))?
            .with_dependent(Arc::new(ProduceCreditRepository::new(db.clone())))?
            .with_dependent(Arc::new(ContentTitleRepository::new(db.clone())))?
            .with_dependent(Arc::new(ContentCategoryRepository::new(db.clone())))?
            .with_dependent(Arc::new(ContentHashtagRepository::new(db.clone())))?;

        tracing::debug!(
            content_kinds = ?registry.kinds(),
            dependents = ?association_service.dependent_kinds(),
            "Content associations registered"
        );

        Ok(Self {
            user_service: UserService::new(
                db.clone(),
                UserRepository::new(db.clone()),
                comment_repo.clone(),
                registry.clone(),
            ),
            catalog_service: CatalogService::new(db.clone(), association_service.clone()),
            taxonomy_service: TaxonomyService::new(db.clone(), association_service.clone()),
            friendship_service: FriendshipService::new(db.clone()),
            reaction_service: ReactionService::new(
                db.clone(),
                reaction_repo,
                registry.clone(),
                interactions.unique_reactions,
            ),
            comment_service: CommentService::new(db.clone(), comment_repo, registry.clone()),
            playlist_service: PlaylistService::new(
                db.clone(),
                PlaylistRepository::new(db),
                entry_repo,
                registry,
            ),
            association_service,
            max_page_size: interactions.max_page_size,
        })
    }

    /// Clamp a requested page size to `1..=max_page_size`.
    #[must_use]
    pub fn page_limit(&self, requested: u64) -> u64 {
        requested.clamp(1, self.max_page_size.max(1))
    }
}

/// Authentication middleware.
///
/// A missing or unknown token is not rejected here; handlers that need a
/// user ask for [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => {
                tracing::warn!(error = %e, "Token lookup failed");
            }
            Err(_) => {}
        }
    }

    next.run(req).await
}
