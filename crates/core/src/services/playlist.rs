//! Playlist service.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vv_common::{AppError, AppResult, IdGenerator};
use vv_db::{
    content::{ContentItem, ContentRef},
    entities::{playlist, playlist_entry},
    repositories::{PlaylistEntryRepository, PlaylistRepository},
};

use super::content_registry::ContentRegistry;

/// Input for creating a playlist.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Input for updating a playlist. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// A playlist entry with its target materialized.
///
/// `content` is `None` when the target no longer exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntry {
    #[serde(flatten)]
    pub entry: playlist_entry::Model,
    pub content: Option<ContentItem>,
}

/// Service for managing playlists.
#[derive(Clone)]
pub struct PlaylistService {
    db: Arc<DatabaseConnection>,
    playlist_repo: PlaylistRepository,
    entry_repo: PlaylistEntryRepository,
    registry: Arc<ContentRegistry>,
    id_gen: IdGenerator,
}

impl PlaylistService {
    /// Create a new playlist service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        playlist_repo: PlaylistRepository,
        entry_repo: PlaylistEntryRepository,
        registry: Arc<ContentRegistry>,
    ) -> Self {
        Self {
            db,
            playlist_repo,
            entry_repo,
            registry,
            id_gen: IdGenerator::new(),
        }
    }

    // ==================== Playlist Operations ====================

    /// Get a playlist visible to `viewer_id`. Private playlists are only
    /// visible to their owner; to anyone else they do not exist.
    pub async fn get(&self, playlist_id: &str, viewer_id: Option<&str>) -> AppResult<playlist::Model> {
        let playlist = self.playlist_repo.get_by_id(playlist_id).await?;

        if playlist.is_public || viewer_id == Some(playlist.created_by.as_str()) {
            Ok(playlist)
        } else {
            Err(AppError::NotFound(format!("Playlist {playlist_id}")))
        }
    }

    /// Playlists owned by `owner_id`. Private ones are included only when the
    /// viewer is the owner.
    pub async fn list_by_user(
        &self,
        owner_id: &str,
        viewer_id: Option<&str>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<playlist::Model>> {
        let public_only = viewer_id != Some(owner_id);
        self.playlist_repo
            .find_by_user(owner_id, public_only, limit, until_id)
            .await
    }

    /// Create a new playlist.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreatePlaylistInput,
    ) -> AppResult<playlist::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let model = playlist::ActiveModel {
            id: Set(self.id_gen.generate()),
            created_by: Set(user_id.to_string()),
            name: Set(input.name),
            description: Set(input.description),
            is_public: Set(input.is_public),
            entries_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.playlist_repo.create(model).await
    }

    /// Update one's own playlist.
    pub async fn update(
        &self,
        user_id: &str,
        playlist_id: &str,
        input: UpdatePlaylistInput,
    ) -> AppResult<playlist::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let playlist = self.owned(user_id, playlist_id).await?;

        let mut active: playlist::ActiveModel = playlist.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(is_public) = input.is_public {
            active.is_public = Set(is_public);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.playlist_repo.update(active).await
    }

    /// Delete one's own playlist. Entries go with it.
    pub async fn delete(&self, user_id: &str, playlist_id: &str) -> AppResult<()> {
        self.owned(user_id, playlist_id).await?;
        self.playlist_repo.delete(playlist_id).await?;
        Ok(())
    }

    // ==================== Entry Operations ====================

    /// Append a content item to one's own playlist.
    ///
    /// The target must exist and may appear only once per playlist. The
    /// target row is locked first, so a concurrent content deletion cannot
    /// miss the new entry. The counter bump then locks the playlist row,
    /// which serializes concurrent adds for the duplicate check and position.
    pub async fn add_entry(
        &self,
        user_id: &str,
        playlist_id: &str,
        target: &ContentRef,
    ) -> AppResult<playlist_entry::Model> {
        self.owned(user_id, playlist_id).await?;
        let store = self.registry.store_for(target)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !store.lock_in(&txn, &target.id).await? {
            return Err(AppError::ContentNotFound(target.to_string()));
        }

        self.playlist_repo
            .adjust_entries_count(&txn, playlist_id, 1)
            .await?;

        if self
            .entry_repo
            .find_in_playlist_in(&txn, playlist_id, target)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "{target} is already in this playlist"
            )));
        }

        let position = self.entry_repo.next_position_in(&txn, playlist_id).await?;

        let model = playlist_entry::ActiveModel {
            id: Set(self.id_gen.generate()),
            playlist_id: Set(playlist_id.to_string()),
            content_type: Set(target.kind.as_str().to_string()),
            content_id: Set(target.id.clone()),
            position: Set(position),
            created_at: Set(Utc::now().into()),
        };

        let created = self.entry_repo.create_in(&txn, model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Remove an entry from one's own playlist.
    pub async fn remove_entry(
        &self,
        user_id: &str,
        playlist_id: &str,
        entry_id: &str,
    ) -> AppResult<()> {
        self.owned(user_id, playlist_id).await?;

        let entry = self
            .entry_repo
            .find_by_id(entry_id)
            .await?
            .filter(|e| e.playlist_id == playlist_id)
            .ok_or_else(|| AppError::NotFound(format!("Playlist entry {entry_id}")))?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !self.entry_repo.delete_in(&txn, &entry.id).await? {
            return Err(AppError::NotFound(format!("Playlist entry {entry_id}")));
        }

        self.playlist_repo
            .adjust_entries_count(&txn, playlist_id, -1)
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Entries of a visible playlist in play order, each with its content.
    pub async fn list_entries(
        &self,
        playlist_id: &str,
        viewer_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ResolvedEntry>> {
        self.get(playlist_id, viewer_id).await?;

        let entries = self
            .entry_repo
            .find_by_playlist(playlist_id, limit, offset)
            .await?;

        let mut resolved = Vec::with_capacity(entries.len());
        for entry in entries {
            let content = self
                .registry
                .resolve(&entry.content_type, &entry.content_id)
                .await?;
            resolved.push(ResolvedEntry { entry, content });
        }

        Ok(resolved)
    }

    async fn owned(&self, user_id: &str, playlist_id: &str) -> AppResult<playlist::Model> {
        let playlist = self.playlist_repo.get_by_id(playlist_id).await?;
        if playlist.created_by != user_id {
            return Err(AppError::Forbidden("Not the playlist owner".to_string()));
        }
        Ok(playlist)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use vv_db::content::ContentKind;
    use vv_db::entities::podcast;
    use vv_db::repositories::PodcastRepository;

    fn test_playlist(id: &str, owner: &str, is_public: bool) -> playlist::Model {
        playlist::Model {
            id: id.to_string(),
            created_by: owner.to_string(),
            name: "Road trip".to_string(),
            description: None,
            is_public,
            entries_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_entry(id: &str, content_type: &str, content_id: &str) -> playlist_entry::Model {
        playlist_entry::Model {
            id: id.to_string(),
            playlist_id: "pl1".to_string(),
            content_type: content_type.to_string(),
            content_id: content_id.to_string(),
            position: 0,
            created_at: Utc::now().into(),
        }
    }

    fn test_podcast(id: &str) -> podcast::Model {
        podcast::Model {
            id: id.to_string(),
            uploaded_by: None,
            description: None,
            duration_secs: None,
            released_date: None,
            original_language_id: None,
            upload_region_id: None,
            score_imdb: None,
            file_url: "https://cdn.example.com/p.mp3".to_string(),
            format: podcast::AudioFormat::Mp3,
            like_count: 0,
            dislike_count: 0,
            comment_count: 0,
            view_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> PlaylistService {
        let db = Arc::new(db.into_connection());
        let registry = ContentRegistry::new()
            .with_store(Arc::new(PodcastRepository::new(db.clone())))
            .unwrap();

        PlaylistService::new(
            db.clone(),
            PlaylistRepository::new(db.clone()),
            PlaylistEntryRepository::new(db),
            Arc::new(registry),
        )
    }

    #[tokio::test]
    async fn test_private_playlist_hidden_from_others() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_playlist("pl1", "owner", false)]]);

        let result = service(db).get("pl1", Some("stranger")).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_private_playlist_visible_to_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_playlist("pl1", "owner", false)]]);

        let playlist = service(db).get("pl1", Some("owner")).await.unwrap();

        assert_eq!(playlist.id, "pl1");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let result = service(db)
            .create(
                "owner",
                CreatePlaylistInput {
                    name: String::new(),
                    description: None,
                    is_public: true,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_entry_to_foreign_playlist_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_playlist("pl1", "owner", true)]]);

        let target = ContentRef::new(ContentKind::Podcast, "p1");
        let result = service(db).add_entry("stranger", "pl1", &target).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_add_entry_missing_target() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_playlist("pl1", "owner", true)]])
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()]);

        let target = ContentRef::new(ContentKind::Podcast, "gone");
        let result = service(db).add_entry("owner", "pl1", &target).await;

        assert!(matches!(result, Err(AppError::ContentNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_duplicate_entry_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_playlist("pl1", "owner", true)]])
            .append_query_results([[BTreeMap::from([("id", Value::from("p1"))])]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[test_entry("e1", "podcast", "p1")]]);

        let target = ContentRef::new(ContentKind::Podcast, "p1");
        let result = service(db).add_entry("owner", "pl1", &target).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_entries_reports_dangling_content() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_playlist("pl1", "owner", true)]])
            .append_query_results([[
                test_entry("e1", "podcast", "p1"),
                test_entry("e2", "podcast", "gone"),
                test_entry("e3", "video", "v1"),
            ]])
            .append_query_results([[test_podcast("p1")]])
            .append_query_results([Vec::<podcast::Model>::new()]);

        let entries = service(db)
            .list_entries("pl1", None, 20, 0)
            .await
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert!(entries[0].content.is_some());
        assert!(entries[1].content.is_none());
        // Video has no registered store here.
        assert!(entries[2].content.is_none());
    }
}
