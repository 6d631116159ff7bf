//! Playlist repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use vv_common::{AppError, AppResult};

use crate::content::{ContentRef, DependentRef, DependentStore, target_condition};
use crate::entities::{Playlist, PlaylistEntry, playlist, playlist_entry};

/// Repository for playlist operations.
#[derive(Clone)]
pub struct PlaylistRepository {
    db: Arc<DatabaseConnection>,
}

impl PlaylistRepository {
    /// Create a new playlist repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Playlist Operations ====================

    /// Find playlist by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<playlist::Model>> {
        Playlist::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find playlist by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<playlist::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Playlist {id}")))
    }

    /// Find playlists by owner (paginated).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        public_only: bool,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<playlist::Model>> {
        let mut query = Playlist::find()
            .filter(playlist::Column::CreatedBy.eq(user_id))
            .order_by_desc(playlist::Column::Id);

        if public_only {
            query = query.filter(playlist::Column::IsPublic.eq(true));
        }

        if let Some(id) = until_id {
            query = query.filter(playlist::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new playlist.
    pub async fn create(&self, model: playlist::ActiveModel) -> AppResult<playlist::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a playlist.
    pub async fn update(&self, model: playlist::ActiveModel) -> AppResult<playlist::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a playlist (entries cascade).
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Playlist::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Adjust the entry counter atomically. Never goes below zero.
    pub async fn adjust_entries_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        playlist_id: &str,
        delta: i64,
    ) -> AppResult<()> {
        let expr = if delta >= 0 {
            Expr::col(playlist::Column::EntriesCount).add(delta)
        } else {
            Expr::cust(format!(
                "GREATEST(entries_count - {}, 0)",
                delta.unsigned_abs()
            ))
        };

        Playlist::update_many()
            .col_expr(playlist::Column::EntriesCount, expr)
            .filter(playlist::Column::Id.eq(playlist_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Repository for the entries of playlists.
#[derive(Clone)]
pub struct PlaylistEntryRepository {
    db: Arc<DatabaseConnection>,
}

impl PlaylistEntryRepository {
    /// Create a new playlist entry repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Entry Operations ====================

    /// Find an entry by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<playlist_entry::Model>> {
        PlaylistEntry::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries of a playlist in play order.
    pub async fn find_by_playlist(
        &self,
        playlist_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<playlist_entry::Model>> {
        PlaylistEntry::find()
            .filter(playlist_entry::Column::PlaylistId.eq(playlist_id))
            .order_by_asc(playlist_entry::Column::Position)
            .order_by_asc(playlist_entry::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the entry holding `target` in a playlist.
    pub async fn find_in_playlist_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        playlist_id: &str,
        target: &ContentRef,
    ) -> AppResult<Option<playlist_entry::Model>> {
        PlaylistEntry::find()
            .filter(playlist_entry::Column::PlaylistId.eq(playlist_id))
            .filter(target_condition(
                playlist_entry::Column::ContentType,
                playlist_entry::Column::ContentId,
                target,
            ))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Position after the current last entry of a playlist.
    pub async fn next_position_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        playlist_id: &str,
    ) -> AppResult<i32> {
        let last = PlaylistEntry::find()
            .filter(playlist_entry::Column::PlaylistId.eq(playlist_id))
            .order_by_desc(playlist_entry::Column::Position)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(last.map_or(0, |e| e.position + 1))
    }

    /// Insert an entry on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: playlist_entry::ActiveModel,
    ) -> AppResult<playlist_entry::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an entry on the given connection.
    pub async fn delete_in<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<bool> {
        let result = PlaylistEntry::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl DependentStore for PlaylistEntryRepository {
    fn kind(&self) -> &'static str {
        "playlist_entry"
    }

    async fn find_by_target(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>> {
        let entries = PlaylistEntry::find()
            .filter(target_condition(
                playlist_entry::Column::ContentType,
                playlist_entry::Column::ContentId,
                target,
            ))
            .order_by_asc(playlist_entry::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(entries
            .into_iter()
            .map(|e| DependentRef {
                kind: "playlist_entry",
                id: e.id,
            })
            .collect())
    }

    /// Removes the entries and lowers `entries_count` on every playlist that
    /// held the target.
    async fn delete_by_target(
        &self,
        txn: &DatabaseTransaction,
        target: &ContentRef,
    ) -> AppResult<u64> {
        let condition = target_condition(
            playlist_entry::Column::ContentType,
            playlist_entry::Column::ContentId,
            target,
        );

        let entries = PlaylistEntry::find()
            .filter(condition.clone())
            .all(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut per_playlist: HashMap<String, i64> = HashMap::new();
        for entry in entries {
            *per_playlist.entry(entry.playlist_id).or_default() += 1;
        }

        let result = PlaylistEntry::delete_many()
            .filter(condition)
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for (playlist_id, removed) in per_playlist {
            Playlist::update_many()
                .col_expr(
                    playlist::Column::EntriesCount,
                    Expr::cust(format!("GREATEST(entries_count - {removed}, 0)")),
                )
                .filter(playlist::Column::Id.eq(playlist_id))
                .exec(txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::content::ContentKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, TransactionTrait};

    fn create_test_playlist(id: &str, user_id: &str) -> playlist::Model {
        playlist::Model {
            id: id.to_string(),
            created_by: user_id.to_string(),
            name: "Favourites".to_string(),
            description: None,
            is_public: true,
            entries_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_entry(id: &str, playlist_id: &str, position: i32) -> playlist_entry::Model {
        playlist_entry::Model {
            id: id.to_string(),
            playlist_id: playlist_id.to_string(),
            content_type: "video".to_string(),
            content_id: "v1".to_string(),
            position,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<playlist::Model>::new()])
                .into_connection(),
        );

        let repo = PlaylistRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_playlist("pl2", "user1"),
                    create_test_playlist("pl1", "user1"),
                ]])
                .into_connection(),
        );

        let repo = PlaylistRepository::new(db);
        let result = repo.find_by_user("user1", false, 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_next_position_after_last_entry() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_entry("e1", "pl1", 4)]])
                .append_query_results([Vec::<playlist_entry::Model>::new()])
                .into_connection(),
        );

        let repo = PlaylistEntryRepository::new(db.clone());

        assert_eq!(repo.next_position_in(db.as_ref(), "pl1").await.unwrap(), 5);
        assert_eq!(repo.next_position_in(db.as_ref(), "pl2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_by_target_lowers_playlist_counts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_entry("e1", "pl1", 0),
                    create_test_entry("e2", "pl2", 3),
                ]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = PlaylistEntryRepository::new(db.clone());
        let target = ContentRef::new(ContentKind::Video, "v1");
        let txn = db.begin().await.unwrap();
        let removed = repo.delete_by_target(&txn, &target).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(removed, 2);
    }
}
