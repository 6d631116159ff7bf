//! Content title repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder,
};
use vv_common::{AppError, AppResult};

use crate::content::{ContentRef, DependentRef, DependentStore, target_condition};
use crate::entities::{ContentTitle, content_title};

/// Repository for localized content titles.
#[derive(Clone)]
pub struct ContentTitleRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentTitleRepository {
    /// Create a new content title repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new title.
    pub async fn create(
        &self,
        model: content_title::ActiveModel,
    ) -> AppResult<content_title::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: content_title::ActiveModel,
    ) -> AppResult<content_title::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Titles of a content item, native title first.
    pub async fn list_for_target(
        &self,
        target: &ContentRef,
    ) -> AppResult<Vec<content_title::Model>> {
        ContentTitle::find()
            .filter(target_condition(
                content_title::Column::ContentType,
                content_title::Column::ContentId,
                target,
            ))
            .order_by_desc(content_title::Column::IsNative)
            .order_by_asc(content_title::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a title.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = ContentTitle::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl DependentStore for ContentTitleRepository {
    fn kind(&self) -> &'static str {
        "content_title"
    }

    async fn find_by_target(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>> {
        Ok(self
            .list_for_target(target)
            .await?
            .into_iter()
            .map(|t| DependentRef {
                kind: "content_title",
                id: t.id,
            })
            .collect())
    }

    async fn delete_by_target(
        &self,
        txn: &DatabaseTransaction,
        target: &ContentRef,
    ) -> AppResult<u64> {
        let result = ContentTitle::delete_many()
            .filter(target_condition(
                content_title::Column::ContentType,
                content_title::Column::ContentId,
                target,
            ))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::content::ContentKind;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_list_for_target() {
        let native = content_title::Model {
            id: "t1".to_string(),
            title_text: "Le Voyage".to_string(),
            language_id: Some("fr".to_string()),
            is_native: Some(true),
            content_type: "video".to_string(),
            content_id: "v1".to_string(),
        };
        let translated = content_title::Model {
            id: "t2".to_string(),
            title_text: "The Journey".to_string(),
            language_id: Some("en".to_string()),
            is_native: Some(false),
            ..native.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[native, translated]])
                .into_connection(),
        );

        let repo = ContentTitleRepository::new(db);
        let target = ContentRef::new(ContentKind::Video, "v1");
        let titles = repo.list_for_target(&target).await.unwrap();

        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0].is_native, Some(true));
    }
}
