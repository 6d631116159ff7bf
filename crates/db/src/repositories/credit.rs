//! Personnel and credit repositories.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use vv_common::{AppError, AppResult};

use crate::content::{ContentRef, DependentRef, DependentStore, target_condition};
use crate::entities::{
    CastCredit, Personnel, ProduceCredit, cast_credit, personnel, produce_credit,
};

/// Repository for people credited on content.
#[derive(Clone)]
pub struct PersonnelRepository {
    db: Arc<DatabaseConnection>,
}

impl PersonnelRepository {
    /// Create a new personnel repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a person by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<personnel::Model>> {
        Personnel::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a person by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<personnel::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Personnel {id}")))
    }

    /// Find people by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<personnel::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Personnel::find()
            .filter(personnel::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List people ordered by last name (paginated).
    pub async fn find_all(&self, limit: u64, offset: u64) -> AppResult<Vec<personnel::Model>> {
        Personnel::find()
            .order_by_asc(personnel::Column::LastName)
            .order_by_asc(personnel::Column::FirstName)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new person.
    pub async fn create(&self, model: personnel::ActiveModel) -> AppResult<personnel::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a person (their credits cascade).
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Personnel::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Repository for cast credits.
#[derive(Clone)]
pub struct CastCreditRepository {
    db: Arc<DatabaseConnection>,
}

impl CastCreditRepository {
    /// Create a new cast credit repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new cast credit.
    pub async fn create(&self, model: cast_credit::ActiveModel) -> AppResult<cast_credit::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: cast_credit::ActiveModel,
    ) -> AppResult<cast_credit::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Cast of a content item.
    pub async fn list_for_target(&self, target: &ContentRef) -> AppResult<Vec<cast_credit::Model>> {
        CastCredit::find()
            .filter(target_condition(
                cast_credit::Column::ContentType,
                cast_credit::Column::ContentId,
                target,
            ))
            .order_by_asc(cast_credit::Column::CastType)
            .order_by_asc(cast_credit::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a cast credit.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = CastCredit::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl DependentStore for CastCreditRepository {
    fn kind(&self) -> &'static str {
        "cast_credit"
    }

    async fn find_by_target(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>> {
        Ok(self
            .list_for_target(target)
            .await?
            .into_iter()
            .map(|c| DependentRef {
                kind: "cast_credit",
                id: c.id,
            })
            .collect())
    }

    async fn delete_by_target(
        &self,
        txn: &DatabaseTransaction,
        target: &ContentRef,
    ) -> AppResult<u64> {
        let result = CastCredit::delete_many()
            .filter(target_condition(
                cast_credit::Column::ContentType,
                cast_credit::Column::ContentId,
                target,
            ))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

/// Repository for production credits (directors, producers).
#[derive(Clone)]
pub struct ProduceCreditRepository {
    db: Arc<DatabaseConnection>,
}

impl ProduceCreditRepository {
    /// Create a new produce credit repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new produce credit.
    pub async fn create(
        &self,
        model: produce_credit::ActiveModel,
    ) -> AppResult<produce_credit::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: produce_credit::ActiveModel,
    ) -> AppResult<produce_credit::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Production crew of a content item.
    pub async fn list_for_target(
        &self,
        target: &ContentRef,
    ) -> AppResult<Vec<produce_credit::Model>> {
        ProduceCredit::find()
            .filter(target_condition(
                produce_credit::Column::ContentType,
                produce_credit::Column::ContentId,
                target,
            ))
            .order_by_asc(produce_credit::Column::ProduceType)
            .order_by_asc(produce_credit::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a produce credit.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = ProduceCredit::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl DependentStore for ProduceCreditRepository {
    fn kind(&self) -> &'static str {
        "produce_credit"
    }

    async fn find_by_target(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>> {
        Ok(self
            .list_for_target(target)
            .await?
            .into_iter()
            .map(|c| DependentRef {
                kind: "produce_credit",
                id: c.id,
            })
            .collect())
    }

    async fn delete_by_target(
        &self,
        txn: &DatabaseTransaction,
        target: &ContentRef,
    ) -> AppResult<u64> {
        let result = ProduceCredit::delete_many()
            .filter(target_condition(
                produce_credit::Column::ContentType,
                produce_credit::Column::ContentId,
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
    use crate::entities::{cast_credit::CastType, produce_credit::ProduceType};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_personnel_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<personnel::Model>::new()])
                .into_connection(),
        );

        let repo = PersonnelRepository::new(db);
        let result = repo.get_by_id("nobody").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cast_find_by_target() {
        let credit = cast_credit::Model {
            id: "cc1".to_string(),
            personnel_id: "p1".to_string(),
            content_type: "video".to_string(),
            content_id: "v1".to_string(),
            cast_type: CastType::MainActor,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[credit]])
                .into_connection(),
        );

        let repo = CastCreditRepository::new(db);
        let target = ContentRef::new(ContentKind::Video, "v1");
        let refs = repo.find_by_target(&target).await.unwrap();

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, "cast_credit");
    }

    #[tokio::test]
    async fn test_produce_list_for_target() {
        let credit = produce_credit::Model {
            id: "pc1".to_string(),
            personnel_id: "p1".to_string(),
            content_type: "podcast".to_string(),
            content_id: "pod1".to_string(),
            produce_type: ProduceType::Producer,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[credit]])
                .into_connection(),
        );

        let repo = ProduceCreditRepository::new(db);
        let target = ContentRef::new(ContentKind::Podcast, "pod1");
        let credits = repo.list_for_target(&target).await.unwrap();

        assert_eq!(credits[0].produce_type, ProduceType::Producer);
    }
}
