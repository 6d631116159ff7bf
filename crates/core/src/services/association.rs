//! Polymorphic association resolver and content cascade.
//!
//! Nothing in the schema ties a `(content_type, content_id)` pair to its
//! target, so removing a content row is done here: the content row is locked,
//! every registered [`DependentStore`] drops its rows for the target and the
//! content row goes last, all inside one transaction.

use std::collections::BTreeMap;
use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use vv_common::{AppError, AppResult};
use vv_db::content::{ContentItem, ContentRef, DependentRef, DependentStore, HasContentRef};

use super::content_registry::ContentRegistry;

/// Rows removed by one content deletion, per dependent kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub target: ContentRef,
    pub removed: BTreeMap<&'static str, u64>,
}

impl CascadeReport {
    /// Dependent rows removed across all kinds.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.removed.values().sum()
    }
}

/// Association service.
#[derive(Clone)]
pub struct AssociationService {
    db: Arc<DatabaseConnection>,
    registry: Arc<ContentRegistry>,
    dependents: Vec<Arc<dyn DependentStore>>,
}

impl AssociationService {
    /// Create an association service with no dependent stores.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, registry: Arc<ContentRegistry>) -> Self {
        Self {
            db,
            registry,
            dependents: Vec::new(),
        }
    }

    /// Register a table whose rows must be removed with their target.
    pub fn register_dependent(&mut self, store: Arc<dyn DependentStore>) -> AppResult<()> {
        if self.dependents.iter().any(|d| d.kind() == store.kind()) {
            return Err(AppError::Internal(format!(
                "dependent store already registered: {}",
                store.kind()
            )));
        }

        self.dependents.push(store);
        Ok(())
    }

    /// Builder form of [`Self::register_dependent`].
    pub fn with_dependent(mut self, store: Arc<dyn DependentStore>) -> AppResult<Self> {
        self.register_dependent(store)?;
        Ok(self)
    }

    /// Kinds of the registered dependent stores, in registration order.
    #[must_use]
    pub fn dependent_kinds(&self) -> Vec<&'static str> {
        self.dependents.iter().map(|d| d.kind()).collect()
    }

    /// The shared content registry.
    #[must_use]
    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    /// Materialize the target of a dependent row. Dangling references and
    /// unknown tags resolve to `None`.
    pub async fn resolve<E: HasContentRef + Sync>(
        &self,
        entity: &E,
    ) -> AppResult<Option<ContentItem>> {
        match entity.content_ref() {
            Some(target) => self.registry.resolve_ref(&target).await,
            None => Ok(None),
        }
    }

    /// Materialize a reference. Missing rows resolve to `None`.
    pub async fn resolve_ref(&self, target: &ContentRef) -> AppResult<Option<ContentItem>> {
        self.registry.resolve_ref(target).await
    }

    /// Every dependent row pointing at `target`, across all registered kinds.
    pub async fn references_for(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>> {
        let mut refs = Vec::new();
        for store in &self.dependents {
            refs.extend(store.find_by_target(target).await?);
        }
        Ok(refs)
    }

    /// Delete a content row together with every dependent row.
    ///
    /// All or nothing: any failure rolls the whole deletion back. A target
    /// with no row yields `ContentNotFound` and leaves dependents untouched.
    ///
    /// The content row is locked before any dependent is read. Writers that
    /// add dependents lock the same row first, so they either commit before
    /// the cascade collects rows or find the target gone afterwards.
    pub async fn delete_content(&self, target: &ContentRef) -> AppResult<CascadeReport> {
        let store = self.registry.store_for(target)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !store.lock_in(&txn, &target.id).await? {
            return Err(AppError::ContentNotFound(target.to_string()));
        }

        let mut removed = BTreeMap::new();
        for dependent in &self.dependents {
            let count = dependent.delete_by_target(&txn, target).await?;
            removed.insert(dependent.kind(), count);
        }

        if !store.delete_in(&txn, &target.id).await? {
            return Err(AppError::ContentNotFound(target.to_string()));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let report = CascadeReport {
            target: target.clone(),
            removed,
        };

        tracing::info!(
            content = %target,
            dependents_removed = report.total(),
            "Deleted content"
        );

        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use vv_db::content::ContentKind;
    use vv_db::entities::comment;
    use vv_db::repositories::{
        CommentRepository, ContentTitleRepository, ReactionRepository, VideoRepository,
    };

    fn exec(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    fn locked(id: &str) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("id", Value::from(id))])
    }

    fn service(db: Arc<DatabaseConnection>) -> AssociationService {
        let registry = ContentRegistry::new()
            .with_store(Arc::new(VideoRepository::new(db.clone())))
            .unwrap();

        AssociationService::new(db.clone(), Arc::new(registry))
            .with_dependent(Arc::new(CommentRepository::new(db.clone())))
            .unwrap()
            .with_dependent(Arc::new(ReactionRepository::new(db.clone())))
            .unwrap()
            .with_dependent(Arc::new(ContentTitleRepository::new(db)))
            .unwrap()
    }

    #[test]
    fn test_register_dependent_rejects_duplicates() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let mut service = service(db.clone());

        let result = service.register_dependent(Arc::new(CommentRepository::new(db)));

        assert!(result.is_err());
        assert_eq!(
            service.dependent_kinds(),
            vec!["comment", "reaction", "content_title"]
        );
    }

    #[tokio::test]
    async fn test_delete_content_reports_each_dependent_kind() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[locked("v1")]])
                // comments, reactions, titles, then the video row
                .append_exec_results([exec(3), exec(2), exec(1), exec(1)])
                .into_connection(),
        );

        let target = ContentRef::new(ContentKind::Video, "v1");
        let report = service(db).delete_content(&target).await.unwrap();

        assert_eq!(report.removed["comment"], 3);
        assert_eq!(report.removed["reaction"], 2);
        assert_eq!(report.removed["content_title"], 1);
        assert_eq!(report.total(), 6);
    }

    #[tokio::test]
    async fn test_delete_missing_content_is_not_found() {
        // Only the lock query is queued: no dependent delete may run.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
                .into_connection(),
        );

        let target = ContentRef::new(ContentKind::Video, "gone");
        let result = service(db).delete_content(&target).await;

        assert!(matches!(result, Err(AppError::ContentNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_locks_content_before_dependents() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[locked("v1")]])
                .append_exec_results([exec(0), exec(0), exec(0), exec(1)])
                .into_connection(),
        );

        let service = service(db.clone());
        let target = ContentRef::new(ContentKind::Video, "v1");
        service.delete_content(&target).await.unwrap();
        drop(service);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let statements = format!("{log:?}");
        let lock = statements.find("FOR UPDATE").unwrap();
        let first_delete = statements.find("DELETE").unwrap();
        assert!(lock < first_delete);
    }

    #[tokio::test]
    async fn test_delete_unregistered_kind_touches_nothing() {
        // No exec results queued: any statement would fail the test.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let target = ContentRef::new(ContentKind::Podcast, "p1");
        let result = service(db).delete_content(&target).await;

        assert!(matches!(result, Err(AppError::ContentNotFound(_))));
    }

    #[tokio::test]
    async fn test_resolve_unknown_tag_is_absent() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let orphan = comment::Model {
            id: "c1".to_string(),
            text: "hi".to_string(),
            posted_by: "u1".to_string(),
            content_type: "article".to_string(),
            content_id: "a1".to_string(),
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        };

        let resolved = service(db).resolve(&orphan).await.unwrap();

        assert!(resolved.is_none());
    }
}
