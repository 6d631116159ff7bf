//! Language and region repositories.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use vv_common::{AppError, AppResult};

use crate::entities::{Language, Region, language, region};

/// Repository for languages.
#[derive(Clone)]
pub struct LanguageRepository {
    db: Arc<DatabaseConnection>,
}

impl LanguageRepository {
    /// Create a new language repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a language by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<language::Model>> {
        Language::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a language by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<language::Model>> {
        Language::find()
            .filter(language::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every language, ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<language::Model>> {
        Language::find()
            .order_by_asc(language::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a language.
    pub async fn create(&self, model: language::ActiveModel) -> AppResult<language::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a language. Content and titles pointing at it keep their rows;
    /// the foreign keys null the reference.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Language::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Repository for regions.
#[derive(Clone)]
pub struct RegionRepository {
    db: Arc<DatabaseConnection>,
}

impl RegionRepository {
    /// Create a new region repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a region by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<region::Model>> {
        Region::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a region by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<region::Model>> {
        Region::find()
            .filter(region::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every region, ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<region::Model>> {
        Region::find()
            .order_by_asc(region::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a region.
    pub async fn create(&self, model: region::ActiveModel) -> AppResult<region::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a region. Content and titles pointing at it keep their rows;
    /// the foreign keys null the reference.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Region::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
