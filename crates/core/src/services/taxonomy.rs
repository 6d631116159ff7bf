//! Taxonomy service: categories, hashtags and video tags.
//!
//! Categories are curated and attached to any content kind. Hashtags and
//! tags are free-form: they are created the first time someone uses them.
//! Every link is written under the content row lock.

use std::sync::Arc;

use sea_orm::{DatabaseConnection, Set};
use validator::Validate;
use vv_common::{AppError, AppResult, IdGenerator};
use vv_db::{
    content::{ContentKind, ContentRef, HasContentRef},
    entities::{category, content_category, content_hashtag, hashtag, tag, video_tag},
    repositories::{
        CategoryRepository, ContentCategoryRepository, ContentHashtagRepository,
        HashtagRepository, TagRepository, VideoTagRepository,
    },
};

use super::{association::AssociationService, catalog::NamedEntryInput};

const MAX_LABEL_LEN: usize = 128;

/// Normalize a hashtag or tag: drop one leading `#`, trim, lowercase.
///
/// Only letters, digits and `_` are accepted.
pub fn normalize_label(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    let name = name.strip_prefix('#').unwrap_or(name).to_lowercase();

    if name.is_empty() || name.chars().count() > MAX_LABEL_LEN {
        return Err(AppError::Validation(format!(
            "Label must be 1 to {MAX_LABEL_LEN} characters"
        )));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(AppError::Validation(format!("Invalid label: {raw}")));
    }
    Ok(name)
}

/// Taxonomy service for business logic.
#[derive(Clone)]
pub struct TaxonomyService {
    db: Arc<DatabaseConnection>,
    category_repo: CategoryRepository,
    hashtag_repo: HashtagRepository,
    tag_repo: TagRepository,
    content_category_repo: ContentCategoryRepository,
    content_hashtag_repo: ContentHashtagRepository,
    video_tag_repo: VideoTagRepository,
    association: AssociationService,
    id_gen: IdGenerator,
}

impl TaxonomyService {
    /// Create a new taxonomy service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, association: AssociationService) -> Self {
        Self {
            category_repo: CategoryRepository::new(db.clone()),
            hashtag_repo: HashtagRepository::new(db.clone()),
            tag_repo: TagRepository::new(db.clone()),
            content_category_repo: ContentCategoryRepository::new(db.clone()),
            content_hashtag_repo: ContentHashtagRepository::new(db.clone()),
            video_tag_repo: VideoTagRepository::new(db.clone()),
            db,
            association,
            id_gen: IdGenerator::new(),
        }
    }

    // ==================== Categories ====================

    /// Add a category. Names are unique.
    pub async fn create_category(&self, input: NamedEntryInput) -> AppResult<category::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.category_repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Category {} already exists",
                input.name
            )));
        }

        self.category_repo
            .create(category::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(input.name),
            })
            .await
    }

    pub async fn list_categories(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_all().await
    }

    /// Delete a category and every link to it.
    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        if !self.category_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Category {id}")));
        }
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    /// File one's own upload under a category.
    pub async fn categorize(
        &self,
        user_id: &str,
        target: &ContentRef,
        category_id: &str,
    ) -> AppResult<content_category::Model> {
        let registry = self.association.registry();
        registry.require_uploaded_by(user_id, target).await?;

        if self.category_repo.find_by_id(category_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Category {category_id}")));
        }

        let txn = registry.begin_locked(&self.db, target).await?;
        if self
            .content_category_repo
            .find_link_in(&txn, category_id, target)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "{target} is already in category {category_id}"
            )));
        }

        let link = self
            .content_category_repo
            .create_in(
                &txn,
                content_category::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    category_id: Set(category_id.to_string()),
                    content_type: Set(target.kind.as_str().to_string()),
                    content_id: Set(target.id.clone()),
                },
            )
            .await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(link)
    }

    /// Take one's own upload out of a category.
    pub async fn uncategorize(
        &self,
        user_id: &str,
        target: &ContentRef,
        category_id: &str,
    ) -> AppResult<()> {
        self.association
            .registry()
            .require_uploaded_by(user_id, target)
            .await?;

        if !self
            .content_category_repo
            .delete_link(category_id, target)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "{target} is not in category {category_id}"
            )));
        }
        Ok(())
    }

    pub async fn categories_of(&self, target: &ContentRef) -> AppResult<Vec<category::Model>> {
        self.content_category_repo.categories_of(target).await
    }

    /// Content filed under a category, newest link first.
    pub async fn in_category(&self, category_id: &str, limit: u64) -> AppResult<Vec<ContentRef>> {
        if self.category_repo.find_by_id(category_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Category {category_id}")));
        }

        Ok(self
            .content_category_repo
            .list_by_category(category_id, limit)
            .await?
            .iter()
            .filter_map(HasContentRef::content_ref)
            .collect())
    }

    // ==================== Hashtags ====================

    /// Attach a hashtag to one's own upload, creating the hashtag on first use.
    pub async fn add_hashtag(
        &self,
        user_id: &str,
        target: &ContentRef,
        raw_name: &str,
    ) -> AppResult<hashtag::Model> {
        let name = normalize_label(raw_name)?;
        let registry = self.association.registry();
        registry.require_uploaded_by(user_id, target).await?;

        let txn = registry.begin_locked(&self.db, target).await?;
        let hashtag = self
            .hashtag_repo
            .find_or_create_in(&txn, &self.id_gen.generate(), &name)
            .await?;

        if self
            .content_hashtag_repo
            .find_link_in(&txn, &hashtag.id, target)
            .await?
            .is_none()
        {
            self.content_hashtag_repo
                .create_in(
                    &txn,
                    content_hashtag::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        hashtag_id: Set(hashtag.id.clone()),
                        content_type: Set(target.kind.as_str().to_string()),
                        content_id: Set(target.id.clone()),
                    },
                )
                .await?;
        }
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(content = %target, hashtag = %hashtag.name, "Hashtag attached");
        Ok(hashtag)
    }

    /// Detach a hashtag from one's own upload. The hashtag itself stays.
    pub async fn remove_hashtag(
        &self,
        user_id: &str,
        target: &ContentRef,
        raw_name: &str,
    ) -> AppResult<()> {
        let name = normalize_label(raw_name)?;
        self.association
            .registry()
            .require_uploaded_by(user_id, target)
            .await?;

        let hashtag = self
            .hashtag_repo
            .find_by_name(&name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hashtag #{name}")))?;

        if !self
            .content_hashtag_repo
            .delete_link(&hashtag.id, target)
            .await?
        {
            return Err(AppError::NotFound(format!("{target} has no #{name}")));
        }
        Ok(())
    }

    pub async fn hashtags_of(&self, target: &ContentRef) -> AppResult<Vec<hashtag::Model>> {
        self.content_hashtag_repo.hashtags_of(target).await
    }

    /// Content carrying a hashtag, newest link first. Unknown hashtags have none.
    pub async fn with_hashtag(&self, raw_name: &str, limit: u64) -> AppResult<Vec<ContentRef>> {
        let name = normalize_label(raw_name)?;
        let Some(hashtag) = self.hashtag_repo.find_by_name(&name).await? else {
            return Ok(Vec::new());
        };

        Ok(self
            .content_hashtag_repo
            .list_by_hashtag(&hashtag.id, limit)
            .await?
            .iter()
            .filter_map(HasContentRef::content_ref)
            .collect())
    }

    /// Hashtags starting with `prefix`.
    pub async fn search_hashtags(&self, prefix: &str, limit: u64) -> AppResult<Vec<hashtag::Model>> {
        let prefix = prefix.trim().trim_start_matches('#').to_lowercase();
        self.hashtag_repo.search(&prefix, limit).await
    }

    // ==================== Video tags ====================

    /// Tag one's own video, creating the tag on first use.
    pub async fn add_tag(
        &self,
        user_id: &str,
        video_id: &str,
        raw_name: &str,
    ) -> AppResult<tag::Model> {
        let name = normalize_label(raw_name)?;
        let target = ContentRef::new(ContentKind::Video, video_id);
        let registry = self.association.registry();
        registry.require_uploaded_by(user_id, &target).await?;

        let txn = registry.begin_locked(&self.db, &target).await?;
        let tag = self
            .tag_repo
            .find_or_create_in(&txn, &self.id_gen.generate(), &name)
            .await?;

        if self
            .video_tag_repo
            .find_link_in(&txn, video_id, &tag.id)
            .await?
            .is_none()
        {
            self.video_tag_repo
                .create_in(
                    &txn,
                    video_tag::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        video_id: Set(video_id.to_string()),
                        tag_id: Set(tag.id.clone()),
                    },
                )
                .await?;
        }
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(tag)
    }

    /// Untag one's own video.
    pub async fn remove_tag(&self, user_id: &str, video_id: &str, raw_name: &str) -> AppResult<()> {
        let name = normalize_label(raw_name)?;
        let target = ContentRef::new(ContentKind::Video, video_id);
        self.association
            .registry()
            .require_uploaded_by(user_id, &target)
            .await?;

        let tag = self
            .tag_repo
            .find_by_name(&name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {name}")))?;

        if !self.video_tag_repo.delete_link(video_id, &tag.id).await? {
            return Err(AppError::NotFound(format!("Video {video_id} has no tag {name}")));
        }
        Ok(())
    }

    pub async fn tags_of(&self, video_id: &str) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.list_for_video(video_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::ContentRegistry;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use vv_db::{
        entities::podcast::{self, AudioFormat},
        repositories::{PodcastRepository, VideoRepository},
    };

    fn test_podcast(id: &str, uploader: &str) -> podcast::Model {
        podcast::Model {
            id: id.to_string(),
            uploaded_by: Some(uploader.to_string()),
            description: None,
            duration_secs: None,
            released_date: None,
            original_language_id: None,
            upload_region_id: None,
            score_imdb: None,
            file_url: "https://cdn.example.com/p.mp3".to_string(),
            format: AudioFormat::Mp3,
            like_count: 0,
            dislike_count: 0,
            comment_count: 0,
            view_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_on(db: Arc<DatabaseConnection>) -> TaxonomyService {
        let registry = ContentRegistry::new()
            .with_store(Arc::new(VideoRepository::new(db.clone())))
            .unwrap()
            .with_store(Arc::new(PodcastRepository::new(db.clone())))
            .unwrap();
        TaxonomyService::new(db.clone(), AssociationService::new(db, Arc::new(registry)))
    }

    fn service(db: MockDatabase) -> TaxonomyService {
        service_on(Arc::new(db.into_connection()))
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("#RustLang").unwrap(), "rustlang");
        assert_eq!(normalize_label("  sci_fi ").unwrap(), "sci_fi");
        assert!(normalize_label("#").is_err());
        assert!(normalize_label("two words").is_err());
        assert!(normalize_label(&"a".repeat(129)).is_err());
    }

    #[tokio::test]
    async fn test_add_hashtag_links_under_content_lock() {
        let rust = hashtag::Model {
            id: "h1".to_string(),
            name: "rust".to_string(),
        };
        let link = content_hashtag::Model {
            id: "ch1".to_string(),
            hashtag_id: "h1".to_string(),
            content_type: "podcast".to_string(),
            content_id: "p1".to_string(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_podcast("p1", "user1")]])
                .append_query_results([vec![BTreeMap::from([("id", Value::from("p1"))])]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .append_query_results([[rust.clone()]])
                .append_query_results([Vec::<content_hashtag::Model>::new()])
                .append_query_results([[link]])
                .into_connection(),
        );
        let taxonomy = service_on(db.clone());

        let attached = taxonomy
            .add_hashtag("user1", &ContentRef::new(ContentKind::Podcast, "p1"), "#Rust")
            .await
            .unwrap();
        assert_eq!(attached, rust);
        drop(taxonomy);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        let lock = log.find("FOR UPDATE").unwrap();
        let insert = log.find(r#"INSERT INTO \"content_hashtag\""#).unwrap();
        assert!(lock < insert);
    }

    #[tokio::test]
    async fn test_categorize_twice_conflicts() {
        let existing = content_category::Model {
            id: "cc1".to_string(),
            category_id: "c1".to_string(),
            content_type: "podcast".to_string(),
            content_id: "p1".to_string(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_podcast("p1", "user1")]])
            .append_query_results([[category::Model {
                id: "c1".to_string(),
                name: "Science".to_string(),
            }]])
            .append_query_results([vec![BTreeMap::from([("id", Value::from("p1"))])]])
            .append_query_results([[existing]]);

        let result = service(db)
            .categorize("user1", &ContentRef::new(ContentKind::Podcast, "p1"), "c1")
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_categorize_by_non_uploader_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_podcast("p1", "user1")]]);

        let result = service(db)
            .categorize("user2", &ContentRef::new(ContentKind::Podcast, "p1"), "c1")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_with_unknown_hashtag_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<hashtag::Model>::new()]);

        let found = service(db).with_hashtag("nothing", 10).await.unwrap();

        assert!(found.is_empty());
    }
}
