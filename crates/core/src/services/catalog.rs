//! Catalog service: videos, podcasts and their metadata.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, DatabaseTransaction, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vv_common::{AppError, AppResult, IdGenerator};
use vv_db::{
    content::{ContentItem, ContentKind, ContentRef, CounterDelta},
    entities::{
        cast_credit::{self, CastType},
        channel_detail, content_title, language, personnel, podcast,
        podcast::AudioFormat,
        produce_credit::{self, ProduceType},
        region, thumbnail_detail, video,
        video::VideoFormat,
        video_localization,
    },
    repositories::{
        CastCreditRepository, ChannelDetailRepository, ContentTitleRepository,
        LanguageRepository, PersonnelRepository, PodcastRepository, ProduceCreditRepository,
        RegionRepository, ThumbnailDetailRepository, VideoLocalizationRepository,
        VideoRepository,
    },
};

use super::association::{AssociationService, CascadeReport};

/// Fields shared by every content kind.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadataInput {
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub duration_secs: Option<i64>,
    pub released_date: Option<NaiveDate>,
    pub original_language_id: Option<String>,
    pub upload_region_id: Option<String>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub score_imdb: Option<f64>,
    #[validate(url)]
    pub file_url: String,
}

/// Input for creating a video.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub metadata: ContentMetadataInput,
    pub format: VideoFormat,
    #[validate(length(min = 1, max = 255))]
    pub youtube_video_id: Option<String>,
    #[validate(length(max = 10))]
    pub dimension: Option<String>,
    #[validate(length(max = 10))]
    pub definition: Option<String>,
    #[serde(default)]
    pub caption: bool,
    #[serde(default)]
    pub licensed_content: bool,
    #[validate(length(max = 255))]
    pub privacy_status: Option<String>,
    #[serde(default)]
    pub embeddable: bool,
    #[serde(default)]
    pub made_for_kids: bool,
}

/// Input for creating a podcast.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePodcastInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub metadata: ContentMetadataInput,
    pub format: AudioFormat,
}

/// Input for creating a language or region.
#[derive(Debug, Deserialize, Validate)]
pub struct NamedEntryInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Input for creating a person.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonnelInput {
    #[validate(length(min = 1, max = 128))]
    pub first_name: String,
    #[validate(length(max = 128))]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub last_name: String,
}

/// Input for crediting a person on content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCastInput {
    pub personnel_id: String,
    pub cast_type: CastType,
}

/// Input for crediting a director or producer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProduceInput {
    pub personnel_id: String,
    pub produce_type: ProduceType,
}

/// Input for adding a localized title.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddTitleInput {
    #[validate(length(min = 1, max = 512))]
    pub title_text: String,
    pub language_id: Option<String>,
    pub is_native: Option<bool>,
}

/// Input for a video's title and description in one language.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetLocalizationInput {
    #[validate(length(min = 2, max = 10))]
    pub language: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// Input for the channel a video was published on.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetChannelInput {
    #[validate(length(min = 1, max = 255))]
    pub channel_title: String,
    #[validate(length(min = 1, max = 128))]
    pub channel_id: String,
}

/// Input for adding a thumbnail.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddThumbnailInput {
    #[validate(url, length(max = 1024))]
    pub url: String,
    #[validate(range(min = 1, max = 10000))]
    pub width: i32,
    #[validate(range(min = 1, max = 10000))]
    pub height: i32,
}

/// Everyone credited on a content item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credits {
    pub cast: Vec<cast_credit::Model>,
    pub produce: Vec<produce_credit::Model>,
}

/// Catalog service for business logic.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    video_repo: VideoRepository,
    podcast_repo: PodcastRepository,
    language_repo: LanguageRepository,
    region_repo: RegionRepository,
    personnel_repo: PersonnelRepository,
    cast_repo: CastCreditRepository,
    produce_repo: ProduceCreditRepository,
    title_repo: ContentTitleRepository,
    localization_repo: VideoLocalizationRepository,
    channel_repo: ChannelDetailRepository,
    thumbnail_repo: ThumbnailDetailRepository,
    association: AssociationService,
    id_gen: IdGenerator,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, association: AssociationService) -> Self {
        Self {
            video_repo: VideoRepository::new(db.clone()),
            podcast_repo: PodcastRepository::new(db.clone()),
            language_repo: LanguageRepository::new(db.clone()),
            region_repo: RegionRepository::new(db.clone()),
            personnel_repo: PersonnelRepository::new(db.clone()),
            cast_repo: CastCreditRepository::new(db.clone()),
            produce_repo: ProduceCreditRepository::new(db.clone()),
            title_repo: ContentTitleRepository::new(db.clone()),
            localization_repo: VideoLocalizationRepository::new(db.clone()),
            channel_repo: ChannelDetailRepository::new(db.clone()),
            thumbnail_repo: ThumbnailDetailRepository::new(db.clone()),
            db,
            association,
            id_gen: IdGenerator::new(),
        }
    }

    // ==================== Content ====================

    /// Publish a video.
    pub async fn create_video(
        &self,
        user_id: &str,
        input: CreateVideoInput,
    ) -> AppResult<video::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.check_metadata_links(&input.metadata).await?;

        if let Some(ref youtube_id) = input.youtube_video_id
            && self.video_repo.find_by_youtube_id(youtube_id).await?.is_some()
        {
            return Err(AppError::Conflict(format!(
                "YouTube video {youtube_id} is already published"
            )));
        }

        let meta = input.metadata;
        let model = video::ActiveModel {
            id: Set(self.id_gen.generate()),
            uploaded_by: Set(Some(user_id.to_string())),
            description: Set(meta.description),
            duration_secs: Set(meta.duration_secs),
            released_date: Set(meta.released_date),
            original_language_id: Set(meta.original_language_id),
            upload_region_id: Set(meta.upload_region_id),
            score_imdb: Set(meta.score_imdb),
            file_url: Set(meta.file_url),
            format: Set(input.format),
            youtube_video_id: Set(input.youtube_video_id),
            dimension: Set(input.dimension),
            definition: Set(input.definition),
            caption: Set(input.caption),
            licensed_content: Set(input.licensed_content),
            privacy_status: Set(input.privacy_status),
            embeddable: Set(input.embeddable),
            made_for_kids: Set(input.made_for_kids),
            like_count: Set(0),
            dislike_count: Set(0),
            comment_count: Set(0),
            view_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.video_repo.create(model).await?;
        tracing::info!(video_id = %created.id, uploaded_by = %user_id, "Video created");
        Ok(created)
    }

    /// Publish a podcast.
    pub async fn create_podcast(
        &self,
        user_id: &str,
        input: CreatePodcastInput,
    ) -> AppResult<podcast::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.check_metadata_links(&input.metadata).await?;

        let meta = input.metadata;
        let model = podcast::ActiveModel {
            id: Set(self.id_gen.generate()),
            uploaded_by: Set(Some(user_id.to_string())),
            description: Set(meta.description),
            duration_secs: Set(meta.duration_secs),
            released_date: Set(meta.released_date),
            original_language_id: Set(meta.original_language_id),
            upload_region_id: Set(meta.upload_region_id),
            score_imdb: Set(meta.score_imdb),
            file_url: Set(meta.file_url),
            format: Set(input.format),
            like_count: Set(0),
            dislike_count: Set(0),
            comment_count: Set(0),
            view_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.podcast_repo.create(model).await?;
        tracing::info!(podcast_id = %created.id, uploaded_by = %user_id, "Podcast created");
        Ok(created)
    }

    /// Fetch a video, failing with `ContentNotFound`.
    pub async fn get_video(&self, id: &str) -> AppResult<video::Model> {
        self.video_repo.get_by_id(id).await
    }

    /// Fetch a podcast, failing with `ContentNotFound`.
    pub async fn get_podcast(&self, id: &str) -> AppResult<podcast::Model> {
        self.podcast_repo.get_by_id(id).await
    }

    /// Kind-independent view of any content item.
    pub async fn get_item(&self, target: &ContentRef) -> AppResult<ContentItem> {
        self.association.registry().require(target).await
    }

    /// Videos newest first, paged with `until_id`.
    pub async fn list_videos(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<video::Model>> {
        self.video_repo.find_recent(limit, until_id).await
    }

    /// Podcasts newest first, paged with `until_id`.
    pub async fn list_podcasts(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<podcast::Model>> {
        self.podcast_repo.find_recent(limit, until_id).await
    }

    /// Items of one kind uploaded by a user, newest first.
    pub async fn list_uploads(
        &self,
        kind: ContentKind,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<ContentItem>> {
        let items = match kind {
            ContentKind::Video => self
                .video_repo
                .find_by_uploader(user_id, limit, until_id)
                .await?
                .into_iter()
                .map(ContentItem::from)
                .collect(),
            ContentKind::Podcast => self
                .podcast_repo
                .find_by_uploader(user_id, limit, until_id)
                .await?
                .into_iter()
                .map(ContentItem::from)
                .collect(),
        };
        Ok(items)
    }

    /// Count one view.
    pub async fn record_view(&self, target: &ContentRef) -> AppResult<()> {
        let store = self.association.registry().store_for(target)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !store
            .apply_counters(&txn, &target.id, CounterDelta::views(1))
            .await?
        {
            return Err(AppError::ContentNotFound(target.to_string()));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete one's own upload together with everything that references it.
    pub async fn delete(&self, user_id: &str, target: &ContentRef) -> AppResult<CascadeReport> {
        self.uploaded_by(user_id, target).await?;
        self.association.delete_content(target).await
    }

    // ==================== Languages & Regions ====================

    /// Add a language. Names are unique.
    pub async fn create_language(&self, input: NamedEntryInput) -> AppResult<language::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.language_repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Language {} already exists",
                input.name
            )));
        }

        self.language_repo
            .create(language::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(input.name),
            })
            .await
    }

    /// All languages by name.
    pub async fn list_languages(&self) -> AppResult<Vec<language::Model>> {
        self.language_repo.find_all().await
    }

    /// Add a region. Names are unique.
    pub async fn create_region(&self, input: NamedEntryInput) -> AppResult<region::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.region_repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Region {} already exists",
                input.name
            )));
        }

        self.region_repo
            .create(region::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(input.name),
            })
            .await
    }

    /// All regions by name.
    pub async fn list_regions(&self) -> AppResult<Vec<region::Model>> {
        self.region_repo.find_all().await
    }

    /// Delete a language.
    ///
    /// Content and titles that used it keep their rows with the language
    /// reference cleared.
    pub async fn delete_language(&self, id: &str) -> AppResult<()> {
        if !self.language_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Language {id}")));
        }
        tracing::info!(language_id = %id, "Language deleted");
        Ok(())
    }

    /// Delete a region. Content uploaded from it keeps its rows with the
    /// region reference cleared.
    pub async fn delete_region(&self, id: &str) -> AppResult<()> {
        if !self.region_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Region {id}")));
        }
        tracing::info!(region_id = %id, "Region deleted");
        Ok(())
    }

    // ==================== Personnel & Credits ====================

    /// Add a person who can be credited on content.
    pub async fn create_personnel(
        &self,
        input: CreatePersonnelInput,
    ) -> AppResult<personnel::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.personnel_repo
            .create(personnel::ActiveModel {
                id: Set(self.id_gen.generate()),
                first_name: Set(input.first_name),
                middle_name: Set(input.middle_name),
                last_name: Set(input.last_name),
            })
            .await
    }

    /// Fetch a person, failing with `NotFound`.
    pub async fn get_personnel(&self, id: &str) -> AppResult<personnel::Model> {
        self.personnel_repo.get_by_id(id).await
    }

    /// People by name, paged with `offset`.
    pub async fn list_personnel(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<personnel::Model>> {
        self.personnel_repo.find_all(limit, offset).await
    }

    /// Credit a cast member on one's own upload.
    pub async fn add_cast(
        &self,
        user_id: &str,
        target: &ContentRef,
        input: AddCastInput,
    ) -> AppResult<cast_credit::Model> {
        self.uploaded_by(user_id, target).await?;
        self.personnel_repo.get_by_id(&input.personnel_id).await?;

        let txn = self.lock_target(target).await?;
        let credit = self
            .cast_repo
            .create_in(
                &txn,
                cast_credit::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    personnel_id: Set(input.personnel_id),
                    content_type: Set(target.kind.as_str().to_string()),
                    content_id: Set(target.id.clone()),
                    cast_type: Set(input.cast_type),
                },
            )
            .await?;
        commit(txn).await?;

        Ok(credit)
    }

    /// Credit a director or producer on one's own upload.
    pub async fn add_produce(
        &self,
        user_id: &str,
        target: &ContentRef,
        input: AddProduceInput,
    ) -> AppResult<produce_credit::Model> {
        self.uploaded_by(user_id, target).await?;
        self.personnel_repo.get_by_id(&input.personnel_id).await?;

        let txn = self.lock_target(target).await?;
        let credit = self
            .produce_repo
            .create_in(
                &txn,
                produce_credit::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    personnel_id: Set(input.personnel_id),
                    content_type: Set(target.kind.as_str().to_string()),
                    content_id: Set(target.id.clone()),
                    produce_type: Set(input.produce_type),
                },
            )
            .await?;
        commit(txn).await?;

        Ok(credit)
    }

    /// Cast and production credits of a content item.
    pub async fn credits(&self, target: &ContentRef) -> AppResult<Credits> {
        Ok(Credits {
            cast: self.cast_repo.list_for_target(target).await?,
            produce: self.produce_repo.list_for_target(target).await?,
        })
    }

    // ==================== Titles ====================

    /// Add a localized title to one's own upload.
    pub async fn add_title(
        &self,
        user_id: &str,
        target: &ContentRef,
        input: AddTitleInput,
    ) -> AppResult<content_title::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.uploaded_by(user_id, target).await?;

        if let Some(ref language_id) = input.language_id
            && self.language_repo.find_by_id(language_id).await?.is_none()
        {
            return Err(AppError::BadRequest(format!("Unknown language {language_id}")));
        }

        let txn = self.lock_target(target).await?;
        let title = self
            .title_repo
            .create_in(
                &txn,
                content_title::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    title_text: Set(input.title_text),
                    language_id: Set(input.language_id),
                    is_native: Set(input.is_native),
                    content_type: Set(target.kind.as_str().to_string()),
                    content_id: Set(target.id.clone()),
                },
            )
            .await?;
        commit(txn).await?;

        Ok(title)
    }

    /// Titles of a content item, native title first.
    pub async fn titles(&self, target: &ContentRef) -> AppResult<Vec<content_title::Model>> {
        self.title_repo.list_for_target(target).await
    }

    // ==================== Video details ====================

    /// Set the title and description of one's own video in one language,
    /// replacing any earlier localization for that language.
    pub async fn set_localization(
        &self,
        user_id: &str,
        video_id: &str,
        input: SetLocalizationInput,
    ) -> AppResult<video_localization::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let target = ContentRef::new(ContentKind::Video, video_id);
        self.uploaded_by(user_id, &target).await?;

        let txn = self.lock_target(&target).await?;
        let existing = self
            .localization_repo
            .find_in(&txn, video_id, &input.language)
            .await?;

        let saved = match existing {
            Some(current) => {
                let mut active: video_localization::ActiveModel = current.into();
                active.title = Set(input.title);
                active.description = Set(input.description);
                self.localization_repo.update_in(&txn, active).await?
            }
            None => {
                self.localization_repo
                    .create_in(
                        &txn,
                        video_localization::ActiveModel {
                            id: Set(self.id_gen.generate()),
                            video_id: Set(video_id.to_string()),
                            language: Set(input.language),
                            title: Set(input.title),
                            description: Set(input.description),
                        },
                    )
                    .await?
            }
        };
        commit(txn).await?;

        Ok(saved)
    }

    /// Remove the localization of one's own video for `language`.
    pub async fn delete_localization(
        &self,
        user_id: &str,
        video_id: &str,
        language: &str,
    ) -> AppResult<()> {
        let target = ContentRef::new(ContentKind::Video, video_id);
        self.uploaded_by(user_id, &target).await?;

        if !self.localization_repo.delete(video_id, language).await? {
            return Err(AppError::NotFound(format!(
                "Localization {language} of video {video_id}"
            )));
        }
        Ok(())
    }

    pub async fn localizations(
        &self,
        video_id: &str,
    ) -> AppResult<Vec<video_localization::Model>> {
        self.video_repo.get_by_id(video_id).await?;
        self.localization_repo.list_for_video(video_id).await
    }

    /// Record the channel one's own video belongs to. A video has at most
    /// one channel; setting it again overwrites.
    pub async fn set_channel(
        &self,
        user_id: &str,
        video_id: &str,
        input: SetChannelInput,
    ) -> AppResult<channel_detail::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let target = ContentRef::new(ContentKind::Video, video_id);
        self.uploaded_by(user_id, &target).await?;

        let txn = self.lock_target(&target).await?;
        let saved = match self.channel_repo.find_for_video_in(&txn, video_id).await? {
            Some(current) => {
                let mut active: channel_detail::ActiveModel = current.into();
                active.channel_title = Set(input.channel_title);
                active.channel_id = Set(input.channel_id);
                self.channel_repo.update_in(&txn, active).await?
            }
            None => {
                self.channel_repo
                    .create_in(
                        &txn,
                        channel_detail::ActiveModel {
                            id: Set(self.id_gen.generate()),
                            video_id: Set(video_id.to_string()),
                            channel_title: Set(input.channel_title),
                            channel_id: Set(input.channel_id),
                        },
                    )
                    .await?
            }
        };
        commit(txn).await?;

        Ok(saved)
    }

    pub async fn channel(&self, video_id: &str) -> AppResult<Option<channel_detail::Model>> {
        self.video_repo.get_by_id(video_id).await?;
        self.channel_repo.find_for_video(video_id).await
    }

    /// Attach a thumbnail to one's own video.
    pub async fn add_thumbnail(
        &self,
        user_id: &str,
        video_id: &str,
        input: AddThumbnailInput,
    ) -> AppResult<thumbnail_detail::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let target = ContentRef::new(ContentKind::Video, video_id);
        self.uploaded_by(user_id, &target).await?;

        let txn = self.lock_target(&target).await?;
        let thumbnail = self
            .thumbnail_repo
            .create_in(
                &txn,
                thumbnail_detail::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    video_id: Set(video_id.to_string()),
                    url: Set(input.url),
                    width: Set(input.width),
                    height: Set(input.height),
                },
            )
            .await?;
        commit(txn).await?;

        Ok(thumbnail)
    }

    /// Thumbnails of a video, largest first.
    pub async fn thumbnails(&self, video_id: &str) -> AppResult<Vec<thumbnail_detail::Model>> {
        self.video_repo.get_by_id(video_id).await?;
        self.thumbnail_repo.list_for_video(video_id).await
    }

    /// Remove a thumbnail from one's own video.
    pub async fn delete_thumbnail(&self, user_id: &str, thumbnail_id: &str) -> AppResult<()> {
        let thumbnail = self
            .thumbnail_repo
            .find_by_id(thumbnail_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Thumbnail {thumbnail_id}")))?;
        let target = ContentRef::new(ContentKind::Video, thumbnail.video_id);
        self.uploaded_by(user_id, &target).await?;

        self.thumbnail_repo.delete(thumbnail_id).await?;
        Ok(())
    }

    // ==================== Helpers ====================

    async fn lock_target(&self, target: &ContentRef) -> AppResult<DatabaseTransaction> {
        self.association
            .registry()
            .begin_locked(&self.db, target)
            .await
    }

    async fn uploaded_by(&self, user_id: &str, target: &ContentRef) -> AppResult<ContentItem> {
        self.association
            .registry()
            .require_uploaded_by(user_id, target)
            .await
    }

    async fn check_metadata_links(&self, meta: &ContentMetadataInput) -> AppResult<()> {
        if let Some(ref id) = meta.original_language_id
            && self.language_repo.find_by_id(id).await?.is_none()
        {
            return Err(AppError::BadRequest(format!("Unknown language {id}")));
        }

        if let Some(ref id) = meta.upload_region_id
            && self.region_repo.find_by_id(id).await?.is_none()
        {
            return Err(AppError::BadRequest(format!("Unknown region {id}")));
        }

        Ok(())
    }
}

async fn commit(txn: DatabaseTransaction) -> AppResult<()> {
    txn.commit()
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
