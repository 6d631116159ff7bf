//! User service.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vv_common::{AppError, AppResult, IdGenerator};
use vv_db::{
    content::{ContentRef, CounterDelta, HasContentRef},
    entities::user::{self, Gender},
    repositories::{CommentRepository, UserRepository},
};

use super::content_registry::ContentRegistry;

/// Input for registering a user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    /// Registration is refused unless both agreements are given.
    #[serde(default)]
    pub has_agreed_to_terms: bool,
    #[serde(default)]
    pub has_agreed_to_privacy_policy: bool,
}

/// Partial profile update. Absent fields are left unchanged; clearing an
/// optional field is not supported.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub username: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    #[validate(length(max = 128))]
    pub city: Option<String>,
    #[validate(length(max = 128))]
    pub state: Option<String>,
    #[validate(length(equal = 2))]
    pub country: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    #[validate(length(min = 2, max = 10))]
    pub preferred_language: Option<String>,
    pub has_finished_onboarding: Option<bool>,
}

/// Outcome of a profile update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    /// At least one field changed.
    Updated(user::Model),
    /// Every given value matched the stored one; nothing was written.
    Unchanged(user::Model),
}

/// A freshly registered user and the only copy of their token.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedUser {
    pub user: user::Model,
    pub token: String,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    user_repo: UserRepository,
    comment_repo: CommentRepository,
    registry: Arc<ContentRegistry>,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        user_repo: UserRepository,
        comment_repo: CommentRepository,
        registry: Arc<ContentRegistry>,
    ) -> Self {
        Self {
            db,
            user_repo,
            comment_repo,
            registry,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a user and issue an API token.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<CreatedUser> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if !input.has_agreed_to_terms {
            return Err(AppError::Validation(
                "You must agree to the terms".to_string(),
            ));
        }
        if !input.has_agreed_to_privacy_policy {
            return Err(AppError::Validation(
                "You must agree to the privacy policy".to_string(),
            ));
        }

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let token = self.id_gen.generate_token();
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            email: Set(input.email),
            token: Set(Some(token.clone())),
            is_verified: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            has_agreed_to_terms: Set(true),
            has_agreed_to_privacy_policy: Set(true),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, "User registered");

        Ok(CreatedUser { user, token })
    }

    /// Look up the owner of a bearer token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Fetch a user, failing with `UserNotFound`.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Users newest first, paged with `until_id`.
    pub async fn list(&self, limit: u64, until_id: Option<&str>) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_recent(limit, until_id).await
    }

    /// Apply a partial profile update.
    ///
    /// A new email address clears `is_verified`. Username and email stay
    /// unique across accounts.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<ProfileUpdate> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self.user_repo.get_by_id(user_id).await?;

        if let Some(username) = input.username.as_deref().filter(|u| *u != user.username) {
            if self.user_repo.find_by_username(username).await?.is_some() {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
        }
        if let Some(email) = input.email.as_deref().filter(|e| *e != user.email) {
            if self.user_repo.find_by_email(email).await?.is_some() {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }

        let mut active: user::ActiveModel = user.clone().into();
        let mut changed = false;

        macro_rules! apply {
            ($field:ident) => {
                if let Some(value) = input.$field {
                    if user.$field != value {
                        active.$field = Set(value);
                        changed = true;
                    }
                }
            };
            ($field:ident, optional) => {
                if let Some(value) = input.$field {
                    if user.$field.as_ref() != Some(&value) {
                        active.$field = Set(Some(value));
                        changed = true;
                    }
                }
            };
        }

        apply!(username);
        apply!(first_name, optional);
        apply!(last_name, optional);
        apply!(gender, optional);
        apply!(dob, optional);
        apply!(city, optional);
        apply!(state, optional);
        apply!(country, optional);
        apply!(bio, optional);
        apply!(preferred_language);
        apply!(has_finished_onboarding);

        if let Some(email) = input.email {
            if user.email != email {
                active.email = Set(email);
                active.is_verified = Set(false);
                changed = true;
            }
        }

        if !changed {
            return Ok(ProfileUpdate::Unchanged(user));
        }

        active.updated_at = Set(Some(Utc::now().into()));
        let updated = self.user_repo.update(active).await?;
        tracing::info!(user_id = %updated.id, "Profile updated");

        Ok(ProfileUpdate::Updated(updated))
    }

    /// Replace the user's token; the old one stops working immediately.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        Ok(token)
    }

    /// Delete an account.
    ///
    /// The user's comments go with the account, so `comment_count` on every
    /// content item they commented on drops first. Reactions and uploads are
    /// kept with their author column cleared.
    ///
    /// The user row is locked before the comments are collected. A comment
    /// posted concurrently waits on that lock, so every comment deleted with
    /// the account has been counted.
    pub async fn delete(&self, user_id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if self.user_repo.find_for_update(&txn, user_id).await?.is_none() {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }

        let comments = self.comment_repo.find_all_by_user_in(&txn, user_id).await?;

        // Sorted, so concurrent deletions lock content rows in one order.
        let mut per_target: BTreeMap<ContentRef, i64> = BTreeMap::new();
        for comment in &comments {
            if let Some(target) = comment.content_ref() {
                *per_target.entry(target).or_default() += 1;
            }
        }

        for (target, count) in per_target {
            // Comments on content that is already gone have nothing to decrement.
            let Some(store) = self.registry.store(target.kind) else {
                continue;
            };
            if !store
                .apply_counters(&txn, &target.id, CounterDelta::comments(-count))
                .await?
            {
                tracing::debug!(content = %target, "Skipping counter on dangling comment target");
            }
        }

        if !self.user_repo.delete_in(&txn, user_id).await? {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(user_id = %user_id, comments = comments.len(), "User deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use vv_db::{
        entities::comment,
        repositories::{PodcastRepository, VideoRepository},
    };

    fn test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            token: Some("tok".to_string()),
            is_verified: false,
            created_at: Utc::now().into(),
            updated_at: None,
            first_name: None,
            last_name: None,
            gender: None,
            dob: None,
            city: None,
            state: None,
            country: None,
            bio: None,
            preferred_language: "en".to_string(),
            has_agreed_to_terms: true,
            has_agreed_to_privacy_policy: true,
            has_finished_onboarding: false,
        }
    }

    fn signup(username: &str, email: &str) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            email: email.to_string(),
            has_agreed_to_terms: true,
            has_agreed_to_privacy_policy: true,
        }
    }

    fn test_comment(id: &str, content_type: &str, content_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            text: "hi".to_string(),
            posted_by: "user1".to_string(),
            content_type: content_type.to_string(),
            content_id: content_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> UserService {
        let db = Arc::new(db.into_connection());
        let registry = ContentRegistry::new()
            .with_store(Arc::new(VideoRepository::new(db.clone())))
            .unwrap()
            .with_store(Arc::new(PodcastRepository::new(db.clone())))
            .unwrap();

        UserService::new(
            db.clone(),
            UserRepository::new(db.clone()),
            CommentRepository::new(db),
            Arc::new(registry),
        )
    }

    #[tokio::test]
    async fn test_create_user_issues_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[test_user("u1", "alice")]]);

        let created = service(db)
            .create(signup("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(created.user.username, "alice");
        assert!(!created.token.is_empty());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", "alice")]]);

        let result = service(db)
            .create(signup("alice", "other@example.com"))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_user_invalid_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let result = service(db)
            .create(signup("alice", "not-an-email"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_user_without_terms_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let result = service(db)
            .create(CreateUserInput {
                has_agreed_to_terms: false,
                ..signup("alice", "alice@example.com")
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_profile_email_change_clears_verification() {
        let mut verified = test_user("u1", "alice");
        verified.is_verified = true;
        let mut updated = verified.clone();
        updated.email = "new@example.com".to_string();
        updated.is_verified = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[verified]])
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[updated]]);

        let result = service(db)
            .update_profile(
                "u1",
                UpdateProfileInput {
                    email: Some("new@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ProfileUpdate::Updated(user) = result else {
            panic!("expected an update");
        };
        assert!(!user.is_verified);
    }

    #[tokio::test]
    async fn test_update_profile_same_values_is_unchanged() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", "alice")]]);

        let result = service(db)
            .update_profile(
                "u1",
                UpdateProfileInput {
                    username: Some("alice".to_string()),
                    preferred_language: Some("en".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(result, ProfileUpdate::Unchanged(_)));
    }

    #[tokio::test]
    async fn test_update_profile_taken_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", "alice")]])
            .append_query_results([[test_user("u2", "bob")]]);

        let result = service(db)
            .update_profile(
                "u1",
                UpdateProfileInput {
                    username: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_long_country_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let result = service(db)
            .update_profile(
                "u1",
                UpdateProfileInput {
                    country: Some("USA".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let result = service(db).authenticate_by_token("nope").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_delete_user_decrements_comment_counts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("user1", "alice")]])
            .append_query_results([vec![
                test_comment("c1", "video", "v1"),
                test_comment("c2", "video", "v1"),
                test_comment("c3", "article", "a1"),
            ]])
            .append_exec_results([
                // comment_count on video v1
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                // user row
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ]);

        service(db).delete("user1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        // Nothing after the locking read is queued: the comment scan must not run.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let result = service(db).delete("ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_locks_user_before_reading_comments() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("user1", "alice")]])
                .append_query_results([Vec::<comment::Model>::new()])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = UserService::new(
            db.clone(),
            UserRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            Arc::new(ContentRegistry::new()),
        );

        service.delete("user1").await.unwrap();
        drop(service);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        let user_lock = log.find("FOR UPDATE").unwrap();
        let comment_scan = log.find(r#"FROM \"comment\""#).unwrap();
        assert!(user_lock < comment_scan);
    }
}
