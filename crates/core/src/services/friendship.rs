//! Friendship service: friend requests between users.
//!
//! A request goes from `requested_by` to `sent_to` and starts out pending.
//! Only the recipient answers it. Either party can delete the row, which is
//! how a friendship ends or a request is withdrawn. A rejected request may be
//! sent again; the old row is replaced.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, DatabaseTransaction, Set, TransactionTrait};
use serde::Deserialize;
use validator::Validate;
use vv_common::{AppError, AppResult, IdGenerator};
use vv_db::{
    entities::friendship::{self, FriendshipStatus},
    repositories::{FriendshipRepository, UserRepository},
};

/// Input for sending a friend request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestInput {
    pub user_id: String,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

/// Which friendships to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipListing {
    /// Accepted, either direction.
    Friends,
    /// Pending requests sent to the user.
    Incoming,
    /// Pending requests the user sent.
    Outgoing,
}

/// Friendship service for business logic.
#[derive(Clone)]
pub struct FriendshipService {
    db: Arc<DatabaseConnection>,
    friendship_repo: FriendshipRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FriendshipService {
    /// Create a new friendship service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            friendship_repo: FriendshipRepository::new(db.clone()),
            user_repo: UserRepository::new(db.clone()),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Send a friend request from `user_id`.
    pub async fn request(
        &self,
        user_id: &str,
        input: SendFriendRequestInput,
    ) -> AppResult<friendship::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if input.user_id == user_id {
            return Err(AppError::BadRequest(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }

        let txn = self.begin().await?;
        // Both users in id order so two crossing requests cannot deadlock.
        let (first, second) = if user_id < input.user_id.as_str() {
            (user_id, input.user_id.as_str())
        } else {
            (input.user_id.as_str(), user_id)
        };
        for id in [first, second] {
            if !self.user_repo.lock_shared_in(&txn, id).await? {
                return Err(AppError::UserNotFound(id.to_string()));
            }
        }

        for existing in self
            .friendship_repo
            .find_between_for_update(&txn, user_id, &input.user_id)
            .await?
        {
            match existing.status {
                FriendshipStatus::Pending => {
                    return Err(AppError::Conflict("Friend request already pending".to_string()));
                }
                FriendshipStatus::Accepted => {
                    return Err(AppError::Conflict("Already friends".to_string()));
                }
                FriendshipStatus::Rejected => {
                    self.friendship_repo.delete_in(&txn, &existing.id).await?;
                }
            }
        }

        let created = self
            .friendship_repo
            .create_in(
                &txn,
                friendship::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    requested_by: Set(user_id.to_string()),
                    sent_to: Set(input.user_id),
                    status: Set(FriendshipStatus::Pending),
                    message: Set(input.message),
                    created_at: Set(Utc::now().into()),
                    friend_since: Set(None),
                },
            )
            .await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            friendship_id = %created.id,
            requested_by = %created.requested_by,
            sent_to = %created.sent_to,
            "Friend request sent"
        );
        Ok(created)
    }

    /// Accept a pending request addressed to `user_id`.
    pub async fn accept(&self, user_id: &str, friendship_id: &str) -> AppResult<friendship::Model> {
        self.answer(user_id, friendship_id, FriendshipStatus::Accepted)
            .await
    }

    /// Reject a pending request addressed to `user_id`.
    pub async fn reject(&self, user_id: &str, friendship_id: &str) -> AppResult<friendship::Model> {
        self.answer(user_id, friendship_id, FriendshipStatus::Rejected)
            .await
    }

    async fn answer(
        &self,
        user_id: &str,
        friendship_id: &str,
        status: FriendshipStatus,
    ) -> AppResult<friendship::Model> {
        let txn = self.begin().await?;
        let current = self
            .friendship_repo
            .find_for_update(&txn, friendship_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Friendship {friendship_id}")))?;

        if current.sent_to != user_id {
            return Err(AppError::Forbidden(
                "Only the recipient can answer a friend request".to_string(),
            ));
        }
        if current.status != FriendshipStatus::Pending {
            return Err(AppError::Conflict(
                "Friend request was already answered".to_string(),
            ));
        }

        let mut active: friendship::ActiveModel = current.into();
        active.status = Set(status);
        if status == FriendshipStatus::Accepted {
            active.friend_since = Set(Some(Utc::now().into()));
        }
        let updated = self.friendship_repo.update_in(&txn, active).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(friendship_id = %updated.id, status = ?updated.status, "Friend request answered");
        Ok(updated)
    }

    /// Withdraw a request or end a friendship. Either party may do it.
    pub async fn delete(&self, user_id: &str, friendship_id: &str) -> AppResult<()> {
        let txn = self.begin().await?;
        let current = self
            .friendship_repo
            .find_for_update(&txn, friendship_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Friendship {friendship_id}")))?;

        if !current.involves(user_id) {
            return Err(AppError::Forbidden("Not part of this friendship".to_string()));
        }

        self.friendship_repo.delete_in(&txn, friendship_id).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Friendships of `user_id` of one listing kind, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        listing: FriendshipListing,
        limit: u64,
    ) -> AppResult<Vec<friendship::Model>> {
        let (status, incoming, outgoing) = match listing {
            FriendshipListing::Friends => (FriendshipStatus::Accepted, true, true),
            FriendshipListing::Incoming => (FriendshipStatus::Pending, true, false),
            FriendshipListing::Outgoing => (FriendshipStatus::Pending, false, true),
        };
        self.friendship_repo
            .list_for_user(user_id, status, incoming, outgoing, limit)
            .await
    }
}
