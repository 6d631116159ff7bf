//! Reaction service.
//!
//! Every operation writes the reaction row and adjusts the target's
//! like/dislike counters in one transaction. Counter writes are in-place
//! `UPDATE ... SET like_count = like_count + 1` statements, so concurrent
//! reactions on the same target serialize on the content row instead of
//! overwriting each other.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, DatabaseTransaction, Set, TransactionTrait};
use serde::Serialize;
use vv_common::{AppError, AppResult, IdGenerator};
use vv_db::{
    content::{ContentRef, CounterDelta, HasContentRef},
    entities::reaction,
    repositories::{ReactionRepository, UserRepository},
};

use super::content_registry::ContentRegistry;

/// Like/dislike totals recomputed from reaction rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionTally {
    pub likes: u64,
    pub dislikes: u64,
}

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    db: Arc<DatabaseConnection>,
    reaction_repo: ReactionRepository,
    user_repo: UserRepository,
    registry: Arc<ContentRegistry>,
    unique_reactions: bool,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        reaction_repo: ReactionRepository,
        registry: Arc<ContentRegistry>,
        unique_reactions: bool,
    ) -> Self {
        Self {
            user_repo: UserRepository::new(db.clone()),
            db,
            reaction_repo,
            registry,
            unique_reactions,
            id_gen: IdGenerator::new(),
        }
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// React to a content item.
    ///
    /// The counter update runs first: it fails the whole operation when the
    /// target does not exist, and the row lock it takes makes the duplicate
    /// check below race-free for a given target.
    pub async fn create(
        &self,
        actor_id: &str,
        target: &ContentRef,
        is_like: bool,
    ) -> AppResult<reaction::Model> {
        let store = self.registry.store_for(target)?;
        let txn = self.begin().await?;
        self.lock_actor(&txn, actor_id).await?;

        if !store
            .apply_counters(&txn, &target.id, CounterDelta::reaction_added(is_like))
            .await?
        {
            return Err(AppError::ContentNotFound(target.to_string()));
        }

        if self.unique_reactions
            && self
                .reaction_repo
                .find_by_actor_and_target_in(&txn, actor_id, target)
                .await?
                .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Already reacted to {target}"
            )));
        }

        let created = self.insert_in(&txn, actor_id, target, is_like).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            reaction_id = %created.id,
            content = %target,
            is_like,
            "Reaction created"
        );

        Ok(created)
    }

    /// Change a reaction between like and dislike.
    ///
    /// The row is locked before its old value is read, so two concurrent
    /// flips cannot both apply the same transition.
    pub async fn update(
        &self,
        actor_id: &str,
        reaction_id: &str,
        is_like: bool,
    ) -> AppResult<reaction::Model> {
        let txn = self.begin().await?;

        let existing = self.lock_reaction(&txn, reaction_id).await?;

        if existing.posted_by.as_deref() != Some(actor_id) {
            return Err(AppError::Forbidden(
                "Cannot change another user's reaction".to_string(),
            ));
        }

        if existing.is_like == is_like {
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(existing);
        }

        let updated = self.change_in(&txn, existing, is_like).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(reaction_id = %updated.id, is_like, "Reaction updated");

        Ok(updated)
    }

    /// Remove a reaction.
    pub async fn delete(&self, actor_id: &str, reaction_id: &str) -> AppResult<()> {
        let txn = self.begin().await?;

        let existing = self.lock_reaction(&txn, reaction_id).await?;

        if existing.posted_by.as_deref() != Some(actor_id) {
            return Err(AppError::Forbidden(
                "Cannot delete another user's reaction".to_string(),
            ));
        }

        self.reaction_repo.delete_in(&txn, &existing.id).await?;

        let delta = CounterDelta::reaction_removed(existing.is_like);
        self.apply_to_target(&txn, &existing, delta).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(reaction_id = %existing.id, "Reaction deleted");

        Ok(())
    }

    /// Create the actor's reaction on `target`, or change the existing one.
    ///
    /// The lookup runs after the content row is locked. Every writer of
    /// reactions on this target takes that lock first, so concurrent calls
    /// for the same actor see each other's rows and never insert twice.
    pub async fn set(
        &self,
        actor_id: &str,
        target: &ContentRef,
        is_like: bool,
    ) -> AppResult<reaction::Model> {
        let store = self.registry.store_for(target)?;
        let txn = self.begin().await?;
        self.lock_actor(&txn, actor_id).await?;

        if !store.lock_in(&txn, &target.id).await? {
            return Err(AppError::ContentNotFound(target.to_string()));
        }

        let existing = self
            .reaction_repo
            .find_by_actor_and_target_in(&txn, actor_id, target)
            .await?;

        let result = match existing {
            Some(reaction) if reaction.is_like == is_like => reaction,
            Some(reaction) => self.change_in(&txn, reaction, is_like).await?,
            None => {
                store
                    .apply_counters(&txn, &target.id, CounterDelta::reaction_added(is_like))
                    .await?;
                self.insert_in(&txn, actor_id, target, is_like).await?
            }
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(reaction_id = %result.id, content = %target, is_like, "Reaction set");

        Ok(result)
    }

    /// Find a reaction by ID.
    pub async fn get(&self, reaction_id: &str) -> AppResult<reaction::Model> {
        self.reaction_repo
            .find_by_id(reaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reaction {reaction_id}")))
    }

    /// Reactions on a content item, newest first.
    pub async fn list_for_target(
        &self,
        target: &ContentRef,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<reaction::Model>> {
        self.reaction_repo
            .list_for_target(target, limit, until_id)
            .await
    }

    /// Reactions left by a user, newest first.
    pub async fn list_by_actor(
        &self,
        actor_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<reaction::Model>> {
        self.reaction_repo
            .list_by_actor(actor_id, limit, until_id)
            .await
    }

    /// Recompute the target's like/dislike counters from its reaction rows.
    ///
    /// The content row is locked before counting, so no reaction can land
    /// between the count and the write-back.
    pub async fn recount(&self, target: &ContentRef) -> AppResult<ReactionTally> {
        let store = self.registry.store_for(target)?;
        let txn = self.begin().await?;

        if !store.lock_in(&txn, &target.id).await? {
            return Err(AppError::ContentNotFound(target.to_string()));
        }

        let likes = self
            .reaction_repo
            .count_for_target_in(&txn, target, true)
            .await?;
        let dislikes = self
            .reaction_repo
            .count_for_target_in(&txn, target, false)
            .await?;

        store
            .set_reaction_counts(
                &txn,
                &target.id,
                i32::try_from(likes).unwrap_or(i32::MAX),
                i32::try_from(dislikes).unwrap_or(i32::MAX),
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(content = %target, likes, dislikes, "Recounted reactions");

        Ok(ReactionTally { likes, dislikes })
    }

    /// Shared lock on the actor row; a missing actor is `UserNotFound`.
    async fn lock_actor(&self, txn: &DatabaseTransaction, actor_id: &str) -> AppResult<()> {
        if self.user_repo.lock_shared_in(txn, actor_id).await? {
            Ok(())
        } else {
            Err(AppError::UserNotFound(actor_id.to_string()))
        }
    }

    /// Lock a reaction for writing.
    ///
    /// The target's content row is locked before the reaction row, the same
    /// order the content cascade uses.
    async fn lock_reaction(
        &self,
        txn: &DatabaseTransaction,
        reaction_id: &str,
    ) -> AppResult<reaction::Model> {
        let not_found = || AppError::NotFound(format!("Reaction {reaction_id}"));

        let existing = self
            .reaction_repo
            .find_by_id(reaction_id)
            .await?
            .ok_or_else(not_found)?;

        if let Some(target) = existing.content_ref()
            && let Some(store) = self.registry.store(target.kind)
        {
            store.lock_in(txn, &target.id).await?;
        }

        self.reaction_repo
            .find_for_update(txn, reaction_id)
            .await?
            .ok_or_else(not_found)
    }

    async fn insert_in(
        &self,
        txn: &DatabaseTransaction,
        actor_id: &str,
        target: &ContentRef,
        is_like: bool,
    ) -> AppResult<reaction::Model> {
        let model = reaction::ActiveModel {
            id: Set(self.id_gen.generate()),
            is_like: Set(is_like),
            posted_by: Set(Some(actor_id.to_string())),
            content_type: Set(target.kind.as_str().to_string()),
            content_id: Set(target.id.clone()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.reaction_repo.create_in(txn, model).await
    }

    /// Flip a locked reaction and move one count between like and dislike.
    async fn change_in(
        &self,
        txn: &DatabaseTransaction,
        existing: reaction::Model,
        is_like: bool,
    ) -> AppResult<reaction::Model> {
        let delta = CounterDelta::reaction_changed(existing.is_like, is_like);
        self.apply_to_target(txn, &existing, delta).await?;

        let mut active: reaction::ActiveModel = existing.into();
        active.is_like = Set(is_like);
        active.updated_at = Set(Some(Utc::now().into()));
        self.reaction_repo.update_in(txn, active).await
    }

    /// Apply `delta` to the reaction's target. A target that no longer
    /// exists (or has an unknown tag) is skipped.
    async fn apply_to_target(
        &self,
        txn: &DatabaseTransaction,
        reaction: &reaction::Model,
        delta: CounterDelta,
    ) -> AppResult<()> {
        let Some(target) = reaction.content_ref() else {
            tracing::debug!(
                reaction_id = %reaction.id,
                content_type = %reaction.content_type,
                "Skipping counters for unknown content type"
            );
            return Ok(());
        };

        let Some(store) = self.registry.store(target.kind) else {
            return Ok(());
        };

        if !store.apply_counters(txn, &target.id, delta).await? {
            tracing::debug!(
                reaction_id = %reaction.id,
                content = %target,
                "Skipping counters for dangling target"
            );
        }

        Ok(())
    }
}
