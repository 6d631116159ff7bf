//! Polymorphic content references.
//!
//! Comments, reactions, playlist entries, credits and titles point at
//! "any content" through a `(content_type, content_id)` column pair instead
//! of a foreign key per content table. This module holds the typed side of
//! that pair and the two store traits the core services dispatch through:
//!
//! - [`ContentStore`] is implemented once per content table (video, podcast).
//! - [`DependentStore`] is implemented by every table holding a reference, so
//!   deleting a content row can cascade across all of them.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait, IdenStatic,
    QueryFilter, QuerySelect,
    sea_query::{Expr, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use vv_common::{AppError, AppResult};

/// Type tag of a content table.
///
/// The string form is what gets persisted in `content_type` columns; a tag is
/// never reassigned to a different table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Podcast,
}

impl ContentKind {
    /// Every known tag.
    pub const ALL: [Self; 2] = [Self::Video, Self::Podcast];

    /// Persisted tag value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Podcast => "podcast",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored tag names no known content table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content type: {0}")]
pub struct UnknownContentKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownContentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "podcast" => Ok(Self::Podcast),
            other => Err(UnknownContentKind(other.to_string())),
        }
    }
}

/// A `(type tag, id)` pair pointing at one content row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRef {
    pub kind: ContentKind,
    pub id: String,
}

impl ContentRef {
    #[must_use]
    pub fn new(kind: ContentKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Parse a stored column pair. Unknown tags yield `None`.
    #[must_use]
    pub fn from_columns(content_type: &str, content_id: &str) -> Option<Self> {
        content_type
            .parse()
            .ok()
            .map(|kind| Self::new(kind, content_id))
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Anything stored with a polymorphic content reference.
pub trait HasContentRef {
    /// The referenced content, or `None` when the stored tag is unknown.
    fn content_ref(&self) -> Option<ContentRef>;
}

/// Variant-independent view of a content row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub kind: ContentKind,
    pub id: String,
    pub uploaded_by: Option<String>,
    pub description: Option<String>,
    pub like_count: i32,
    pub dislike_count: i32,
    pub comment_count: i32,
    pub view_count: i64,
    pub created_at: DateTime<FixedOffset>,
}

impl ContentItem {
    #[must_use]
    pub fn content_ref(&self) -> ContentRef {
        ContentRef::new(self.kind, self.id.clone())
    }
}

/// Change to apply to the denormalized counters of one content row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub likes: i64,
    pub dislikes: i64,
    pub comments: i64,
    pub views: i64,
}

impl CounterDelta {
    /// Counter change for a newly stored reaction.
    #[must_use]
    pub const fn reaction_added(is_like: bool) -> Self {
        if is_like {
            Self::likes(1)
        } else {
            Self::dislikes(1)
        }
    }

    /// Counter change for a removed reaction.
    #[must_use]
    pub const fn reaction_removed(is_like: bool) -> Self {
        if is_like {
            Self::likes(-1)
        } else {
            Self::dislikes(-1)
        }
    }

    /// Counter change for a reaction whose value went from `old` to `new`.
    #[must_use]
    pub const fn reaction_changed(old: bool, new: bool) -> Self {
        match (old, new) {
            (true, false) => Self {
                likes: -1,
                dislikes: 1,
                comments: 0,
                views: 0,
            },
            (false, true) => Self {
                likes: 1,
                dislikes: -1,
                comments: 0,
                views: 0,
            },
            _ => Self::ZERO,
        }
    }

    pub const ZERO: Self = Self {
        likes: 0,
        dislikes: 0,
        comments: 0,
        views: 0,
    };

    #[must_use]
    pub const fn likes(n: i64) -> Self {
        Self {
            likes: n,
            ..Self::ZERO
        }
    }

    #[must_use]
    pub const fn dislikes(n: i64) -> Self {
        Self {
            dislikes: n,
            ..Self::ZERO
        }
    }

    #[must_use]
    pub const fn comments(n: i64) -> Self {
        Self {
            comments: n,
            ..Self::ZERO
        }
    }

    #[must_use]
    pub const fn views(n: i64) -> Self {
        Self {
            views: n,
            ..Self::ZERO
        }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.likes == 0 && self.dislikes == 0 && self.comments == 0 && self.views == 0
    }
}

/// Storage for one content table.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Tag this store serves.
    fn kind(&self) -> ContentKind;

    /// Load a row as a [`ContentItem`].
    async fn find_item(&self, id: &str) -> AppResult<Option<ContentItem>>;

    /// Lock the row until the transaction ends (`SELECT ... FOR UPDATE`).
    ///
    /// Returns `false` when no row has this id. Anything that writes rows
    /// referencing content takes this lock (or the counter update's) before
    /// touching them, so a concurrent cascade sees either all of them or none.
    async fn lock_in(&self, txn: &DatabaseTransaction, id: &str) -> AppResult<bool>;

    /// Apply `delta` in place (`col = col + n`). Decrements never go below zero.
    ///
    /// Returns `false` when no row has this id. The update takes the row lock,
    /// so concurrent writers on the same row serialize.
    async fn apply_counters(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
        delta: CounterDelta,
    ) -> AppResult<bool>;

    /// Overwrite like/dislike totals, used when recounting from reaction rows.
    async fn set_reaction_counts(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
        likes: i32,
        dislikes: i32,
    ) -> AppResult<bool>;

    /// Delete the row. Returns `false` when no row has this id.
    async fn delete_in(&self, txn: &DatabaseTransaction, id: &str) -> AppResult<bool>;
}

/// Handle to one row holding a content reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentRef {
    pub kind: &'static str,
    pub id: String,
}

/// A table whose rows reference content and must go when the content goes.
#[async_trait]
pub trait DependentStore: Send + Sync {
    /// Short name of the dependent kind (`comment`, `reaction`, ...).
    fn kind(&self) -> &'static str;

    /// Rows referencing `target`.
    async fn find_by_target(&self, target: &ContentRef) -> AppResult<Vec<DependentRef>>;

    /// Delete every row referencing `target`, returning how many were removed.
    async fn delete_by_target(
        &self,
        txn: &DatabaseTransaction,
        target: &ContentRef,
    ) -> AppResult<u64>;
}

/// `content_type = ? AND content_id = ?` for a dependent table.
pub(crate) fn target_condition<C: ColumnTrait>(
    type_column: C,
    id_column: C,
    target: &ContentRef,
) -> Condition {
    Condition::all()
        .add(type_column.eq(target.kind.as_str()))
        .add(id_column.eq(target.id.as_str()))
}

fn counter_expr<C: ColumnTrait>(column: C, delta: i64) -> SimpleExpr {
    if delta >= 0 {
        Expr::col(column).add(delta)
    } else {
        let name = column.as_str();
        Expr::cust(format!("GREATEST({name} - {}, 0)", delta.unsigned_abs()))
    }
}

/// Shared `SELECT id ... FOR UPDATE` for content tables.
pub(crate) async fn lock_content_row<E>(
    txn: &DatabaseTransaction,
    id_column: E::Column,
    id: &str,
) -> AppResult<bool>
where
    E: EntityTrait,
{
    let found = E::find()
        .select_only()
        .column(id_column)
        .filter(id_column.eq(id))
        .lock_exclusive()
        .into_tuple::<String>()
        .one(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(found.is_some())
}

/// Shared `UPDATE ... SET counter = counter + n WHERE id = ?` for content tables.
pub(crate) async fn apply_counter_delta<E, C>(
    conn: &C,
    id_column: E::Column,
    id: &str,
    columns: [(E::Column, i64); 4],
) -> AppResult<bool>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let changes: Vec<_> = columns.into_iter().filter(|(_, d)| *d != 0).collect();
    if changes.is_empty() {
        // Nothing to write; callers skip zero deltas before getting here.
        return Ok(false);
    }

    let mut update = E::update_many();
    for (column, delta) in changes {
        update = update.col_expr(column, counter_expr(column, delta));
    }

    let result = update
        .filter(id_column.eq(id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(result.rows_affected > 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_tag() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.as_str().parse::<ContentKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = "article".parse::<ContentKind>().unwrap_err();
        assert_eq!(err, UnknownContentKind("article".to_string()));
    }

    #[test]
    fn test_from_columns_unknown_tag_is_none() {
        assert!(ContentRef::from_columns("movie", "abc").is_none());
        assert_eq!(
            ContentRef::from_columns("podcast", "abc"),
            Some(ContentRef::new(ContentKind::Podcast, "abc"))
        );
    }

    #[test]
    fn test_content_ref_display() {
        let target = ContentRef::new(ContentKind::Video, "01h");
        assert_eq!(target.to_string(), "video:01h");
    }

    #[test]
    fn test_reaction_delta_transitions() {
        assert_eq!(CounterDelta::reaction_added(true), CounterDelta::likes(1));
        assert_eq!(
            CounterDelta::reaction_added(false),
            CounterDelta::dislikes(1)
        );
        assert_eq!(
            CounterDelta::reaction_removed(true),
            CounterDelta::likes(-1)
        );

        let flipped = CounterDelta::reaction_changed(true, false);
        assert_eq!((flipped.likes, flipped.dislikes), (-1, 1));

        let flipped_back = CounterDelta::reaction_changed(false, true);
        assert_eq!((flipped_back.likes, flipped_back.dislikes), (1, -1));

        assert!(CounterDelta::reaction_changed(true, true).is_zero());
        assert!(CounterDelta::reaction_changed(false, false).is_zero());
    }

    #[test]
    fn test_serde_tag_is_lowercase() {
        let json = serde_json::to_string(&ContentKind::Podcast).unwrap_or_default();
        assert_eq!(json, "\"podcast\"");
    }
}
