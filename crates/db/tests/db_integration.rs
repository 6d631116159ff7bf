//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5432)
//!   `TEST_DB_USER` (default: `vv_test`)
//!   `TEST_DB_PASSWORD` (default: `vv_test`)
//!   `TEST_DB_NAME` (default: `vv_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ConnectionTrait, Set, TransactionTrait};
use vv_db::content::{ContentKind, ContentRef, ContentStore, CounterDelta, DependentStore};
use vv_db::entities::{comment, user, video};
use vv_db::repositories::{CommentRepository, UserRepository, VideoRepository};
use vv_db::test_utils::{TestDatabase, TestDbConfig};

async fn seed_user(repo: &UserRepository, id: &str) -> user::Model {
    repo.create(user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(id.to_string()),
        email: Set(format!("{id}@example.com")),
        token: Set(Some(format!("token-{id}"))),
        is_verified: Set(true),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
        ..Default::default()
    })
    .await
    .unwrap()
}

async fn seed_video(repo: &VideoRepository, id: &str, uploader: &str) -> video::Model {
    repo.create(video::ActiveModel {
        id: Set(id.to_string()),
        uploaded_by: Set(Some(uploader.to_string())),
        file_url: Set(format!("https://cdn.example.com/{id}.mp4")),
        format: Set(video::VideoFormat::Mp4),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    })
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_execute_query() {
    let db = TestDatabase::new().await.expect("Failed to connect");

    let result = db
        .connection()
        .execute(sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await;

    assert!(result.is_ok(), "Query failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_counter_decrement_floors_at_zero() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(sea_orm::Database::connect(db.config.database_url()).await.unwrap());
    let users = UserRepository::new(conn.clone());
    let videos = VideoRepository::new(conn.clone());

    seed_user(&users, "u1").await;
    seed_video(&videos, "v1", "u1").await;

    let txn = conn.begin().await.unwrap();
    assert!(videos
        .apply_counters(&txn, "v1", CounterDelta::likes(1))
        .await
        .unwrap());
    assert!(videos
        .apply_counters(&txn, "v1", CounterDelta::likes(-3))
        .await
        .unwrap());
    assert!(!videos
        .apply_counters(&txn, "missing", CounterDelta::likes(1))
        .await
        .unwrap());
    txn.commit().await.unwrap();

    let item = videos.find_item("v1").await.unwrap().unwrap();
    assert_eq!(item.like_count, 0);

    drop((users, videos, conn));
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_comment_dependents_by_target() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(sea_orm::Database::connect(db.config.database_url()).await.unwrap());
    let users = UserRepository::new(conn.clone());
    let videos = VideoRepository::new(conn.clone());
    let comments = CommentRepository::new(conn.clone());

    seed_user(&users, "u1").await;
    seed_video(&videos, "v1", "u1").await;

    for id in ["c1", "c2"] {
        comments
            .create_in(
                conn.as_ref(),
                comment::ActiveModel {
                    id: Set(id.to_string()),
                    text: Set("hello".to_string()),
                    posted_by: Set("u1".to_string()),
                    content_type: Set("video".to_string()),
                    content_id: Set("v1".to_string()),
                    created_at: Set(Utc::now().into()),
                    updated_at: Set(None),
                },
            )
            .await
            .unwrap();
    }

    let target = ContentRef::new(ContentKind::Video, "v1");
    let other = ContentRef::new(ContentKind::Podcast, "v1");

    assert_eq!(comments.find_by_target(&target).await.unwrap().len(), 2);
    // Same id under a different tag is a different target.
    assert!(comments.find_by_target(&other).await.unwrap().is_empty());

    let txn = conn.begin().await.unwrap();
    assert_eq!(comments.delete_by_target(&txn, &target).await.unwrap(), 2);
    txn.commit().await.unwrap();

    assert_eq!(comments.count_for_target(&target).await.unwrap(), 0);

    drop((users, videos, comments, conn));
    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
