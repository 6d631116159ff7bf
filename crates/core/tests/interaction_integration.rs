//! End-to-end tests for reactions, comments and the content cascade.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p vv-core --test interaction_integration -- --ignored`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{Database, DatabaseConnection, Set, TransactionTrait};
use vv_core::{
    AddTitleInput, AssociationService, CatalogService, CommentService, ContentRegistry,
    CreateCommentInput, CreatePlaylistInput, NamedEntryInput, PlaylistService, ReactionService,
    TaxonomyService, UserService,
};
use vv_db::content::{ContentItem, ContentKind, ContentRef, ContentStore, CounterDelta};
use vv_db::entities::{
    cast_credit, comment, content_title, personnel, produce_credit, reaction, user, video,
};
use vv_db::repositories::{
    CastCreditRepository, CommentRepository, ContentCategoryRepository,
    ContentHashtagRepository, ContentTitleRepository, PersonnelRepository,
    PlaylistEntryRepository, PlaylistRepository, PodcastRepository, ProduceCreditRepository,
    ReactionRepository, UserRepository, VideoRepository,
};
use vv_db::test_utils::TestDatabase;

struct Harness {
    db: TestDatabase,
    conn: Arc<DatabaseConnection>,
    registry: Arc<ContentRegistry>,
    association: AssociationService,
    reactions: ReactionService,
    comments: CommentService,
    playlists: PlaylistService,
    users: UserService,
    catalog: CatalogService,
    taxonomy: TaxonomyService,
}

impl Harness {
    async fn new() -> Self {
        let db = TestDatabase::create_unique().await.unwrap();
        let conn = Arc::new(Database::connect(db.config.database_url()).await.unwrap());

        let registry = Arc::new(
            ContentRegistry::new()
                .with_store(Arc::new(VideoRepository::new(conn.clone())))
                .unwrap()
                .with_store(Arc::new(PodcastRepository::new(conn.clone())))
                .unwrap(),
        );

        let association = AssociationService::new(conn.clone(), registry.clone())
            .with_dependent(Arc::new(CommentRepository::new(conn.clone())))
            .unwrap()
            .with_dependent(Arc::new(ReactionRepository::new(conn.clone())))
            .unwrap()
            .with_dependent(Arc::new(PlaylistEntryRepository::new(conn.clone())))
            .unwrap()
            .with_dependent(Arc::new(CastCreditRepository::new(conn.clone())))
            .unwrap()
            .with_dependent(Arc::new(ProduceCreditRepository::new(conn.clone())))
            .unwrap()
            .with_dependent(Arc::new(ContentTitleRepository::new(conn.clone())))
            .unwrap()
            .with_dependent(Arc::new(ContentCategoryRepository::new(conn.clone())))
            .unwrap()
            .with_dependent(Arc::new(ContentHashtagRepository::new(conn.clone())))
            .unwrap();

        Self {
            reactions: ReactionService::new(
                conn.clone(),
                ReactionRepository::new(conn.clone()),
                registry.clone(),
                true,
            ),
            comments: CommentService::new(
                conn.clone(),
                CommentRepository::new(conn.clone()),
                registry.clone(),
            ),
            playlists: PlaylistService::new(
                conn.clone(),
                PlaylistRepository::new(conn.clone()),
                PlaylistEntryRepository::new(conn.clone()),
                registry.clone(),
            ),
            users: UserService::new(
                conn.clone(),
                UserRepository::new(conn.clone()),
                CommentRepository::new(conn.clone()),
                registry.clone(),
            ),
            catalog: CatalogService::new(conn.clone(), association.clone()),
            taxonomy: TaxonomyService::new(conn.clone(), association.clone()),
            association,
            registry,
            conn,
            db,
        }
    }

    async fn user(&self, id: &str) -> user::Model {
        UserRepository::new(self.conn.clone())
            .create(user::ActiveModel {
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

    async fn video(&self, id: &str, uploader: &str) -> ContentRef {
        VideoRepository::new(self.conn.clone())
            .create(video::ActiveModel {
                id: Set(id.to_string()),
                uploaded_by: Set(Some(uploader.to_string())),
                file_url: Set(format!("https://cdn.example.com/{id}.mp4")),
                format: Set(video::VideoFormat::Mp4),
                created_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .await
            .unwrap();
        ContentRef::new(ContentKind::Video, id)
    }

    async fn item(&self, target: &ContentRef) -> ContentItem {
        self.registry.resolve_ref(target).await.unwrap().unwrap()
    }

    async fn reactions_by(&self, actor: &str, target: &ContentRef) -> Vec<reaction::Model> {
        ReactionRepository::new(self.conn.clone())
            .list_for_target(target, 100, None)
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.posted_by.as_deref() == Some(actor))
            .collect()
    }

    async fn teardown(self) {
        let Self { db, .. } = self;
        db.drop_database().await.unwrap();
    }
}

fn counts(item: &ContentItem) -> (i32, i32) {
    (item.like_count, item.dislike_count)
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_reaction_lifecycle_keeps_counters_in_step() {
    let h = Harness::new().await;
    h.user("u1").await;
    let v = h.video("v1", "u1").await;

    let reaction = h.reactions.create("u1", &v, true).await.unwrap();
    assert_eq!(counts(&h.item(&v).await), (1, 0));

    h.reactions.update("u1", &reaction.id, false).await.unwrap();
    assert_eq!(counts(&h.item(&v).await), (0, 1));

    // Same value again changes nothing.
    h.reactions.update("u1", &reaction.id, false).await.unwrap();
    assert_eq!(counts(&h.item(&v).await), (0, 1));

    h.reactions.delete("u1", &reaction.id).await.unwrap();
    assert_eq!(counts(&h.item(&v).await), (0, 0));

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_counters_match_reaction_rows_after_mixed_operations() {
    let h = Harness::new().await;
    for id in ["u1", "u2", "u3", "u4"] {
        h.user(id).await;
    }
    let v = h.video("v1", "u1").await;

    let r1 = h.reactions.create("u1", &v, true).await.unwrap();
    h.reactions.create("u2", &v, true).await.unwrap();
    let r3 = h.reactions.create("u3", &v, false).await.unwrap();
    h.reactions.set("u4", &v, false).await.unwrap();
    h.reactions.set("u4", &v, true).await.unwrap();
    h.reactions.update("u1", &r1.id, false).await.unwrap();
    h.reactions.delete("u3", &r3.id).await.unwrap();

    let tally = h.reactions.recount(&v).await.unwrap();
    let item = h.item(&v).await;
    assert_eq!((tally.likes, tally.dislikes), (2, 1));
    assert_eq!(counts(&item), (2, 1));

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_reaction_is_rejected_and_rolled_back() {
    let h = Harness::new().await;
    h.user("u1").await;
    let v = h.video("v1", "u1").await;

    h.reactions.create("u1", &v, true).await.unwrap();
    let second = h.reactions.create("u1", &v, false).await;

    assert!(matches!(second, Err(vv_common::AppError::Conflict(_))));
    assert_eq!(counts(&h.item(&v).await), (1, 0));

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_content_removes_every_dependent() {
    let h = Harness::new().await;
    h.user("u1").await;
    h.user("u2").await;
    let v = h.video("v1", "u1").await;
    let keep = h.video("v2", "u1").await;

    let r1 = h.reactions.create("u1", &v, true).await.unwrap();
    let r2 = h.reactions.create("u2", &v, false).await.unwrap();
    h.reactions.create("u1", &keep, true).await.unwrap();
    assert_eq!(counts(&h.item(&v).await), (1, 1));

    for target in [&v, &keep] {
        h.comments
            .create(
                "u2",
                CreateCommentInput {
                    content_type: target.kind,
                    content_id: target.id.clone(),
                    text: "nice".to_string(),
                },
            )
            .await
            .unwrap();
    }

    let playlist = h
        .playlists
        .create(
            "u2",
            CreatePlaylistInput {
                name: "later".to_string(),
                description: None,
                is_public: true,
            },
        )
        .await
        .unwrap();
    h.playlists.add_entry("u2", &playlist.id, &v).await.unwrap();
    h.playlists.add_entry("u2", &playlist.id, &keep).await.unwrap();

    let person = PersonnelRepository::new(h.conn.clone())
        .create(personnel::ActiveModel {
            id: Set("p1".to_string()),
            first_name: Set("Ada".to_string()),
            middle_name: Set(None),
            last_name: Set("Lovelace".to_string()),
        })
        .await
        .unwrap();
    CastCreditRepository::new(h.conn.clone())
        .create(cast_credit::ActiveModel {
            id: Set("cc1".to_string()),
            personnel_id: Set(person.id.clone()),
            content_type: Set("video".to_string()),
            content_id: Set("v1".to_string()),
            cast_type: Set(cast_credit::CastType::MainActor),
        })
        .await
        .unwrap();
    ProduceCreditRepository::new(h.conn.clone())
        .create(produce_credit::ActiveModel {
            id: Set("pc1".to_string()),
            personnel_id: Set(person.id.clone()),
            content_type: Set("video".to_string()),
            content_id: Set("v1".to_string()),
            produce_type: Set(produce_credit::ProduceType::Director),
        })
        .await
        .unwrap();
    ContentTitleRepository::new(h.conn.clone())
        .create(content_title::ActiveModel {
            id: Set("t1".to_string()),
            title_text: Set("Premier".to_string()),
            language_id: Set(None),
            is_native: Set(Some(true)),
            content_type: Set("video".to_string()),
            content_id: Set("v1".to_string()),
        })
        .await
        .unwrap();

    h.taxonomy.add_hashtag("u1", &v, "#Premiere").await.unwrap();

    let report = h.catalog.delete("u1", &v).await.unwrap();

    assert_eq!(report.removed.get("reaction"), Some(&2));
    assert_eq!(report.removed.get("comment"), Some(&1));
    assert_eq!(report.removed.get("playlist_entry"), Some(&1));
    assert_eq!(report.removed.get("cast_credit"), Some(&1));
    assert_eq!(report.removed.get("produce_credit"), Some(&1));
    assert_eq!(report.removed.get("content_title"), Some(&1));
    assert_eq!(report.removed.get("content_hashtag"), Some(&1));
    assert!(h.taxonomy.with_hashtag("premiere", 10).await.unwrap().is_empty());
    assert!(h.association.references_for(&v).await.unwrap().is_empty());

    // Both reactions are gone and the content no longer resolves.
    assert!(matches!(
        h.reactions.get(&r1.id).await,
        Err(vv_common::AppError::NotFound(_))
    ));
    assert!(matches!(
        h.reactions.get(&r2.id).await,
        Err(vv_common::AppError::NotFound(_))
    ));
    assert!(h.registry.resolve_ref(&v).await.unwrap().is_none());

    // The other video keeps everything.
    assert_eq!(h.association.references_for(&keep).await.unwrap().len(), 3);
    let remaining = h.playlists.get(&playlist.id, Some("u2")).await.unwrap();
    assert_eq!(remaining.entries_count, 1);

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_actor_keeps_reactions_and_drops_comments() {
    let h = Harness::new().await;
    h.user("u1").await;
    h.user("u2").await;
    let v = h.video("v1", "u1").await;

    let reaction = h.reactions.create("u2", &v, true).await.unwrap();
    let comment = h
        .comments
        .create(
            "u2",
            CreateCommentInput {
                content_type: v.kind,
                content_id: v.id.clone(),
                text: "first".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(h.item(&v).await.comment_count, 1);

    h.users.delete("u2").await.unwrap();

    let kept = h.reactions.get(&reaction.id).await.unwrap();
    assert!(kept.posted_by.is_none());
    assert!(h.comments.get(&comment.id).await.is_err());

    let item = h.item(&v).await;
    assert_eq!(counts(&item), (1, 0));
    assert_eq!(item.comment_count, 0);

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_resolving_missing_id_is_absent() {
    let h = Harness::new().await;

    let missing = ContentRef::new(ContentKind::Podcast, "nope");
    assert!(h.registry.resolve_ref(&missing).await.unwrap().is_none());
    assert!(h.registry.resolve("article", "nope").await.unwrap().is_none());

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_reactions_lose_no_updates() {
    const ACTORS: usize = 24;

    let h = Harness::new().await;
    h.user("owner").await;
    let v = h.video("v1", "owner").await;

    let mut actors = Vec::with_capacity(ACTORS);
    for i in 0..ACTORS {
        let id = format!("actor{i}");
        h.user(&id).await;
        actors.push(id);
    }

    let tasks = actors.iter().enumerate().map(|(i, actor)| {
        let reactions = h.reactions.clone();
        let target = v.clone();
        let actor = actor.clone();
        tokio::spawn(async move { reactions.create(&actor, &target, i % 3 != 0).await })
    });

    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let expected_dislikes = (0..ACTORS).filter(|i| i % 3 == 0).count() as i32;
    let expected_likes = ACTORS as i32 - expected_dislikes;
    assert_eq!(counts(&h.item(&v).await), (expected_likes, expected_dislikes));

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_content_delete_waits_for_inflight_reaction() {
    let h = Harness::new().await;
    h.user("u1").await;
    h.user("u2").await;
    let v = h.video("v1", "u1").await;

    // A reaction insert caught between its counter update and its commit.
    let txn = h.conn.begin().await.unwrap();
    assert!(UserRepository::new(h.conn.clone())
        .lock_shared_in(&txn, "u2")
        .await
        .unwrap());
    assert!(VideoRepository::new(h.conn.clone())
        .apply_counters(&txn, "v1", CounterDelta::likes(1))
        .await
        .unwrap());
    let pending = ReactionRepository::new(h.conn.clone())
        .create_in(
            &txn,
            reaction::ActiveModel {
                id: Set("r1".to_string()),
                is_like: Set(true),
                posted_by: Set(Some("u2".to_string())),
                content_type: Set("video".to_string()),
                content_id: Set("v1".to_string()),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            },
        )
        .await
        .unwrap();

    let association = h.association.clone();
    let target = v.clone();
    let cascade = tokio::spawn(async move { association.delete_content(&target).await });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!cascade.is_finished());

    txn.commit().await.unwrap();

    let report = cascade.await.unwrap().unwrap();
    assert_eq!(report.removed.get("reaction"), Some(&1));
    assert!(h.association.references_for(&v).await.unwrap().is_empty());
    assert!(matches!(
        h.reactions.get(&pending.id).await,
        Err(vv_common::AppError::NotFound(_))
    ));

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_reaction_after_concurrent_content_delete_is_refused() {
    let h = Harness::new().await;
    h.user("u1").await;
    h.user("u2").await;
    let v = h.video("v1", "u1").await;

    // The cascade side holds the content row and has already removed it.
    let videos = VideoRepository::new(h.conn.clone());
    let txn = h.conn.begin().await.unwrap();
    assert!(videos.lock_in(&txn, "v1").await.unwrap());
    assert!(videos.delete_in(&txn, "v1").await.unwrap());

    let reactions = h.reactions.clone();
    let target = v.clone();
    let create = tokio::spawn(async move { reactions.create("u2", &target, true).await });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!create.is_finished());

    txn.commit().await.unwrap();

    assert!(matches!(
        create.await.unwrap(),
        Err(vv_common::AppError::ContentNotFound(_))
    ));
    assert!(h.association.references_for(&v).await.unwrap().is_empty());
    assert!(h.reactions_by("u2", &v).await.is_empty());

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_set_by_one_actor_keeps_single_reaction() {
    const ATTEMPTS: usize = 8;

    let h = Harness::new().await;
    h.user("u1").await;
    h.user("u2").await;
    let v = h.video("v1", "u1").await;

    let tasks = (0..ATTEMPTS).map(|i| {
        let reactions = h.reactions.clone();
        let target = v.clone();
        tokio::spawn(async move { reactions.set("u2", &target, i % 2 == 0).await })
    });

    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let rows = h.reactions_by("u2", &v).await;
    assert_eq!(rows.len(), 1);

    let tally = h.reactions.recount(&v).await.unwrap();
    let item = h.item(&v).await;
    assert_eq!(counts(&item), (tally.likes as i32, tally.dislikes as i32));
    assert_eq!(tally.likes + tally.dislikes, 1);
    assert_eq!(tally.likes == 1, rows[0].is_like);

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_user_delete_waits_for_inflight_comment() {
    let h = Harness::new().await;
    h.user("u1").await;
    h.user("u2").await;
    let v = h.video("v1", "u1").await;

    // A comment insert caught before its commit.
    let txn = h.conn.begin().await.unwrap();
    assert!(UserRepository::new(h.conn.clone())
        .lock_shared_in(&txn, "u2")
        .await
        .unwrap());
    assert!(VideoRepository::new(h.conn.clone())
        .apply_counters(&txn, "v1", CounterDelta::comments(1))
        .await
        .unwrap());
    let pending = CommentRepository::new(h.conn.clone())
        .create_in(
            &txn,
            comment::ActiveModel {
                id: Set("c1".to_string()),
                text: Set("late".to_string()),
                posted_by: Set("u2".to_string()),
                content_type: Set("video".to_string()),
                content_id: Set("v1".to_string()),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            },
        )
        .await
        .unwrap();

    let users = h.users.clone();
    let removal = tokio::spawn(async move { users.delete("u2").await });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!removal.is_finished());

    txn.commit().await.unwrap();
    removal.await.unwrap().unwrap();

    assert!(h.comments.get(&pending.id).await.is_err());
    assert_eq!(h.item(&v).await.comment_count, 0);

    h.teardown().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_language_and_region_clears_references() {
    let h = Harness::new().await;
    h.user("u1").await;

    let language = h
        .catalog
        .create_language(NamedEntryInput {
            name: "Quechua".to_string(),
        })
        .await
        .unwrap();
    let region = h
        .catalog
        .create_region(NamedEntryInput {
            name: "Andes".to_string(),
        })
        .await
        .unwrap();

    VideoRepository::new(h.conn.clone())
        .create(video::ActiveModel {
            id: Set("v1".to_string()),
            uploaded_by: Set(Some("u1".to_string())),
            original_language_id: Set(Some(language.id.clone())),
            upload_region_id: Set(Some(region.id.clone())),
            file_url: Set("https://cdn.example.com/v1.mp4".to_string()),
            format: Set(video::VideoFormat::Mp4),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let v = ContentRef::new(ContentKind::Video, "v1");
    let title = h
        .catalog
        .add_title(
            "u1",
            &v,
            AddTitleInput {
                title_text: "Runa".to_string(),
                language_id: Some(language.id.clone()),
                is_native: Some(true),
            },
        )
        .await
        .unwrap();

    h.catalog.delete_language(&language.id).await.unwrap();
    h.catalog.delete_region(&region.id).await.unwrap();

    let stored = h.catalog.get_video("v1").await.unwrap();
    assert!(stored.original_language_id.is_none());
    assert!(stored.upload_region_id.is_none());

    let titles = h.catalog.titles(&v).await.unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].id, title.id);
    assert!(titles[0].language_id.is_none());

    assert!(h.catalog.list_languages().await.unwrap().is_empty());
    assert!(h.catalog.list_regions().await.unwrap().is_empty());

    h.teardown().await;
}
