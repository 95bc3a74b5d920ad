use chrono::{Duration, Utc};

use anoy_board::error::BoardServiceError;
use anoy_board::usecase::comment::{CommentInput, CreateCommentUseCase, ListCommentsUseCase};
use anoy_board::usecase::moderation::RemoveAccountUseCase;
use anoy_board::usecase::post::{
    CreatePostUseCase, GetPostUseCase, ListPostsUseCase, PostInput, UpdatePostUseCase,
};
use anoy_domain::account::{Lifecycle, Role, StatusChange};
use anoy_domain::pagination::PageRequest;

use crate::helpers::MemoryStore;

fn post_input(title: &str, content: &str) -> PostInput {
    PostInput {
        title: title.to_owned(),
        content: content.to_owned(),
    }
}

fn comment_input(content: &str, parent_id: Option<i64>) -> CommentInput {
    CommentInput {
        content: content.to_owned(),
        parent_id,
    }
}

fn create_post(store: &MemoryStore) -> CreatePostUseCase<MemoryStore, MemoryStore> {
    CreatePostUseCase {
        accounts: store.clone(),
        content: store.clone(),
    }
}

fn create_comment(store: &MemoryStore) -> CreateCommentUseCase<MemoryStore, MemoryStore> {
    CreateCommentUseCase {
        accounts: store.clone(),
        content: store.clone(),
    }
}

// ── Posts ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_post_under_caller_activity_id() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;

    let post = create_post(&store)
        .execute("bob@x.com", post_input("  hello  ", "first!"))
        .await
        .unwrap();
    assert_eq!(post.author_id, bob);
    assert_eq!(post.author_activity_id, "bob");
    assert_eq!(post.title, "hello");
    assert_eq!(post.content, "first!");
    assert_eq!(post.deleted_at, None);

    let fetched = GetPostUseCase {
        content: store.clone(),
    }
    .execute(post.id)
    .await
    .unwrap();
    assert_eq!(fetched, post);
}

#[tokio::test]
async fn should_validate_post_title() {
    let store = MemoryStore::new();
    store.seed_account("bob@x.com", "bob", Role::User).await;

    let err = create_post(&store)
        .execute("bob@x.com", post_input("   ", "body"))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidInput(_)));

    let err = create_post(&store)
        .execute("bob@x.com", post_input(&"t".repeat(256), "body"))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidInput(_)));
    assert!(store.snapshot().await.posts.is_empty());
}

#[tokio::test]
async fn should_refuse_posts_from_removed_account() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;
    store.tables.lock().await.accounts.get_mut(&bob).unwrap().lifecycle =
        Lifecycle::active().apply(StatusChange::Delete, Utc::now());

    let err = create_post(&store)
        .execute("bob@x.com", post_input("hi", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::Unauthorized));

    let err = create_post(&store)
        .execute("ghost@x.com", post_input("hi", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::Unauthorized));
}

#[tokio::test]
async fn should_hide_deleted_posts_from_public_listing_only() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;
    let first = store.seed_post(bob, None).await;
    let gone = store.seed_post(bob, Some(Utc::now() - Duration::hours(1))).await;
    let last = store.seed_post(bob, None).await;

    let public = ListPostsUseCase {
        content: store.clone(),
        include_deleted: false,
    }
    .execute(PageRequest::default())
    .await
    .unwrap();
    let ids: Vec<i64> = public.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![last, first]);
    assert_eq!(public.total, 2);

    let admin = ListPostsUseCase {
        content: store.clone(),
        include_deleted: true,
    }
    .execute(PageRequest::default())
    .await
    .unwrap();
    let ids: Vec<i64> = admin.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![last, gone, first]);
    assert!(admin.items[1].deleted_at.is_some());

    let err = GetPostUseCase {
        content: store.clone(),
    }
    .execute(gone)
    .await
    .unwrap_err();
    assert!(matches!(err, BoardServiceError::PostNotFound));
}

#[tokio::test]
async fn should_page_and_clamp_post_listing() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;
    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(store.seed_post(bob, None).await);
    }
    let list = ListPostsUseCase {
        content: store.clone(),
        include_deleted: false,
    };

    let page = list
        .execute(PageRequest {
            per_page: 2,
            page: 2,
        })
        .await
        .unwrap();
    let got: Vec<i64> = page.items.iter().map(|p| p.id).collect();
    assert_eq!(got, vec![ids[2], ids[1]]);
    assert_eq!(page.total, 5);

    let page = list
        .execute(PageRequest {
            per_page: 0,
            page: 0,
        })
        .await
        .unwrap();
    assert_eq!(page.per_page, 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn should_let_only_owner_edit_live_post() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;
    store.seed_account("eve@x.com", "eve", Role::User).await;
    let post = store.seed_post(bob, None).await;
    let gone = store.seed_post(bob, Some(Utc::now())).await;
    let update = UpdatePostUseCase {
        accounts: store.clone(),
        content: store.clone(),
    };

    let err = update
        .execute("eve@x.com", post, post_input("mine now", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::Forbidden));

    let err = update
        .execute("bob@x.com", gone, post_input("revive", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::PostNotFound));

    let edited = update
        .execute("bob@x.com", post, post_input(" edited ", "new body"))
        .await
        .unwrap();
    assert_eq!(edited.title, "edited");
    assert_eq!(edited.content, "new body");
    assert!(edited.updated_at >= edited.created_at);
}

// ── Comments ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_comments_and_replies_on_live_post() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;
    store.seed_account("eve@x.com", "eve", Role::User).await;
    let post = store.seed_post(bob, None).await;

    let top = create_comment(&store)
        .execute("eve@x.com", post, comment_input("nice", None))
        .await
        .unwrap();
    assert_eq!(top.post_id, post);
    assert_eq!(top.author_activity_id, "eve");
    assert_eq!(top.parent_id, None);

    let reply = create_comment(&store)
        .execute("bob@x.com", post, comment_input("thanks", Some(top.id)))
        .await
        .unwrap();
    assert_eq!(reply.parent_id, Some(top.id));

    let listed = ListCommentsUseCase {
        content: store.clone(),
    }
    .execute(post)
    .await
    .unwrap();
    let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![top.id, reply.id]);
}

#[tokio::test]
async fn should_reject_comment_on_missing_or_deleted_post() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;
    let gone = store.seed_post(bob, Some(Utc::now())).await;

    let err = create_comment(&store)
        .execute("bob@x.com", gone, comment_input("hello?", None))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::PostNotFound));

    let err = create_comment(&store)
        .execute("bob@x.com", 9_999, comment_input("hello?", None))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::PostNotFound));
    assert!(store.snapshot().await.comments.is_empty());
}

#[tokio::test]
async fn should_keep_replies_on_parent_post() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;
    let here = store.seed_post(bob, None).await;
    let there = store.seed_post(bob, None).await;
    let elsewhere = store.seed_comment(there, bob, None).await;
    let removed = store.seed_comment(here, bob, Some(Utc::now())).await;

    let err = create_comment(&store)
        .execute("bob@x.com", here, comment_input("reply", Some(elsewhere)))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidInput(_)));

    let err = create_comment(&store)
        .execute("bob@x.com", here, comment_input("reply", Some(removed)))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::CommentNotFound));

    let err = create_comment(&store)
        .execute("bob@x.com", here, comment_input("   ", None))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn should_list_only_live_comments() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;
    let post = store.seed_post(bob, None).await;
    let live = store.seed_comment(post, bob, None).await;
    store.seed_comment(post, bob, Some(Utc::now())).await;

    let listed = ListCommentsUseCase {
        content: store.clone(),
    }
    .execute(post)
    .await
    .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, live);
}

// ── Removal over authored content ────────────────────────────────────────────

#[tokio::test]
async fn should_cascade_removal_over_authored_content() {
    let store = MemoryStore::new();
    let bob = store.seed_account("bob@x.com", "bob", Role::User).await;
    store.seed_account("eve@x.com", "eve", Role::User).await;

    let post = create_post(&store)
        .execute("bob@x.com", post_input("hello", "body"))
        .await
        .unwrap();
    let comment = create_comment(&store)
        .execute("eve@x.com", post.id, comment_input("hi bob", None))
        .await
        .unwrap();

    let outcome = RemoveAccountUseCase {
        store: store.clone(),
    }
    .execute(bob)
    .await
    .unwrap();
    assert_eq!(outcome.cascaded.posts, 1);
    assert_eq!(outcome.cascaded.comments, 1);

    let public = ListPostsUseCase {
        content: store.clone(),
        include_deleted: false,
    }
    .execute(PageRequest::default())
    .await
    .unwrap();
    assert!(public.items.is_empty());

    let t = store.snapshot().await;
    assert_eq!(t.posts[&post.id].deleted_at, Some(outcome.deleted_at));
    assert_eq!(t.comments[&comment.id].deleted_at, Some(outcome.deleted_at));
}
