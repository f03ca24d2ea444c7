//! Integration tests for `SqliteStore` against an in-memory database.

use quill_core::{
  comment::NewComment,
  follow::EdgeCandidate,
  group::NewGroup,
  post::{NewPost, PostPatch},
  principal::{NewUser, UserAccount},
  store::{ContentStore, FollowQuery, Page},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> UserAccount {
  s.add_user(NewUser {
    username:      name.to_string(),
    password_hash: "$argon2id$v=19$m=19456,t=2,p=1$unused$unused".to_string(),
  })
  .await
  .unwrap()
}

fn new_post(author: &UserAccount, text: &str) -> NewPost {
  NewPost {
    author: author.user_ref(),
    text:   text.to_string(),
    group:  None,
    image:  None,
  }
}

fn new_comment(author: &UserAccount, post: Uuid, text: &str) -> NewComment {
  NewComment {
    author: author.user_ref(),
    post,
    text: text.to_string(),
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_user_and_get_account() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let account = s.get_account("alice").await.unwrap().unwrap();
  assert_eq!(account.user_id, alice.user_id);
  assert_eq!(account.username, "alice");
  assert_eq!(account.password_hash, alice.password_hash);

  let user_ref = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(user_ref.username, "alice");
}

#[tokio::test]
async fn duplicate_username_rejected() {
  let s = store().await;
  user(&s, "alice").await;

  let err = s
    .add_user(NewUser {
      username:      "alice".to_string(),
      password_hash: "x".to_string(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(quill_core::Error::Validation(_))));
}

#[tokio::test]
async fn get_account_missing_returns_none() {
  let s = store().await;
  assert!(s.get_account("nobody").await.unwrap().is_none());
}

// ─── Groups ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_list_groups() {
  let s = store().await;
  s.add_group(NewGroup {
    title:       "Rustaceans".to_string(),
    slug:        "rustaceans".to_string(),
    description: "ferris fans".to_string(),
  })
  .await
  .unwrap();

  let groups = s.list_groups().await.unwrap();
  assert_eq!(groups.len(), 1);
  assert_eq!(groups[0].slug, "rustaceans");
}

#[tokio::test]
async fn duplicate_slug_rejected() {
  let s = store().await;
  let group = NewGroup {
    title:       "First".to_string(),
    slug:        "same-slug".to_string(),
    description: String::new(),
  };
  s.add_group(group.clone()).await.unwrap();

  let err = s.add_group(group).await.unwrap_err();
  assert!(matches!(err, Error::Core(quill_core::Error::Validation(_))));
}

#[tokio::test]
async fn delete_group_nullifies_post_reference() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let group = s
    .add_group(NewGroup {
      title:       "Doomed".to_string(),
      slug:        "doomed".to_string(),
      description: String::new(),
    })
    .await
    .unwrap();

  let post = s
    .create_post(NewPost {
      author: alice.user_ref(),
      text:   "tagged".to_string(),
      group:  Some(group.group_id),
      image:  None,
    })
    .await
    .unwrap();
  assert_eq!(post.group, Some(group.group_id));

  s.delete_group(group.group_id).await.unwrap();

  // The post survives with the reference nulled out.
  let survivor = s.get_post(post.post_id).await.unwrap().unwrap();
  assert_eq!(survivor.group, None);
  assert_eq!(survivor.text, "tagged");
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_post_assigns_id_and_timestamp() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let post = s.create_post(new_post(&alice, "hello")).await.unwrap();
  assert_eq!(post.author.username, "alice");

  let fetched = s.get_post(post.post_id).await.unwrap().unwrap();
  assert_eq!(fetched.post_id, post.post_id);
  assert_eq!(fetched.text, "hello");
  assert_eq!(fetched.created_at, post.created_at);
  assert_eq!(fetched.author.user_id, alice.user_id);
}

#[tokio::test]
async fn get_post_missing_returns_none() {
  let s = store().await;
  assert!(s.get_post(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_posts_newest_first() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let p1 = s.create_post(new_post(&alice, "first")).await.unwrap();
  let p2 = s.create_post(new_post(&alice, "second")).await.unwrap();
  let p3 = s.create_post(new_post(&alice, "third")).await.unwrap();

  let posts = s.list_posts(Page::default()).await.unwrap();
  let ids: Vec<_> = posts.iter().map(|p| p.post_id).collect();
  assert_eq!(ids, vec![p3.post_id, p2.post_id, p1.post_id]);
}

#[tokio::test]
async fn list_posts_pagination_is_idempotent() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  for i in 0..5 {
    s.create_post(new_post(&alice, &format!("post {i}")))
      .await
      .unwrap();
  }

  let page = Page { limit: Some(2), offset: Some(1) };
  let once = s.list_posts(page).await.unwrap();
  let again = s.list_posts(page).await.unwrap();

  assert_eq!(once.len(), 2);
  let ids = |posts: &[quill_core::post::Post]| {
    posts.iter().map(|p| p.post_id).collect::<Vec<_>>()
  };
  assert_eq!(ids(&once), ids(&again));

  // Adjacent windows partition the full ordering without overlap.
  let full = s.list_posts(Page::default()).await.unwrap();
  let first = s
    .list_posts(Page { limit: Some(2), offset: Some(0) })
    .await
    .unwrap();
  let rest = s
    .list_posts(Page { limit: Some(3), offset: Some(2) })
    .await
    .unwrap();
  let stitched: Vec<_> =
    first.iter().chain(rest.iter()).map(|p| p.post_id).collect();
  assert_eq!(stitched, ids(&full));
}

#[tokio::test]
async fn update_post_patches_only_given_fields() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let group = s
    .add_group(NewGroup {
      title:       "G".to_string(),
      slug:        "g".to_string(),
      description: String::new(),
    })
    .await
    .unwrap();

  let post = s
    .create_post(NewPost {
      author: alice.user_ref(),
      text:   "original".to_string(),
      group:  Some(group.group_id),
      image:  Some("posts/cat.png".to_string()),
    })
    .await
    .unwrap();

  let updated = s
    .update_post(post.post_id, PostPatch {
      text: Some("edited".to_string()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.text, "edited");
  assert_eq!(updated.group, Some(group.group_id));
  assert_eq!(updated.image.as_deref(), Some("posts/cat.png"));
  assert_eq!(updated.author.user_id, alice.user_id);
  assert_eq!(updated.created_at, post.created_at);
}

#[tokio::test]
async fn update_post_missing_errors() {
  let s = store().await;
  let err = s
    .update_post(Uuid::new_v4(), PostPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(quill_core::Error::PostNotFound(_))));
}

#[tokio::test]
async fn delete_post_cascades_to_comments() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let post = s.create_post(new_post(&alice, "soon gone")).await.unwrap();
  let c1 = s
    .create_comment(new_comment(&bob, post.post_id, "nice"))
    .await
    .unwrap();
  let c2 = s
    .create_comment(new_comment(&alice, post.post_id, "thanks"))
    .await
    .unwrap();

  s.delete_post(post.post_id).await.unwrap();

  assert!(s.get_post(post.post_id).await.unwrap().is_none());
  assert!(s.get_comment(c1.comment_id).await.unwrap().is_none());
  assert!(s.get_comment(c2.comment_id).await.unwrap().is_none());
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comments_listed_newest_first_within_post() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let p1 = s.create_post(new_post(&alice, "one")).await.unwrap();
  let p2 = s.create_post(new_post(&alice, "two")).await.unwrap();

  let c1 = s
    .create_comment(new_comment(&alice, p1.post_id, "first"))
    .await
    .unwrap();
  let c2 = s
    .create_comment(new_comment(&alice, p1.post_id, "second"))
    .await
    .unwrap();
  s.create_comment(new_comment(&alice, p2.post_id, "elsewhere"))
    .await
    .unwrap();

  let comments = s.list_comments(p1.post_id).await.unwrap();
  let ids: Vec<_> = comments.iter().map(|c| c.comment_id).collect();
  assert_eq!(ids, vec![c2.comment_id, c1.comment_id]);
}

#[tokio::test]
async fn update_comment_keeps_author_and_timestamp() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let post = s.create_post(new_post(&alice, "p")).await.unwrap();
  let comment = s
    .create_comment(new_comment(&alice, post.post_id, "typo"))
    .await
    .unwrap();

  let updated = s
    .update_comment(comment.comment_id, "fixed".to_string())
    .await
    .unwrap();
  assert_eq!(updated.text, "fixed");
  assert_eq!(updated.author.user_id, alice.user_id);
  assert_eq!(updated.created_at, comment.created_at);
  assert_eq!(updated.post, post.post_id);
}

#[tokio::test]
async fn delete_comment_missing_errors() {
  let s = store().await;
  let err = s.delete_comment(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(quill_core::Error::CommentNotFound(_))
  ));
}

// ─── Follow edges ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_follow_and_exists() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let candidate = EdgeCandidate {
    user:      alice.user_id,
    following: bob.user_id,
  };
  assert!(!s.follow_exists(candidate).await.unwrap());

  let edge = s.create_follow(candidate).await.unwrap();
  assert_eq!(edge.user.username, "alice");
  assert_eq!(edge.following.username, "bob");

  assert!(s.follow_exists(candidate).await.unwrap());
}

#[tokio::test]
async fn duplicate_edge_maps_unique_constraint() {
  // Hits the constraint directly, bypassing the fast-path pre-check.
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let candidate = EdgeCandidate {
    user:      alice.user_id,
    following: bob.user_id,
  };
  s.create_follow(candidate).await.unwrap();

  let err = s.create_follow(candidate).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(quill_core::Error::DuplicateFollow)
  ));
}

#[tokio::test]
async fn self_edge_maps_check_constraint() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let err = s
    .create_follow(EdgeCandidate {
      user:      alice.user_id,
      following: alice.user_id,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(quill_core::Error::SelfFollow)));
}

#[tokio::test]
async fn reversed_edge_is_distinct() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  s.create_follow(EdgeCandidate {
    user:      alice.user_id,
    following: bob.user_id,
  })
  .await
  .unwrap();

  // (bob, alice) is its own edge, not a duplicate of (alice, bob).
  let reverse = s
    .create_follow(EdgeCandidate {
      user:      bob.user_id,
      following: alice.user_id,
    })
    .await
    .unwrap();
  assert_eq!(reverse.user.username, "bob");
}

#[tokio::test]
async fn list_follows_scoped_with_search() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let barbara = user(&s, "Barbara").await;
  let carol = user(&s, "carol").await;

  for followee in [&bob, &barbara, &carol] {
    s.create_follow(EdgeCandidate {
      user:      alice.user_id,
      following: followee.user_id,
    })
    .await
    .unwrap();
  }
  // Another user's edge must never leak into alice's listing.
  s.create_follow(EdgeCandidate {
    user:      bob.user_id,
    following: barbara.user_id,
  })
  .await
  .unwrap();

  let all = s
    .list_follows(alice.user_id, &FollowQuery::default())
    .await
    .unwrap();
  assert_eq!(all.len(), 3);
  assert!(all.iter().all(|e| e.user.user_id == alice.user_id));

  // Case-insensitive substring over the followed username.
  let hits = s
    .list_follows(alice.user_id, &FollowQuery {
      search: Some("BAR".to_string()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].following.username, "Barbara");
}

#[tokio::test]
async fn list_follows_insertion_order_and_pagination() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let mut followed = Vec::new();
  for name in ["u1", "u2", "u3", "u4"] {
    let u = user(&s, name).await;
    s.create_follow(EdgeCandidate {
      user:      alice.user_id,
      following: u.user_id,
    })
    .await
    .unwrap();
    followed.push(u.user_id);
  }

  let page = s
    .list_follows(alice.user_id, &FollowQuery {
      search: None,
      page:   Page { limit: Some(2), offset: Some(1) },
    })
    .await
    .unwrap();
  let ids: Vec<_> = page.iter().map(|e| e.following.user_id).collect();
  assert_eq!(ids, vec![followed[1], followed[2]]);
}

#[tokio::test]
async fn delete_user_cascades_everywhere() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let alices_post = s.create_post(new_post(&alice, "mine")).await.unwrap();
  let bobs_post = s.create_post(new_post(&bob, "his")).await.unwrap();
  let alices_comment = s
    .create_comment(new_comment(&alice, bobs_post.post_id, "hi"))
    .await
    .unwrap();
  let outgoing = EdgeCandidate {
    user:      alice.user_id,
    following: bob.user_id,
  };
  let incoming = EdgeCandidate {
    user:      bob.user_id,
    following: alice.user_id,
  };
  s.create_follow(outgoing).await.unwrap();
  s.create_follow(incoming).await.unwrap();

  s.delete_user(alice.user_id).await.unwrap();

  assert!(s.get_post(alices_post.post_id).await.unwrap().is_none());
  assert!(
    s.get_comment(alices_comment.comment_id)
      .await
      .unwrap()
      .is_none()
  );
  // Edges in both directions are gone.
  assert!(!s.follow_exists(outgoing).await.unwrap());
  assert!(!s.follow_exists(incoming).await.unwrap());
  // Bob's own post is untouched.
  assert!(s.get_post(bobs_post.post_id).await.unwrap().is_some());
}

#[tokio::test]
async fn concurrent_duplicate_edge_creates_exactly_one() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let candidate = EdgeCandidate {
    user:      alice.user_id,
    following: bob.user_id,
  };

  let mut tasks = tokio::task::JoinSet::new();
  for _ in 0..8 {
    let s = s.clone();
    tasks.spawn(async move { s.create_follow(candidate).await });
  }

  let mut created = 0;
  let mut duplicates = 0;
  while let Some(res) = tasks.join_next().await {
    match res.unwrap() {
      Ok(_) => created += 1,
      Err(Error::Core(quill_core::Error::DuplicateFollow)) => duplicates += 1,
      Err(other) => panic!("unexpected error: {other}"),
    }
  }

  assert_eq!(created, 1);
  assert_eq!(duplicates, 7);
}
