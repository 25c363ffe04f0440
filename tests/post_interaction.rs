//! Integration tests for the post detail view: login gates, server-authored
//! like state, two-phase comment deletion and owner-only post deletion.

use devhub::api::{ApiClient, Author, Comment, LikeState, Post};
use devhub::interaction::{
    load_post, perform, Confirmed, Interaction, InteractionResult, Outcome, PostView,
    LIKE_LOGIN_MESSAGE,
};
use devhub::session::Session;
use jsonwebtoken::{encode, EncodingKey, Header};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VIEWER: i64 = 7;

fn signed_in(user_id: i64) -> Session {
    let claims = json!({ "sub": user_id });
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test")).unwrap();
    Session::with_token(token)
}

fn comment(id: i64, author: i64) -> Comment {
    Comment {
        id,
        author: Author {
            id: author,
            name: Some(format!("user{}", author)),
            avatar: None,
        },
        content: format!("comment {}", id),
        created: None,
        likes: 0,
        is_liked: false,
    }
}

fn post(host_id: i64, comments: Vec<Comment>) -> Post {
    Post {
        id: 42,
        title: "Ownership in practice".into(),
        body: "<p>Borrowing</p>".into(),
        created: None,
        host_id,
        host_username: Some("host".into()),
        host_avatar: None,
        likes: 3,
        tags: vec!["rust".into()],
        is_liked: Some(false),
        comments,
    }
}

#[tokio::test]
async fn test_anonymous_like_prompts_login_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/like_post/42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = Session::anonymous();
    let mut view = PostView::new(post(1, Vec::new()), &session, Duration::ZERO);

    assert_eq!(view.like(&session), None);
    let dialog = view.confirm().active().unwrap();
    assert_eq!(dialog.message, LIKE_LOGIN_MESSAGE);
    assert_eq!(view.confirm_dialog(), Some(Confirmed::GoToLogin));
    assert_eq!(view.likes(), 3);
}

#[tokio::test]
async fn test_last_resolved_like_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/like_post/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"isLiked": true, "likes": 4})))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), None).unwrap();
    let session = signed_in(VIEWER);
    let mut view = PostView::new(post(1, Vec::new()), &session, Duration::ZERO);

    let first = view.like(&session).unwrap();
    let second = view.like(&session).unwrap();
    // Nothing changes until the server answers
    assert!(!view.is_liked());

    let fresh = perform(&client, &session, &second).await;
    let stale = Ok(InteractionResult::Liked(LikeState {
        is_liked: false,
        likes: 3,
    }));

    assert_eq!(view.apply(&second, fresh), Outcome::Updated);
    assert!(view.is_liked());
    assert_eq!(view.likes(), 4);

    // The older request resolving later is what ends up displayed
    assert_eq!(view.apply(&first, stale), Outcome::Updated);
    assert!(!view.is_liked());
    assert_eq!(view.likes(), 3);
}

#[tokio::test]
async fn test_comment_delete_confirm_preserves_order() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/delete_comment/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Comment deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), None).unwrap();
    let session = signed_in(VIEWER);
    let comments = vec![comment(1, VIEWER), comment(2, VIEWER), comment(3, VIEWER)];
    let mut view = PostView::new(post(1, comments), &session, Duration::ZERO);

    view.request_comment_delete(2);
    assert_eq!(view.staged_comment_delete(), Some(2));

    let Some(Confirmed::Issue(interaction)) = view.confirm_dialog() else {
        panic!("expected a delete request");
    };
    assert_eq!(interaction, Interaction::DeleteComment { comment_id: 2 });

    let result = perform(&client, &session, &interaction).await;
    assert_eq!(view.apply(&interaction, result), Outcome::Updated);

    let ids: Vec<i64> = view.comments().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(view.staged_comment_delete(), None);
}

#[tokio::test]
async fn test_comment_delete_cancel_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = signed_in(VIEWER);
    let mut view = PostView::new(post(1, vec![comment(1, VIEWER)]), &session, Duration::ZERO);

    view.request_comment_delete(1);
    view.cancel_dialog();

    assert_eq!(view.staged_comment_delete(), None);
    assert_eq!(view.confirm_dialog(), None);
    assert_eq!(view.comments().len(), 1);
}

#[tokio::test]
async fn test_owner_deletes_post_and_leaves_view() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/delete_post/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Post deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), None).unwrap();

    let stranger = signed_in(99);
    let mut view = PostView::new(post(VIEWER, Vec::new()), &stranger, Duration::ZERO);
    view.request_post_delete();
    assert!(view.confirm().active().is_none());

    let owner = signed_in(VIEWER);
    let mut view = PostView::new(post(VIEWER, Vec::new()), &owner, Duration::ZERO);
    assert!(view.is_owner());
    view.request_post_delete();
    let Some(Confirmed::Issue(interaction)) = view.confirm_dialog() else {
        panic!("expected a delete request");
    };
    let result = perform(&client, &owner, &interaction).await;
    assert_eq!(view.apply(&interaction, result), Outcome::LeftView);
}

#[tokio::test]
async fn test_load_post_seeds_viewer_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_post/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42, "title": "Ownership in practice", "body": "<p>Borrowing</p>",
            "host_id": 1, "likes": 3, "tags": ["rust"],
            "comments": [{"id": 1, "author": {"id": 7, "name": "me"}, "content": "hi", "likes": 2, "isLiked": true}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/is_liked/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"isLiked": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/is_bookmarked/42"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), None).unwrap();
    let view = load_post(&client, &signed_in(VIEWER), 42, Duration::ZERO)
        .await
        .unwrap();

    assert!(view.is_liked());
    // A failed flag lookup falls back to "not bookmarked"
    assert!(!view.is_bookmarked());
    assert!(view.comments()[0].is_liked);
    assert!(view.can_delete_comment(1));
    assert!(!view.is_owner());
}
