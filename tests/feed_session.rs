//! Integration tests for the feed and session: tag filtering, pagination,
//! search and token persistence against a mocked backend.
//!
//! Each test starts its own wiremock server so requests can be asserted
//! exactly.

use devhub::api::{ApiClient, ApiError};
use devhub::auth::apply_logout;
use devhub::feed::{fetch_feed, Feed, FeedDisplay, Tag};
use devhub::search::SearchOverlay;
use devhub::session::{Session, TokenStore};
use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn posts_body(ids: &[i64], pages: u32, current: u32) -> serde_json::Value {
    let posts: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "title": format!("Post {}", id), "body": "<p>hi</p>", "host_id": 1, "tags": ["rust"]}))
        .collect();
    json!({"posts": posts, "total": ids.len(), "pages": pages, "current_page": current})
}

async fn mount_sidebars(server: &MockServer) {
    for route in ["/trending_stories", "/recent_activities"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/get_tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "rust", "count": 3},
            {"name": "go", "count": 1}
        ])))
        .mount(server)
        .await;
}

// ============================================================================
// Feed
// ============================================================================

#[tokio::test]
async fn test_tag_then_next_page_requests_page_two_of_that_tag() {
    let server = MockServer::start().await;
    mount_sidebars(&server).await;
    Mock::given(method("GET"))
        .and(path("/get_posts"))
        .and(query_param("page", "1"))
        .and(query_param("tag", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(&[1, 2], 3, 1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_posts"))
        .and(query_param("page", "2"))
        .and(query_param("tag", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(&[3], 3, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), None).unwrap();
    let session = Session::anonymous();
    let mut feed = Feed::default();

    let load = feed.select_tag(Tag::from_name("rust")).unwrap();
    let snapshot = fetch_feed(&client, &session, &load.query).await;
    assert!(feed.apply(load.generation, snapshot));
    assert_eq!(feed.pages(), 3);

    let load = feed.next_page().unwrap();
    assert_eq!(load.query.page, 2);
    let snapshot = fetch_feed(&client, &session, &load.query).await;
    assert!(feed.apply(load.generation, snapshot));

    let ids: Vec<i64> = feed.posts().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3]);
    assert_eq!(feed.filter().available().len(), 2);
}

#[tokio::test]
async fn test_explore_all_sends_empty_tag_and_resets_page() {
    let server = MockServer::start().await;
    mount_sidebars(&server).await;
    Mock::given(method("GET"))
        .and(path("/get_posts"))
        .and(query_param("tag", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(&[], 1, 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_posts"))
        .and(query_param("tag", "go"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(&[4], 2, 1)))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), None).unwrap();
    let session = Session::anonymous();
    let mut feed = Feed::default();

    let load = feed.select_tag(Tag::from_name("go")).unwrap();
    let snapshot = fetch_feed(&client, &session, &load.query).await;
    feed.apply(load.generation, snapshot);
    feed.next_page().unwrap();
    assert_eq!(feed.page(), 2);

    let load = feed.select_tag(Tag::ExploreAll).unwrap();
    assert_eq!(load.query.page, 1);
    let snapshot = fetch_feed(&client, &session, &load.query).await;
    feed.apply(load.generation, snapshot);

    // Empty under the sentinel is the welcome screen
    assert_eq!(feed.display(), FeedDisplay::Welcome);
}

#[tokio::test]
async fn test_superseded_load_is_discarded() {
    let server = MockServer::start().await;
    mount_sidebars(&server).await;
    Mock::given(method("GET"))
        .and(path("/get_posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(&[9], 1, 1)))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), None).unwrap();
    let session = Session::anonymous();
    let mut feed = Feed::default();

    let first = feed.select_tag(Tag::from_name("rust")).unwrap();
    let second = feed.select_tag(Tag::from_name("go")).unwrap();

    let late = fetch_feed(&client, &session, &first.query).await;
    assert!(!feed.apply(first.generation, late));
    assert!(feed.is_loading());

    let current = fetch_feed(&client, &session, &second.query).await;
    assert!(feed.apply(second.generation, current));
    assert!(!feed.is_loading());
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_empty_query_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": {}})))
        .expect(0)
        .mount(&server)
        .await;

    let mut search = SearchOverlay::new(150);
    search.set_query("   ");
    assert!(search.submit().is_err());
    assert!(!search.is_panel_open());
}

#[tokio::test]
async fn test_failing_search_keeps_panel_hidden() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), None).unwrap();
    let mut search = SearchOverlay::new(150);
    search.set_query("rust");
    let request = search.submit().unwrap();
    let result = client.search(&Session::anonymous(), &request.query).await;
    assert!(result.is_err());

    assert!(search.resolve(request.generation, result));
    assert!(!search.is_panel_open());
    assert!(!search.is_busy());
    assert_eq!(search.query(), "rust");
}

#[tokio::test]
async fn test_search_results_and_late_response_after_clear() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "async rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {
                "posts": [{"id": 5, "title": "Async", "body": "<p>Futures &amp; tasks</p>"}],
                "users": [{"id": 2, "username": "ferris"}]
            }
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), None).unwrap();
    let mut search = SearchOverlay::new(150);

    search.set_query("async rust");
    let request = search.submit().unwrap();
    let result = client.search(&Session::anonymous(), &request.query).await;
    assert!(search.resolve(request.generation, result));
    assert!(search.is_panel_open());
    let results = search.results().unwrap();
    assert_eq!(results.users[0].username, "ferris");
    assert_eq!(search.preview(&results.posts[0]), "Futures & tasks");

    // Clearing while a second search is in flight drops its answer
    let request = search.submit().unwrap();
    search.clear();
    let late = client.search(&Session::anonymous(), "async rust").await;
    assert!(!search.resolve(request.generation, late));
    assert!(search.results().is_none());
    assert!(!search.is_panel_open());
}

// ============================================================================
// Session
// ============================================================================

fn temp_store(name: &str) -> TokenStore {
    let dir = std::env::temp_dir().join(format!("devhub_it_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let store = TokenStore::new(dir.join("token"));
    store.remove().unwrap();
    store
}

#[test]
fn test_sign_in_survives_restart() {
    let store = temp_store("restart");
    let path = store.path().to_path_buf();

    let mut session = Session::restore(store).unwrap();
    assert!(!session.is_authenticated());
    session.sign_in(SecretString::from("abc.def.ghi")).unwrap();

    let restored = Session::restore(TokenStore::new(&path)).unwrap();
    assert_eq!(restored.token().unwrap().expose_secret(), "abc.def.ghi");
}

#[test]
fn test_failed_logout_keeps_stored_token() {
    let store = temp_store("logout");
    let path = store.path().to_path_buf();
    let mut session = Session::restore(store).unwrap();
    session.sign_in(SecretString::from("tok")).unwrap();

    let failed = Err(ApiError::HttpStatus {
        status: 500,
        message: None,
    });
    assert!(!apply_logout(&mut session, failed));
    assert!(Session::restore(TokenStore::new(&path)).unwrap().is_authenticated());

    assert!(apply_logout(&mut session, Ok(())));
    assert!(!Session::restore(TokenStore::new(&path)).unwrap().is_authenticated());
}
