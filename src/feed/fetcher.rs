use super::FeedQuery;
use crate::api::{Activity, ApiClient, ApiError, PostPage, TagCount, TrendingStory};
use crate::session::Session;

/// Everything the feed view shows, fetched in one round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub page: PostPage,
    pub trending: Vec<TrendingStory>,
    pub tags: Vec<TagCount>,
    pub activities: Vec<Activity>,
}

/// Fetch the posts page, trending stories, tag list and recent activity
/// concurrently.
///
/// Returns only after all four requests have settled. A failed slice is
/// logged and comes back empty; it never fails the others. No retries and
/// no caching: every call goes to the server.
pub async fn fetch_feed(client: &ApiClient, session: &Session, query: &FeedQuery) -> FeedSnapshot {
    tracing::debug!(page = query.page, tag = %query.tag, "Fetching feed");

    let (page, trending, tags, activities) = tokio::join!(
        client.posts(session, query.page, query.tag.query_value()),
        client.trending(session),
        client.tags(session),
        client.recent_activities(session),
    );

    FeedSnapshot {
        page: or_empty("posts", page),
        trending: or_empty("trending", trending),
        tags: or_empty("tags", tags),
        activities: or_empty("activities", activities),
    }
}

fn or_empty<T: Default>(slice: &'static str, result: Result<T, ApiError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(slice, error = %e, "Feed fetch failed, showing empty section");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Tag;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_failed_slice_is_empty_others_survive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "posts": [{"id": 1, "title": "First", "body": "", "host_id": 2, "tags": []}],
                "total": 1, "pages": 1, "current_page": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/trending_stories"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/get_tags"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        // recent_activities requires a token server-side
        Mock::given(method("GET"))
            .and(path("/recent_activities"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({"msg": "Missing Authorization Header"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), None).unwrap();
        let query = FeedQuery {
            page: 1,
            tag: Tag::ExploreAll,
        };
        let snapshot = fetch_feed(&client, &Session::anonymous(), &query).await;

        assert_eq!(snapshot.page.posts.len(), 1);
        assert!(snapshot.trending.is_empty());
        assert!(snapshot.tags.is_empty());
        assert!(snapshot.activities.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_yields_empty_snapshot() {
        // Nothing listens on port 9 (discard) in test environments
        let client = ApiClient::new("http://127.0.0.1:9", None).unwrap();
        let snapshot = fetch_feed(&client, &Session::anonymous(), &FeedQuery::default()).await;
        assert_eq!(snapshot, FeedSnapshot::default());
    }
}
