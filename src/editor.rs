//! Post composer: create and edit drafts.

use crate::api::{ApiClient, ApiError, NewPost, Post, PostEdit, TagCount};
use crate::session::Session;
use crate::util::strip_markup;

/// Editor top offset at or below which the toolbar pins.
pub const STICKY_OFFSET: u16 = 64;

pub const REQUIRED_FIELDS_MESSAGE: &str = "All fields are required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Edit { post_id: i64 },
}

/// Fullscreen and sticky-toolbar state of the body editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorLayout {
    fullscreen: bool,
    sticky: bool,
}

impl EditorLayout {
    /// Entering or leaving fullscreen always unpins the toolbar.
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.sticky = false;
    }

    /// Recompute stickiness from the editor's current top offset.
    pub fn on_scroll(&mut self, top_offset: u16) {
        if self.fullscreen {
            return;
        }
        self.sticky = top_offset <= STICKY_OFFSET;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }
}

/// A validated request ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSubmit {
    Create {
        title: String,
        body: String,
        tags: Vec<String>,
    },
    Edit {
        post_id: i64,
        title: String,
        body: String,
    },
}

/// Send a validated draft. Returns the server's message, if any.
pub async fn submit_draft(
    client: &ApiClient,
    session: &Session,
    submit: &DraftSubmit,
) -> Result<Option<String>, ApiError> {
    match submit {
        DraftSubmit::Create { title, body, tags } => {
            client
                .create_post(session, &NewPost { title, body, tags })
                .await
        }
        DraftSubmit::Edit {
            post_id,
            title,
            body,
        } => {
            client
                .edit_post(session, *post_id, &PostEdit { title, body })
                .await
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostDraft {
    mode: DraftMode,
    pub title: String,
    /// HTML body, sent as-is.
    pub body: String,
    pub new_tag: String,
    tags: Vec<String>,
    available: Vec<String>,
    error: Option<String>,
    busy: bool,
    layout: EditorLayout,
}

impl PostDraft {
    pub fn create() -> Self {
        Self {
            mode: DraftMode::Create,
            title: String::new(),
            body: String::new(),
            new_tag: String::new(),
            tags: Vec::new(),
            available: Vec::new(),
            error: None,
            busy: false,
            layout: EditorLayout::default(),
        }
    }

    /// Prefill from an existing post for editing.
    pub fn edit(post: &Post) -> Self {
        Self {
            mode: DraftMode::Edit { post_id: post.id },
            title: post.title.clone(),
            body: post.body.clone(),
            tags: post.tags.clone(),
            ..Self::create()
        }
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn set_available(&mut self, tags: &[TagCount]) {
        self.available = tags.iter().map(|t| t.name.clone()).collect();
    }

    /// Select an existing tag. Already selected tags are not duplicated.
    pub fn add_tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// Create a tag from the `new_tag` input. Only non-empty names that are
    /// neither selected nor already available are accepted; the input is
    /// cleared on success.
    pub fn add_new_tag(&mut self) -> bool {
        let name = self.new_tag.trim();
        if name.is_empty()
            || self.tags.iter().any(|t| t == name)
            || self.available.iter().any(|t| t == name)
        {
            return false;
        }
        let name = name.to_string();
        self.tags.push(name.clone());
        self.available.push(name);
        self.new_tag.clear();
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn layout(&self) -> &EditorLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut EditorLayout {
        &mut self.layout
    }

    /// Validate and build the request. On failure the error is shown inline
    /// and nothing should be sent.
    pub fn submit(&mut self) -> Option<DraftSubmit> {
        if self.busy {
            return None;
        }
        if self.title.trim().is_empty() || strip_markup(&self.body).trim().is_empty() {
            self.error = Some(REQUIRED_FIELDS_MESSAGE.to_string());
            return None;
        }
        self.error = None;
        self.busy = true;
        Some(match self.mode {
            DraftMode::Create => DraftSubmit::Create {
                title: self.title.clone(),
                body: self.body.clone(),
                tags: self.tags.clone(),
            },
            DraftMode::Edit { post_id } => DraftSubmit::Edit {
                post_id,
                title: self.title.clone(),
                body: self.body.clone(),
            },
        })
    }

    /// Record the outcome. Returns `true` when the draft is done and the
    /// composer should close.
    pub fn resolve(&mut self, result: Result<Option<String>, ApiError>) -> bool {
        self.busy = false;
        match result {
            Ok(message) => {
                tracing::info!(mode = ?self.mode, message = message.as_deref().unwrap_or(""), "Post saved");
                true
            }
            Err(e) => {
                tracing::warn!(mode = ?self.mode, error = %e, "Failed to save post");
                self.error = Some(match self.mode {
                    DraftMode::Create => format!("Failed to create post: {}", e.user_message()),
                    DraftMode::Edit { .. } => format!("Failed to update post: {}", e.user_message()),
                });
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tag(name: &str) -> TagCount {
        TagCount {
            name: name.to_string(),
            count: 1,
        }
    }

    #[test]
    fn test_required_fields() {
        let mut draft = PostDraft::create();
        draft.title = "Hello".into();
        draft.body = "<p>  </p>".into();
        assert_eq!(draft.submit(), None);
        assert_eq!(draft.error(), Some(REQUIRED_FIELDS_MESSAGE));
        assert!(!draft.is_busy());

        draft.body = "<p>World</p>".into();
        assert!(draft.submit().is_some());
        assert_eq!(draft.error(), None);
    }

    #[test]
    fn test_tag_selection_once() {
        let mut draft = PostDraft::create();
        draft.set_available(&[tag("rust"), tag("go")]);
        draft.add_tag("rust");
        draft.add_tag("rust");
        assert_eq!(draft.tags(), ["rust".to_string()]);

        draft.remove_tag("rust");
        assert!(draft.tags().is_empty());
    }

    #[test]
    fn test_new_tag_rules() {
        let mut draft = PostDraft::create();
        draft.set_available(&[tag("rust")]);

        draft.new_tag = "   ".into();
        assert!(!draft.add_new_tag());

        // Existing tags must be picked, not re-created
        draft.new_tag = "rust".into();
        assert!(!draft.add_new_tag());
        assert!(draft.tags().is_empty());

        draft.new_tag = "wasm".into();
        assert!(draft.add_new_tag());
        assert_eq!(draft.tags(), ["wasm".to_string()]);
        assert!(draft.available().contains(&"wasm".to_string()));
        assert_eq!(draft.new_tag, "");

        draft.new_tag = "wasm".into();
        assert!(!draft.add_new_tag());
    }

    #[test]
    fn test_fullscreen_disables_sticky() {
        let mut layout = EditorLayout::default();
        layout.on_scroll(10);
        assert!(layout.is_sticky());
        layout.on_scroll(65);
        assert!(!layout.is_sticky());
        layout.on_scroll(64);
        assert!(layout.is_sticky());

        layout.toggle_fullscreen();
        assert!(!layout.is_sticky());
        layout.on_scroll(0);
        assert!(!layout.is_sticky());

        layout.toggle_fullscreen();
        layout.on_scroll(0);
        assert!(layout.is_sticky());
    }

    #[test]
    fn test_failed_save_keeps_draft() {
        let mut draft = PostDraft::create();
        draft.title = "T".into();
        draft.body = "B".into();
        draft.submit().unwrap();
        let done = draft.resolve(Err(ApiError::HttpStatus {
            status: 400,
            message: Some("Title too long".into()),
        }));
        assert!(!done);
        assert!(!draft.is_busy());
        assert_eq!(draft.error(), Some("Failed to create post: Title too long"));
        assert_eq!(draft.title, "T");
    }

    #[tokio::test]
    async fn test_create_sends_tags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create_post"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(serde_json::json!({
                "title": "T", "body": "<p>B</p>", "tags": ["rust"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"message": "Post created successfully"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), None).unwrap();
        let mut draft = PostDraft::create();
        draft.title = "T".into();
        draft.body = "<p>B</p>".into();
        draft.add_tag("rust");
        let submit = draft.submit().unwrap();

        let result = submit_draft(&client, &Session::with_token("tok"), &submit).await;
        assert_eq!(result.as_ref().ok().cloned().flatten().as_deref(), Some("Post created successfully"));
        assert!(draft.resolve(result));
    }

    #[tokio::test]
    async fn test_edit_sends_title_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/edit_post/7"))
            .and(body_json(serde_json::json!({"title": "New", "body": "<p>x</p>"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "Post updated successfully"})))
            .expect(1)
            .mount(&server)
            .await;

        let post = Post {
            id: 7,
            title: "Old".into(),
            body: "<p>x</p>".into(),
            created: None,
            host_id: 1,
            host_username: None,
            host_avatar: None,
            likes: 0,
            tags: vec!["rust".into()],
            is_liked: None,
            comments: Vec::new(),
        };
        let mut draft = PostDraft::edit(&post);
        assert_eq!(draft.mode(), DraftMode::Edit { post_id: 7 });
        draft.title = "New".into();

        let client = ApiClient::new(&server.uri(), None).unwrap();
        let submit = draft.submit().unwrap();
        assert!(submit_draft(&client, &Session::with_token("tok"), &submit).await.is_ok());
    }
}
