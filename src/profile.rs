//! Settings view: edit the signed-in user's profile.

use crate::api::{ApiError, ProfileUpdate, UserProfile};
use std::path::PathBuf;

/// Image types the backend accepts for avatars.
pub const AVATAR_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
    Email,
    Username,
    Bio,
    Avatar,
}

impl ProfileField {
    pub const ALL: [ProfileField; 6] = [
        ProfileField::FirstName,
        ProfileField::LastName,
        ProfileField::Email,
        ProfileField::Username,
        ProfileField::Bio,
        ProfileField::Avatar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProfileField::FirstName => "First Name",
            ProfileField::LastName => "Last Name",
            ProfileField::Email => "Email",
            ProfileField::Username => "Username",
            ProfileField::Bio => "Bio",
            ProfileField::Avatar => "Avatar file",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub bio: String,
    /// Path to a local image, empty for no change.
    pub avatar_path: String,
    profile_pic: Option<String>,
    focus: usize,
    error: Option<String>,
    busy: bool,
    loaded: bool,
}

impl ProfileForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the form contents from the server's view of the user.
    pub fn fill(&mut self, user: &UserProfile) {
        self.first_name = user.first_name.clone().unwrap_or_default();
        self.last_name = user.last_name.clone().unwrap_or_default();
        self.email = user.email.clone().unwrap_or_default();
        self.username = user.username.clone();
        self.bio = user.bio.clone().unwrap_or_default();
        self.profile_pic = user.profile_pic.clone();
        self.avatar_path.clear();
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn profile_pic(&self) -> Option<&str> {
        self.profile_pic.as_deref()
    }

    pub fn focused(&self) -> ProfileField {
        ProfileField::ALL[self.focus % ProfileField::ALL.len()]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % ProfileField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        let len = ProfileField::ALL.len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn value(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FirstName => &self.first_name,
            ProfileField::LastName => &self.last_name,
            ProfileField::Email => &self.email,
            ProfileField::Username => &self.username,
            ProfileField::Bio => &self.bio,
            ProfileField::Avatar => &self.avatar_path,
        }
    }

    fn value_mut(&mut self, field: ProfileField) -> &mut String {
        match field {
            ProfileField::FirstName => &mut self.first_name,
            ProfileField::LastName => &mut self.last_name,
            ProfileField::Email => &mut self.email,
            ProfileField::Username => &mut self.username,
            ProfileField::Bio => &mut self.bio,
            ProfileField::Avatar => &mut self.avatar_path,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.value_mut(self.focused()).push(c);
    }

    pub fn pop_char(&mut self) {
        self.value_mut(self.focused()).pop();
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Build the multipart update. An avatar path must name a supported
    /// image type.
    pub fn submit(&mut self) -> Option<ProfileUpdate> {
        if self.busy {
            return None;
        }
        let avatar = match self.avatar_path.trim() {
            "" => None,
            path => {
                let path = PathBuf::from(path);
                if !has_image_extension(&path) {
                    self.error = Some(format!(
                        "Avatar must be one of: {}",
                        AVATAR_EXTENSIONS.join(", ")
                    ));
                    return None;
                }
                Some(path)
            }
        };
        self.error = None;
        self.busy = true;
        Some(ProfileUpdate {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            bio: self.bio.clone(),
            avatar,
        })
    }

    /// Apply the server's answer. Success refills the form from the
    /// returned user.
    pub fn resolve(&mut self, result: Result<UserProfile, ApiError>) -> bool {
        self.busy = false;
        match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Profile updated");
                self.fill(&user);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile update failed");
                self.error = Some(e.user_message());
                false
            }
        }
    }
}

fn has_image_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| AVATAR_EXTENSIONS.contains(&e.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn user() -> UserProfile {
        UserProfile {
            id: 3,
            username: "alice".into(),
            email: Some("a@example.com".into()),
            first_name: Some("Alice".into()),
            last_name: None,
            bio: Some("Rustacean".into()),
            profile_pic: Some("abc.png".into()),
        }
    }

    #[test]
    fn test_fill_from_user() {
        let mut form = ProfileForm::new();
        form.fill(&user());
        assert!(form.is_loaded());
        assert_eq!(form.first_name, "Alice");
        assert_eq!(form.last_name, "");
        assert_eq!(form.profile_pic(), Some("abc.png"));
    }

    #[test]
    fn test_avatar_extension_checked() {
        let mut form = ProfileForm::new();
        form.fill(&user());
        form.avatar_path = "/tmp/me.bmp".into();
        assert!(form.submit().is_none());
        assert!(form.error().unwrap().contains("png"));

        form.avatar_path = "/tmp/me.JPG".into();
        let update = form.submit().unwrap();
        assert_eq!(update.avatar, Some(PathBuf::from("/tmp/me.JPG")));
        assert_eq!(update.username, "alice");
    }

    #[test]
    fn test_resolve_failure_shows_server_message() {
        let mut form = ProfileForm::new();
        form.fill(&user());
        form.submit().unwrap();
        let ok = form.resolve(Err(ApiError::HttpStatus {
            status: 400,
            message: Some("Email already in use".into()),
        }));
        assert!(!ok);
        assert_eq!(form.error(), Some("Email already in use"));
        assert!(!form.is_busy());
    }

    #[test]
    fn test_resolve_success_refills() {
        let mut form = ProfileForm::new();
        form.fill(&user());
        form.bio = "changed".into();
        form.submit().unwrap();
        let mut updated = user();
        updated.username = "alice2".into();
        assert!(form.resolve(Ok(updated)));
        assert_eq!(form.username, "alice2");
        assert_eq!(form.bio, "Rustacean");
    }
}
