//! Sign-in and registration form, plus logout.

use crate::api::{ApiClient, ApiError, Credentials, Registration};
use crate::session::Session;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthTab {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    FirstName,
    LastName,
    Email,
    Username,
    Password,
}

impl AuthField {
    pub fn label(self) -> &'static str {
        match self {
            AuthField::FirstName => "First Name",
            AuthField::LastName => "Last Name",
            AuthField::Email => "Email",
            AuthField::Username => "Username",
            AuthField::Password => "Password",
        }
    }

    pub fn is_required(self) -> bool {
        self != AuthField::LastName
    }
}

const LOGIN_FIELDS: &[AuthField] = &[AuthField::Username, AuthField::Password];
const REGISTER_FIELDS: &[AuthField] = &[
    AuthField::FirstName,
    AuthField::LastName,
    AuthField::Email,
    AuthField::Username,
    AuthField::Password,
];

/// A validated request ready to send.
#[derive(Clone)]
pub enum AuthRequest {
    Login {
        username: String,
        password: SecretString,
    },
    Register {
        first_name: String,
        last_name: String,
        email: String,
        username: String,
        password: SecretString,
    },
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthRequest::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .finish_non_exhaustive(),
            AuthRequest::Register { username, email, .. } => f
                .debug_struct("Register")
                .field("username", username)
                .field("email", email)
                .finish_non_exhaustive(),
        }
    }
}

impl AuthRequest {
    fn tab(&self) -> AuthTab {
        match self {
            AuthRequest::Login { .. } => AuthTab::Login,
            AuthRequest::Register { .. } => AuthTab::Register,
        }
    }
}

/// Send a login or registration request. Returns the issued token.
pub async fn authenticate(
    client: &ApiClient,
    request: &AuthRequest,
) -> Result<SecretString, ApiError> {
    let token = match request {
        AuthRequest::Login { username, password } => {
            client
                .login(&Credentials {
                    username,
                    password: password.expose_secret(),
                })
                .await?
        }
        AuthRequest::Register {
            first_name,
            last_name,
            email,
            username,
            password,
        } => {
            client
                .register(&Registration {
                    username,
                    email,
                    password: password.expose_secret(),
                    first_name,
                    last_name,
                })
                .await?
        }
    };
    Ok(SecretString::from(token))
}

/// Finish a logout request. The token is only forgotten when the server
/// accepted the logout.
pub fn apply_logout(session: &mut Session, result: Result<(), ApiError>) -> bool {
    match result {
        Ok(()) => {
            if let Err(e) = session.sign_out() {
                tracing::warn!(error = %e, "Failed to remove stored token");
            }
            tracing::info!("Logged out");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Logout failed");
            false
        }
    }
}

#[derive(Default)]
pub struct AuthForm {
    tab: AuthTab,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    password: String,
    focus: usize,
    show_password: bool,
    error: Option<String>,
    busy: bool,
}

impl fmt::Debug for AuthForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthForm")
            .field("tab", &self.tab)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("error", &self.error)
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> AuthTab {
        self.tab
    }

    /// Switch tabs. Entered values are kept; the error is cleared.
    pub fn set_tab(&mut self, tab: AuthTab) {
        if self.tab != tab {
            self.tab = tab;
            self.focus = 0;
            self.error = None;
        }
    }

    pub fn toggle_tab(&mut self) {
        self.set_tab(match self.tab {
            AuthTab::Login => AuthTab::Register,
            AuthTab::Register => AuthTab::Login,
        });
    }

    pub fn fields(&self) -> &'static [AuthField] {
        match self.tab {
            AuthTab::Login => LOGIN_FIELDS,
            AuthTab::Register => REGISTER_FIELDS,
        }
    }

    pub fn focused(&self) -> AuthField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::FirstName => &self.first_name,
            AuthField::LastName => &self.last_name,
            AuthField::Email => &self.email,
            AuthField::Username => &self.username,
            AuthField::Password => &self.password,
        }
    }

    fn value_mut(&mut self, field: AuthField) -> &mut String {
        match field {
            AuthField::FirstName => &mut self.first_name,
            AuthField::LastName => &mut self.last_name,
            AuthField::Email => &mut self.email,
            AuthField::Username => &mut self.username,
            AuthField::Password => &mut self.password,
        }
    }

    /// What the field shows: the password is masked unless revealed.
    pub fn display_value(&self, field: AuthField) -> String {
        if field == AuthField::Password && !self.show_password {
            "*".repeat(self.password.chars().count())
        } else {
            self.value(field).to_string()
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.value_mut(self.focused()).push(c);
    }

    pub fn pop_char(&mut self) {
        self.value_mut(self.focused()).pop();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn toggle_show_password(&mut self) {
        self.show_password = !self.show_password;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Validate the current tab. Missing required fields set the inline
    /// error and nothing is sent.
    pub fn submit(&mut self) -> Option<AuthRequest> {
        if self.busy {
            return None;
        }
        let missing = self
            .fields()
            .iter()
            .any(|f| f.is_required() && self.value(*f).trim().is_empty());
        if missing {
            self.error = Some(MISSING_FIELDS_MESSAGE.to_string());
            return None;
        }

        self.error = None;
        self.busy = true;
        let password = SecretString::from(self.password.clone());
        Some(match self.tab {
            AuthTab::Login => AuthRequest::Login {
                username: self.username.trim().to_string(),
                password,
            },
            AuthTab::Register => AuthRequest::Register {
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
                email: self.email.trim().to_string(),
                username: self.username.trim().to_string(),
                password,
            },
        })
    }

    /// Apply the server's answer. On success the token is adopted by the
    /// session and `true` is returned so the caller can leave the form.
    pub fn resolve(
        &mut self,
        request: &AuthRequest,
        result: Result<SecretString, ApiError>,
        session: &mut Session,
    ) -> bool {
        self.busy = false;
        match result {
            Ok(token) => {
                if let Err(e) = session.sign_in(token) {
                    tracing::warn!(error = %e, "Signed in, but the token could not be saved");
                }
                self.password.clear();
                tracing::info!(tab = ?request.tab(), "Authenticated");
                true
            }
            Err(e) => {
                tracing::warn!(tab = ?request.tab(), error = %e, "Authentication failed");
                self.error = Some(match &e {
                    ApiError::HttpStatus { message: None, .. }
                    | ApiError::Unauthorized { message: None } => match request.tab() {
                        AuthTab::Login => "Login failed".to_string(),
                        AuthTab::Register => "Registration failed".to_string(),
                    },
                    other => other.user_message(),
                });
                false
            }
        }
    }
}
