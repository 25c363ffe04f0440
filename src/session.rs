//! Session context: the optional bearer token and where it is persisted.
//!
//! One `Session` is owned by the application and passed by reference to every
//! consumer that needs to know whether the viewer is signed in. Nothing else
//! reads the token file.
//!
//! The token is opaque to the client except for the `sub` claim, which is
//! decoded (not verified) to decide post ownership. Expiry is never inspected;
//! the server is the only judge of validity.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum size of a persisted token file (64 KB).
const MAX_TOKEN_FILE_SIZE: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access token file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token file too large ({0} bytes)")]
    TooLarge(u64),
}

// ============================================================================
// Token Store
// ============================================================================

/// File-backed token persistence (`~/.config/devhub/token`, mode 0600).
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token. A missing or blank file means signed out.
    pub fn load(&self) -> Result<Option<SecretString>, SessionError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.len() > MAX_TOKEN_FILE_SIZE => {
                return Err(SessionError::TooLarge(meta.len()));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
            Ok(_) => {}
        }

        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let token = raw.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::from(token.to_string())))
    }

    /// Write the token via temp file + rename so a crash never leaves a
    /// truncated token behind.
    pub fn save(&self, token: &SecretString) -> Result<(), SessionError> {
        let temp_path = self.path.with_extension("tmp");
        // A leftover temp file from a crashed write would block create_new
        let _ = std::fs::remove_file(&temp_path);

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&temp_path)?;
        let written = file
            .write_all(token.expose_secret().as_bytes())
            .and_then(|_| file.sync_all());
        drop(file);
        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        tracing::debug!(path = %self.path.display(), "Stored session token");
        Ok(())
    }

    /// Delete the stored token. Already absent is not an error.
    pub fn remove(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// The viewer's session. Token presence means authenticated.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
    store: Option<TokenStore>,
}

impl Session {
    /// A signed-out session with no persistence.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An in-memory session holding `token`. Nothing is written to disk.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            store: None,
        }
    }

    /// A signed-out session that persists future sign-ins to `store`.
    pub fn signed_out(store: TokenStore) -> Self {
        Self {
            token: None,
            store: Some(store),
        }
    }

    /// Restore the session from `store`.
    pub fn restore(store: TokenStore) -> Result<Self, SessionError> {
        let token = store.load()?;
        tracing::debug!(authenticated = token.is_some(), "Session restored");
        Ok(Self {
            token,
            store: Some(store),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Adopt a freshly issued token and persist it.
    ///
    /// The in-memory session is updated even if persisting fails, so the
    /// current run stays signed in; the error is returned for reporting.
    pub fn sign_in(&mut self, token: SecretString) -> Result<(), SessionError> {
        let persisted = match &self.store {
            Some(store) => store.save(&token),
            None => Ok(()),
        };
        self.token = Some(token);
        persisted
    }

    /// Forget the token in memory and on disk.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.token = None;
        match &self.store {
            Some(store) => store.remove(),
            None => Ok(()),
        }
    }

    /// The viewer's user id, decoded from the token's `sub` claim.
    ///
    /// Returns `None` when signed out or when the token is not a decodable
    /// JWT. The signature is not checked.
    pub fn viewer_id(&self) -> Option<i64> {
        let token = self.token.as_ref()?;
        decode_subject(token.expose_secret())
    }
}

#[derive(Debug, Deserialize)]
struct SubjectClaim {
    #[serde(default)]
    sub: Option<serde_json::Value>,
}

/// Extract `sub` from a JWT. Accepts numeric and string subjects.
///
/// Neither the signature nor any time-based claim is validated.
fn decode_subject(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = match decode::<SubjectClaim>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to decode token claims");
            return None;
        }
    };

    match data.claims.sub? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn test_jwt(sub: serde_json::Value) -> String {
    test_token(&serde_json::json!({ "sub": sub }))
}

#[cfg(test)]
fn test_token(claims: &serde_json::Value) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    encode(&Header::default(), claims, &EncodingKey::from_secret(b"not-the-server-key")).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> (PathBuf, TokenStore) {
        let dir = std::env::temp_dir().join(format!("devhub_session_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let store = TokenStore::new(dir.join("token"));
        let _ = store.remove();
        (dir, store)
    }

    #[test]
    fn test_anonymous_is_not_authenticated() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.viewer_id().is_none());
    }

    #[test]
    fn test_viewer_id_numeric_sub() {
        let session = Session::with_token(test_jwt(serde_json::json!(42)));
        assert!(session.is_authenticated());
        assert_eq!(session.viewer_id(), Some(42));
    }

    #[test]
    fn test_viewer_id_string_sub() {
        let session = Session::with_token(test_jwt(serde_json::json!("7")));
        assert_eq!(session.viewer_id(), Some(7));
    }

    #[test]
    fn test_viewer_id_ignores_expiry() {
        // Expired long ago; only the server decides whether it still works
        let token = test_token(&serde_json::json!({ "sub": 9, "exp": 1_000_000 }));
        assert_eq!(Session::with_token(token).viewer_id(), Some(9));
    }

    #[test]
    fn test_viewer_id_garbage_token() {
        assert_eq!(Session::with_token("not-a-jwt").viewer_id(), None);
        assert_eq!(Session::with_token("a.%%%.c").viewer_id(), None);
        let no_sub = test_token(&serde_json::json!({ "name": "alice" }));
        assert_eq!(Session::with_token(no_sub).viewer_id(), None);
    }

    #[test]
    fn test_sign_in_persists_and_restores() {
        let (dir, store) = temp_store("persist");

        let mut session = Session::restore(store.clone()).unwrap();
        assert!(!session.is_authenticated());

        session
            .sign_in(SecretString::from("abc.def.ghi".to_string()))
            .unwrap();
        assert!(session.is_authenticated());

        let restored = Session::restore(store.clone()).unwrap();
        assert_eq!(
            restored.token().map(|t| t.expose_secret().to_string()),
            Some("abc.def.ghi".to_string())
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let (dir, store) = temp_store("perms");
        store
            .save(&SecretString::from("secret".to_string()))
            .unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_sign_out_removes_file() {
        let (dir, store) = temp_store("signout");
        let mut session = Session::restore(store.clone()).unwrap();
        session
            .sign_in(SecretString::from("tok".to_string()))
            .unwrap();
        session.sign_out().unwrap();

        assert!(!session.is_authenticated());
        assert!(!store.path().exists());
        // Second sign-out is a no-op
        session.sign_out().unwrap();

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unreadable_store_still_persists_sign_in() {
        let (dir, store) = temp_store("oversized");
        std::fs::write(store.path(), vec![b'x'; MAX_TOKEN_FILE_SIZE as usize + 1]).unwrap();
        assert!(matches!(
            Session::restore(store.clone()),
            Err(SessionError::TooLarge(_))
        ));

        let mut session = Session::signed_out(store.clone());
        assert!(!session.is_authenticated());
        session
            .sign_in(SecretString::from("fresh".to_string()))
            .unwrap();

        let restored = Session::restore(store).unwrap();
        assert_eq!(
            restored.token().map(|t| t.expose_secret().to_string()),
            Some("fresh".to_string())
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_blank_token_file_means_signed_out() {
        let (dir, store) = temp_store("blank");
        std::fs::write(store.path(), "  \n").unwrap();
        assert!(!Session::restore(store).unwrap().is_authenticated());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let session = Session::with_token("super-secret-token");
        let out = format!("{:?}", session);
        assert!(!out.contains("super-secret-token"));
    }
}
