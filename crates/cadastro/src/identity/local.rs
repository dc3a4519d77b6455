//! Local identity provider.
//!
//! Stands in for the hosted identity service: the signed-in session lives in
//! a JSON file and changes are broadcast over a watch channel.

use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::{debug, info};

use super::{AuthState, IdentityProvider, Session, SessionSubscription};
use crate::error::{Error, Result};

/// Identity provider backed by an optional session file.
#[derive(Debug)]
pub struct LocalIdentity {
    tx: watch::Sender<AuthState>,
    path: Option<PathBuf>,
}

impl LocalIdentity {
    /// Create a provider that hasn't determined the session yet.
    ///
    /// Nothing is persisted; call [`LocalIdentity::publish`] to resolve it.
    #[must_use]
    pub fn unresolved() -> Self {
        let (tx, _) = watch::channel(AuthState::Unknown);
        Self { tx, path: None }
    }

    /// Create an in-memory provider with a known state.
    #[must_use]
    pub fn with_state(state: AuthState) -> Self {
        let (tx, _) = watch::channel(state);
        Self { tx, path: None }
    }

    /// Open the provider from a session file.
    ///
    /// A missing file means signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let session: Session = serde_json::from_str(&raw)?;
            debug!(path = %path.display(), email = %session.email, "Restored session");
            AuthState::SignedIn(session)
        } else {
            AuthState::SignedOut
        };

        let (tx, _) = watch::channel(state);
        Ok(Self {
            tx,
            path: Some(path),
        })
    }

    /// The state subscribers currently see.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    /// Path of the session file, if persisted.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Publish a new state without touching the session file.
    pub fn publish(&self, state: AuthState) {
        self.tx.send_replace(state);
    }

    /// Sign in, persisting the session when file-backed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file can't be written.
    pub fn sign_in(&self, session: Session) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
            }
            std::fs::write(path, serde_json::to_string_pretty(&session)?)?;
        }

        info!(email = %session.email, "Signed in");
        self.publish(AuthState::SignedIn(session));
        Ok(())
    }
}

#[async_trait::async_trait]
impl IdentityProvider for LocalIdentity {
    fn subscribe(&self) -> SessionSubscription {
        SessionSubscription::new(self.tx.subscribe())
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::sign_out(e.to_string())),
            }
        }

        info!("Signed out");
        self.publish(AuthState::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_session_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "cadastro_session_{tag}_{}/session.json",
            std::process::id()
        ))
    }

    fn cleanup(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn test_unresolved_starts_unknown() {
        let identity = LocalIdentity::unresolved();
        assert_eq!(identity.state(), AuthState::Unknown);
        assert!(identity.path().is_none());
    }

    #[test]
    fn test_open_missing_file_is_signed_out() {
        let path = temp_session_path("missing");
        cleanup(&path);

        let identity = LocalIdentity::open(&path).unwrap();
        assert_eq!(identity.state(), AuthState::SignedOut);
    }

    #[test]
    fn test_sign_in_persists_and_reopens() {
        let path = temp_session_path("persist");
        cleanup(&path);

        let identity = LocalIdentity::open(&path).unwrap();
        let session = Session::for_email("ana@example.com");
        identity.sign_in(session.clone()).unwrap();
        assert!(path.exists());

        let reopened = LocalIdentity::open(&path).unwrap();
        assert_eq!(reopened.state(), AuthState::SignedIn(session));

        cleanup(&path);
    }

    #[test]
    fn test_open_corrupt_file_fails() {
        let path = temp_session_path("corrupt");
        cleanup(&path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(LocalIdentity::open(&path), Err(Error::Json(_))));

        cleanup(&path);
    }

    #[tokio::test]
    async fn test_sign_out_notifies_subscribers() {
        let identity =
            LocalIdentity::with_state(AuthState::SignedIn(Session::new("u1", "u1@example.com")));
        let mut sub = identity.subscribe();
        assert!(sub.current().session().is_some());

        identity.sign_out().await.unwrap();
        assert_eq!(sub.changed().await, Some(AuthState::SignedOut));
    }

    #[tokio::test]
    async fn test_sign_out_removes_file() {
        let path = temp_session_path("signout");
        cleanup(&path);

        let identity = LocalIdentity::open(&path).unwrap();
        identity
            .sign_in(Session::for_email("ana@example.com"))
            .unwrap();
        identity.sign_out().await.unwrap();

        assert!(!path.exists());
        assert_eq!(identity.state(), AuthState::SignedOut);

        cleanup(&path);
    }
}
