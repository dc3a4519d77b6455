//! Identity provider boundary.
//!
//! Screens never ask "who is logged in?" ad hoc. They receive an
//! [`IdentityProvider`] through their context and subscribe to it, which lets
//! tests inject a fake provider without touching a real one.

mod local;

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::Result;

pub use local::LocalIdentity;

/// The authenticated identity of the current visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique user identifier.
    pub uid: String,
    /// Email address.
    pub email: String,
}

impl Session {
    /// Create a session from its parts.
    #[must_use]
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }

    /// Build a session whose user id is derived from the email.
    ///
    /// The id is the first 28 hex characters of the BLAKE3 hash of the
    /// trimmed, lower-cased address, so signing in again with the same email
    /// yields the same owner for previously stored records.
    #[must_use]
    pub fn for_email(email: &str) -> Self {
        let normalized = email.trim().to_lowercase();
        let hash = blake3::hash(normalized.as_bytes()).to_hex();
        Self {
            uid: hash[..28].to_string(),
            email: email.trim().to_string(),
        }
    }
}

/// What the identity provider currently knows about the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// The provider hasn't determined the session yet.
    #[default]
    Unknown,
    /// A session is present.
    SignedIn(Session),
    /// No session.
    SignedOut,
}

impl AuthState {
    /// The session, if signed in.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    /// Whether the provider has reached a decision.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::SignedIn(session) => write!(f, "signed in as {}", session.email),
            Self::SignedOut => write!(f, "signed out"),
        }
    }
}

/// A live subscription to session changes.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<AuthState>,
}

impl SessionSubscription {
    /// Wrap a watch receiver.
    #[must_use]
    pub fn new(rx: watch::Receiver<AuthState>) -> Self {
        Self { rx }
    }

    /// The most recently published state, marking it as seen.
    pub fn current(&mut self) -> AuthState {
        self.rx.borrow_and_update().clone()
    }

    /// A change published since the last look, without waiting.
    ///
    /// Returns `None` when nothing new was published or the provider is gone.
    pub fn pending(&mut self) -> Option<AuthState> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Wait for the next change.
    ///
    /// Returns `None` once the provider has gone away.
    pub async fn changed(&mut self) -> Option<AuthState> {
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}

/// Source of session state.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Subscribe to session changes.
    ///
    /// The subscription's current value is the provider's state at the time
    /// of subscribing.
    fn subscribe(&self) -> SessionSubscription;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not end the session.
    async fn sign_out(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_for_email_is_stable() {
        let a = Session::for_email("Ana@Example.com");
        let b = Session::for_email("  ana@example.com ");
        assert_eq!(a.uid, b.uid);
        assert_eq!(a.uid.len(), 28);
        assert_eq!(b.email, "ana@example.com");
    }

    #[test]
    fn test_session_for_email_distinct_users() {
        let a = Session::for_email("ana@example.com");
        let b = Session::for_email("bia@example.com");
        assert_ne!(a.uid, b.uid);
    }

    #[test]
    fn test_auth_state_session() {
        let session = Session::new("u1", "u1@example.com");
        assert_eq!(
            AuthState::SignedIn(session.clone()).session(),
            Some(&session)
        );
        assert!(AuthState::SignedOut.session().is_none());
        assert!(!AuthState::Unknown.is_known());
        assert!(AuthState::SignedOut.is_known());
    }

    #[test]
    fn test_auth_state_display() {
        let state = AuthState::SignedIn(Session::new("u1", "u1@example.com"));
        assert_eq!(state.to_string(), "signed in as u1@example.com");
        assert_eq!(AuthState::SignedOut.to_string(), "signed out");
    }

    #[tokio::test]
    async fn test_subscription_sees_changes() {
        let (tx, rx) = watch::channel(AuthState::Unknown);
        let mut sub = SessionSubscription::new(rx);
        assert_eq!(sub.current(), AuthState::Unknown);

        tx.send(AuthState::SignedOut).unwrap();
        assert_eq!(sub.changed().await, Some(AuthState::SignedOut));
    }

    #[test]
    fn test_subscription_pending_is_non_blocking() {
        let (tx, rx) = watch::channel(AuthState::Unknown);
        let mut sub = SessionSubscription::new(rx);
        sub.current();
        assert_eq!(sub.pending(), None);

        tx.send(AuthState::SignedOut).unwrap();
        assert_eq!(sub.pending(), Some(AuthState::SignedOut));
        assert_eq!(sub.pending(), None);
    }

    #[tokio::test]
    async fn test_subscription_ends_when_provider_dropped() {
        let (tx, rx) = watch::channel(AuthState::Unknown);
        let mut sub = SessionSubscription::new(rx);
        drop(tx);
        assert_eq!(sub.changed().await, None);
    }
}
