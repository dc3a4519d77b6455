//! Session gate: blocks protected content until the session is known.

use std::sync::Arc;

use tracing::{debug, info};

use crate::identity::{AuthState, IdentityProvider, Session, SessionSubscription};
use crate::router::{Navigator, Route};

/// What the gate has decided so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// No decision yet; render a placeholder.
    Loading,
    /// A session is present; content may be shown.
    Authenticated(Session),
    /// The visitor was sent to `/login`. Terminal.
    Redirected,
}

/// Guard that subscribes to session changes for one mounted screen.
pub struct SessionGate {
    subscription: Option<SessionSubscription>,
    navigator: Arc<dyn Navigator>,
    state: GateState,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("state", &self.state)
            .field("subscribed", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionGate {
    /// Subscribe to `identity`. Called once per mount.
    #[must_use]
    pub fn mount(identity: &dyn IdentityProvider, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            subscription: Some(identity.subscribe()),
            navigator,
            state: GateState::Loading,
        }
    }

    /// The current decision.
    #[must_use]
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// The session, once authenticated.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            GateState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Wait until the provider has decided, then apply the decision.
    ///
    /// Returns immediately if the gate already left `Loading`. A provider
    /// that goes away before deciding counts as signed out.
    pub async fn resolve(&mut self) -> &GateState {
        if self.state != GateState::Loading {
            return &self.state;
        }

        let auth = match self.subscription.as_mut() {
            Some(subscription) => {
                let mut auth = subscription.current();
                while !auth.is_known() {
                    auth = subscription.changed().await.unwrap_or(AuthState::SignedOut);
                }
                auth
            }
            None => AuthState::SignedOut,
        };

        self.apply(auth);
        &self.state
    }

    /// Wait for the next session notification and apply it.
    ///
    /// Returns `None` when there is nothing left to wait for: the gate is
    /// redirected, unmounted, or the provider went away.
    pub async fn next_change(&mut self) -> Option<&GateState> {
        if self.state == GateState::Redirected {
            return None;
        }
        let auth = self.subscription.as_mut()?.changed().await?;
        self.apply(auth);
        Some(&self.state)
    }

    /// Apply a notification that was already published, without waiting.
    ///
    /// Returns `None` when there was nothing new to apply.
    pub fn poll(&mut self) -> Option<&GateState> {
        if self.state == GateState::Redirected {
            return None;
        }
        let auth = self.subscription.as_mut()?.pending()?;
        self.apply(auth);
        Some(&self.state)
    }

    /// Release the subscription.
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            debug!("Session gate unsubscribed");
        }
    }

    fn apply(&mut self, auth: AuthState) {
        match auth {
            AuthState::SignedIn(session) => {
                debug!(uid = %session.uid, "Session present");
                self.state = GateState::Authenticated(session);
            }
            AuthState::SignedOut => {
                info!("No session, redirecting to {}", Route::Login);
                self.navigator.navigate(Route::Login);
                self.state = GateState::Redirected;
                self.subscription = None;
            }
            AuthState::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::LocalIdentity;
    use crate::router::RouteHistory;

    fn signed_in() -> AuthState {
        AuthState::SignedIn(Session::new("uid-1", "ana@example.com"))
    }

    #[tokio::test]
    async fn test_resolves_authenticated() {
        let identity = LocalIdentity::with_state(signed_in());
        let history = Arc::new(RouteHistory::new());
        let mut gate = SessionGate::mount(&identity, history.clone());

        assert_eq!(gate.state(), &GateState::Loading);
        assert!(matches!(gate.resolve().await, GateState::Authenticated(_)));
        assert_eq!(gate.session().unwrap().uid, "uid-1");
        assert!(history.visited().is_empty());
    }

    #[tokio::test]
    async fn test_redirects_when_signed_out() {
        let identity = LocalIdentity::with_state(AuthState::SignedOut);
        let history = Arc::new(RouteHistory::new());
        let mut gate = SessionGate::mount(&identity, history.clone());

        assert_eq!(gate.resolve().await, &GateState::Redirected);
        assert!(gate.session().is_none());
        assert_eq!(history.visited(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_waits_for_provider_decision() {
        let identity = Arc::new(LocalIdentity::unresolved());
        let history = Arc::new(RouteHistory::new());
        let mut gate = SessionGate::mount(identity.as_ref(), history.clone());

        let publisher = identity.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            publisher.publish(signed_in());
        });

        assert!(matches!(gate.resolve().await, GateState::Authenticated(_)));
    }

    #[tokio::test]
    async fn test_provider_gone_counts_as_signed_out() {
        let identity = LocalIdentity::unresolved();
        let history = Arc::new(RouteHistory::new());
        let mut gate = SessionGate::mount(&identity, history.clone());
        drop(identity);

        assert_eq!(gate.resolve().await, &GateState::Redirected);
        assert_eq!(history.current(), Some(Route::Login));
    }

    #[tokio::test]
    async fn test_later_sign_out_redirects() {
        let identity = LocalIdentity::with_state(signed_in());
        let history = Arc::new(RouteHistory::new());
        let mut gate = SessionGate::mount(&identity, history.clone());
        gate.resolve().await;

        identity.sign_out().await.unwrap();
        assert_eq!(gate.next_change().await, Some(&GateState::Redirected));
        assert!(gate.next_change().await.is_none());
        assert_eq!(history.visited(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_poll_applies_published_change() {
        let identity = LocalIdentity::with_state(signed_in());
        let history = Arc::new(RouteHistory::new());
        let mut gate = SessionGate::mount(&identity, history.clone());
        gate.resolve().await;
        assert!(gate.poll().is_none());

        let bia = Session::new("uid-2", "bia@example.com");
        identity.publish(AuthState::SignedIn(bia.clone()));
        assert_eq!(gate.poll(), Some(&GateState::Authenticated(bia)));

        identity.publish(AuthState::SignedOut);
        assert_eq!(gate.poll(), Some(&GateState::Redirected));
        assert!(gate.poll().is_none());
        assert_eq!(history.visited(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_unmount_stops_notifications() {
        let identity = LocalIdentity::with_state(signed_in());
        let history = Arc::new(RouteHistory::new());
        let mut gate = SessionGate::mount(&identity, history.clone());
        gate.resolve().await;
        gate.unmount();

        identity.publish(AuthState::SignedOut);
        assert!(gate.next_change().await.is_none());
        assert!(history.visited().is_empty());
    }
}
