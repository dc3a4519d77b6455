//! Screen models.
//!
//! Every screen follows the same lifecycle:
//!
//! ```text
//! Loading --(session)--> Ready --(submit)--> Submitting --(ok)--> Ready [draft reset]
//!    |                                                  \--(err)--> Ready [draft kept]
//!    \--(no session)--> Redirected (terminal)
//! ```
//!
//! Screens receive their collaborators through a [`ScreenContext`] and own
//! a [`ScreenLifetime`] that the host ends on unmount. Results of calls that
//! complete after the lifetime ended are dropped instead of being written
//! into the screen.

mod devices;
mod form;
mod gate;
mod welcome;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::identity::IdentityProvider;
use crate::notify::Notifier;
use crate::router::Navigator;
use crate::storage::DocumentStore;

pub use devices::DeviceScreen;
pub use form::{
    DeviceForm, FormCopy, FormKind, FormScreen, PendingSubmission, ProfileForm, SubmitOutcome,
};
pub use gate::{GateState, SessionGate};
pub use welcome::WelcomeScreen;

/// Default time the success banner stays up.
pub const DEFAULT_BANNER_DURATION: Duration = Duration::from_secs(3);

/// Collaborators handed to every screen on mount.
#[derive(Clone)]
pub struct ScreenContext {
    /// Session source.
    pub identity: Arc<dyn IdentityProvider>,
    /// Record persistence.
    pub store: Arc<dyn DocumentStore>,
    /// Route changes.
    pub navigator: Arc<dyn Navigator>,
    /// Blocking alerts.
    pub notifier: Arc<dyn Notifier>,
    /// How long the success banner stays visible.
    pub banner_duration: Duration,
}

impl ScreenContext {
    /// Build a context with the default banner duration.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            identity,
            store,
            navigator,
            notifier,
            banner_duration: DEFAULT_BANNER_DURATION,
        }
    }

    /// Override the banner duration.
    #[must_use]
    pub fn with_banner_duration(mut self, duration: Duration) -> Self {
        self.banner_duration = duration;
        self
    }
}

impl fmt::Debug for ScreenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenContext")
            .field("banner_duration", &self.banner_duration)
            .finish_non_exhaustive()
    }
}

/// Where a screen is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the identity provider.
    Loading,
    /// Content shown, accepting input.
    Ready,
    /// A create call is in flight; the submit control is disabled.
    Submitting,
    /// Sent to the login screen. Terminal.
    Redirected,
}

impl Phase {
    /// Whether form content is visible in this phase.
    #[must_use]
    pub fn shows_content(self) -> bool {
        matches!(self, Self::Ready | Self::Submitting)
    }
}

/// Shared flag tracking whether a mounted screen is still alive.
///
/// Cloning yields a handle to the same flag, so a host can end the lifetime
/// while the screen is awaiting a network call.
#[derive(Debug, Clone)]
pub struct ScreenLifetime {
    ended: Arc<AtomicBool>,
}

impl ScreenLifetime {
    /// Create a live lifetime.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ended: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the screen as unmounted.
    pub fn end(&self) {
        self.ended.store(true, Ordering::SeqCst);
    }

    /// Whether the screen is still mounted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.ended.load(Ordering::SeqCst)
    }
}

impl Default for ScreenLifetime {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient "saved" banner.
#[derive(Debug, Clone)]
pub struct SuccessBanner {
    shown_at: Option<Instant>,
    duration: Duration,
}

impl SuccessBanner {
    /// A hidden banner that stays up for `duration` once shown.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            shown_at: None,
            duration,
        }
    }

    /// Show the banner, restarting its timer.
    pub fn show(&mut self) {
        self.shown_at = Some(Instant::now());
    }

    /// Whether the banner is currently visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.shown_at
            .is_some_and(|shown_at| shown_at.elapsed() < self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_clone_shares_flag() {
        let lifetime = ScreenLifetime::new();
        let handle = lifetime.clone();
        assert!(lifetime.is_active());

        handle.end();
        assert!(!lifetime.is_active());
    }

    #[test]
    fn test_phase_shows_content() {
        assert!(!Phase::Loading.shows_content());
        assert!(Phase::Ready.shows_content());
        assert!(Phase::Submitting.shows_content());
        assert!(!Phase::Redirected.shows_content());
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_expires() {
        let mut banner = SuccessBanner::new(Duration::from_secs(3));
        assert!(!banner.is_visible());

        banner.show();
        assert!(banner.is_visible());

        tokio::time::advance(Duration::from_millis(2_999)).await;
        assert!(banner.is_visible());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!banner.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_show_restarts_timer() {
        let mut banner = SuccessBanner::new(Duration::from_secs(3));
        banner.show();
        tokio::time::advance(Duration::from_secs(2)).await;
        banner.show();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(banner.is_visible());
    }
}
