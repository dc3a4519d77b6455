//! Test doubles shared by the screen tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::identity::{AuthState, IdentityProvider, Session, SessionSubscription};
use crate::notify::Notifier;
use crate::record::{Collection, Document, RecordId};
use crate::router::RouteHistory;
use crate::screen::{ScreenContext, ScreenLifetime};
use crate::storage::DocumentStore;

/// A context wired to a fresh [`RouteHistory`], returned alongside it.
pub(crate) fn context(
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
) -> (ScreenContext, Arc<RouteHistory>) {
    let history = Arc::new(RouteHistory::new());
    let ctx = ScreenContext::new(identity, store, history.clone(), notifier);
    (ctx, history)
}

/// Store whose every call fails. Counts the queries it was asked for.
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    queries: AtomicUsize,
}

impl FailingStore {
    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn create(
        &self,
        collection: Collection,
        _payload: serde_json::Value,
    ) -> Result<RecordId> {
        Err(Error::store_write(collection.name(), "permission denied"))
    }

    async fn query_eq(
        &self,
        _collection: Collection,
        _field: &str,
        _value: &str,
    ) -> Result<Vec<Document>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Err(Error::internal("backend unavailable"))
    }
}

/// Store that accepts writes but ends a screen's lifetime before answering.
#[derive(Debug, Default)]
pub(crate) struct UnmountingStore {
    lifetime: Mutex<Option<ScreenLifetime>>,
    created: AtomicUsize,
}

impl UnmountingStore {
    pub(crate) fn watch(&self, lifetime: ScreenLifetime) {
        *self.lifetime.lock().unwrap() = Some(lifetime);
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for UnmountingStore {
    async fn create(
        &self,
        _collection: Collection,
        _payload: serde_json::Value,
    ) -> Result<RecordId> {
        self.created.fetch_add(1, Ordering::SeqCst);
        if let Some(lifetime) = self.lifetime.lock().unwrap().as_ref() {
            lifetime.end();
        }
        Ok(RecordId::generate())
    }

    async fn query_eq(
        &self,
        _collection: Collection,
        _field: &str,
        _value: &str,
    ) -> Result<Vec<Document>> {
        Ok(Vec::new())
    }
}

/// Notifier that records alerts instead of showing them.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

/// Identity provider that is signed in and refuses to sign out.
#[derive(Debug)]
pub(crate) struct StuckIdentity {
    tx: watch::Sender<AuthState>,
}

impl StuckIdentity {
    pub(crate) fn new(session: Session) -> Self {
        let (tx, _rx) = watch::channel(AuthState::SignedIn(session));
        Self { tx }
    }
}

#[async_trait]
impl IdentityProvider for StuckIdentity {
    fn subscribe(&self) -> SessionSubscription {
        SessionSubscription::new(self.tx.subscribe())
    }

    async fn sign_out(&self) -> Result<()> {
        Err(Error::sign_out("network unreachable"))
    }
}
