//! `cadastro` - Session-gated profile and device registration
//!
//! This library provides the screen models behind a small registration app:
//! a welcome screen, a profile form and a device registration form. Each
//! screen is gated on the current session, keeps a typed draft, and submits
//! records to a document store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod identity;
pub mod logging;
pub mod notify;
pub mod record;
pub mod render;
pub mod router;
pub mod screen;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{Error, Result};
pub use identity::{AuthState, IdentityProvider, LocalIdentity, Session};
pub use logging::init_logging;
pub use notify::{ConsoleNotifier, Notifier};
pub use record::{Collection, DeviceRecord, ProfileSubmission, RecordId, StoredDevice};
pub use router::{Navigator, Route, RouteHistory};
pub use screen::{DeviceScreen, FormScreen, ProfileForm, ScreenContext, WelcomeScreen};
pub use storage::{DocumentStore, SqliteStore};
