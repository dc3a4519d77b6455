//! Blocking user-facing alerts.

use std::io::Write;

/// Shows a message the user has to acknowledge.
pub trait Notifier: Send + Sync {
    /// Show `message`.
    fn alert(&self, message: &str);
}

/// Notifier that writes alerts to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "⚠ {message}");
    }
}
