//! Tracing setup for the `cadastro` binary.
//!
//! Screens and stores only emit events. The subscriber is installed once, by
//! the CLI, and writes to stderr so rendered screens on stdout stay clean.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// How much the CLI logs, picked from `-q` and `-v` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above, with event targets.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// Map the global flags onto a verbosity. `quiet` wins over any `-v`.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Most detailed level shown for the crate's own events.
    #[must_use]
    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Filter directive used when `RUST_LOG` is absent.
    #[must_use]
    pub fn directive(self) -> String {
        format!("cadastro={}", self.level())
    }

    fn shows_targets(self) -> bool {
        matches!(self, Self::Verbose | Self::Trace)
    }
}

/// Build the filter: a usable `RUST_LOG` replaces the flag-derived directive.
fn filter_for(verbosity: Verbosity, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.directive()))
}

/// Install the stderr subscriber.
///
/// A second call is a no-op.
///
/// # Examples
///
/// ```no_run
/// use cadastro::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_for(verbosity, rust_log.as_deref());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity.shows_targets())
                .without_time(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_to_verbosity() {
        assert_eq!(Verbosity::from_flags(true, 2), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 5), Verbosity::Trace);
    }

    #[test]
    fn test_directive_names_crate() {
        assert_eq!(Verbosity::Quiet.directive(), "cadastro=error");
        assert_eq!(Verbosity::default().directive(), "cadastro=info");
        assert_eq!(Verbosity::Trace.directive(), "cadastro=trace");
    }

    #[test]
    fn test_filter_follows_verbosity_without_env() {
        let filter = filter_for(Verbosity::Verbose, None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = filter_for(Verbosity::Quiet, Some("   "));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_rust_log_overrides_flags() {
        let filter = filter_for(Verbosity::Quiet, Some("cadastro=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_invalid_rust_log_falls_back() {
        let filter = filter_for(Verbosity::Normal, Some("cadastro=loud"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_targets_only_when_verbose() {
        assert!(!Verbosity::Normal.shows_targets());
        assert!(Verbosity::Verbose.shows_targets());
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
    }
}
