//! Test utilities for vtpl
//!
//! Logging setup for tests and ready-made template fixtures that can be
//! served from memory or written to a temporary template directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use vtpl::render::Engine;
//! use vtpl::test_utils::{SiteFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let engine = Engine::new(SiteFixture::blog().loader());
//! ```

pub mod fixtures;

pub use fixtures::{SiteFixture, TemplateFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG` when set, otherwise leaves logging off.
///
/// ```bash
/// RUST_LOG=vtpl=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
