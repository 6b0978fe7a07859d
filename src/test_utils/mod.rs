//! Test utilities for solution-templatize
//!
//! Logging setup and shared fixtures: a small hospital feature service catalog
//! and a dashboard that references it.
//!
//! # Example
//!
//! ```rust,no_run
//! use solution_templatize::templating::Templatizer;
//! use solution_templatize::test_utils::{hospital_catalog, init_test_logging, sample_dashboard};
//!
//! init_test_logging(None);
//! let template = solution_templatize::dashboard::templatize_dashboard(
//!     &sample_dashboard(),
//!     &hospital_catalog(),
//!     &Templatizer::default(),
//! )
//! .unwrap();
//! assert_eq!(template.datasources.len(), 2);
//! ```

pub mod fixtures;

pub use fixtures::{
    HOSPITAL_ITEM_ID, WEB_MAP_LAYER_ID, hospital_catalog, sample_dashboard, sample_web_app,
    write_json_file,
};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, tests run
/// without a subscriber.
///
/// ```bash
/// RUST_LOG=solution_templatize=trace cargo test
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
