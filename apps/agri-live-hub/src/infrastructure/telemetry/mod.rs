//! Structured Logging Setup
//!
//! Configures `tracing-subscriber` with an environment filter.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: `agri_live_hub=info`)
//!
//! # Usage
//!
//! ```ignore
//! use agri_live_hub::infrastructure::telemetry;
//!
//! // Initialize once at startup.
//! telemetry::init();
//! ```

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "agri_live_hub=info";

/// Initialize the global tracing subscriber.
///
/// Idempotent: repeated calls (e.g. from parallel tests) leave the first
/// subscriber in place.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
