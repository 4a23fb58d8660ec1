//! Application Services
//!
//! The two process-wide coordination services. Both are explicitly
//! constructed and shared by handle (`Arc`) rather than hidden behind a
//! global, so tests can build isolated instances.
//!
//! - [`broadcaster`]: Periodic update generation and fan-out.
//! - [`arbiter`]: Exclusive access to the shared speech-recognition engine.

/// Periodic update broadcaster and the reference-counted connection adapter.
pub mod broadcaster;

/// Exclusive speech-recognition arbiter.
pub mod arbiter;
