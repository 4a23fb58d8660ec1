//! Domain Layer - Core value types and transcript logic.
//!
//! This layer contains the update payloads and speech-claim types with no
//! coordination logic. All types here are pure Rust with serialization
//! support where it makes sense.

/// Live update payloads (price, weather, storage).
pub mod updates;

/// Speech recognition languages, callbacks, and transcript partitioning.
pub mod speech;
