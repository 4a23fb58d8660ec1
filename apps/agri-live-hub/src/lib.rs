#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Agri Live Hub - Real-Time Farm Data Coordinator
//!
//! Owns the two coordination mechanisms behind the agricultural dashboard:
//! a periodic update broadcaster that fans mandi price, weather, and storage
//! updates out to typed subscribers, and an arbiter that serializes access to
//! a single shared speech-recognition engine across competing UI components.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core value types with no coordination logic
//!   - `updates`: Price, weather, and storage update payloads
//!   - `speech`: Recognition languages, claim callbacks, transcript handling
//!
//! - **Application**: Services and port definitions
//!   - `ports`: Interfaces for update feeds and speech engines
//!   - `services`: Update broadcaster and speech arbiter
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `broadcast`: Typed subscriber registry and fan-out delivery
//!   - `feed`: Simulated mandi/weather/storage feed
//!   - `config`: Environment-based configuration
//!   - `telemetry`: Structured logging setup
//!
//! # Data Flow
//!
//! ```text
//! UpdateSource ──► UpdateBroadcaster ──► UpdateBus ──► Subscriber 1
//!   (per tick)        (timer task)       (fan-out) ──► Subscriber 2
//!                                                  ──► Subscriber N
//!
//! SpeechEngine ──► SpeechArbiter ──► active claimant only
//!   (events)       (exclusive claim)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core value types with no coordination logic.
pub mod domain;

/// Application layer - Services and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::speech::{
    RecognitionCallbacks, RecognitionSegment, SpeechLanguage, partition_transcripts,
};
pub use domain::updates::{
    PriceUpdate, StorageStatus, StorageUpdate, UpdateBatch, UpdateKind, WeatherUpdate,
};

// Ports
pub use application::ports::{EngineError, EngineEvent, SpeechEngine, UpdateSource};

// Services
pub use application::services::arbiter::{SpeechArbiter, SpeechError};
pub use application::services::broadcaster::{
    BroadcasterConfig, LiveConnection, UpdateBroadcaster,
};

// Broadcast bus
pub use infrastructure::broadcast::{BusStats, SubscriptionHandle, SubscriptionId, UpdateBus};

// Simulated feed
pub use infrastructure::feed::{FeedCatalog, SimulatedFeed, Warehouse};

// Config
pub use infrastructure::config::{ConfigError, HubConfig};
