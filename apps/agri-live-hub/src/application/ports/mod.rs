//! Port Interfaces
//!
//! Contracts between the coordination services and their external
//! collaborators, following the Hexagonal Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`UpdateSource`]: Produces one batch of updates per broadcaster tick.
//!   The default implementation is the simulated feed; a production
//!   deployment plugs in a real market/weather/storage provider.
//! - [`SpeechEngine`]: Control surface of a continuous speech-recognition
//!   engine. Session events flow back into the arbiter as [`EngineEvent`]s.

use async_trait::async_trait;

use crate::domain::speech::{RecognitionSegment, SpeechLanguage};
use crate::domain::updates::UpdateBatch;

// =============================================================================
// Update Source
// =============================================================================

/// A pluggable source of live updates.
///
/// Invoked once per broadcaster tick; may return zero or more updates per
/// kind. Implementations must not block the runtime — slow providers
/// should do their own buffering and hand back whatever is ready.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Produce the next batch of updates.
    async fn next_batch(&self) -> UpdateBatch;
}

// =============================================================================
// Speech Engine
// =============================================================================

/// Error from a speech engine control operation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    /// Engine-reported failure description.
    pub message: String,
}

impl EngineError {
    /// Create a new engine error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Event emitted by a running engine session.
///
/// Adapters feed these into [`SpeechArbiter::handle_engine_event`], which
/// routes them to the active claimant.
///
/// [`SpeechArbiter::handle_engine_event`]:
///     crate::application::services::arbiter::SpeechArbiter::handle_engine_event
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The engine session has started listening.
    Started,
    /// A batch of recognized segments, each tagged interim or final.
    Results(Vec<RecognitionSegment>),
    /// Unrecoverable engine error; the session is over. Carries the
    /// engine's error code verbatim.
    Error(String),
    /// The engine session ended on its own.
    Ended,
}

/// Control surface of a continuous speech-recognition engine.
///
/// At most one session runs at a time; `start` while a session is live is
/// adapter-defined and the arbiter always stops before restarting.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechEngine: Send + Sync {
    /// Start a recognition session with the currently configured language.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot begin listening (microphone
    /// busy, permission denied, ...).
    fn start(&self) -> Result<(), EngineError>;

    /// Stop the current recognition session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the stop; callers treat
    /// this as best-effort.
    fn stop(&self) -> Result<(), EngineError>;

    /// Reconfigure the recognition language. Engines that cannot
    /// reconfigure a live session apply it on the next start.
    fn set_language(&self, language: SpeechLanguage);
}
