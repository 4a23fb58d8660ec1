//! Speech Recognition Arbiter
//!
//! Serializes access to the single shared speech-recognition engine so
//! only one UI component receives transcript events at a time. A new
//! claimant preempts the current one: the engine session is stopped
//! best-effort, callbacks and owner are rebound, and the engine is
//! restarted with the configured language. The previous owner gets no
//! notification; its events simply stop arriving.
//!
//! State is a tagged `Idle | Active` value behind one lock, and claimant
//! callbacks are always invoked with that lock released, so a claimant may
//! call back into the arbiter (e.g. `stop_recognition` from its own error
//! handler).
//!
//! Claim handoffs are serialized: `start_recognition` and
//! `stop_recognition` hold a handoff lock across the whole
//! revoke → engine stop → start → bind sequence, so concurrent claims
//! cannot overlap engine sessions. No claimant callback runs under that
//! lock; engine `start`/`stop` implementations must not call back into the
//! arbiter synchronously.

use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::application::ports::{EngineError, EngineEvent, SpeechEngine};
use crate::domain::speech::{RecognitionCallbacks, SpeechLanguage, partition_transcripts};

// =============================================================================
// Errors
// =============================================================================

/// Error starting a recognition claim.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// The host exposes no speech-recognition capability.
    #[error("speech recognition is not available on this host")]
    UnsupportedCapability,
    /// The engine refused to start a session. The claim was discarded and
    /// the arbiter is idle; no `on_error` callback is synthesized.
    #[error("speech engine failed to start")]
    EngineStartFailed(#[source] EngineError),
}

// =============================================================================
// Claim State
// =============================================================================

/// The active claim, when there is one.
struct ActiveClaim {
    owner: String,
    callbacks: Arc<RecognitionCallbacks>,
}

enum ClaimState {
    Idle,
    Active(ActiveClaim),
}

// =============================================================================
// Arbiter
// =============================================================================

/// Exclusive-access arbiter over the shared speech-recognition engine.
///
/// One instance exists per process, created at startup and shared by
/// handle with every component that wants the microphone.
pub struct SpeechArbiter {
    engine: Option<Arc<dyn SpeechEngine>>,
    state: Mutex<ClaimState>,
    handoff: Mutex<()>,
    language: Mutex<SpeechLanguage>,
    unsupported_logged: AtomicBool,
}

impl SpeechArbiter {
    /// Create an arbiter over the host's speech engine, or over none when
    /// the host has no recognition capability. Absence is logged once,
    /// here.
    #[must_use]
    pub fn new(engine: Option<Arc<dyn SpeechEngine>>) -> Self {
        if engine.is_none() {
            tracing::warn!("no speech engine available; recognition disabled");
        }
        Self {
            engine,
            state: Mutex::new(ClaimState::Idle),
            handoff: Mutex::new(()),
            language: Mutex::new(SpeechLanguage::default()),
            unsupported_logged: AtomicBool::new(false),
        }
    }

    /// Create an arbiter over a present engine.
    #[must_use]
    pub fn with_engine(engine: Arc<dyn SpeechEngine>) -> Self {
        Self::new(Some(engine))
    }

    /// Whether the host exposes a speech engine at all.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    /// Whether a claim currently holds the engine.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(&*self.state.lock(), ClaimState::Active(_))
    }

    /// Label of the current claimant; empty when idle.
    #[must_use]
    pub fn current_owner(&self) -> String {
        match &*self.state.lock() {
            ClaimState::Active(claim) => claim.owner.clone(),
            ClaimState::Idle => String::new(),
        }
    }

    /// The language applied to engine sessions.
    #[must_use]
    pub fn language(&self) -> SpeechLanguage {
        *self.language.lock()
    }

    /// Set the recognition language for future sessions, pushing it to the
    /// engine immediately when one is present.
    pub fn set_language(&self, language: SpeechLanguage) {
        *self.language.lock() = language;
        if let Some(engine) = &self.engine {
            engine.set_language(language);
            tracing::info!(locale = language.locale(), "recognition language set");
        }
    }

    /// Claim the engine for `owner`, preempting any current claimant.
    ///
    /// A preempted claimant gets no notification; its events are simply no
    /// longer routed. On engine start failure the new callbacks are
    /// discarded, the arbiter stays idle, and no `on_error` is synthesized
    /// — the caller inspects the returned error instead.
    ///
    /// # Errors
    ///
    /// - [`SpeechError::UnsupportedCapability`] when the host has no
    ///   engine; the arbiter stays idle.
    /// - [`SpeechError::EngineStartFailed`] when the engine rejects the
    ///   start.
    pub fn start_recognition(
        &self,
        callbacks: RecognitionCallbacks,
        owner: impl Into<String>,
    ) -> Result<(), SpeechError> {
        let owner = owner.into();

        let Some(engine) = &self.engine else {
            if !self.unsupported_logged.swap(true, Ordering::SeqCst) {
                tracing::error!(owner = %owner, "speech recognition not supported");
            }
            return Err(SpeechError::UnsupportedCapability);
        };

        // One handoff at a time: without this, two claims racing from idle
        // would both start the engine with no intervening stop. No claimant
        // callback runs while the guard is held.
        let _handoff = self.handoff.lock();

        // Revoke the previous claim before touching the engine, so its
        // callbacks can no longer be reached by in-flight events.
        let previous = mem::replace(&mut *self.state.lock(), ClaimState::Idle);
        if let ClaimState::Active(claim) = previous {
            tracing::info!(from = %claim.owner, to = %owner, "preempting recognition claim");
            if let Err(error) = engine.stop() {
                tracing::warn!(error = %error, "engine stop failed during handoff");
            }
        }

        engine.set_language(*self.language.lock());
        match engine.start() {
            Ok(()) => {
                *self.state.lock() = ClaimState::Active(ActiveClaim {
                    owner: owner.clone(),
                    callbacks: Arc::new(callbacks),
                });
                tracing::info!(owner = %owner, "recognition started");
                Ok(())
            }
            Err(error) => {
                tracing::error!(owner = %owner, error = %error, "engine failed to start");
                Err(SpeechError::EngineStartFailed(error))
            }
        }
    }

    /// Release the current claim, stopping the engine best-effort.
    /// Idempotent; safe to call from within a claimant callback. No
    /// `on_end` is synthesized.
    pub fn stop_recognition(&self) {
        let _handoff = self.handoff.lock();
        let previous = mem::replace(&mut *self.state.lock(), ClaimState::Idle);
        if let ClaimState::Active(claim) = previous {
            if let Some(engine) = &self.engine {
                if let Err(error) = engine.stop() {
                    tracing::warn!(error = %error, "engine stop failed");
                }
            }
            tracing::info!(owner = %claim.owner, "recognition stopped");
        }
    }

    /// Route one engine session event to the active claimant.
    ///
    /// Terminal events (`Error`, `Ended`) transition to idle before the
    /// claimant callback runs. Events while idle are dropped.
    pub fn handle_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Started => {
                if let Some(callbacks) = self.active_callbacks() {
                    if let Some(on_start) = &callbacks.on_start {
                        on_start();
                    }
                }
            }
            EngineEvent::Results(segments) => {
                let Some(callbacks) = self.active_callbacks() else {
                    return;
                };
                let Some(on_result) = &callbacks.on_result else {
                    return;
                };
                let (interim, finalized) = partition_transcripts(&segments);
                if !interim.is_empty() {
                    on_result(&interim, false);
                }
                if !finalized.is_empty() {
                    on_result(&finalized, true);
                }
            }
            EngineEvent::Error(code) => {
                let previous = mem::replace(&mut *self.state.lock(), ClaimState::Idle);
                if let ClaimState::Active(claim) = previous {
                    tracing::warn!(owner = %claim.owner, code = %code, "recognition error");
                    if let Some(on_error) = &claim.callbacks.on_error {
                        on_error(&code);
                    }
                }
            }
            EngineEvent::Ended => {
                let previous = mem::replace(&mut *self.state.lock(), ClaimState::Idle);
                if let ClaimState::Active(claim) = previous {
                    tracing::debug!(owner = %claim.owner, "recognition ended");
                    if let Some(on_end) = &claim.callbacks.on_end {
                        on_end();
                    }
                }
            }
        }
    }

    /// Snapshot the active claim's callbacks without holding the state
    /// lock across their invocation.
    fn active_callbacks(&self) -> Option<Arc<RecognitionCallbacks>> {
        match &*self.state.lock() {
            ClaimState::Active(claim) => Some(Arc::clone(&claim.callbacks)),
            ClaimState::Idle => None,
        }
    }
}

impl std::fmt::Debug for SpeechArbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechArbiter")
            .field("supported", &self.is_supported())
            .field("active", &self.is_active())
            .field("owner", &self.current_owner())
            .field("language", &self.language())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
