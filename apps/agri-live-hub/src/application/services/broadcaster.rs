//! Update Broadcaster
//!
//! Owns the periodic tick that pulls a batch from the configured
//! [`UpdateSource`] and fans it out through the [`UpdateBus`]. One
//! broadcaster instance exists per process, created at startup and shared
//! by handle; consumers go through [`LiveConnection`] adapters whose
//! connect/disconnect reference-count the underlying timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::ports::UpdateSource;
use crate::infrastructure::broadcast::{SubscriptionHandle, UpdateBus};
use crate::{PriceUpdate, StorageUpdate, WeatherUpdate};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the update broadcaster.
#[derive(Debug, Clone, Copy)]
pub struct BroadcasterConfig {
    /// Interval between update ticks.
    pub tick_interval: Duration,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(30),
        }
    }
}

impl BroadcasterConfig {
    /// Create a configuration with a custom tick interval.
    #[must_use]
    pub const fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }
}

// =============================================================================
// Broadcaster
// =============================================================================

/// Handle to the running tick task. Cancel-only: the task is never awaited,
/// so `stop` can be called from inside a subscriber callback.
struct TickTask {
    cancel: CancellationToken,
}

/// Periodic update broadcaster.
///
/// `start` and `stop` are idempotent. A stopped broadcaster keeps its bus
/// and source and can be started again.
pub struct UpdateBroadcaster {
    config: BroadcasterConfig,
    source: Arc<dyn UpdateSource>,
    bus: Arc<UpdateBus>,
    task: Mutex<Option<TickTask>>,
    connections: AtomicUsize,
}

impl UpdateBroadcaster {
    /// Create a new broadcaster over the given source and bus.
    #[must_use]
    pub fn new(
        config: BroadcasterConfig,
        source: Arc<dyn UpdateSource>,
        bus: Arc<UpdateBus>,
    ) -> Self {
        Self {
            config,
            source,
            bus,
            task: Mutex::new(None),
            connections: AtomicUsize::new(0),
        }
    }

    /// Get the fan-out bus this broadcaster publishes to.
    #[must_use]
    pub fn bus(&self) -> &Arc<UpdateBus> {
        &self.bus
    }

    /// Check whether the tick task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Number of connected [`LiveConnection`] adapters.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Start the periodic tick. No-op if already running.
    ///
    /// The first tick fires one full interval after start. Ticks that fall
    /// due while a previous tick is still delivering are skipped, never
    /// queued.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            tracing::debug!("update broadcaster already running");
            return;
        }

        let cancel = CancellationToken::new();
        let interval = self.config.tick_interval;
        tokio::spawn(run_ticks(
            Arc::clone(&self.source),
            Arc::clone(&self.bus),
            interval,
            cancel.clone(),
        ));
        *task = Some(TickTask { cancel });

        tracing::info!(interval_secs = interval.as_secs_f64(), "update broadcaster started");
    }

    /// Cancel the periodic tick. No-op if not running.
    ///
    /// Cancellation is fire-and-forget: an in-flight delivery finishes on
    /// its own, no further ticks fire.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.cancel.cancel();
            tracing::info!("update broadcaster stopped");
        }
    }

    /// Register a consumer connection, ensuring the tick is running.
    ///
    /// `start` is idempotent, so this also revives the timer after an
    /// explicit [`stop`](Self::stop) that happened while other consumers
    /// stayed connected.
    fn acquire(&self) {
        self.connections.fetch_add(1, Ordering::SeqCst);
        self.start();
    }

    /// Release a consumer connection, stopping the tick when the last one
    /// disconnects.
    fn release(&self) {
        if self.connections.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.stop();
        }
    }
}

impl std::fmt::Debug for UpdateBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateBroadcaster")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("connections", &self.connection_count())
            .finish_non_exhaustive()
    }
}

/// Tick loop: pull a batch from the source and publish it, until cancelled.
async fn run_ticks(
    source: Arc<dyn UpdateSource>,
    bus: Arc<UpdateBus>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("tick task cancelled");
                break;
            }
            _ = interval.tick() => {
                let batch = source.next_batch().await;
                tracing::debug!(updates = batch.len(), "publishing tick batch");
                bus.publish(batch);
            }
        }
    }
}

// =============================================================================
// Live Connection
// =============================================================================

/// Consumer-facing adapter over the shared broadcaster.
///
/// Multiple connections share one broadcaster and one timer. Connects and
/// disconnects are reference-counted: the timer physically starts with the
/// first connected adapter and stops with the last one, so no single
/// consumer can tear the feed down for everyone else.
///
/// Subscriptions made through a connection are tracked locally and removed
/// in bulk by [`close`](Self::close) (also run on drop).
pub struct LiveConnection {
    broadcaster: Arc<UpdateBroadcaster>,
    subscriptions: Mutex<Vec<SubscriptionHandle>>,
    connected: AtomicBool,
}

impl LiveConnection {
    /// Create a disconnected adapter over the shared broadcaster.
    #[must_use]
    pub fn new(broadcaster: Arc<UpdateBroadcaster>) -> Self {
        Self {
            broadcaster,
            subscriptions: Mutex::new(Vec::new()),
            connected: AtomicBool::new(false),
        }
    }

    /// Connect, starting the shared timer if this is the first connection.
    /// No-op if this adapter is already connected.
    ///
    /// # Panics
    ///
    /// Panics if this is the first connection and no Tokio runtime is
    /// active.
    pub fn connect(&self) {
        if !self.connected.swap(true, Ordering::SeqCst) {
            self.broadcaster.acquire();
        }
    }

    /// Disconnect, stopping the shared timer if this was the last
    /// connection. No-op if this adapter is not connected.
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.broadcaster.release();
        }
    }

    /// Check whether this adapter is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Subscribe to price updates.
    pub fn on_price(
        &self,
        callback: impl Fn(PriceUpdate) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.track(self.broadcaster.bus().on_price(callback))
    }

    /// Subscribe to weather updates.
    pub fn on_weather(
        &self,
        callback: impl Fn(WeatherUpdate) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.track(self.broadcaster.bus().on_weather(callback))
    }

    /// Subscribe to storage updates.
    pub fn on_storage(
        &self,
        callback: impl Fn(StorageUpdate) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.track(self.broadcaster.bus().on_storage(callback))
    }

    /// Remove one subscription made through this connection. Returns
    /// `false` if the handle is unknown.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.lock().retain(|tracked| *tracked != handle);
        self.broadcaster.bus().unsubscribe(handle)
    }

    /// Remove all subscriptions made through this connection and
    /// disconnect.
    pub fn close(&self) {
        let handles = std::mem::take(&mut *self.subscriptions.lock());
        for handle in handles {
            self.broadcaster.bus().unsubscribe(handle);
        }
        self.disconnect();
    }

    fn track(&self, handle: SubscriptionHandle) -> SubscriptionHandle {
        self.subscriptions.lock().push(handle);
        handle
    }
}

impl Drop for LiveConnection {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for LiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveConnection")
            .field("connected", &self.is_connected())
            .field("subscriptions", &self.subscriptions.lock().len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
