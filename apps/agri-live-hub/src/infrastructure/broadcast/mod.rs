//! Update Fan-Out Bus
//!
//! Keeps one explicit registry per update kind and delivers each published
//! update to every registered subscriber, in registration order. There is
//! no replay: subscribers only see updates published after they register.
//!
//! # Delivery semantics
//!
//! - Insertion order is delivery order; duplicate registrations are kept
//!   and each receives its own delivery.
//! - Every subscriber gets an owned copy of the update.
//! - A panicking subscriber is isolated and logged; delivery continues
//!   with the remaining subscribers.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::domain::updates::{
    PriceUpdate, StorageUpdate, UpdateBatch, UpdateKind, WeatherUpdate,
};

// =============================================================================
// Subscription Handles
// =============================================================================

/// Unique identifier for one registration on the bus.
pub type SubscriptionId = u64;

/// Handle returned by `on_*`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    /// Kind this subscription receives.
    pub kind: UpdateKind,
    id: SubscriptionId,
}

type Subscriber<T> = Arc<dyn Fn(T) + Send + Sync>;
type Registry<T> = RwLock<Vec<(SubscriptionId, Subscriber<T>)>>;

// =============================================================================
// Update Bus
// =============================================================================

/// Typed fan-out bus for the three update kinds.
///
/// # Example
///
/// ```rust
/// use agri_live_hub::UpdateBus;
///
/// let bus = UpdateBus::new();
/// let handle = bus.on_price(|update| {
///     println!("{} at {}: {}", update.crop, update.location, update.new_price);
/// });
///
/// // ... publish batches ...
///
/// bus.unsubscribe(handle);
/// ```
#[derive(Default)]
pub struct UpdateBus {
    next_id: AtomicU64,
    price: Registry<PriceUpdate>,
    weather: Registry<WeatherUpdate>,
    storage: Registry<StorageUpdate>,
}

impl UpdateBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> SubscriptionId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Register a price subscriber. Future price updates only, no replay.
    pub fn on_price(
        &self,
        callback: impl Fn(PriceUpdate) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.next_id();
        self.price.write().push((id, Arc::new(callback)));
        SubscriptionHandle {
            kind: UpdateKind::Price,
            id,
        }
    }

    /// Register a weather subscriber.
    pub fn on_weather(
        &self,
        callback: impl Fn(WeatherUpdate) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.next_id();
        self.weather.write().push((id, Arc::new(callback)));
        SubscriptionHandle {
            kind: UpdateKind::Weather,
            id,
        }
    }

    /// Register a storage subscriber.
    pub fn on_storage(
        &self,
        callback: impl Fn(StorageUpdate) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.next_id();
        self.storage.write().push((id, Arc::new(callback)));
        SubscriptionHandle {
            kind: UpdateKind::Storage,
            id,
        }
    }

    /// Remove one registration. Returns `false` when the handle is not
    /// registered (already removed, or never issued by this bus).
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        fn remove<T>(registry: &Registry<T>, id: SubscriptionId) -> bool {
            let mut subscribers = registry.write();
            let before = subscribers.len();
            subscribers.retain(|(registered, _)| *registered != id);
            subscribers.len() < before
        }

        match handle.kind {
            UpdateKind::Price => remove(&self.price, handle.id),
            UpdateKind::Weather => remove(&self.weather, handle.id),
            UpdateKind::Storage => remove(&self.storage, handle.id),
        }
    }

    // =========================================================================
    // Publishing
    // =========================================================================

    /// Publish one batch: all prices, then all weather, then all storage.
    pub fn publish(&self, batch: UpdateBatch) {
        for update in batch.prices {
            self.publish_price(update);
        }
        for update in batch.weather {
            self.publish_weather(update);
        }
        for update in batch.storage {
            self.publish_storage(update);
        }
    }

    /// Deliver one price update to all price subscribers.
    pub fn publish_price(&self, update: PriceUpdate) {
        deliver(&self.price, UpdateKind::Price, update);
    }

    /// Deliver one weather update to all weather subscribers.
    pub fn publish_weather(&self, update: WeatherUpdate) {
        deliver(&self.weather, UpdateKind::Weather, update);
    }

    /// Deliver one storage update to all storage subscribers.
    pub fn publish_storage(&self, update: StorageUpdate) {
        deliver(&self.storage, UpdateKind::Storage, update);
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Number of subscribers registered for one kind.
    #[must_use]
    pub fn subscriber_count(&self, kind: UpdateKind) -> usize {
        match kind {
            UpdateKind::Price => self.price.read().len(),
            UpdateKind::Weather => self.weather.read().len(),
            UpdateKind::Storage => self.storage.read().len(),
        }
    }

    /// Get per-kind subscriber counts.
    #[must_use]
    pub fn stats(&self) -> BusStats {
        BusStats {
            price_subscribers: self.subscriber_count(UpdateKind::Price),
            weather_subscribers: self.subscriber_count(UpdateKind::Weather),
            storage_subscribers: self.subscriber_count(UpdateKind::Storage),
        }
    }
}

impl std::fmt::Debug for UpdateBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateBus")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Deliver one update to every subscriber in registration order, isolating
/// panicking callbacks.
///
/// The registry lock is released before any callback runs, so subscribers
/// may re-enter the bus (subscribe, unsubscribe) from inside a delivery.
/// Registry changes made mid-delivery apply from the next update onward.
fn deliver<T: Clone>(registry: &Registry<T>, kind: UpdateKind, update: T) {
    let snapshot: Vec<(SubscriptionId, Subscriber<T>)> = {
        let subscribers = registry.read();
        subscribers
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect()
    };

    for (id, callback) in snapshot {
        let owned = update.clone();
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| callback(owned)));
        if outcome.is_err() {
            tracing::warn!(
                kind = %kind,
                subscription_id = id,
                "subscriber panicked during delivery; continuing"
            );
        }
    }
}

/// Shared bus reference.
pub type SharedUpdateBus = Arc<UpdateBus>;

/// Per-kind subscriber counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Number of price subscribers.
    pub price_subscribers: usize,
    /// Number of weather subscribers.
    pub weather_subscribers: usize,
    /// Number of storage subscribers.
    pub storage_subscribers: usize,
}

impl BusStats {
    /// Total subscribers across all kinds.
    #[must_use]
    pub const fn total_subscribers(&self) -> usize {
        self.price_subscribers + self.weather_subscribers + self.storage_subscribers
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    use super::*;

    fn make_price(crop: &str) -> PriceUpdate {
        PriceUpdate {
            crop: crop.to_string(),
            location: "Ludhiana".to_string(),
            old_price: Decimal::from(2000),
            new_price: Decimal::from(2040),
            change: Decimal::from(40),
            change_percent: Decimal::new(2, 0),
            volume: 420,
        }
    }

    #[test]
    fn empty_bus_has_no_subscribers() {
        let bus = UpdateBus::new();
        assert_eq!(bus.stats().total_subscribers(), 0);
        for kind in UpdateKind::all() {
            assert_eq!(bus.subscriber_count(*kind), 0);
        }
    }

    #[test]
    fn publish_reaches_registered_subscriber() {
        let bus = UpdateBus::new();
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&seen);
        bus.on_price(move |update| sink.lock().push(update.crop));

        bus.publish_price(make_price("wheat"));
        assert_eq!(seen.lock().as_slice(), ["wheat"]);
    }

    #[test]
    fn unsubscribe_is_exact_and_idempotent() {
        let bus = UpdateBus::new();
        let handle = bus.on_price(|_| {});
        assert_eq!(bus.subscriber_count(UpdateKind::Price), 1);

        assert!(bus.unsubscribe(handle));
        assert_eq!(bus.subscriber_count(UpdateKind::Price), 0);

        // Second removal of the same handle is a no-op.
        assert!(!bus.unsubscribe(handle));
    }

    #[test]
    fn duplicate_registration_delivers_twice() {
        let bus = UpdateBus::new();
        let hits = Arc::new(Mutex::new(0_u32));

        let sink = Arc::clone(&hits);
        let callback = move |_: PriceUpdate| *sink.lock() += 1;
        let first = bus.on_price(callback.clone());
        let _second = bus.on_price(callback);

        bus.publish_price(make_price("rice"));
        assert_eq!(*hits.lock(), 2);

        // Removing one registration leaves the other.
        assert!(bus.unsubscribe(first));
        bus.publish_price(make_price("rice"));
        assert_eq!(*hits.lock(), 3);
    }

    #[test]
    fn stats_reflect_all_kinds() {
        let bus = UpdateBus::new();
        let _p = bus.on_price(|_| {});
        let _w = bus.on_weather(|_| {});
        let _s1 = bus.on_storage(|_| {});
        let _s2 = bus.on_storage(|_| {});

        let stats = bus.stats();
        assert_eq!(stats.price_subscribers, 1);
        assert_eq!(stats.weather_subscribers, 1);
        assert_eq!(stats.storage_subscribers, 2);
        assert_eq!(stats.total_subscribers(), 4);
    }

    #[test]
    fn panicking_subscriber_does_not_break_delivery() {
        let bus = UpdateBus::new();
        let seen = Arc::new(Mutex::new(0_u32));

        bus.on_price(|_| panic!("subscriber bug"));
        let sink = Arc::clone(&seen);
        bus.on_price(move |_| *sink.lock() += 1);

        bus.publish_price(make_price("cotton"));
        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn subscriber_may_unsubscribe_itself_mid_delivery() {
        let bus = Arc::new(UpdateBus::new());
        let handle_slot: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::new(Mutex::new(None));

        let bus_ref = Arc::clone(&bus);
        let slot = Arc::clone(&handle_slot);
        let hits = Arc::new(Mutex::new(0_u32));
        let sink = Arc::clone(&hits);
        let handle = bus.on_price(move |_| {
            *sink.lock() += 1;
            if let Some(own) = slot.lock().take() {
                bus_ref.unsubscribe(own);
            }
        });
        *handle_slot.lock() = Some(handle);

        bus.publish_price(make_price("wheat"));
        bus.publish_price(make_price("wheat"));
        assert_eq!(*hits.lock(), 1, "second publish skips removed subscriber");
    }
}
