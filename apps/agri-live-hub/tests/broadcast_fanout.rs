//! Broadcast Fan-Out Integration Tests
//!
//! Exercises the broadcaster timer, delivery ordering, subscription
//! lifecycle, and the reference-counted connection adapter against the
//! public API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use agri_live_hub::{
    BroadcasterConfig, FeedCatalog, LiveConnection, PriceUpdate, SimulatedFeed, StorageStatus,
    StorageUpdate, UpdateBatch, UpdateBroadcaster, UpdateBus, UpdateSource, Warehouse,
    WeatherUpdate,
};

// =============================================================================
// Fixtures
// =============================================================================

/// Source producing one storage update per tick and counting pulls.
struct CountingSource {
    pulls: AtomicUsize,
}

impl CountingSource {
    fn new() -> Self {
        Self {
            pulls: AtomicUsize::new(0),
        }
    }

    fn pull_count(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpdateSource for CountingSource {
    async fn next_batch(&self) -> UpdateBatch {
        let tick = self.pulls.fetch_add(1, Ordering::SeqCst);
        UpdateBatch {
            prices: vec![],
            weather: vec![],
            storage: vec![StorageUpdate {
                location: "Amritsar".to_string(),
                warehouse_id: format!("tick-{tick}"),
                available_capacity: 2500,
                cost_per_ton: Decimal::new(15_000, 2),
                status: StorageStatus::Available,
            }],
        }
    }
}

fn make_price(crop: &str) -> PriceUpdate {
    let old = Decimal::from(2000);
    let new = Decimal::from(1980);
    PriceUpdate {
        crop: crop.to_string(),
        location: "Bathinda".to_string(),
        old_price: old,
        new_price: new,
        change: new - old,
        change_percent: PriceUpdate::percent_change(old, new),
        volume: 300,
    }
}

fn make_weather(location: &str) -> WeatherUpdate {
    WeatherUpdate {
        location: location.to_string(),
        temperature: 28.0,
        humidity: 61.0,
        rainfall: 0.0,
        wind_speed: 11.0,
        condition: "Sunny".to_string(),
        alerts: vec![],
    }
}

// =============================================================================
// Fan-Out Ordering
// =============================================================================

#[test]
fn price_subscribers_fire_in_registration_order_and_only_for_price() {
    let bus = UpdateBus::new();
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    let sink = Arc::clone(&order);
    bus.on_price(move |_| sink.lock().push("A"));
    let sink = Arc::clone(&order);
    bus.on_price(move |_| sink.lock().push("B"));
    let sink = Arc::clone(&order);
    bus.on_weather(move |_| sink.lock().push("weather"));

    bus.publish(UpdateBatch {
        prices: vec![make_price("wheat")],
        weather: vec![make_weather("Patiala")],
        storage: vec![],
    });

    assert_eq!(order.lock().as_slice(), ["A", "B", "weather"]);
}

#[test]
fn kinds_are_delivered_in_batch_order() {
    let bus = UpdateBus::new();
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    // Register storage first; batch order must still win.
    let sink = Arc::clone(&order);
    bus.on_storage(move |_| sink.lock().push("storage"));
    let sink = Arc::clone(&order);
    bus.on_weather(move |_| sink.lock().push("weather"));
    let sink = Arc::clone(&order);
    bus.on_price(move |_| sink.lock().push("price"));

    bus.publish(UpdateBatch {
        prices: vec![make_price("rice"), make_price("cotton")],
        weather: vec![make_weather("Amritsar")],
        storage: vec![StorageUpdate {
            location: "Ludhiana".to_string(),
            warehouse_id: "3".to_string(),
            available_capacity: 1200,
            cost_per_ton: Decimal::new(11_050, 2),
            status: StorageStatus::Limited,
        }],
    });

    assert_eq!(
        order.lock().as_slice(),
        ["price", "price", "weather", "storage"]
    );
}

#[test]
fn unsubscribed_callback_receives_nothing_further() {
    let bus = UpdateBus::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let sink = Arc::clone(&hits);
    let handle = bus.on_price(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    bus.publish_price(make_price("wheat"));
    assert!(bus.unsubscribe(handle));
    bus.publish_price(make_price("wheat"));

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    // Unknown handle removal is a no-op.
    assert!(!bus.unsubscribe(handle));
}

// =============================================================================
// Timer Behavior
// =============================================================================

#[tokio::test(start_paused = true)]
async fn double_start_produces_single_tick_stream() {
    let source = Arc::new(CountingSource::new());
    let bus = Arc::new(UpdateBus::new());
    let broadcaster = UpdateBroadcaster::new(
        BroadcasterConfig::new(Duration::from_millis(10)),
        Arc::clone(&source) as Arc<dyn UpdateSource>,
        Arc::clone(&bus),
    );

    broadcaster.start();
    broadcaster.start();

    tokio::time::sleep(Duration::from_millis(35)).await;
    broadcaster.stop();

    assert_eq!(source.pull_count(), 3, "one timer, three ticks");
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_ticks() {
    let source = Arc::new(CountingSource::new());
    let bus = Arc::new(UpdateBus::new());
    let broadcaster = UpdateBroadcaster::new(
        BroadcasterConfig::new(Duration::from_millis(10)),
        Arc::clone(&source) as Arc<dyn UpdateSource>,
        Arc::clone(&bus),
    );

    broadcaster.start();
    tokio::time::sleep(Duration::from_millis(15)).await;
    broadcaster.stop();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(source.pull_count(), 1);

    // Restart works after a stop.
    broadcaster.start();
    tokio::time::sleep(Duration::from_millis(15)).await;
    broadcaster.stop();
    assert_eq!(source.pull_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn subscriber_may_stop_the_broadcaster_mid_delivery() {
    let source = Arc::new(CountingSource::new());
    let bus = Arc::new(UpdateBus::new());
    let broadcaster = Arc::new(UpdateBroadcaster::new(
        BroadcasterConfig::new(Duration::from_millis(10)),
        Arc::clone(&source) as Arc<dyn UpdateSource>,
        Arc::clone(&bus),
    ));

    let stopper = Arc::clone(&broadcaster);
    bus.on_storage(move |_| stopper.stop());

    broadcaster.start();
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(source.pull_count(), 1, "self-stop after the first tick");
    assert!(!broadcaster.is_running());
}

// =============================================================================
// End-to-End Scenario
// =============================================================================

#[tokio::test(start_paused = true)]
async fn three_ticks_deliver_three_storage_updates() {
    let catalog = FeedCatalog {
        crops: vec![],
        locations: vec![],
        warehouses: vec![Warehouse::new("7", "Test Warehouse", "Moga")],
    };
    let feed = Arc::new(SimulatedFeed::with_seed(catalog, 99));
    let bus = Arc::new(UpdateBus::new());
    let broadcaster = Arc::new(UpdateBroadcaster::new(
        BroadcasterConfig::new(Duration::from_millis(10)),
        feed as Arc<dyn UpdateSource>,
        Arc::clone(&bus),
    ));

    let received = Arc::new(Mutex::new(Vec::<StorageUpdate>::new()));
    let sink = Arc::clone(&received);
    let connection = LiveConnection::new(Arc::clone(&broadcaster));
    connection.on_storage(move |update| sink.lock().push(update));
    connection.connect();

    tokio::time::sleep(Duration::from_millis(35)).await;
    connection.close();

    let received = received.lock();
    assert_eq!(received.len(), 3);
    for update in received.iter() {
        assert_eq!(update.warehouse_id, "7");
        assert!((1000..6000).contains(&update.available_capacity));
        assert!(matches!(
            update.status,
            StorageStatus::Available | StorageStatus::Limited
        ));
    }
}

#[tokio::test(start_paused = true)]
async fn direct_stop_does_not_wedge_connected_consumers() {
    let source = Arc::new(CountingSource::new());
    let bus = Arc::new(UpdateBus::new());
    let broadcaster = Arc::new(UpdateBroadcaster::new(
        BroadcasterConfig::new(Duration::from_millis(10)),
        Arc::clone(&source) as Arc<dyn UpdateSource>,
        Arc::clone(&bus),
    ));

    let dashboard = LiveConnection::new(Arc::clone(&broadcaster));
    dashboard.connect();
    tokio::time::sleep(Duration::from_millis(15)).await;
    broadcaster.stop();
    assert!(!broadcaster.is_running());

    let ticker = LiveConnection::new(Arc::clone(&broadcaster));
    ticker.connect();
    assert!(broadcaster.is_running(), "new connection restarts the timer");
    assert_eq!(broadcaster.connection_count(), 2);

    let before_revival = source.pull_count();
    tokio::time::sleep(Duration::from_millis(25)).await;
    assert!(
        source.pull_count() > before_revival,
        "ticks resume for both consumers"
    );
}

#[tokio::test(start_paused = true)]
async fn disconnecting_one_consumer_keeps_the_feed_alive_for_others() {
    let source = Arc::new(CountingSource::new());
    let bus = Arc::new(UpdateBus::new());
    let broadcaster = Arc::new(UpdateBroadcaster::new(
        BroadcasterConfig::new(Duration::from_millis(10)),
        Arc::clone(&source) as Arc<dyn UpdateSource>,
        Arc::clone(&bus),
    ));

    let dashboard = LiveConnection::new(Arc::clone(&broadcaster));
    let ticker = LiveConnection::new(Arc::clone(&broadcaster));
    dashboard.connect();
    ticker.connect();

    tokio::time::sleep(Duration::from_millis(15)).await;
    dashboard.disconnect();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(broadcaster.is_running(), "ticker is still connected");
    let pulls_while_shared = source.pull_count();
    assert!(pulls_while_shared >= 3);

    ticker.disconnect();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(source.pull_count(), pulls_while_shared);
    assert!(!broadcaster.is_running());
}
