//! Agri Live Hub Binary
//!
//! Starts the live update broadcaster over the simulated feed and logs
//! every update until interrupted. UI hosts embed the library directly;
//! this binary exists for headless runs and smoke testing.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p agri-live-hub
//! ```
//!
//! # Environment Variables
//!
//! - `LIVE_UPDATE_INTERVAL_SECS`: Seconds between update ticks (default: 30)
//! - `SPEECH_LANGUAGE`: Recognition language - "en" | "hi" | "pa" (default: en)
//! - `FEED_SEED`: Seed for a deterministic simulated feed (default: unset)
//! - `RUST_LOG`: Log filter (default: agri_live_hub=info)

use std::sync::Arc;

use agri_live_hub::infrastructure::telemetry;
use agri_live_hub::{
    BroadcasterConfig, FeedCatalog, HubConfig, LiveConnection, SimulatedFeed, UpdateBroadcaster,
    UpdateBus, UpdateSource,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    tracing::info!("Starting Agri Live Hub");

    let config = HubConfig::from_env()?;
    log_config(&config);

    let catalog = FeedCatalog::default();
    let feed: Arc<dyn UpdateSource> = match config.feed_seed {
        Some(seed) => Arc::new(SimulatedFeed::with_seed(catalog, seed)),
        None => Arc::new(SimulatedFeed::new(catalog)),
    };

    let bus = Arc::new(UpdateBus::new());
    let broadcaster = Arc::new(UpdateBroadcaster::new(
        BroadcasterConfig::new(config.tick_interval),
        feed,
        Arc::clone(&bus),
    ));

    let connection = LiveConnection::new(Arc::clone(&broadcaster));
    connection.on_price(|update| {
        tracing::info!(
            crop = %update.crop,
            location = %update.location,
            new_price = %update.new_price,
            change_percent = %update.change_percent,
            volume = update.volume,
            "price update"
        );
    });
    connection.on_weather(|update| {
        tracing::info!(
            location = %update.location,
            temperature = update.temperature,
            condition = %update.condition,
            alerts = update.alerts.len(),
            "weather update"
        );
    });
    connection.on_storage(|update| {
        tracing::info!(
            warehouse_id = %update.warehouse_id,
            location = %update.location,
            available_capacity = update.available_capacity,
            status = %update.status,
            "storage update"
        );
    });
    connection.connect();

    tracing::info!("Live hub ready");

    signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    connection.close();
    tracing::info!("Live hub stopped");
    Ok(())
}

/// Log the effective configuration at startup.
fn log_config(config: &HubConfig) {
    tracing::info!(
        interval_secs = config.tick_interval.as_secs(),
        language = config.language.locale(),
        seeded = config.feed_seed.is_some(),
        "configuration loaded"
    );
}
