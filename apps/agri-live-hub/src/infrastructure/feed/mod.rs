//! Simulated Update Feed
//!
//! Default [`UpdateSource`] used until a real market/weather/storage
//! provider is wired in. Each batch carries one price update per tracked
//! crop, one weather update per location, and one storage update per
//! warehouse, with randomized values in the same ranges the dashboard's
//! mock generator used.
//!
//! The feed is seedable for deterministic tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::application::ports::UpdateSource;
use crate::domain::updates::{
    PriceUpdate, StorageStatus, StorageUpdate, UpdateBatch, WeatherUpdate,
};

// =============================================================================
// Catalog
// =============================================================================

/// A tracked warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warehouse {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Location the warehouse serves.
    pub location: String,
}

impl Warehouse {
    /// Create a warehouse entry.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: location.into(),
        }
    }
}

/// The fixed enumeration of crops, locations, and warehouses a feed
/// covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCatalog {
    /// Tracked crops; one price update each per batch.
    pub crops: Vec<String>,
    /// Tracked mandi locations; one weather update each per batch.
    pub locations: Vec<String>,
    /// Tracked warehouses; one storage update each per batch.
    pub warehouses: Vec<Warehouse>,
}

impl Default for FeedCatalog {
    /// The Punjab mandi catalog the dashboard ships with.
    fn default() -> Self {
        Self {
            crops: ["wheat", "rice", "cotton", "sugarcane", "pulses"]
                .map(String::from)
                .to_vec(),
            locations: ["Amritsar", "Jalandhar", "Ludhiana", "Patiala", "Bathinda"]
                .map(String::from)
                .to_vec(),
            warehouses: vec![
                Warehouse::new("1", "Central Warehouse", "Amritsar"),
                Warehouse::new("2", "FCI Storage", "Jalandhar"),
                Warehouse::new("3", "Cold Storage", "Ludhiana"),
            ],
        }
    }
}

// =============================================================================
// Generation Constants
// =============================================================================

/// Baseline price range in rupees, before the random walk.
const PRICE_BASELINE: std::ops::Range<f64> = 1500.0..2500.0;
/// Signed price walk per tick, in rupees.
const PRICE_WALK: std::ops::Range<f64> = -50.0..50.0;
/// Prices never drop below this floor.
const PRICE_FLOOR: i64 = 100;
/// Traded volume range in quintals.
const VOLUME_RANGE: std::ops::Range<u32> = 100..1100;

/// Probability that a location has rainfall this tick.
const RAINFALL_PROBABILITY: f64 = 0.3;
/// Probability of a high-temperature alert.
const ALERT_PROBABILITY: f64 = 0.2;
/// Weather conditions the simulated feed cycles through.
const CONDITIONS: [&str; 4] = ["Sunny", "Partly Cloudy", "Cloudy", "Light Rain"];

/// Probability that a warehouse reports limited capacity.
const LIMITED_PROBABILITY: f64 = 0.3;
/// Available capacity range in tons.
const CAPACITY_RANGE: std::ops::Range<u32> = 1000..6000;
/// Storage cost range in paise per ton (two-decimal rupees).
const COST_PAISE_RANGE: std::ops::Range<i64> = 10_000..20_000;

// =============================================================================
// Simulated Feed
// =============================================================================

/// Randomized update feed over a fixed catalog.
pub struct SimulatedFeed {
    catalog: FeedCatalog,
    rng: Mutex<StdRng>,
}

impl SimulatedFeed {
    /// Create a feed with OS-seeded randomness.
    #[must_use]
    pub fn new(catalog: FeedCatalog) -> Self {
        Self {
            catalog,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Create a deterministic feed for tests and replayable demos.
    #[must_use]
    pub fn with_seed(catalog: FeedCatalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// The catalog this feed generates over.
    #[must_use]
    pub fn catalog(&self) -> &FeedCatalog {
        &self.catalog
    }

    /// Generate one batch across the whole catalog.
    #[must_use]
    pub fn generate(&self) -> UpdateBatch {
        let mut rng = self.rng.lock();

        let prices = self
            .catalog
            .crops
            .iter()
            .map(|crop| {
                let location = self
                    .catalog
                    .locations
                    .choose(&mut *rng)
                    .cloned()
                    .unwrap_or_default();
                make_price_update(
                    crop.clone(),
                    location,
                    rng.random_range(PRICE_BASELINE),
                    rng.random_range(PRICE_WALK),
                    rng.random_range(VOLUME_RANGE),
                )
            })
            .collect();

        let weather = self
            .catalog
            .locations
            .iter()
            .map(|location| {
                let rainfall = if rng.random_bool(RAINFALL_PROBABILITY) {
                    rng.random_range(0.0..20.0)
                } else {
                    0.0
                };
                let alerts = if rng.random_bool(ALERT_PROBABILITY) {
                    vec!["High temperature alert".to_string()]
                } else {
                    vec![]
                };
                WeatherUpdate {
                    location: location.clone(),
                    temperature: rng.random_range(10.0..30.0),
                    humidity: rng.random_range(50.0..80.0),
                    rainfall,
                    wind_speed: rng.random_range(5.0..20.0),
                    condition: CONDITIONS
                        .choose(&mut *rng)
                        .copied()
                        .unwrap_or("Sunny")
                        .to_string(),
                    alerts,
                }
            })
            .collect();

        let storage = self
            .catalog
            .warehouses
            .iter()
            .map(|warehouse| StorageUpdate {
                location: warehouse.location.clone(),
                warehouse_id: warehouse.id.clone(),
                available_capacity: rng.random_range(CAPACITY_RANGE),
                cost_per_ton: Decimal::new(rng.random_range(COST_PAISE_RANGE), 2),
                // The simulated feed only ever reports available/limited;
                // real warehouse feeds may also report full.
                status: if rng.random_bool(LIMITED_PROBABILITY) {
                    StorageStatus::Limited
                } else {
                    StorageStatus::Available
                },
            })
            .collect();

        UpdateBatch {
            prices,
            weather,
            storage,
        }
    }
}

#[async_trait]
impl UpdateSource for SimulatedFeed {
    async fn next_batch(&self) -> UpdateBatch {
        self.generate()
    }
}

impl std::fmt::Debug for SimulatedFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedFeed")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

/// Build a price update from raw walk values.
///
/// Prices are rounded to whole rupees, the new price is clamped to the
/// floor, and `change`/`change_percent` are derived from the stored
/// (rounded, clamped) prices so the published fields stay consistent with
/// each other.
fn make_price_update(
    crop: String,
    location: String,
    baseline: f64,
    walk: f64,
    volume: u32,
) -> PriceUpdate {
    #[allow(clippy::cast_possible_truncation)]
    let old_price = baseline.round() as i64;
    #[allow(clippy::cast_possible_truncation)]
    let walked = old_price + walk.round() as i64;
    let new_price = walked.max(PRICE_FLOOR);

    let old = Decimal::from(old_price);
    let new = Decimal::from(new_price);

    PriceUpdate {
        crop,
        location,
        old_price: old,
        new_price: new,
        change: new - old,
        change_percent: PriceUpdate::percent_change(old, new),
        volume,
    }
}

// =============================================================================
// Tests
// =============================================================================
