//! Live Update Payloads
//!
//! Value types for the three live data domains the dashboard tracks:
//! mandi prices, weather, and warehouse storage. Updates are immutable
//! once produced; every subscriber receives its own owned copy.
//!
//! Monetary and percentage fields use `rust_decimal::Decimal` so that
//! price arithmetic and the 2-decimal `change_percent` invariant stay
//! exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Update Kind
// =============================================================================

/// Tag identifying one of the three update domains.
///
/// Replaces the string event names a generic event bus would use; only
/// these three kinds exist, enforced at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    /// Mandi price movement for a crop.
    Price,
    /// Weather observation for a location.
    Weather,
    /// Warehouse storage availability.
    Storage,
}

impl UpdateKind {
    /// Get all update kinds.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Price, Self::Weather, Self::Storage]
    }

    /// Get the kind name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Weather => "weather",
            Self::Storage => "storage",
        }
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Price Updates
// =============================================================================

/// A price movement for one crop at one mandi location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Crop name (e.g. "wheat").
    pub crop: String,
    /// Mandi location.
    pub location: String,
    /// Price before this update, in rupees per quintal.
    pub old_price: Decimal,
    /// Price after this update. Never below the 100-rupee floor.
    pub new_price: Decimal,
    /// Absolute change (`new_price - old_price`).
    pub change: Decimal,
    /// Relative change in percent, rounded to 2 decimal places.
    pub change_percent: Decimal,
    /// Traded volume in quintals.
    pub volume: u32,
}

impl PriceUpdate {
    /// Compute the relative change between two prices, in percent rounded
    /// to 2 decimal places. Returns zero when `old_price` is zero.
    #[must_use]
    pub fn percent_change(old_price: Decimal, new_price: Decimal) -> Decimal {
        ((new_price - old_price) * Decimal::from(100))
            .checked_div(old_price)
            .unwrap_or_default()
            .round_dp(2)
    }
}

// =============================================================================
// Weather Updates
// =============================================================================

/// A weather observation for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherUpdate {
    /// Observed location.
    pub location: String,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Rainfall in millimetres.
    pub rainfall: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// Short condition description (e.g. "Partly Cloudy").
    pub condition: String,
    /// Active weather alerts, in issue order. Usually empty.
    pub alerts: Vec<String>,
}

impl WeatherUpdate {
    /// Check whether this observation carries any alert.
    #[must_use]
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

// =============================================================================
// Storage Updates
// =============================================================================

/// Availability state of a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageStatus {
    /// Capacity freely available.
    Available,
    /// Capacity running low; alertable to UI consumers.
    Limited,
    /// No capacity left. Never produced by the simulated feed; real
    /// warehouse feeds may report it.
    Full,
}

impl StorageStatus {
    /// Get the status name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Limited => "limited",
            Self::Full => "full",
        }
    }

    /// Whether UI consumers should surface this status as an alert.
    #[must_use]
    pub const fn is_alertable(&self) -> bool {
        matches!(self, Self::Limited | Self::Full)
    }
}

impl std::fmt::Display for StorageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storage availability update for one warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageUpdate {
    /// Warehouse location.
    pub location: String,
    /// Stable warehouse identifier.
    pub warehouse_id: String,
    /// Available capacity in tons.
    pub available_capacity: u32,
    /// Storage cost per ton, in rupees.
    pub cost_per_ton: Decimal,
    /// Availability state.
    pub status: StorageStatus,
}

// =============================================================================
// Update Batch
// =============================================================================

/// One tick's worth of updates across all three domains.
///
/// Delivery order is fixed: all prices, then all weather, then all storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBatch {
    /// Price updates, in generation order.
    pub prices: Vec<PriceUpdate>,
    /// Weather updates, in generation order.
    pub weather: Vec<WeatherUpdate>,
    /// Storage updates, in generation order.
    pub storage: Vec<StorageUpdate>,
}

impl UpdateBatch {
    /// Check whether the batch carries no updates at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty() && self.weather.is_empty() && self.storage.is_empty()
    }

    /// Total number of updates across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len() + self.weather.len() + self.storage.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
