//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port
//! interfaces defined in the application layer, plus configuration and
//! logging setup.

/// Typed subscriber registry and fan-out delivery.
pub mod broadcast;

/// Simulated mandi/weather/storage feed.
pub mod feed;

/// Configuration loading from the environment.
pub mod config;

/// Structured logging setup.
pub mod telemetry;
