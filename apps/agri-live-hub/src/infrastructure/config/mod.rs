//! Configuration Module
//!
//! Configuration loading for the live hub service.

mod settings;

pub use settings::{ConfigError, HubConfig};
