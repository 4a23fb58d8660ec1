//! Application Layer - Services and port definitions.
//!
//! This layer contains the two coordination services and the port
//! interfaces they use to talk to external systems.

/// Port interfaces for update feeds and speech engines.
pub mod ports;

/// Update broadcaster and speech arbiter services.
pub mod services;
