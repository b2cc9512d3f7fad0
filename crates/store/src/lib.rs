//! Remote key-value store access for fleet telemetry.

pub mod config;
pub mod facade;
pub mod health;
pub mod kv;
pub mod rest;

pub use config::*;
pub use facade::TelemetryStore;
pub use kv::KeyValueStore;
pub use rest::RestStore;
