//! Telemetry API layer and its HTTP surface.

pub mod extractors;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;

pub use routes::router;
pub use service::TelemetryService;
pub use state::AppState;
