//! Process-level observability for the fleet telemetry service:
//! structured logging, dependency health, and internal counters.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
