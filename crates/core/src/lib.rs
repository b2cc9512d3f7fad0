//! Core types, key layout, and validation for agent fleet telemetry.

pub mod error;
pub mod events;
pub mod keys;
pub mod limits;
pub mod performance;
pub mod requests;

pub use error::{Error, Result, StoreErrorCode, ValidationErrorCode};
pub use events::*;
pub use performance::AgentPerformance;
pub use requests::*;
pub use validator::Validate;
