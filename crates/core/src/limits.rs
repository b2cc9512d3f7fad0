//! Size limits for telemetry requests.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so the customer id length is duplicated there. Keep both in sync when modifying.

/// Maximum request body size in bytes (64KB).
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Maximum serialized size of an event's `metrics` or `metadata` object (16KB).
pub const MAX_EVENT_FIELDS_BYTES: usize = 16 * 1024;

/// Maximum length of an agent id or event type (chars).
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Maximum length of a counter key (chars).
pub const MAX_COUNTER_KEY_LEN: usize = 256;

/// Maximum length of a customer id attached to a call (chars).
pub const MAX_CUSTOMER_ID_LEN: usize = 256;

/// Characters that may not appear in an identifier segment of a storage key.
///
/// `:` separates key segments; the rest would widen a `KEYS` glob.
pub const FORBIDDEN_IDENTIFIER_PATTERN: &str = r"[:*?\[\]\\\s]";

/// Characters that may not appear in a counter key.
pub const FORBIDDEN_COUNTER_KEY_PATTERN: &str = r"[*?\[\]\\\s]";
