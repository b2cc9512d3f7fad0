//! Storage key layout in the remote store.
//!
//! Events: `telemetry:{agent_id}:{event_type}:{timestamp}`
//! Counters: free-form, with the call counters under `calls:` and `appointments:`.

/// Namespace prefix for event keys.
pub const EVENT_NAMESPACE: &str = "telemetry";

/// Segment separator.
pub const SEPARATOR: char = ':';

/// Glob matching every event key.
pub const FLEET_PATTERN: &str = "telemetry:*";

/// Key for a single event.
pub fn event_key(agent_id: &str, event_type: &str, timestamp: i64) -> String {
    format!("{EVENT_NAMESPACE}:{agent_id}:{event_type}:{timestamp}")
}

/// Glob matching every event of one type for one agent.
pub fn agent_event_pattern(agent_id: &str, event_type: &str) -> String {
    format!("{EVENT_NAMESPACE}:{agent_id}:{event_type}:*")
}

/// Extracts `(agent_id, event_type)` from an event key.
///
/// Keys with fewer than three segments yield `None`.
pub fn parse_event_key(key: &str) -> Option<(&str, &str)> {
    let mut parts = key.split(SEPARATOR);
    let _namespace = parts.next()?;
    let agent_id = parts.next()?;
    let event_type = parts.next()?;
    Some((agent_id, event_type))
}

pub fn total_calls_counter(agent_id: &str) -> String {
    format!("calls:total:{agent_id}")
}

pub fn successful_calls_counter(agent_id: &str) -> String {
    format!("calls:successful:{agent_id}")
}

pub fn appointments_scheduled_counter(agent_id: &str) -> String {
    format!("appointments:scheduled:{agent_id}")
}
