//! Call performance summaries computed over fetched `call_completed` events.

use serde::{Deserialize, Serialize};

use crate::events::{RecordedEvent, TelemetryEvent};

/// Metric names written by call recording.
pub mod call_metrics {
    pub const DURATION: &str = "duration";
    pub const SUCCESSFUL: &str = "successful";
    pub const APPOINTMENT_SCHEDULED: &str = "appointmentScheduled";
    pub const CALL_QUALITY: &str = "callQuality";
}

/// Per-agent call statistics. All rates and averages are 0 when there are no calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub agent_id: String,
    pub total_calls: usize,
    pub successful_calls: usize,
    /// Percentage, 0-100.
    pub success_rate: f64,
    pub appointments_scheduled: usize,
    /// Percentage, 0-100.
    pub appointment_rate: f64,
    /// Seconds, rounded to the nearest integer.
    pub avg_duration: i64,
    /// Rounded to two decimal places.
    pub avg_quality: f64,
}

impl AgentPerformance {
    /// Summary for an agent with no recorded calls.
    pub fn empty(agent_id: impl Into<String>) -> Self {
        Self::from_calls(agent_id, &[])
    }

    pub fn from_calls(agent_id: impl Into<String>, calls: &[RecordedEvent]) -> Self {
        let events: Vec<&TelemetryEvent> = calls.iter().map(|c| &c.event).collect();
        let total_calls = events.len();

        let successful_calls = events
            .iter()
            .filter(|e| e.metric_flag(call_metrics::SUCCESSFUL))
            .count();
        let appointments_scheduled = events
            .iter()
            .filter(|e| e.metric_flag(call_metrics::APPOINTMENT_SCHEDULED))
            .count();

        let duration_sum: f64 = events
            .iter()
            .map(|e| e.metric_f64(call_metrics::DURATION))
            .sum();
        let quality_sum: f64 = events
            .iter()
            .map(|e| e.metric_f64(call_metrics::CALL_QUALITY))
            .sum();

        Self {
            agent_id: agent_id.into(),
            total_calls,
            successful_calls,
            success_rate: percentage(successful_calls, total_calls),
            appointments_scheduled,
            appointment_rate: percentage(appointments_scheduled, total_calls),
            avg_duration: mean(duration_sum, total_calls).round() as i64,
            avg_quality: round_to_hundredths(mean(quality_sum, total_calls)),
        }
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
