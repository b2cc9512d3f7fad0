//! End-to-end tests for the telemetry procedures.
//!
//! Requests go through the real router, extractors, API layer, and facade
//! down to the in-memory store.

use integration_tests::{fixtures, setup::next_millisecond, setup::TestContext};
use serde_json::{json, Value};

#[tokio::test]
async fn test_record_event_then_read_back() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/telemetry/recordEvent")
        .json(&fixtures::record_event(
            "agent-001",
            "call_started",
            json!({"line": 4}),
        ))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Event recorded");
    assert_eq!(ctx.mock_store.count_prefixed("telemetry:agent-001:call_started:"), 1);

    let response = server
        .get("/telemetry/getAgentMetrics")
        .add_query_param("agentId", "agent-001")
        .add_query_param("eventType", "call_started")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["agentId"], "agent-001");
    assert_eq!(body["eventType"], "call_started");
    assert_eq!(body["count"], 1);
    let event = &body["metrics"][0];
    assert_eq!(event["agentId"], "agent-001");
    assert_eq!(event["metrics"]["line"], 4);
    assert!(event["timestamp"].is_i64());
    assert!(event["recordedAt"].is_string());
}

#[tokio::test]
async fn test_agent_metrics_scoped_to_agent_and_type() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    for (agent, event_type) in [
        ("agent-001", "call_started"),
        ("agent-001", "call_dropped"),
        ("agent-0010", "call_started"),
        ("agent-002", "call_started"),
    ] {
        server
            .post("/telemetry/recordEvent")
            .json(&fixtures::record_event(agent, event_type, json!({})))
            .await
            .assert_status_ok();
    }

    let body: Value = server
        .get("/telemetry/getAgentMetrics")
        .add_query_param("agentId", "agent-001")
        .add_query_param("eventType", "call_started")
        .await
        .json();

    assert_eq!(body["count"], 1);
    assert_eq!(body["metrics"][0]["agentId"], "agent-001");
}

#[tokio::test]
async fn test_agent_metrics_empty_for_unknown_agent() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let body: Value = server
        .get("/telemetry/getAgentMetrics")
        .add_query_param("agentId", "nobody")
        .add_query_param("eventType", "call_completed")
        .await
        .json();

    assert_eq!(body["count"], 0);
    assert_eq!(body["metrics"], json!([]));
}

#[tokio::test]
async fn test_record_event_keeps_metadata() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let mut body = fixtures::record_event("agent-007", "note", json!({"score": 1.5}));
    body["metadata"] = json!({"source": "dialer"});
    server
        .post("/telemetry/recordEvent")
        .json(&body)
        .await
        .assert_status_ok();

    let body: Value = server
        .get("/telemetry/getAgentMetrics")
        .add_query_param("agentId", "agent-007")
        .add_query_param("eventType", "note")
        .await
        .json();

    assert_eq!(body["metrics"][0]["metadata"]["source"], "dialer");
    assert_eq!(body["metrics"][0]["metrics"]["score"], 1.5);
}

#[tokio::test]
async fn test_record_call_updates_counters_conditionally() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let body: Value = server
        .post("/telemetry/recordCall")
        .json(&fixtures::record_call("agent-100", 120.0, true, false))
        .await
        .json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Call recorded");

    next_millisecond().await;
    server
        .post("/telemetry/recordCall")
        .json(&fixtures::record_call("agent-100", 45.0, false, false))
        .await
        .assert_status_ok();

    next_millisecond().await;
    server
        .post("/telemetry/recordCall")
        .json(&fixtures::record_call("agent-100", 300.0, true, true))
        .await
        .assert_status_ok();

    assert_eq!(ctx.mock_store.counter("calls:total:agent-100"), 3);
    assert_eq!(ctx.mock_store.counter("calls:successful:agent-100"), 2);
    assert_eq!(ctx.mock_store.counter("appointments:scheduled:agent-100"), 1);
    assert_eq!(
        ctx.mock_store.count_prefixed("telemetry:agent-100:call_completed:"),
        3
    );
}

#[tokio::test]
async fn test_unsuccessful_call_bumps_only_total() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let body: Value = server
        .post("/telemetry/recordCall")
        .json(&fixtures::record_call("agent-150", 30.0, false, false))
        .await
        .json();
    assert_eq!(body["success"], true);

    assert_eq!(ctx.mock_store.counter("calls:total:agent-150"), 1);
    assert_eq!(ctx.mock_store.counter("calls:successful:agent-150"), 0);
    assert_eq!(ctx.mock_store.counter("appointments:scheduled:agent-150"), 0);
    assert!(ctx.mock_store.raw("calls:successful:agent-150").is_none());
    assert!(ctx.mock_store.raw("appointments:scheduled:agent-150").is_none());
}

#[tokio::test]
async fn test_record_call_metadata_carries_customer_when_present() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .post("/telemetry/recordCall")
        .json(&fixtures::record_call("agent-200", 10.0, true, false))
        .await
        .assert_status_ok();
    next_millisecond().await;
    server
        .post("/telemetry/recordCall")
        .json(&fixtures::record_call_full("agent-201", 10.0, true, false, 0.5, "cust-9"))
        .await
        .assert_status_ok();

    let without: Value = server
        .get("/telemetry/getAgentMetrics")
        .add_query_param("agentId", "agent-200")
        .add_query_param("eventType", "call_completed")
        .await
        .json();
    let event = &without["metrics"][0];
    assert_eq!(event["metadata"], json!({}));
    assert_eq!(event["metrics"]["callQuality"], 0.0);

    let with: Value = server
        .get("/telemetry/getAgentMetrics")
        .add_query_param("agentId", "agent-201")
        .add_query_param("eventType", "call_completed")
        .await
        .json();
    assert_eq!(with["metrics"][0]["metadata"]["customerId"], "cust-9");
    assert_eq!(with["metrics"][0]["metrics"]["callQuality"], 0.5);
}

#[tokio::test]
async fn test_agent_performance_from_recorded_calls() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    for (duration, successful, appointment, quality) in [
        (120.0, true, true, 0.9),
        (60.0, true, false, 0.8),
        (30.0, false, false, 0.7),
    ] {
        server
            .post("/telemetry/recordCall")
            .json(&fixtures::record_call_full(
                "agent-300",
                duration,
                successful,
                appointment,
                quality,
                "cust-1",
            ))
            .await
            .assert_status_ok();
        next_millisecond().await;
    }

    let body: Value = server
        .get("/telemetry/getAgentPerformance")
        .add_query_param("agentId", "agent-300")
        .await
        .json();

    assert_eq!(body["agentId"], "agent-300");
    assert_eq!(body["totalCalls"], 3);
    assert_eq!(body["successfulCalls"], 2);
    assert_eq!(body["appointmentsScheduled"], 1);
    assert_eq!(body["avgDuration"], 70);
    assert_eq!(body["avgQuality"], 0.8);
    let success_rate = body["successRate"].as_f64().unwrap();
    assert!((success_rate - 200.0 / 3.0).abs() < 1e-9);
    let appointment_rate = body["appointmentRate"].as_f64().unwrap();
    assert!((appointment_rate - 100.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_agent_performance_zero_for_no_calls() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let body: Value = server
        .get("/telemetry/getAgentPerformance")
        .add_query_param("agentId", "agent-idle")
        .await
        .json();

    assert_eq!(body["totalCalls"], 0);
    assert_eq!(body["successRate"], 0.0);
    assert_eq!(body["appointmentRate"], 0.0);
    assert_eq!(body["avgDuration"], 0);
    assert_eq!(body["avgQuality"], 0.0);
}

#[tokio::test]
async fn test_fleet_metrics_groups_by_agent_and_type() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    ctx.mock_store.insert_raw("telemetry:A:x:1", "{}");
    ctx.mock_store.insert_raw("telemetry:A:x:2", "{}");
    ctx.mock_store.insert_raw("telemetry:B:y:3", "{}");

    let body: Value = server.get("/telemetry/getFleetMetrics").await.json();

    assert_eq!(body["totalAgents"], 2);
    assert_eq!(body["totalEvents"], 3);
    assert_eq!(body["agents"], json!({"A": {"x": 2}, "B": {"y": 1}}));
    assert!(body["timestamp"].is_string());

    let perf: Value = server.get("/telemetry/getFleetPerformance").await.json();
    assert_eq!(perf["totalAgents"], 2);
    assert_eq!(perf["totalEvents"], 3);
    assert_eq!(perf["agents"], body["agents"]);
}

#[tokio::test]
async fn test_fleet_metrics_ignores_counters() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    server
        .post("/telemetry/recordCall")
        .json(&fixtures::record_call("agent-400", 5.0, true, true))
        .await
        .assert_status_ok();

    let body: Value = server.get("/telemetry/getFleetMetrics").await.json();
    assert_eq!(body["totalAgents"], 1);
    assert_eq!(body["totalEvents"], 1);
    assert_eq!(body["agents"]["agent-400"]["call_completed"], 1);
}

#[tokio::test]
async fn test_increment_counter_accumulates() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let body: Value = server
        .post("/telemetry/incrementCounter")
        .json(&fixtures::increment("campaign:spring:dials", None))
        .await
        .json();
    assert_eq!(body["counterKey"], "campaign:spring:dials");
    assert_eq!(body["newValue"], 1);

    let body: Value = server
        .post("/telemetry/incrementCounter")
        .json(&fixtures::increment("campaign:spring:dials", Some(5)))
        .await
        .json();
    assert_eq!(body["newValue"], 6);

    let body: Value = server
        .post("/telemetry/incrementCounter")
        .json(&fixtures::increment("campaign:spring:dials", Some(-2)))
        .await
        .json();
    assert_eq!(body["newValue"], 4);
    assert_eq!(ctx.mock_store.counter("campaign:spring:dials"), 4);
}
