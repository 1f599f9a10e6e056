//! E2E: retry behavior under throttling, argument validation before the
//! network layer, and error-path outcomes.

mod helpers;

use helpers::{TestHarness, call};
use mlc_agent::config::Limits;
use mlc_agent::driver::DriverError;
use mlc_agent::providers::ModelError;
use mlc_aws_tools::RetryPolicy;
use mlc_protocol::ErrorKind;
use serde_json::json;

/// A throttled backend is retried exactly up to the policy bound, then
/// surfaces a degraded outcome — not a crash.
#[tokio::test(start_paused = true)]
async fn e2e_throttling_retried_to_bound_then_degraded() {
    let h = TestHarness::with_ml_fixture();
    let registry = h.registry();
    let mut backends = h.backends();
    backends.retry = RetryPolicy::new(3);

    h.aws.throttle_next(10); // more throttles than the bound allows
    let outcome = registry
        .execute("list_endpoints", json!({}), &backends)
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.error_kind, Some(ErrorKind::Throttled));
    assert_eq!(h.aws.call_count("list_endpoints"), 3);
}

/// Throttles that clear within the bound are invisible to the caller.
#[tokio::test(start_paused = true)]
async fn e2e_transient_throttling_recovers() {
    let h = TestHarness::with_ml_fixture();
    let registry = h.registry();

    h.aws.throttle_next(2);
    let outcome = registry
        .execute("list_endpoints", json!({}), &h.backends())
        .await;
    assert!(outcome.success);
    assert_eq!(h.aws.call_count("list_endpoints"), 3);
}

/// Malformed arguments are rejected synchronously; the mock backend
/// never sees a call.
#[tokio::test]
async fn e2e_malformed_arguments_never_reach_the_network() {
    let h = TestHarness::with_ml_fixture();
    let registry = h.registry();
    let backends = h.backends();

    let cases = [
        ("list_training_jobs", json!({"days": -7})),
        ("analyze_bedrock_usage", json!({"days": 0})),
        ("analyze_ml_costs", json!({"failure_threshold": -1.0})),
        ("get_training_job_details", json!({})),
        ("list_endpoints", json!({"max_results": 0})),
    ];
    for (tool, args) in cases {
        let outcome = registry.execute(tool, args, &backends).await;
        assert!(!outcome.success, "{tool} must reject");
        assert_eq!(
            outcome.error_kind,
            Some(ErrorKind::InvalidArgument),
            "{tool}"
        );
    }
    assert!(
        h.aws.calls().is_empty(),
        "no backend call for malformed args, got {:?}",
        h.aws.calls()
    );
}

/// Not-found resources come back as findings, not crashes, and the run
/// carries on to a final report.
#[tokio::test]
async fn e2e_not_found_is_a_finding() {
    let h = TestHarness::with_ml_fixture();
    h.model.push_tool_calls(vec![call(
        "c1",
        "get_endpoint_details",
        json!({"endpoint_name": "ghost-endpoint"}),
    )]);
    h.model
        .push_text("# Report\nNo such endpoint 'ghost-endpoint'.");

    let outcome = h.driver(Limits::default()).run("check ghost").await.unwrap();
    assert!(outcome.report.contains("ghost-endpoint"));
    assert_eq!(outcome.tool_calls, 1);
}

/// Model auth failure terminates the run with a model error.
#[tokio::test]
async fn e2e_model_auth_failure_is_fatal() {
    let h = TestHarness::with_ml_fixture();
    h.model.push_error(ModelError::Auth {
        message: "invalid model credentials".into(),
    });

    let err = h.driver(Limits::default()).run("q").await.unwrap_err();
    assert!(matches!(err, DriverError::Model(ModelError::Auth { .. })));
}

/// Driver timeout aborts the run but preserves partial workspace state.
#[tokio::test(start_paused = true)]
async fn e2e_timeout_preserves_partial_workspace() {
    let h = TestHarness::with_ml_fixture();
    h.model.push_tool_calls(vec![call(
        "c1",
        "write_file",
        json!({"path": "partial.md", "content": "work in progress"}),
    )]);
    // After the first turn the model only throttles; the retry backoff
    // sleeps long enough for the 1-second run bound to expire.
    for _ in 0..5 {
        h.model.push_error(ModelError::Throttled {
            message: "busy".into(),
        });
    }

    let limits = Limits {
        run_timeout_secs: 1,
        ..Limits::default()
    };
    let err = h.driver(limits).run("q").await.unwrap_err();
    assert!(matches!(err, DriverError::Timeout { secs: 1 }));
    assert!(
        h.workspace.path().join("partial.md").exists(),
        "partial workspace files must survive a timeout"
    );
}
