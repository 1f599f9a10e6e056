//! E2E: the cost-aggregation scenario from the ML fixture — 9 training
//! jobs (1 completed, 8 failed) and 21 endpoints (4 InService,
//! 17 Failed) — plus a full driver run over the same data.

mod helpers;

use helpers::{TestHarness, call};
use mlc_agent::config::Limits;
use mlc_protocol::CostFlag;
use serde_json::json;

/// The aggregation tool flags the 8/9 failure rate (≈0.889 > 0.5) and
/// every InService endpoint with zero invocations in the window.
#[tokio::test]
async fn e2e_aggregation_flags_failure_rate_and_idle_endpoints() {
    let h = TestHarness::with_ml_fixture();
    let registry = h.registry();

    let outcome = registry
        .execute("analyze_ml_costs", json!({"days": 30}), &h.backends())
        .await;
    assert!(outcome.success, "aggregation should succeed: {outcome:?}");
    let data = outcome.data.unwrap();

    let flags: Vec<CostFlag> = serde_json::from_value(data["flags"].clone()).unwrap();
    let failure = flags
        .iter()
        .find_map(|f| match f {
            CostFlag::HighFailureRate { failed, total, ratio } => Some((*failed, *total, *ratio)),
            _ => None,
        })
        .expect("failure-rate flag must fire");
    assert_eq!((failure.0, failure.1), (8, 9));
    assert!((failure.2 - 8.0 / 9.0).abs() < 1e-9);

    let idle: Vec<_> = flags
        .iter()
        .filter_map(|f| match f {
            CostFlag::Idle { resource } => Some(resource.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(idle.len(), 3, "3 of 4 InService endpoints take no traffic");
    assert!(idle.iter().all(|r| r.starts_with("endpoint/serving-prod-")));
    assert!(!idle.contains(&"endpoint/serving-prod-01"));
}

/// A full scripted run: inventory, workspace note-taking, search, then
/// the final report.
#[tokio::test]
async fn e2e_full_run_produces_report_and_workspace_state() {
    let h = TestHarness::with_ml_fixture();

    h.model.push_tool_calls(vec![
        call("c1", "analyze_ml_costs", json!({"days": 30})),
        call(
            "c2",
            "write_file",
            json!({"path": "todo.md", "content": "- [x] aggregate costs\n- [ ] report\n"}),
        ),
    ]);
    h.model.push_tool_calls(vec![
        call(
            "c3",
            "internet_search",
            json!({"query": "sagemaker savings plans pricing"}),
        ),
        call(
            "c4",
            "write_file",
            json!({"path": "analysis/flags.md", "content": "8/9 training jobs failed\n"}),
        ),
    ]);
    h.model
        .push_text("# Executive Summary\nTraining failures dominate spend.");

    let driver = h.driver(Limits::default());
    let outcome = driver.run("analyze my ML costs").await.unwrap();

    assert_eq!(outcome.turns, 3);
    assert_eq!(outcome.tool_calls, 4);
    assert!(outcome.report.contains("Executive Summary"));
    assert!(outcome.degraded_notes.is_empty());
    assert!(h.workspace.path().join("todo.md").exists());
    assert!(h.workspace.path().join("analysis/flags.md").exists());
    assert_eq!(h.search.queries(), ["sagemaker savings plans pricing"]);
    // The aggregation reached the mock backend.
    assert_eq!(h.aws.call_count("cost_by_service"), 1);
    assert_eq!(h.aws.call_count("list_training_jobs"), 1);
}
