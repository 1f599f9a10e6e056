//! Pure cost aggregation — joins resource inventories with billing data.
//!
//! No I/O here: the `analyze_ml_costs` tool gathers the inventory through
//! `AwsApi` and hands it to `aggregate`, which keeps the flag logic
//! trivially testable.

use std::collections::HashMap;

use crate::types::{EndpointSummary, TrainingJobStatus, TrainingJobSummary};
use mlc_protocol::{CostFlag, CostSummary, ServiceCost, TimeWindow};

/// Resource inventory collected for one aggregation pass.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    pub training_jobs: Vec<TrainingJobSummary>,
    pub endpoints: Vec<EndpointSummary>,
    /// Invocation sums by endpoint name over the window; missing = zero.
    pub endpoint_invocations: HashMap<String, f64>,
    /// Surveyed buckets as (name, has_lifecycle).
    pub buckets: Vec<(String, bool)>,
}

/// Thresholds controlling which flags are raised.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Failure ratio above which `HighFailureRate` fires.
    pub failure_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { failure_ratio: 0.5 }
    }
}

/// Join the inventory with per-service costs and raise flags.
///
/// An empty inventory with no costs yields a zero-total summary with no
/// flags — never an error. Amounts are summed unrounded.
pub fn aggregate(
    window: TimeWindow,
    inventory: &Inventory,
    costs: &[ServiceCost],
    thresholds: &Thresholds,
) -> CostSummary {
    let total_usd = costs.iter().map(|c| c.amount_usd).sum();
    let mut flags = Vec::new();

    // Training-job failure ratio over the whole inventory.
    let total_jobs = inventory.training_jobs.len();
    if total_jobs > 0 {
        let failed = inventory
            .training_jobs
            .iter()
            .filter(|j| j.status == TrainingJobStatus::Failed)
            .count();
        let ratio = failed as f64 / total_jobs as f64;
        if ratio > thresholds.failure_ratio {
            flags.push(CostFlag::HighFailureRate {
                failed,
                total: total_jobs,
                ratio,
            });
        }
    }

    // In-service endpoints with zero recorded invocations bill for idle
    // instance hours.
    for endpoint in &inventory.endpoints {
        if !endpoint.status.is_in_service() {
            continue;
        }
        let invocations = inventory
            .endpoint_invocations
            .get(&endpoint.name)
            .copied()
            .unwrap_or(0.0);
        if invocations == 0.0 {
            flags.push(CostFlag::Idle {
                resource: format!("endpoint/{}", endpoint.name),
            });
        }
    }

    for (bucket, has_lifecycle) in &inventory.buckets {
        if !has_lifecycle {
            flags.push(CostFlag::UnmanagedStorage {
                bucket: bucket.clone(),
            });
        }
    }

    CostSummary {
        window,
        services: costs.to_vec(),
        total_usd,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAwsApi;
    use crate::types::EndpointStatus;

    fn window() -> TimeWindow {
        TimeWindow::last_days(30).unwrap()
    }

    #[test]
    fn empty_inventory_yields_zero_total_no_flags() {
        let summary = aggregate(
            window(),
            &Inventory::default(),
            &[],
            &Thresholds::default(),
        );
        assert_eq!(summary.total_usd, 0.0);
        assert!(summary.flags.is_empty());
        assert!(summary.services.is_empty());
    }

    #[test]
    fn fixture_raises_failure_rate_and_idle_flags() {
        // 9 jobs (8 failed) and 21 endpoints (4 InService, one busy).
        let api = MockAwsApi::with_ml_fixture();
        let inventory = Inventory {
            training_jobs: api.training_jobs.clone(),
            endpoints: api.endpoints.clone(),
            endpoint_invocations: api.invocations.clone(),
            buckets: Vec::new(),
        };
        let summary = aggregate(window(), &inventory, &[], &Thresholds::default());

        let failure = summary
            .flags
            .iter()
            .find_map(|f| match f {
                CostFlag::HighFailureRate { failed, total, ratio } => {
                    Some((*failed, *total, *ratio))
                }
                _ => None,
            })
            .expect("failure-rate flag");
        assert_eq!(failure.0, 8);
        assert_eq!(failure.1, 9);
        assert!((failure.2 - 8.0 / 9.0).abs() < 1e-9);

        let idle: Vec<_> = summary
            .flags
            .iter()
            .filter(|f| matches!(f, CostFlag::Idle { .. }))
            .collect();
        // 4 InService endpoints, serving-prod-01 takes traffic.
        assert_eq!(idle.len(), 3);
    }

    #[test]
    fn failure_ratio_at_threshold_does_not_fire() {
        let now = chrono::Utc::now();
        let job = |status| TrainingJobSummary {
            name: "job".into(),
            status,
            created_at: now,
            ended_at: None,
            instance_type: None,
            instance_count: None,
            failure_reason: None,
        };
        let inventory = Inventory {
            training_jobs: vec![
                job(TrainingJobStatus::Failed),
                job(TrainingJobStatus::Completed),
            ],
            ..Default::default()
        };
        // Exactly 0.5 is not "above" the default threshold.
        let summary = aggregate(window(), &inventory, &[], &Thresholds::default());
        assert!(
            !summary
                .flags
                .iter()
                .any(|f| matches!(f, CostFlag::HighFailureRate { .. }))
        );
    }

    #[test]
    fn non_in_service_endpoints_never_flag_idle() {
        let now = chrono::Utc::now();
        let inventory = Inventory {
            endpoints: vec![EndpointSummary {
                name: "broken".into(),
                status: EndpointStatus::Failed,
                created_at: now,
            }],
            ..Default::default()
        };
        let summary = aggregate(window(), &inventory, &[], &Thresholds::default());
        assert!(summary.flags.is_empty());
    }

    #[test]
    fn unmanaged_buckets_flagged() {
        let inventory = Inventory {
            buckets: vec![
                ("acme-ml-models".into(), true),
                ("acme-sagemaker-training-data".into(), false),
            ],
            ..Default::default()
        };
        let summary = aggregate(window(), &inventory, &[], &Thresholds::default());
        assert_eq!(summary.flags.len(), 1);
        assert!(matches!(
            &summary.flags[0],
            CostFlag::UnmanagedStorage { bucket } if bucket == "acme-sagemaker-training-data"
        ));
    }

    #[test]
    fn totals_sum_unrounded() {
        let w = window();
        let costs = vec![
            ServiceCost {
                service: "Amazon SageMaker".into(),
                amount_usd: 0.105,
                window: w,
            },
            ServiceCost {
                service: "Amazon Bedrock".into(),
                amount_usd: 0.205,
                window: w,
            },
        ];
        let summary = aggregate(w, &Inventory::default(), &costs, &Thresholds::default());
        assert!((summary.total_usd - 0.31).abs() < 1e-12);
    }
}
