//! Mock AWS backend for testing — scripted fixtures plus throttle
//! injection and call recording, so tests can assert exact retry counts
//! without any network access.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::api::AwsApi;
use crate::error::{AwsResult, AwsToolError};
use crate::types::{
    AccountIdentity, AlarmSummary, BucketSummary, DashboardDetail, DashboardSummary,
    EndpointDetail, EndpointStatus, EndpointSummary, LogEvent, LogGroupSummary,
    TrainingJobDetail, TrainingJobStatus, TrainingJobSummary, VariantSummary,
};
use mlc_protocol::{ServiceCost, TimeWindow};

/// A mock AWS backend serving pre-loaded fixtures.
pub struct MockAwsApi {
    pub training_jobs: Vec<TrainingJobSummary>,
    pub job_details: HashMap<String, TrainingJobDetail>,
    pub endpoints: Vec<EndpointSummary>,
    pub endpoint_details: HashMap<String, EndpointDetail>,
    /// Invocation sums by endpoint name; missing = zero.
    pub invocations: HashMap<String, f64>,
    /// Bedrock metric sums by metric name.
    pub bedrock_metrics: HashMap<String, f64>,
    /// (service, amount_usd) pairs served by `cost_by_service`.
    pub service_costs: Vec<(String, f64)>,
    pub buckets: Vec<BucketSummary>,
    pub bucket_sizes: HashMap<String, f64>,
    /// Buckets that have a lifecycle configuration.
    pub lifecycle_buckets: HashSet<String>,
    pub dashboards: Vec<DashboardSummary>,
    pub dashboard_details: HashMap<String, DashboardDetail>,
    pub log_groups: Vec<LogGroupSummary>,
    pub log_events: HashMap<String, Vec<LogEvent>>,
    pub alarms: Vec<AlarmSummary>,
    /// Fail the next N backend calls with a throttling error.
    throttle_remaining: Mutex<u32>,
    /// Method names in invocation order (for test assertions).
    calls: Mutex<Vec<String>>,
}

impl MockAwsApi {
    pub fn new() -> Self {
        Self {
            training_jobs: Vec::new(),
            job_details: HashMap::new(),
            endpoints: Vec::new(),
            endpoint_details: HashMap::new(),
            invocations: HashMap::new(),
            bedrock_metrics: HashMap::new(),
            service_costs: Vec::new(),
            buckets: Vec::new(),
            bucket_sizes: HashMap::new(),
            lifecycle_buckets: HashSet::new(),
            dashboards: Vec::new(),
            dashboard_details: HashMap::new(),
            log_groups: Vec::new(),
            log_events: HashMap::new(),
            alarms: Vec::new(),
            throttle_remaining: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Arrange for the next `n` backend calls to fail with `Throttled`.
    pub fn throttle_next(&self, n: u32) {
        *self.throttle_remaining.lock().unwrap() = n;
    }

    /// All backend calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// How many times a given backend method was called.
    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == method)
            .count()
    }

    /// The standard ML cost fixture: 9 training jobs (1 Completed,
    /// 8 Failed) and 21 endpoints (4 InService, 17 Failed), with one
    /// busy endpoint, service costs, and an unmanaged ML bucket.
    pub fn with_ml_fixture() -> Self {
        let mut m = Self::new();
        let now = Utc::now();

        m.training_jobs.push(TrainingJobSummary {
            name: "xgb-churn-2024-01".into(),
            status: TrainingJobStatus::Completed,
            created_at: now - Duration::days(2),
            ended_at: Some(now - Duration::days(2) + Duration::hours(3)),
            instance_type: Some("ml.m5.xlarge".into()),
            instance_count: Some(1),
            failure_reason: None,
        });
        for i in 1..=8 {
            m.training_jobs.push(TrainingJobSummary {
                name: format!("llm-finetune-run-{i:02}"),
                status: TrainingJobStatus::Failed,
                created_at: now - Duration::days(i),
                ended_at: Some(now - Duration::days(i) + Duration::minutes(40)),
                instance_type: Some("ml.p3.2xlarge".into()),
                instance_count: Some(1),
                failure_reason: Some("AlgorithmError: CUDA out of memory".into()),
            });
        }

        for i in 1..=4 {
            m.endpoints.push(EndpointSummary {
                name: format!("serving-prod-{i:02}"),
                status: EndpointStatus::InService,
                created_at: now - Duration::days(30 + i),
            });
        }
        for i in 1..=17 {
            m.endpoints.push(EndpointSummary {
                name: format!("serving-canary-{i:02}"),
                status: EndpointStatus::Failed,
                created_at: now - Duration::days(i),
            });
        }
        // One in-service endpoint actually takes traffic; the rest idle.
        m.invocations.insert("serving-prod-01".into(), 12_500.0);

        m.job_details.insert(
            "xgb-churn-2024-01".into(),
            TrainingJobDetail {
                name: "xgb-churn-2024-01".into(),
                status: TrainingJobStatus::Completed,
                created_at: now - Duration::days(2),
                ended_at: Some(now - Duration::days(2) + Duration::hours(3)),
                instance_type: "ml.m5.xlarge".into(),
                instance_count: 1,
                volume_size_gb: 50,
                billable_seconds: Some(10_800),
                failure_reason: None,
                final_metrics: vec![crate::types::FinalMetric {
                    name: "validation:auc".into(),
                    value: 0.91,
                }],
            },
        );

        m.endpoint_details.insert(
            "serving-prod-01".into(),
            EndpointDetail {
                name: "serving-prod-01".into(),
                status: EndpointStatus::InService,
                created_at: now - Duration::days(31),
                config_name: "serving-prod-01-config".into(),
                variants: vec![VariantSummary {
                    name: "AllTraffic".into(),
                    instance_type: "ml.g5.xlarge".into(),
                    instance_count: 2,
                    model_name: "churn-model-v3".into(),
                }],
            },
        );

        m.bedrock_metrics.insert("Invocations".into(), 4_200.0);
        m.bedrock_metrics.insert("InputTokens".into(), 9_800_000.0);
        m.bedrock_metrics.insert("OutputTokens".into(), 2_100_000.0);

        m.service_costs = vec![
            ("Amazon SageMaker".into(), 1_843.27),
            ("Amazon Bedrock".into(), 412.905),
        ];

        m.buckets = vec![
            BucketSummary {
                name: "acme-sagemaker-training-data".into(),
                created_at: Some(now - Duration::days(400)),
            },
            BucketSummary {
                name: "acme-ml-models".into(),
                created_at: Some(now - Duration::days(200)),
            },
            BucketSummary {
                name: "acme-billing-exports".into(),
                created_at: Some(now - Duration::days(600)),
            },
        ];
        m.bucket_sizes
            .insert("acme-sagemaker-training-data".into(), 2.4e12);
        m.bucket_sizes.insert("acme-ml-models".into(), 3.1e11);
        m.lifecycle_buckets.insert("acme-ml-models".into());

        m.dashboards.push(DashboardSummary {
            name: "ml-serving-overview".into(),
            last_modified: Some(now - Duration::days(3)),
            size_bytes: Some(2_048),
        });
        m.dashboard_details.insert(
            "ml-serving-overview".into(),
            DashboardDetail {
                name: "ml-serving-overview".into(),
                widget_count: 6,
                widget_types: vec!["metric".into(), "text".into()],
            },
        );

        m.log_groups.push(LogGroupSummary {
            name: "/aws/sagemaker/TrainingJobs".into(),
            stored_bytes: Some(5_400_000_000),
            retention_days: None,
            created_at: Some(now - Duration::days(365)),
        });
        m.log_events.insert(
            "/aws/sagemaker/TrainingJobs".into(),
            vec![
                LogEvent {
                    timestamp: Some(now - Duration::hours(5)),
                    message: "AlgorithmError: CUDA out of memory".into(),
                    log_stream: Some("llm-finetune-run-08/algo-1".into()),
                },
                LogEvent {
                    timestamp: Some(now - Duration::hours(4)),
                    message: "Training job completed".into(),
                    log_stream: Some("xgb-churn-2024-01/algo-1".into()),
                },
            ],
        );

        m.alarms.push(AlarmSummary {
            name: "serving-prod-01-latency".into(),
            state: "OK".into(),
            metric_name: Some("ModelLatency".into()),
            namespace: Some("AWS/SageMaker".into()),
        });

        m
    }

    /// Record the call and consume one queued throttle, if any.
    fn gate(&self, method: &str) -> AwsResult<()> {
        self.calls.lock().unwrap().push(method.to_string());
        let mut remaining = self.throttle_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(AwsToolError::Throttled {
                message: format!("simulated throttle on {method}"),
            });
        }
        Ok(())
    }
}

impl Default for MockAwsApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AwsApi for MockAwsApi {
    async fn caller_identity(&self) -> AwsResult<AccountIdentity> {
        self.gate("caller_identity")?;
        Ok(AccountIdentity {
            account_id: "123456789012".into(),
            arn: "arn:aws:iam::123456789012:user/analyst".into(),
        })
    }

    async fn list_training_jobs(
        &self,
        window: TimeWindow,
        max_results: i32,
    ) -> AwsResult<Vec<TrainingJobSummary>> {
        self.gate("list_training_jobs")?;
        Ok(self
            .training_jobs
            .iter()
            .filter(|j| j.created_at >= window.start)
            .take(max_results.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn describe_training_job(&self, name: &str) -> AwsResult<TrainingJobDetail> {
        self.gate("describe_training_job")?;
        self.job_details
            .get(name)
            .cloned()
            .ok_or_else(|| AwsToolError::NotFound {
                resource: format!("training job '{name}'"),
            })
    }

    async fn list_endpoints(&self, max_results: i32) -> AwsResult<Vec<EndpointSummary>> {
        self.gate("list_endpoints")?;
        Ok(self
            .endpoints
            .iter()
            .take(max_results.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn describe_endpoint(&self, name: &str) -> AwsResult<EndpointDetail> {
        self.gate("describe_endpoint")?;
        self.endpoint_details
            .get(name)
            .cloned()
            .ok_or_else(|| AwsToolError::NotFound {
                resource: format!("endpoint '{name}'"),
            })
    }

    async fn endpoint_invocations(&self, name: &str, _window: TimeWindow) -> AwsResult<f64> {
        self.gate("endpoint_invocations")?;
        Ok(self.invocations.get(name).copied().unwrap_or(0.0))
    }

    async fn bedrock_metric_sum(&self, metric: &str, _window: TimeWindow) -> AwsResult<f64> {
        self.gate("bedrock_metric_sum")?;
        Ok(self.bedrock_metrics.get(metric).copied().unwrap_or(0.0))
    }

    async fn cost_by_service(
        &self,
        services: &[&str],
        window: TimeWindow,
    ) -> AwsResult<Vec<ServiceCost>> {
        self.gate("cost_by_service")?;
        Ok(self
            .service_costs
            .iter()
            .filter(|(name, _)| services.contains(&name.as_str()))
            .map(|(name, amount)| ServiceCost {
                service: name.clone(),
                amount_usd: *amount,
                window,
            })
            .collect())
    }

    async fn list_buckets(&self) -> AwsResult<Vec<BucketSummary>> {
        self.gate("list_buckets")?;
        Ok(self.buckets.clone())
    }

    async fn bucket_size_bytes(&self, name: &str) -> AwsResult<Option<f64>> {
        self.gate("bucket_size_bytes")?;
        Ok(self.bucket_sizes.get(name).copied())
    }

    async fn bucket_has_lifecycle(&self, name: &str) -> AwsResult<bool> {
        self.gate("bucket_has_lifecycle")?;
        Ok(self.lifecycle_buckets.contains(name))
    }

    async fn list_dashboards(&self) -> AwsResult<Vec<DashboardSummary>> {
        self.gate("list_dashboards")?;
        Ok(self.dashboards.clone())
    }

    async fn get_dashboard(&self, name: &str) -> AwsResult<DashboardDetail> {
        self.gate("get_dashboard")?;
        self.dashboard_details
            .get(name)
            .cloned()
            .ok_or_else(|| AwsToolError::NotFound {
                resource: format!("dashboard '{name}'"),
            })
    }

    async fn list_log_groups(
        &self,
        prefix: Option<&str>,
        limit: i32,
    ) -> AwsResult<Vec<LogGroupSummary>> {
        self.gate("list_log_groups")?;
        Ok(self
            .log_groups
            .iter()
            .filter(|g| prefix.is_none_or(|p| g.name.starts_with(p)))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn filter_log_events(
        &self,
        group: &str,
        pattern: Option<&str>,
        _window: TimeWindow,
        limit: i32,
    ) -> AwsResult<Vec<LogEvent>> {
        self.gate("filter_log_events")?;
        let events = self
            .log_events
            .get(group)
            .ok_or_else(|| AwsToolError::NotFound {
                resource: format!("log group '{group}'"),
            })?;
        Ok(events
            .iter()
            .filter(|e| pattern.is_none_or(|p| e.message.contains(p)))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn alarms_for_prefix(&self, prefix: Option<&str>) -> AwsResult<Vec<AlarmSummary>> {
        self.gate("alarms_for_prefix")?;
        Ok(self
            .alarms
            .iter()
            .filter(|a| prefix.is_none_or(|p| a.name.starts_with(p)))
            .cloned()
            .collect())
    }
}
