//! Real AWS backend — thin, typed wrappers over the service SDKs.
//!
//! Clients are constructed once from a shared `SdkConfig` and are safe
//! for concurrent reuse. Every SDK failure is classified into an
//! `AwsToolError` here; raw transport wording never crosses this
//! boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use aws_sdk_sagemaker::error::{ProvideErrorMetadata, SdkError};
use aws_smithy_types::error::display::DisplayErrorContext;

use crate::api::AwsApi;
use crate::error::{AwsResult, AwsToolError};
use crate::types::{
    AccountIdentity, AlarmSummary, BucketSummary, DashboardDetail, DashboardSummary,
    EndpointDetail, EndpointStatus, EndpointSummary, FinalMetric, LogEvent, LogGroupSummary,
    TrainingJobDetail, TrainingJobStatus, TrainingJobSummary, VariantSummary,
};
use mlc_protocol::{ServiceCost, TimeWindow};

/// AWS backend holding one client per consumed service.
pub struct SdkAwsApi {
    sagemaker: aws_sdk_sagemaker::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
    logs: aws_sdk_cloudwatchlogs::Client,
    cost_explorer: aws_sdk_costexplorer::Client,
    s3: aws_sdk_s3::Client,
    sts: aws_sdk_sts::Client,
}

impl SdkAwsApi {
    /// Build all service clients from one resolved AWS configuration.
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            sagemaker: aws_sdk_sagemaker::Client::new(config),
            cloudwatch: aws_sdk_cloudwatch::Client::new(config),
            logs: aws_sdk_cloudwatchlogs::Client::new(config),
            cost_explorer: aws_sdk_costexplorer::Client::new(config),
            s3: aws_sdk_s3::Client::new(config),
            sts: aws_sdk_sts::Client::new(config),
        }
    }

    /// Sum of one CloudWatch metric over the window at daily resolution.
    async fn metric_sum(
        &self,
        namespace: &str,
        metric: &str,
        dimensions: Vec<aws_sdk_cloudwatch::types::Dimension>,
        window: TimeWindow,
    ) -> AwsResult<f64> {
        let mut req = self
            .cloudwatch
            .get_metric_statistics()
            .namespace(namespace)
            .metric_name(metric)
            .start_time(to_smithy(window.start))
            .end_time(to_smithy(window.end))
            .period(86_400)
            .statistics(aws_sdk_cloudwatch::types::Statistic::Sum);
        for d in dimensions {
            req = req.dimensions(d);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| classify("cloudwatch GetMetricStatistics", e))?;
        Ok(resp
            .datapoints()
            .iter()
            .filter_map(|p| p.sum())
            .sum())
    }
}

#[async_trait]
impl AwsApi for SdkAwsApi {
    async fn caller_identity(&self) -> AwsResult<AccountIdentity> {
        let resp = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| classify("sts GetCallerIdentity", e))?;
        Ok(AccountIdentity {
            account_id: resp.account().unwrap_or_default().to_string(),
            arn: resp.arn().unwrap_or_default().to_string(),
        })
    }

    async fn list_training_jobs(
        &self,
        window: TimeWindow,
        max_results: i32,
    ) -> AwsResult<Vec<TrainingJobSummary>> {
        let resp = self
            .sagemaker
            .list_training_jobs()
            .creation_time_after(to_smithy(window.start))
            .max_results(max_results)
            .sort_by(aws_sdk_sagemaker::types::SortBy::CreationTime)
            .sort_order(aws_sdk_sagemaker::types::SortOrder::Descending)
            .send()
            .await
            .map_err(|e| classify("sagemaker ListTrainingJobs", e))?;

        let jobs = resp
            .training_job_summaries()
            .iter()
            .filter_map(|j| {
                let created_at = from_smithy(j.creation_time()?)?;
                Some(TrainingJobSummary {
                    name: j.training_job_name().unwrap_or_default().to_string(),
                    status: j
                        .training_job_status()
                        .map(|s| TrainingJobStatus::from_aws(s.as_str()))
                        .unwrap_or(TrainingJobStatus::Unknown),
                    created_at,
                    ended_at: j.training_end_time().and_then(from_smithy),
                    instance_type: None,
                    instance_count: None,
                    failure_reason: None,
                })
            })
            .collect();
        Ok(jobs)
    }

    async fn describe_training_job(&self, name: &str) -> AwsResult<TrainingJobDetail> {
        let job = self
            .sagemaker
            .describe_training_job()
            .training_job_name(name)
            .send()
            .await
            .map_err(|e| classify("sagemaker DescribeTrainingJob", e))?;

        let resource = job.resource_config();
        Ok(TrainingJobDetail {
            name: job.training_job_name().unwrap_or(name).to_string(),
            status: job
                .training_job_status()
                .map(|s| TrainingJobStatus::from_aws(s.as_str()))
                .unwrap_or(TrainingJobStatus::Unknown),
            created_at: job
                .creation_time()
                .and_then(from_smithy)
                .unwrap_or_else(Utc::now),
            ended_at: job.training_end_time().and_then(from_smithy),
            instance_type: resource
                .and_then(|r| r.instance_type())
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            instance_count: resource.and_then(|r| r.instance_count()).unwrap_or(1),
            volume_size_gb: resource.map(|r| r.volume_size_in_gb()).unwrap_or(0),
            billable_seconds: job.billable_time_in_seconds().map(i64::from),
            failure_reason: job.failure_reason().map(str::to_string),
            final_metrics: job
                .final_metric_data_list()
                .iter()
                .filter_map(|m| {
                    Some(FinalMetric {
                        name: m.metric_name()?.to_string(),
                        value: f64::from(m.value()),
                    })
                })
                .collect(),
        })
    }

    async fn list_endpoints(&self, max_results: i32) -> AwsResult<Vec<EndpointSummary>> {
        let resp = self
            .sagemaker
            .list_endpoints()
            .max_results(max_results)
            .sort_by(aws_sdk_sagemaker::types::EndpointSortKey::CreationTime)
            .sort_order(aws_sdk_sagemaker::types::OrderKey::Descending)
            .send()
            .await
            .map_err(|e| classify("sagemaker ListEndpoints", e))?;

        let endpoints = resp
            .endpoints()
            .iter()
            .filter_map(|e| {
                let created_at = from_smithy(e.creation_time()?)?;
                Some(EndpointSummary {
                    name: e.endpoint_name().unwrap_or_default().to_string(),
                    status: e
                        .endpoint_status()
                        .map(|s| EndpointStatus::from_aws(s.as_str()))
                        .unwrap_or(EndpointStatus::Unknown),
                    created_at,
                })
            })
            .collect();
        Ok(endpoints)
    }

    async fn describe_endpoint(&self, name: &str) -> AwsResult<EndpointDetail> {
        let endpoint = self
            .sagemaker
            .describe_endpoint()
            .endpoint_name(name)
            .send()
            .await
            .map_err(|e| classify("sagemaker DescribeEndpoint", e))?;

        let config_name = endpoint
            .endpoint_config_name()
            .unwrap_or_default()
            .to_string();
        let config = self
            .sagemaker
            .describe_endpoint_config()
            .endpoint_config_name(&config_name)
            .send()
            .await
            .map_err(|e| classify("sagemaker DescribeEndpointConfig", e))?;

        Ok(EndpointDetail {
            name: endpoint.endpoint_name().unwrap_or(name).to_string(),
            status: endpoint
                .endpoint_status()
                .map(|s| EndpointStatus::from_aws(s.as_str()))
                .unwrap_or(EndpointStatus::Unknown),
            created_at: endpoint
                .creation_time()
                .and_then(from_smithy)
                .unwrap_or_else(Utc::now),
            config_name,
            variants: config
                .production_variants()
                .iter()
                .map(|v| VariantSummary {
                    name: v.variant_name().unwrap_or_default().to_string(),
                    instance_type: v
                        .instance_type()
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_default(),
                    instance_count: v.initial_instance_count().unwrap_or(0),
                    model_name: v.model_name().unwrap_or_default().to_string(),
                })
                .collect(),
        })
    }

    async fn endpoint_invocations(&self, name: &str, window: TimeWindow) -> AwsResult<f64> {
        let dims = vec![
            aws_sdk_cloudwatch::types::Dimension::builder()
                .name("EndpointName")
                .value(name)
                .build(),
            aws_sdk_cloudwatch::types::Dimension::builder()
                .name("VariantName")
                .value("AllTraffic")
                .build(),
        ];
        self.metric_sum("AWS/SageMaker", "Invocations", dims, window)
            .await
    }

    async fn bedrock_metric_sum(&self, metric: &str, window: TimeWindow) -> AwsResult<f64> {
        self.metric_sum("AWS/Bedrock", metric, Vec::new(), window)
            .await
    }

    async fn cost_by_service(
        &self,
        services: &[&str],
        window: TimeWindow,
    ) -> AwsResult<Vec<ServiceCost>> {
        let interval = aws_sdk_costexplorer::types::DateInterval::builder()
            .start(window.start.format("%Y-%m-%d").to_string())
            .end(window.end.format("%Y-%m-%d").to_string())
            .build()
            .map_err(|e| AwsToolError::invalid(format!("cost window: {e}")))?;

        let mut costs = Vec::new();
        for service in services {
            let filter = aws_sdk_costexplorer::types::Expression::builder()
                .dimensions(
                    aws_sdk_costexplorer::types::DimensionValues::builder()
                        .key(aws_sdk_costexplorer::types::Dimension::Service)
                        .values(*service)
                        .build(),
                )
                .build();

            let resp = self
                .cost_explorer
                .get_cost_and_usage()
                .time_period(interval.clone())
                .granularity(aws_sdk_costexplorer::types::Granularity::Monthly)
                .metrics("UnblendedCost")
                .filter(filter)
                .send()
                .await;

            let resp = match resp {
                Ok(r) => r,
                Err(e) => {
                    let err = classify("ce GetCostAndUsage", e);
                    // Throttling must surface so the retry layer can act;
                    // auth failures are fatal. A service with no cost data
                    // is just skipped.
                    match err {
                        AwsToolError::Throttled { .. } | AwsToolError::AccessDenied { .. } => {
                            return Err(err);
                        }
                        other => {
                            tracing::warn!(service = %service, error = %other, "cost lookup skipped");
                            continue;
                        }
                    }
                }
            };

            let mut amount = 0.0;
            for period in resp.results_by_time() {
                if let Some(total) = period.total()
                    && let Some(metric) = total.get("UnblendedCost")
                    && let Some(raw) = metric.amount()
                    && let Ok(value) = raw.parse::<f64>()
                {
                    amount += value;
                }
            }
            if amount > 0.0 {
                costs.push(ServiceCost {
                    service: service.to_string(),
                    amount_usd: amount,
                    window,
                });
            }
        }
        Ok(costs)
    }

    async fn list_buckets(&self) -> AwsResult<Vec<BucketSummary>> {
        let resp = self
            .s3
            .list_buckets()
            .send()
            .await
            .map_err(|e| classify("s3 ListBuckets", e))?;
        Ok(resp
            .buckets()
            .iter()
            .map(|b| BucketSummary {
                name: b.name().unwrap_or_default().to_string(),
                created_at: b.creation_date().and_then(from_smithy),
            })
            .collect())
    }

    async fn bucket_size_bytes(&self, name: &str) -> AwsResult<Option<f64>> {
        let window = TimeWindow::last_days(1)
            .map_err(|e| AwsToolError::invalid(e.to_string()))?;
        let resp = self
            .cloudwatch
            .get_metric_statistics()
            .namespace("AWS/S3")
            .metric_name("BucketSizeBytes")
            .dimensions(
                aws_sdk_cloudwatch::types::Dimension::builder()
                    .name("BucketName")
                    .value(name)
                    .build(),
            )
            .dimensions(
                aws_sdk_cloudwatch::types::Dimension::builder()
                    .name("StorageType")
                    .value("StandardStorage")
                    .build(),
            )
            .start_time(to_smithy(window.start))
            .end_time(to_smithy(window.end))
            .period(86_400)
            .statistics(aws_sdk_cloudwatch::types::Statistic::Average)
            .send()
            .await
            .map_err(|e| classify("cloudwatch GetMetricStatistics", e))?;
        Ok(resp.datapoints().first().and_then(|p| p.average()))
    }

    async fn bucket_has_lifecycle(&self, name: &str) -> AwsResult<bool> {
        match self
            .s3
            .get_bucket_lifecycle_configuration()
            .bucket(name)
            .send()
            .await
        {
            Ok(resp) => Ok(!resp.rules().is_empty()),
            Err(err) => {
                if err.code() == Some("NoSuchLifecycleConfiguration") {
                    Ok(false)
                } else {
                    Err(classify("s3 GetBucketLifecycleConfiguration", err))
                }
            }
        }
    }

    async fn list_dashboards(&self) -> AwsResult<Vec<DashboardSummary>> {
        let resp = self
            .cloudwatch
            .list_dashboards()
            .send()
            .await
            .map_err(|e| classify("cloudwatch ListDashboards", e))?;
        Ok(resp
            .dashboard_entries()
            .iter()
            .map(|d| DashboardSummary {
                name: d.dashboard_name().unwrap_or_default().to_string(),
                last_modified: d.last_modified().and_then(from_smithy),
                size_bytes: d.size(),
            })
            .collect())
    }

    async fn get_dashboard(&self, name: &str) -> AwsResult<DashboardDetail> {
        let resp = self
            .cloudwatch
            .get_dashboard()
            .dashboard_name(name)
            .send()
            .await
            .map_err(|e| classify("cloudwatch GetDashboard", e))?;
        let body = resp.dashboard_body().unwrap_or("{}");
        Ok(parse_dashboard_body(name, body))
    }

    async fn list_log_groups(
        &self,
        prefix: Option<&str>,
        limit: i32,
    ) -> AwsResult<Vec<LogGroupSummary>> {
        let mut req = self.logs.describe_log_groups().limit(limit);
        if let Some(p) = prefix {
            req = req.log_group_name_prefix(p);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| classify("logs DescribeLogGroups", e))?;
        Ok(resp
            .log_groups()
            .iter()
            .map(|g| LogGroupSummary {
                name: g.log_group_name().unwrap_or_default().to_string(),
                stored_bytes: g.stored_bytes(),
                retention_days: g.retention_in_days(),
                created_at: g.creation_time().and_then(DateTime::from_timestamp_millis),
            })
            .collect())
    }

    async fn filter_log_events(
        &self,
        group: &str,
        pattern: Option<&str>,
        window: TimeWindow,
        limit: i32,
    ) -> AwsResult<Vec<LogEvent>> {
        let mut req = self
            .logs
            .filter_log_events()
            .log_group_name(group)
            .start_time(window.start.timestamp_millis())
            .end_time(window.end.timestamp_millis())
            .limit(limit);
        if let Some(p) = pattern {
            req = req.filter_pattern(p);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| classify("logs FilterLogEvents", e))?;
        Ok(resp
            .events()
            .iter()
            .map(|e| LogEvent {
                timestamp: e.timestamp().and_then(DateTime::from_timestamp_millis),
                message: e.message().unwrap_or_default().to_string(),
                log_stream: e.log_stream_name().map(str::to_string),
            })
            .collect())
    }

    async fn alarms_for_prefix(&self, prefix: Option<&str>) -> AwsResult<Vec<AlarmSummary>> {
        let mut req = self.cloudwatch.describe_alarms();
        if let Some(p) = prefix {
            req = req.alarm_name_prefix(p);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| classify("cloudwatch DescribeAlarms", e))?;
        Ok(resp
            .metric_alarms()
            .iter()
            .map(|a| AlarmSummary {
                name: a.alarm_name().unwrap_or_default().to_string(),
                state: a
                    .state_value()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                metric_name: a.metric_name().map(str::to_string),
                namespace: a.namespace().map(str::to_string),
            })
            .collect())
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn to_smithy(dt: DateTime<Utc>) -> aws_smithy_types::DateTime {
    aws_smithy_types::DateTime::from_millis(dt.timestamp_millis())
}

fn from_smithy(dt: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(dt.to_millis().ok()?)
}

/// Parse a dashboard body into widget counts.
fn parse_dashboard_body(name: &str, body: &str) -> DashboardDetail {
    let parsed: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
    let widgets = parsed["widgets"].as_array().cloned().unwrap_or_default();
    let mut widget_types: Vec<String> = widgets
        .iter()
        .filter_map(|w| w["type"].as_str().map(str::to_string))
        .collect();
    widget_types.sort();
    widget_types.dedup();
    DashboardDetail {
        name: name.to_string(),
        widget_count: widgets.len(),
        widget_types,
    }
}

/// Classify an SDK failure into the tool error taxonomy.
fn classify<E, R>(what: &str, err: SdkError<E, R>) -> AwsToolError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    if matches!(&err, SdkError::TimeoutError(_)) {
        return AwsToolError::Timeout {
            message: format!("{what} timed out"),
        };
    }
    let code = err.code().unwrap_or_default().to_string();
    let message = match err.message() {
        Some(m) => format!("{what}: {m}"),
        None => format!("{what}: {}", DisplayErrorContext(&err)),
    };
    classify_code(&code, message)
}

/// Map an AWS error code onto the taxonomy. Pure, for testability.
fn classify_code(code: &str, message: String) -> AwsToolError {
    if code.contains("Throttl")
        || code == "TooManyRequestsException"
        || code == "RequestLimitExceeded"
    {
        AwsToolError::Throttled { message }
    } else if code.contains("AccessDenied")
        || code.contains("Unauthorized")
        || code.contains("ExpiredToken")
        || code.contains("InvalidClientTokenId")
        || code == "AuthFailure"
        || code == "UnrecognizedClientException"
    {
        AwsToolError::AccessDenied { message }
    } else if code.contains("NotFound") || code.contains("NoSuch") {
        AwsToolError::NotFound { resource: message }
    } else {
        AwsToolError::Api { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_throttling_codes() {
        for code in ["ThrottlingException", "Throttling", "TooManyRequestsException"] {
            let err = classify_code(code, "slow down".into());
            assert!(matches!(err, AwsToolError::Throttled { .. }), "{code}");
        }
    }

    #[test]
    fn classify_auth_codes() {
        for code in [
            "AccessDeniedException",
            "AccessDenied",
            "UnauthorizedOperation",
            "ExpiredTokenException",
            "UnrecognizedClientException",
        ] {
            let err = classify_code(code, "denied".into());
            assert!(matches!(err, AwsToolError::AccessDenied { .. }), "{code}");
        }
    }

    #[test]
    fn classify_not_found_codes() {
        for code in ["ResourceNotFound", "ResourceNotFoundException", "NoSuchEntity"] {
            let err = classify_code(code, "missing".into());
            assert!(matches!(err, AwsToolError::NotFound { .. }), "{code}");
        }
    }

    #[test]
    fn classify_unknown_code_is_api_error() {
        let err = classify_code("InternalFailure", "boom".into());
        assert!(matches!(err, AwsToolError::Api { .. }));
    }

    #[test]
    fn dashboard_body_widget_counts() {
        let body = r#"{"widgets":[{"type":"metric"},{"type":"metric"},{"type":"text"}]}"#;
        let detail = parse_dashboard_body("ml-serving-overview", body);
        assert_eq!(detail.widget_count, 3);
        assert_eq!(detail.widget_types, vec!["metric", "text"]);
    }

    #[test]
    fn dashboard_body_tolerates_garbage() {
        let detail = parse_dashboard_body("broken", "not json");
        assert_eq!(detail.widget_count, 0);
        assert!(detail.widget_types.is_empty());
    }

    #[test]
    fn smithy_time_round_trip() {
        let now = Utc::now();
        let restored = from_smithy(&to_smithy(now)).unwrap();
        assert_eq!(restored.timestamp_millis(), now.timestamp_millis());
    }
}
