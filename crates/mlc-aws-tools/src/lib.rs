//! AWS data-access tools for the ML cost analysis agent.
//!
//! Provides the `AwsApi` backend abstraction (real SDK clients or a
//! scripted mock), a retry layer for throttled calls, pure cost
//! aggregation, and 13 analysis tools: SageMaker training jobs and
//! endpoints, Bedrock usage, Cost Explorer summaries, S3 storage, and
//! CloudWatch dashboards / logs / alarms.

pub mod aggregate;
pub mod api;
pub mod error;
pub mod mock;
pub mod retry;
pub mod sdk;
pub mod tools;
pub mod types;

// Re-export key types for convenience
pub use api::AwsApi;
pub use error::{AwsResult, AwsToolError};
pub use mock::MockAwsApi;
pub use retry::RetryPolicy;
pub use sdk::SdkAwsApi;
pub use types::AwsTool;
