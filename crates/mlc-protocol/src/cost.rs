//! Cost summary records produced by the aggregation layer.
//!
//! Amounts are non-negative USD floats and are never rounded during
//! aggregation; rounding to cents happens only at presentation time.

use serde::{Deserialize, Serialize};

use crate::window::TimeWindow;

/// Cost attributed to one AWS service over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCost {
    /// Cost Explorer service name, e.g. "Amazon SageMaker".
    pub service: String,
    /// Unblended cost in USD.
    pub amount_usd: f64,
    /// Window the amount covers.
    pub window: TimeWindow,
}

/// An optimization signal raised during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum CostFlag {
    /// A billed resource with zero recorded usage in the window.
    Idle { resource: String },
    /// Training-job failure ratio above the configured threshold.
    HighFailureRate { failed: usize, total: usize, ratio: f64 },
    /// An S3 bucket with no lifecycle configuration.
    UnmanagedStorage { bucket: String },
}

/// Aggregated per-service costs plus the flags raised over the inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSummary {
    pub window: TimeWindow,
    pub services: Vec<ServiceCost>,
    /// Sum of all service amounts, unrounded.
    pub total_usd: f64,
    pub flags: Vec<CostFlag>,
}

impl CostSummary {
    /// An empty summary over a window: zero total, no flags.
    pub fn empty(window: TimeWindow) -> Self {
        Self {
            window,
            services: Vec::new(),
            total_usd: 0.0,
            flags: Vec::new(),
        }
    }
}

/// Round a USD amount to cents. Presentation only.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_has_no_flags() {
        let w = TimeWindow::last_days(30).unwrap();
        let s = CostSummary::empty(w);
        assert_eq!(s.total_usd, 0.0);
        assert!(s.flags.is_empty());
        assert!(s.services.is_empty());
    }

    #[test]
    fn flag_wire_format_is_tagged() {
        let flag = CostFlag::Idle {
            resource: "endpoint/churn-model".into(),
        };
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["flag"], "idle");
        assert_eq!(json["resource"], "endpoint/churn-model");
    }

    #[test]
    fn round_cents_is_presentation_only() {
        // 0.1 + 0.2 style accumulation stays unrounded until render.
        let total: f64 = [0.105, 0.205, 0.3].iter().sum();
        assert!((total - 0.61).abs() < 1e-9);
        assert_eq!(round_cents(total), 0.61);
        assert_eq!(round_cents(12.345), 12.35);
    }
}
