// ── Wire records ──
//
// Backend-neutral shapes returned by `ResourceApi` and consumed by
// `MetricsApi`. These carry raw backend strings (file system type,
// deployment type); `fsxtop-core` parses them into typed domain values.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CloudWatch namespace every FSx metric is published under.
pub const NAMESPACE: &str = "AWS/FSx";

/// Hard limit on the number of queries a single metric request may carry.
pub const MAX_QUERIES_PER_REQUEST: usize = 500;

// ── Resources ───────────────────────────────────────────────────────

/// One file system as reported by the resource listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSystemRecord {
    pub id: String,
    /// Value of the `Name` tag, or the id when untagged.
    pub name: String,
    /// Raw type string: `LUSTRE`, `WINDOWS`, `ONTAP` or `OPENZFS`.
    pub file_system_type: String,
    pub storage_capacity_gib: i64,
    pub creation_time: DateTime<Utc>,
    pub lifecycle: String,
    /// Deployment tier, already defaulted per file system type.
    pub deployment_type: String,
    /// `SSD` or `HDD`.
    pub storage_type: String,
    /// MB/s for ONTAP, OpenZFS and Windows; MB/s/TiB for Lustre.
    pub throughput_capacity: i64,
    /// User-provisioned SSD IOPS (metadata IOPS for Lustre), 0 if unset.
    pub provisioned_iops: i64,
}

/// One volume nested under an ONTAP or OpenZFS file system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub id: String,
    pub name: String,
    pub file_system_id: String,
    /// Raw volume type: `ONTAP` or `OPENZFS`.
    pub volume_type: String,
    pub storage_capacity_gib: i64,
}

// ── Metrics ─────────────────────────────────────────────────────────

/// A `(name, value)` pair narrowing a metric to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Aggregation applied over each sampling period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statistic {
    Average,
    Sum,
}

impl Statistic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "Average",
            Self::Sum => "Sum",
        }
    }
}

/// A single labeled query inside a batch request.
///
/// The label is opaque to the backend and is echoed back on the
/// matching [`MetricSeries`], so callers never depend on response order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricQuery {
    pub label: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    pub period_secs: i32,
    pub statistic: Statistic,
}

/// Values returned for one query, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub label: String,
    pub values: Vec<f64>,
}

impl MetricSeries {
    /// The most recent data point, if the backend returned any.
    pub fn latest(&self) -> Option<f64> {
        self.values.first().copied()
    }
}

/// Closed time window a metric batch is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// The window ending now and reaching `window` into the past.
    pub fn last(window: Duration) -> Self {
        let end = Utc::now();
        let span = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::zero());
        Self {
            start: end - span,
            end,
        }
    }
}
