// ── File system domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::{ResourceKind, StorageClass};
use super::price::Price;

/// `used / capacity` clamped to `[0, 1]`; 0 when capacity is not positive.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn utilization_ratio(used_gib: i64, capacity_gib: i64) -> f64 {
    if capacity_gib <= 0 {
        return 0.0;
    }
    (used_gib as f64 / capacity_gib as f64).clamp(0.0, 1.0)
}

/// Pricing-relevant provisioning settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageTier {
    /// Raw deployment type (`SINGLE_AZ_1`, `PERSISTENT_2`, ...).
    pub deployment_type: String,
    pub storage_class: StorageClass,
    /// MB/s, or MB/s/TiB for Lustre.
    pub throughput_capacity: i64,
    pub provisioned_iops: i64,
}

/// Identity and configuration, owned by the listing refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub id: String,
    pub name: String,
    pub kind: ResourceKind,
    pub capacity_gib: i64,
    pub creation_time: DateTime<Utc>,
    pub lifecycle: String,
    pub tier: StorageTier,
}

/// Latest metric samples, owned by the metrics refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub used_capacity_gib: i64,
    /// Operations per second.
    pub read_iops: f64,
    pub write_iops: f64,
    /// MB/s.
    pub read_throughput: f64,
    pub write_throughput: f64,
    /// Percent.
    pub cpu_utilization: f64,
    /// ONTAP capacity-pool tier usage, only known in detail mode.
    pub pool_usage_gib: Option<f64>,
}

/// A monitored file system.
///
/// The two halves are written by independently scheduled producers and
/// merged by whole-substructure replacement: a listing refresh swaps
/// `spec`, a metrics refresh updates `metrics`, and neither ever touches
/// the other's half.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub spec: ResourceSpec,
    pub metrics: LiveMetrics,
    /// `None` until priced, and permanently for regions without rates.
    pub price: Option<Price>,
    /// Cleared by client-side filtering; hidden resources drop out of snapshots.
    pub visible: bool,
}

impl Resource {
    pub fn new(spec: ResourceSpec) -> Self {
        Self {
            spec,
            metrics: LiveMetrics::default(),
            price: None,
            visible: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.spec.kind
    }

    pub fn capacity_gib(&self) -> i64 {
        self.spec.capacity_gib
    }

    pub fn used_capacity_gib(&self) -> i64 {
        self.metrics.used_capacity_gib
    }

    /// Replace identity and configuration, keeping metrics and price.
    pub fn merge_spec(&mut self, spec: ResourceSpec) {
        self.spec = spec;
    }

    // ── Derived values ───────────────────────────────────────────────

    pub fn utilization(&self) -> f64 {
        utilization_ratio(self.metrics.used_capacity_gib, self.spec.capacity_gib)
    }

    pub fn total_iops(&self) -> f64 {
        self.metrics.read_iops + self.metrics.write_iops
    }

    pub fn total_throughput(&self) -> f64 {
        self.metrics.read_throughput + self.metrics.write_throughput
    }

    // ── Pricing ──────────────────────────────────────────────────────

    /// Accepts either a bare hourly rate or a breakdown.
    pub fn set_price(&mut self, price: impl Into<Price>) {
        self.price = Some(price.into());
    }

    pub fn clear_price(&mut self) {
        self.price = None;
    }

    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }

    pub fn hourly_price(&self) -> f64 {
        self.price.as_ref().map_or(0.0, Price::hourly)
    }

    pub fn monthly_price(&self) -> f64 {
        self.price.as_ref().map_or(0.0, Price::monthly)
    }

    pub fn price_breakdown(&self) -> Option<&super::price::PricingBreakdown> {
        self.price.as_ref().and_then(Price::breakdown)
    }
}
