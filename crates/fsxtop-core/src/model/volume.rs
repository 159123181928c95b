// ── Nested volume and metadata server types ──

use serde::{Deserialize, Serialize};

use super::kind::ResourceKind;
use super::resource::utilization_ratio;

/// Identity of a volume, owned by volume discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub id: String,
    pub name: String,
    pub file_system_id: String,
    pub kind: ResourceKind,
    /// Capacity as listed by the resource API.
    pub capacity_gib: i64,
}

/// Latest samples for one volume, owned by the volume metrics fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetrics {
    pub used_capacity_gib: i64,
    pub read_iops: f64,
    pub write_iops: f64,
    pub read_throughput: f64,
    pub write_throughput: f64,
    /// Capacity as reported by the metrics backend; wins over the listed
    /// capacity when positive.
    pub reported_capacity_gib: Option<i64>,
}

/// A volume nested under an ONTAP or OpenZFS file system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub spec: VolumeSpec,
    pub metrics: VolumeMetrics,
}

impl Volume {
    pub fn new(spec: VolumeSpec) -> Self {
        Self {
            spec,
            metrics: VolumeMetrics::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn merge_spec(&mut self, spec: VolumeSpec) {
        self.spec = spec;
    }

    pub fn capacity_gib(&self) -> i64 {
        match self.metrics.reported_capacity_gib {
            Some(reported) if reported > 0 => reported,
            _ => self.spec.capacity_gib,
        }
    }

    pub fn used_capacity_gib(&self) -> i64 {
        self.metrics.used_capacity_gib
    }

    pub fn utilization(&self) -> f64 {
        utilization_ratio(self.metrics.used_capacity_gib, self.capacity_gib())
    }

    pub fn total_iops(&self) -> f64 {
        self.metrics.read_iops + self.metrics.write_iops
    }

    pub fn total_throughput(&self) -> f64 {
        self.metrics.read_throughput + self.metrics.write_throughput
    }
}

/// A Lustre metadata server. Only CPU is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataServer {
    pub id: String,
    pub file_system_id: String,
    pub cpu_utilization: f64,
}
