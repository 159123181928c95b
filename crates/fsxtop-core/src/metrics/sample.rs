// ── Result demultiplexing ──
//
// Labeled values → typed per-entity samples. A sample only carries the
// fields the backend actually returned data for, so applying it never
// zeroes a metric that was merely missing from this cycle.

use std::collections::HashMap;

use super::{
    MetricKind, bytes_to_gib, bytes_to_mib_per_sec, bytes_to_rounded_gib, bytes_to_whole_gib,
    ops_to_per_sec, parse_label, used_from_free,
};
use super::queries::MetricTarget;
use crate::model::{LiveMetrics, VolumeMetrics};

/// Fresh values for one file system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSample {
    pub read_iops: Option<f64>,
    pub write_iops: Option<f64>,
    pub read_throughput: Option<f64>,
    pub write_throughput: Option<f64>,
    pub used_capacity_gib: Option<i64>,
    pub cpu_utilization: Option<f64>,
    pub pool_usage_gib: Option<f64>,
}

impl ResourceSample {
    pub fn apply(&self, metrics: &mut LiveMetrics) {
        set(&mut metrics.read_iops, self.read_iops);
        set(&mut metrics.write_iops, self.write_iops);
        set(&mut metrics.read_throughput, self.read_throughput);
        set(&mut metrics.write_throughput, self.write_throughput);
        set(&mut metrics.used_capacity_gib, self.used_capacity_gib);
        set(&mut metrics.cpu_utilization, self.cpu_utilization);
        if self.pool_usage_gib.is_some() {
            metrics.pool_usage_gib = self.pool_usage_gib;
        }
    }
}

/// Fresh values for one volume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeSample {
    pub read_iops: Option<f64>,
    pub write_iops: Option<f64>,
    pub read_throughput: Option<f64>,
    pub write_throughput: Option<f64>,
    pub used_capacity_gib: Option<i64>,
    pub reported_capacity_gib: Option<i64>,
}

impl VolumeSample {
    pub fn apply(&self, metrics: &mut VolumeMetrics) {
        set(&mut metrics.read_iops, self.read_iops);
        set(&mut metrics.write_iops, self.write_iops);
        set(&mut metrics.read_throughput, self.read_throughput);
        set(&mut metrics.write_throughput, self.write_throughput);
        // A zero reading only counts when nothing better is known yet.
        if let Some(used) = self.used_capacity_gib {
            if used > 0 || metrics.used_capacity_gib == 0 {
                metrics.used_capacity_gib = used;
            }
        }
        if let Some(reported) = self.reported_capacity_gib.filter(|c| *c > 0) {
            metrics.reported_capacity_gib = Some(reported);
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

/// Split labeled values into one sample per file system.
///
/// Labels that do not parse or name an untracked id are ignored.
pub fn demux_resources(
    targets: &[MetricTarget],
    latest: &HashMap<String, f64>,
) -> HashMap<String, ResourceSample> {
    let capacities: HashMap<&str, i64> = targets
        .iter()
        .map(|t| (t.id.as_str(), t.capacity_gib))
        .collect();

    let mut samples: HashMap<String, ResourceSample> = HashMap::new();
    for (label, &value) in latest {
        let Some((id, kind)) = parse_label(label) else {
            continue;
        };
        let Some(&capacity) = capacities.get(id) else {
            continue;
        };
        let sample = samples.entry(id.to_owned()).or_default();
        match kind {
            MetricKind::ReadBytes => sample.read_throughput = Some(bytes_to_mib_per_sec(value)),
            MetricKind::WriteBytes => sample.write_throughput = Some(bytes_to_mib_per_sec(value)),
            MetricKind::ReadOps => sample.read_iops = Some(ops_to_per_sec(value)),
            MetricKind::WriteOps => sample.write_iops = Some(ops_to_per_sec(value)),
            MetricKind::FreeCapacity => {
                sample.used_capacity_gib =
                    Some(used_from_free(capacity, bytes_to_whole_gib(value)));
            }
            MetricKind::StorageUsed | MetricKind::UsedStorage => {
                sample.used_capacity_gib = Some(bytes_to_whole_gib(value));
            }
            MetricKind::Cpu => sample.cpu_utilization = Some(value),
            MetricKind::PoolUsage => sample.pool_usage_gib = Some(bytes_to_gib(value)),
            MetricKind::StorageCapacity => {}
        }
    }
    samples
}

/// Split labeled values into one sample per volume.
pub fn demux_volumes(latest: &HashMap<String, f64>) -> HashMap<String, VolumeSample> {
    let mut samples: HashMap<String, VolumeSample> = HashMap::new();
    for (label, &value) in latest {
        let Some((id, kind)) = parse_label(label) else {
            continue;
        };
        let sample = samples.entry(id.to_owned()).or_default();
        match kind {
            MetricKind::ReadBytes => sample.read_throughput = Some(bytes_to_mib_per_sec(value)),
            MetricKind::WriteBytes => sample.write_throughput = Some(bytes_to_mib_per_sec(value)),
            MetricKind::ReadOps => sample.read_iops = Some(ops_to_per_sec(value)),
            MetricKind::WriteOps => sample.write_iops = Some(ops_to_per_sec(value)),
            MetricKind::StorageUsed | MetricKind::UsedStorage => {
                // ONTAP and OpenZFS publish different names; a positive
                // reading from either wins over a zero from the other.
                let gib = bytes_to_rounded_gib(value);
                if sample.used_capacity_gib.is_none_or(|prev| gib > prev) {
                    sample.used_capacity_gib = Some(gib);
                }
            }
            MetricKind::StorageCapacity => {
                sample.reported_capacity_gib = Some(bytes_to_rounded_gib(value));
            }
            MetricKind::FreeCapacity | MetricKind::Cpu | MetricKind::PoolUsage => {}
        }
    }
    samples
}
