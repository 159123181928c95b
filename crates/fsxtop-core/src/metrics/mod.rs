// ── Metric query batching ──
//
// Turns the set of tracked entities into backend-compliant batches of
// labeled queries, runs them, and demultiplexes the labeled results into
// typed per-entity samples. Every query label is `"{id}|{metric}"` so
// demultiplexing never depends on response order.

mod batch;
mod discovery;
mod queries;
mod sample;

use std::time::Duration;

use strum::{Display, EnumString};

pub use batch::{BatchResult, MetricBatcher};
pub use discovery::{discover_file_servers, file_server_cpu, mean, mean_file_server_cpu};
pub use queries::{
    MetricTarget, file_server_cpu_queries, pool_usage_query, resource_queries, volume_queries,
};
pub use sample::{ResourceSample, VolumeSample, demux_resources, demux_volumes};

/// Sampling period of every query, in seconds.
pub const PERIOD_SECS: i32 = 60;

/// How far back each fetch looks. Only the newest point is used.
pub const WINDOW: Duration = Duration::from_secs(5 * 60);

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

// ── Unit conversion ─────────────────────────────────────────────────

/// Bytes per sampling period → MB/s.
pub fn bytes_to_mib_per_sec(bytes_per_period: f64) -> f64 {
    bytes_per_period / BYTES_PER_MIB / f64::from(PERIOD_SECS)
}

/// Operations per sampling period → ops/s.
pub fn ops_to_per_sec(ops_per_period: f64) -> f64 {
    ops_per_period / f64::from(PERIOD_SECS)
}

/// Bytes → GiB as a float.
pub fn bytes_to_gib(bytes: f64) -> f64 {
    bytes / BYTES_PER_GIB
}

/// Bytes → whole GiB, truncated toward zero.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn bytes_to_whole_gib(bytes: f64) -> i64 {
    bytes_to_gib(bytes) as i64
}

/// Bytes → whole GiB, rounded to nearest.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn bytes_to_rounded_gib(bytes: f64) -> i64 {
    bytes_to_gib(bytes).round() as i64
}

/// Used capacity when only the free-capacity signal exists.
pub fn used_from_free(capacity_gib: i64, free_gib: i64) -> i64 {
    (capacity_gib - free_gib).max(0)
}

// ── Labels ──────────────────────────────────────────────────────────

/// What a single labeled query measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MetricKind {
    ReadBytes,
    WriteBytes,
    ReadOps,
    WriteOps,
    FreeCapacity,
    StorageUsed,
    UsedStorage,
    StorageCapacity,
    Cpu,
    PoolUsage,
}

/// Composite label tying a result back to its entity and metric.
pub fn label(id: &str, kind: MetricKind) -> String {
    format!("{id}|{kind}")
}

/// Inverse of [`label`]. Splits on the last `|` so ids may contain one.
pub fn parse_label(label: &str) -> Option<(&str, MetricKind)> {
    let (id, kind) = label.rsplit_once('|')?;
    Some((id, kind.parse().ok()?))
}
