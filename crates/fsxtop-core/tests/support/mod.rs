// In-memory backends for controller tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use fsxtop_api::{
    Dimension, Error, FileSystemRecord, MAX_QUERIES_PER_REQUEST, MetricQuery, MetricSeries,
    MetricsApi, ResourceApi, TimeRange, VolumeRecord,
};

pub const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn file_system(id: &str, kind: &str, capacity_gib: i64) -> FileSystemRecord {
    FileSystemRecord {
        id: id.into(),
        name: format!("{id}-name"),
        file_system_type: kind.into(),
        storage_capacity_gib: capacity_gib,
        creation_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        lifecycle: "AVAILABLE".into(),
        deployment_type: if kind == "LUSTRE" { "SCRATCH_2" } else { "SINGLE_AZ_1" }.into(),
        storage_type: "SSD".into(),
        throughput_capacity: 128,
        provisioned_iops: 0,
    }
}

pub fn volume(id: &str, file_system_id: &str, capacity_gib: i64) -> VolumeRecord {
    VolumeRecord {
        id: id.into(),
        name: format!("{id}-name"),
        file_system_id: file_system_id.into(),
        volume_type: "ONTAP".into(),
        storage_capacity_gib: capacity_gib,
    }
}

fn service_error(operation: &'static str) -> Error {
    Error::Service {
        operation,
        message: "injected failure".into(),
        transient: true,
    }
}

// ── Resources ───────────────────────────────────────────────────────

#[derive(Default)]
struct ResourceState {
    file_systems: Vec<FileSystemRecord>,
    volumes: HashMap<String, Vec<VolumeRecord>>,
    fail_listing: bool,
    fail_get: bool,
    list_calls: usize,
    get_calls: usize,
}

#[derive(Default)]
pub struct FakeResources {
    state: Mutex<ResourceState>,
}

impl FakeResources {
    pub fn new(file_systems: Vec<FileSystemRecord>) -> Arc<Self> {
        let fake = Self::default();
        fake.state.lock().unwrap().file_systems = file_systems;
        Arc::new(fake)
    }

    pub fn set_file_systems(&self, file_systems: Vec<FileSystemRecord>) {
        self.state.lock().unwrap().file_systems = file_systems;
    }

    pub fn set_volumes(&self, file_system_id: &str, volumes: Vec<VolumeRecord>) {
        self.state
            .lock()
            .unwrap()
            .volumes
            .insert(file_system_id.into(), volumes);
    }

    pub fn fail_listing(&self, fail: bool) {
        self.state.lock().unwrap().fail_listing = fail;
    }

    pub fn fail_get(&self, fail: bool) {
        self.state.lock().unwrap().fail_get = fail;
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn get_calls(&self) -> usize {
        self.state.lock().unwrap().get_calls
    }
}

#[async_trait]
impl ResourceApi for FakeResources {
    async fn list_file_systems(&self, kind: Option<&str>) -> Result<Vec<FileSystemRecord>, Error> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.fail_listing {
            return Err(service_error("DescribeFileSystems"));
        }
        Ok(state
            .file_systems
            .iter()
            .filter(|fs| kind.is_none_or(|k| fs.file_system_type.eq_ignore_ascii_case(k)))
            .cloned()
            .collect())
    }

    async fn get_file_system(&self, id: &str) -> Result<Option<FileSystemRecord>, Error> {
        let mut state = self.state.lock().unwrap();
        state.get_calls += 1;
        if state.fail_get {
            return Err(service_error("DescribeFileSystems"));
        }
        Ok(state.file_systems.iter().find(|fs| fs.id == id).cloned())
    }

    async fn list_volumes(&self, file_system_id: &str) -> Result<Vec<VolumeRecord>, Error> {
        let state = self.state.lock().unwrap();
        if state.fail_listing {
            return Err(service_error("DescribeVolumes"));
        }
        Ok(state
            .volumes
            .get(file_system_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ── Metrics ─────────────────────────────────────────────────────────

#[derive(Default)]
struct MetricState {
    /// Keyed by query label, or `"{fs}/{server}"` for per-server queries.
    values: HashMap<String, f64>,
    servers: HashMap<String, Vec<String>>,
    fail_batches: bool,
    fail_discovery: bool,
    batch_sizes: Vec<usize>,
    discovery_calls: usize,
}

#[derive(Default)]
pub struct FakeMetrics {
    state: Mutex<MetricState>,
}

fn dimension<'a>(dimensions: &'a [Dimension], name: &str) -> Option<&'a str> {
    dimensions
        .iter()
        .find(|d| d.name == name)
        .map(|d| d.value.as_str())
}

impl FakeMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Publish a value for `"{id}|{kind}"`.
    pub fn set(&self, id: &str, kind: &str, value: f64) {
        self.state
            .lock()
            .unwrap()
            .values
            .insert(format!("{id}|{kind}"), value);
    }

    /// Publish CPU for one file server of one file system.
    pub fn set_server_cpu(&self, file_system_id: &str, server: &str, value: f64) {
        let mut state = self.state.lock().unwrap();
        state
            .values
            .insert(format!("{file_system_id}/{server}"), value);
        let servers = state.servers.entry(file_system_id.into()).or_default();
        if !servers.iter().any(|s| s == server) {
            servers.push(server.into());
        }
    }

    pub fn fail_batches(&self, fail: bool) {
        self.state.lock().unwrap().fail_batches = fail;
    }

    pub fn fail_discovery(&self, fail: bool) {
        self.state.lock().unwrap().fail_discovery = fail;
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().batch_sizes.clone()
    }

    pub fn discovery_calls(&self) -> usize {
        self.state.lock().unwrap().discovery_calls
    }
}

#[async_trait]
impl MetricsApi for FakeMetrics {
    async fn batch_query(
        &self,
        queries: &[MetricQuery],
        _range: TimeRange,
    ) -> Result<Vec<MetricSeries>, Error> {
        let mut state = self.state.lock().unwrap();
        if queries.len() > MAX_QUERIES_PER_REQUEST {
            return Err(Error::TooManyQueries {
                count: queries.len(),
                limit: MAX_QUERIES_PER_REQUEST,
            });
        }
        state.batch_sizes.push(queries.len());
        if state.fail_batches {
            return Err(service_error("GetMetricData"));
        }

        Ok(queries
            .iter()
            .map(|q| {
                let key = match (
                    dimension(&q.dimensions, "FileSystemId"),
                    dimension(&q.dimensions, "FileServer"),
                ) {
                    (Some(fs), Some(server)) => format!("{fs}/{server}"),
                    _ => q.label.clone(),
                };
                MetricSeries {
                    label: q.label.clone(),
                    values: state.values.get(&key).copied().into_iter().collect(),
                }
            })
            .collect())
    }

    async fn list_dimension_values(
        &self,
        _metric_name: &str,
        filter: &[Dimension],
        _dimension: &str,
    ) -> Result<Vec<String>, Error> {
        let mut state = self.state.lock().unwrap();
        state.discovery_calls += 1;
        if state.fail_discovery {
            return Err(service_error("ListMetrics"));
        }
        let fs = dimension(filter, "FileSystemId").unwrap_or_default();
        Ok(state.servers.get(fs).cloned().unwrap_or_default())
    }
}
