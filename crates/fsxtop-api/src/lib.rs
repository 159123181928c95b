//! Backend contracts and AWS clients for fsxtop.
//!
//! Two object-safe async traits describe everything the monitoring core
//! needs from the outside world:
//!
//! - [`ResourceApi`] lists and looks up file systems and their volumes.
//! - [`MetricsApi`] runs labeled metric batches and discovers dimension values.
//!
//! [`FsxClient`] and [`CloudWatchClient`] implement them against AWS.
//! Tests substitute in-memory fakes.

pub mod cloudwatch;
pub mod error;
pub mod fsx;
pub mod transport;
pub mod types;

use async_trait::async_trait;

pub use cloudwatch::CloudWatchClient;
pub use error::Error;
pub use fsx::FsxClient;
pub use transport::{SessionConfig, connect, load_sdk_config};
pub use types::{
    Dimension, FileSystemRecord, MAX_QUERIES_PER_REQUEST, MetricQuery, MetricSeries, NAMESPACE,
    Statistic, TimeRange, VolumeRecord,
};

/// Cloud resource listing.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Every file system visible to the session, optionally restricted to
    /// one raw type string (`ONTAP`, `LUSTRE`, ...).
    async fn list_file_systems(&self, kind: Option<&str>) -> Result<Vec<FileSystemRecord>, Error>;

    /// Point lookup. `Ok(None)` when the backend reports no such id.
    async fn get_file_system(&self, id: &str) -> Result<Option<FileSystemRecord>, Error>;

    /// Volumes nested under one file system.
    async fn list_volumes(&self, file_system_id: &str) -> Result<Vec<VolumeRecord>, Error>;
}

/// Metric time-series backend.
#[async_trait]
pub trait MetricsApi: Send + Sync {
    /// Run up to [`MAX_QUERIES_PER_REQUEST`] labeled queries in one request.
    /// Series come back keyed by the caller's label, newest value first.
    async fn batch_query(
        &self,
        queries: &[MetricQuery],
        range: TimeRange,
    ) -> Result<Vec<MetricSeries>, Error>;

    /// Distinct values of `dimension` among published `metric_name`
    /// series matching every dimension in `filter`.
    async fn list_dimension_values(
        &self,
        metric_name: &str,
        filter: &[Dimension],
        dimension: &str,
    ) -> Result<Vec<String>, Error>;
}
