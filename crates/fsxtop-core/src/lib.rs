// fsxtop-core: refresh orchestration and reactive stores between
// fsxtop-api and the CLI.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pricing;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ControllerConfig;
pub use controller::{Controller, DetailController, LifecycleState};
pub use error::CoreError;
pub use metrics::MetricBatcher;
pub use pricing::PricingEngine;
pub use store::{
    DetailSnapshot, DetailStore, ResourceFilter, ResourceSnapshot, ResourceStore, StoreStats,
};
pub use stream::ChangeStream;
pub use view::{ResourceSortField, SortOrder, SortSpec, UtilizationBand, VolumeSortField};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    HOURS_PER_MONTH, LiveMetrics, MetadataServer, Price, PricingBreakdown, Resource, ResourceKind,
    ResourceSpec, StorageClass, StorageTier, Volume, VolumeMetrics, VolumeSpec,
};
