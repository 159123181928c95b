// ── Domain model ──
//
// Canonical representations of everything the controllers track. Each
// entity is split into a spec half (identity and configuration, written
// by listing) and a metrics half (written by metric polling) so the two
// producers can never clobber each other.

pub mod kind;
pub mod price;
pub mod resource;
pub mod volume;

pub use kind::{ResourceKind, StorageClass};
pub use price::{HOURS_PER_MONTH, Price, PricingBreakdown};
pub use resource::{LiveMetrics, Resource, ResourceSpec, StorageTier, utilization_ratio};
pub use volume::{MetadataServer, Volume, VolumeMetrics, VolumeSpec};
