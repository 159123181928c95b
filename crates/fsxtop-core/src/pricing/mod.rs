// ── Pricing engine ──
//
// Pure, deterministic estimate of a file system's monthly cost from its
// configuration and (for ONTAP) capacity-pool usage. Rates come from a
// static table, so results are estimates rather than live quotes.

mod rates;

use tracing::trace;

use crate::model::{PricingBreakdown, Resource, ResourceKind, StorageClass};

use self::rates::{
    LUSTRE_DEFAULT_PER_UNIT_THROUGHPUT, LUSTRE_HDD, LUSTRE_METADATA_IOPS, LUSTRE_SSD, ONTAP,
    ONTAP_CAPACITY_POOL, OPENZFS, REGIONS, WINDOWS, lookup,
};

/// Free IOPS included per GiB of provisioned storage.
pub const BASELINE_IOPS_PER_GIB: i64 = 3;

/// Monthly charge for IOPS provisioned above the per-GiB baseline.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn iops_cost(provisioned_iops: i64, capacity_gib: i64, rate: f64) -> f64 {
    let extra = (provisioned_iops - capacity_gib * BASELINE_IOPS_PER_GIB).max(0);
    extra as f64 * rate
}

/// Computes [`PricingBreakdown`]s for one region.
///
/// Unknown regions price nothing (`None`); unknown deployment tiers fall
/// back to the family's default tier.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    region: String,
    multiplier: Option<f64>,
}

impl PricingEngine {
    pub fn new(region: impl Into<String>) -> Self {
        let region = region.into();
        let multiplier = REGIONS
            .iter()
            .find(|(name, _)| *name == region)
            .map(|(_, m)| *m);
        Self { region, multiplier }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn supports_region(&self) -> bool {
        self.multiplier.is_some()
    }

    /// Monthly cost breakdown, or `None` when the region has no rates.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn price(&self, resource: &Resource) -> Option<PricingBreakdown> {
        let multiplier = self.multiplier?;
        let spec = &resource.spec;
        let tier = &spec.tier;
        let capacity = spec.capacity_gib as f64;
        let throughput = tier.throughput_capacity as f64;

        let breakdown = match spec.kind {
            ResourceKind::Ontap | ResourceKind::OpenZfs | ResourceKind::Windows => {
                let table = match spec.kind {
                    ResourceKind::Ontap => ONTAP,
                    ResourceKind::OpenZfs => OPENZFS,
                    _ => WINDOWS,
                };
                let rate = lookup(table, &tier.deployment_type, |r| r.deployment)?;
                let (storage_rate, iops_rate) = match tier.storage_class {
                    StorageClass::Ssd => (rate.storage_ssd, rate.iops),
                    // HDD carries no provisioned-IOPS charge.
                    StorageClass::Hdd => (rate.storage_hdd, 0.0),
                };
                let capacity_pool = match resource.metrics.pool_usage_gib {
                    Some(used) if spec.kind == ResourceKind::Ontap && used > 0.0 => {
                        used * ONTAP_CAPACITY_POOL
                    }
                    _ => 0.0,
                };
                PricingBreakdown {
                    storage: capacity * storage_rate,
                    throughput: throughput * rate.throughput,
                    iops: iops_cost(tier.provisioned_iops, spec.capacity_gib, iops_rate),
                    capacity_pool,
                }
            }
            ResourceKind::Lustre => {
                let per_unit = match tier.throughput_capacity {
                    0 => LUSTRE_DEFAULT_PER_UNIT_THROUGHPUT,
                    t => t,
                };
                // HDD media is billed on its own table whatever the deployment.
                let storage_rate = match tier.storage_class {
                    StorageClass::Hdd => LUSTRE_HDD.storage_rate(per_unit),
                    StorageClass::Ssd => lookup(LUSTRE_SSD, &tier.deployment_type, |t| t.deployment)?
                        .storage_rate(per_unit),
                };
                PricingBreakdown {
                    storage: capacity * storage_rate,
                    throughput: 0.0,
                    iops: iops_cost(
                        tier.provisioned_iops,
                        spec.capacity_gib,
                        LUSTRE_METADATA_IOPS,
                    ),
                    capacity_pool: 0.0,
                }
            }
        };

        trace!(id = %spec.id, total = breakdown.total(), "priced");
        Some(scale(breakdown, multiplier))
    }

    /// Price `resource` in place. Clears any stale price when the region
    /// has no rates.
    pub fn apply(&self, resource: &mut Resource) {
        match self.price(resource) {
            Some(breakdown) => resource.set_price(breakdown),
            None => resource.clear_price(),
        }
    }
}

fn scale(b: PricingBreakdown, multiplier: f64) -> PricingBreakdown {
    PricingBreakdown {
        storage: b.storage * multiplier,
        throughput: b.throughput * multiplier,
        iops: b.iops * multiplier,
        capacity_pool: b.capacity_pool * multiplier,
    }
}
