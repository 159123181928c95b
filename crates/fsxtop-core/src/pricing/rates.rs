// ── Static rate tables ──
//
// USD per month, us-east-1 list prices. Other supported regions scale
// these by a fixed multiplier. The first row of every table is the
// fallback for deployment types the table does not know.

/// Rates for one deployment tier of a file system family.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TierRate {
    pub deployment: &'static str,
    /// Per GiB-month on SSD.
    pub storage_ssd: f64,
    /// Per GiB-month on HDD.
    pub storage_hdd: f64,
    /// Per MBps-month of provisioned throughput.
    pub throughput: f64,
    /// Per provisioned IOPS-month above the baseline.
    pub iops: f64,
}

pub(crate) const ONTAP: &[TierRate] = &[
    tier("SINGLE_AZ_1", 0.125, 0.72, 0.017),
    tier("SINGLE_AZ_2", 0.125, 1.60, 0.017),
    tier("MULTI_AZ_1", 0.25, 1.20, 0.034),
    tier("MULTI_AZ_2", 0.25, 2.50, 0.034),
];

/// Capacity-pool tier, per GiB-month actually stored.
pub(crate) const ONTAP_CAPACITY_POOL: f64 = 0.0219;

pub(crate) const OPENZFS: &[TierRate] = &[
    tier("SINGLE_AZ_1", 0.09, 0.26, 0.006),
    tier("SINGLE_AZ_2", 0.09, 0.26, 0.006),
    tier("SINGLE_AZ_HA_1", 0.09, 0.52, 0.012),
    tier("SINGLE_AZ_HA_2", 0.09, 0.52, 0.012),
    tier("MULTI_AZ_1", 0.18, 0.87, 0.024),
];

pub(crate) const WINDOWS: &[TierRate] = &[
    TierRate {
        storage_hdd: 0.013,
        ..tier("SINGLE_AZ_1", 0.13, 2.20, 0.012)
    },
    TierRate {
        storage_hdd: 0.013,
        ..tier("SINGLE_AZ_2", 0.13, 2.20, 0.012)
    },
    TierRate {
        storage_hdd: 0.025,
        ..tier("MULTI_AZ_1", 0.23, 4.50, 0.024)
    },
];

const fn tier(deployment: &'static str, storage: f64, throughput: f64, iops: f64) -> TierRate {
    TierRate {
        deployment,
        storage_ssd: storage,
        storage_hdd: storage,
        throughput,
        iops,
    }
}

/// Lustre storage is priced by deployment and per-unit throughput
/// bucket; throughput itself carries no separate charge.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LustreTier {
    pub deployment: &'static str,
    /// `(MB/s/TiB, per GiB-month)` pairs.
    pub buckets: &'static [(i64, f64)],
    pub default: f64,
}

impl LustreTier {
    pub fn storage_rate(&self, per_unit_throughput: i64) -> f64 {
        self.buckets
            .iter()
            .find(|(bucket, _)| *bucket == per_unit_throughput)
            .map_or(self.default, |(_, rate)| *rate)
    }
}

pub(crate) const LUSTRE_SSD: &[LustreTier] = &[
    LustreTier {
        deployment: "SCRATCH_1",
        buckets: &[],
        default: 0.14,
    },
    LustreTier {
        deployment: "SCRATCH_2",
        buckets: &[],
        default: 0.14,
    },
    LustreTier {
        deployment: "PERSISTENT_1",
        buckets: &[(50, 0.14), (100, 0.19), (200, 0.29)],
        default: 0.19,
    },
    LustreTier {
        deployment: "PERSISTENT_2",
        buckets: &[(125, 0.145), (250, 0.21), (500, 0.34), (1000, 0.60)],
        default: 0.145,
    },
];

pub(crate) const LUSTRE_HDD: LustreTier = LustreTier {
    deployment: "PERSISTENT_1",
    buckets: &[(12, 0.025), (40, 0.083)],
    default: 0.025,
};

/// Per-unit throughput assumed when a Lustre file system reports none.
pub(crate) const LUSTRE_DEFAULT_PER_UNIT_THROUGHPUT: i64 = 200;

/// Per metadata IOPS-month above the baseline.
pub(crate) const LUSTRE_METADATA_IOPS: f64 = 0.055;

/// Regions with published rates, as a multiplier over us-east-1.
pub(crate) const REGIONS: &[(&str, f64)] = &[
    ("us-east-1", 1.0),
    ("us-east-2", 1.0),
    ("us-west-2", 1.0),
    ("us-west-1", 1.12),
    ("eu-west-1", 1.06),
    ("eu-central-1", 1.14),
    ("ap-southeast-2", 1.15),
    ("ap-northeast-1", 1.16),
];

/// Row for `deployment`, or the table's first row.
pub(crate) fn lookup<'a, T>(table: &'a [T], deployment: &str, key: impl Fn(&T) -> &str) -> Option<&'a T> {
    table
        .iter()
        .find(|row| key(row) == deployment)
        .or_else(|| table.first())
}
