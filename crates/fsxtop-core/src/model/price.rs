// ── Cost records ──

use serde::{Deserialize, Serialize};

/// Billing hours per month used to move between hourly and monthly figures.
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Monthly cost split by billing dimension.
///
/// There is no stored total: [`total`](Self::total) is always the sum
/// of the components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub storage: f64,
    pub throughput: f64,
    pub iops: f64,
    pub capacity_pool: f64,
}

impl PricingBreakdown {
    pub fn total(&self) -> f64 {
        self.storage + self.throughput + self.iops + self.capacity_pool
    }

    pub fn hourly(&self) -> f64 {
        self.total() / HOURS_PER_MONTH
    }
}

/// A price as set on a resource: either a bare hourly rate or a full
/// monthly breakdown. A breakdown is authoritative and the hourly rate
/// is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Price {
    Hourly { rate: f64 },
    Breakdown(PricingBreakdown),
}

impl Price {
    pub fn hourly(&self) -> f64 {
        match self {
            Self::Hourly { rate } => *rate,
            Self::Breakdown(b) => b.hourly(),
        }
    }

    pub fn monthly(&self) -> f64 {
        match self {
            Self::Hourly { rate } => rate * HOURS_PER_MONTH,
            Self::Breakdown(b) => b.total(),
        }
    }

    pub fn breakdown(&self) -> Option<&PricingBreakdown> {
        match self {
            Self::Breakdown(b) => Some(b),
            Self::Hourly { .. } => None,
        }
    }
}

impl From<PricingBreakdown> for Price {
    fn from(breakdown: PricingBreakdown) -> Self {
        Self::Breakdown(breakdown)
    }
}
