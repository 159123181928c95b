// ── Presentation helpers ──
//
// Sorting, paging and utilization banding over store snapshots. Pure
// functions; the binary decides how to draw the result.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use strum::{Display, EnumString};

use crate::model::{Resource, Volume};

// ── Sort order ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    Asc,
    Dsc,
}

/// Columns a file-system listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceSortField {
    Name,
    Type,
    Capacity,
    Utilization,
    Cost,
    Creation,
}

/// Columns a volume listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VolumeSortField {
    Name,
    Capacity,
    Utilization,
    Iops,
    Throughput,
}

/// A sortable column set with a default ordering.
pub trait SortField: Copy + FromStr + fmt::Display {
    const DEFAULT: SortSpec<Self>;
}

impl SortField for ResourceSortField {
    const DEFAULT: SortSpec<Self> = SortSpec {
        field: Self::Creation,
        order: SortOrder::Dsc,
    };
}

impl SortField for VolumeSortField {
    const DEFAULT: SortSpec<Self> = SortSpec {
        field: Self::Name,
        order: SortOrder::Asc,
    };
}

/// `field=asc|dsc`.
///
/// Parsing never fails: an unknown field falls back to the view's default
/// field, and anything but `dsc` sorts ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F: SortField> Default for SortSpec<F> {
    fn default() -> Self {
        F::DEFAULT
    }
}

impl<F: SortField> FromStr for SortSpec<F> {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(F::DEFAULT);
        }
        let (field, order) = s.split_once('=').unwrap_or((s, ""));
        Ok(Self {
            field: field.trim().parse().unwrap_or(F::DEFAULT.field),
            order: if order.trim().eq_ignore_ascii_case("dsc") {
                SortOrder::Dsc
            } else {
                SortOrder::Asc
            },
        })
    }
}

impl<F: SortField> fmt::Display for SortSpec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.order)
    }
}

impl<F> SortSpec<F> {
    fn directed(&self, ord: Ordering) -> Ordering {
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Dsc => ord.reverse(),
        }
    }
}

// ── Sorting ──────────────────────────────────────────────────────────

fn compare_resources(field: ResourceSortField, a: &Resource, b: &Resource) -> Ordering {
    match field {
        ResourceSortField::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        ResourceSortField::Type => a.kind().label().cmp(b.kind().label()),
        ResourceSortField::Capacity => a.capacity_gib().cmp(&b.capacity_gib()),
        ResourceSortField::Utilization => a.utilization().total_cmp(&b.utilization()),
        ResourceSortField::Cost => a.hourly_price().total_cmp(&b.hourly_price()),
        ResourceSortField::Creation => a.spec.creation_time.cmp(&b.spec.creation_time),
    }
}

fn compare_volumes(field: VolumeSortField, a: &Volume, b: &Volume) -> Ordering {
    match field {
        VolumeSortField::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        VolumeSortField::Capacity => a.capacity_gib().cmp(&b.capacity_gib()),
        VolumeSortField::Utilization => a.utilization().total_cmp(&b.utilization()),
        VolumeSortField::Iops => a.total_iops().total_cmp(&b.total_iops()),
        VolumeSortField::Throughput => a.total_throughput().total_cmp(&b.total_throughput()),
    }
}

/// Sort in place. Equal keys fall back to ascending id.
pub fn sort_resources(resources: &mut [Resource], spec: SortSpec<ResourceSortField>) {
    resources.sort_by(|a, b| {
        spec.directed(compare_resources(spec.field, a, b))
            .then_with(|| a.id().cmp(b.id()))
    });
}

/// Sort in place. Equal keys fall back to ascending id.
pub fn sort_volumes(volumes: &mut [Volume], spec: SortSpec<VolumeSortField>) {
    volumes.sort_by(|a, b| {
        spec.directed(compare_volumes(spec.field, a, b))
            .then_with(|| a.id().cmp(b.id()))
    });
}

// ── Paging ───────────────────────────────────────────────────────────

/// Number of pages for `total` items; at least one, even when empty.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// The zero-based `page` of `items`. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

// ── Utilization bands ────────────────────────────────────────────────

/// Qualitative zone of a utilization ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UtilizationBand {
    Good,
    Ok,
    Bad,
}

impl UtilizationBand {
    pub const OK_THRESHOLD: f64 = 0.8;
    pub const BAD_THRESHOLD: f64 = 0.9;

    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < Self::OK_THRESHOLD {
            Self::Good
        } else if ratio < Self::BAD_THRESHOLD {
            Self::Ok
        } else {
            Self::Bad
        }
    }
}
