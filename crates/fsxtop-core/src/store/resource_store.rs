// ── Summary-mode resource store ──

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use serde::Serialize;

use super::filter::ResourceFilter;
use super::lock;
use crate::model::{Resource, ResourceKind};

/// Aggregates over the visible resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub total_count: usize,
    pub total_capacity_gib: i64,
    pub total_used_gib: i64,
    pub total_hourly_cost: f64,
    pub count_by_kind: BTreeMap<ResourceKind, usize>,
}

impl StoreStats {
    pub fn total_monthly_cost(&self) -> f64 {
        self.total_hourly_cost * crate::model::HOURS_PER_MONTH
    }
}

/// Point-in-time view: aggregates plus the visible resources, by id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceSnapshot {
    pub stats: StoreStats,
    pub resources: Vec<Resource>,
}

/// Keyed cache of every tracked file system.
#[derive(Debug, Default)]
pub struct ResourceStore {
    inner: Mutex<HashMap<String, Resource>>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new resource, or merge the incoming identity and
    /// configuration into the existing one, keeping its metrics, price
    /// and visibility. Returns the canonical stored value.
    pub fn upsert(&self, resource: Resource) -> Resource {
        let mut map = lock(&self.inner);
        match map.entry(resource.id().to_owned()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().merge_spec(resource.spec);
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(resource).clone(),
        }
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> bool {
        lock(&self.inner).remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<Resource> {
        lock(&self.inner).get(id).cloned()
    }

    /// Every tracked id, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = lock(&self.inner).keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).is_empty()
    }

    /// Mutate one resource in place. Returns `false` if the id is unknown.
    pub fn update(&self, id: &str, f: impl FnOnce(&mut Resource)) -> bool {
        match lock(&self.inner).get_mut(id) {
            Some(resource) => {
                f(resource);
                true
            }
            None => false,
        }
    }

    /// Apply `f` to every resource under a single lock acquisition.
    /// `f` must not call back into the store.
    pub fn for_each(&self, mut f: impl FnMut(&mut Resource)) {
        for resource in lock(&self.inner).values_mut() {
            f(resource);
        }
    }

    /// Mark each resource visible or hidden according to `filter`.
    pub fn apply_filter(&self, filter: &ResourceFilter) {
        self.for_each(|r| r.visible = filter.matches(r));
    }

    /// Aggregates and visible resources, recomputed on every call.
    pub fn snapshot(&self) -> ResourceSnapshot {
        let map = lock(&self.inner);
        let mut stats = StoreStats::default();
        let mut resources = Vec::with_capacity(map.len());

        for resource in map.values().filter(|r| r.visible) {
            stats.total_count += 1;
            stats.total_capacity_gib += resource.capacity_gib();
            stats.total_used_gib += resource.used_capacity_gib();
            stats.total_hourly_cost += resource.hourly_price();
            *stats.count_by_kind.entry(resource.kind()).or_default() += 1;
            resources.push(resource.clone());
        }
        drop(map);

        resources.sort_by(|a, b| a.id().cmp(b.id()));
        ResourceSnapshot { stats, resources }
    }
}
