// ── Detail-mode store ──
//
// One parent file system plus its volumes and metadata servers, all
// behind one lock. Nested entities are created on first sight and
// updated in place; they are never removed.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;

use serde::Serialize;

use super::lock;
use crate::metrics::VolumeSample;
use crate::model::{MetadataServer, Resource, ResourceSpec, Volume, VolumeSpec};

#[derive(Debug, Default)]
struct DetailState {
    resource: Option<Resource>,
    volumes: HashMap<String, Volume>,
    metadata_servers: HashMap<String, MetadataServer>,
}

/// Point-in-time view of one file system and its children, children
/// sorted by id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailSnapshot {
    pub resource: Option<Resource>,
    pub volumes: Vec<Volume>,
    pub metadata_servers: Vec<MetadataServer>,
}

#[derive(Debug, Default)]
pub struct DetailStore {
    inner: Mutex<DetailState>,
}

impl DetailStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Parent ───────────────────────────────────────────────────────

    /// Install the parent, or merge identity and configuration into the
    /// one already held when the ids match.
    pub fn set_resource(&self, resource: Resource) -> Resource {
        let mut state = lock(&self.inner);
        if let Some(existing) = state
            .resource
            .as_mut()
            .filter(|r| r.id() == resource.id())
        {
            existing.merge_spec(resource.spec);
            return existing.clone();
        }
        state.resource = Some(resource.clone());
        resource
    }

    /// Merge a fresh listing result into the held parent.
    pub fn merge_resource_spec(&self, spec: ResourceSpec) -> bool {
        self.update_resource(|r| r.merge_spec(spec))
    }

    pub fn resource(&self) -> Option<Resource> {
        lock(&self.inner).resource.clone()
    }

    /// Mutate the parent in place. Returns `false` if none is held.
    pub fn update_resource(&self, f: impl FnOnce(&mut Resource)) -> bool {
        match lock(&self.inner).resource.as_mut() {
            Some(resource) => {
                f(resource);
                true
            }
            None => false,
        }
    }

    // ── Volumes ──────────────────────────────────────────────────────

    /// Insert or merge a discovered volume, keeping its metrics.
    pub fn upsert_volume(&self, spec: VolumeSpec) -> Volume {
        let mut state = lock(&self.inner);
        match state.volumes.entry(spec.id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().merge_spec(spec);
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(Volume::new(spec)).clone(),
        }
    }

    /// Apply fresh samples to known volumes. Returns how many matched.
    pub fn apply_volume_samples(&self, samples: &HashMap<String, VolumeSample>) -> usize {
        let mut state = lock(&self.inner);
        let mut applied = 0;
        for (id, sample) in samples {
            if let Some(volume) = state.volumes.get_mut(id) {
                sample.apply(&mut volume.metrics);
                applied += 1;
            }
        }
        applied
    }

    pub fn volume_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = lock(&self.inner).volumes.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn volumes(&self) -> Vec<Volume> {
        let mut volumes: Vec<_> = lock(&self.inner).volumes.values().cloned().collect();
        volumes.sort_by(|a, b| a.id().cmp(b.id()));
        volumes
    }

    // ── Metadata servers ─────────────────────────────────────────────

    /// Insert a server or update its CPU in place.
    pub fn upsert_metadata_server(&self, server: MetadataServer) {
        lock(&self.inner)
            .metadata_servers
            .entry(server.id.clone())
            .and_modify(|existing| existing.cpu_utilization = server.cpu_utilization)
            .or_insert(server);
    }

    pub fn metadata_servers(&self) -> Vec<MetadataServer> {
        let mut servers: Vec<_> = lock(&self.inner)
            .metadata_servers
            .values()
            .cloned()
            .collect();
        servers.sort_by(|a, b| a.id.cmp(&b.id));
        servers
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> DetailSnapshot {
        let state = lock(&self.inner);
        let mut volumes: Vec<_> = state.volumes.values().cloned().collect();
        let mut metadata_servers: Vec<_> = state.metadata_servers.values().cloned().collect();
        let resource = state.resource.clone();
        drop(state);

        volumes.sort_by(|a, b| a.id().cmp(b.id()));
        metadata_servers.sort_by(|a, b| a.id.cmp(&b.id));
        DetailSnapshot {
            resource,
            volumes,
            metadata_servers,
        }
    }
}
