// ── Detail-mode controller ──

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use fsxtop_api::{MetricsApi, ResourceApi};
use tracing::{debug, info, warn};

use super::{Lifecycle, LifecycleState, poll_loop};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::metrics::{
    MetricBatcher, MetricTarget, demux_resources, demux_volumes, discover_file_servers,
    file_server_cpu, mean_file_server_cpu, pool_usage_query, resource_queries, volume_queries,
};
use crate::model::{MetadataServer, Resource, ResourceKind, ResourceSpec, VolumeSpec};
use crate::pricing::PricingEngine;
use crate::store::{DetailSnapshot, DetailStore};
use crate::stream::{ChangeSignal, ChangeStream};

/// Watches a single file system together with its volumes (ONTAP,
/// OpenZFS) or metadata servers (Lustre).
#[derive(Clone)]
pub struct DetailController {
    inner: Arc<DetailInner>,
}

struct DetailInner {
    file_system_id: String,
    config: ControllerConfig,
    resource_api: Arc<dyn ResourceApi>,
    metrics_api: Arc<dyn MetricsApi>,
    store: Arc<DetailStore>,
    pricing: PricingEngine,
    batcher: MetricBatcher,
    signal: ChangeSignal,
    lifecycle: Lifecycle,
    /// Metadata servers, once discovery has found any.
    metadata_servers: Mutex<Option<Vec<String>>>,
}

impl DetailController {
    pub fn new(
        config: ControllerConfig,
        file_system_id: impl Into<String>,
        resource_api: Arc<dyn ResourceApi>,
        metrics_api: Arc<dyn MetricsApi>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let pricing = PricingEngine::new(config.region.clone());
        Ok(Self {
            inner: Arc::new(DetailInner {
                file_system_id: file_system_id.into(),
                config,
                resource_api,
                metrics_api,
                store: Arc::new(DetailStore::new()),
                pricing,
                batcher: MetricBatcher::new(),
                signal: ChangeSignal::new(),
                lifecycle: Lifecycle::new(),
                metadata_servers: Mutex::new(None),
            }),
        })
    }

    pub fn file_system_id(&self) -> &str {
        &self.inner.file_system_id
    }

    pub fn store(&self) -> &Arc<DetailStore> {
        &self.inner.store
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.lifecycle.state()
    }

    pub fn subscribe(&self) -> ChangeStream {
        self.inner.signal.subscribe()
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        self.inner.store.snapshot()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Resolve the target, then start the background loops.
    ///
    /// Fails with [`CoreError::ResourceNotFound`] when the file system
    /// cannot be fetched; the controller is then stopped for good.
    pub async fn start(&self) -> Result<(), CoreError> {
        let inner = &self.inner;
        if !inner.lifecycle.begin() {
            return Ok(());
        }
        if let Err(e) = self.resolve().await {
            inner.lifecycle.mark_stopped();
            return Err(e);
        }
        info!(id = %inner.file_system_id, "starting detail controller");

        let ctrl = self.clone();
        inner
            .lifecycle
            .spawn_worker(async move { ctrl.refresh_metrics().await });

        let ctrl = self.clone();
        inner
            .lifecycle
            .spawn_loop(poll_loop(
                inner.config.refresh_interval,
                inner.lifecycle.loops.clone(),
                move || {
                    let ctrl = ctrl.clone();
                    async move { ctrl.refresh_resource().await }
                },
            ))
            .await;

        let ctrl = self.clone();
        inner
            .lifecycle
            .spawn_loop(poll_loop(
                inner.config.metric_interval,
                inner.lifecycle.loops.clone(),
                move || {
                    let ctrl = ctrl.clone();
                    async move { ctrl.refresh_metrics().await }
                },
            ))
            .await;
        Ok(())
    }

    pub async fn stop(&self) {
        self.inner.lifecycle.shutdown().await;
        info!(id = %self.inner.file_system_id, "detail controller stopped");
    }

    /// Resolve the target and fetch one round of metrics without
    /// starting the loops.
    pub async fn load_once(&self) -> Result<DetailSnapshot, CoreError> {
        self.resolve().await?;
        self.refresh_metrics().await;
        Ok(self.snapshot())
    }

    /// Fetch, price and store the parent file system.
    async fn resolve(&self) -> Result<(), CoreError> {
        let inner = &self.inner;
        let spec = match self.fetch_spec().await {
            Ok(Some(spec)) => spec,
            Ok(None) => return Err(self.not_found()),
            Err(e) => {
                warn!(id = %inner.file_system_id, error = %e, "failed to fetch file system");
                return Err(match e {
                    CoreError::UnsupportedKind { .. } => e,
                    _ => self.not_found(),
                });
            }
        };

        let mut resource = Resource::new(spec);
        inner.pricing.apply(&mut resource);
        inner.store.set_resource(resource);
        inner.signal.notify();
        Ok(())
    }

    fn not_found(&self) -> CoreError {
        CoreError::ResourceNotFound {
            id: self.inner.file_system_id.clone(),
        }
    }

    async fn fetch_spec(&self) -> Result<Option<ResourceSpec>, CoreError> {
        let inner = &self.inner;
        inner
            .resource_api
            .get_file_system(&inner.file_system_id)
            .await?
            .as_ref()
            .map(ResourceSpec::try_from)
            .transpose()
    }

    // ── Listing refresh ──────────────────────────────────────────────

    /// Re-read identity and configuration. A file system that has gone
    /// missing keeps its last known state.
    pub async fn refresh_resource(&self) {
        let inner = &self.inner;
        match self.fetch_spec().await {
            Ok(Some(spec)) => {
                if !inner.lifecycle.accepting_writes() {
                    return;
                }
                inner.store.merge_resource_spec(spec);
                inner.store.update_resource(|r| inner.pricing.apply(r));
                inner.signal.notify();
            }
            Ok(None) => {
                warn!(id = %inner.file_system_id, "file system no longer reported; keeping last known state");
            }
            Err(e) => {
                warn!(id = %inner.file_system_id, error = %e, "failed to refresh file system");
            }
        }
    }

    // ── Metrics refresh ──────────────────────────────────────────────

    /// One metrics cycle: the file system's own metrics alongside its
    /// volumes or metadata servers, joined before a single notification.
    pub async fn refresh_metrics(&self) {
        let Some(resource) = self.inner.store.resource() else {
            return;
        };
        let target = MetricTarget::from(&resource);
        let kind = target.kind;

        let children = async {
            if kind.has_volumes() {
                self.refresh_volumes().await;
            } else if kind.has_metadata_servers() {
                self.refresh_metadata_servers().await;
            }
        };
        tokio::join!(self.refresh_resource_metrics(target), children);

        if self.inner.lifecycle.accepting_writes() {
            self.inner.signal.notify();
        }
    }

    async fn refresh_resource_metrics(&self, target: MetricTarget) {
        let inner = &self.inner;
        let api = inner.metrics_api.as_ref();

        let mut queries = resource_queries(&target);
        if target.kind == ResourceKind::Ontap {
            queries.push(pool_usage_query(&target.id));
        }
        let lustre_cpu = async {
            if target.kind.cpu_needs_discovery() {
                mean_file_server_cpu(api, &inner.batcher, &target.id).await
            } else {
                Ok(None)
            }
        };
        let (result, cpu) = tokio::join!(inner.batcher.execute(api, vec![queries]), lustre_cpu);

        let cpu = cpu.unwrap_or_else(|e| {
            warn!(id = %target.id, error = %e, "failed to fetch file server CPU");
            None
        });
        if !inner.lifecycle.accepting_writes() {
            return;
        }

        let samples = if result.any_succeeded() {
            demux_resources(std::slice::from_ref(&target), &result.latest)
        } else {
            HashMap::new()
        };
        inner.store.update_resource(|r| {
            if let Some(sample) = samples.get(&target.id) {
                sample.apply(&mut r.metrics);
            }
            if let Some(cpu) = cpu.filter(|c| *c > 0.0) {
                r.metrics.cpu_utilization = cpu;
            }
            inner.pricing.apply(r);
        });
    }

    /// Discover volumes, then fetch metrics for every known one. A failed
    /// listing still refreshes the volumes already known.
    async fn refresh_volumes(&self) {
        let inner = &self.inner;
        let fs_id = inner.file_system_id.as_str();

        match inner.resource_api.list_volumes(fs_id).await {
            Ok(records) if inner.lifecycle.accepting_writes() => {
                for record in &records {
                    match VolumeSpec::try_from(record) {
                        Ok(spec) => {
                            inner.store.upsert_volume(spec);
                        }
                        Err(e) => debug!(id = %record.id, error = %e, "skipping volume"),
                    }
                }
            }
            Ok(_) => return,
            Err(e) => warn!(id = %fs_id, error = %e, "failed to refresh volumes"),
        }

        let volume_ids = inner.store.volume_ids();
        if volume_ids.is_empty() {
            return;
        }
        let groups = volume_ids
            .iter()
            .map(|volume_id| volume_queries(fs_id, volume_id))
            .collect();
        let result = inner
            .batcher
            .execute(inner.metrics_api.as_ref(), groups)
            .await;

        if result.any_succeeded() && inner.lifecycle.accepting_writes() {
            let applied = inner.store.apply_volume_samples(&demux_volumes(&result.latest));
            debug!(id = %fs_id, volumes = applied, "volume metrics refreshed");
        }
    }

    /// CPU per metadata server. Discovery runs until it finds servers,
    /// then the list is reused.
    async fn refresh_metadata_servers(&self) {
        let inner = &self.inner;
        let fs_id = inner.file_system_id.as_str();
        let api = inner.metrics_api.as_ref();

        let cached = inner
            .metadata_servers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let servers = if let Some(servers) = cached {
            servers
        } else {
            match discover_file_servers(api, fs_id).await {
                Ok(servers) if servers.is_empty() => return,
                Ok(servers) => {
                    *inner
                        .metadata_servers
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(servers.clone());
                    servers
                }
                Err(e) => {
                    warn!(id = %fs_id, error = %e, "failed to discover metadata servers");
                    return;
                }
            }
        };

        match file_server_cpu(api, &inner.batcher, fs_id, &servers).await {
            Ok(readings) if inner.lifecycle.accepting_writes() => {
                for (id, cpu_utilization) in readings {
                    inner.store.upsert_metadata_server(MetadataServer {
                        id,
                        file_system_id: fs_id.to_owned(),
                        cpu_utilization,
                    });
                }
            }
            Ok(_) => {}
            Err(e) => warn!(id = %fs_id, error = %e, "failed to fetch metadata server CPU"),
        }
    }
}
