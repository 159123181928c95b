// ── Summary-mode controller ──

use std::collections::HashSet;
use std::sync::Arc;

use fsxtop_api::{MetricsApi, ResourceApi};
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use super::{Lifecycle, LifecycleState, MAX_CONCURRENT_FETCHES, poll_loop};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::metrics::{
    MetricBatcher, MetricTarget, demux_resources, mean_file_server_cpu, resource_queries,
};
use crate::model::{Resource, ResourceSpec};
use crate::pricing::PricingEngine;
use crate::store::{ResourceFilter, ResourceSnapshot, ResourceStore};
use crate::stream::{ChangeSignal, ChangeStream};

/// Watches every file system in one region.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. [`start()`](Self::start)
/// loads the listing synchronously, then hands off to a listing loop and a
/// metrics loop that write into the [`ResourceStore`] and fire the change
/// signal after each write.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    resource_api: Arc<dyn ResourceApi>,
    metrics_api: Arc<dyn MetricsApi>,
    store: Arc<ResourceStore>,
    pricing: PricingEngine,
    batcher: MetricBatcher,
    signal: ChangeSignal,
    lifecycle: Lifecycle,
}

impl Controller {
    /// Build an idle controller. Nothing is fetched until `start()`.
    pub fn new(
        config: ControllerConfig,
        resource_api: Arc<dyn ResourceApi>,
        metrics_api: Arc<dyn MetricsApi>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let pricing = PricingEngine::new(config.region.clone());
        if !pricing.supports_region() {
            warn!(region = %config.region, "no pricing data for region; costs will be blank");
        }
        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                resource_api,
                metrics_api,
                store: Arc::new(ResourceStore::new()),
                pricing,
                batcher: MetricBatcher::new(),
                signal: ChangeSignal::new(),
                lifecycle: Lifecycle::new(),
            }),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.inner.store
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.lifecycle.state()
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> ChangeStream {
        self.inner.signal.subscribe()
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        self.inner.store.snapshot()
    }

    /// Hide resources that do not match `filter` without refetching.
    pub fn set_visibility(&self, filter: &ResourceFilter) {
        self.inner.store.apply_filter(filter);
        self.inner.signal.notify();
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the listing, then start the background loops.
    ///
    /// Returns once the first snapshot is available; metrics arrive
    /// asynchronously. A no-op when already running or stopped.
    pub async fn start(&self) {
        let inner = &self.inner;
        if !inner.lifecycle.begin() {
            return;
        }
        info!(region = %inner.config.region, "starting controller");

        self.refresh_resources().await;

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
                    async move { ctrl.refresh_resources().await }
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
    }

    /// Stop both loops. Safe to call more than once.
    pub async fn stop(&self) {
        self.inner.lifecycle.shutdown().await;
        info!("controller stopped");
    }

    // ── Listing refresh ──────────────────────────────────────────────

    /// List file systems, reconcile the store against the result, and
    /// reprice. On failure the store is left untouched.
    pub async fn refresh_resources(&self) {
        if let Err(e) = self.sync_resources().await {
            warn!(error = %e, "failed to refresh file systems");
        }
    }

    /// One listing pass and one metrics pass without starting the loops.
    ///
    /// Unlike the background refresh, a failed listing is returned.
    pub async fn refresh_once(&self) -> Result<ResourceSnapshot, CoreError> {
        self.sync_resources().await?;
        self.refresh_metrics().await;
        Ok(self.snapshot())
    }

    async fn sync_resources(&self) -> Result<(), fsxtop_api::Error> {
        let inner = &self.inner;
        let kind = inner.config.kind_filter.map(|k| k.to_string());

        let records = inner.resource_api.list_file_systems(kind.as_deref()).await?;
        if !inner.lifecycle.accepting_writes() {
            return Ok(());
        }

        let filter = inner.config.filter();
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            let spec = match ResourceSpec::try_from(record) {
                Ok(spec) => spec,
                Err(e) => {
                    debug!(id = %record.id, error = %e, "skipping file system");
                    continue;
                }
            };
            let resource = Resource::new(spec);
            if !filter.matches(&resource) {
                continue;
            }
            seen.insert(resource.id().to_owned());
            inner.store.upsert(resource);
        }

        let mut removed = 0_usize;
        for id in inner.store.ids() {
            if !seen.contains(&id) && inner.store.delete(&id) {
                removed += 1;
            }
        }

        self.reprice();
        debug!(listed = seen.len(), removed, "file systems refreshed");
        inner.signal.notify();
        Ok(())
    }

    // ── Metrics refresh ──────────────────────────────────────────────

    /// Fetch metrics for every known file system in as few batches as
    /// possible, then the per-server Lustre CPU round trip.
    ///
    /// The Lustre pass fires its own, later notification.
    pub async fn refresh_metrics(&self) {
        let inner = &self.inner;
        let mut targets = Vec::with_capacity(inner.store.len());
        inner
            .store
            .for_each(|r| targets.push(MetricTarget::from(&*r)));
        if targets.is_empty() {
            return;
        }
        targets.sort_by(|a, b| a.id.cmp(&b.id));

        let groups = targets.iter().map(resource_queries).collect();
        let result = inner
            .batcher
            .execute(inner.metrics_api.as_ref(), groups)
            .await;

        if result.any_succeeded() && inner.lifecycle.accepting_writes() {
            for (id, sample) in demux_resources(&targets, &result.latest) {
                inner.store.update(&id, |r| sample.apply(&mut r.metrics));
            }
            self.reprice();
            inner.signal.notify();
        }

        let lustre: Vec<String> = targets
            .into_iter()
            .filter(|t| t.kind.cpu_needs_discovery())
            .map(|t| t.id)
            .collect();
        if !lustre.is_empty() {
            self.refresh_file_server_cpu(lustre).await;
        }
    }

    /// Per-file-system CPU for families that only publish it per server.
    /// Each fetch fails alone; one notification covers the whole pass.
    async fn refresh_file_server_cpu(&self, ids: Vec<String>) {
        let inner = &self.inner;

        let readings: Vec<(String, f64)> = futures_util::stream::iter(ids)
            .map(|id| {
                let api = Arc::clone(&inner.metrics_api);
                let batcher = inner.batcher.clone();
                async move {
                    match mean_file_server_cpu(api.as_ref(), &batcher, &id).await {
                        Ok(cpu) => cpu.filter(|c| *c > 0.0).map(|c| (id, c)),
                        Err(e) => {
                            warn!(id = %id, error = %e, "failed to fetch file server CPU");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_FETCHES)
            .filter_map(std::future::ready)
            .collect()
            .await;

        if readings.is_empty() || !inner.lifecycle.accepting_writes() {
            return;
        }
        for (id, cpu) in &readings {
            inner.store.update(id, |r| r.metrics.cpu_utilization = *cpu);
        }
        inner.signal.notify();
    }

    fn reprice(&self) {
        let pricing = &self.inner.pricing;
        self.inner.store.for_each(|r| pricing.apply(r));
    }
}
