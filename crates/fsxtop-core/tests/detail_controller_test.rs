#![allow(clippy::unwrap_used)]

mod support;

use std::sync::Arc;
use std::time::Duration;

use fsxtop_core::{ControllerConfig, CoreError, DetailController, LifecycleState};
use pretty_assertions::assert_eq;
use support::{FakeMetrics, FakeResources, GIB, file_system, volume};

const REFRESH: Duration = Duration::from_secs(30);
const METRICS: Duration = Duration::from_secs(10);

fn detail(
    id: &str,
    resources: &Arc<FakeResources>,
    metrics: &Arc<FakeMetrics>,
) -> DetailController {
    let config = ControllerConfig::new("us-east-1").with_intervals(REFRESH, METRICS);
    DetailController::new(config, id, resources.clone(), metrics.clone()).unwrap()
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn missing_file_system_fails_start() {
    let resources = FakeResources::new(vec![file_system("fs-1", "ONTAP", 100)]);
    let metrics = FakeMetrics::new();
    let ctrl = detail("fs-404", &resources, &metrics);

    let err = ctrl.start().await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, CoreError::ResourceNotFound { ref id } if id == "fs-404"));
    assert_eq!(ctrl.state(), LifecycleState::Stopped);
    assert!(ctrl.snapshot().resource.is_none());
}

#[tokio::test(start_paused = true)]
async fn lookup_error_at_start_is_reported_as_not_found() {
    let resources = FakeResources::new(vec![file_system("fs-1", "ONTAP", 100)]);
    resources.fail_get(true);
    let metrics = FakeMetrics::new();
    let ctrl = detail("fs-1", &resources, &metrics);

    assert!(ctrl.start().await.unwrap_err().is_not_found());
}

#[tokio::test(start_paused = true)]
async fn ontap_detail_tracks_volumes_and_pool_usage() {
    let resources = FakeResources::new(vec![file_system("fs-1", "ONTAP", 1024)]);
    resources.set_volumes(
        "fs-1",
        vec![volume("fsvol-2", "fs-1", 50), volume("fsvol-1", "fs-1", 100)],
    );
    let metrics = FakeMetrics::new();
    metrics.set("fs-1", "storage_used", 512.0 * GIB);
    metrics.set("fs-1", "pool_usage", 100.0 * GIB);
    metrics.set("fsvol-1", "storage_used", 40.2 * GIB);
    metrics.set("fsvol-1", "storage_capacity", 120.0 * GIB);
    metrics.set("fsvol-2", "write_ops", 120.0);

    let ctrl = detail("fs-1", &resources, &metrics);
    let mut changes = ctrl.subscribe();
    ctrl.start().await.unwrap();
    assert!(changes.changed().await);

    assert!(ctrl.snapshot().resource.unwrap().has_price());

    settle().await;
    let snap = ctrl.snapshot();
    let resource = snap.resource.unwrap();
    assert_eq!(resource.used_capacity_gib(), 512);
    assert_eq!(resource.metrics.pool_usage_gib, Some(100.0));
    let pool_cost = resource.price_breakdown().unwrap().capacity_pool;
    assert!((pool_cost - 2.19).abs() < 1e-9);

    let ids: Vec<_> = snap.volumes.iter().map(|v| v.id()).collect();
    assert_eq!(ids, ["fsvol-1", "fsvol-2"]);
    assert_eq!(snap.volumes[0].capacity_gib(), 120);
    assert_eq!(snap.volumes[0].used_capacity_gib(), 40);
    assert_eq!(snap.volumes[1].metrics.write_iops, 2.0);
    assert!(snap.metadata_servers.is_empty());

    ctrl.stop().await;
}

#[tokio::test(start_paused = true)]
async fn load_once_resolves_and_fetches_metrics() {
    let resources = FakeResources::new(vec![file_system("fs-1", "OPENZFS", 256)]);
    resources.set_volumes("fs-1", vec![volume("fsvol-1", "fs-1", 64)]);
    let metrics = FakeMetrics::new();
    metrics.set("fs-1", "used_storage", 128.0 * GIB);
    metrics.set("fsvol-1", "used_storage", 16.0 * GIB);

    let ctrl = detail("fs-1", &resources, &metrics);
    let snap = ctrl.load_once().await.unwrap();
    assert_eq!(ctrl.state(), LifecycleState::Idle);
    assert_eq!(snap.resource.unwrap().used_capacity_gib(), 128);
    assert_eq!(snap.volumes[0].used_capacity_gib(), 16);

    tokio::time::sleep(REFRESH * 2).await;
    assert_eq!(resources.get_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn load_once_reports_missing_file_system() {
    let resources = FakeResources::new(Vec::new());
    let metrics = FakeMetrics::new();
    let ctrl = detail("fs-404", &resources, &metrics);

    assert!(ctrl.load_once().await.unwrap_err().is_not_found());
}

#[tokio::test(start_paused = true)]
async fn volume_listing_failure_still_refreshes_known_volumes() {
    let resources = FakeResources::new(vec![file_system("fs-1", "ONTAP", 1024)]);
    resources.set_volumes("fs-1", vec![volume("fsvol-1", "fs-1", 100)]);
    let metrics = FakeMetrics::new();

    let ctrl = detail("fs-1", &resources, &metrics);
    ctrl.start().await.unwrap();
    settle().await;
    assert_eq!(ctrl.snapshot().volumes.len(), 1);

    resources.fail_listing(true);
    metrics.set("fsvol-1", "read_ops", 60.0);
    tokio::time::sleep(METRICS + Duration::from_secs(1)).await;

    let snap = ctrl.snapshot();
    assert_eq!(snap.volumes[0].metrics.read_iops, 1.0);
    ctrl.stop().await;
}

#[tokio::test(start_paused = true)]
async fn lustre_detail_tracks_metadata_servers() {
    let resources = FakeResources::new(vec![file_system("fs-l", "LUSTRE", 2400)]);
    let metrics = FakeMetrics::new();
    metrics.set_server_cpu("fs-l", "MDS0001", 30.0);
    metrics.set_server_cpu("fs-l", "MDS0000", 10.0);

    let ctrl = detail("fs-l", &resources, &metrics);
    ctrl.start().await.unwrap();
    settle().await;

    let snap = ctrl.snapshot();
    let servers: Vec<_> = snap
        .metadata_servers
        .iter()
        .map(|s| (s.id.as_str(), s.cpu_utilization))
        .collect();
    assert_eq!(servers, [("MDS0000", 10.0), ("MDS0001", 30.0)]);
    assert!(snap.metadata_servers.iter().all(|s| s.file_system_id == "fs-l"));
    assert_eq!(snap.resource.unwrap().metrics.cpu_utilization, 20.0);
    assert!(snap.volumes.is_empty());

    // One more cycle: the metadata-server list is reused, only the
    // file-system CPU mean discovers again.
    let before = metrics.discovery_calls();
    metrics.set_server_cpu("fs-l", "MDS0000", 50.0);
    tokio::time::sleep(METRICS + Duration::from_secs(1)).await;
    assert_eq!(metrics.discovery_calls(), before + 1);

    let servers = ctrl.store().metadata_servers();
    assert_eq!(servers[0].cpu_utilization, 50.0);
    ctrl.stop().await;
}

#[tokio::test(start_paused = true)]
async fn vanished_file_system_keeps_last_known_state() {
    let resources = FakeResources::new(vec![file_system("fs-1", "WINDOWS", 300)]);
    let metrics = FakeMetrics::new();
    metrics.set("fs-1", "free_capacity", 100.0 * GIB);

    let ctrl = detail("fs-1", &resources, &metrics);
    ctrl.start().await.unwrap();
    settle().await;

    resources.set_file_systems(Vec::new());
    tokio::time::sleep(REFRESH + Duration::from_secs(1)).await;

    let resource = ctrl.store().resource().unwrap();
    assert_eq!(resource.id(), "fs-1");
    assert_eq!(resource.used_capacity_gib(), 200);
    ctrl.stop().await;
}

#[tokio::test(start_paused = true)]
async fn listing_refresh_merges_configuration() {
    let resources = FakeResources::new(vec![file_system("fs-1", "ONTAP", 1024)]);
    let metrics = FakeMetrics::new();
    metrics.set("fs-1", "storage_used", 512.0 * GIB);

    let ctrl = detail("fs-1", &resources, &metrics);
    ctrl.start().await.unwrap();
    settle().await;
    let before = ctrl.store().resource().unwrap().monthly_price();

    metrics.fail_batches(true);
    resources.set_file_systems(vec![file_system("fs-1", "ONTAP", 2048)]);
    tokio::time::sleep(REFRESH + Duration::from_secs(1)).await;

    let resource = ctrl.store().resource().unwrap();
    assert_eq!(resource.capacity_gib(), 2048);
    assert_eq!(resource.used_capacity_gib(), 512);
    assert!(resource.monthly_price() > before);
    ctrl.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_discards_late_results() {
    let resources = FakeResources::new(vec![file_system("fs-1", "ONTAP", 1024)]);
    let metrics = FakeMetrics::new();
    let ctrl = detail("fs-1", &resources, &metrics);
    ctrl.start().await.unwrap();
    ctrl.stop().await;
    assert_eq!(ctrl.state(), LifecycleState::Stopped);

    metrics.set("fs-1", "storage_used", 512.0 * GIB);
    tokio::time::sleep(METRICS * 3).await;
    assert_eq!(ctrl.store().resource().unwrap().used_capacity_gib(), 0);
}
