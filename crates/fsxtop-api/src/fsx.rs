// ── FSx resource client ──
//
// `ResourceApi` backed by the AWS FSx control plane. Responses are
// flattened into `FileSystemRecord` / `VolumeRecord` here so nothing
// above this module sees SDK types.

use async_trait::async_trait;
use aws_sdk_fsx::Client;
use aws_sdk_fsx::types::{FileSystem, Volume, VolumeFilter, VolumeFilterName};
use aws_types::SdkConfig;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ResourceApi;
use crate::error::{Error, from_sdk};
use crate::types::{FileSystemRecord, VolumeRecord};

/// Thin wrapper over the FSx SDK client.
#[derive(Clone, Debug)]
pub struct FsxClient {
    client: Client,
}

impl FsxClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Wrap an already-configured SDK client (custom endpoint, test credentials).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceApi for FsxClient {
    async fn list_file_systems(&self, kind: Option<&str>) -> Result<Vec<FileSystemRecord>, Error> {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_file_systems()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| from_sdk("DescribeFileSystems", &e))?;

            records.extend(
                output
                    .file_systems()
                    .iter()
                    .map(file_system_record)
                    .filter(|r| kind.is_none_or(|k| r.file_system_type.eq_ignore_ascii_case(k))),
            );

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => break,
            }
        }

        debug!(count = records.len(), "listed file systems");
        Ok(records)
    }

    async fn get_file_system(&self, id: &str) -> Result<Option<FileSystemRecord>, Error> {
        let result = self
            .client
            .describe_file_systems()
            .file_system_ids(id)
            .send()
            .await;

        match result {
            Ok(output) => Ok(output.file_systems().first().map(file_system_record)),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|svc| svc.is_file_system_not_found()) =>
            {
                Ok(None)
            }
            Err(e) => Err(from_sdk("DescribeFileSystems", &e)),
        }
    }

    async fn list_volumes(&self, file_system_id: &str) -> Result<Vec<VolumeRecord>, Error> {
        let filter = VolumeFilter::builder()
            .name(VolumeFilterName::FileSystemId)
            .values(file_system_id)
            .build();

        let mut records = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_volumes()
                .filters(filter.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| from_sdk("DescribeVolumes", &e))?;

            records.extend(output.volumes().iter().map(volume_record));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => break,
            }
        }

        debug!(file_system_id, count = records.len(), "listed volumes");
        Ok(records)
    }
}

// ── Conversion ──────────────────────────────────────────────────────

/// Tier defaults applied when the backend omits the deployment type.
const DEFAULT_DEPLOYMENT: &str = "SINGLE_AZ_1";
const DEFAULT_LUSTRE_DEPLOYMENT: &str = "SCRATCH_1";

/// Flatten an SDK `FileSystem` into a backend-neutral record.
pub fn file_system_record(fs: &FileSystem) -> FileSystemRecord {
    let id = fs.file_system_id().unwrap_or_default().to_owned();
    let name = fs
        .tags()
        .iter()
        .find(|t| t.key() == Some("Name"))
        .and_then(|t| t.value())
        .map_or_else(|| id.clone(), str::to_owned);
    let file_system_type = fs
        .file_system_type()
        .map(|t| t.as_str().to_owned())
        .unwrap_or_default();
    let base_storage_type = fs
        .storage_type()
        .map_or("SSD", |t| t.as_str())
        .to_owned();

    let tier = extract_tier(fs, &file_system_type, &base_storage_type);

    FileSystemRecord {
        name,
        file_system_type,
        storage_capacity_gib: fs.storage_capacity().map_or(0, i64::from),
        creation_time: fs.creation_time().map_or(DateTime::<Utc>::UNIX_EPOCH, |t| {
            DateTime::from_timestamp(t.secs(), t.subsec_nanos()).unwrap_or_default()
        }),
        lifecycle: fs
            .lifecycle()
            .map(|l| l.as_str().to_owned())
            .unwrap_or_default(),
        deployment_type: tier.deployment_type,
        storage_type: tier.storage_type,
        throughput_capacity: tier.throughput_capacity,
        provisioned_iops: tier.provisioned_iops,
        id,
    }
}

struct TierConfig {
    deployment_type: String,
    storage_type: String,
    throughput_capacity: i64,
    provisioned_iops: i64,
}

fn extract_tier(fs: &FileSystem, file_system_type: &str, storage_type: &str) -> TierConfig {
    let mut tier = TierConfig {
        deployment_type: DEFAULT_DEPLOYMENT.to_owned(),
        storage_type: storage_type.to_owned(),
        throughput_capacity: 0,
        provisioned_iops: 0,
    };

    match file_system_type {
        "ONTAP" => {
            if let Some(cfg) = fs.ontap_configuration() {
                if let Some(d) = cfg.deployment_type() {
                    d.as_str().clone_into(&mut tier.deployment_type);
                }
                tier.throughput_capacity = cfg
                    .throughput_capacity()
                    .or(cfg.throughput_capacity_per_ha_pair())
                    .map_or(0, i64::from);
                tier.provisioned_iops = cfg
                    .disk_iops_configuration()
                    .and_then(|d| d.iops())
                    .unwrap_or(0);
            }
            "SSD".clone_into(&mut tier.storage_type);
        }
        "OPENZFS" => {
            if let Some(cfg) = fs.open_zfs_configuration() {
                if let Some(d) = cfg.deployment_type() {
                    d.as_str().clone_into(&mut tier.deployment_type);
                }
                tier.throughput_capacity = cfg.throughput_capacity().map_or(0, i64::from);
                tier.provisioned_iops = cfg
                    .disk_iops_configuration()
                    .and_then(|d| d.iops())
                    .unwrap_or(0);
            }
            "SSD".clone_into(&mut tier.storage_type);
        }
        "WINDOWS" => {
            if let Some(cfg) = fs.windows_configuration() {
                if let Some(d) = cfg.deployment_type() {
                    d.as_str().clone_into(&mut tier.deployment_type);
                }
                tier.throughput_capacity = cfg.throughput_capacity().map_or(0, i64::from);
                tier.provisioned_iops = cfg
                    .disk_iops_configuration()
                    .and_then(|d| d.iops())
                    .unwrap_or(0);
            }
        }
        "LUSTRE" => {
            DEFAULT_LUSTRE_DEPLOYMENT.clone_into(&mut tier.deployment_type);
            if let Some(cfg) = fs.lustre_configuration() {
                if let Some(d) = cfg.deployment_type() {
                    d.as_str().clone_into(&mut tier.deployment_type);
                }
                tier.throughput_capacity = cfg.per_unit_storage_throughput().map_or(0, i64::from);
                tier.provisioned_iops = cfg
                    .metadata_configuration()
                    .and_then(|m| m.iops())
                    .map_or(0, i64::from);
            }
            if tier.deployment_type.contains("HDD") {
                "HDD".clone_into(&mut tier.storage_type);
            }
        }
        _ => {}
    }

    tier
}

/// Flatten an SDK `Volume` into a backend-neutral record.
pub fn volume_record(volume: &Volume) -> VolumeRecord {
    let id = volume.volume_id().unwrap_or_default().to_owned();
    let volume_type = volume
        .volume_type()
        .map(|t| t.as_str().to_owned())
        .unwrap_or_default();

    let storage_capacity_gib = if let Some(ontap) = volume.ontap_configuration() {
        ontap.size_in_megabytes().map_or(0, |mb| i64::from(mb) / 1024)
    } else if let Some(zfs) = volume.open_zfs_configuration() {
        zfs.storage_capacity_quota_gib()
            .or(zfs.storage_capacity_reservation_gib())
            .map_or(0, i64::from)
    } else {
        0
    };

    VolumeRecord {
        name: volume.name().map_or_else(|| id.clone(), str::to_owned),
        file_system_id: volume.file_system_id().unwrap_or_default().to_owned(),
        volume_type,
        storage_capacity_gib,
        id,
    }
}
