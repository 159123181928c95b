// ── Backend record conversion ──
//
// Maps `fsxtop_api` wire records into domain types. Records with a file
// system type outside the four known families are rejected so callers
// can skip them.

use fsxtop_api::{FileSystemRecord, VolumeRecord};

use crate::error::CoreError;
use crate::model::{ResourceKind, ResourceSpec, StorageTier, VolumeSpec};

fn parse_kind(raw: &str) -> Result<ResourceKind, CoreError> {
    raw.parse().map_err(|_| CoreError::UnsupportedKind {
        kind: raw.to_owned(),
    })
}

impl TryFrom<&FileSystemRecord> for ResourceSpec {
    type Error = CoreError;

    fn try_from(record: &FileSystemRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            kind: parse_kind(&record.file_system_type)?,
            capacity_gib: record.storage_capacity_gib,
            creation_time: record.creation_time,
            lifecycle: record.lifecycle.clone(),
            tier: StorageTier {
                deployment_type: record.deployment_type.clone(),
                storage_class: record.storage_type.parse().unwrap_or_default(),
                throughput_capacity: record.throughput_capacity,
                provisioned_iops: record.provisioned_iops,
            },
        })
    }
}

impl TryFrom<&VolumeRecord> for VolumeSpec {
    type Error = CoreError;

    fn try_from(record: &VolumeRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            file_system_id: record.file_system_id.clone(),
            kind: parse_kind(&record.volume_type)?,
            capacity_gib: record.storage_capacity_gib,
        })
    }
}
