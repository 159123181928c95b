// ── Query builders ──

use fsxtop_api::{Dimension, MetricQuery, Statistic};

use super::{MetricKind, PERIOD_SECS, label};
use crate::model::{Resource, ResourceKind};

const FILE_SYSTEM_ID: &str = "FileSystemId";
const VOLUME_ID: &str = "VolumeId";
pub(crate) const FILE_SERVER: &str = "FileServer";
pub(crate) const CPU_UTILIZATION: &str = "CPUUtilization";

/// The slice of a resource the batcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricTarget {
    pub id: String,
    pub kind: ResourceKind,
    pub capacity_gib: i64,
}

impl From<&Resource> for MetricTarget {
    fn from(r: &Resource) -> Self {
        Self {
            id: r.id().to_owned(),
            kind: r.kind(),
            capacity_gib: r.capacity_gib(),
        }
    }
}

fn query(
    id: &str,
    kind: MetricKind,
    metric_name: &str,
    dimensions: Vec<Dimension>,
    statistic: Statistic,
) -> MetricQuery {
    MetricQuery {
        label: label(id, kind),
        metric_name: metric_name.to_owned(),
        dimensions,
        period_secs: PERIOD_SECS,
        statistic,
    }
}

/// Queries for one file system: four I/O metrics common to every family,
/// plus the family's capacity signal and, where published per file
/// system, CPU.
pub fn resource_queries(target: &MetricTarget) -> Vec<MetricQuery> {
    let id = target.id.as_str();
    let dims = || vec![Dimension::new(FILE_SYSTEM_ID, id)];

    let mut queries = vec![
        query(id, MetricKind::ReadBytes, "DataReadBytes", dims(), Statistic::Average),
        query(id, MetricKind::WriteBytes, "DataWriteBytes", dims(), Statistic::Average),
        query(id, MetricKind::ReadOps, "DataReadOperations", dims(), Statistic::Average),
        query(id, MetricKind::WriteOps, "DataWriteOperations", dims(), Statistic::Average),
    ];

    match target.kind {
        ResourceKind::Lustre => {
            queries.push(query(
                id,
                MetricKind::FreeCapacity,
                "FreeDataStorageCapacity",
                dims(),
                Statistic::Sum,
            ));
        }
        ResourceKind::Windows => {
            queries.push(query(
                id,
                MetricKind::FreeCapacity,
                "FreeStorageCapacity",
                dims(),
                Statistic::Average,
            ));
        }
        ResourceKind::Ontap => {
            queries.push(query(
                id,
                MetricKind::StorageUsed,
                "StorageUsed",
                dims(),
                Statistic::Average,
            ));
        }
        ResourceKind::OpenZfs => {
            queries.push(query(
                id,
                MetricKind::UsedStorage,
                "UsedStorageCapacity",
                dims(),
                Statistic::Average,
            ));
        }
    }

    if !target.kind.cpu_needs_discovery() {
        queries.push(query(id, MetricKind::Cpu, CPU_UTILIZATION, dims(), Statistic::Average));
    }

    queries
}

/// ONTAP capacity-pool usage, requested only when a single file system
/// is being watched.
pub fn pool_usage_query(file_system_id: &str) -> MetricQuery {
    query(
        file_system_id,
        MetricKind::PoolUsage,
        "StorageUsed",
        vec![
            Dimension::new(FILE_SYSTEM_ID, file_system_id),
            Dimension::new("StorageTier", "StandardCapacityPool"),
            Dimension::new("DataType", "All"),
        ],
        Statistic::Average,
    )
}

/// Seven queries per volume: I/O totals plus every capacity signal the
/// two volume-bearing families publish.
pub fn volume_queries(file_system_id: &str, volume_id: &str) -> Vec<MetricQuery> {
    let dims = || {
        vec![
            Dimension::new(FILE_SYSTEM_ID, file_system_id),
            Dimension::new(VOLUME_ID, volume_id),
        ]
    };

    vec![
        query(volume_id, MetricKind::ReadBytes, "DataReadBytes", dims(), Statistic::Sum),
        query(volume_id, MetricKind::WriteBytes, "DataWriteBytes", dims(), Statistic::Sum),
        query(volume_id, MetricKind::ReadOps, "DataReadOperations", dims(), Statistic::Sum),
        query(volume_id, MetricKind::WriteOps, "DataWriteOperations", dims(), Statistic::Sum),
        query(volume_id, MetricKind::StorageUsed, "StorageUsed", dims(), Statistic::Average),
        query(
            volume_id,
            MetricKind::StorageCapacity,
            "StorageCapacity",
            dims(),
            Statistic::Average,
        ),
        query(
            volume_id,
            MetricKind::UsedStorage,
            "UsedStorageCapacity",
            dims(),
            Statistic::Average,
        ),
    ]
}

/// One CPU query per Lustre file server, labeled by server id.
pub fn file_server_cpu_queries(file_system_id: &str, servers: &[String]) -> Vec<Vec<MetricQuery>> {
    servers
        .iter()
        .map(|server| {
            vec![query(
                server,
                MetricKind::Cpu,
                CPU_UTILIZATION,
                vec![
                    Dimension::new(FILE_SYSTEM_ID, file_system_id),
                    Dimension::new(FILE_SERVER, server.as_str()),
                ],
                Statistic::Average,
            )]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn target(kind: ResourceKind) -> MetricTarget {
        MetricTarget {
            id: "fs-1".into(),
            kind,
            capacity_gib: 1024,
        }
    }

    #[test]
    fn per_family_query_counts() {
        let counts: Vec<_> = ResourceKind::iter()
            .map(|k| (k, resource_queries(&target(k)).len()))
            .collect();
        assert_eq!(
            counts,
            [
                (ResourceKind::Lustre, 5),
                (ResourceKind::Windows, 6),
                (ResourceKind::Ontap, 6),
                (ResourceKind::OpenZfs, 6),
            ]
        );
    }

    #[test]
    fn ontap_labels() {
        let labels: Vec<_> = resource_queries(&target(ResourceKind::Ontap))
            .into_iter()
            .map(|q| q.label)
            .collect();
        insta::assert_snapshot!(labels.join("\n"), @r"
        fs-1|read_bytes
        fs-1|write_bytes
        fs-1|read_ops
        fs-1|write_ops
        fs-1|storage_used
        fs-1|cpu
        ");
    }

    #[test]
    fn lustre_free_capacity_uses_sum() {
        let queries = resource_queries(&target(ResourceKind::Lustre));
        let free = queries
            .iter()
            .find(|q| q.metric_name == "FreeDataStorageCapacity");
        assert!(matches!(free, Some(q) if q.statistic == Statistic::Sum));
        assert!(queries.iter().all(|q| q.metric_name != CPU_UTILIZATION));
    }

    #[test]
    fn volume_queries_carry_both_dimensions() {
        let queries = volume_queries("fs-1", "fsvol-9");
        assert_eq!(queries.len(), 7);
        for q in &queries {
            assert_eq!(q.dimensions.len(), 2);
            assert!(q.label.starts_with("fsvol-9|"));
        }
    }

    #[test]
    fn file_server_queries_are_one_group_per_server() {
        let servers = vec!["MDS0000".to_owned(), "MDS0001".to_owned()];
        let groups = file_server_cpu_queries("fs-1", &servers);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1][0].label, "MDS0001|cpu");
    }
}
