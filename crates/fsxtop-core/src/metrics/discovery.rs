// ── Lustre file-server discovery ──
//
// Lustre publishes CPU per file server (`FileServer` dimension) rather
// than per file system. Servers have to be enumerated first, then
// queried, and the file-system figure is the mean across servers.

use std::collections::HashMap;

use fsxtop_api::{Dimension, MetricsApi};

use super::batch::MetricBatcher;
use super::queries::{CPU_UTILIZATION, FILE_SERVER, file_server_cpu_queries};
use super::{MetricKind, parse_label};

/// File servers that have published CPU for `file_system_id`, sorted.
pub async fn discover_file_servers(
    api: &dyn MetricsApi,
    file_system_id: &str,
) -> Result<Vec<String>, fsxtop_api::Error> {
    let filter = [Dimension::new("FileSystemId", file_system_id)];
    let mut servers = api
        .list_dimension_values(CPU_UTILIZATION, &filter, FILE_SERVER)
        .await?;
    servers.sort();
    servers.dedup();
    Ok(servers)
}

/// Latest CPU per server. Servers without data are absent.
///
/// Errors only when every batch failed.
pub async fn file_server_cpu(
    api: &dyn MetricsApi,
    batcher: &MetricBatcher,
    file_system_id: &str,
    servers: &[String],
) -> Result<HashMap<String, f64>, fsxtop_api::Error> {
    let mut result = batcher
        .execute(api, file_server_cpu_queries(file_system_id, servers))
        .await;

    if !result.any_succeeded() {
        if let Some(err) = result.errors.pop() {
            return Err(err);
        }
    }

    Ok(result
        .latest
        .into_iter()
        .filter_map(|(label, value)| match parse_label(&label) {
            Some((server, MetricKind::Cpu)) => Some((server.to_owned(), value)),
            _ => None,
        })
        .collect())
}

/// File-system CPU for Lustre: discover the servers, query each, and
/// average. `Ok(None)` when no server has published data.
pub async fn mean_file_server_cpu(
    api: &dyn MetricsApi,
    batcher: &MetricBatcher,
    file_system_id: &str,
) -> Result<Option<f64>, fsxtop_api::Error> {
    let servers = discover_file_servers(api, file_system_id).await?;
    if servers.is_empty() {
        return Ok(None);
    }
    let cpu = file_server_cpu(api, batcher, file_system_id, &servers).await?;
    Ok(mean(cpu.into_values()))
}

/// Arithmetic mean, `None` for an empty input.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_values() {
        assert_eq!(mean([10.0, 20.0, 60.0]), Some(30.0));
        assert_eq!(mean(Vec::<f64>::new()), None);
    }
}
