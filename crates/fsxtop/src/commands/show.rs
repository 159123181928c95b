//! `fsxtop show`: one file system with its volumes or metadata servers.

use std::sync::Arc;

use tabled::Tabled;

use fsxtop_config::{Config, ConfigOverrides};
use fsxtop_core::view::{self, SortSpec, VolumeSortField};
use fsxtop_core::{DetailController, DetailSnapshot, MetadataServer, Resource, Volume};

use crate::cli::{GlobalOpts, OutputFormat, ShowArgs};
use crate::config::{self, Loaded};
use crate::error::CliError;
use crate::output::{self, Style};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct VolumeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Capacity")]
    capacity: String,
    #[tabled(rename = "Read IOPS")]
    read_iops: String,
    #[tabled(rename = "Write IOPS")]
    write_iops: String,
    #[tabled(rename = "Read MB/s")]
    read_throughput: String,
    #[tabled(rename = "Write MB/s")]
    write_throughput: String,
}

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "Metadata server")]
    id: String,
    #[tabled(rename = "CPU")]
    cpu: String,
}

// ── Rendering ───────────────────────────────────────────────────────

struct DetailView {
    format: OutputFormat,
    style: Style,
    pricing: bool,
    sort: SortSpec<VolumeSortField>,
    page_size: usize,
    page: usize,
}

impl DetailView {
    fn new(config: &Config, global: &GlobalOpts, page: usize) -> Self {
        Self {
            format: global.output,
            style: Style::parse(&config.style, output::should_color(global.no_color)),
            pricing: !config.disable_pricing,
            sort: config.sort.parse().unwrap_or_default(),
            page_size: config.page_size,
            page,
        }
    }

    fn render(&self, mut snapshot: DetailSnapshot) -> Result<String, CliError> {
        view::sort_volumes(&mut snapshot.volumes, self.sort);
        match self.format {
            OutputFormat::Json => output::render_json(&snapshot),
            OutputFormat::Plain => {
                let ids = snapshot.resource.iter().map(|r| r.id().to_owned());
                let children = snapshot
                    .volumes
                    .iter()
                    .map(|v| v.id().to_owned())
                    .chain(snapshot.metadata_servers.iter().map(|s| s.id.clone()));
                Ok(ids.chain(children).collect::<Vec<_>>().join("\n"))
            }
            OutputFormat::Table => Ok(self.table(&snapshot)),
        }
    }

    fn table(&self, snapshot: &DetailSnapshot) -> String {
        let Some(resource) = &snapshot.resource else {
            return "Loading...".into();
        };
        let mut sections = vec![self.header(resource)];
        if resource.kind().has_volumes() {
            sections.push(self.volumes(&snapshot.volumes));
        }
        if resource.kind().has_metadata_servers() {
            sections.push(self.metadata_servers(&snapshot.metadata_servers));
        }
        sections.join("\n\n")
    }

    fn header(&self, r: &Resource) -> String {
        let utilization = r.utilization();
        let mut lines = vec![
            format!("ID:          {}", r.id()),
            format!("Name:        {}", r.name()),
            format!("Type:        {}", r.kind().label()),
            format!("Lifecycle:   {}", r.spec.lifecycle),
            format!(
                "Deployment:  {} ({})",
                r.spec.tier.deployment_type, r.spec.tier.storage_class
            ),
            format!(
                "Created:     {}",
                r.spec.creation_time.format("%Y-%m-%d %H:%M UTC")
            ),
            format!(
                "Capacity:    {} {}/{} GiB ({})",
                self.style.bar(utilization, 30),
                r.used_capacity_gib(),
                r.capacity_gib(),
                self.style
                    .paint(&format!("{:.1}%", utilization * 100.0), utilization)
            ),
            format!(
                "Throughput:  read {} / write {} MB/s",
                output::rate(r.metrics.read_throughput, 1),
                output::rate(r.metrics.write_throughput, 1)
            ),
            format!(
                "IOPS:        read {} / write {}",
                output::rate(r.metrics.read_iops, 0),
                output::rate(r.metrics.write_iops, 0)
            ),
            format!("CPU:         {}", output::percent(r.metrics.cpu_utilization)),
        ];
        if let Some(pool) = r.metrics.pool_usage_gib {
            lines.push(format!("Pool usage:  {pool:.1} GiB"));
        }
        if self.pricing {
            lines.push(format!("Cost:        {}", output::monthly_cost(r, true)));
            if let Some(b) = r.price_breakdown() {
                lines.push(format!(
                    "             storage ${:.2}, throughput ${:.2}, iops ${:.2}, capacity pool ${:.2}",
                    b.storage, b.throughput, b.iops, b.capacity_pool
                ));
            }
        }
        lines.join("\n")
    }

    fn volumes(&self, volumes: &[Volume]) -> String {
        if volumes.is_empty() {
            return "No volumes found".into();
        }
        let pages = view::page_count(volumes.len(), self.page_size);
        let page = self.page.clamp(1, pages);
        let rows: Vec<VolumeRow> = view::paginate(volumes, self.page_size, page - 1)
            .iter()
            .map(|v| VolumeRow {
                id: v.id().to_owned(),
                name: output::truncate(v.name(), 24),
                capacity: format!(
                    "{} {}/{} GiB",
                    self.style.bar(v.utilization(), 12),
                    v.used_capacity_gib(),
                    v.capacity_gib()
                ),
                read_iops: output::rate(v.metrics.read_iops, 0),
                write_iops: output::rate(v.metrics.write_iops, 0),
                read_throughput: output::rate(v.metrics.read_throughput, 1),
                write_throughput: output::rate(v.metrics.write_throughput, 1),
            })
            .collect();
        format!(
            "Volumes ({})\n{}\nPage {page}/{pages}",
            volumes.len(),
            output::render_table(&rows)
        )
    }

    fn metadata_servers(&self, servers: &[MetadataServer]) -> String {
        if servers.is_empty() {
            return "No metadata servers reporting".into();
        }
        let rows: Vec<ServerRow> = servers
            .iter()
            .map(|s| ServerRow {
                id: s.id.clone(),
                cpu: format!(
                    "{} {}",
                    self.style.bar(s.cpu_utilization / 100.0, 25),
                    output::percent(s.cpu_utilization)
                ),
            })
            .collect();
        output::render_table(&rows)
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let overrides = ConfigOverrides {
        file_system_id: args.file_system_id,
        ..config::view_overrides(global, &args.view)
    };
    let loaded = Loaded::load(global, &overrides)?;
    let Some(id) = loaded.config.file_system_id.clone() else {
        return Err(CliError::Validation {
            field: "file system id".into(),
            reason: "pass one, or set file_system_id in the config file".into(),
        });
    };

    let controller_config = loaded.controller_config()?;
    let (fsx, cloudwatch) = fsxtop_api::connect(&loaded.session(&controller_config)).await;
    let controller =
        DetailController::new(controller_config, id, Arc::new(fsx), Arc::new(cloudwatch))?;
    let detail_view = DetailView::new(&loaded.config, global, args.view.page);

    if !args.view.watch {
        let snapshot = controller.load_once().await?;
        output::print_output(&detail_view.render(snapshot)?);
        return Ok(());
    }

    let changes = controller.subscribe();
    controller.start().await?;
    let result = super::watch_loop(changes, detail_view.format, || {
        detail_view.render(controller.snapshot())
    })
    .await;
    controller.stop().await;
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fsxtop_core::{PricingBreakdown, ResourceKind, ResourceSpec, StorageTier, VolumeSpec};

    use pretty_assertions::assert_eq;

    use super::*;

    fn detail_view(format: OutputFormat) -> DetailView {
        DetailView {
            format,
            style: Style::parse("", false),
            pricing: true,
            sort: "capacity=dsc".parse().unwrap_or_default(),
            page_size: 10,
            page: 1,
        }
    }

    fn snapshot(kind: ResourceKind) -> DetailSnapshot {
        let mut resource = Resource::new(ResourceSpec {
            id: "fs-1".into(),
            name: "prod".into(),
            kind,
            capacity_gib: 1024,
            creation_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            lifecycle: "AVAILABLE".into(),
            tier: StorageTier {
                deployment_type: "SINGLE_AZ_1".into(),
                ..StorageTier::default()
            },
        });
        resource.metrics.used_capacity_gib = 512;
        resource.set_price(PricingBreakdown {
            storage: 128.0,
            throughput: 92.16,
            iops: 0.0,
            capacity_pool: 2.19,
        });
        let volumes = ["fsvol-1", "fsvol-2"]
            .iter()
            .zip([50, 200])
            .map(|(id, capacity_gib)| {
                Volume::new(VolumeSpec {
                    id: (*id).into(),
                    name: format!("{id}-name"),
                    file_system_id: "fs-1".into(),
                    kind,
                    capacity_gib,
                })
            })
            .collect();
        DetailSnapshot {
            resource: Some(resource),
            volumes,
            metadata_servers: Vec::new(),
        }
    }

    #[test]
    fn table_shows_breakdown_and_sorted_volumes() {
        let out = detail_view(OutputFormat::Table)
            .render(snapshot(ResourceKind::Ontap))
            .unwrap();
        assert!(out.contains("Deployment:  SINGLE_AZ_1 (SSD)"));
        assert!(out.contains("capacity pool $2.19"));
        assert!(out.contains("Volumes (2)"));
        let big = out.find("fsvol-2").unwrap();
        let small = out.find("fsvol-1").unwrap();
        assert!(big < small);
    }

    #[test]
    fn lustre_without_servers_says_so() {
        let mut snap = snapshot(ResourceKind::Lustre);
        snap.volumes.clear();
        let out = detail_view(OutputFormat::Table).render(snap).unwrap();
        assert!(out.ends_with("No metadata servers reporting"));
        assert!(!out.contains("Volumes"));
    }

    #[test]
    fn plain_lists_parent_then_children() {
        let out = detail_view(OutputFormat::Plain)
            .render(snapshot(ResourceKind::OpenZfs))
            .unwrap();
        assert_eq!(out, "fs-1\nfsvol-2\nfsvol-1");
    }
}
