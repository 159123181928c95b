//! `fsxtop list`: every file system in the region.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use fsxtop_config::{Config, ConfigOverrides};
use fsxtop_core::model::utilization_ratio;
use fsxtop_core::view::{self, ResourceSortField, SortSpec};
use fsxtop_core::{Controller, Resource, ResourceSnapshot, StoreStats};

use crate::cli::{GlobalOpts, ListArgs, OutputFormat};
use crate::config::{self, Loaded};
use crate::error::CliError;
use crate::output::{self, Style};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Capacity")]
    capacity: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "MB/s")]
    throughput: String,
    #[tabled(rename = "IOPS")]
    iops: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    stats: &'a StoreStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly_cost: Option<f64>,
    file_systems: &'a [Resource],
}

// ── Rendering ───────────────────────────────────────────────────────

/// Everything needed to draw one frame of the listing.
struct ListView {
    format: OutputFormat,
    style: Style,
    pricing: bool,
    sort: SortSpec<ResourceSortField>,
    page_size: usize,
    page: usize,
}

impl ListView {
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

    fn render(&self, mut snapshot: ResourceSnapshot) -> Result<String, CliError> {
        view::sort_resources(&mut snapshot.resources, self.sort);
        match self.format {
            OutputFormat::Json => output::render_json(&ListOutput {
                stats: &snapshot.stats,
                monthly_cost: self.pricing.then(|| snapshot.stats.total_monthly_cost()),
                file_systems: &snapshot.resources,
            }),
            OutputFormat::Plain => Ok(snapshot
                .resources
                .iter()
                .map(Resource::id)
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(self.table(&snapshot)),
        }
    }

    fn table(&self, snapshot: &ResourceSnapshot) -> String {
        let summary = self.summary(&snapshot.stats);
        if snapshot.resources.is_empty() {
            return format!("{summary}\nNo file systems found");
        }
        let pages = view::page_count(snapshot.resources.len(), self.page_size);
        let page = self.page.clamp(1, pages);
        let rows: Vec<ResourceRow> = view::paginate(&snapshot.resources, self.page_size, page - 1)
            .iter()
            .map(|r| self.row(r))
            .collect();
        format!(
            "{summary}\n{}\nPage {page}/{pages}",
            output::render_table(&rows)
        )
    }

    fn row(&self, r: &Resource) -> ResourceRow {
        ResourceRow {
            id: r.id().to_owned(),
            name: output::truncate(r.name(), 20),
            kind: r.kind().label().to_owned(),
            capacity: format!(
                "{} {}/{} GiB",
                self.style.bar(r.utilization(), 20),
                r.used_capacity_gib(),
                r.capacity_gib()
            ),
            cpu: output::percent(r.metrics.cpu_utilization),
            throughput: output::rate(r.total_throughput(), 1),
            iops: output::rate(r.total_iops(), 0),
            cost: output::monthly_cost(r, self.pricing),
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn summary(&self, stats: &StoreStats) -> String {
        let total_tib = stats.total_capacity_gib as f64 / 1024.0;
        let used_tib = stats.total_used_gib as f64 / 1024.0;
        let ratio = utilization_ratio(stats.total_used_gib, stats.total_capacity_gib);
        let used_pct = self.style.paint(&format!("{:.1}%", ratio * 100.0), ratio);

        let mut line = format!(
            "{} file systems | {used_tib:.1}/{total_tib:.1} TiB ({used_pct} used)",
            stats.total_count
        );
        if !stats.count_by_kind.is_empty() {
            let kinds: Vec<String> = stats
                .count_by_kind
                .iter()
                .map(|(kind, n)| format!("{} {n}", kind.label()))
                .collect();
            let _ = write!(line, " | {}", kinds.join(", "));
        }
        if self.pricing && stats.total_hourly_cost > 0.0 {
            let _ = write!(line, " | ${:.2}/mo", stats.total_monthly_cost());
        }
        line
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let overrides = ConfigOverrides {
        file_system_type: args.file_system_type,
        name_filter: args.name_filter,
        ..config::view_overrides(global, &args.view)
    };
    let mut loaded = Loaded::load(global, &overrides)?;
    // The summary view never narrows to one file system.
    loaded.config.file_system_id = None;

    let controller_config = loaded.controller_config()?;
    let (fsx, cloudwatch) = fsxtop_api::connect(&loaded.session(&controller_config)).await;
    let controller = Controller::new(controller_config, Arc::new(fsx), Arc::new(cloudwatch))?;
    let list_view = ListView::new(&loaded.config, global, args.view.page);

    if !args.view.watch {
        let snapshot = controller.refresh_once().await?;
        output::print_output(&list_view.render(snapshot)?);
        return Ok(());
    }

    let changes = controller.subscribe();
    controller.start().await;
    let result = super::watch_loop(changes, list_view.format, || {
        list_view.render(controller.snapshot())
    })
    .await;
    controller.stop().await;
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fsxtop_core::{Price, ResourceKind, ResourceSpec, StorageTier};

    use pretty_assertions::assert_eq;

    use super::*;

    fn resource(id: &str, name: &str, capacity_gib: i64, used: i64) -> Resource {
        let mut r = Resource::new(ResourceSpec {
            id: id.into(),
            name: name.into(),
            kind: ResourceKind::Ontap,
            capacity_gib,
            creation_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            lifecycle: "AVAILABLE".into(),
            tier: StorageTier::default(),
        });
        r.metrics.used_capacity_gib = used;
        r.set_price(Price::Hourly { rate: 1.0 });
        r
    }

    fn list_view(format: OutputFormat, sort: &str, page_size: usize, page: usize) -> ListView {
        ListView {
            format,
            style: Style::parse("", false),
            pricing: true,
            sort: sort.parse().unwrap_or_default(),
            page_size,
            page,
        }
    }

    fn snapshot(resources: Vec<Resource>) -> ResourceSnapshot {
        let mut stats = StoreStats::default();
        for r in &resources {
            stats.total_count += 1;
            stats.total_capacity_gib += r.capacity_gib();
            stats.total_used_gib += r.used_capacity_gib();
            stats.total_hourly_cost += r.hourly_price();
            *stats.count_by_kind.entry(r.kind()).or_default() += 1;
        }
        ResourceSnapshot { stats, resources }
    }

    #[test]
    fn plain_output_is_sorted_ids() {
        let snap = snapshot(vec![
            resource("fs-1", "beta", 100, 10),
            resource("fs-2", "Alpha", 100, 10),
        ]);
        let out = list_view(OutputFormat::Plain, "name=asc", 10, 1)
            .render(snap)
            .unwrap();
        assert_eq!(out, "fs-2\nfs-1");
    }

    #[test]
    fn table_pages_and_summarizes() {
        let snap = snapshot(vec![
            resource("fs-1", "a", 1024, 512),
            resource("fs-2", "b", 1024, 512),
            resource("fs-3", "c", 1024, 512),
        ]);
        let out = list_view(OutputFormat::Table, "capacity=asc", 2, 9)
            .render(snap)
            .unwrap();
        assert!(out.starts_with("3 file systems | 1.5/3.0 TiB (50.0% used) | ONTAP 3 | $2190.00/mo"));
        assert!(out.contains("fs-3"));
        assert!(!out.contains("fs-1"));
        assert!(out.ends_with("Page 2/2"));
    }

    #[test]
    fn json_output_carries_stats() {
        let snap = snapshot(vec![resource("fs-1", "a", 100, 50)]);
        let out = list_view(OutputFormat::Json, "", 10, 1).render(snap).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["stats"]["total_count"], 1);
        assert_eq!(value["file_systems"][0]["spec"]["id"], "fs-1");
        assert!(value["monthly_cost"].is_number());
    }

    #[test]
    fn empty_listing_says_so() {
        let out = list_view(OutputFormat::Table, "", 10, 1)
            .render(snapshot(Vec::new()))
            .unwrap();
        assert!(out.ends_with("No file systems found"));
    }
}
