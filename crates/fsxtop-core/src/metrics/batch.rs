// ── Batch planning and execution ──

use std::collections::HashMap;
use std::time::Duration;

use fsxtop_api::{MAX_QUERIES_PER_REQUEST, MetricQuery, MetricsApi, TimeRange};
use tracing::{debug, warn};

use super::WINDOW;

/// Packs per-entity query groups into backend-sized requests and runs them.
#[derive(Debug, Clone)]
pub struct MetricBatcher {
    max_queries: usize,
    window: Duration,
}

impl Default for MetricBatcher {
    fn default() -> Self {
        Self {
            max_queries: MAX_QUERIES_PER_REQUEST,
            window: WINDOW,
        }
    }
}

/// Outcome of running every batch of one fetch.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Newest value per label. Labels with no data points are absent.
    pub latest: HashMap<String, f64>,
    pub batches: usize,
    pub errors: Vec<fsxtop_api::Error>,
}

impl BatchResult {
    /// At least one batch came back, so results are worth applying.
    pub fn any_succeeded(&self) -> bool {
        self.errors.len() < self.batches
    }
}

impl MetricBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries.max(1);
        self
    }

    pub fn max_queries(&self) -> usize {
        self.max_queries
    }

    /// Greedily pack `groups` into batches of at most `max_queries`.
    ///
    /// A group (all queries for one entity) stays in one batch unless it
    /// alone exceeds the cap, in which case it is chunked. Group order is
    /// preserved.
    pub fn plan(&self, groups: Vec<Vec<MetricQuery>>) -> Vec<Vec<MetricQuery>> {
        let mut batches: Vec<Vec<MetricQuery>> = Vec::new();
        let mut current: Vec<MetricQuery> = Vec::new();

        for group in groups {
            if group.is_empty() {
                continue;
            }
            if !current.is_empty() && current.len() + group.len() > self.max_queries {
                batches.push(std::mem::take(&mut current));
            }
            if group.len() > self.max_queries {
                let mut rest = group.into_iter().peekable();
                while rest.peek().is_some() {
                    batches.push(rest.by_ref().take(self.max_queries).collect());
                }
                continue;
            }
            current.extend(group);
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }

    /// Plan and run every batch concurrently. A failed batch is logged
    /// and recorded; the others still contribute their results.
    pub async fn execute(
        &self,
        api: &dyn MetricsApi,
        groups: Vec<Vec<MetricQuery>>,
    ) -> BatchResult {
        let batches = self.plan(groups);
        if batches.is_empty() {
            return BatchResult::default();
        }

        let range = TimeRange::last(self.window);
        let futs = batches.iter().map(|batch| api.batch_query(batch, range));
        let responses = futures_util::future::join_all(futs).await;

        let mut result = BatchResult {
            batches: batches.len(),
            ..BatchResult::default()
        };

        for (index, response) in responses.into_iter().enumerate() {
            match response {
                Ok(series) => {
                    for s in series {
                        if let Some(value) = s.latest() {
                            result.latest.insert(s.label, value);
                        }
                    }
                }
                Err(e) => {
                    warn!(batch = index, error = %e, "metric batch failed");
                    result.errors.push(e);
                }
            }
        }

        debug!(
            batches = result.batches,
            failed = result.errors.len(),
            values = result.latest.len(),
            "metric fetch complete"
        );
        result
    }
}
