// ── CloudWatch metrics client ──
//
// `MetricsApi` backed by `GetMetricData` and `ListMetrics`. Each query
// gets a request-local id (`q0`, `q1`, ...) because CloudWatch ids are
// restricted to `[a-z][a-zA-Z0-9_]*`; the caller's label rides along in
// the CloudWatch label field and comes back on the result.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{
    Dimension as CwDimension, DimensionFilter, Metric, MetricDataQuery, MetricStat,
};
use aws_types::SdkConfig;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::MetricsApi;
use crate::error::{Error, from_sdk};
use crate::types::{
    Dimension, MAX_QUERIES_PER_REQUEST, MetricQuery, MetricSeries, NAMESPACE, TimeRange,
};

/// Thin wrapper over the CloudWatch SDK client.
#[derive(Clone, Debug)]
pub struct CloudWatchClient {
    client: Client,
}

impl CloudWatchClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetricsApi for CloudWatchClient {
    async fn batch_query(
        &self,
        queries: &[MetricQuery],
        range: TimeRange,
    ) -> Result<Vec<MetricSeries>, Error> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        if queries.len() > MAX_QUERIES_PER_REQUEST {
            return Err(Error::TooManyQueries {
                count: queries.len(),
                limit: MAX_QUERIES_PER_REQUEST,
            });
        }

        let sdk_queries = queries
            .iter()
            .enumerate()
            .map(|(i, q)| to_sdk_query(&request_id(i), q))
            .collect::<Result<Vec<_>, _>>()?;

        // Keyed by request id so results map back even if a label is missing.
        let labels: HashMap<String, &str> = queries
            .iter()
            .enumerate()
            .map(|(i, q)| (request_id(i), q.label.as_str()))
            .collect();

        let mut series: HashMap<&str, Vec<f64>> = HashMap::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .get_metric_data()
                .set_metric_data_queries(Some(sdk_queries.clone()))
                .start_time(to_aws_time(range.start))
                .end_time(to_aws_time(range.end))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| from_sdk("GetMetricData", &e))?;

            for result in output.metric_data_results() {
                let Some(label) = result.id().and_then(|id| labels.get(id)) else {
                    continue;
                };
                series
                    .entry(*label)
                    .or_default()
                    .extend_from_slice(result.values());
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => break,
            }
        }

        debug!(
            queries = queries.len(),
            results = series.len(),
            "metric batch complete"
        );

        Ok(series
            .into_iter()
            .map(|(label, values)| MetricSeries {
                label: label.to_owned(),
                values,
            })
            .collect())
    }

    async fn list_dimension_values(
        &self,
        metric_name: &str,
        filter: &[Dimension],
        dimension: &str,
    ) -> Result<Vec<String>, Error> {
        let filters = filter
            .iter()
            .map(|d| {
                DimensionFilter::builder()
                    .name(&d.name)
                    .value(&d.value)
                    .build()
            })
            .collect::<Vec<_>>();

        let mut values = BTreeSet::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_metrics()
                .namespace(NAMESPACE)
                .metric_name(metric_name)
                .set_dimensions(Some(filters.clone()))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| from_sdk("ListMetrics", &e))?;

            values.extend(
                output
                    .metrics()
                    .iter()
                    .flat_map(|m| m.dimensions())
                    .filter(|d| d.name() == Some(dimension))
                    .filter_map(|d| d.value().map(str::to_owned)),
            );

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => break,
            }
        }

        Ok(values.into_iter().collect())
    }
}

fn request_id(index: usize) -> String {
    format!("q{index}")
}

fn invalid_request(err: impl std::fmt::Display) -> Error {
    Error::InvalidRequest(err.to_string())
}

fn to_aws_time(t: DateTime<Utc>) -> AwsDateTime {
    AwsDateTime::from_secs(t.timestamp())
}

fn to_sdk_query(id: &str, query: &MetricQuery) -> Result<MetricDataQuery, Error> {
    let dimensions = query
        .dimensions
        .iter()
        .map(|d| {
            CwDimension::builder()
                .name(&d.name)
                .value(&d.value)
                .build()
        })
        .collect::<Vec<_>>();

    let metric = Metric::builder()
        .namespace(NAMESPACE)
        .metric_name(&query.metric_name)
        .set_dimensions(Some(dimensions))
        .build();

    let stat = MetricStat::builder()
        .metric(metric)
        .period(query.period_secs)
        .stat(query.statistic.as_str())
        .build();

    Ok(MetricDataQuery::builder()
        .id(id)
        .label(&query.label)
        .metric_stat(stat)
        .return_data(true)
        .build())
}
