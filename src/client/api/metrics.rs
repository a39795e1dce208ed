//! Usage and alert metrics

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde_json::json;

use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::{ApiError, Result};
use crate::input::{TIMESTAMP_FORMAT, TimeInput, validate_timestamp};
use crate::normalize::ShapeMapping;
use crate::queries::metrics as docs;

/// Default breakdown interval, in minutes
pub const DEFAULT_INTERVAL_MINUTES: i64 = 180;

pub struct Metrics<'a> {
    client: &'a Panther,
}

impl<'a> Metrics<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    /// Alert, ingestion and query metrics for a period.
    pub async fn all(
        &self,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
        interval_minutes: i64,
    ) -> Result<Value> {
        let start = validate_timestamp(start)?;
        let end = validate_timestamp(end)?;
        if interval_minutes <= 0 {
            return Err(ApiError::validation("'interval' must be greater than zero.").into());
        }

        let request = RequestDescriptor::query(docs::ALL).param(
            "input",
            json!({"fromDate": start, "toDate": end, "intervalInMinutes": interval_minutes}),
        );
        self.client
            .execute(request, &ShapeMapping::new().unwrap("metrics"))
            .await
    }
}

/// A `SeriesWithBreakdown` reshaped for plotting: one timestamp axis and one
/// count column per label.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBreakdown {
    pub timestamps: Vec<DateTime<Utc>>,
    pub counts: IndexMap<String, Vec<Value>>,
}

/// Reshape a breakdown series such as `alertsPerSeverity`.
///
/// Every entry must break down over the same timestamps.
pub fn series_breakdown(series: &Value) -> Result<SeriesBreakdown> {
    let entries = series
        .as_list()
        .ok_or_else(|| ApiError::validation("breakdown series must be a list"))?;

    let mut marker: Option<Vec<&String>> = None;
    let mut counts = IndexMap::new();
    for entry in entries {
        let label = entry
            .get("label")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::validation("breakdown entry has no label"))?;
        let breakdown = entry
            .get("breakdown")
            .and_then(Value::as_map)
            .ok_or_else(|| ApiError::validation(format!("'{label}' has no breakdown")))?;

        let keys: Vec<&String> = breakdown.keys().collect();
        match &marker {
            Some(expected) if *expected != keys => {
                return Err(ApiError::validation(format!(
                    "'{label}' breaks down over different timestamps"
                ))
                .into());
            }
            Some(_) => {}
            None => marker = Some(keys),
        }
        counts.insert(label.to_string(), breakdown.values().cloned().collect());
    }

    let timestamps = marker
        .unwrap_or_default()
        .into_iter()
        .map(|key| {
            NaiveDateTime::parse_from_str(key, TIMESTAMP_FORMAT)
                .map(|at| at.and_utc())
                .map_err(|e| ApiError::Decode {
                    reason: format!("breakdown timestamp: {e}"),
                    body: key.clone(),
                })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(SeriesBreakdown { timestamps, counts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::panther::test_support::graphql_client;
    use chrono::TimeZone;

    fn severity_series() -> Value {
        Value::from(json!([
            {"label": "INFO", "value": 3, "breakdown": {"2024-01-01T00:00:00Z": 1, "2024-01-01T03:00:00Z": 2}},
            {"label": "HIGH", "value": 1, "breakdown": {"2024-01-01T00:00:00Z": 0, "2024-01-01T03:00:00Z": 1}}
        ]))
    }

    #[test]
    fn test_series_breakdown() {
        let out = series_breakdown(&severity_series()).unwrap();
        assert_eq!(
            out.timestamps,
            vec![
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap(),
            ]
        );
        assert_eq!(out.counts.keys().collect::<Vec<_>>(), vec!["INFO", "HIGH"]);
        assert_eq!(
            out.counts["INFO"].iter().map(Value::to_canonical).collect::<Vec<_>>(),
            vec![json!(1), json!(2)]
        );
    }

    #[test]
    fn test_series_breakdown_mismatched_keys() {
        let series = Value::from(json!([
            {"label": "INFO", "breakdown": {"2024-01-01T00:00:00Z": 1}},
            {"label": "HIGH", "breakdown": {"2024-01-01T03:00:00Z": 1}}
        ]));
        let err = series_breakdown(&series).unwrap_err();
        assert!(matches!(err.api(), Some(ApiError::Validation(_))));
    }

    #[test]
    fn test_series_breakdown_empty() {
        let out = series_breakdown(&Value::from(json!([]))).unwrap();
        assert!(out.timestamps.is_empty());
        assert!(out.counts.is_empty());
    }

    #[tokio::test]
    async fn test_all_input() {
        let (client, transport) = graphql_client(vec![json!({"metrics": {"totalAlerts": 4}})], false);
        let metrics = client
            .metrics()
            .all("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z", 60)
            .await
            .unwrap();

        assert_eq!(metrics.get("totalAlerts").and_then(Value::as_f64), Some(4.0));
        assert_eq!(
            transport.requests()[0].parameters()["input"],
            json!({"fromDate": "2024-01-01T00:00:00Z", "toDate": "2024-01-02T00:00:00Z", "intervalInMinutes": 60})
        );
    }

    #[tokio::test]
    async fn test_all_rejects_bad_interval() {
        let (client, transport) = graphql_client(vec![], false);
        let result = client
            .metrics()
            .all("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z", 0)
            .await;
        assert!(result.is_err());
        assert!(transport.requests().is_empty());
    }
}
