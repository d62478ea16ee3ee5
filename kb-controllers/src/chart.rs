//! Aggregate chart data viewer.
//!
//! The backend answers `{ labels: [..], values: [..] }`; the two sequences
//! are zipped by index into [`ChartSeries`]. Any other shape is shown as
//! "no data" instead of an error.

use std::fmt;
use std::str::FromStr;

use kb_api_client::ApiClient;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::error_text;
use crate::generation::{Dispatch, ViewCell};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            other => Err(format!("unknown chart type: {other}")),
        }
    }
}

/// One category of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartView {
    pub kind: ChartKind,
    pub filter: Option<String>,
    pub loading: bool,
    /// `None` until a load succeeds; `Some(empty)` means "no data".
    pub series: Option<Vec<ChartSeries>>,
    pub error: Option<String>,
}

impl ChartView {
    pub fn has_no_data(&self) -> bool {
        !self.loading && self.error.is_none() && self.series.as_ref().is_some_and(Vec::is_empty)
    }
}

/// Zips `labels` and `values` by index. Numbers and numeric strings are
/// taken as-is; a missing, null or non-numeric value is 0.
///
/// Returns an empty series when either field is absent or not an array.
pub fn zip_series(payload: &Value) -> Vec<ChartSeries> {
    let (Some(labels), Some(values)) = (
        payload.get("labels").and_then(Value::as_array),
        payload.get("values").and_then(Value::as_array),
    ) else {
        return Vec::new();
    };

    labels
        .iter()
        .enumerate()
        .map(|(i, label)| ChartSeries {
            label: value_text(label),
            value: values.get(i).and_then(numeric).unwrap_or(0.0),
        })
        .collect()
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Strings as-is, everything else as compact JSON.
pub(crate) fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ChartViewer {
    client: ApiClient,
    view: ViewCell<ChartView>,
}

impl ChartViewer {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            view: ViewCell::default(),
        }
    }

    pub fn view(&self) -> ChartView {
        self.view.snapshot()
    }

    /// Fetches data for a chart type and optional filter.
    ///
    /// A newer load supersedes any load still in flight.
    pub async fn load(&self, kind: ChartKind, filter: Option<&str>) -> Dispatch {
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());
        let ticket = self.view.begin(|v| {
            v.kind = kind;
            v.filter = filter.map(str::to_string);
            v.loading = true;
            v.series = None;
            v.error = None;
        });

        info!(chart_type = %kind, filter = ?filter, "loading chart data");
        let outcome = self.client.get_chart_data(kind.as_str(), filter).await;

        let applied = self.view.apply(ticket, |v| {
            v.loading = false;
            match outcome {
                Ok(payload) => v.series = Some(zip_series(&payload)),
                Err(e) => {
                    warn!(error = %e, "chart data request failed");
                    v.error = Some(error_text(&e, "Failed to fetch chart data"));
                }
            }
        });

        match applied {
            Some(()) => Dispatch::Applied,
            None => {
                warn!(chart_type = %kind, "dropping stale chart response");
                Dispatch::Stale
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zips_labels_and_values() {
        let series = zip_series(&json!({ "labels": ["A", "B"], "values": [1, 2] }));
        assert_eq!(
            series,
            vec![
                ChartSeries { label: "A".into(), value: 1.0 },
                ChartSeries { label: "B".into(), value: 2.0 },
            ]
        );
    }

    #[test]
    fn missing_value_defaults_to_zero() {
        let series = zip_series(&json!({ "labels": ["A", "B"], "values": [1] }));
        assert_eq!(series.len(), 2);
        assert_eq!(series[1], ChartSeries { label: "B".into(), value: 0.0 });
    }

    #[test]
    fn null_and_text_values_default_to_zero() {
        let series = zip_series(&json!({ "labels": ["A", 2024], "values": [null, "x"] }));
        assert_eq!(series[0].value, 0.0);
        assert_eq!(series[1].label, "2024");
        assert_eq!(series[1].value, 0.0);
    }

    #[test]
    fn numeric_strings_are_kept() {
        let series = zip_series(&json!({ "labels": ["A", "B", "C"], "values": ["5", " 2.5 ", "NaN"] }));
        assert_eq!(series[0].value, 5.0);
        assert_eq!(series[1].value, 2.5);
        assert_eq!(series[2].value, 0.0);
    }

    #[test]
    fn unexpected_shape_is_empty() {
        assert!(zip_series(&json!({ "labels": "A,B", "values": [1, 2] })).is_empty());
        assert!(zip_series(&json!({ "data": [] })).is_empty());
        assert!(zip_series(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn parses_chart_kind() {
        assert_eq!("Bar".parse::<ChartKind>().unwrap(), ChartKind::Bar);
        assert_eq!(" line ".parse::<ChartKind>().unwrap(), ChartKind::Line);
        assert!("pie".parse::<ChartKind>().is_err());
    }
}
