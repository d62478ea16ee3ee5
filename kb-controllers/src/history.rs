//! Query history side panel.
//!
//! Every closed -> open transition refetches `/history`; nothing is cached
//! between openings. Entries are shown newest first and at most one entry is
//! expanded at a time.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use kb_api_client::ApiClient;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::error_text;
use crate::generation::{Dispatch, ViewCell};

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
    /// Timestamp text as sent by the backend.
    pub raw_timestamp: String,
    /// Parsed timestamp; `None` if the text was not a recognized date.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryView {
    pub open: bool,
    pub loading: bool,
    pub entries: Vec<HistoryEntry>,
    /// Index into `entries` of the expanded entry.
    pub expanded: Option<usize>,
    pub error: Option<String>,
}

impl HistoryView {
    /// Entries are masked while the panel is closed.
    pub fn visible_entries(&self) -> &[HistoryEntry] {
        if self.open { self.entries.as_slice() } else { &[] }
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }

    pub fn has_no_data(&self) -> bool {
        self.open && !self.loading && self.error.is_none() && self.entries.is_empty()
    }
}

/// Parses RFC3339, naive ISO date-time (as UTC) or a plain `YYYY-MM-DD` date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Extracts entries from `{ history: [..] }` and sorts them newest first.
///
/// Undated entries go last in their original order. Non-object items are
/// skipped; any other shape yields an empty list.
pub fn parse_history(payload: &Value) -> Vec<HistoryEntry> {
    let Some(items) = payload.get("history").and_then(Value::as_array) else {
        return Vec::new();
    };

    let text = |item: &Value, key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let mut entries: Vec<HistoryEntry> = items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| {
            let raw_timestamp = text(item, "timestamp");
            HistoryEntry {
                question: text(item, "question"),
                answer: text(item, "answer"),
                timestamp: parse_timestamp(&raw_timestamp),
                raw_timestamp,
            }
        })
        .collect();

    entries.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    entries
}

#[derive(Debug, Clone)]
pub struct HistoryViewer {
    client: ApiClient,
    view: ViewCell<HistoryView>,
}

impl HistoryViewer {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            view: ViewCell::default(),
        }
    }

    pub fn view(&self) -> HistoryView {
        self.view.snapshot()
    }

    /// Opens the panel and fetches history. Skipped if already open.
    pub async fn open(&self) -> Dispatch {
        let Some(ticket) = self.view.try_begin(
            |v| !v.open,
            |v| {
                v.open = true;
                v.loading = true;
                v.error = None;
            },
        ) else {
            return Dispatch::Skipped;
        };

        info!("history panel opened, fetching");
        let outcome = self.client.get_history().await;

        let applied = self.view.apply(ticket, |v| {
            v.loading = false;
            match outcome {
                Ok(payload) => {
                    v.entries = parse_history(&payload);
                    v.expanded = None;
                    debug!(entries = v.entries.len(), "history loaded");
                }
                Err(e) => {
                    warn!(error = %e, "history request failed");
                    v.error = Some(error_text(&e, "Failed to fetch history"));
                }
            }
        });

        match applied {
            Some(()) => Dispatch::Applied,
            None => {
                warn!("dropping stale history response");
                Dispatch::Stale
            }
        }
    }

    /// Closes the panel. Fetched entries stay in memory but are masked.
    pub fn close(&self) {
        self.view.invalidate(|v| {
            v.open = false;
            v.loading = false;
        });
    }

    /// Expands entry `index`, or collapses it if it is the expanded one.
    ///
    /// Returns `false` if the panel is closed or the index is out of range.
    pub fn toggle(&self, index: usize) -> bool {
        self.view.update(|v| {
            if !v.open || index >= v.entries.len() {
                return false;
            }
            v.expanded = if v.expanded == Some(index) {
                None
            } else {
                Some(index)
            };
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_newest_first() {
        let entries = parse_history(&json!({
            "history": [
                { "question": "old", "answer": "a", "timestamp": "2024-01-01" },
                { "question": "new", "answer": "b", "timestamp": "2024-06-01" }
            ]
        }));
        let questions: Vec<_> = entries.iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, ["new", "old"]);
    }

    #[test]
    fn undated_entries_sort_last_in_order() {
        let entries = parse_history(&json!({
            "history": [
                { "question": "x", "timestamp": "yesterday" },
                { "question": "dated", "timestamp": "2024-03-05T10:00:00Z" },
                { "question": "y" }
            ]
        }));
        let questions: Vec<_> = entries.iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, ["dated", "x", "y"]);
    }

    #[test]
    fn parses_backend_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
            .and_utc();
        assert_eq!(parse_timestamp("2024-06-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T12:30:00.000000"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01 12:30:00"), Some(expected));
        assert!(parse_timestamp("2024-06-01").is_some());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn malformed_payload_is_empty() {
        assert!(parse_history(&json!({ "history": {} })).is_empty());
        assert!(parse_history(&json!({ "items": [] })).is_empty());
    }

    #[test]
    fn closed_panel_masks_entries() {
        let view = HistoryView {
            open: false,
            entries: vec![HistoryEntry {
                question: "q".into(),
                answer: "a".into(),
                raw_timestamp: String::new(),
                timestamp: None,
            }],
            ..HistoryView::default()
        };
        assert!(view.visible_entries().is_empty());
    }
}
