//! Read-only list of knowledge references.

use kb_api_client::ApiClient;
use serde_json::Value;
use tracing::warn;

use crate::chart::value_text;
use crate::errors::error_text;
use crate::generation::{Dispatch, ViewCell};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceView {
    pub loading: bool,
    pub references: Vec<String>,
    pub error: Option<String>,
}

impl ReferenceView {
    pub fn has_no_data(&self) -> bool {
        !self.loading && self.error.is_none() && self.references.is_empty()
    }
}

/// Extracts `references` from `{ references: [..] }`; anything else is empty.
pub fn parse_references(payload: &Value) -> Vec<String> {
    payload
        .get("references")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(value_text).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct ReferenceViewer {
    client: ApiClient,
    view: ViewCell<ReferenceView>,
}

impl ReferenceViewer {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            view: ViewCell::default(),
        }
    }

    pub fn view(&self) -> ReferenceView {
        self.view.snapshot()
    }

    /// Fetches the reference list (done once when the viewer is mounted).
    pub async fn load(&self) -> Dispatch {
        let ticket = self.view.begin(|v| {
            v.loading = true;
            v.error = None;
        });

        let outcome = self.client.get_references().await;

        let applied = self.view.apply(ticket, |v| {
            v.loading = false;
            match outcome {
                Ok(payload) => v.references = parse_references(&payload),
                Err(e) => {
                    warn!(error = %e, "references request failed");
                    v.references.clear();
                    v.error = Some(error_text(&e, "Failed to fetch references"));
                }
            }
        });

        match applied {
            Some(()) => Dispatch::Applied,
            None => Dispatch::Stale,
        }
    }
}
