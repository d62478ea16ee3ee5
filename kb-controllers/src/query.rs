//! Free-text question submission.

use kb_api_client::{ApiClient, QueryResult};
use tracing::{debug, info, warn};

use crate::errors::error_text;
use crate::generation::{Dispatch, ViewCell};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryView {
    /// Question of the latest submission.
    pub question: Option<String>,
    pub loading: bool,
    pub result: Option<QueryResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QueryController {
    client: ApiClient,
    view: ViewCell<QueryView>,
}

impl QueryController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            view: ViewCell::default(),
        }
    }

    pub fn view(&self) -> QueryView {
        self.view.snapshot()
    }

    /// Submits a question.
    ///
    /// Blank input is ignored without touching the view; so is a submission
    /// while a previous one is still loading.
    pub async fn submit(&self, question: &str) -> Dispatch {
        if question.trim().is_empty() {
            return Dispatch::Skipped;
        }

        let Some(ticket) = self.view.try_begin(
            |v| !v.loading,
            |v| {
                v.question = Some(question.to_string());
                v.loading = true;
                v.result = None;
                v.error = None;
            },
        ) else {
            debug!("query already in flight, ignoring submission");
            return Dispatch::Skipped;
        };

        info!(question_len = question.len(), "query submitted");
        let outcome = self.client.submit_query(question).await;

        let applied = self.view.apply(ticket, |v| {
            v.loading = false;
            match outcome {
                Ok(result) => v.result = Some(result),
                Err(e) => {
                    warn!(error = %e, "query failed");
                    v.error = Some(error_text(&e, "Query failed"));
                }
            }
        });

        match applied {
            Some(()) => Dispatch::Applied,
            None => {
                warn!(ticket = ticket.value(), "dropping stale query response");
                Dispatch::Stale
            }
        }
    }
}
