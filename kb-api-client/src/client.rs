//! HTTP client for the knowledge-base backend.
//!
//! Endpoints used:
//!   * POST /upload      (multipart, field `file`)
//!   * POST /query       { question }
//!   * GET  /query?question=..
//!   * GET  /references
//!   * GET  /chart-data?chart_type=..&query=..
//!   * GET  /history
//!   * GET  /admin
//!   * POST /admin       { action }
//!
//! Every request goes through a shared `reqwest::Client` with a cookie store
//! so session cookies set by the backend are sent back on later calls.

use std::time::{Duration, Instant};

use reqwest::{Client, Response, multipart};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::endpoint;
use crate::errors::{ApiClientError, ApiClientResult};
use crate::types::{AdminActionRequest, FileUpload, QueryRequest, QueryResult, UploadResult};

/// Thin client exposing one method per backend capability.
///
/// Cloning is cheap; clones share the connection pool and cookie jar.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Builds the shared HTTP client from config.
    ///
    /// # Errors
    /// Returns [`ApiClientError::Network`] if the HTTP client cannot be built.
    pub fn new(cfg: &ApiConfig) -> ApiClientResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("kb-api-client/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        debug!(
            base_url = %cfg.base_url,
            timeout_secs = cfg.timeout_secs,
            "ApiClient initialized"
        );

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Uploads a document for extraction and indexing.
    pub async fn upload_file(&self, file: &FileUpload) -> ApiClientResult<UploadResult> {
        self.post_file(endpoint::UPLOAD, file).await
    }

    /// Submits a question (POST variant).
    pub async fn submit_query(&self, question: &str) -> ApiClientResult<QueryResult> {
        self.post_json(endpoint::QUERY, &QueryRequest { question })
            .await
    }

    /// Fetches an answer through the GET variant of `/query`.
    pub async fn get_query(&self, question: &str) -> ApiClientResult<QueryResult> {
        self.get_json(endpoint::QUERY, &[("question", Some(question))])
            .await
    }

    /// Lists reference sources; expected shape `{ references: [..] }`.
    pub async fn get_references(&self) -> ApiClientResult<Value> {
        self.get_json(endpoint::REFERENCES, &[]).await
    }

    /// Fetches aggregate chart data; expected shape `{ labels: [..], values: [..] }`.
    pub async fn get_chart_data(
        &self,
        chart_type: &str,
        query: Option<&str>,
    ) -> ApiClientResult<Value> {
        self.get_json(
            endpoint::CHART_DATA,
            &[("chart_type", Some(chart_type)), ("query", query)],
        )
        .await
    }

    /// Fetches past question/answer pairs; expected shape `{ history: [..] }`.
    pub async fn get_history(&self) -> ApiClientResult<Value> {
        self.get_json(endpoint::HISTORY, &[]).await
    }

    /// Fetches the admin dashboard payload.
    pub async fn get_admin_data(&self) -> ApiClientResult<Value> {
        self.get_json(endpoint::ADMIN, &[]).await
    }

    /// Dispatches a named admin action.
    pub async fn perform_admin_action(&self, action: &str) -> ApiClientResult<Value> {
        self.post_json(endpoint::ADMIN, &AdminActionRequest { action })
            .await
    }

    /// GET with query parameters; `None` values are omitted.
    pub async fn get_json<T>(&self, path: &str, params: &[(&str, Option<&str>)]) -> ApiClientResult<T>
    where
        T: DeserializeOwned,
    {
        let url = endpoint::join(&self.base_url, path);
        let query: Vec<(&str, &str)> = params
            .iter()
            .filter_map(|(k, v)| v.map(|v| (*k, v)))
            .collect();
        debug!(url = %url, params = query.len(), "GET");

        let started = Instant::now();
        let resp = self.http.get(&url).query(&query).send().await?;
        read_json(resp, &url, started).await
    }

    /// POST with a JSON body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = endpoint::join(&self.base_url, path);
        debug!(url = %url, "POST json");

        let started = Instant::now();
        let resp = self.http.post(&url).json(body).send().await?;
        read_json(resp, &url, started).await
    }

    /// POST a single file as multipart form data under field `file`.
    pub async fn post_file<T>(&self, path: &str, file: &FileUpload) -> ApiClientResult<T>
    where
        T: DeserializeOwned,
    {
        let url = endpoint::join(&self.base_url, path);
        debug!(
            url = %url,
            file_name = %file.file_name,
            bytes = file.len(),
            "POST multipart"
        );

        let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime) = &file.content_type {
            part = part.mime_str(mime)?;
        }
        let form = multipart::Form::new().part("file", part);

        let started = Instant::now();
        let resp = self.http.post(&url).multipart(form).send().await?;
        read_json(resp, &url, started).await
    }
}

/// Rejects non-2xx responses with the raw body text, otherwise decodes JSON.
async fn read_json<T>(resp: Response, url: &str, started: Instant) -> ApiClientResult<T>
where
    T: DeserializeOwned,
{
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await?;
        error!(
            %status,
            %url,
            latency_ms = started.elapsed().as_millis(),
            "backend returned non-success status"
        );
        return Err(ApiClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = resp.bytes().await?;
    let out = serde_json::from_slice::<T>(&bytes).map_err(|e| ApiClientError::Decode(e.to_string()))?;
    debug!(
        %status,
        %url,
        latency_ms = started.elapsed().as_millis(),
        "response decoded"
    );
    Ok(out)
}
