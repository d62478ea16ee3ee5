//! Client layer for the knowledge-base backend.
//!
//! Wraps every HTTP capability the assistant uses behind [`ApiClient`]:
//! document upload, question answering, references, chart data, history
//! and admin endpoints. Paths are normalized, non-2xx responses surface as
//! [`ApiClientError::Status`] carrying the raw body, and cookies persist
//! across calls.

mod client;
mod config;
pub mod endpoint;
mod errors;
mod types;

pub use client::ApiClient;
pub use config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use errors::{ApiClientError, ApiClientResult, ConfigError};
pub use types::{FileUpload, QueryResult, UploadResult};
