//! Wire model for the knowledge-base backend.
//!
//! Only the payloads the client actually interprets are typed. Read-only
//! viewer payloads (references, chart data, history, admin dashboard) are
//! returned as raw [`serde_json::Value`] so callers can degrade gracefully
//! on unexpected shapes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ApiClientResult;

/// Answer to a natural-language question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub answer: String,
    /// Opaque reference identifiers, in backend order.
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

/// Arbitrary metadata returned by `/upload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryRequest<'a> {
    pub question: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminActionRequest<'a> {
    pub action: &'a str,
}

/// A file picked by the user, fully buffered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// MIME type sent with the multipart part, when known.
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Reads a file from disk; the part name is the path's file name.
    pub async fn from_path(path: impl AsRef<Path>) -> ApiClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_result_tolerates_missing_sections() {
        let parsed: QueryResult = serde_json::from_value(json!({ "answer": "42" })).unwrap();
        assert_eq!(parsed.answer, "42");
        assert!(parsed.references.is_empty());
        assert!(parsed.follow_up_questions.is_empty());
    }

    #[test]
    fn upload_result_keeps_arbitrary_metadata() {
        let parsed: UploadResult =
            serde_json::from_value(json!({ "filename": "a.pdf", "chunks": 12 })).unwrap();
        assert_eq!(parsed.metadata["filename"], "a.pdf");
        assert_eq!(parsed.metadata["chunks"], 12);
    }
}
