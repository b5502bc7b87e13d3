use serde::{Deserialize, Serialize};

/// `status` is numeric on some services (`200`) and textual on others (`"success"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeStatus {
    Code(i64),
    Text(String),
}

impl EnvelopeStatus {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Code(code) => (200..300).contains(code),
            Self::Text(text) => matches!(
                text.to_ascii_lowercase().as_str(),
                "success" | "ok" | "created"
            ),
        }
    }
}

/// JSON envelope returned by the REST collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<EnvelopeStatus>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// A missing status counts as success; the HTTP status already said so.
    pub fn is_success(&self) -> bool {
        self.status.as_ref().is_none_or(EnvelopeStatus::is_success)
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}
