use serde::{Deserialize, Serialize};

/// Successful `/extract` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Extracted text runs, or body markup when the `body_xml` strategy is configured
    pub content: String,
}
