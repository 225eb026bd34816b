//! Document content extraction.
//!
//! This module defines the [`ContentExtractor`] trait, which turns a staged Word package on disk
//! into a single string. Two backends are provided and selected through
//! [`ExtractionConfig::strategy`](crate::config::ExtractionConfig):
//!
//! - [`text_runs::TextRunExtractor`] scrapes every `w:t` run out of the document part and joins
//!   them into flat text (each run followed by one space).
//! - [`body_xml::BodyXmlExtractor`] walks the document part and re-serialises the `w:body`
//!   element, returning markup rather than prose.
//!
//! Both backends read `word/document.xml` through [`package`], so anything that is not an OOXML
//! package (including legacy binary `.doc` files) fails with an [`ExtractError::Archive`]. The
//! part is capped at [`ExtractionConfig::max_part_size`] bytes once inflated.
//!
//! Extractors are synchronous; the handler runs them on the blocking thread pool.

use crate::config::ExtractionConfig;
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, sync::Arc};

pub mod body_xml;
pub mod package;
pub mod text_runs;

/// Create a content extractor for the configured strategy
pub fn create_extractor(config: &ExtractionConfig) -> Arc<dyn ContentExtractor> {
    match config.strategy {
        ExtractorKind::BodyXml => Arc::new(body_xml::BodyXmlExtractor::new(config.max_part_size)),
        ExtractorKind::TextRuns => Arc::new(text_runs::TextRunExtractor::new(config.max_part_size)),
    }
}

/// Turns a Word package on disk into response content.
pub trait ContentExtractor: Send + Sync {
    /// Strategy implemented by this extractor
    fn kind(&self) -> ExtractorKind;

    /// Extract content from the package at `path`.
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Available extraction strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Re-serialised `w:body` markup
    BodyXml,
    /// Concatenated text runs
    #[default]
    TextRuns,
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorKind::BodyXml => write!(f, "body_xml"),
            ExtractorKind::TextRuns => write!(f, "text_runs"),
        }
    }
}

/// Errors raised while opening or parsing a staged package.
///
/// The `Display` text always carries the underlying library message; it is returned to the
/// client as-is.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open document as ZIP: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("missing {part}: {source}")]
    MissingPart {
        part: &'static str,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{part} inflates to more than {limit} bytes")]
    PartTooLarge { part: &'static str, limit: u64 },

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document part has no w:body element")]
    MissingBody,

    #[error("document part ends inside w:body")]
    UnterminatedBody,

    #[error("document body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl ExtractError {
    /// Whether the package could not be opened as a well-formed document, as opposed to a
    /// well-formed document lacking the content asked for.
    ///
    /// Unreadable archives, oversized or non-UTF-8 parts and malformed XML are all open failures;
    /// only a document with no `w:body` is reported as an extraction failure.
    pub fn is_open_failure(&self) -> bool {
        !matches!(self, ExtractError::MissingBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_extractor_matches_kind() {
        for kind in [ExtractorKind::BodyXml, ExtractorKind::TextRuns] {
            let config = ExtractionConfig {
                strategy: kind,
                ..Default::default()
            };
            assert_eq!(create_extractor(&config).kind(), kind);
        }
    }

    #[test]
    fn test_default_kind_is_text_runs() {
        assert_eq!(ExtractorKind::default(), ExtractorKind::TextRuns);
        assert_eq!(ExtractorKind::default().to_string(), "text_runs");
    }

    #[test]
    fn test_kind_deserializes_snake_case() {
        let kind: ExtractorKind = serde_json::from_str("\"body_xml\"").unwrap();
        assert_eq!(kind, ExtractorKind::BodyXml);
        assert!(serde_json::from_str::<ExtractorKind>("\"BodyXml\"").is_err());
    }

    #[test]
    fn test_open_failures_are_package_level() {
        assert!(ExtractError::Archive(zip::result::ZipError::FileNotFound).is_open_failure());
        assert!(
            ExtractError::PartTooLarge {
                part: package::DOCUMENT_PART,
                limit: 1
            }
            .is_open_failure()
        );
        assert!(ExtractError::UnterminatedBody.is_open_failure());
        assert!(!ExtractError::MissingBody.is_open_failure());
    }

    #[test]
    fn test_malformed_xml_is_an_open_failure() {
        let err = body_xml::serialize_body("<w:document><w:body><w:p></w:r></w:body></w:document>").unwrap_err();
        assert!(matches!(err, ExtractError::Xml(_)));
        assert!(err.is_open_failure());
    }
}
