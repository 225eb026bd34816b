//! Text-run scraping over the raw document markup.

use super::{ContentExtractor, ExtractError, ExtractorKind, package};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Opening `w:t` tag with optional attributes, capturing the text up to the next tag.
static TEXT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)").expect("TEXT_RUN regex is valid"));

/// Extracts flat text by joining every `w:t` run in document order.
#[derive(Debug, Clone, Copy)]
pub struct TextRunExtractor {
    max_part_size: u64,
}

impl TextRunExtractor {
    /// `max_part_size` caps the inflated document part, in bytes.
    pub fn new(max_part_size: u64) -> Self {
        Self { max_part_size }
    }
}

impl Default for TextRunExtractor {
    fn default() -> Self {
        Self::new(package::DEFAULT_MAX_PART_SIZE)
    }
}

impl ContentExtractor for TextRunExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::TextRuns
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let markup = package::read_document_part(path, self.max_part_size)?;
        Ok(scrape_text_runs(&markup))
    }
}

/// Concatenate the contents of all text runs, each followed by a single space.
///
/// Run contents are copied verbatim; XML entities are not decoded.
pub fn scrape_text_runs(markup: &str) -> String {
    TEXT_RUN.captures_iter(markup).fold(String::new(), |mut text, caps| {
        text.push_str(&caps[1]);
        text.push(' ');
        text
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{docx_bytes, write_fixture};

    #[test]
    fn test_runs_joined_with_trailing_space() {
        assert_eq!(scrape_text_runs("<w:t>Hello</w:t><w:t>World</w:t>"), "Hello World ");
    }

    #[test]
    fn test_attributes_on_run_tag() {
        let markup = r#"<w:r><w:t xml:space="preserve">Hello, </w:t></w:r><w:r><w:t>there</w:t></w:r>"#;
        assert_eq!(scrape_text_runs(markup), "Hello,  there ");
    }

    #[test]
    fn test_similar_tags_are_ignored() {
        let markup = "<w:tbl><w:tr><w:tc><w:p><w:r><w:tab/><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>";
        assert_eq!(scrape_text_runs(markup), "cell ");
    }

    #[test]
    fn test_empty_runs_still_add_separator() {
        assert_eq!(scrape_text_runs("<w:t></w:t><w:t>x</w:t>"), " x ");
    }

    #[test]
    fn test_entities_are_not_decoded() {
        assert_eq!(scrape_text_runs("<w:t>Fish &amp; Chips</w:t>"), "Fish &amp; Chips ");
    }

    #[test]
    fn test_no_runs_yields_empty_string() {
        assert_eq!(scrape_text_runs("<w:body><w:p/></w:body>"), "");
    }

    #[test]
    fn test_extract_from_package() {
        let dir = tempfile::tempdir().unwrap();
        let body = "<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t>World</w:t></w:r></w:p>";
        let path = write_fixture(&dir, "doc.docx", &docx_bytes(body));

        let text = TextRunExtractor::default().extract(&path).unwrap();
        assert_eq!(text, "Hello World ");
    }
}
