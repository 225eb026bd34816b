//! Structured traversal of the document part, returning the body as markup.

use super::{ContentExtractor, ExtractError, ExtractorKind, package};
use quick_xml::{Reader, Writer, events::Event};
use std::path::Path;

const BODY: &[u8] = b"w:body";

/// Extracts the `w:body` element of the main document part, re-serialised as XML.
///
/// The output is markup, not prose: paragraphs, runs, properties and section settings all
/// survive. Text inside runs is left escaped exactly as stored in the package.
#[derive(Debug, Clone, Copy)]
pub struct BodyXmlExtractor {
    max_part_size: u64,
}

impl BodyXmlExtractor {
    /// `max_part_size` caps the inflated document part, in bytes.
    pub fn new(max_part_size: u64) -> Self {
        Self { max_part_size }
    }
}

impl Default for BodyXmlExtractor {
    fn default() -> Self {
        Self::new(package::DEFAULT_MAX_PART_SIZE)
    }
}

impl ContentExtractor for BodyXmlExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::BodyXml
    }

    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let markup = package::read_document_part(path, self.max_part_size)?;
        serialize_body(&markup)
    }
}

/// Re-serialise the first `w:body` element found in `markup`, including its own tags.
pub fn serialize_body(markup: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::with_capacity(markup.len()));

    // Open elements inside the body, counting the body itself; 0 until it is found
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) if depth == 0 && e.name().as_ref() == BODY => {
                writer.write_event(Event::Start(e))?;
                depth = 1;
            }
            Event::Empty(e) if depth == 0 && e.name().as_ref() == BODY => {
                writer.write_event(Event::Empty(e))?;
                break;
            }
            Event::Eof if depth == 0 => return Err(ExtractError::MissingBody),
            Event::Eof => return Err(ExtractError::UnterminatedBody),
            event if depth > 0 => {
                match &event {
                    Event::Start(_) => depth += 1,
                    Event::End(_) => depth -= 1,
                    _ => {}
                }
                writer.write_event(event)?;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}
