//! Access to parts inside an OOXML package.

use super::ExtractError;
use std::{fs::File, io::Read, path::Path};
use zip::ZipArchive;

/// Main document part of a WordprocessingML package
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Default cap on the inflated size of the document part (64 MiB).
///
/// A few kilobytes of deflate stream can inflate to gigabytes, so the upload limit alone does
/// not bound memory use.
pub const DEFAULT_MAX_PART_SIZE: u64 = 64 << 20;

/// Read the main document part of the package at `path` into a string.
///
/// Fails with [`ExtractError::PartTooLarge`] when the part is declared, or actually inflates,
/// beyond `max_size` bytes.
pub fn read_document_part(path: &Path, max_size: u64) -> Result<String, ExtractError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let part = archive.by_name(DOCUMENT_PART).map_err(|source| ExtractError::MissingPart {
        part: DOCUMENT_PART,
        source,
    })?;

    let too_large = || ExtractError::PartTooLarge {
        part: DOCUMENT_PART,
        limit: max_size,
    };

    // The declared size comes from the client's central directory; check it before allocating
    let declared = part.size();
    if declared > max_size {
        return Err(too_large());
    }
    let capacity = usize::try_from(declared).unwrap_or_default();

    // The declared size may also understate the real data, so bound what is inflated
    let mut bytes = Vec::with_capacity(capacity);
    part.take(max_size.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > max_size {
        return Err(too_large());
    }

    Ok(String::from_utf8(bytes)?)
}
