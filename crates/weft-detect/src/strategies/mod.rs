//! Built-in detection strategies
//!
//! Each strategy is an independent analyzer over the same batch of
//! files. The lexical strategies (imports, references) read content
//! through the injected [`ContentReader`]; the structural strategy works
//! on paths alone; the similarity strategy delegates scoring to the
//! optional [`SimilarityScorer`] capability.
//!
//! [`ContentReader`]: weft_domain::ContentReader
//! [`SimilarityScorer`]: weft_domain::SimilarityScorer

mod imports;
mod references;
mod similarity;
mod structural;

pub use imports::ImportStrategy;
pub use references::ReferenceStrategy;
pub use similarity::SimilarityStrategy;
pub use structural::StructuralStrategy;

use std::path::Path;
use tracing::warn;

use crate::types::DetectionContext;

/// File stem (name without extension), if the path has one
pub(crate) fn file_stem(path: &str) -> Option<&str> {
    Path::new(path).file_stem().and_then(|s| s.to_str())
}

/// File extension, lowercased comparison is the caller's business
pub(crate) fn extension(path: &str) -> Option<&str> {
    Path::new(path).extension().and_then(|s| s.to_str())
}

/// Parent directory as a string, empty for bare filenames
pub(crate) fn parent_dir(path: &str) -> &str {
    Path::new(path)
        .parent()
        .and_then(|p| p.to_str())
        .unwrap_or("")
}

/// Read a file's content, skipping unreadable or oversized files.
///
/// A single unreadable file degrades that file's coverage, not the
/// whole strategy: the failure is logged and the file skipped.
pub(crate) fn read_content(
    ctx: &DetectionContext,
    path: &str,
    max_bytes: usize,
) -> Option<String> {
    match ctx.reader().read_text(path) {
        Ok(content) if content.len() <= max_bytes => Some(content),
        Ok(content) => {
            warn!(path, size = content.len(), "file exceeds content cap, skipping");
            None
        }
        Err(e) => {
            warn!(path, error = %e, "could not read file, skipping");
            None
        }
    }
}

/// 1-based line number of a byte offset
pub(crate) fn line_of_offset(content: &str, offset: usize) -> usize {
    content[..offset.min(content.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}
