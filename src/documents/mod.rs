//! Documents Module
//! Mission: Accept per-account uploads and keep their extracted text
//!
//! No chunking or indexing happens here; `chunk_count` stays at zero.

pub mod api;
pub mod store;

pub use api::DocumentState;
pub use store::{Document, DocumentStore, NewDocument};

use std::path::Path;

pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf", "md"];

/// 16 MiB per file
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Body limit for the upload route: the file plus multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

/// Keep only the last path component of a client-supplied filename.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let name = Path::new(last).file_name()?.to_str()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// Lower-cased extension if it is one we accept.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Plain-text formats are stored verbatim; anything else gets a placeholder.
pub fn extract_text(bytes: &[u8], file_type: &str, stored_name: &str) -> String {
    match file_type {
        "txt" | "md" => String::from_utf8_lossy(bytes).into_owned(),
        _ => format!("Document content from {}", stored_name),
    }
}
