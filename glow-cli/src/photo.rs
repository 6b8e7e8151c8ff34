//! Photo loading
//!
//! Reads image files from disk and encodes them for upload.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// Reads a photo and returns its base64 encoding
pub fn encode_photo(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read photo {}", path.display()))?;

    if bytes.is_empty() {
        bail!("Photo {} is empty", path.display());
    }

    Ok(STANDARD.encode(bytes))
}
