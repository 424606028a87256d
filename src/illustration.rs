//! Export of generated illustrations to disk.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{info, warn};

use crate::error::SceneError;
use crate::session::Illustration;

/// Images produced per generation call.
pub const ILLUSTRATION_BATCH: usize = 6;

/// Extension for decoded image bytes, `jpg` when the format is not recognized.
pub fn extension_for(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(format) => format.extensions_str().first().copied().unwrap_or("jpg"),
        Err(_) => "jpg",
    }
}

/// Decode one base64 payload.
pub fn decode(illustration: &Illustration) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(illustration.image.trim())
}

/// Write every image as `illustration_<n>.<ext>` (1-based) into `dir`.
/// Returns the written paths in order.
pub fn save_all(images: &[Illustration], dir: &Path) -> Result<Vec<PathBuf>, SceneError> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(images.len());
    for (idx, illustration) in images.iter().enumerate() {
        let bytes = decode(illustration).map_err(|e| {
            warn!("Illustration {} has an undecodable payload: {}", idx + 1, e);
            SceneError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("illustration {} is not valid base64: {}", idx + 1, e),
            ))
        })?;
        let path = dir.join(format!("illustration_{}.{}", idx + 1, extension_for(&bytes)));
        std::fs::write(&path, &bytes)?;
        written.push(path);
    }

    info!("Saved {} illustrations to {:?}", written.len(), dir);
    Ok(written)
}
