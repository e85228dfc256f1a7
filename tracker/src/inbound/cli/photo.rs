//! Reading the chosen photo from disk.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};

use crate::domain::PhotoFile;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Failures while reading a photo file.
#[derive(Debug, thiserror::Error)]
pub enum PhotoLoadError {
    /// The path has no file-name component.
    #[error("photo path '{}' does not name a file", .path.display())]
    NotAFile {
        /// Path as given.
        path: PathBuf,
    },
    /// The parent directory or file could not be read.
    #[error("cannot read photo '{}': {source}", .path.display())]
    Io {
        /// Path as given.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Read a photo and derive its MIME type from the file extension.
///
/// # Errors
///
/// Returns [`PhotoLoadError`] when the path has no file name or cannot be
/// read.
pub fn load_photo(path: &Path) -> Result<PhotoFile, PhotoLoadError> {
    let file_name = path.file_name().ok_or_else(|| PhotoLoadError::NotAFile {
        path: path.to_path_buf(),
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let io_error = |source| PhotoLoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
    let bytes = directory.read(Path::new(file_name)).map_err(io_error)?;

    let name = file_name.to_string_lossy().into_owned();
    let mime_type = mime_type_for(&name);
    Ok(PhotoFile::new(name, mime_type, bytes))
}

/// MIME type for a file name, by extension.
#[must_use]
pub fn mime_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg" | "jfif") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("avif") => "image/avif",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("svg") => "image/svg+xml",
        _ => FALLBACK_MIME_TYPE,
    }
}
