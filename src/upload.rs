/// Upload intake
///
/// Checks that an upload has an accepted image extension and that its
/// payload really is an image. Only the header is decoded; the bytes are
/// stored untouched.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// Extensions accepted by the upload form
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["jpg", "png", "jpeg", "bmp", "tiff"];

/// What the header of a valid upload says
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// True when the file name ends in one of the accepted extensions (any case)
pub fn has_accepted_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Validate an upload before it is stored
pub fn validate_upload(file_name: &str, bytes: &[u8]) -> Result<UploadInfo> {
    if !has_accepted_extension(file_name) {
        return Err(Error::UnsupportedFile {
            file_name: file_name.to_string(),
        });
    }

    let invalid = |source| Error::InvalidImage {
        file_name: file_name.to_string(),
        source,
    };

    let format = image::guess_format(bytes).map_err(invalid)?;
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(invalid)?;

    debug!(file_name, ?format, width, height, "upload validated");
    Ok(UploadInfo { format, width, height })
}

/// Read a file from disk in full. Returns its file name and content.
pub fn read_upload(path: impl AsRef<Path>) -> Result<(String, Vec<u8>)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    Ok((file_name, bytes))
}
