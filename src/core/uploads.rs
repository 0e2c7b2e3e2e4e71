//! Image uploads
//!
//! Uploaded files are sniffed, written under the images dir with a random
//! name, and referenced from rows as `images/<file>`.

use image::ImageFormat;
use std::fs;
use thiserror::Error;

use crate::config::{Paths, IMAGES_URL_PREFIX};

/// A file part pulled out of a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file arrived in
    pub field: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Uploaded file is not a supported image")]
    NotAnImage,

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

const ACCEPTED: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
];

/// Store an uploaded image and return its reference
pub fn save_image(paths: &Paths, bytes: &[u8]) -> Result<String, UploadError> {
    let format = image::guess_format(bytes).map_err(|_| UploadError::NotAnImage)?;
    if !ACCEPTED.contains(&format) {
        return Err(UploadError::NotAnImage);
    }

    let ext = format.extensions_str().first().copied().unwrap_or("img");
    let filename = format!("{}.{}", uuid::Uuid::new_v4().simple(), ext);

    fs::create_dir_all(paths.images_dir())?;
    fs::write(paths.images_dir().join(&filename), bytes)?;

    Ok(format!("{}/{}", IMAGES_URL_PREFIX, filename))
}

/// Remove a stored image; missing files and foreign references are ignored
pub fn remove_image(paths: &Paths, reference: &str) {
    if let Some(file) = paths.image_file(reference) {
        if let Err(e) = fs::remove_file(&file) {
            tracing::debug!("Could not remove {}: {}", file.display(), e);
        }
    }
}
