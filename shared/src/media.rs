//! Local image selection for the add form.
//!
//! The picked file is not uploaded anywhere: its `data:` URL becomes the
//! item's image field directly.

use base64::Engine;
use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::error::{AppError, ErrorKind};

pub const ACCEPTED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/webp", "image/svg+xml", "image/png"];
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const SVG_SNIFF_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageSelectionError {
    #[error("unsupported image type '{mime}'")]
    UnsupportedType { mime: String },

    #[error("input bytes empty")]
    EmptyInput,

    #[error("input too large: {size} bytes, max {max_size}")]
    InputTooLarge { size: usize, max_size: usize },

    #[error("declared type '{declared}' does not match the file contents")]
    ContentMismatch { declared: String },
}

impl From<ImageSelectionError> for AppError {
    fn from(e: ImageSelectionError) -> Self {
        let kind = match e {
            ImageSelectionError::InputTooLarge { .. } => ErrorKind::ImageTooLarge,
            ImageSelectionError::UnsupportedType { .. }
            | ImageSelectionError::EmptyInput
            | ImageSelectionError::ContentMismatch { .. } => ErrorKind::ImageFormatUnsupported,
        };
        AppError::new(kind, e.to_string())
    }
}

fn expected_format(mime: &str) -> Option<ImageFormat> {
    match mime {
        "image/jpeg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        "image/webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_BYTES)];
    String::from_utf8_lossy(head).contains("<svg")
}

/// Checks a picked file against the accepted types and its own magic bytes.
pub fn validate_selection(mime: &str, bytes: &[u8]) -> Result<(), ImageSelectionError> {
    if !ACCEPTED_IMAGE_TYPES.contains(&mime) {
        return Err(ImageSelectionError::UnsupportedType {
            mime: mime.to_string(),
        });
    }

    if bytes.is_empty() {
        return Err(ImageSelectionError::EmptyInput);
    }

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageSelectionError::InputTooLarge {
            size: bytes.len(),
            max_size: MAX_IMAGE_BYTES,
        });
    }

    let matches = match expected_format(mime) {
        Some(expected) => image::guess_format(bytes).is_ok_and(|found| found == expected),
        None => looks_like_svg(bytes),
    };

    if !matches {
        return Err(ImageSelectionError::ContentMismatch {
            declared: mime.to_string(),
        });
    }

    Ok(())
}

/// `data:<mime>;base64,<payload>` for a validated selection.
#[instrument(level = "debug", skip(bytes), fields(size = bytes.len()))]
pub fn preview_data_url(mime: &str, bytes: &[u8]) -> Result<String, ImageSelectionError> {
    validate_selection(mime, bytes)?;
    let engine = base64::engine::general_purpose::STANDARD;
    let url = format!("data:{mime};base64,{}", engine.encode(bytes));
    debug!(len = url.len(), "image preview ready");
    Ok(url)
}
