use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{AppError, Result};

/// Allowed image types and the extension we store them under.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub content_type: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Decodes a `data:image/...;base64,` URL as produced by a webcam screenshot
/// or a file input.
pub fn decode_data_url(field: &str, data_url: &str, max_bytes: usize) -> Result<DecodedImage> {
    let rest = data_url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| AppError::Validation(format!("{} must be an image data URL", field)))?;

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::Validation(format!("{} must be an image data URL", field)))?;

    let content_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| AppError::Validation(format!("{} must be base64 encoded", field)))?
        .to_lowercase();

    let extension = ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "{} has an unsupported type. Allowed: jpeg, png, webp",
                field
            ))
        })?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::Validation(format!("{} is not valid base64", field)))?;

    if bytes.is_empty() {
        return Err(AppError::Validation(format!("{} is empty", field)));
    }

    if bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "{} is too large (max {} MB)",
            field,
            max_bytes / (1024 * 1024)
        )));
    }

    if !has_signature(extension, &bytes) {
        return Err(AppError::Validation(format!(
            "{} is not a valid {} image",
            field, extension
        )));
    }

    Ok(DecodedImage {
        content_type,
        extension,
        bytes,
    })
}

/// Checks the leading magic bytes against the declared type.
fn has_signature(extension: &str, bytes: &[u8]) -> bool {
    match extension {
        "jpg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "png" => bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        "webp" => bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        _ => false,
    }
}
