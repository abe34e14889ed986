use base64::{engine::general_purpose::STANDARD, Engine as _};
use qrcode::{render::svg, QrCode};

use crate::error::{AppError, Result};

/// Renders `payload` as an SVG QR code.
pub fn render_svg(payload: &str) -> Result<String> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::Internal(format!("Failed to encode QR code: {}", e)))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .quiet_zone(true)
        .build())
}

/// Same as [`render_svg`] but packaged as a `data:` URL for `<img src>`.
pub fn render_data_url(payload: &str) -> Result<String> {
    let svg = render_svg(payload)?;
    Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_svg_document() {
        let svg = render_svg("abc123").unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn data_url_has_svg_prefix() {
        let url = render_data_url("abc123").unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));
    }
}
