//! Image encoding and `data:` URL handling.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::CropError;

/// Extensions accepted by the open dialog.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.92;

/// Formats a crop can be exported as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Png, ExportFormat::Jpeg];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    /// Upper-case name shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
        }
    }

    /// Whether the quality setting has any effect.
    pub fn is_lossy(self) -> bool {
        matches!(self, ExportFormat::Jpeg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            other => Err(format!("unsupported format '{other}' (expected png or jpeg)")),
        }
    }
}

/// MIME type for an image path, judged by extension only.
/// Unknown extensions are treated as JPEG.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Decode the payload of a `data:<mime>;base64,<payload>` reference.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, CropError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(CropError::InvalidImageData)?;
    let (_, payload) = rest.split_once(',').ok_or(CropError::InvalidImageData)?;
    STANDARD
        .decode(payload.trim())
        .map_err(|_| CropError::InvalidImageData)
}

/// Map a `0.0..=1.0` quality onto the JPEG encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    let q = if quality.is_finite() { quality } else { DEFAULT_JPEG_QUALITY };
    (q.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode a rendered crop. `quality` only applies to JPEG.
pub fn encode(image: &RgbaImage, format: ExportFormat, quality: f32) -> Result<Vec<u8>, CropError> {
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => {
            PngEncoder::new(&mut bytes)
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(CropError::Encode)?;
        }
        ExportFormat::Jpeg => {
            // JPEG has no alpha channel; transparent pixels end up as their color.
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality))
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(CropError::Encode)?;
        }
    }
    Ok(bytes)
}
