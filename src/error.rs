//! Error type shared by every cropping operation.

use std::path::PathBuf;

/// Errors that can occur while loading, cropping or exporting an image.
///
/// A dismissed dialog is not an error; see [`crate::bridge::Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image payload is not a `data:<mime>;base64,<payload>` reference.
    #[error("Invalid image data format")]
    InvalidImageData,

    /// The source region or output size cannot produce an image.
    #[error("cannot render a {size}px crop from a {width}x{height} region")]
    DegenerateCrop { width: f32, height: f32, size: u32 },

    /// An argument was outside the range the operation supports.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Coarse classification used when reporting a failure to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Io,
    InvalidInput,
}

impl CropError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CropError::Io { .. } => FailureKind::Io,
            CropError::InvalidImageData
            | CropError::DegenerateCrop { .. }
            | CropError::InvalidInput(_)
            | CropError::Decode(_)
            | CropError::Encode(_) => FailureKind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_data_message_matches_boundary_text() {
        assert_eq!(
            CropError::InvalidImageData.to_string(),
            "Invalid image data format"
        );
    }

    #[test]
    fn io_error_names_the_path() {
        let err = CropError::io(
            "/tmp/missing.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.kind(), FailureKind::Io);
        assert!(err.to_string().starts_with("/tmp/missing.png: "));
    }

    #[test]
    fn degenerate_crop_is_invalid_input() {
        let err = CropError::DegenerateCrop {
            width: 0.0,
            height: 10.0,
            size: 64,
        };
        assert_eq!(err.kind(), FailureKind::InvalidInput);
    }
}
