//! Image format conversion.

use std::io::{BufRead, Seek, Write};

use common::ServiceError;
use image::{DynamicImage, ImageFormat, ImageReader};

/// Output formats accepted by `POST /api/image/convert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Png,
    Jpeg,
}

impl TargetFormat {
    /// Parse the `target` form field. `jpg` is accepted as a spelling of
    /// `jpeg`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Some(TargetFormat::Png),
            "jpeg" | "jpg" => Some(TargetFormat::Jpeg),
            _ => None,
        }
    }

    /// File extension used in the download name.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpg",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Decode an uploaded image (format sniffed from its bytes) and re-encode it
/// as `target` into `output`.
///
/// # Errors
///
/// Returns [`ServiceError::UnprocessableInput`] if the input cannot be
/// decoded as an image, and [`ServiceError::Internal`] on encode or I/O
/// failure.
pub fn convert<R, W>(input: R, mut output: W, target: TargetFormat) -> Result<(), ServiceError>
where
    R: BufRead + Seek,
    W: Write + Seek,
{
    let img = ImageReader::new(input)
        .with_guessed_format()
        .map_err(|e| ServiceError::UnprocessableInput(format!("unreadable image: {e}")))?
        .decode()
        .map_err(|e| ServiceError::UnprocessableInput(format!("undecodable image: {e}")))?;

    // JPEG has no alpha channel; flatten instead of failing on RGBA sources.
    let img = match target {
        TargetFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        TargetFormat::Png => img,
    };

    img.write_to(&mut output, target.image_format())
        .map_err(|e| ServiceError::Internal(format!("image encode failed: {e}")))?;
    Ok(())
}
