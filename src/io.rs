use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, ImageError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::canvas::RasterBuffer;

/// PNG compression level for exported images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

impl PngCompression {
    pub fn as_str(&self) -> &'static str {
        match self {
            PngCompression::Fast => "fast",
            PngCompression::Default => "default",
            PngCompression::Best => "best",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Some(PngCompression::Fast),
            "default" => Some(PngCompression::Default),
            "best" => Some(PngCompression::Best),
            _ => None,
        }
    }

    fn compression_type(self) -> CompressionType {
        match self {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

/// Error type for encoding and writing the edited image
#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Image(ImageError),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "I/O error: {}", e),
            ExportError::Image(e) => write!(f, "Encode error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::Image(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<ImageError> for ExportError {
    fn from(e: ImageError) -> Self {
        ExportError::Image(e)
    }
}

/// Decode any supported image file into an RGBA buffer.
pub fn load_image_sync(path: &Path) -> Result<RasterBuffer, String> {
    let img = image::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(RasterBuffer::from_image(img.into_rgba8()))
}

/// Encode a buffer as PNG into any writer.
pub fn encode_png<W: Write>(
    buffer: &RasterBuffer,
    writer: W,
    compression: PngCompression,
) -> Result<(), ExportError> {
    let encoder =
        PngEncoder::new_with_quality(writer, compression.compression_type(), FilterType::Adaptive);
    encoder.write_image(
        buffer.as_raw(),
        buffer.width(),
        buffer.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

/// Encode a buffer as PNG in memory.
pub fn encode_png_bytes(
    buffer: &RasterBuffer,
    compression: PngCompression,
) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    encode_png(buffer, &mut bytes, compression)?;
    Ok(bytes)
}

/// Encode a buffer as PNG and write it to `path`.
pub fn write_png(
    buffer: &RasterBuffer,
    path: &Path,
    compression: PngCompression,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_png(buffer, &mut writer, compression)?;
    writer.flush()?;
    Ok(())
}
