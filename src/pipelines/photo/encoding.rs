// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! Frames are encoded to PNG at capture time. Images loaded from disk keep
//! their original bytes when they are PNG or JPEG and are converted to PNG
//! only when sent to the counting service.

use crate::backends::camera::types::{CameraFrame, PixelFormat};
use crate::errors::PhotoError;
use image::{ImageFormat, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFormat {
    /// PNG format (lossless compression)
    Png,
    /// JPEG format (lossy compression)
    Jpeg,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Png => "png",
            EncodingFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            EncodingFormat::Png => "image/png",
            EncodingFormat::Jpeg => "image/jpeg",
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(EncodingFormat::Png),
            ImageFormat::Jpeg => Some(EncodingFormat::Jpeg),
            _ => None,
        }
    }
}

/// Encoded image payload, immutable and cheap to clone
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Arc<[u8]>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EncodedImage({:?}, {}x{}, {} bytes)",
            self.format,
            self.width,
            self.height,
            self.data.len()
        )
    }
}

impl EncodedImage {
    /// Encode RGBA pixels as PNG
    pub fn png_from_rgba(image: &RgbaImage) -> Result<Self, PhotoError> {
        let mut buffer = Vec::new();
        image.write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(Self {
            data: Arc::from(buffer.into_boxed_slice()),
            format: EncodingFormat::Png,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Wrap already-encoded bytes, detecting the format from the content
    ///
    /// Formats other than PNG and JPEG are decoded and re-encoded as PNG.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PhotoError> {
        let detected = image::guess_format(&bytes)?;
        let decoded = image::load_from_memory_with_format(&bytes, detected)?;

        match EncodingFormat::from_image_format(detected) {
            Some(format) => Ok(Self {
                data: Arc::from(bytes.into_boxed_slice()),
                format,
                width: decoded.width(),
                height: decoded.height(),
            }),
            None => {
                debug!(format = ?detected, "Converting image to PNG");
                Self::png_from_rgba(&decoded.to_rgba8())
            }
        }
    }

    /// PNG rendition for transport, borrowing-free when already PNG
    pub fn to_png(&self) -> Result<Self, PhotoError> {
        if self.format == EncodingFormat::Png {
            return Ok(self.clone());
        }
        let decoded = image::load_from_memory(&self.data)?;
        Self::png_from_rgba(&decoded.to_rgba8())
    }
}

/// Encode a camera frame as PNG
pub fn encode_frame(frame: &CameraFrame) -> Result<EncodedImage, PhotoError> {
    if !frame.is_complete() {
        return Err(PhotoError::NoFrameAvailable);
    }

    let width = frame.width;
    let height = frame.height;
    let data = frame.data_slice();
    let bpp = frame.format.bytes_per_pixel() as usize;
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);

    for y in 0..height as usize {
        let row_start = y * frame.stride as usize;
        let row = &data[row_start..row_start + width as usize * bpp];
        match frame.format {
            PixelFormat::RGBA => rgba.extend_from_slice(row),
            PixelFormat::RGB24 => {
                for px in row.chunks_exact(3) {
                    rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
            }
            PixelFormat::Gray8 => {
                for &v in row {
                    rgba.extend_from_slice(&[v, v, v, 255]);
                }
            }
        }
    }

    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| PhotoError::EncodingFailed("Failed to create image".to_string()))?;
    let encoded = EncodedImage::png_from_rgba(&image)?;
    debug!(width, height, size = encoded.data.len(), "Frame encoded");
    Ok(encoded)
}

/// Load an image file for counting
pub fn load_image_file(path: &Path) -> Result<EncodedImage, PhotoError> {
    info!(path = %path.display(), "Loading image for counting");
    let bytes = std::fs::read(path)
        .map_err(|e| PhotoError::EncodingFailed(format!("{}: {}", path.display(), e)))?;
    EncodedImage::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn gray_frame(stride: u32) -> CameraFrame {
        let mut data = vec![0u8; (stride * 2) as usize];
        data[0] = 10;
        data[1] = 20;
        data[stride as usize] = 30;
        data[stride as usize + 1] = 40;
        CameraFrame {
            width: 2,
            height: 2,
            data: Arc::from(data),
            format: PixelFormat::Gray8,
            stride,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(EncodingFormat::Png.extension(), "png");
        assert_eq!(EncodingFormat::Jpeg.extension(), "jpg");
        assert_eq!(EncodingFormat::Png.mime_type(), "image/png");
    }

    #[test]
    fn test_encode_frame_skips_stride_padding() {
        let encoded = encode_frame(&gray_frame(8)).unwrap();
        assert_eq!(encoded.format, EncodingFormat::Png);
        assert_eq!((encoded.width, encoded.height), (2, 2));

        let decoded = image::load_from_memory(&encoded.data).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(1, 0).0, [20, 20, 20, 255]);
        assert_eq!(decoded.get_pixel(0, 1).0, [30, 30, 30, 255]);
    }

    #[test]
    fn test_encode_incomplete_frame_fails() {
        let mut frame = gray_frame(2);
        frame.data = Arc::from(vec![0u8; 3]);
        assert_eq!(encode_frame(&frame), Err(PhotoError::NoFrameAvailable));
    }

    #[test]
    fn test_jpeg_is_converted_to_png_for_transport() {
        let mut jpeg = Vec::new();
        image::RgbImage::from_pixel(4, 4, image::Rgb([0, 128, 0]))
            .write_to(&mut std::io::Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        let image = EncodedImage::from_bytes(jpeg).unwrap();
        assert_eq!(image.format, EncodingFormat::Jpeg);

        let png = image.to_png().unwrap();
        assert_eq!(png.format, EncodingFormat::Png);
        assert_eq!((png.width, png.height), (4, 4));
        assert_eq!(image::guess_format(&png.data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_png_to_png_shares_bytes() {
        let image = EncodedImage::png_from_rgba(&RgbaImage::new(1, 1)).unwrap();
        let png = image.to_png().unwrap();
        assert!(Arc::ptr_eq(&image.data, &png.data));
    }
}
