//! # Image Loading and Decoding
//!
//! Turns an image source from a note into something the PDF serializer can
//! embed, and reports its natural pixel size for placement.
//!
//! JPEG bytes pass through untouched (DCTDecode). Everything else the
//! `image` crate can read (PNG, WebP) is decoded to RGB with a separate alpha
//! plane for SMask transparency.

use std::io::Cursor;

use crate::error::{Error, Result};

/// A decoded image ready for embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Height over width.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width_px == 0 {
            return 1.0;
        }
        self.height_px as f64 / self.width_px as f64
    }
}

/// Pixel payload in a form the serializer writes directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// `width * height * 3` RGB bytes plus an optional alpha plane.
    Decoded {
        rgb: Vec<u8>,
        /// `None` when every pixel is opaque.
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Load an image from a source string.
///
/// Accepted sources:
/// - `data:image/...;base64,...`
/// - `file://` URLs and absolute or `./`-relative paths
/// - raw base64 image bytes
///
/// Remote `http(s)` sources are rejected; notes are exported offline.
pub fn load_image(src: &str) -> Result<LoadedImage> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    if let Some(rest) = src.strip_prefix("data:") {
        let comma = rest
            .find(',')
            .ok_or_else(|| Error::Image("invalid data URI: missing comma".to_string()))?;
        let (header, payload) = (&rest[..comma], &rest[comma + 1..]);
        if !header.starts_with("image/") {
            return Err(Error::Image(format!("data URI is not an image: {}", header)));
        }
        return base64_decode(payload);
    }

    if src.starts_with("http://") || src.starts_with("https://") {
        return Err(Error::Image(format!("remote image not supported: {}", src)));
    }

    // raw base64 JPEG starts with "/9j/", so a path must also exist
    let path = src.strip_prefix("file://").unwrap_or(src);
    let path_like = path.starts_with('/') || path.starts_with("./") || path.starts_with("../");
    if src.starts_with("file://") || (path_like && std::path::Path::new(path).is_file()) {
        return std::fs::read(path)
            .map_err(|e| Error::Image(format!("failed to read image file '{}': {}", path, e)));
    }

    base64_decode(src).map_err(|e| {
        if path_like {
            Error::Image(format!("image file not found: {}", path))
        } else {
            e
        }
    })
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| Error::Image(format!("base64 decode error: {}", e)))
}

/// Detect the format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage> {
    if data.len() < 4 {
        return Err(Error::Image("image data too short".to_string()));
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else {
        decode_pixels(data)
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

/// Read the dimensions and color space without decoding JPEG pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| Error::Image(format!("JPEG format detection error: {}", e)))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| Error::Image(format!("failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk the JPEG markers to the SOF segment and read its component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Decode any other supported format to RGB + alpha.
fn decode_pixels(data: &[u8]) -> Result<LoadedImage> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| Error::Image(format!("format detection error: {}", e)))?;

    if reader.format().is_none() {
        return Err(Error::Image("unsupported image format".to_string()));
    }

    let img = reader
        .decode()
        .map_err(|e| Error::Image(format!("failed to decode image: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixels = pixel_count(width, height);
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: has_transparency.then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}
