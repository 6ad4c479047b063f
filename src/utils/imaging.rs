//! Image reduction for upload and on-screen thumbnails

use crate::capture::{PickedImage, Thumbnail};
use crate::config::PickerConfig;
use crate::{FarmerError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType};
use std::sync::Arc;
use tracing::debug;

/// Edge length of preview thumbnails
pub const THUMBNAIL_SIZE: u32 = 256;

/// Decode picked bytes, downscale, re-encode as JPEG and base64 the result
pub fn prepare_picked_image(
    bytes: &[u8],
    preview_ref: &str,
    config: &PickerConfig,
) -> Result<PickedImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| FarmerError::PickerError(format!("Unsupported image: {}", e)))?;

    let (width, height) = (decoded.width(), decoded.height());
    let max = config.max_dimension.max(1);
    let reduced = if width > max || height > max {
        decoded.resize(max, max, FilterType::Triangle)
    } else {
        decoded
    };

    let jpeg = encode_jpeg(&reduced, config.jpeg_quality)?;
    debug!(
        "Prepared {} ({}x{} -> {}x{}, {} bytes)",
        preview_ref,
        width,
        height,
        reduced.width(),
        reduced.height(),
        jpeg.len()
    );

    let mut picked = PickedImage::new(preview_ref, STANDARD.encode(&jpeg));
    picked.thumbnail = Some(Arc::new(make_thumbnail(&reduced)));
    Ok(picked)
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| FarmerError::PickerError(format!("JPEG encoding failed: {}", e)))?;
    Ok(jpeg)
}

pub fn make_thumbnail(image: &DynamicImage) -> Thumbnail {
    let small = if image.width() > THUMBNAIL_SIZE || image.height() > THUMBNAIL_SIZE {
        image.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).to_rgba8()
    } else {
        image.to_rgba8()
    };
    Thumbnail {
        size: [small.width() as usize, small.height() as usize],
        rgba: small.into_raw(),
    }
}

/// Split `data:<mime>;base64,<payload>` into mime type and decoded bytes
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FarmerError::MalformedRecord("image is not a data URI".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FarmerError::MalformedRecord("data URI has no payload".into()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| FarmerError::MalformedRecord("data URI is not base64".into()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| FarmerError::MalformedRecord(format!("invalid base64 image: {}", e)))?;
    Ok((mime.to_string(), bytes))
}

/// Thumbnail for a stored history image
pub fn thumbnail_from_data_uri(uri: &str) -> Result<Thumbnail> {
    let (_, bytes) = decode_data_uri(uri)?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| FarmerError::MalformedRecord(format!("undecodable image: {}", e)))?;
    Ok(make_thumbnail(&image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 160, 60])));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_large_image_is_downscaled_to_jpeg() {
        let config = PickerConfig {
            max_dimension: 512,
            jpeg_quality: 50,
        };
        let picked = prepare_picked_image(&png_bytes(2048, 1024), "leaf.png", &config).unwrap();

        assert_eq!(picked.mime_type, "image/jpeg");
        let jpeg = STANDARD.decode(&picked.payload_base64).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (512, 256));

        let thumb = picked.thumbnail.unwrap();
        assert_eq!(thumb.size, [256, 128]);
        assert_eq!(thumb.rgba.len(), 256 * 128 * 4);
    }

    #[test]
    fn test_small_image_keeps_size() {
        let picked =
            prepare_picked_image(&png_bytes(300, 200), "leaf.png", &PickerConfig::default()).unwrap();
        let jpeg = STANDARD.decode(&picked.payload_base64).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 200));
    }

    #[test]
    fn test_garbage_is_picker_error() {
        let err = prepare_picked_image(b"not an image", "x", &PickerConfig::default()).unwrap_err();
        assert!(matches!(err, FarmerError::PickerError(_)));
    }

    #[test]
    fn test_data_uri_round_trip_to_thumbnail() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(64, 32)));
        let (mime, bytes) = decode_data_uri(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert!(!bytes.is_empty());

        let thumb = thumbnail_from_data_uri(&uri).unwrap();
        assert_eq!(thumb.size, [64, 32]);
    }

    #[test]
    fn test_bad_data_uri() {
        assert!(decode_data_uri("https://example.com/leaf.jpg").is_err());
        assert!(decode_data_uri("data:image/jpeg,abc").is_err());
    }
}
