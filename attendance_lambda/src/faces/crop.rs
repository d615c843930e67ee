use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::error::{AttendanceError, AttendanceResult};
use crate::model::PixelRect;

/// Decodes `image` and crops `rect` out of it. See [`crop_face`].
pub fn crop_face_bytes(image: &[u8], rect: PixelRect) -> AttendanceResult<Vec<u8>> {
    let decoded =
        image::load_from_memory(image).map_err(|source| AttendanceError::ImageDecode { source })?;
    crop_face(&decoded, rect)
}

/// Crops `rect` out of `image` and encodes it as JPEG.
///
/// A rect that overhangs the image is clipped to the image bounds. A rect
/// with nothing left after clipping fails with
/// [`AttendanceError::CropOutOfBounds`].
pub fn crop_face(image: &DynamicImage, rect: PixelRect) -> AttendanceResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    let (x, crop_width) = clip(rect.left, rect.width, width).ok_or(
        AttendanceError::CropOutOfBounds {
            rect,
            width,
            height,
        },
    )?;
    let (y, crop_height) = clip(rect.top, rect.height, height).ok_or(
        AttendanceError::CropOutOfBounds {
            rect,
            width,
            height,
        },
    )?;

    // JPEG has no alpha channel.
    let face = DynamicImage::ImageRgb8(image.crop_imm(x, y, crop_width, crop_height).to_rgb8());
    let mut encoded = Cursor::new(Vec::new());
    face.write_to(&mut encoded, ImageFormat::Jpeg)
        .map_err(|source| AttendanceError::ImageEncode { source })?;
    Ok(encoded.into_inner())
}

/// Intersects `[start, start + len)` with `[0, bound)`.
fn clip(start: i64, len: i64, bound: u32) -> Option<(u32, u32)> {
    let end = start.saturating_add(len).min(i64::from(bound));
    let start = start.max(0);
    if end <= start {
        return None;
    }
    Some((start as u32, (end - start) as u32))
}
