//! Mask resampling between perception and frame resolutions
//!
//! Segmentation models run at a fixed internal resolution (256x256 is
//! typical), so the stabilized mask usually needs one upscale per frame
//! before compositing. The resize goes through a grayscale image round-trip
//! to reuse the image crate's filtering.

use image::{imageops, RgbaImage};

use super::types::Mask;

/// Resize a mask to new dimensions with Lanczos3 filtering.
///
/// Returns a copy untouched when the dimensions already match, and echoes
/// the input (with a warning) when its length does not match the claimed
/// dimensions, leaving the mismatch for the compositor's own guard.
pub fn resize_mask(
    mask: &[f32],
    width: u32,
    height: u32,
    target_width: u32,
    target_height: u32,
) -> Mask {
    let _span = tracing::debug_span!("resize_mask").entered();

    if mask.len() != (width * height) as usize {
        tracing::warn!(
            len = mask.len(),
            expected = width * height,
            "mask length does not match dimensions, skipping resize"
        );
        return mask.to_vec();
    }
    if width == target_width && height == target_height {
        return mask.to_vec();
    }

    let gray = image::GrayImage::from_fn(width, height, |x, y| {
        let idx = (y * width + x) as usize;
        let value = (mask[idx] * 255.0).clamp(0.0, 255.0) as u8;
        image::Luma([value])
    });

    let resized = imageops::resize(
        &gray,
        target_width,
        target_height,
        imageops::FilterType::Lanczos3,
    );

    resized.pixels().map(|p| p[0] as f32 / 255.0).collect()
}

/// Render a mask as a grayscale RGBA image for visualization.
pub fn mask_to_rgba(mask: &[f32], width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let value = mask
            .get((y * width + x) as usize)
            .map(|v| (v * 255.0).clamp(0.0, 255.0) as u8)
            .unwrap_or(0);
        image::Rgba([value, value, value, 255])
    })
}
