//! Image preprocessing for the character classifier.
//!
//! Mirrors the evaluation transform the model was trained with:
//! - Resize so the shorter side is `resize_size` (aspect preserved)
//! - Center crop to `image_size × image_size`
//! - Channel order: RGB, pixels scaled to [0, 1]
//! - ImageNet normalization: (pixel - mean) / std per channel
//! - Tensor layout: NCHW [batch, channels, height, width]

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// ImageNet per-channel mean.
const NORM_MEAN: [f32; CHANNELS] = [0.485, 0.456, 0.406];

/// ImageNet per-channel std.
const NORM_STD: [f32; CHANNELS] = [0.229, 0.224, 0.225];

/// Preprocess an image for classifier inference.
pub fn preprocess(image: &DynamicImage, resize_size: u32, image_size: u32) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let (new_w, new_h) = shorter_side_to(width, height, resize_size);
    let resized = image.resize_exact(new_w, new_h, FilterType::Triangle);

    let left = new_w.saturating_sub(image_size) / 2;
    let top = new_h.saturating_sub(image_size) / 2;
    let cropped = resized.crop_imm(left, top, image_size, image_size);
    let rgb = cropped.to_rgb8();

    let size = image_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, size, size));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..CHANNELS {
            let value = pixel.0[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (value - NORM_MEAN[c]) / NORM_STD[c];
        }
    }

    tensor
}

/// Dimensions after scaling so the shorter side equals `target`.
fn shorter_side_to(width: u32, height: u32, target: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (target, target);
    }
    if width <= height {
        let scaled = (height as f64 * target as f64 / width as f64).round() as u32;
        (target, scaled.max(target))
    } else {
        let scaled = (width as f64 * target as f64 / height as f64).round() as u32;
        (scaled.max(target), target)
    }
}
