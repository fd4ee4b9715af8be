//! Resampling of a natural-pixel region into a fixed-size square.

use image::{Rgba, RgbaImage};
use log::debug;

use crate::error::CropError;
use crate::geometry::Rect;

/// Color of output pixels whose sample point falls outside the source image.
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Largest output side accepted by [`render`].
pub const MAX_OUTPUT_SIZE: u32 = 8192;

const MAX_OUTPUT_BYTES: u64 = 4 * MAX_OUTPUT_SIZE as u64 * MAX_OUTPUT_SIZE as u64;

/// Upper bound on samples per axis for each output pixel when shrinking.
const MAX_SUPERSAMPLE: u32 = 8;

/// Resample `region` of `source` into an `output_size × output_size` image.
///
/// Every output pixel averages a grid of bilinear samples spread over its
/// footprint in the source, so large reductions don't alias. The result only
/// depends on the inputs.
pub fn render(source: &RgbaImage, region: Rect, output_size: u32) -> Result<RgbaImage, CropError> {
    if output_size == 0 || region.is_degenerate() {
        return Err(CropError::DegenerateCrop {
            width: region.width,
            height: region.height,
            size: output_size,
        });
    }
    check_output_size(output_size)?;

    let step_x = region.width / output_size as f32;
    let step_y = region.height / output_size as f32;
    let samples_x = supersample_count(step_x);
    let samples_y = supersample_count(step_y);
    debug!(
        "rendering {}x{} region at ({}, {}) to {}px with {}x{} samples",
        region.width, region.height, region.left, region.top, output_size, samples_x, samples_y
    );

    let out = RgbaImage::from_fn(output_size, output_size, |ox, oy| {
        let mut acc = [0.0f32; 4];
        for sy in 0..samples_y {
            let fy = region.top + (oy as f32 + (sy as f32 + 0.5) / samples_y as f32) * step_y;
            for sx in 0..samples_x {
                let fx =
                    region.left + (ox as f32 + (sx as f32 + 0.5) / samples_x as f32) * step_x;
                let s = sample(source, fx, fy);
                for (a, v) in acc.iter_mut().zip(s) {
                    *a += v;
                }
            }
        }
        let n = (samples_x * samples_y) as f32;
        unpremultiply([acc[0] / n, acc[1] / n, acc[2] / n, acc[3] / n])
    });
    Ok(out)
}

/// Reject sizes whose RGBA buffer would not be allocatable.
pub fn check_output_size(output_size: u32) -> Result<(), CropError> {
    let bytes = u64::from(output_size)
        .checked_mul(u64::from(output_size))
        .and_then(|px| px.checked_mul(4));
    match bytes {
        Some(b) if b <= MAX_OUTPUT_BYTES => Ok(()),
        _ => Err(CropError::InvalidInput(format!(
            "crop size {output_size}px exceeds the {MAX_OUTPUT_SIZE}px limit"
        ))),
    }
}

fn supersample_count(step: f32) -> u32 {
    (step.ceil() as u32).clamp(1, MAX_SUPERSAMPLE)
}

/// Premultiplied bilinear sample at continuous source position `(x, y)`.
///
/// Pixel `i` covers `[i, i + 1)`; positions outside the image yield
/// [`BACKGROUND`]. Neighbors are clamped to the edge so border pixels do not
/// bleed into the background.
fn sample(source: &RgbaImage, x: f32, y: f32) -> [f32; 4] {
    let (w, h) = source.dimensions();
    if x < 0.0 || y < 0.0 || x >= w as f32 || y >= h as f32 {
        return premultiply(BACKGROUND);
    }

    let px = x - 0.5;
    let py = y - 0.5;
    let x0 = px.floor();
    let y0 = py.floor();
    let tx = px - x0;
    let ty = py - y0;

    let fetch = |xi: f32, yi: f32| {
        let cx = (xi.max(0.0) as u32).min(w - 1);
        let cy = (yi.max(0.0) as u32).min(h - 1);
        premultiply(*source.get_pixel(cx, cy))
    };
    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1.0, y0);
    let p01 = fetch(x0, y0 + 1.0);
    let p11 = fetch(x0 + 1.0, y0 + 1.0);

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] + (p10[c] - p00[c]) * tx;
        let bottom = p01[c] + (p11[c] - p01[c]) * tx;
        out[c] = top + (bottom - top) * ty;
    }
    out
}

fn premultiply(p: Rgba<u8>) -> [f32; 4] {
    let a = p[3] as f32 / 255.0;
    [p[0] as f32 * a, p[1] as f32 * a, p[2] as f32 * a, p[3] as f32]
}

fn unpremultiply(p: [f32; 4]) -> Rgba<u8> {
    let alpha = p[3];
    if alpha <= 0.0 {
        return BACKGROUND;
    }
    let a = alpha / 255.0;
    let channel = |v: f32| (v / a).round().clamp(0.0, 255.0) as u8;
    Rgba([
        channel(p[0]),
        channel(p[1]),
        channel(p[2]),
        alpha.round().clamp(0.0, 255.0) as u8,
    ])
}
