//! Mapping between the on-screen crop box and natural image pixels.
//!
//! The image is drawn scaled to fit the available area, so every rectangle
//! the user sees lives in *display* coordinates while the crop itself is taken
//! in *natural* (stored) pixels. The two are related by an independent scale
//! per axis.

use crate::error::CropError;

/// Natural (stored) dimensions of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle given by its top-left corner and extent.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_center_size(center: (f32, f32), width: f32, height: f32) -> Self {
        Self::new(
            center.0 - width / 2.0,
            center.1 - height / 2.0,
            width,
            height,
        )
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..self
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// True when the rectangle has no usable area.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Shift the rectangle so it lies within `bounds`.
    ///
    /// An axis on which the rectangle is larger than `bounds` is centered
    /// instead. The size never changes.
    pub fn kept_inside(self, bounds: Rect) -> Self {
        fn axis(start: f32, len: f32, min: f32, bound_len: f32) -> f32 {
            if len >= bound_len {
                min + (bound_len - len) / 2.0
            } else {
                start.clamp(min, min + bound_len - len)
            }
        }

        Self {
            left: axis(self.left, self.width, bounds.left, bounds.width),
            top: axis(self.top, self.height, bounds.top, bounds.height),
            ..self
        }
    }

    /// Map a rectangle laid out against `from` onto the same relative
    /// position and extent within `to`.
    pub fn remap(self, from: Rect, to: Rect) -> Self {
        if from.is_degenerate() {
            return self;
        }
        let sx = to.width / from.width;
        let sy = to.height / from.height;
        Self {
            left: to.left + (self.left - from.left) * sx,
            top: to.top + (self.top - from.top) * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }

    /// Whole-pixel version of the rectangle for display.
    pub fn rounded(&self) -> PixelReadout {
        PixelReadout {
            x: self.left.round() as i64,
            y: self.top.round() as i64,
            width: self.width.round() as i64,
            height: self.height.round() as i64,
        }
    }
}

/// Crop position and size rounded to whole natural pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelReadout {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelReadout {
    pub fn position_label(&self) -> String {
        format!("({}, {})", self.x, self.y)
    }

    pub fn size_label(&self) -> String {
        format!("{}×{}px", self.width, self.height)
    }
}

/// Natural pixels per display pixel, per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayScale {
    pub x: f32,
    pub y: f32,
}

impl DisplayScale {
    /// Scale between an image's natural size and the rectangle it is drawn in.
    ///
    /// Recomputed whenever the layout changes; never cached.
    pub fn between(natural: ImageSize, display: Rect) -> Result<Self, CropError> {
        if natural.width == 0 || natural.height == 0 {
            return Err(CropError::InvalidInput(format!(
                "image has no pixels ({}x{})",
                natural.width, natural.height
            )));
        }
        if display.is_degenerate() {
            return Err(CropError::InvalidInput(format!(
                "image is not displayed ({}x{})",
                display.width, display.height
            )));
        }
        Ok(Self {
            x: natural.width as f32 / display.width,
            y: natural.height as f32 / display.height,
        })
    }
}

/// Size a crop box covering `output_size` natural pixels and center it on the
/// displayed image. The result is in display coordinates.
pub fn compute_crop_box(
    natural: ImageSize,
    image_display: Rect,
    output_size: u32,
) -> Result<Rect, CropError> {
    if output_size == 0 {
        return Err(CropError::InvalidInput("crop size must be positive".into()));
    }
    let scale = DisplayScale::between(natural, image_display)?;
    let width = output_size as f32 / scale.x;
    let height = output_size as f32 / scale.y;
    Ok(Rect::from_center_size(image_display.center(), width, height))
}

/// Translate a crop box from display coordinates into natural pixels.
///
/// The result is unrounded; use [`Rect::rounded`] for a readout.
pub fn to_natural_rect(
    crop_box: Rect,
    image_display: Rect,
    natural: ImageSize,
) -> Result<Rect, CropError> {
    let scale = DisplayScale::between(natural, image_display)?;
    Ok(Rect {
        left: (crop_box.left - image_display.left) * scale.x,
        top: (crop_box.top - image_display.top) * scale.y,
        width: crop_box.width * scale.x,
        height: crop_box.height * scale.y,
    })
}

/// Largest rectangle with the image's aspect ratio that fits in `available`,
/// centered within it.
pub fn fit_within(natural: ImageSize, available: Rect) -> Rect {
    if natural.width == 0 || natural.height == 0 || available.is_degenerate() {
        return Rect::new(available.left, available.top, 0.0, 0.0);
    }
    let scale = (available.width / natural.width as f32)
        .min(available.height / natural.height as f32);
    let width = natural.width as f32 * scale;
    let height = natural.height as f32 * scale;
    Rect::from_center_size(available.center(), width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn assert_close(a: f32, b: f32) {
        assert!(
            (a - b).abs() <= EPS * b.abs().max(1.0),
            "expected {b}, got {a}"
        );
    }

    #[test]
    fn square_image_at_half_scale() {
        let natural = ImageSize::new(500, 500);
        let display = Rect::new(0.0, 0.0, 250.0, 250.0);

        let crop_box = compute_crop_box(natural, display, 100).unwrap();
        assert_eq!(crop_box, Rect::new(100.0, 100.0, 50.0, 50.0));

        let region = to_natural_rect(crop_box, display, natural).unwrap();
        assert_eq!(region, Rect::new(200.0, 200.0, 100.0, 100.0));
    }

    #[test]
    fn box_recovers_output_size_for_any_layout() {
        let naturals = [(500, 500), (1920, 1080), (37, 913), (1, 1), (4000, 3)];
        let displays = [
            Rect::new(0.0, 0.0, 250.0, 250.0),
            Rect::new(13.5, 40.25, 801.0, 450.0),
            Rect::new(-120.0, 7.0, 3.0, 2000.0),
            Rect::new(0.0, 0.0, 0.5, 0.5),
        ];
        for (w, h) in naturals {
            for display in displays {
                for size in [1, 16, 64, 100, 256, 1000] {
                    let natural = ImageSize::new(w, h);
                    let crop_box = compute_crop_box(natural, display, size).unwrap();
                    let region = to_natural_rect(crop_box, display, natural).unwrap();
                    assert_close(region.width, size as f32);
                    assert_close(region.height, size as f32);
                }
            }
        }
    }

    #[test]
    fn box_is_centered_on_the_displayed_image() {
        let display = Rect::new(40.0, 20.0, 400.0, 300.0);
        let crop_box = compute_crop_box(ImageSize::new(800, 600), display, 64).unwrap();
        let (cx, cy) = crop_box.center();
        assert_close(cx, 240.0);
        assert_close(cy, 170.0);
        assert_close(crop_box.width, 32.0);
    }

    #[test]
    fn independent_axis_scales() {
        // Stretched display: 2 natural px per display px horizontally, 4 vertically.
        let display = Rect::new(0.0, 0.0, 100.0, 50.0);
        let crop_box = compute_crop_box(ImageSize::new(200, 200), display, 40).unwrap();
        assert_close(crop_box.width, 20.0);
        assert_close(crop_box.height, 10.0);
    }

    #[test]
    fn natural_rect_is_relative_to_image_origin() {
        let display = Rect::new(10.0, 30.0, 100.0, 100.0);
        let crop_box = Rect::new(20.0, 50.0, 10.0, 10.0);
        let region = to_natural_rect(crop_box, display, ImageSize::new(1000, 1000)).unwrap();
        assert_eq!(region, Rect::new(100.0, 200.0, 100.0, 100.0));
    }

    #[test]
    fn hidden_image_is_rejected() {
        let natural = ImageSize::new(10, 10);
        assert!(compute_crop_box(natural, Rect::default(), 16).is_err());
        assert!(to_natural_rect(Rect::default(), Rect::new(0.0, 0.0, 0.0, 5.0), natural).is_err());
        assert!(compute_crop_box(ImageSize::new(0, 10), Rect::new(0.0, 0.0, 5.0, 5.0), 16).is_err());
    }

    #[test]
    fn zero_output_size_is_rejected() {
        let display = Rect::new(0.0, 0.0, 5.0, 5.0);
        assert!(compute_crop_box(ImageSize::new(10, 10), display, 0).is_err());
    }

    #[test]
    fn readout_rounds_to_whole_pixels() {
        let readout = Rect::new(10.4, 10.6, 99.5, 100.49).rounded();
        assert_eq!(readout.position_label(), "(10, 11)");
        assert_eq!(readout.size_label(), "100×100px");
    }

    #[test]
    fn kept_inside_clamps_and_centers() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let moved = Rect::new(90.0, -5.0, 20.0, 20.0).kept_inside(bounds);
        assert_eq!(moved, Rect::new(80.0, 0.0, 20.0, 20.0));

        let oversized = Rect::new(3.0, 3.0, 140.0, 10.0).kept_inside(bounds);
        assert_eq!(oversized, Rect::new(-20.0, 3.0, 140.0, 10.0));
    }

    #[test]
    fn remap_preserves_natural_region() {
        let natural = ImageSize::new(640, 480);
        let old = Rect::new(0.0, 0.0, 320.0, 240.0);
        let new = Rect::new(50.0, 10.0, 640.0, 480.0);
        let crop_box = Rect::new(100.0, 60.0, 32.0, 32.0);
        let before = to_natural_rect(crop_box, old, natural).unwrap();
        let after = to_natural_rect(crop_box.remap(old, new), new, natural).unwrap();
        assert_close(after.left, before.left);
        assert_close(after.top, before.top);
        assert_close(after.width, before.width);
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        let fitted = fit_within(ImageSize::new(200, 100), Rect::new(0.0, 0.0, 400.0, 400.0));
        assert_eq!(fitted, Rect::new(0.0, 100.0, 400.0, 200.0));
    }
}
