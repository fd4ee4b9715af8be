//! The seam between the cropping logic and whatever draws the crop box.

use crate::geometry::Rect;

/// Called with the new crop box whenever the user moves it.
pub type AdjustCallback = Box<dyn FnMut(Rect)>;

/// Minimal capability of an interactive crop-box widget.
///
/// All rectangles are in display coordinates.
pub trait CropWidget {
    /// Current crop box.
    fn display_rect(&self) -> Rect;

    /// Replace the crop box, e.g. after a size change.
    fn set_display_rect(&mut self, rect: Rect);

    /// Where the image itself is currently drawn.
    fn image_display_rect(&self) -> Rect;

    /// Register the callback fired after user drags. Replaces any previous one.
    fn on_user_adjust(&mut self, callback: AdjustCallback);
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    /// Widget with a fixed layout that records what it was told.
    #[derive(Default)]
    pub struct FakeWidget {
        pub image_rect: Rect,
        pub crop_box: Rect,
        callback: Option<AdjustCallback>,
    }

    impl FakeWidget {
        pub fn showing(image_rect: Rect) -> Self {
            Self {
                image_rect,
                ..Default::default()
            }
        }

        /// Simulate the user dragging the box by `(dx, dy)`.
        pub fn drag(&mut self, dx: f32, dy: f32) {
            self.crop_box = self.crop_box.translate(dx, dy);
            if let Some(cb) = self.callback.as_mut() {
                cb(self.crop_box);
            }
        }
    }

    impl CropWidget for FakeWidget {
        fn display_rect(&self) -> Rect {
            self.crop_box
        }

        fn set_display_rect(&mut self, rect: Rect) {
            self.crop_box = rect;
        }

        fn image_display_rect(&self) -> Rect {
            self.image_rect
        }

        fn on_user_adjust(&mut self, callback: AdjustCallback) {
            self.callback = Some(callback);
        }
    }
}
