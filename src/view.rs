//! egui crop-box widget: draws the image fitted to the panel, dims everything
//! outside the crop box and lets the user drag the box around.

use eframe::egui;

use crate::geometry::{self, ImageSize, Rect};
use crate::widget::{AdjustCallback, CropWidget};

const PADDING: f32 = 20.0;
const HANDLE_RADIUS: f32 = 5.0;

fn to_egui(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(rect.left, rect.top),
        egui::vec2(rect.width, rect.height),
    )
}

fn from_egui(rect: egui::Rect) -> Rect {
    Rect::new(rect.min.x, rect.min.y, rect.width(), rect.height())
}

/// Crop-box widget for a single image. The box size is fixed by the
/// selected output size, so it can be moved but not resized.
#[derive(Default)]
pub struct CropView {
    image_rect: Rect,
    crop_box: Option<Rect>,
    dragging: bool,
    on_adjust: Option<AdjustCallback>,
}

impl CropView {
    /// Forget the crop box, e.g. when a new image is loaded.
    pub fn reset(&mut self) {
        self.crop_box = None;
        self.dragging = false;
    }

    /// Lay the image out in the remaining space, draw it with the crop
    /// overlay, and handle dragging.
    pub fn show(&mut self, ui: &mut egui::Ui, texture: &egui::TextureHandle) -> egui::Response {
        let available = ui.available_rect_before_wrap();
        let inner = available.shrink(PADDING);
        let size = texture.size();
        let natural = ImageSize::new(size[0] as u32, size[1] as u32);
        self.relayout(geometry::fit_within(natural, from_egui(inner)));

        let response = ui.allocate_rect(available, egui::Sense::drag());
        let painter = ui.painter_at(available);
        let image_rect = to_egui(self.image_rect);

        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        if response.drag_started() {
            self.dragging = match (response.interact_pointer_pos(), self.crop_box) {
                (Some(pos), Some(crop_box)) => crop_box.contains(pos.x, pos.y),
                _ => false,
            };
        }

        if response.dragged() && self.dragging {
            let delta = response.drag_delta();
            if let Some(crop_box) = self.crop_box {
                let moved = crop_box
                    .translate(delta.x, delta.y)
                    .kept_inside(self.image_rect);
                if moved != crop_box {
                    self.crop_box = Some(moved);
                    if let Some(cb) = self.on_adjust.as_mut() {
                        cb(moved);
                    }
                }
            }
        }

        if response.drag_stopped() {
            self.dragging = false;
        }

        if let Some(crop_box) = self.crop_box {
            Self::paint_overlay(&painter, image_rect, to_egui(crop_box));
        }

        if self.dragging {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if let (Some(pos), Some(crop_box)) = (response.hover_pos(), self.crop_box) {
            if crop_box.contains(pos.x, pos.y) {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
            }
        }

        response
    }

    /// Keep the crop box on the same part of the image when the layout moves.
    fn relayout(&mut self, image_rect: Rect) {
        if image_rect == self.image_rect {
            return;
        }
        if let Some(crop_box) = self.crop_box {
            self.crop_box = Some(crop_box.remap(self.image_rect, image_rect));
        }
        self.image_rect = image_rect;
    }

    fn paint_overlay(painter: &egui::Painter, image_rect: egui::Rect, crop_rect: egui::Rect) {
        let overlay_color = egui::Color32::from_black_alpha(150);

        // Top
        painter.rect_filled(
            egui::Rect::from_min_max(image_rect.min, egui::pos2(image_rect.max.x, crop_rect.min.y)),
            0.0,
            overlay_color,
        );
        // Bottom
        painter.rect_filled(
            egui::Rect::from_min_max(egui::pos2(image_rect.min.x, crop_rect.max.y), image_rect.max),
            0.0,
            overlay_color,
        );
        // Left
        painter.rect_filled(
            egui::Rect::from_min_max(
                egui::pos2(image_rect.min.x, crop_rect.min.y),
                egui::pos2(crop_rect.min.x, crop_rect.max.y),
            ),
            0.0,
            overlay_color,
        );
        // Right
        painter.rect_filled(
            egui::Rect::from_min_max(
                egui::pos2(crop_rect.max.x, crop_rect.min.y),
                egui::pos2(image_rect.max.x, crop_rect.max.y),
            ),
            0.0,
            overlay_color,
        );

        painter.rect_stroke(crop_rect, 0.0, egui::Stroke::new(1.0, egui::Color32::WHITE));

        // Rule-of-thirds guides
        let guide = egui::Stroke::new(1.0, egui::Color32::from_white_alpha(90));
        for i in 1..3 {
            let t = i as f32 / 3.0;
            let x = crop_rect.min.x + crop_rect.width() * t;
            let y = crop_rect.min.y + crop_rect.height() * t;
            painter.line_segment([egui::pos2(x, crop_rect.min.y), egui::pos2(x, crop_rect.max.y)], guide);
            painter.line_segment([egui::pos2(crop_rect.min.x, y), egui::pos2(crop_rect.max.x, y)], guide);
        }

        let handle_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
        for pos in [
            crop_rect.min,
            crop_rect.max,
            egui::pos2(crop_rect.min.x, crop_rect.max.y),
            egui::pos2(crop_rect.max.x, crop_rect.min.y),
        ] {
            painter.circle(pos, HANDLE_RADIUS, egui::Color32::WHITE, handle_stroke);
        }
    }
}

impl CropWidget for CropView {
    fn display_rect(&self) -> Rect {
        self.crop_box.unwrap_or_default()
    }

    fn set_display_rect(&mut self, rect: Rect) {
        self.crop_box = Some(rect);
    }

    fn image_display_rect(&self) -> Rect {
        self.image_rect
    }

    fn on_user_adjust(&mut self, callback: AdjustCallback) {
        self.on_adjust = Some(callback);
    }
}
