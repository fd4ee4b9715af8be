//! Application state for one cropping session, owned by the UI controller.

use std::path::PathBuf;

use image::RgbaImage;
use log::{debug, info};

use crate::bridge::{SaveRequest, SelectedImage};
use crate::codec::{self, ExportFormat};
use crate::error::CropError;
use crate::geometry::{self, ImageSize, PixelReadout, Rect};
use crate::render;
use crate::widget::CropWidget;

/// The decoded image the user picked.
pub struct SourceImage {
    pub path: PathBuf,
    pub file_name: String,
    pub raster: RgbaImage,
}

impl SourceImage {
    pub fn natural_size(&self) -> ImageSize {
        ImageSize::new(self.raster.width(), self.raster.height())
    }
}

/// Square crop rendered at the size selected when it was made.
pub struct RenderedCrop {
    pub size: u32,
    pub image: RgbaImage,
}

/// Where the user is in the load → size → crop → save flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    NoImage,
    ImageLoaded,
    SizeSelected,
    Cropped,
    Saved,
}

#[derive(Default)]
pub struct AppState {
    image: Option<SourceImage>,
    selected_size: Option<u32>,
    rendered: Option<RenderedCrop>,
    saved: bool,
}

impl AppState {
    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn selected_size(&self) -> Option<u32> {
        self.selected_size
    }

    pub fn rendered(&self) -> Option<&RenderedCrop> {
        self.rendered.as_ref()
    }

    pub fn stage(&self) -> Stage {
        match (&self.image, self.selected_size, &self.rendered) {
            (None, _, _) => Stage::NoImage,
            (Some(_), None, _) => Stage::ImageLoaded,
            (Some(_), Some(_), None) => Stage::SizeSelected,
            (Some(_), Some(_), Some(_)) if self.saved => Stage::Saved,
            (Some(_), Some(_), Some(_)) => Stage::Cropped,
        }
    }

    pub fn can_crop(&self) -> bool {
        self.image.is_some() && self.selected_size.is_some()
    }

    pub fn can_save(&self) -> bool {
        self.rendered.is_some()
    }

    /// Decode a freshly selected file and make it the current image.
    ///
    /// Any previous size, crop box and render are discarded. On failure the
    /// current state is left as it was.
    pub fn load_image(&mut self, selected: SelectedImage) -> Result<&SourceImage, CropError> {
        let bytes = codec::decode_data_url(&selected.data_url)?;
        let raster = image::load_from_memory(&bytes)
            .map_err(CropError::Decode)?
            .to_rgba8();
        info!(
            "loaded {} ({}x{})",
            selected.file_name,
            raster.width(),
            raster.height()
        );

        self.selected_size = None;
        self.rendered = None;
        self.saved = false;
        Ok(&*self.image.insert(SourceImage {
            path: selected.path,
            file_name: selected.file_name,
            raster,
        }))
    }

    /// Choose the output size and re-center a matching crop box on the
    /// image. Any manual placement and any earlier render are dropped.
    pub fn select_size(&mut self, size: u32, widget: &mut dyn CropWidget) -> Result<Rect, CropError> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| CropError::InvalidInput("no image loaded".into()))?;
        let crop_box = geometry::compute_crop_box(
            image.natural_size(),
            widget.image_display_rect(),
            size,
        )?;

        widget.set_display_rect(crop_box);
        self.selected_size = Some(size);
        self.invalidate_render();
        debug!("crop size {}px, box {:?}", size, crop_box);
        Ok(crop_box)
    }

    /// The user moved the crop box; the previous render no longer matches.
    pub fn crop_box_moved(&mut self) {
        self.invalidate_render();
    }

    /// Current crop box in natural pixels, unrounded.
    pub fn natural_rect(&self, widget: &dyn CropWidget) -> Result<Rect, CropError> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| CropError::InvalidInput("no image loaded".into()))?;
        geometry::to_natural_rect(
            widget.display_rect(),
            widget.image_display_rect(),
            image.natural_size(),
        )
    }

    /// Whole-pixel position and size of the crop box, once a size is chosen.
    pub fn readout(&self, widget: &dyn CropWidget) -> Option<PixelReadout> {
        self.selected_size?;
        self.natural_rect(widget).ok().map(|r| r.rounded())
    }

    /// Render the region under the crop box at the selected size.
    pub fn crop(&mut self, widget: &dyn CropWidget) -> Result<&RenderedCrop, CropError> {
        let size = self
            .selected_size
            .ok_or_else(|| CropError::InvalidInput("no crop size selected".into()))?;
        let region = self.natural_rect(widget)?;
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| CropError::InvalidInput("no image loaded".into()))?;

        let rendered = render::render(&image.raster, region, size)?;
        info!(
            "cropped {}x{} at ({:.1}, {:.1}) to {}x{}",
            region.width, region.height, region.left, region.top, size, size
        );
        self.saved = false;
        Ok(&*self.rendered.insert(RenderedCrop {
            size,
            image: rendered,
        }))
    }

    /// Encode the current render for the export bridge.
    pub fn save_request(&self, format: ExportFormat, quality: f32) -> Result<SaveRequest, CropError> {
        let rendered = self
            .rendered
            .as_ref()
            .ok_or_else(|| CropError::InvalidInput("nothing has been cropped yet".into()))?;
        let bytes = codec::encode(&rendered.image, format, quality)?;
        Ok(SaveRequest {
            data_url: codec::to_data_url(&bytes, format.mime()),
            size: rendered.size,
            format,
            extension: format.extension().to_string(),
        })
    }

    pub fn mark_saved(&mut self) {
        if self.rendered.is_some() {
            self.saved = true;
        }
    }

    fn invalidate_render(&mut self) {
        if self.rendered.take().is_some() {
            debug!("discarding rendered crop");
        }
        self.saved = false;
    }
}
