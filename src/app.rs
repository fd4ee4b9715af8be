//! eframe front end: the controls panel, the crop view and the file dialogs
//! running in the background.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use eframe::egui;
use log::{error, warn};

use crate::bridge::{self, Outcome, SaveRequest, SavedImage, SelectedImage};
use crate::codec::ExportFormat;
use crate::config::AppConfig;
use crate::error::{CropError, FailureKind};
use crate::host::NativeHost;
use crate::state::{AppState, Stage};
use crate::task::{HostTask, TaskState};
use crate::view::CropView;
use crate::widget::CropWidget;

const PREVIEW_SIZE: f32 = 160.0;

enum Status {
    Info(String),
    Error(String),
}

/// What a background dialog round-trip produced.
enum Finished {
    Selected(Result<Outcome<SelectedImage>, CropError>),
    Saved {
        request: SaveRequest,
        result: Result<Outcome<SavedImage>, CropError>,
    },
}

pub struct SquareCropper {
    config: AppConfig,
    state: AppState,
    view: CropView,
    /// `None` while a dialog task owns the host.
    host: Option<NativeHost>,
    pending: Option<HostTask<NativeHost, Finished>>,
    texture: Option<egui::TextureHandle>,
    preview: Option<egui::TextureHandle>,
    format: ExportFormat,
    quality: f32,
    status: Option<Status>,
    box_moved: Rc<Cell<bool>>,
}

impl SquareCropper {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let box_moved = Rc::new(Cell::new(false));
        let mut view = CropView::default();
        let flag = Rc::clone(&box_moved);
        view.on_user_adjust(Box::new(move |_| flag.set(true)));

        let mut app = Self {
            state: AppState::default(),
            view,
            host: Some(NativeHost::new(config.start_dir.clone())),
            pending: None,
            texture: None,
            preview: None,
            format: config.default_format,
            quality: config.jpeg_quality,
            status: None,
            box_moved,
            config,
        };

        if let Some(path) = app.config.open.clone() {
            app.open_path(&cc.egui_ctx, &path);
        }
        app
    }

    fn report(&mut self, context: &str, err: CropError) {
        match err.kind() {
            FailureKind::Io => error!("{}: {}", context, err),
            FailureKind::InvalidInput => warn!("{}: {}", context, err),
        }
        self.status = Some(Status::Error(format!("{context}: {err}")));
    }

    fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand the host to a worker thread for one dialog round-trip.
    fn start_task<F>(&mut self, ctx: &egui::Context, job: F)
    where
        F: FnOnce(&mut NativeHost) -> Finished + Send + 'static,
    {
        let Some(host) = self.host.take() else {
            return;
        };
        let repaint = ctx.clone();
        self.pending = Some(HostTask::spawn(host, job, move || repaint.request_repaint()));
    }

    fn select_image(&mut self, ctx: &egui::Context) {
        self.start_task(ctx, |host| Finished::Selected(bridge::select_image(host)));
    }

    fn open_path(&mut self, ctx: &egui::Context, path: &Path) {
        let Some(host) = &self.host else {
            return;
        };
        match bridge::load_path(host, path) {
            Ok(selected) => self.load(ctx, selected),
            Err(err) => self.report("Error opening image", err),
        }
    }

    fn poll_pending(&mut self, ctx: &egui::Context) {
        let state = match &self.pending {
            Some(task) => task.poll(),
            None => return,
        };
        let finished = match state {
            TaskState::Running => return,
            TaskState::Finished((host, finished)) => {
                self.host = Some(host);
                finished
            }
            TaskState::Lost => {
                self.pending = None;
                self.host = Some(NativeHost::new(self.config.start_dir.clone()));
                self.report(
                    "File dialog failed",
                    CropError::InvalidInput("the dialog closed without an answer".to_string()),
                );
                return;
            }
        };
        self.pending = None;

        match finished {
            Finished::Selected(Ok(Outcome::Done(selected))) => self.load(ctx, selected),
            Finished::Selected(Ok(Outcome::Cancelled)) => {}
            Finished::Selected(Err(err)) => self.report("Error selecting image", err),
            Finished::Saved { request, result } => match result {
                Ok(Outcome::Done(saved)) => {
                    self.state.mark_saved();
                    self.status = Some(Status::Info(saved.summary(request.size, request.format)));
                }
                Ok(Outcome::Cancelled) => {}
                Err(err) => self.report("Error saving image", err),
            },
        }
    }

    fn load(&mut self, ctx: &egui::Context, selected: SelectedImage) {
        let image = match self.state.load_image(selected) {
            Ok(image) => image,
            Err(err) => {
                self.report("Error loading image", err);
                return;
            }
        };

        let size = [image.raster.width() as _, image.raster.height() as _];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.raster.as_raw());
        self.texture = Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
        self.preview = None;
        self.view.reset();
        self.box_moved.set(false);
        self.status = None;
    }

    fn select_size(&mut self, size: u32) {
        match self.state.select_size(size, &mut self.view) {
            Ok(_) => self.preview = None,
            Err(err) => self.report("Cannot place crop box", err),
        }
    }

    fn crop(&mut self, ctx: &egui::Context) {
        match self.state.crop(&self.view) {
            Ok(rendered) => {
                let size = [rendered.image.width() as _, rendered.image.height() as _];
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied(size, rendered.image.as_raw());
                self.preview =
                    Some(ctx.load_texture("preview", color_image, egui::TextureOptions::NEAREST));
                self.status = None;
            }
            Err(err) => self.report("Error cropping image", err),
        }
    }

    fn save(&mut self, ctx: &egui::Context) {
        let request = match self.state.save_request(self.format, self.quality) {
            Ok(request) => request,
            Err(err) => {
                self.report("Error saving image", err);
                return;
            }
        };
        let today = chrono::Utc::now().date_naive();
        self.start_task(ctx, move |host| {
            let result = bridge::save_image(host, &request, today);
            Finished::Saved { request, result }
        });
    }

    fn hint(stage: Stage) -> &'static str {
        match stage {
            Stage::NoImage => "Select an image to begin.",
            Stage::ImageLoaded => "Choose a crop size.",
            Stage::SizeSelected => "Drag the box into place, then crop.",
            Stage::Cropped => "Check the preview and save.",
            Stage::Saved => "Saved. Crop again or pick another image.",
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        let idle = !self.is_busy();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(idle, egui::Button::new("Select Image"))
                .clicked()
            {
                self.select_image(&ctx);
            }
            if !idle {
                ui.spinner();
            }
        });
        ui.weak(Self::hint(self.state.stage()));
        if let Some(image) = self.state.image() {
            ui.label(image.file_name.as_str())
                .on_hover_text(image.path.display().to_string());
            ui.weak(format!("{}×{}px", image.raster.width(), image.raster.height()));
        }
        ui.separator();

        ui.add_enabled_ui(idle && self.state.image().is_some(), |ui| {
            ui.label("Crop size:");
            ui.horizontal_wrapped(|ui| {
                for size in self.config.crop_sizes.clone() {
                    let selected = self.state.selected_size() == Some(size);
                    if ui
                        .selectable_label(selected, format!("{size}×{size}"))
                        .clicked()
                    {
                        self.select_size(size);
                    }
                }
            });
        });

        if let Some(size) = self.state.selected_size() {
            ui.label(format!("Selected: {size}×{size}px"));
        }
        if let Some(readout) = self.state.readout(&self.view) {
            ui.label(format!("Position: {}", readout.position_label()));
            ui.label(format!("Size: {}", readout.size_label()));
        }
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Format:");
            egui::ComboBox::from_id_salt("export_format")
                .selected_text(self.format.label())
                .show_ui(ui, |ui| {
                    for format in ExportFormat::ALL {
                        ui.selectable_value(&mut self.format, format, format.label());
                    }
                });
        });
        if self.format.is_lossy() {
            ui.horizontal(|ui| {
                ui.label("Quality:");
                ui.add(
                    egui::Slider::new(&mut self.quality, 0.1..=1.0)
                        .step_by(0.01)
                        .custom_formatter(|v, _| format!("{}%", (v * 100.0).round())),
                );
            });
        }
        ui.separator();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(idle && self.state.can_crop(), egui::Button::new("Crop"))
                .clicked()
            {
                self.crop(&ctx);
            }
            if ui
                .add_enabled(idle && self.state.can_save(), egui::Button::new("Save"))
                .clicked()
            {
                self.save(&ctx);
            }
        });

        if let (Some(preview), Some(rendered)) = (&self.preview, self.state.rendered()) {
            ui.add_space(8.0);
            let side = (rendered.size as f32).clamp(64.0, PREVIEW_SIZE);
            ui.image((preview.id(), egui::vec2(side, side)));
            ui.weak(format!("Output: {0}×{0}px", rendered.size));
        }

        match &self.status {
            Some(Status::Info(msg)) => {
                ui.separator();
                ui.label(msg.as_str());
            }
            Some(Status::Error(msg)) => {
                ui.separator();
                ui.colored_label(ui.visuals().error_fg_color, msg.as_str());
            }
            None => {}
        }
    }
}

impl eframe::App for SquareCropper {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_pending(ctx);

        // Handle dropped files
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped {
            if self.is_busy() {
                warn!("ignoring dropped file while a dialog is open");
            } else {
                self.open_path(ctx, &path);
            }
        }

        egui::SidePanel::right("controls")
            .resizable(false)
            .min_width(220.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.controls(ui));
            });

        let idle = !self.is_busy();
        egui::CentralPanel::default().show(ctx, |ui| {
            match &self.texture {
                Some(texture) => {
                    ui.add_enabled_ui(idle, |ui| self.view.show(ui, texture));
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label("Select or drop an image to start cropping");
                    });
                }
            }
        });

        if self.box_moved.replace(false) {
            self.state.crop_box_moved();
            self.preview = None;
        }
    }
}
