#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use clap::Parser;
use eframe::egui;
use square_cropper::app::SquareCropper;
use square_cropper::config::{AppConfig, CliArgs};

fn main() -> eframe::Result {
    let args = CliArgs::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(AppConfig::log_filter(&args)),
    )
    .init();

    let config = AppConfig::from_args(&args);
    log::debug!("starting with {:?}", config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size)
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Square Cropper",
        options,
        Box::new(|cc| Ok(Box::new(SquareCropper::new(cc, config)))),
    )
}
