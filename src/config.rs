//! Start-up configuration: built-in defaults overridden by command-line flags.

use std::path::PathBuf;

use clap::Parser;
use log::warn;

use crate::codec::{DEFAULT_JPEG_QUALITY, ExportFormat};
use crate::render::MAX_OUTPUT_SIZE;

pub const DEFAULT_CROP_SIZES: [u32; 5] = [16, 32, 64, 128, 256];

/// Crop a fixed-size square out of an image and export it as PNG or JPEG.
#[derive(Parser, Debug, Default)]
#[command(name = "square-cropper", version)]
pub struct CliArgs {
    /// Image to open at start-up.
    #[arg(value_name = "IMAGE")]
    pub open: Option<PathBuf>,

    /// Crop sizes offered in the size picker, comma separated (e.g. 24,48,96).
    #[arg(long, value_delimiter = ',', value_name = "PX")]
    pub sizes: Vec<u32>,

    /// Initial export format: png or jpeg.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<ExportFormat>,

    /// Initial JPEG quality between 0.0 and 1.0.
    #[arg(short, long, value_name = "0.0-1.0")]
    pub quality: Option<f32>,

    /// Directory the file dialogs start in.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings the UI is created with.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub crop_sizes: Vec<u32>,
    pub default_format: ExportFormat,
    pub jpeg_quality: f32,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    pub start_dir: Option<PathBuf>,
    pub open: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            crop_sizes: DEFAULT_CROP_SIZES.to_vec(),
            default_format: ExportFormat::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            window_size: [1200.0, 800.0],
            min_window_size: [800.0, 600.0],
            start_dir: dirs::picture_dir().or_else(dirs::home_dir),
            open: None,
        }
    }
}

impl AppConfig {
    pub fn from_args(args: &CliArgs) -> Self {
        let mut config = Self::default();

        let mut sizes: Vec<u32> = args
            .sizes
            .iter()
            .copied()
            .filter(|&s| s > 0 && s <= MAX_OUTPUT_SIZE)
            .collect();
        sizes.sort_unstable();
        sizes.dedup();
        if sizes.len() < args.sizes.len() {
            warn!(
                "ignoring zero, repeated or over-{}px crop sizes in {:?}",
                MAX_OUTPUT_SIZE, args.sizes
            );
        }
        if !sizes.is_empty() {
            config.crop_sizes = sizes;
        }

        if let Some(format) = args.format {
            config.default_format = format;
        }
        if let Some(quality) = args.quality {
            if quality.is_finite() {
                config.jpeg_quality = quality.clamp(0.0, 1.0);
            } else {
                warn!("ignoring JPEG quality {}", quality);
            }
        }
        if args.dir.is_some() {
            config.start_dir = args.dir.clone();
        }
        config.open = args.open.clone();
        config
    }

    pub fn log_filter(args: &CliArgs) -> &'static str {
        if args.verbose { "debug" } else { "info" }
    }
}
