//! Square image cropper.
//!
//! The pure parts (geometry, rendering, encoding) live in their own modules
//! and can be used without a display. `app` and `view` wire them into an
//! eframe window, `host` wraps the native file dialogs and `task` runs them
//! off the UI thread.

pub mod app;
pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod render;
pub mod state;
pub mod task;
pub mod view;
pub mod widget;

pub use error::CropError;
