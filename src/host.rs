//! Native dialogs and file access, behind a trait so the bridges can be
//! exercised without a desktop session.

use std::path::{Path, PathBuf};

use log::debug;

/// A named group of extensions offered by a file dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: &str, extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Host platform capabilities needed by the open/save bridges.
pub trait FileHost {
    /// Show an "open file" dialog. `None` if the user dismissed it.
    fn pick_open_file(&mut self, title: &str, filters: &[FileFilter]) -> Option<PathBuf>;

    /// Show a "save file" dialog pre-filled with `default_name`.
    fn pick_save_file(
        &mut self,
        title: &str,
        default_name: &str,
        filters: &[FileFilter],
    ) -> Option<PathBuf>;

    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    /// Write `bytes` to `path`, returning the size of the file on disk.
    fn write_file(&mut self, path: &Path, bytes: &[u8]) -> std::io::Result<u64>;
}

/// Native dialogs through `rfd`, files through `std::fs`.
///
/// The dialog calls block the calling thread until the user answers, so the
/// UI runs them from a [`HostTask`](crate::task::HostTask).
#[derive(Clone, Debug, Default)]
pub struct NativeHost {
    start_dir: Option<PathBuf>,
}

impl NativeHost {
    pub fn new(start_dir: Option<PathBuf>) -> Self {
        Self { start_dir }
    }

    fn dialog(&self, title: &str, filters: &[FileFilter]) -> rfd::AsyncFileDialog {
        let mut dialog = rfd::AsyncFileDialog::new().set_title(title);
        if let Some(dir) = &self.start_dir {
            dialog = dialog.set_directory(dir);
        }
        for filter in filters {
            dialog = dialog.add_filter(filter.name.as_str(), filter.extensions.as_slice());
        }
        dialog
    }

    /// Later dialogs open where the last file was picked.
    fn remember_dir(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.start_dir = Some(parent.to_path_buf());
        }
    }
}

impl FileHost for NativeHost {
    fn pick_open_file(&mut self, title: &str, filters: &[FileFilter]) -> Option<PathBuf> {
        let handle = pollster::block_on(self.dialog(title, filters).pick_file())?;
        let path = handle.path().to_path_buf();
        self.remember_dir(&path);
        Some(path)
    }

    fn pick_save_file(
        &mut self,
        title: &str,
        default_name: &str,
        filters: &[FileFilter],
    ) -> Option<PathBuf> {
        let dialog = self.dialog(title, filters).set_file_name(default_name);
        let handle = pollster::block_on(dialog.save_file())?;
        let path = handle.path().to_path_buf();
        self.remember_dir(&path);
        Some(path)
    }

    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_file(&mut self, path: &Path, bytes: &[u8]) -> std::io::Result<u64> {
        std::fs::write(path, bytes)?;
        let len = std::fs::metadata(path)?.len();
        debug!("wrote {} bytes to {}", len, path.display());
        Ok(len)
    }
}
