//! Open and save round-trips through the host's dialogs and file system.
//!
//! Both operations report a dismissed dialog as [`Outcome::Cancelled`] and
//! every other failure as a [`CropError`]; neither ever panics.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::codec::{self, ExportFormat, IMAGE_EXTENSIONS};
use crate::error::CropError;
use crate::host::{FileFilter, FileHost};

pub const NO_FILE_SELECTED: &str = "No file selected";
pub const SAVE_CANCELLED: &str = "Save cancelled";

const OPEN_TITLE: &str = "Select Image";
const SAVE_TITLE: &str = "Save Cropped Image As...";

/// Result of an operation the user may back out of.
#[derive(Debug, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Cancelled,
}

/// An image file chosen by the user, ready to be decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedImage {
    pub path: PathBuf,
    pub file_name: String,
    /// `data:<mime>;base64,<payload>` reference to the file content.
    pub data_url: String,
}

/// Everything needed to write a rendered crop.
#[derive(Clone, Debug)]
pub struct SaveRequest {
    pub data_url: String,
    pub size: u32,
    pub format: ExportFormat,
    pub extension: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SavedImage {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl SavedImage {
    /// Confirmation text shown after a successful save.
    pub fn summary(&self, size: u32, format: ExportFormat) -> String {
        format!(
            "Image saved successfully!\nSize: {size}×{size}px\nFormat: {}\nFile size: {:.1} KB",
            format.label(),
            self.size_bytes as f64 / 1024.0
        )
    }
}

/// Let the user pick an image and read it.
pub fn select_image(host: &mut impl FileHost) -> Result<Outcome<SelectedImage>, CropError> {
    let filters = [FileFilter::new("Images", &IMAGE_EXTENSIONS)];
    match host.pick_open_file(OPEN_TITLE, &filters) {
        Some(path) => load_path(&*host, &path).map(Outcome::Done),
        None => {
            debug!("{}", NO_FILE_SELECTED);
            Ok(Outcome::Cancelled)
        }
    }
}

/// Read an image file without asking the user, e.g. one dropped on the
/// window or named on the command line.
pub fn load_path(host: &impl FileHost, path: &Path) -> Result<SelectedImage, CropError> {
    let bytes = host.read_file(path).map_err(|e| {
        warn!("failed to read {}: {}", path.display(), e);
        CropError::io(path, e)
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let data_url = codec::to_data_url(&bytes, codec::mime_for_path(path));
    info!("selected {} ({} bytes)", path.display(), bytes.len());
    Ok(SelectedImage {
        path: path.to_path_buf(),
        file_name,
        data_url,
    })
}

/// `cropped_<size>x<size>_<YYYY-MM-DD>.<ext>`
pub fn default_file_name(size: u32, extension: &str, date: NaiveDate) -> String {
    format!(
        "cropped_{size}x{size}_{}.{extension}",
        date.format("%Y-%m-%d")
    )
}

/// Save dialog filters with the requested format listed first.
pub fn save_filters(format: ExportFormat) -> Vec<FileFilter> {
    let png = FileFilter::new("PNG Images", &["png"]);
    let jpeg = FileFilter::new("JPEG Images", &["jpg", "jpeg"]);
    let all = FileFilter::new("All Images", &["png", "jpg", "jpeg"]);
    match format {
        ExportFormat::Png => vec![png, jpeg, all],
        ExportFormat::Jpeg => vec![jpeg, png, all],
    }
}

/// Ask where to save the encoded crop and write it there.
///
/// The payload is validated before any dialog is shown, so a malformed
/// request never reaches the file system. `today` dates the default name.
pub fn save_image(
    host: &mut impl FileHost,
    request: &SaveRequest,
    today: NaiveDate,
) -> Result<Outcome<SavedImage>, CropError> {
    let bytes = codec::decode_data_url(&request.data_url).inspect_err(|e| {
        warn!("refusing to save: {}", e);
    })?;

    let default_name = default_file_name(request.size, &request.extension, today);
    let filters = save_filters(request.format);
    let Some(path) = host.pick_save_file(SAVE_TITLE, &default_name, &filters) else {
        debug!("{}", SAVE_CANCELLED);
        return Ok(Outcome::Cancelled);
    };

    let size_bytes = host.write_file(&path, &bytes).map_err(|e| {
        warn!("failed to write {}: {}", path.display(), e);
        CropError::io(&path, e)
    })?;
    info!(
        "saved {}x{} {} to {} ({} bytes)",
        request.size,
        request.size,
        request.format.label(),
        path.display(),
        size_bytes
    );
    Ok(Outcome::Done(SavedImage { path, size_bytes }))
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::io;

    /// In-memory host with scripted dialog answers.
    #[derive(Debug, Default)]
    pub struct FakeHost {
        pub files: HashMap<PathBuf, Vec<u8>>,
        pub open_answer: Option<PathBuf>,
        pub save_answer: Option<PathBuf>,
        pub fail_writes: bool,
        pub save_dialogs: Vec<(String, Vec<FileFilter>)>,
        pub open_dialogs: usize,
    }

    impl FileHost for FakeHost {
        fn pick_open_file(&mut self, _title: &str, _filters: &[FileFilter]) -> Option<PathBuf> {
            self.open_dialogs += 1;
            self.open_answer.clone()
        }

        fn pick_save_file(
            &mut self,
            _title: &str,
            default_name: &str,
            filters: &[FileFilter],
        ) -> Option<PathBuf> {
            self.save_dialogs
                .push((default_name.to_string(), filters.to_vec()));
            self.save_answer.clone()
        }

        fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        fn write_file(&mut self, path: &Path, bytes: &[u8]) -> io::Result<u64> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.files.insert(path.to_path_buf(), bytes.to_vec());
            Ok(bytes.len() as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeHost;
    use super::*;
    use crate::error::FailureKind;

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn request(format: ExportFormat, size: u32) -> SaveRequest {
        SaveRequest {
            data_url: codec::to_data_url(b"encoded", format.mime()),
            size,
            format,
            extension: format.extension().to_string(),
        }
    }

    #[test]
    fn cancelled_open_is_not_an_error() {
        let mut host = FakeHost::default();
        assert_eq!(select_image(&mut host).unwrap(), Outcome::Cancelled);
        assert_eq!(host.open_dialogs, 1);
    }

    #[test]
    fn selected_file_becomes_data_url() {
        let mut host = FakeHost::default();
        let path = PathBuf::from("/pictures/photo.png");
        host.files.insert(path.clone(), b"abc".to_vec());
        host.open_answer = Some(path.clone());

        let Outcome::Done(selected) = select_image(&mut host).unwrap() else {
            panic!("expected a selection");
        };
        assert_eq!(selected.path, path);
        assert_eq!(selected.file_name, "photo.png");
        assert_eq!(selected.data_url, "data:image/png;base64,YWJj");
    }

    #[test]
    fn unreadable_file_is_io_failure() {
        let mut host = FakeHost {
            open_answer: Some(PathBuf::from("/gone.jpg")),
            ..Default::default()
        };
        let err = select_image(&mut host).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Io);
    }

    #[test]
    fn default_name_embeds_size_and_date() {
        assert_eq!(
            default_file_name(64, ExportFormat::Jpeg.extension(), march_first()),
            "cropped_64x64_2024-03-01.jpg"
        );
    }

    #[test]
    fn save_offers_default_name_and_primary_filter_first() {
        let mut host = FakeHost {
            save_answer: Some(PathBuf::from("/out/icon.jpg")),
            ..Default::default()
        };
        let outcome = save_image(&mut host, &request(ExportFormat::Jpeg, 64), march_first()).unwrap();

        assert_eq!(
            outcome,
            Outcome::Done(SavedImage {
                path: PathBuf::from("/out/icon.jpg"),
                size_bytes: 7,
            })
        );
        let (name, filters) = &host.save_dialogs[0];
        assert_eq!(name, "cropped_64x64_2024-03-01.jpg");
        assert_eq!(filters[0].name, "JPEG Images");
        assert_eq!(filters[1].name, "PNG Images");
        assert_eq!(host.files[Path::new("/out/icon.jpg")], b"encoded");
    }

    #[test]
    fn png_filters_lead_with_png() {
        let filters = save_filters(ExportFormat::Png);
        assert_eq!(filters[0].extensions, vec!["png"]);
        assert_eq!(filters[2].name, "All Images");
    }

    #[test]
    fn cancelled_save_writes_nothing() {
        let mut host = FakeHost::default();
        let outcome = save_image(&mut host, &request(ExportFormat::Png, 32), march_first()).unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(host.files.is_empty());
    }

    #[test]
    fn malformed_payload_never_touches_the_host() {
        let mut host = FakeHost {
            save_answer: Some(PathBuf::from("/out/x.png")),
            ..Default::default()
        };
        let mut req = request(ExportFormat::Png, 32);
        req.data_url = "image/png;base64,YWJj".into();

        let err = save_image(&mut host, &req, march_first()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid image data format");
        assert!(host.save_dialogs.is_empty());
        assert!(host.files.is_empty());
    }

    #[test]
    fn write_failure_is_reported() {
        let mut host = FakeHost {
            save_answer: Some(PathBuf::from("/readonly/x.png")),
            fail_writes: true,
            ..Default::default()
        };
        let err = save_image(&mut host, &request(ExportFormat::Png, 32), march_first()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Io);
        assert!(err.to_string().contains("/readonly/x.png"));
    }

    #[test]
    fn summary_reports_size_format_and_kilobytes() {
        let saved = SavedImage {
            path: PathBuf::from("/out/a.png"),
            size_bytes: 2048,
        };
        assert_eq!(
            saved.summary(128, ExportFormat::Png),
            "Image saved successfully!\nSize: 128×128px\nFormat: PNG\nFile size: 2.0 KB"
        );
    }
}
