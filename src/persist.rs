//! Where a cropped screenshot ends up: the clipboard and PNG files.

use std::fs;
use std::path::{Path, PathBuf};

use arboard::{Clipboard, ImageData};
use chrono::{DateTime, Local};
use image::RgbaImage;
use log::info;

use crate::constants::{
    APP_NAME, SCREENSHOT_FILE_EXTENSION, SCREENSHOT_FILE_PREFIX, SCREENSHOT_TIMESTAMP_FORMAT,
};

pub trait ImageSink {
    fn copy(&mut self, image: &RgbaImage) -> Result<(), PersistError>;

    /// Write already-encoded PNG bytes, returning where they went.
    fn save(&mut self, png: &[u8]) -> Result<PathBuf, PersistError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no directory to save screenshots in")]
    NoSaveDirectory,

    #[error("save dialog was cancelled")]
    Cancelled,
}

/// `Screenshot_2024-01-31_09-05-00.png`
pub fn screenshot_file_name(now: DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        SCREENSHOT_FILE_PREFIX,
        now.format(SCREENSHOT_TIMESTAMP_FORMAT),
        SCREENSHOT_FILE_EXTENSION
    )
}

/// `~/Pictures/QuickCrop`, or `None` without a home directory.
pub fn default_save_directory() -> Option<PathBuf> {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        .map(|p| p.join(APP_NAME))
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|h| h.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

/// Write `png` as a timestamped file inside `dir`, creating `dir` if needed.
pub fn write_timestamped(
    dir: &Path,
    png: &[u8],
    now: DateTime<Local>,
) -> Result<PathBuf, PersistError> {
    fs::create_dir_all(dir).map_err(|source| PersistError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(screenshot_file_name(now));
    fs::write(&path, png).map_err(|source| PersistError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// System clipboard plus the user's screenshot folder.
pub struct DesktopSink {
    // Held for the process lifetime; some platforms drop the contents with it.
    clipboard: Option<Clipboard>,
    save_directory: Option<PathBuf>,
    ask_save_location: bool,
}

impl DesktopSink {
    pub fn new(save_directory: Option<PathBuf>, ask_save_location: bool) -> Self {
        DesktopSink {
            clipboard: None,
            save_directory,
            ask_save_location,
        }
    }

    fn clipboard(&mut self) -> Result<&mut Clipboard, PersistError> {
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new()?,
        };
        Ok(self.clipboard.insert(clipboard))
    }

    fn save_with_dialog(&self, png: &[u8]) -> Result<PathBuf, PersistError> {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("PNG", &[SCREENSHOT_FILE_EXTENSION])
            .set_file_name(screenshot_file_name(Local::now()));
        if let Some(dir) = &self.save_directory {
            dialog = dialog.set_directory(dir);
        }
        let path = dialog.save_file().ok_or(PersistError::Cancelled)?;

        fs::write(&path, png).map_err(|source| PersistError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl ImageSink for DesktopSink {
    fn copy(&mut self, image: &RgbaImage) -> Result<(), PersistError> {
        let data = ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: image.as_raw().into(),
        };
        self.clipboard()?.set_image(data)?;
        info!(
            "Image copied to clipboard ({}x{})",
            image.width(),
            image.height()
        );
        Ok(())
    }

    fn save(&mut self, png: &[u8]) -> Result<PathBuf, PersistError> {
        let path = if self.ask_save_location {
            self.save_with_dialog(png)?
        } else {
            let dir = self
                .save_directory
                .as_deref()
                .ok_or(PersistError::NoSaveDirectory)?;
            write_timestamped(dir, png, Local::now())?
        };
        info!("Screenshot saved to {}", path.display());
        Ok(path)
    }
}
