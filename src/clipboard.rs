use crate::constants::CLIPBOARD_IMAGE_NAME;
use crate::error::{PublishError, Result};
use crate::source::{is_image_file, read_image_file, ImageItem, ItemSource};
use arboard::Clipboard;
use image::{ImageFormat, RgbaImage};
use reqwest::Url;
use std::io::Cursor;
use std::path::PathBuf;

/// Receives the final text the user should paste.
pub trait ClipboardSink {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// The desktop clipboard. A fresh handle is opened per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

fn open() -> Result<Clipboard> {
    Clipboard::new().map_err(|e| PublishError::Clipboard(e.to_string()))
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        open()?
            .set_text(text.to_string())
            .map_err(|e| PublishError::Clipboard(e.to_string()))
    }
}

impl ItemSource for SystemClipboard {
    fn label(&self) -> String {
        "clipboard".to_string()
    }

    /// A copied file path wins over bitmap data; bitmaps are re-encoded as PNG.
    fn acquire(&self) -> Result<ImageItem> {
        let mut clipboard = open()?;

        let copied_path = clipboard
            .get_text()
            .ok()
            .and_then(|t| clipboard_file_path(&t))
            .filter(|p| is_image_file(p));
        if let Some(path) = copied_path {
            if let Ok(item) = read_image_file(&path) {
                if !item.bytes.is_empty() {
                    return Ok(item);
                }
            }
        }

        let image = clipboard.get_image().map_err(|_| PublishError::NoInput)?;
        let bytes = encode_png(image.width, image.height, image.bytes.into_owned())?;
        Ok(ImageItem::new(self.label(), bytes, CLIPBOARD_IMAGE_NAME))
    }
}

/// Interprets clipboard text as a single local file path; `file://` URIs are
/// percent-decoded.
pub fn clipboard_file_path(text: &str) -> Option<PathBuf> {
    let line = text.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }
    let path = if line.starts_with("file://") {
        Url::parse(line).ok()?.to_file_path().ok()?
    } else {
        PathBuf::from(line)
    };
    path.file_name().is_some().then_some(path)
}

/// Encodes raw RGBA pixels as PNG.
pub fn encode_png(width: usize, height: usize, rgba: Vec<u8>) -> Result<Vec<u8>> {
    let image = RgbaImage::from_raw(width as u32, height as u32, rgba).ok_or_else(|| {
        PublishError::Clipboard(format!("malformed {}x{} clipboard image", width, height))
    })?;
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| PublishError::Clipboard(format!("failed to encode PNG: {}", e)))?;
    Ok(buffer.into_inner())
}
