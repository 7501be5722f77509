use crate::constants::{
    COMPRESSIBLE_EXTENSIONS, DEFAULT_EXTENSION, MAX_FILE_SIZE, SUPPORTED_IMAGE_EXTENSIONS,
};
use crate::error::{PublishError, Result};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One image read from a source, ready for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    /// Where the bytes came from (a path, or "clipboard").
    pub source: String,
    pub bytes: Vec<u8>,
    pub filename: String,
    /// Lowercase, without the dot.
    pub extension: String,
}

impl ImageItem {
    pub fn new(source: impl Into<String>, bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let extension = extract_extension(&filename);
        Self {
            source: source.into(),
            bytes,
            filename,
            extension,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Something the pipeline can acquire an image from.
pub trait ItemSource {
    /// Identifies the source in failure reports, even when acquiring fails.
    fn label(&self) -> String;

    fn acquire(&self) -> Result<ImageItem>;
}

impl ItemSource for ImageItem {
    fn label(&self) -> String {
        self.source.clone()
    }

    fn acquire(&self) -> Result<ImageItem> {
        Ok(self.clone())
    }
}

impl ItemSource for PathBuf {
    fn label(&self) -> String {
        self.display().to_string()
    }

    fn acquire(&self) -> Result<ImageItem> {
        read_image_file(self)
    }
}

/// Lowercased extension of `filename`, or `png` when there is none.
pub fn extract_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn path_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.to_lowercase())
}

pub fn is_image_file(path: &Path) -> bool {
    path_extension(path)
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Whether the compression service accepts this extension.
pub fn is_compressible(extension: &str) -> bool {
    COMPRESSIBLE_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

pub fn read_image_file(path: &Path) -> Result<ImageItem> {
    if !path.exists() {
        return Err(PublishError::FileNotFound(path.to_path_buf()));
    }

    let file_size = fs::metadata(path)?.len();
    if file_size > MAX_FILE_SIZE {
        return Err(PublishError::FileTooLarge(file_size, MAX_FILE_SIZE));
    }

    let bytes = fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ImageItem::new(path.display().to_string(), bytes, filename))
}

/// Expands a file, directory or glob pattern into image paths.
///
/// Hidden entries are skipped and non-image files are filtered out. Result
/// order is stable: walk order for directories, glob order for patterns.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        if is_image_file(input_path) {
            image_files.push(input_path.to_path_buf());
        }
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path).sort_by_file_name()
        } else {
            WalkDir::new(input_path).max_depth(1).sort_by_file_name()
        };

        let visible = walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
        for entry in visible {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else if let Ok(pattern) = glob(input) {
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    } else {
        return Err(PublishError::NoImageFilesFound(input.to_string()));
    }

    Ok(image_files)
}

/// Collects candidates from several inputs, keeping first-seen order and
/// dropping duplicates.
pub fn collect_candidates(inputs: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    for input in inputs {
        for path in collect_image_files(input, recursive)? {
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        }
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_extract_extension() {
        assert_eq!(extract_extension("photo.JPG"), "jpg");
        assert_eq!(extract_extension("archive.tar.PNG"), "png");
        assert_eq!(extract_extension("noext"), "png");
        assert_eq!(extract_extension(".hidden"), "png");
        assert_eq!(extract_extension(""), "png");
    }

    #[test]
    fn test_is_image_file() {
        for name in ["a.png", "a.jpg", "a.JPEG", "a.gif", "a.webp", "a.svg", "a.bmp", "a.ico"] {
            assert!(is_image_file(Path::new(name)), "{}", name);
        }
        assert!(!is_image_file(Path::new("a.txt")));
        assert!(!is_image_file(Path::new("a.tiff")));
        assert!(!is_image_file(Path::new("a")));
    }

    #[test]
    fn test_is_compressible() {
        assert!(is_compressible("png"));
        assert!(is_compressible("JPG"));
        assert!(is_compressible("jpeg"));
        assert!(is_compressible("webp"));
        assert!(!is_compressible("gif"));
        assert!(!is_compressible("svg"));
    }

    #[test]
    fn test_image_item_new_derives_extension() {
        let item = ImageItem::new("/tmp/Shot.PNG", vec![1, 2, 3], "Shot.PNG");
        assert_eq!(item.extension, "png");
        assert_eq!(item.size(), 3);
        assert_eq!(item.label(), "/tmp/Shot.PNG");
    }

    #[test]
    fn test_read_image_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.JPG");
        File::create(&path).unwrap().write_all(b"jpeg data").unwrap();

        let item = path.acquire().unwrap();
        assert_eq!(item.bytes, b"jpeg data");
        assert_eq!(item.filename, "photo.JPG");
        assert_eq!(item.extension, "jpg");
    }

    #[test]
    fn test_read_image_file_not_found() {
        let result = read_image_file(Path::new("/nonexistent/file.png"));
        assert!(matches!(result, Err(PublishError::FileNotFound(_))));
    }

    #[test]
    fn test_collect_image_files_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.png");
        File::create(&file).unwrap();

        let files = collect_image_files(&file.to_string_lossy(), false).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_collect_image_files_directory_filters_non_images() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("b.jpg")).unwrap();
        File::create(temp_dir.path().join("a.png")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();
        File::create(temp_dir.path().join(".hidden.png")).unwrap();

        let files = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn test_collect_image_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        File::create(temp_dir.path().join("top.png")).unwrap();
        File::create(subdir.join("nested.png")).unwrap();

        let flat = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = collect_image_files(&temp_dir.path().to_string_lossy(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_image_files_glob_pattern() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("one.jpg")).unwrap();
        File::create(temp_dir.path().join("two.png")).unwrap();

        let pattern = format!("{}/*.jpg", temp_dir.path().to_string_lossy());
        let files = collect_image_files(&pattern, false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_collect_image_files_only_non_images() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.txt")).unwrap();

        let files = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_collect_candidates_deduplicates() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.png");
        File::create(&file).unwrap();
        let input = file.to_string_lossy().into_owned();

        let files = collect_candidates(&[input.clone(), input], false).unwrap();
        assert_eq!(files.len(), 1);
    }
}
