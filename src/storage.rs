//! Durable storage for uploaded photos
//!
//! Uploads are copied into a storage directory and identified afterwards by an
//! opaque [`ImageRef`]. The game only ever stores references and asks the
//! store to resolve them when it needs the bytes.

use anyhow::{Context, Result};
use image::ImageReader;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::photos::ImageRef;
use crate::utils::get_file_extension;

pub trait PhotoStore {
    /// Persist the image at `source` and return a reference to the copy
    fn save(&self, source: &Path) -> Result<ImageRef>;

    /// Path of the stored bytes, or `None` when the reference is dangling
    fn resolve(&self, reference: &ImageRef) -> Option<PathBuf>;
}

/// Default storage directory under the platform's local data dir
pub fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("sibling-or-dating").join("uploads"))
        .unwrap_or_else(|| PathBuf::from("uploads"))
}

/// Check that a file decodes as an image header and return its dimensions
pub fn validate_image(path: &Path) -> Result<(u32, u32)> {
    ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image: {}", path.display()))?
        .into_dimensions()
        .with_context(|| format!("Not a supported image: {}", path.display()))
}

/// Store backed by a local directory
#[derive(Debug)]
pub struct FsPhotoStore {
    root: PathBuf,
    sequence: AtomicU64,
}

impl FsPhotoStore {
    /// Open a store, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create storage directory: {}", root.display()))?;
        Ok(Self {
            root,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn next_file_name(&self, source: &Path) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        let extension = get_file_extension(source).unwrap_or_else(|| "jpg".to_string());
        format!("upload_{}_{}.{}", millis, n, extension)
    }
}

impl PhotoStore for FsPhotoStore {
    fn save(&self, source: &Path) -> Result<ImageRef> {
        validate_image(source)?;

        let file_name = self.next_file_name(source);
        let target = self.root.join(&file_name);
        fs::copy(source, &target).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                source.display(),
                target.display()
            )
        })?;

        Ok(ImageRef::new(file_name))
    }

    fn resolve(&self, reference: &ImageRef) -> Option<PathBuf> {
        // References are bare file names inside the storage directory
        let name = Path::new(reference.as_str());
        if name.file_name()? != name.as_os_str() {
            return None;
        }

        let path = self.root.join(name);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::new(4, 3).save(&path).unwrap();
        path
    }

    #[test]
    fn test_save_and_resolve() {
        let source_dir = TempDir::new().unwrap();
        let storage_dir = TempDir::new().unwrap();
        let source = write_png(source_dir.path(), "photo.png");

        let store = FsPhotoStore::open(storage_dir.path().join("uploads")).unwrap();
        let reference = store.save(&source).unwrap();

        assert!(reference.as_str().starts_with("upload_"));
        assert!(reference.as_str().ends_with(".png"));

        let resolved = store.resolve(&reference).unwrap();
        assert_eq!(fs::read(&resolved).unwrap(), fs::read(&source).unwrap());
    }

    #[test]
    fn test_saves_get_distinct_references() {
        let source_dir = TempDir::new().unwrap();
        let storage_dir = TempDir::new().unwrap();
        let source = write_png(source_dir.path(), "photo.png");
        let store = FsPhotoStore::open(storage_dir.path()).unwrap();

        let a = store.save(&source).unwrap();
        let b = store.save(&source).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_save_rejects_non_images() {
        let source_dir = TempDir::new().unwrap();
        let storage_dir = TempDir::new().unwrap();
        let source = source_dir.path().join("notes.jpg");
        fs::write(&source, b"definitely not a jpeg").unwrap();

        let store = FsPhotoStore::open(storage_dir.path()).unwrap();
        assert!(store.save(&source).is_err());
        assert!(store.save(&source_dir.path().join("missing.png")).is_err());
        assert_eq!(fs::read_dir(storage_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_resolve_dangling_references() {
        let storage_dir = TempDir::new().unwrap();
        let store = FsPhotoStore::open(storage_dir.path()).unwrap();

        assert!(store.resolve(&ImageRef::new("upload_0_0.jpg")).is_none());
        assert!(store.resolve(&ImageRef::new("../escape.jpg")).is_none());
        assert!(store.resolve(&ImageRef::new("")).is_none());

        fs::write(storage_dir.path().join("empty.jpg"), b"").unwrap();
        assert!(store.resolve(&ImageRef::new("empty.jpg")).is_none());
    }

    #[test]
    fn test_validate_image_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "a.png");
        assert_eq!(validate_image(&path).unwrap(), (4, 3));
    }
}
