//! Bulk import of a photo folder
//!
//! Files are discovered with a bounded directory walk, their image headers
//! validated in parallel, and every valid file is uploaded with one tag.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::photos::{PhotoEntry, Relationship};
use crate::session::SessionController;
use crate::storage::validate_image;
use crate::utils::{has_valid_extension, verbose_println};

const MAX_DEPTH: usize = 10;

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub found: usize,
    pub imported: Vec<PhotoEntry>,
    pub rejected: Vec<(PathBuf, String)>,
}

/// Discover all image files under `dir`, sorted for a stable upload order
pub fn discover_images(dir: &Path, extensions: &[String], verbose: bool) -> Result<Vec<PathBuf>> {
    verbose_println(verbose, &format!("Scanning directory: {}", dir.display()));

    let mut image_files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).max_depth(MAX_DEPTH) {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path.is_file() && has_valid_extension(path, extensions) {
            image_files.push(path.to_path_buf());
        }
    }

    image_files.sort();
    verbose_println(verbose, &format!("Found {} image files", image_files.len()));
    Ok(image_files)
}

/// Split files into readable images and rejects, checking headers in parallel
pub fn validate_batch(
    files: &[PathBuf],
    jobs: usize,
) -> Result<(Vec<PathBuf>, Vec<(PathBuf, String)>)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to initialize thread pool")?;

    let checked: Vec<(PathBuf, Result<(u32, u32)>)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| (path.clone(), validate_image(path)))
            .collect()
    });

    let mut valid = Vec::new();
    let mut rejected = Vec::new();
    for (path, result) in checked {
        match result {
            Ok(_) => valid.push(path),
            Err(e) => rejected.push((path, format!("{:#}", e))),
        }
    }
    Ok((valid, rejected))
}

/// Import every valid image in `dir` into the session.
///
/// `progress` is called with (done, total) after each upload attempt.
pub fn import_directory<F>(
    session: &mut SessionController,
    dir: &Path,
    relationship: Relationship,
    extensions: &[String],
    jobs: usize,
    verbose: bool,
    mut progress: F,
) -> Result<ImportSummary>
where
    F: FnMut(usize, usize),
{
    let files = discover_images(dir, extensions, verbose)?;
    let (valid, mut rejected) = validate_batch(&files, jobs)?;

    let mut imported = Vec::with_capacity(valid.len());
    for (i, path) in valid.iter().enumerate() {
        match session.upload_file(path, relationship) {
            Some(entry) => imported.push(entry),
            None => rejected.push((path.clone(), "upload failed".to_string())),
        }
        progress(i + 1, valid.len());
    }

    Ok(ImportSummary {
        found: files.len(),
        imported,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haptics::NoHaptics;
    use crate::photos::{PhotoRepository, Shuffler};
    use crate::storage::FsPhotoStore;
    use image::RgbImage;
    use std::fs;
    use tempfile::TempDir;

    fn extensions() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        RgbImage::new(2, 2).save(dir.path().join("a.png")).unwrap();
        RgbImage::new(2, 2).save(dir.path().join("nested/b.png")).unwrap();
        fs::write(dir.path().join("fake.jpg"), b"not an image").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        dir
    }

    #[test]
    fn test_discover_images() {
        let dir = fixture();
        let files = discover_images(dir.path(), &extensions(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"fake.jpg".to_string()));
        assert!(!names.contains(&"notes.txt".to_string()));
    }

    #[test]
    fn test_validate_batch() {
        let dir = fixture();
        let files = discover_images(dir.path(), &extensions(), false).unwrap();
        let (valid, rejected) = validate_batch(&files, 2).unwrap();
        assert_eq!(valid.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert!(rejected[0].0.ends_with("fake.jpg"));
    }

    #[test]
    fn test_import_directory() {
        let dir = fixture();
        let storage = TempDir::new().unwrap();
        let mut session = SessionController::new(
            PhotoRepository::empty(),
            Box::new(FsPhotoStore::open(storage.path()).unwrap()),
            Box::new(NoHaptics),
            Shuffler::seeded(5),
        );

        let mut calls = Vec::new();
        let summary = import_directory(
            &mut session,
            dir.path(),
            Relationship::Siblings,
            &extensions(),
            0,
            false,
            |done, total| calls.push((done, total)),
        )
        .unwrap();

        assert_eq!(summary.found, 3);
        assert_eq!(summary.imported.len(), 2);
        assert_eq!(summary.rejected.len(), 1);
        assert_eq!(calls, vec![(1, 2), (2, 2)]);
        assert_eq!(session.len(), 2);
        assert!(session
            .view()
            .iter()
            .all(|p| p.relationship == Relationship::Siblings));
    }
}
