use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions of the containers the codec can rewrite.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tif", "tiff"];

/// Expand command-line paths into the image files to open.
///
/// Files are kept when their extension is one of [`IMAGE_EXTENSIONS`].
/// Directories are searched recursively in file name order, following
/// symlinks. A file named twice (directly and through its directory, say)
/// is listed once, so it is not rewritten twice in one run.
///
/// # Example
///
/// ```rust,no_run
/// use exif_edit::images::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[PathBuf::from("photo.jpg"), PathBuf::from("./holiday/")]);
/// println!("{} image(s) to edit", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for path in paths {
        if path.is_dir() {
            found.extend(images_under(path));
        } else if path.is_file() {
            if is_supported_image(path) {
                found.push(path.clone());
            } else {
                log::warn!("Skipping {}: not a JPEG, PNG, WebP or TIFF file", path.display());
            }
        } else {
            log::warn!("Skipping {}: no such file or directory", path.display());
        }
    }

    let mut seen = HashSet::new();
    found.retain(|p| seen.insert(p.clone()));
    found
}

fn images_under(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.map_err(|e| log::debug!("Not searched: {e}")).ok())
        .filter(|entry| entry.file_type().is_file() && is_supported_image(entry.path()))
        .map(|entry| entry.into_path())
}

/// Whether the codec can rewrite `path`, judged by its extension in any case.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}
