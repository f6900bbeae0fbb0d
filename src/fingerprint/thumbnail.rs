//! Thumbnail normalization and storage

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Decodes image bytes and fits them to a `size x size` square
///
/// The image is scaled to cover the square while keeping its aspect ratio,
/// then centre-cropped; it is never stretched.
pub fn fit_thumbnail(bytes: &[u8], size: u32) -> Result<DynamicImage, image::ImageError> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.resize_to_fill(size, size, FilterType::Lanczos3))
}

/// Writes a thumbnail as `<stem>.jpg` into `dir` and returns its path
///
/// Existing files are never replaced: when the name is taken, `-1`, `-2`, ...
/// is appended to the stem until a free one is claimed.
pub fn save_thumbnail(
    thumbnail: &DynamicImage,
    dir: &Path,
    stem: &str,
) -> Result<PathBuf, crate::LibreError> {
    std::fs::create_dir_all(dir)?;
    let (path, file) = claim_file(dir, stem)?;

    // JPEG has no alpha channel
    let mut writer = BufWriter::new(file);
    DynamicImage::ImageRgb8(thumbnail.to_rgb8()).write_to(&mut writer, ImageFormat::Jpeg)?;
    writer.flush()?;

    Ok(path)
}

fn claim_file(dir: &Path, stem: &str) -> io::Result<(PathBuf, File)> {
    let mut suffix = 0u32;
    loop {
        let name = match suffix {
            0 => format!("{}.jpg", stem),
            n => format!("{}-{}.jpg", stem, n),
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e),
        }
    }
}
