// src/screenshot.rs

//! PNG dumps of a canvas buffer, used by headless `pause`.
//!
//! Files are named `<prefix>NNNN.png` with a four-digit, zero-padded index.
//! Each write claims the lowest index whose file does not exist yet; the file
//! is created with `create_new`, so an existing file is never overwritten,
//! even if another process grabs the same name first.

use crate::error::WorldError;
use crate::raster::Raster;
use image::{ImageBuffer, ImageFormat, Rgb};
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Highest index the four-digit pattern can express.
pub const MAX_SCREENSHOT_INDEX: u32 = 9999;

/// Name of the screenshot file with the given index.
pub fn screenshot_file_name(prefix: &str, index: u32) -> String {
    format!("{}{:04}.png", prefix, index)
}

/// Writes `raster` to the next free screenshot file in `directory`.
pub fn write_screenshot(raster: &Raster, directory: &Path, prefix: &str) -> Result<PathBuf, WorldError> {
    let image: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(raster.width(), raster.height(), raster.to_rgb_bytes()).ok_or_else(
            || WorldError::Image("buffer size does not match its dimensions".to_string()),
        )?;
    let (path, file) = claim_next_file(directory, prefix)?;
    let mut writer = BufWriter::new(file);
    let written = image
        .write_to(&mut writer, ImageFormat::Png)
        .map_err(WorldError::from)
        .and_then(|()| writer.flush().map_err(WorldError::from));
    if let Err(e) = written {
        // Release the claimed slot rather than leave a truncated file behind.
        drop(writer);
        let _ = std::fs::remove_file(&path);
        return Err(e);
    }
    info!("Screenshot written to {}", path.display());
    Ok(path)
}

fn claim_next_file(directory: &Path, prefix: &str) -> Result<(PathBuf, File), WorldError> {
    for index in 0..=MAX_SCREENSHOT_INDEX {
        let path = directory.join(screenshot_file_name(prefix, index));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Screenshot slot {} taken", path.display());
            }
            Err(e) => return Err(WorldError::Io(e)),
        }
    }
    Err(WorldError::Io(io::Error::new(
        io::ErrorKind::Other,
        format!(
            "all {} screenshot slots in {} are taken",
            MAX_SCREENSHOT_INDEX + 1,
            directory.display()
        ),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fresh_dir;

    #[test_log::test]
    fn file_names_are_zero_padded() {
        assert_eq!(screenshot_file_name("screenshot", 0), "screenshot0000.png");
        assert_eq!(screenshot_file_name("shot", 42), "shot0042.png");
    }

    #[test_log::test]
    fn writes_a_decodable_png() {
        let dir = fresh_dir("png");
        let mut raster = Raster::new(4, 3, 0x00ff_ffff);
        raster.put(1, 1, 0x0000_00ff);
        let path = write_screenshot(&raster, &dir, "screenshot").unwrap();
        assert_eq!(path, dir.join("screenshot0000.png"));

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(1, 1), &Rgb([0, 0, 255]));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test_log::test]
    fn skips_existing_files_without_touching_them() {
        let dir = fresh_dir("skip");
        std::fs::write(dir.join("screenshot0000.png"), b"keep me").unwrap();
        std::fs::write(dir.join("screenshot0002.png"), b"keep me too").unwrap();
        let raster = Raster::new(2, 2, 0);

        let first = write_screenshot(&raster, &dir, "screenshot").unwrap();
        let second = write_screenshot(&raster, &dir, "screenshot").unwrap();
        assert_eq!(first, dir.join("screenshot0001.png"));
        assert_eq!(second, dir.join("screenshot0003.png"));
        assert_eq!(std::fs::read(dir.join("screenshot0000.png")).unwrap(), b"keep me");
        assert_eq!(std::fs::read(dir.join("screenshot0002.png")).unwrap(), b"keep me too");
    }

    #[test_log::test]
    fn missing_directory_is_an_io_failure() {
        let dir = fresh_dir("missing").join("does-not-exist");
        let err = write_screenshot(&Raster::new(1, 1, 0), &dir, "screenshot").unwrap_err();
        assert!(matches!(err, WorldError::Io(_)));
    }
}
