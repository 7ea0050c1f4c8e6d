use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ImageEncoder, RgbaImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::canvas::PixelSurface;

/// Decode raw image bytes and scale the result to canvas dimensions.
pub fn decode_scaled(bytes: &[u8], width: u32, height: u32) -> Result<RgbaImage, String> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| format!("Image decode error: {}", e))?
        .to_rgba8();
    Ok(scale_to(decoded, width, height))
}

/// Open and decode an image file, scaled to canvas dimensions.
pub fn open_scaled(path: &Path, width: u32, height: u32) -> Result<RgbaImage, String> {
    let decoded = image::open(path)
        .map_err(|e| format!("Cannot decode {}: {}", path.display(), e))?
        .to_rgba8();
    Ok(scale_to(decoded, width, height))
}

pub fn scale_to(img: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.width() == width && img.height() == height {
        img
    } else {
        image::imageops::resize(&img, width, height, FilterType::Triangle)
    }
}

/// Load the session's canvas from `path`. A missing file starts a fresh
/// blank canvas; a decode failure also starts blank but hands the host a
/// warning to surface. Never fatal.
pub fn load_session(path: &Path, width: u32, height: u32) -> (PixelSurface, Option<String>) {
    if !path.exists() {
        crate::log_info!("No session image at {}, starting blank", path.display());
        return (PixelSurface::new(width, height), None);
    }
    match open_scaled(path, width, height) {
        Ok(img) => {
            crate::log_info!("Loaded session image from {}", path.display());
            (PixelSurface::from_image(img), None)
        }
        Err(e) => {
            crate::log_warn!("Session image unreadable, starting blank: {}", e);
            (
                PixelSurface::new(width, height),
                Some(format!("Could not load previous drawing: {}", e)),
            )
        }
    }
}

/// Encode the canvas to `path` as PNG. On failure any partially written
/// file is removed so the store never sees partial state.
pub fn save_session(surface: &PixelSurface, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create {}: {}", parent.display(), e))?;
    }

    let result = (|| -> Result<(), String> {
        let file =
            File::create(path).map_err(|e| format!("Cannot create {}: {}", path.display(), e))?;
        let img = surface.as_image();
        PngEncoder::new(BufWriter::new(file))
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ColorType::Rgba8,
            )
            .map_err(|e| format!("PNG encode error: {}", e))
    })();

    if let Err(ref e) = result {
        crate::log_err!("Save failed for {}: {}", path.display(), e);
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    } else {
        crate::log_info!("Saved session image to {}", path.display());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::BACKGROUND;
    use image::Rgba;
    use std::io::Write;

    #[test]
    fn save_then_load_round_trips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.png");

        let mut surface = PixelSurface::new(16, 16);
        surface.put_pixel(3, 4, Rgba([10, 200, 30, 255]));
        save_session(&surface, &path).unwrap();

        let (loaded, warning) = load_session(&path, 16, 16);
        assert!(warning.is_none());
        assert_eq!(loaded.get_pixel(3, 4), Some(Rgba([10, 200, 30, 255])));
        assert_eq!(loaded.get_pixel(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn missing_file_starts_blank_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (surface, warning) = load_session(&dir.path().join("nope.png"), 8, 8);
        assert!(warning.is_none());
        assert_eq!(surface.get_pixel(4, 4), Some(BACKGROUND));
    }

    #[test]
    fn corrupt_file_starts_blank_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        File::create(&path)
            .unwrap()
            .write_all(b"not an image at all")
            .unwrap();

        let (surface, warning) = load_session(&path, 8, 8);
        assert!(warning.is_some());
        assert_eq!(surface.get_pixel(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn load_scales_to_canvas_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        let small = PixelSurface::from_image(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        save_session(&small, &path).unwrap();

        let (loaded, _) = load_session(&path, 32, 32);
        assert_eq!(loaded.width(), 32);
        assert_eq!(loaded.height(), 32);
        assert_eq!(loaded.get_pixel(16, 16), Some(Rgba([0, 0, 0, 255])));
    }
}
