/* Copyright 2020 @TwoCookingMice */

use crate::io::ImageError;
use crate::math::bitmap::Bitmap;
use crate::math::spectrum::RGBSpectrum;

use exr::prelude::*;
use std::result::Result;

/// Read the first RGB(A) layer of an EXR file into a bitmap.
pub fn read_exr_from_file(file_path: &str) -> Result<Bitmap, ImageError> {
    log::debug!("Reading OpenEXR image from: {}.", file_path);

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| Bitmap::new(resolution.width(), resolution.height()),
            |bitmap: &mut Bitmap, position, (r, g, b, _a): (f32, f32, f32, f32)| {
                bitmap[(position.x(), position.y())] = RGBSpectrum::new(r, g, b);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)
        .map_err(|e| ImageError::ExrRead { path: file_path.to_string(), message: e.to_string() })?;

    let bitmap = image.layer_data.channel_data.pixels;
    log::debug!("OpenEXR loaded, width = {}, height = {}.", bitmap.width(), bitmap.height());
    Ok(bitmap)
}

/// Write a bitmap as a 32-bit float RGB EXR.
pub fn write_exr_to_file(image: &Bitmap, file_path: &str) -> Result<(), ImageError> {
    log::debug!("Writing OpenEXR image: {}.", file_path);

    write_rgb_file(file_path, image.width(), image.height(), |x, y| {
        let p = image[(x, y)];
        (p.r(), p.g(), p.b())
    })
    .map_err(|e| ImageError::ExrWrite { path: file_path.to_string(), message: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exr_write_then_read() {
        let mut bitmap = Bitmap::new(4, 3);
        bitmap[(1, 2)] = RGBSpectrum::new(0.25, 1.5, 3.0);
        bitmap[(3, 0)] = RGBSpectrum::new(1.0, 0.0, 0.0);

        let path = std::env::temp_dir().join(format!("depositer_exr_test_{}.exr", std::process::id()));
        let path = path.to_string_lossy().to_string();
        write_exr_to_file(&bitmap, &path).expect("write");
        let loaded = read_exr_from_file(&path).expect("read");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.width(), 4);
        assert_eq!(loaded.height(), 3);
        assert!((loaded[(1, 2)] - RGBSpectrum::new(0.25, 1.5, 3.0)).max_component().abs() < 1e-6);
        assert!((loaded[(3, 0)].r() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_exr_from_file("/definitely/not/here.exr").is_err());
    }
}
