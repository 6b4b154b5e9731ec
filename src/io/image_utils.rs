// Copyright @yucwang 2026

use crate::io::exr_utils::read_exr_from_file;
use crate::io::ImageError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

use image::io::Reader as ImageReader;
use std::path::Path;

fn srgb_to_linear(v: Float) -> Float {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Load a linear-radiance bitmap. EXR is read as-is; 8-bit formats are
/// decoded from sRGB.
pub fn load_bitmap(path: &str) -> Result<Bitmap, ImageError> {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let bitmap = match ext.as_str() {
        "exr" => read_exr_from_file(path)?,
        "png" | "jpg" | "jpeg" => load_ldr(path)?,
        _ => return Err(ImageError::UnsupportedFormat(ext)),
    };
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Err(ImageError::Empty(path.to_string()));
    }
    Ok(bitmap)
}

fn load_ldr(path: &str) -> Result<Bitmap, ImageError> {
    let decode_err = |source| ImageError::Decode { path: path.to_string(), source };
    let img = ImageReader::open(path)
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)?;

    let rgb = img.to_rgb32f();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let mut bitmap = Bitmap::new(width, height);
    for (x, y, p) in rgb.enumerate_pixels() {
        bitmap[(x as usize, y as usize)] = RGBSpectrum::new(srgb_to_linear(p[0]),
                                                            srgb_to_linear(p[1]),
                                                            srgb_to_linear(p[2]));
    }
    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(0.5) < 0.5);
    }

    #[test]
    fn test_unsupported_extension() {
        match load_bitmap("sky.hdr") {
            Err(ImageError::UnsupportedFormat(ext)) => assert_eq!(ext, "hdr"),
            _ => panic!("expected unsupported format"),
        }
    }
}
