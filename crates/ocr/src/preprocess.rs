use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
    #[error("Image has no pixels")]
    EmptyImage,
}

/// An image enhancement step run before the second recognition pass.
/// Failures are tolerated by the caller, which falls back to the original.
pub trait ImageEnhancer: Send + Sync {
    fn enhance(&self, image: &DynamicImage) -> Result<DynamicImage, PreprocessError>;
}

/// Grayscale + contrast stretch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContrastStretch;

impl ImageEnhancer for ContrastStretch {
    fn enhance(&self, image: &DynamicImage) -> Result<DynamicImage, PreprocessError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PreprocessError::EmptyImage);
        }

        let gray: GrayImage = image.to_luma8();

        // Compute min and max pixel values for contrast stretching.
        let (min_px, max_px) = gray
            .pixels()
            .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

        if max_px == min_px {
            // Uniform image, nothing to stretch.
            return Ok(DynamicImage::ImageLuma8(gray));
        }

        let range = (max_px - min_px) as u32;
        let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            let p = gray.get_pixel(x, y)[0];
            let v = ((p - min_px) as u32 * 255 / range) as u8;
            Luma([v])
        });

        Ok(DynamicImage::ImageLuma8(stretched))
    }
}

/// Decode raw image bytes (JPEG / PNG / WEBP / …).
pub fn load_from_bytes(data: &[u8]) -> Result<DynamicImage, PreprocessError> {
    Ok(image::load_from_memory(data)?)
}

/// Down-scale so neither side exceeds `max_dimension`, keeping the aspect ratio.
pub fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    if img.width() > max_dimension || img.height() > max_dimension {
        img.resize(max_dimension, max_dimension, image::imageops::FilterType::Lanczos3)
    } else {
        img
    }
}

pub fn encode_as_png(img: &DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    fn gradient_gray(width: u32, height: u32) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |x, _| {
            Luma([(x * 255 / width) as u8])
        });
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn stretch_uniform_image_keeps_size() {
        let result = ContrastStretch.enhance(&solid_gray(10, 10, 128)).unwrap();
        assert_eq!(result.width(), 10);
        assert_eq!(result.height(), 10);
    }

    #[test]
    fn stretch_expands_narrow_range() {
        let img: GrayImage = ImageBuffer::from_fn(64, 1, |x, _| Luma([100 + (x as u8 % 50)]));
        let result = ContrastStretch.enhance(&DynamicImage::ImageLuma8(img)).unwrap();
        let gray = result.to_luma8();
        let min = gray.pixels().map(|p| p[0]).min().unwrap();
        let max = gray.pixels().map(|p| p[0]).max().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn stretch_gradient_reaches_full_range() {
        let gray = ContrastStretch.enhance(&gradient_gray(256, 1)).unwrap().to_luma8();
        assert_eq!(gray.pixels().map(|p| p[0]).max().unwrap(), 255);
    }

    #[test]
    fn stretch_rejects_empty_image() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(ContrastStretch.enhance(&empty), Err(PreprocessError::EmptyImage)));
    }

    #[test]
    fn encode_produces_png_header() {
        let png = encode_as_png(&solid_gray(4, 4, 100)).unwrap();
        // PNG magic bytes: 0x89 0x50 0x4E 0x47
        assert_eq!(&png[..4], b"\x89PNG");
        assert_eq!(load_from_bytes(&png).unwrap().width(), 4);
    }

    #[test]
    fn load_rejects_garbage_bytes() {
        assert!(matches!(load_from_bytes(b"not an image"), Err(PreprocessError::Load(_))));
    }

    #[test]
    fn large_image_is_resized() {
        let img = solid_gray(3000, 1500, 200);
        let result = fit_within(img, 1920);
        assert_eq!(result.width(), 1920);
        assert_eq!(result.height(), 960);
    }

    #[test]
    fn small_image_is_untouched() {
        let result = fit_within(solid_gray(800, 600, 10), 1920);
        assert_eq!((result.width(), result.height()), (800, 600));
    }
}
