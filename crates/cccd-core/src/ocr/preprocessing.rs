//! Image preprocessing for region detection and recognition.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use ndarray::Array4;
use tracing::debug;

use crate::error::DetectionError;
use crate::models::config::EnhancementConfig;
use crate::models::BoundingBox;

/// Gray value used for letterbox padding.
const PAD_VALUE: f32 = 114.0 / 255.0;

/// Mapping between a letterboxed model input and the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Source-to-input scale factor.
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    /// Map a point from model input space back to source pixels.
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Image preprocessor for the detection and recognition stages.
pub struct ImagePreprocessor {
    /// Square model input side for detection.
    input_size: u32,
    enhancement: EnhancementConfig,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self {
            input_size: 640,
            enhancement: EnhancementConfig::default(),
        }
    }

    /// Set the square detection input size.
    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size.max(1);
        self
    }

    pub fn with_enhancement(mut self, enhancement: EnhancementConfig) -> Self {
        self.enhancement = enhancement;
        self
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Resize keeping aspect ratio and pad to a square NCHW tensor in [0, 1].
    pub fn letterbox(&self, image: &DynamicImage) -> Result<(Array4<f32>, Letterbox), DetectionError> {
        let (orig_width, orig_height) = image.dimensions();
        if orig_width == 0 || orig_height == 0 {
            return Err(DetectionError::Preprocessing(format!(
                "cannot letterbox {}x{} image",
                orig_width, orig_height
            )));
        }

        let size = self.input_size;
        let scale = (size as f32 / orig_width as f32).min(size as f32 / orig_height as f32);
        let new_width = ((orig_width as f32 * scale).round() as u32).clamp(1, size);
        let new_height = ((orig_height as f32 * scale).round() as u32).clamp(1, size);
        let pad_x = (size - new_width) / 2;
        let pad_y = (size - new_height) / 2;

        debug!(
            "Letterbox {}x{} -> {}x{} (scale {:.3}, pad {}x{})",
            orig_width, orig_height, new_width, new_height, scale, pad_x, pad_y
        );

        let resized = image
            .resize_exact(new_width, new_height, image::imageops::FilterType::Triangle)
            .to_rgb8();

        let mut tensor =
            Array4::<f32>::from_elem((1, 3, size as usize, size as usize), PAD_VALUE);
        for (x, y, pixel) in resized.enumerate_pixels() {
            let tx = (x + pad_x) as usize;
            let ty = (y + pad_y) as usize;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = pixel[c] as f32 / 255.0;
            }
        }

        Ok((
            tensor,
            Letterbox {
                scale,
                pad_x: pad_x as f32,
                pad_y: pad_y as f32,
            },
        ))
    }

    /// Crop a region after clamping it to the image. `None` when nothing of
    /// the box lies inside the image.
    pub fn crop(&self, image: &DynamicImage, bbox: &BoundingBox) -> Option<(DynamicImage, BoundingBox)> {
        let clamped = bbox.clamp(image.width(), image.height())?;
        let cropped = image.crop_imm(
            clamped.x1 as u32,
            clamped.y1 as u32,
            clamped.width() as u32,
            clamped.height() as u32,
        );
        Some((cropped, clamped))
    }

    /// Grayscale, then histogram equalization and median denoise as
    /// configured.
    pub fn enhance(&self, image: &DynamicImage) -> DynamicImage {
        let mut gray = image.to_luma8();
        if self.enhancement.equalize_histogram {
            gray = equalize_histogram(&gray);
        }
        if self.enhancement.denoise && self.enhancement.denoise_radius > 0 {
            gray = median_filter(&gray, self.enhancement.denoise_radius);
        }
        DynamicImage::ImageLuma8(gray)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Spread intensities over the full range using the cumulative histogram.
pub fn equalize_histogram(image: &GrayImage) -> GrayImage {
    let total = (image.width() as u64) * (image.height() as u64);
    if total == 0 {
        return image.clone();
    }

    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let mut cdf = [0u64; 256];
    let mut running = 0u64;
    for (value, count) in histogram.iter().enumerate() {
        running += count;
        cdf[value] = running;
    }

    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    if total == cdf_min {
        // single intensity, nothing to spread
        return image.clone();
    }

    let mut lut = [0u8; 256];
    for (value, entry) in lut.iter_mut().enumerate() {
        let scaled = (cdf[value].saturating_sub(cdf_min) as f64 * 255.0)
            / (total - cdf_min) as f64;
        *entry = scaled.round().clamp(0.0, 255.0) as u8;
    }

    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        pixel[0] = lut[pixel[0] as usize];
    }
    result
}

/// Median filter over a `(2r+1)^2` window, clamped at the borders.
pub fn median_filter(image: &GrayImage, radius: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);
    let mut window = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);

    for y in 0..height {
        for x in 0..width {
            window.clear();
            let y_start = y.saturating_sub(radius);
            let y_end = (y + radius + 1).min(height);
            let x_start = x.saturating_sub(radius);
            let x_end = (x + radius + 1).min(width);

            for ly in y_start..y_end {
                for lx in x_start..x_end {
                    window.push(image.get_pixel(lx, ly)[0]);
                }
            }

            window.sort_unstable();
            result.put_pixel(x, y, Luma([window[window.len() / 2]]));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_letterbox_wide_image() {
        let preprocessor = ImagePreprocessor::new().with_input_size(64);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(128, 64, image::Rgb([255, 0, 0])));

        let (tensor, letterbox) = preprocessor.letterbox(&image).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 64, 64]);
        assert_eq!(letterbox.scale, 0.5);
        assert_eq!(letterbox.pad_x, 0.0);
        assert_eq!(letterbox.pad_y, 16.0);

        // padding rows keep the pad value, content rows carry the image
        assert!((tensor[[0, 0, 0, 10]] - PAD_VALUE).abs() < 1e-6);
        assert!((tensor[[0, 0, 32, 10]] - 1.0).abs() < 1e-6);

        assert_eq!(letterbox.to_source(32.0, 48.0), (64.0, 64.0));
    }

    #[test]
    fn test_crop_clamps() {
        let preprocessor = ImagePreprocessor::new();
        let image = DynamicImage::new_luma8(100, 50);

        let (cropped, clamped) = preprocessor
            .crop(&image, &BoundingBox::new(80, -10, 150, 20))
            .unwrap();
        assert_eq!(clamped, BoundingBox::new(80, 0, 100, 20));
        assert_eq!(cropped.dimensions(), (20, 20));

        assert!(preprocessor.crop(&image, &BoundingBox::new(200, 0, 300, 10)).is_none());
    }

    #[test]
    fn test_equalize_stretches_range() {
        let mut image = GrayImage::new(4, 1);
        for (i, v) in [100u8, 110, 120, 130].iter().enumerate() {
            image.put_pixel(i as u32, 0, Luma([*v]));
        }
        let equalized = equalize_histogram(&image);
        let values: Vec<u8> = equalized.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 85, 170, 255]);
    }

    #[test]
    fn test_equalize_flat_image_unchanged() {
        let image = GrayImage::from_pixel(3, 3, Luma([42]));
        assert_eq!(equalize_histogram(&image), image);
    }

    #[test]
    fn test_median_removes_speck() {
        let mut image = GrayImage::from_pixel(5, 5, Luma([10]));
        image.put_pixel(2, 2, Luma([255]));
        let filtered = median_filter(&image, 1);
        assert_eq!(filtered.get_pixel(2, 2)[0], 10);
    }

    #[test]
    fn test_enhance_outputs_grayscale() {
        let preprocessor = ImagePreprocessor::new();
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([1, 2, 3])));
        let enhanced = preprocessor.enhance(&image);
        assert!(matches!(enhanced, DynamicImage::ImageLuma8(_)));
        assert_eq!(enhanced.dimensions(), (8, 8));
    }
}
