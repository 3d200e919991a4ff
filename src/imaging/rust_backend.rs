//! Pure Rust image resource — zero external dependencies.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image` crate (pure Rust decoders) |
//! | Crop | `image::DynamicImage::crop_imm` |
//! | Resize | `image::imageops` with `Lanczos3` filter |
//! | Flip / rotate | `image::DynamicImage` (rotation in 90° steps) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with recorded quality |

use super::backend::{BackendError, ImageResource};
use super::params::Rectangle;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Image resource backed by an in-memory [`DynamicImage`].
///
/// `reset_page` is a no-op: unlike ImageMagick-style backends, the
/// `image` crate keeps no canvas offsets after a crop.
pub struct RustResource {
    image: DynamicImage,
    quality: u32,
    transformed: bool,
}

impl RustResource {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            quality: 90,
            transformed: false,
        }
    }

    /// Decode an image from raw bytes (format sniffed from content).
    pub fn from_bytes(data: &[u8]) -> Result<Self, BackendError> {
        let image = image::load_from_memory(data)
            .map_err(|e| BackendError::ProcessingFailed(format!("failed to decode: {e}")))?;
        Ok(Self::new(image))
    }

    /// Quality recorded for encode time (1-100, default 90).
    pub fn quality(&self) -> u32 {
        self.quality
    }

    /// Encode the current state as JPEG using the recorded quality.
    pub fn encode_jpeg(&self) -> Result<Vec<u8>, BackendError> {
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality as u8);
        self.image
            .to_rgb8()
            .write_with_encoder(encoder)
            .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        Ok(bytes)
    }

    pub fn into_inner(self) -> DynamicImage {
        self.image
    }
}

impl ImageResource for RustResource {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn crop(&mut self, region: Rectangle) -> Result<(), BackendError> {
        if !region.fits_within(self.size()) {
            return Err(BackendError::RegionOutOfBounds {
                region,
                size: self.size(),
            });
        }
        self.image = self
            .image
            .crop_imm(region.x, region.y, region.width, region.height);
        self.transformed = true;
        Ok(())
    }

    fn resize_to(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::ProcessingFailed(
                "resize target must be positive".into(),
            ));
        }
        self.image = self.image.resize_exact(width, height, FilterType::Lanczos3);
        self.transformed = true;
        Ok(())
    }

    fn flip_horizontal(&mut self) -> Result<(), BackendError> {
        self.image = self.image.fliph();
        self.transformed = true;
        Ok(())
    }

    fn flip_vertical(&mut self) -> Result<(), BackendError> {
        self.image = self.image.flipv();
        self.transformed = true;
        Ok(())
    }

    fn rotate(&mut self, degrees: f64) -> Result<(), BackendError> {
        let normalized = degrees.rem_euclid(360.0);
        if normalized == 0.0 {
            return Ok(());
        }
        self.image = if normalized == 90.0 {
            self.image.rotate90()
        } else if normalized == 180.0 {
            self.image.rotate180()
        } else if normalized == 270.0 {
            self.image.rotate270()
        } else {
            return Err(BackendError::ProcessingFailed(format!(
                "rotation only supports 90° steps, got {degrees}"
            )));
        };
        self.transformed = true;
        Ok(())
    }

    fn set_quality(&mut self, quality: u32) -> Result<(), BackendError> {
        self.quality = quality.clamp(1, 100);
        self.transformed = true;
        Ok(())
    }

    fn reset_page(&mut self) {}

    fn has_been_transformed(&self) -> bool {
        self.transformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::ImageSize;
    use image::{GenericImageView, Rgb, RgbImage};

    /// Black canvas with a single red marker pixel.
    fn marked_image(width: u32, height: u32, mark: (u32, u32)) -> RustResource {
        let mut buffer = RgbImage::new(width, height);
        buffer.put_pixel(mark.0, mark.1, Rgb([255, 0, 0]));
        RustResource::new(DynamicImage::ImageRgb8(buffer))
    }

    #[test]
    fn crop_moves_marker_to_region_local_coordinates() {
        let mut resource = marked_image(100, 60, (50, 30));
        resource.crop(Rectangle::new(40, 20, 30, 30)).unwrap();

        assert_eq!(resource.size(), ImageSize::new(30, 30));
        assert_eq!(resource.into_inner().get_pixel(10, 10), image::Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn crop_out_of_bounds_is_rejected() {
        let mut resource = marked_image(100, 60, (0, 0));
        let err = resource.crop(Rectangle::new(90, 0, 20, 20)).unwrap_err();
        assert!(matches!(err, BackendError::RegionOutOfBounds { .. }));
        assert!(!resource.has_been_transformed());
    }

    #[test]
    fn resize_changes_dimensions() {
        let mut resource = marked_image(100, 60, (0, 0));
        resource.resize_to(50, 30).unwrap();
        assert_eq!(resource.size(), ImageSize::new(50, 30));
        assert!(resource.has_been_transformed());
    }

    #[test]
    fn rotate_quarter_turn_swaps_dimensions() {
        let mut resource = marked_image(100, 60, (0, 0));
        resource.rotate(90.0).unwrap();
        assert_eq!(resource.size(), ImageSize::new(60, 100));
    }

    #[test]
    fn rotate_rejects_odd_angle() {
        let mut resource = marked_image(100, 60, (0, 0));
        assert!(resource.rotate(45.0).is_err());
    }

    #[test]
    fn rotate_zero_is_a_no_op() {
        let mut resource = marked_image(100, 60, (0, 0));
        resource.rotate(0.0).unwrap();
        assert!(!resource.has_been_transformed());
    }

    #[test]
    fn flip_horizontal_moves_marker() {
        let mut resource = marked_image(10, 10, (0, 0));
        resource.flip_horizontal().unwrap();
        assert_eq!(resource.into_inner().get_pixel(9, 0), image::Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn quality_is_clamped_and_recorded() {
        let mut resource = marked_image(10, 10, (0, 0));
        resource.set_quality(150).unwrap();
        assert_eq!(resource.quality(), 100);
        resource.set_quality(0).unwrap();
        assert_eq!(resource.quality(), 1);
    }

    #[test]
    fn encode_jpeg_produces_decodable_bytes() {
        let resource = marked_image(32, 16, (0, 0));
        let bytes = resource.encode_jpeg().unwrap();
        let decoded = RustResource::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.size(), ImageSize::new(32, 16));
    }
}
