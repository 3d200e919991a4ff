//! Image resource trait and shared error type.
//!
//! The [`ImageResource`] trait is the seam between the chain engine and
//! whatever actually owns the pixels. The engine only ever reads the
//! current dimensions and requests whole-image mutations; it never
//! touches pixel data itself.
//!
//! The production implementation is
//! [`RustResource`](super::rust_backend::RustResource), backed by the
//! `image` crate. Tests use a recording mock that tracks dimension
//! changes without doing any pixel work.

use super::params::{ImageSize, Rectangle};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("crop region {region} is outside the {size} source")]
    RegionOutOfBounds { region: Rectangle, size: ImageSize },
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

/// A decoded image with known dimensions, supporting the mutations the
/// chain executor delegates.
///
/// Every mutation leaves the resource in a consistent state: `width` and
/// `height` always describe the current (post-mutation) image.
pub trait ImageResource {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn size(&self) -> ImageSize {
        ImageSize::new(self.width(), self.height())
    }

    /// Crop to `region`, which must fit within the current size.
    fn crop(&mut self, region: Rectangle) -> Result<(), BackendError>;

    /// Resize to exactly `width` x `height` (no aspect preservation here;
    /// callers compute the geometry).
    fn resize_to(&mut self, width: u32, height: u32) -> Result<(), BackendError>;

    fn flip_horizontal(&mut self) -> Result<(), BackendError>;

    fn flip_vertical(&mut self) -> Result<(), BackendError>;

    /// Rotate clockwise by `degrees`.
    fn rotate(&mut self, degrees: f64) -> Result<(), BackendError>;

    /// Record the quality to use when the image is eventually encoded.
    fn set_quality(&mut self, quality: u32) -> Result<(), BackendError>;

    /// Reset any page/canvas offset metadata left over from a crop.
    fn reset_page(&mut self);

    /// Whether any mutation has been applied since the resource was
    /// loaded. Response layers use this to decide on re-encoding.
    fn has_been_transformed(&self) -> bool;
}
