//! Exact resize, deriving a missing dimension from the source ratio.

use super::{InputSizeConstraint, Params, TransformationError, scale_dim};
use crate::imaging::backend::{BackendError, ImageResource};
use crate::imaging::params::ImageSize;
use crate::parser::TransformationDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeParams {
    pub fn from_descriptor(desc: &TransformationDescriptor) -> Result<Self, TransformationError> {
        let params = Params::new("resize", desc);
        let width = params.u32("width")?;
        let height = params.u32("height")?;

        if width.is_none() && height.is_none() {
            return Err(TransformationError::MissingParameter(
                "resize: at least one of 'width' and 'height' is required".into(),
            ));
        }

        Ok(Self { width, height })
    }

    /// The exact output size. A missing dimension is derived from the
    /// source aspect ratio; when both are given, both are honored even
    /// if that distorts.
    pub fn output_size(&self, source: ImageSize) -> ImageSize {
        match (self.width, self.height) {
            (Some(w), Some(h)) => ImageSize::new(w, h),
            (Some(w), None) => {
                let h = (f64::from(w) / source.ratio()).round().max(1.0) as u32;
                ImageSize::new(w, h)
            }
            (None, Some(h)) => {
                let w = (f64::from(h) * source.ratio()).round().max(1.0) as u32;
                ImageSize::new(w, h)
            }
            (None, None) => source,
        }
    }

    pub fn transform(&self, image: &mut dyn ImageResource) -> Result<(), BackendError> {
        let output = self.output_size(image.size());
        if output == image.size() {
            return Ok(());
        }
        image.resize_to(output.width, output.height)
    }

    pub fn adjusted(&self, ratio: f64) -> Self {
        Self {
            width: self.width.map(|w| scale_dim(w, ratio)),
            height: self.height.map(|h| scale_dim(h, ratio)),
        }
    }
}

impl InputSizeConstraint for ResizeParams {
    fn minimum_input_size(&self, source: ImageSize) -> ImageSize {
        self.output_size(source)
    }
}
