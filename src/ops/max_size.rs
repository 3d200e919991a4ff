//! Aspect-preserving scale-down to fit within a bounding box.
//!
//! Never upscales: a source already within the bounds passes through
//! untouched.

use super::{InputSizeConstraint, Params, TransformationError, scale_dim};
use crate::imaging::backend::{BackendError, ImageResource};
use crate::imaging::calculations::max_size_output;
use crate::imaging::params::ImageSize;
use crate::parser::TransformationDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxSizeParams {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl MaxSizeParams {
    pub fn new(max_width: Option<u32>, max_height: Option<u32>) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    pub fn from_descriptor(desc: &TransformationDescriptor) -> Result<Self, TransformationError> {
        let params = Params::new("maxSize", desc);
        let max_width = params.u32("width")?;
        let max_height = params.u32("height")?;

        if max_width.is_none() && max_height.is_none() {
            return Err(TransformationError::MissingParameter(
                "maxSize: at least one of 'width' and 'height' is required".into(),
            ));
        }

        Ok(Self {
            max_width,
            max_height,
        })
    }

    /// Size of the image after this operation runs against `source`.
    pub fn output_size(&self, source: ImageSize) -> ImageSize {
        max_size_output(self.max_width, self.max_height, source)
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
            max_width: self.max_width.map(|w| scale_dim(w, ratio)),
            max_height: self.max_height.map(|h| scale_dim(h, ratio)),
        }
    }
}

impl InputSizeConstraint for MaxSizeParams {
    /// A source at the output size is already enough; fetching anything
    /// larger only to scale it down is wasted work.
    fn minimum_input_size(&self, source: ImageSize) -> ImageSize {
        self.output_size(source)
    }
}
