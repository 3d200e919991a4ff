//! Pass-through operations with trivial geometry: rotate and compress.
//!
//! The flips carry no parameters at all and live directly on the
//! `Operation` enum; these two at least have something to validate.

use super::{Params, TransformationError};
use crate::parser::TransformationDescriptor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateParams {
    /// Clockwise rotation in degrees. The backend decides which angles
    /// it supports.
    pub angle: f64,
}

impl RotateParams {
    pub fn from_descriptor(desc: &TransformationDescriptor) -> Result<Self, TransformationError> {
        let params = Params::new("rotate", desc);
        let angle = params.f64("angle")?.ok_or_else(|| {
            TransformationError::MissingParameter("rotate: 'angle' is required".into())
        })?;
        Ok(Self { angle })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressParams {
    /// Encode quality, 1-100.
    pub quality: u32,
}

impl CompressParams {
    pub fn from_descriptor(desc: &TransformationDescriptor) -> Result<Self, TransformationError> {
        let params = Params::new("compress", desc);
        let quality = params.require_u32("quality")?;
        if quality > 100 {
            return Err(TransformationError::InvalidParameter(format!(
                "compress: 'quality' must be between 1 and 100, got {quality}"
            )));
        }
        Ok(Self { quality })
    }
}
