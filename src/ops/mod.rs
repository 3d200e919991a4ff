//! Transformation operations.
//!
//! Each known operation name maps to a variant of the closed
//! [`Operation`] enum, carrying its own validated parameter struct.
//! Validation happens in `from_descriptor` constructors on the parameter
//! structs; a descriptor never reaches the mutating path half-validated.
//!
//! ## Capability protocol
//!
//! Size-sensitive operations implement [`RegionExtractor`] and
//! [`InputSizeConstraint`] so other pipeline stages can ask, without
//! mutating anything, what rectangle an operation will crop and how
//! small a source it can work from. Answers must match what `transform`
//! actually does for the same inputs — that consistency is the engine's
//! core invariant and is what the heavier tests in this tree exercise.

pub mod crop;
pub mod max_size;
pub mod resize;
pub mod simple;
pub mod smart_size;

pub use crop::{CropMode, CropParams};
pub use max_size::MaxSizeParams;
pub use resize::ResizeParams;
pub use simple::{CompressParams, RotateParams};
pub use smart_size::SmartSizeParams;

use crate::imaging::backend::{BackendError, ImageResource};
use crate::imaging::params::{ImageSize, Poi, Rectangle};
use crate::metadata::MetadataError;
use crate::parser::TransformationDescriptor;
use thiserror::Error;

/// Validation failure for one descriptor. All variants classify as
/// client errors (HTTP 400 equivalents) and abort the rest of the chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformationError {
    #[error("missing parameter: {0}")]
    MissingParameter(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("unsupported transformation: {0}")]
    Unsupported(String),
}

impl TransformationError {
    /// HTTP-equivalent status classification.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Error from resolving one descriptor into an operation.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Invalid(#[from] TransformationError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Lazy focal-point fallback consulted while validating a smart-size
/// stage whose request carries no explicit `poi`.
pub trait PoiLookup {
    fn stored_poi(&self) -> Result<Option<Poi>, MetadataError>;
}

/// Lookup that never finds a stored POI.
pub struct NoStoredPoi;

impl PoiLookup for NoStoredPoi {
    fn stored_poi(&self) -> Result<Option<Poi>, MetadataError> {
        Ok(None)
    }
}

/// Query-only view of what a crop-like operation will extract from an
/// exact source size.
pub trait RegionExtractor {
    fn extracted_region(&self, source: ImageSize) -> Rectangle;
}

/// Query-only view of the smallest source an operation needs to produce
/// a correct result.
pub trait InputSizeConstraint {
    fn minimum_input_size(&self, source: ImageSize) -> ImageSize;
}

/// A validated pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    SmartSize(SmartSizeParams),
    Crop(CropParams),
    MaxSize(MaxSizeParams),
    Resize(ResizeParams),
    FlipHorizontally,
    FlipVertically,
    Rotate(RotateParams),
    Compress(CompressParams),
}

/// Result of looking a descriptor up against the known operation set.
#[derive(Debug)]
pub enum Resolution {
    Known(Operation),
    /// The name matches no known operation. The executor's configured
    /// policy decides whether this skips or fails.
    Unsupported,
}

/// Resolve and validate one descriptor.
pub fn resolve(
    desc: &TransformationDescriptor,
    poi_fallback: &dyn PoiLookup,
) -> Result<Resolution, ResolveError> {
    let op = match desc.name.as_str() {
        "smartSize" => Operation::SmartSize(SmartSizeParams::from_descriptor(desc, poi_fallback)?),
        "crop" => Operation::Crop(CropParams::from_descriptor(desc)?),
        "maxSize" => Operation::MaxSize(MaxSizeParams::from_descriptor(desc)?),
        "resize" => Operation::Resize(ResizeParams::from_descriptor(desc)?),
        "flipHorizontally" => Operation::FlipHorizontally,
        "flipVertically" => Operation::FlipVertically,
        "rotate" => Operation::Rotate(RotateParams::from_descriptor(desc)?),
        "compress" => Operation::Compress(CompressParams::from_descriptor(desc)?),
        _ => return Ok(Resolution::Unsupported),
    };
    Ok(Resolution::Known(op))
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SmartSize(_) => "smartSize",
            Operation::Crop(_) => "crop",
            Operation::MaxSize(_) => "maxSize",
            Operation::Resize(_) => "resize",
            Operation::FlipHorizontally => "flipHorizontally",
            Operation::FlipVertically => "flipVertically",
            Operation::Rotate(_) => "rotate",
            Operation::Compress(_) => "compress",
        }
    }

    /// Apply the operation to the image.
    pub fn transform(&self, image: &mut dyn ImageResource) -> Result<(), BackendError> {
        match self {
            Operation::SmartSize(p) => p.transform(image),
            Operation::Crop(p) => p.transform(image),
            Operation::MaxSize(p) => p.transform(image),
            Operation::Resize(p) => p.transform(image),
            Operation::FlipHorizontally => image.flip_horizontal(),
            Operation::FlipVertically => image.flip_vertical(),
            Operation::Rotate(p) => image.rotate(p.angle),
            Operation::Compress(p) => image.set_quality(p.quality),
        }
    }

    /// Capability query: the rectangle this stage will crop out of a
    /// source of exactly `source`, for stages that crop at all.
    pub fn extracted_region(&self, source: ImageSize) -> Option<Rectangle> {
        match self {
            Operation::SmartSize(p) => Some(p.extracted_region(source)),
            Operation::Crop(p) => Some(p.extracted_region(source)),
            _ => None,
        }
    }

    /// Capability query: the smallest source this stage needs, for
    /// stages whose geometry depends on source size.
    pub fn minimum_input_size(&self, source: ImageSize) -> Option<ImageSize> {
        match self {
            Operation::SmartSize(p) => Some(p.minimum_input_size(source)),
            Operation::Crop(p) => Some(p.minimum_input_size(source)),
            Operation::MaxSize(p) => Some(p.minimum_input_size(source)),
            Operation::Resize(p) => Some(p.minimum_input_size(source)),
            _ => None,
        }
    }

    /// Rescale positional and size parameters by `ratio`, for when an
    /// upstream stage substitutes a smaller source than originally
    /// requested. Non-positional operations pass through unchanged.
    pub fn adjusted(&self, ratio: f64) -> Operation {
        match self {
            Operation::SmartSize(p) => Operation::SmartSize(p.adjusted(ratio)),
            Operation::Crop(p) => Operation::Crop(p.adjusted(ratio)),
            Operation::MaxSize(p) => Operation::MaxSize(p.adjusted(ratio)),
            Operation::Resize(p) => Operation::Resize(p.adjusted(ratio)),
            other => other.clone(),
        }
    }

    /// Largest width/height this stage asks for, used to enforce the
    /// configured output cap.
    pub fn max_requested_extent(&self) -> Option<u32> {
        match self {
            Operation::SmartSize(p) => Some(p.width.max(p.height)),
            Operation::Crop(p) => Some(p.width.max(p.height)),
            Operation::MaxSize(p) => p.max_width.max(p.max_height),
            Operation::Resize(p) => p.width.max(p.height),
            _ => None,
        }
    }
}

/// Typed accessor over a descriptor's raw parameter map. Empty values
/// count as absent, matching the lenient parse step.
pub(crate) struct Params<'a> {
    op: &'static str,
    desc: &'a TransformationDescriptor,
}

impl<'a> Params<'a> {
    pub(crate) fn new(op: &'static str, desc: &'a TransformationDescriptor) -> Self {
        Self { op, desc }
    }

    pub(crate) fn raw(&self, key: &str) -> Option<&'a str> {
        self.desc.parameters.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Optional positive integer.
    pub(crate) fn u32(&self, key: &str) -> Result<Option<u32>, TransformationError> {
        match self.raw(key) {
            None => Ok(None),
            Some(raw) => match raw.parse::<u32>() {
                Ok(v) if v > 0 => Ok(Some(v)),
                _ => Err(TransformationError::InvalidParameter(format!(
                    "{}: '{key}' must be a positive integer, got '{raw}'",
                    self.op
                ))),
            },
        }
    }

    /// Optional non-negative integer (positions may be zero).
    pub(crate) fn u32_nonneg(&self, key: &str) -> Result<Option<u32>, TransformationError> {
        match self.raw(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<u32>().map(Some).map_err(|_| {
                TransformationError::InvalidParameter(format!(
                    "{}: '{key}' must be a non-negative integer, got '{raw}'",
                    self.op
                ))
            }),
        }
    }

    /// Mandatory positive integer.
    pub(crate) fn require_u32(&self, key: &str) -> Result<u32, TransformationError> {
        self.u32(key)?.ok_or_else(|| {
            TransformationError::MissingParameter(format!("{}: '{key}' is required", self.op))
        })
    }

    /// Optional float.
    pub(crate) fn f64(&self, key: &str) -> Result<Option<f64>, TransformationError> {
        match self.raw(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| {
                TransformationError::InvalidParameter(format!(
                    "{}: '{key}' must be a number, got '{raw}'",
                    self.op
                ))
            }),
        }
    }
}

/// Round a size/position parameter adjusted by a scale ratio, keeping it
/// at least one pixel so a valid parameter never degenerates to zero.
pub(crate) fn scale_dim(value: u32, ratio: f64) -> u32 {
    ((f64::from(value) / ratio).round() as u32).max(1)
}

/// Positions may legitimately round to zero.
pub(crate) fn scale_pos(value: u32, ratio: f64) -> u32 {
    (f64::from(value) / ratio).round() as u32
}
