//! Plain rectangular crop, with optional centering modes.

use super::{InputSizeConstraint, Params, RegionExtractor, TransformationError, scale_dim, scale_pos};
use crate::imaging::backend::{BackendError, ImageResource};
use crate::imaging::calculations::center_crop;
use crate::imaging::params::{ImageSize, Rectangle};
use crate::parser::TransformationDescriptor;
use std::str::FromStr;

/// How the crop position is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropMode {
    /// Explicit x/y, both required.
    #[default]
    Free,
    /// Centered on both axes; x/y ignored.
    Center,
    /// Centered horizontally; y required.
    CenterX,
    /// Centered vertically; x required.
    CenterY,
}

impl FromStr for CropMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(CropMode::Center),
            "center-x" => Ok(CropMode::CenterX),
            "center-y" => Ok(CropMode::CenterY),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropParams {
    pub width: u32,
    pub height: u32,
    /// Left edge; meaningful unless the mode centers horizontally.
    pub x: u32,
    /// Top edge; meaningful unless the mode centers vertically.
    pub y: u32,
    pub mode: CropMode,
}

impl CropParams {
    /// Fully centered crop of `width` x `height`, the shape smart-size
    /// composes for its no-POI fallback.
    pub fn centered(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
            mode: CropMode::Center,
        }
    }

    pub fn from_descriptor(desc: &TransformationDescriptor) -> Result<Self, TransformationError> {
        let params = Params::new("crop", desc);

        let width = params.require_u32("width")?;
        let height = params.require_u32("height")?;

        let mode = match params.raw("mode") {
            None => CropMode::Free,
            Some(raw) => raw.parse().map_err(|()| {
                TransformationError::InvalidParameter(format!(
                    "crop: invalid mode '{raw}', valid modes are: center, center-x, center-y"
                ))
            })?,
        };

        let needs_x = matches!(mode, CropMode::Free | CropMode::CenterY);
        let needs_y = matches!(mode, CropMode::Free | CropMode::CenterX);

        let x = match (needs_x, params.u32_nonneg("x")?) {
            (true, Some(x)) => x,
            (true, None) => {
                return Err(TransformationError::MissingParameter(
                    "crop: 'x' is required when mode does not center horizontally".into(),
                ));
            }
            (false, _) => 0,
        };
        let y = match (needs_y, params.u32_nonneg("y")?) {
            (true, Some(y)) => y,
            (true, None) => {
                return Err(TransformationError::MissingParameter(
                    "crop: 'y' is required when mode does not center vertically".into(),
                ));
            }
            (false, _) => 0,
        };

        Ok(Self {
            width,
            height,
            x,
            y,
            mode,
        })
    }

    pub fn transform(&self, image: &mut dyn ImageResource) -> Result<(), BackendError> {
        let region = self.extracted_region(image.size());
        image.crop(region)
    }

    pub fn adjusted(&self, ratio: f64) -> Self {
        Self {
            width: scale_dim(self.width, ratio),
            height: scale_dim(self.height, ratio),
            x: scale_pos(self.x, ratio),
            y: scale_pos(self.y, ratio),
            mode: self.mode,
        }
    }
}

impl RegionExtractor for CropParams {
    fn extracted_region(&self, source: ImageSize) -> Rectangle {
        let centered = center_crop(ImageSize::new(self.width, self.height), source);

        // Explicit coordinates are clamped so the region stays inside
        // the source; dimensions are capped against what remains.
        let free_x = self.x.min(source.width.saturating_sub(1));
        let free_y = self.y.min(source.height.saturating_sub(1));

        let (x, width) = match self.mode {
            CropMode::Free | CropMode::CenterY => {
                (free_x, self.width.min(source.width - free_x))
            }
            CropMode::Center | CropMode::CenterX => (centered.x, centered.width),
        };
        let (y, height) = match self.mode {
            CropMode::Free | CropMode::CenterX => {
                (free_y, self.height.min(source.height - free_y))
            }
            CropMode::Center | CropMode::CenterY => (centered.y, centered.height),
        };

        Rectangle::new(x, y, width, height)
    }
}

impl InputSizeConstraint for CropParams {
    fn minimum_input_size(&self, _source: ImageSize) -> ImageSize {
        // Validation bounds neither offsets nor dimensions, so the sum
        // can exceed u32; saturate rather than overflow.
        let width = match self.mode {
            CropMode::Free | CropMode::CenterY => self.x.saturating_add(self.width),
            _ => self.width,
        };
        let height = match self.mode {
            CropMode::Free | CropMode::CenterX => self.y.saturating_add(self.height),
            _ => self.height,
        };
        ImageSize::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockResource, RecordedOp};
    use crate::parser::parse_transformation;

    fn parse(raw: &str) -> CropParams {
        CropParams::from_descriptor(&parse_transformation(raw)).unwrap()
    }

    #[test]
    fn free_mode_requires_coordinates() {
        let err = CropParams::from_descriptor(&parse_transformation("crop:width=100,height=50"))
            .unwrap_err();
        assert!(matches!(err, TransformationError::MissingParameter(_)));
    }

    #[test]
    fn free_mode_accepts_zero_origin() {
        let params = parse("crop:width=100,height=50,x=0,y=0");
        assert_eq!((params.x, params.y), (0, 0));
    }

    #[test]
    fn center_mode_needs_no_coordinates() {
        let params = parse("crop:width=100,height=50,mode=center");
        assert_eq!(params.mode, CropMode::Center);
    }

    #[test]
    fn center_x_still_requires_y() {
        let err = CropParams::from_descriptor(&parse_transformation(
            "crop:width=100,height=50,mode=center-x",
        ))
        .unwrap_err();
        assert!(matches!(err, TransformationError::MissingParameter(_)));
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let err = CropParams::from_descriptor(&parse_transformation(
            "crop:width=100,height=50,x=0,y=0,mode=corner",
        ))
        .unwrap_err();
        assert!(matches!(err, TransformationError::InvalidParameter(_)));
    }

    #[test]
    fn free_region_is_clamped_to_source() {
        let params = parse("crop:width=100,height=50,x=950,y=580");
        let region = params.extracted_region(ImageSize::new(1000, 600));
        assert_eq!(region, Rectangle::new(950, 580, 50, 20));
    }

    #[test]
    fn centered_region() {
        let params = CropParams::centered(200, 200);
        assert_eq!(
            params.extracted_region(ImageSize::new(333, 200)),
            Rectangle::new(66, 0, 200, 200)
        );
    }

    #[test]
    fn center_x_region_keeps_explicit_y() {
        let params = parse("crop:width=100,height=50,y=30,mode=center-x");
        assert_eq!(
            params.extracted_region(ImageSize::new(300, 200)),
            Rectangle::new(100, 30, 100, 50)
        );
    }

    #[test]
    fn transform_crops_computed_region() {
        let params = parse("crop:width=100,height=50,x=10,y=20");
        let mut image = MockResource::new(300, 200);
        params.transform(&mut image).unwrap();
        assert_eq!(
            image.operations,
            vec![RecordedOp::Crop(Rectangle::new(10, 20, 100, 50))]
        );
    }

    #[test]
    fn query_matches_mutation() {
        let params = parse("crop:width=120,height=80,x=40,y=10");
        let source = ImageSize::new(500, 400);
        let mut image = MockResource::new(source.width, source.height);

        let queried = params.extracted_region(source);
        params.transform(&mut image).unwrap();

        assert_eq!(image.operations, vec![RecordedOp::Crop(queried)]);
    }

    #[test]
    fn minimum_input_covers_offset_region() {
        let params = parse("crop:width=100,height=50,x=40,y=10");
        assert_eq!(
            params.minimum_input_size(ImageSize::new(1000, 1000)),
            ImageSize::new(140, 60)
        );
    }

    #[test]
    fn minimum_input_saturates_on_huge_offsets() {
        let params = parse("crop:width=4294967295,height=10,x=4294967295,y=0");
        assert_eq!(
            params.minimum_input_size(ImageSize::new(1000, 600)),
            ImageSize::new(u32::MAX, 10)
        );
    }

    #[test]
    fn minimum_input_for_centered_crop_is_the_target() {
        let params = CropParams::centered(200, 100);
        assert_eq!(
            params.minimum_input_size(ImageSize::new(1000, 1000)),
            ImageSize::new(200, 100)
        );
    }

    #[test]
    fn adjust_rescales_position_and_size() {
        let params = parse("crop:width=100,height=50,x=40,y=10");
        let adjusted = params.adjusted(2.0);
        assert_eq!(adjusted.width, 50);
        assert_eq!(adjusted.height, 25);
        assert_eq!(adjusted.x, 20);
        assert_eq!(adjusted.y, 5);
    }

    #[test]
    fn adjust_round_trips_within_rounding() {
        let params = parse("crop:width=100,height=50,x=40,y=10");
        let round_tripped = params.adjusted(0.5).adjusted(2.0);
        assert_eq!(round_tripped, params);
    }
}
