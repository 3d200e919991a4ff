//! POI-aware crop-and-resize ("smart size").
//!
//! With a focal point — explicit or recalled from stored metadata — the
//! crop rectangle comes from [`smart_crop`]: sized by the closeness
//! tunables, centered on the POI, clamped to the source. Without one,
//! the operation composes its generic siblings instead: a max-size
//! scale-down on the constraining dimension followed by a centered crop.

use super::{
    CropParams, InputSizeConstraint, MaxSizeParams, Params, PoiLookup, RegionExtractor,
    ResolveError, TransformationError, scale_dim,
};
use crate::imaging::backend::{BackendError, ImageResource};
use crate::imaging::calculations::{simple_max_size_constraint, smart_crop};
use crate::imaging::params::{Closeness, ImageSize, Poi, Rectangle};
use crate::parser::TransformationDescriptor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmartSizeParams {
    pub width: u32,
    pub height: u32,
    /// Resolved focal point; `None` means the operation runs in
    /// simple-crop mode.
    pub poi: Option<Poi>,
    pub closeness: Closeness,
}

impl SmartSizeParams {
    /// Validate raw parameters, resolving the POI from the request or,
    /// failing that, from previously stored metadata.
    pub fn from_descriptor(
        desc: &TransformationDescriptor,
        poi_fallback: &dyn PoiLookup,
    ) -> Result<Self, ResolveError> {
        let params = Params::new("smartSize", desc);

        let width = params.u32("width")?;
        let height = params.u32("height")?;
        let (width, height) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                return Err(TransformationError::MissingParameter(
                    "smartSize: both width and height need to be specified".into(),
                )
                .into());
            }
        };

        let poi = match params.raw("poi") {
            Some(raw) => Some(raw.parse::<Poi>().map_err(|_| {
                TransformationError::InvalidParameter(format!(
                    "smartSize: invalid POI '{raw}', expected format `<x>,<y>`"
                ))
            })?),
            None => poi_fallback.stored_poi()?,
        };

        // The crop level only matters once a POI exists; without one the
        // simple-crop path ignores it, so it isn't validated either.
        let closeness = match (&poi, params.raw("crop")) {
            (Some(_), Some(raw)) => raw.parse().map_err(|_| {
                TransformationError::InvalidParameter(format!(
                    "smartSize: invalid crop value '{raw}', valid values are: close, medium, wide"
                ))
            })?,
            _ => Closeness::default(),
        };

        Ok(Self {
            width,
            height,
            poi,
            closeness,
        })
    }

    pub fn target(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    /// Whether a focal point drives the crop. Surfaced to response
    /// layers as an annotation.
    pub fn poi_used(&self) -> bool {
        self.poi.is_some()
    }

    pub fn transform(&self, image: &mut dyn ImageResource) -> Result<(), BackendError> {
        match self.poi {
            Some(poi) => {
                let crop = smart_crop(self.target(), poi, self.closeness, image.size());
                image.crop(crop)?;
                image.reset_page();
                image.resize_to(self.width, self.height)
            }
            None => {
                let (max_w, max_h) = simple_max_size_constraint(self.target(), image.size());
                MaxSizeParams::new(max_w, max_h).transform(image)?;
                CropParams::centered(self.width, self.height).transform(image)
            }
        }
    }

    pub fn adjusted(&self, ratio: f64) -> Self {
        Self {
            width: scale_dim(self.width, ratio),
            height: scale_dim(self.height, ratio),
            poi: self.poi.map(|p| Poi::new(p.x / ratio, p.y / ratio)),
            closeness: self.closeness,
        }
    }
}

impl RegionExtractor for SmartSizeParams {
    /// In simple-crop mode the returned region is relative to the
    /// max-size-scaled image, exactly what `transform` will crop after
    /// its own scale-down step.
    fn extracted_region(&self, source: ImageSize) -> Rectangle {
        match self.poi {
            Some(poi) => smart_crop(self.target(), poi, self.closeness, source),
            None => {
                let (max_w, max_h) = simple_max_size_constraint(self.target(), source);
                let scaled = MaxSizeParams::new(max_w, max_h).output_size(source);
                CropParams::centered(self.width, self.height).extracted_region(scaled)
            }
        }
    }
}

impl InputSizeConstraint for SmartSizeParams {
    fn minimum_input_size(&self, source: ImageSize) -> ImageSize {
        match self.poi {
            Some(poi) => {
                let crop = smart_crop(self.target(), poi, self.closeness, source);
                // The crop will be resized down to the target by this
                // factor; the same factor shrinks the whole source.
                // Ceiling so upstream never under-fetches.
                let scale = f64::from(crop.width) / f64::from(self.width);
                ImageSize::new(
                    (f64::from(source.width) / scale).ceil() as u32,
                    (f64::from(source.height) / scale).ceil() as u32,
                )
            }
            None => {
                let (max_w, max_h) = simple_max_size_constraint(self.target(), source);
                MaxSizeParams::new(max_w, max_h).output_size(source)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockResource, RecordedOp};
    use crate::metadata::MetadataError;
    use crate::ops::NoStoredPoi;
    use crate::parser::parse_transformation;

    struct StoredPoi(Poi);

    impl PoiLookup for StoredPoi {
        fn stored_poi(&self) -> Result<Option<Poi>, MetadataError> {
            Ok(Some(self.0))
        }
    }

    fn parse(raw: &str) -> SmartSizeParams {
        SmartSizeParams::from_descriptor(&parse_transformation(raw), &NoStoredPoi).unwrap()
    }

    fn unwrap_invalid(err: ResolveError) -> TransformationError {
        match err {
            ResolveError::Invalid(e) => e,
            ResolveError::Metadata(e) => panic!("unexpected metadata error: {e}"),
        }
    }

    // =========================================================================
    // validation
    // =========================================================================

    #[test]
    fn missing_height_names_both_dimensions() {
        let err = SmartSizeParams::from_descriptor(
            &parse_transformation("smartSize:width=200"),
            &NoStoredPoi,
        )
        .unwrap_err();
        let err = unwrap_invalid(err);
        assert!(matches!(&err, TransformationError::MissingParameter(m)
            if m.contains("both width and height")));
    }

    #[test]
    fn empty_height_counts_as_missing() {
        let err = SmartSizeParams::from_descriptor(
            &parse_transformation("smartSize:width=200,height="),
            &NoStoredPoi,
        )
        .unwrap_err();
        assert!(matches!(
            unwrap_invalid(err),
            TransformationError::MissingParameter(_)
        ));
    }

    #[test]
    fn explicit_poi_is_parsed() {
        let params = parse("smartSize:width=200,height=200,poi=120,80");
        assert_eq!(params.poi, Some(Poi::new(120.0, 80.0)));
    }

    #[test]
    fn malformed_poi_is_rejected() {
        let err = SmartSizeParams::from_descriptor(
            &parse_transformation("smartSize:width=200,height=200,poi=oops"),
            &NoStoredPoi,
        )
        .unwrap_err();
        assert!(matches!(
            unwrap_invalid(err),
            TransformationError::InvalidParameter(_)
        ));
    }

    #[test]
    fn stored_poi_fills_the_gap() {
        let params = SmartSizeParams::from_descriptor(
            &parse_transformation("smartSize:width=200,height=200"),
            &StoredPoi(Poi::new(500.0, 300.0)),
        )
        .unwrap();
        assert_eq!(params.poi, Some(Poi::new(500.0, 300.0)));
    }

    #[test]
    fn explicit_poi_beats_stored_poi() {
        let params = SmartSizeParams::from_descriptor(
            &parse_transformation("smartSize:width=200,height=200,poi=10,20"),
            &StoredPoi(Poi::new(500.0, 300.0)),
        )
        .unwrap();
        assert_eq!(params.poi, Some(Poi::new(10.0, 20.0)));
    }

    #[test]
    fn invalid_crop_with_poi_is_rejected() {
        let err = SmartSizeParams::from_descriptor(
            &parse_transformation("smartSize:width=200,height=200,poi=10,20,crop=tight"),
            &NoStoredPoi,
        )
        .unwrap_err();
        let err = unwrap_invalid(err);
        assert!(matches!(&err, TransformationError::InvalidParameter(m)
            if m.contains("crop value")));
    }

    #[test]
    fn crop_value_is_not_validated_without_poi() {
        let params = parse("smartSize:width=200,height=200,crop=tight");
        assert_eq!(params.poi, None);
        assert_eq!(params.closeness, Closeness::Medium);
    }

    #[test]
    fn closeness_defaults_to_medium_with_poi() {
        let params = parse("smartSize:width=200,height=200,poi=10,20");
        assert_eq!(params.closeness, Closeness::Medium);
    }

    // =========================================================================
    // transform
    // =========================================================================

    #[test]
    fn poi_branch_crops_resets_and_resizes() {
        let params = parse("smartSize:width=200,height=200,poi=500,300");
        let mut image = MockResource::new(1000, 600);
        params.transform(&mut image).unwrap();

        assert_eq!(
            image.operations,
            vec![
                RecordedOp::Crop(Rectangle::new(350, 150, 300, 300)),
                RecordedOp::ResetPage,
                RecordedOp::ResizeTo(200, 200),
            ]
        );
        assert_eq!(image.size(), ImageSize::new(200, 200));
    }

    #[test]
    fn simple_branch_scales_then_center_crops() {
        let params = parse("smartSize:width=200,height=200");
        let mut image = MockResource::new(1000, 600);
        params.transform(&mut image).unwrap();

        assert_eq!(
            image.operations,
            vec![
                RecordedOp::ResizeTo(333, 200),
                RecordedOp::Crop(Rectangle::new(66, 0, 200, 200)),
            ]
        );
        assert_eq!(image.size(), ImageSize::new(200, 200));
    }

    // =========================================================================
    // capability protocol
    // =========================================================================

    #[test]
    fn query_matches_mutation_with_poi() {
        let params = parse("smartSize:width=200,height=200,poi=500,300,crop=wide");
        let source = ImageSize::new(1000, 600);
        let mut image = MockResource::new(source.width, source.height);

        let queried = params.extracted_region(source);
        params.transform(&mut image).unwrap();

        assert_eq!(image.operations[0], RecordedOp::Crop(queried));
    }

    #[test]
    fn query_matches_mutation_without_poi() {
        let params = parse("smartSize:width=200,height=200");
        let source = ImageSize::new(1000, 600);
        let mut image = MockResource::new(source.width, source.height);

        let queried = params.extracted_region(source);
        params.transform(&mut image).unwrap();

        // Region is relative to the scaled image, i.e. the crop that
        // follows the resize step.
        assert_eq!(image.operations[1], RecordedOp::Crop(queried));
    }

    #[test]
    fn minimum_input_size_with_poi() {
        // Medium crop of 1000x600 to 200x200 is 300x300, so the image
        // gets scaled down by 1.5: ceil(1000/1.5) x ceil(600/1.5).
        let params = parse("smartSize:width=200,height=200,poi=500,300");
        assert_eq!(
            params.minimum_input_size(ImageSize::new(1000, 600)),
            ImageSize::new(667, 400)
        );
    }

    #[test]
    fn minimum_input_size_without_poi() {
        let params = parse("smartSize:width=200,height=200");
        assert_eq!(
            params.minimum_input_size(ImageSize::new(1000, 600)),
            ImageSize::new(333, 200)
        );
    }

    // =========================================================================
    // scale adjustment
    // =========================================================================

    #[test]
    fn adjust_rescales_dimensions_and_poi() {
        let params = parse("smartSize:width=200,height=100,poi=500,300");
        let adjusted = params.adjusted(2.0);
        assert_eq!(adjusted.width, 100);
        assert_eq!(adjusted.height, 50);
        assert_eq!(adjusted.poi, Some(Poi::new(250.0, 150.0)));
        assert_eq!(adjusted.closeness, params.closeness);
    }

    #[test]
    fn adjust_round_trips() {
        let params = parse("smartSize:width=200,height=100,poi=500,300,crop=close");
        assert_eq!(params.adjusted(0.5).adjusted(2.0), params);
    }
}
