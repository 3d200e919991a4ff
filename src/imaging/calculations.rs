//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! This is where the POI-aware crop math lives; the operation structs in
//! [`ops`](crate::ops) are thin shells over these functions, which is
//! what keeps the capability queries (`extracted_region`,
//! `minimum_input_size`) consistent with the mutating transform path.

use super::params::{Closeness, ImageSize, Poi, Rectangle};

/// Calculate the POI-aware crop rectangle.
///
/// The crop satisfies the target aspect ratio (within one pixel of
/// rounding), is centered on the POI, and is clamped to the source
/// bounds. Clamping moves the rectangle, it never resizes it.
///
/// The closeness level controls two things: how far beyond the bare
/// target the crop grows (context around the POI) and the fraction of
/// the source it never shrinks below (no postage-stamp crops out of
/// huge images).
pub fn smart_crop(
    target: ImageSize,
    poi: Poi,
    closeness: Closeness,
    source: ImageSize,
) -> Rectangle {
    let source_ratio = source.ratio();
    let target_ratio = target.ratio();

    let grow = closeness.grow_factor();
    let threshold = closeness.source_portion_threshold();

    let (crop_width, crop_height) = if source_ratio >= target_ratio {
        // Source is relatively wider, crop from the sides
        let span = f64::from(source.height)
            .min(f64::from(target.height) * grow)
            .max(f64::from(source.height) * threshold);
        let w = (target_ratio * span).ceil() as u32;
        let h = (f64::from(w) / target_ratio).floor() as u32;
        (w, h)
    } else {
        // Source is relatively taller, crop from the top/bottom
        let span = f64::from(source.width)
            .min(f64::from(target.width) * grow)
            .max(f64::from(source.width) * threshold);
        let h = (span / target_ratio).ceil() as u32;
        let w = (f64::from(h) * target_ratio).floor() as u32;
        (w, h)
    };

    // The ceil in the constrained dimension can overshoot the source by a
    // single pixel on ratios that don't divide evenly. Cap so the bounds
    // invariant holds for every source, at the cost of at most one pixel
    // of aspect drift.
    let crop_width = crop_width.min(source.width);
    let crop_height = crop_height.min(source.height);

    // A POI is accepted as any parseable float; pull it into source
    // range here so the i64 casts below can't saturate and overflow the
    // additions. Positional clamping would push an out-of-range POI to
    // the same edge anyway.
    let poi_x = poi.x.clamp(0.0, f64::from(source.width));
    let poi_y = poi.y.clamp(0.0, f64::from(source.height));

    let mut left = (poi_x - f64::from(crop_width / 2)).trunc() as i64;
    let mut top = (poi_y - f64::from(crop_height / 2)).trunc() as i64;

    if left < 0 {
        left = 0;
    } else if left + i64::from(crop_width) > i64::from(source.width) {
        left = i64::from(source.width) - i64::from(crop_width);
    }

    if top < 0 {
        top = 0;
    } else if top + i64::from(crop_height) > i64::from(source.height) {
        top = i64::from(source.height) - i64::from(crop_height);
    }

    Rectangle::new(left as u32, top as u32, crop_width, crop_height)
}

/// Scale a source down (never up) to fit optional width/height bounds,
/// preserving aspect ratio. This is the max-size output computation.
pub fn max_size_output(
    max_width: Option<u32>,
    max_height: Option<u32>,
    source: ImageSize,
) -> ImageSize {
    let ratio_x = max_width.map_or(1.0, |w| f64::from(w) / f64::from(source.width));
    let ratio_y = max_height.map_or(1.0, |h| f64::from(h) / f64::from(source.height));
    let ratio = ratio_x.min(ratio_y).min(1.0);

    ImageSize::new(
        (f64::from(source.width) * ratio).round().max(1.0) as u32,
        (f64::from(source.height) * ratio).round().max(1.0) as u32,
    )
}

/// Pick which dimension constrains a simple (no-POI) crop: compare the
/// target ratio against the source ratio and bound the dimension that
/// constrains less, so the scaled image still covers the target.
///
/// Returns `(max_width, max_height)` with exactly one side set.
pub fn simple_max_size_constraint(
    target: ImageSize,
    source: ImageSize,
) -> (Option<u32>, Option<u32>) {
    if target.ratio() > source.ratio() {
        (Some(target.width), None)
    } else {
        (None, Some(target.height))
    }
}

/// Centered crop placement. Dimensions larger than the source are capped
/// to it, which keeps the result within bounds for undersized sources.
pub fn center_crop(target: ImageSize, source: ImageSize) -> Rectangle {
    let width = target.width.min(source.width);
    let height = target.height.min(source.height);

    Rectangle::new(
        (source.width - width) / 2,
        (source.height - height) / 2,
        width,
        height,
    )
}
