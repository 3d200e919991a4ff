//! Value types for image geometry.
//!
//! These types describe *where* and *how much*, not *how*. They are the
//! interface between the operation structs in [`ops`](crate::ops) (which
//! decide what to do) and the [`backend`](super::backend) (which does the
//! actual pixel work), and they flow through every geometry calculation
//! in [`calculations`](super::calculations).
//!
//! ## Types
//!
//! - [`ImageSize`] — width/height pair, the unit of all size math.
//! - [`Rectangle`] — a crop region positioned against a known source size.
//! - [`Poi`] — a focal point the crop should keep visible.
//! - [`Closeness`] — how tightly a smart crop hugs the POI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width-to-height ratio.
    pub fn ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A crop region. Coordinates are relative to the top-left corner of the
/// source the rectangle was computed against. The containment invariant
/// `x + width <= source.width && y + height <= source.height` holds for
/// every rectangle produced by this crate's geometry functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    /// Whether the rectangle lies entirely within `source`.
    pub fn fits_within(self, source: ImageSize) -> bool {
        self.x + self.width <= source.width && self.y + self.height <= source.height
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// A point of interest the crop should keep visible.
///
/// Coordinates are fractional because scale adjustment divides them by a
/// ratio, and the round-trip property only holds if no precision is lost
/// in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poi {
    pub x: f64,
    pub y: f64,
}

impl Poi {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl FromStr for Poi {
    type Err = PoiParseError;

    /// Parse the `"x,y"` form used in transformation parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s.split_once(',').ok_or(PoiParseError)?;
        let x: f64 = x.trim().parse().map_err(|_| PoiParseError)?;
        let y: f64 = y.trim().parse().map_err(|_| PoiParseError)?;
        Ok(Self { x, y })
    }
}

impl fmt::Display for Poi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Error for a `poi` value that is not `<x>,<y>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoiParseError;

/// How tightly a smart crop hugs the POI versus preserving context.
///
/// Each level maps to two tunables:
/// - **grow factor**: widens the crop beyond the bare minimum around the
///   focal point so surrounding context survives.
/// - **source portion threshold**: the fraction of the source dimension
///   the crop never shrinks below, so very large images don't produce
///   degenerate near-pixel crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Closeness {
    Close,
    #[default]
    Medium,
    Wide,
}

impl Closeness {
    pub fn grow_factor(self) -> f64 {
        match self {
            Closeness::Close => 1.0,
            Closeness::Medium => 1.25,
            Closeness::Wide => 1.6,
        }
    }

    pub fn source_portion_threshold(self) -> f64 {
        match self {
            Closeness::Close => 0.3,
            Closeness::Medium => 0.5,
            Closeness::Wide => 0.66,
        }
    }
}

impl FromStr for Closeness {
    type Err = ClosenessParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "close" => Ok(Closeness::Close),
            "medium" => Ok(Closeness::Medium),
            "wide" => Ok(Closeness::Wide),
            _ => Err(ClosenessParseError),
        }
    }
}

/// Error for a `crop`/`closeness` value outside `close|medium|wide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosenessParseError;
