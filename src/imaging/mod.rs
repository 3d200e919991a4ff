//! Image geometry and the pixel backend seam.
//!
//! The module is split into:
//! - **Calculations**: pure functions for crop/size math (unit testable)
//! - **Params**: value types ([`ImageSize`], [`Rectangle`], [`Poi`], [`Closeness`])
//! - **Backend**: [`ImageResource`] trait the chain executor mutates through
//! - **RustResource**: production implementation over the `image` crate

pub mod backend;
pub mod calculations;
pub mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageResource};
pub use params::{Closeness, ImageSize, Poi, Rectangle};
pub use rust_backend::RustResource;
