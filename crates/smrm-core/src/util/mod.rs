//! Identifier, date and formatting helpers.
//!
//! Everything here is pure apart from reading the clock and the random
//! number generator.

mod dates;
mod html;
mod ids;
mod image;

pub use dates::*;
pub use html::*;
pub use ids::*;
pub use image::*;
