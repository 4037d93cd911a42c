//! Grid module: the display state the byte stream mutates.
//!
//! This module contains:
//! - [`Grid`]: a fixed-size, bounds-checked array of cell colors
//! - [`Rgb`]: true-color representation
//! - [`ColorMask`]: the 3-bit color field of a wire record

mod color;
#[allow(clippy::module_inception)]
mod grid;

pub use color::{ColorMask, Rgb};
pub use grid::Grid;
