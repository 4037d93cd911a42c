//! Layout module: screen rectangles for grid cells.
//!
//! Cell geometry is fixed at construction, so the renderer computes a cell's
//! rectangle directly from its coordinates; there is no layout tree.

mod rect;

pub use rect::Rect;
