//! Error types for the library surface.
//!
//! Decode anomalies are not errors: they are absorbed by the drive loop and
//! reported as [`Step`](crate::drive::Step) values. Only programming mistakes
//! (grid misuse) and bad configuration surface here.

use thiserror::Error;

/// Errors raised by [`Grid`](crate::grid::Grid) accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// The coordinate lies outside `[0, width) x [0, height)`.
    #[error("cell ({column}, {row}) is outside the {width}x{height} grid")]
    OutOfRange {
        /// Requested column.
        column: u16,
        /// Requested row.
        row: u16,
        /// Grid width.
        width: u16,
        /// Grid height.
        height: u16,
    },
}

/// Errors raised by [`Config::validate`](crate::config::Config::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid {
        /// Configured width.
        width: u16,
        /// Configured height.
        height: u16,
    },

    /// A dimension cannot be addressed by a single wire byte.
    #[error("grid {axis} {value} exceeds the {max} cells a record byte can address")]
    Unaddressable {
        /// `"width"` or `"height"`.
        axis: &'static str,
        /// Configured value.
        value: u16,
        /// Largest addressable dimension.
        max: u16,
    },

    /// Cell size is zero.
    #[error("cell size must be at least one terminal column")]
    ZeroCellSize,

    /// Step budget is zero, so the stream would never be read.
    #[error("steps per tick must be at least one")]
    ZeroStepBudget,
}
