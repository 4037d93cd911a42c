//! Configuration: grid dimensions, cell geometry, and pacing.
//!
//! Everything here is fixed once the engine starts.

use crate::error::ConfigError;
use crate::layout::Rect;
use crate::protocol::RECORD_SIZE;
use std::time::Duration;

/// Largest grid dimension a single record byte can address.
pub const MAX_DIMENSION: u16 = 256;

/// Configuration for the viewer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Grid width in cells.
    pub grid_width: u16,
    /// Grid height in cells.
    pub grid_height: u16,
    /// Terminal columns per grid cell. Rows per cell are half of this (at least one),
    /// since terminal cells are about twice as tall as they are wide.
    pub cell_size: u16,
    /// Blank terminal cells around the grid, split evenly before and after on each axis.
    pub margin: u16,
    /// Terminal window title.
    pub title: String,
    /// Delay between scheduler ticks.
    pub step_interval: Duration,
    /// Most decoder steps run in one tick before yielding to input and rendering.
    pub steps_per_tick: usize,
    /// Input poll timeout.
    pub input_poll_timeout: Duration,
    /// Whether to use alternate screen buffer.
    pub alternate_screen: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_width: 40,
            grid_height: 30,
            cell_size: 2,
            margin: 2,
            title: "PONG".to_string(),
            step_interval: Duration::from_millis(1),
            steps_per_tick: 256,
            input_poll_timeout: Duration::from_millis(10),
            alternate_screen: true,
        }
    }
}

impl Config {
    /// Bytes per wire record. Fixed by the protocol version.
    #[inline]
    pub const fn record_size(&self) -> usize {
        RECORD_SIZE
    }

    /// Check the configuration for values the viewer cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        for (axis, value) in [("width", self.grid_width), ("height", self.grid_height)] {
            if value > MAX_DIMENSION {
                return Err(ConfigError::Unaddressable {
                    axis,
                    value,
                    max: MAX_DIMENSION,
                });
            }
        }
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.steps_per_tick == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        Ok(())
    }

    /// Terminal columns and rows covered by one grid cell.
    #[inline]
    pub const fn cell_extent(&self) -> (u16, u16) {
        let rows = self.cell_size / 2;
        (self.cell_size, if rows == 0 { 1 } else { rows })
    }

    /// Top-left offset of the grid on screen.
    #[inline]
    pub const fn origin(&self) -> (u16, u16) {
        let half = self.margin / 2;
        (half, half)
    }

    /// Screen size needed to show the whole grid plus its margin.
    pub const fn canvas_size(&self) -> (u16, u16) {
        let (cw, ch) = self.cell_extent();
        (
            self.grid_width.saturating_mul(cw).saturating_add(self.margin),
            self.grid_height.saturating_mul(ch).saturating_add(self.margin),
        )
    }

    /// Screen rectangle of grid cell `(column, row)`.
    pub const fn cell_rect(&self, column: u16, row: u16) -> Rect {
        let (cw, ch) = self.cell_extent();
        let (ox, oy) = self.origin();
        Rect::new(
            ox.saturating_add(column.saturating_mul(cw)),
            oy.saturating_add(row.saturating_mul(ch)),
            cw,
            ch,
        )
    }

    /// Screen row for the status line, just below the grid.
    pub const fn status_row(&self) -> u16 {
        let (_, ch) = self.cell_extent();
        let (_, oy) = self.origin();
        oy.saturating_add(self.grid_height.saturating_mul(ch))
    }
}
