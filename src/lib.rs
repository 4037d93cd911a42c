//! # Blockview
//!
//! A live terminal viewer for cell-update byte streams.
//!
//! A producer (typically a simulated device) writes one line of text
//! followed by packed 3-byte records: column, row, and a 3-bit color mask.
//! Blockview decodes the records onto a fixed-size grid and paints each
//! updated cell in the terminal as it arrives.
//!
//! ## Core Concepts
//!
//! - **Record decoder**: one read attempt in, one [`DecoderOutcome`] out
//! - **Sentinel byte**: `0x45` anywhere in a read stops the stream
//! - **Drive loop**: a non-blocking `step()` any scheduler can call
//! - **Actor model**: isolated threads for the stream, input, and rendering
//!
//! ## Example
//!
//! ```rust
//! use blockview::{DriveLoop, LogSink, Rgb, Step};
//!
//! let bytes: &[u8] = &[5, 10, 0b101, b'E'];
//! let mut drive = DriveLoop::new(40, 30, bytes, LogSink::new());
//!
//! assert_eq!(
//!     drive.step(),
//!     Step::Drew { column: 5, row: 10, color: Rgb::new(255, 0, 255) }
//! );
//! assert_eq!(drive.step(), Step::Terminated);
//! assert_eq!(drive.step(), Step::Idle);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

#[macro_use]
extern crate tracing;

pub mod actor;
pub mod config;
pub mod drive;
pub mod error;
pub mod grid;
pub mod headless;
pub mod layout;
pub mod protocol;
pub mod sink;
pub mod terminal;

// Re-exports for convenience
pub use actor::{Engine, InputEvent, RenderCommand};
pub use config::Config;
pub use drive::{DriveLoop, DriveState, DriveStats, HaltReason, Step, Summary};
pub use error::{ConfigError, GridError};
pub use grid::{ColorMask, Grid, Rgb};
pub use layout::Rect;
pub use protocol::{ByteSource, Decoder, DecoderOutcome, Record, RECORD_SIZE, SENTINEL};
pub use sink::{DisplaySink, LogSink, RenderSink};
