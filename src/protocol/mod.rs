//! Protocol module: framing and decoding of the cell-update byte stream.
//!
//! This module contains:
//! - [`Record`]: the fixed 3-byte wire unit
//! - [`Decoder`]: turns one read attempt into one [`DecoderOutcome`]
//! - [`ByteSource`]: the capability the decoder reads from

mod record;
mod source;

pub use record::{Decoder, DecoderOutcome, Record, RECORD_SIZE, SENTINEL};
pub use source::{skip_preamble, ByteSource, ReaderSource};
