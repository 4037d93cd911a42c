//! Wire records and the record decoder.
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────┬──────────┬──────────────────────────┐
//! │  byte 0  │  byte 1  │          byte 2          │
//! │  column  │   row    │  ----- R G B  (bits 2-0) │
//! └──────────┴──────────┴──────────────────────────┘
//! ```
//!
//! Records are packed back to back with no length prefix and no escaping.
//! The byte `0x45` (`'E'`) anywhere in a read stops the stream, even where
//! it would otherwise be a legitimate column, row, or color byte. That
//! collision is part of the protocol and is kept as is.

use super::source::ByteSource;
use crate::grid::{ColorMask, Rgb};

/// Bytes per wire record.
pub const RECORD_SIZE: usize = 3;

/// Byte value that terminates the stream wherever it appears.
pub const SENTINEL: u8 = b'E';

/// One decoded wire record, before bounds checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Record {
    /// Column index (byte 0).
    pub column: u8,
    /// Row index (byte 1).
    pub row: u8,
    /// Color bits (byte 2).
    pub mask: ColorMask,
}

impl Record {
    /// Create a record.
    #[inline]
    pub const fn new(column: u8, row: u8, mask: ColorMask) -> Self {
        Self { column, row, mask }
    }

    /// Interpret a full record's bytes positionally.
    #[inline]
    pub const fn from_bytes(bytes: [u8; RECORD_SIZE]) -> Self {
        Self::new(bytes[0], bytes[1], ColorMask::from_byte(bytes[2]))
    }

    /// Encode for the wire. Producers must avoid emitting [`SENTINEL`] as data.
    #[inline]
    pub const fn to_bytes(self) -> [u8; RECORD_SIZE] {
        [self.column, self.row, self.mask.bits()]
    }

    /// Full-intensity color of this record.
    #[inline]
    pub const fn color(self) -> Rgb {
        Rgb::from_mask(self.mask)
    }
}

/// The result of one decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderOutcome {
    /// An in-bounds cell update.
    Update {
        /// Column index.
        column: u8,
        /// Row index.
        row: u8,
        /// Decoded color.
        color: Rgb,
    },

    /// The sentinel byte was seen.
    Terminate,

    /// Fewer than [`RECORD_SIZE`] bytes were available and none was the sentinel.
    ShortRead {
        /// Bytes actually read.
        got: usize,
    },

    /// A full record addressed a cell outside the grid.
    OutOfBounds {
        /// Column index.
        column: u8,
        /// Row index.
        row: u8,
    },
}

/// Stateless record decoder for a grid of fixed dimensions.
///
/// Each call consumes at most one record's worth of bytes and produces
/// exactly one [`DecoderOutcome`]. There are no retries and nothing is
/// carried over between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    width: u16,
    height: u16,
}

impl Decoder {
    /// Create a decoder that bounds-checks against a `width` x `height` grid.
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Bytes consumed per call.
    #[inline]
    pub const fn record_size(&self) -> usize {
        RECORD_SIZE
    }

    /// Read one record from `source` and classify it.
    pub fn decode_next<S: ByteSource + ?Sized>(&self, source: &mut S) -> DecoderOutcome {
        let mut buf = [0u8; RECORD_SIZE];
        let got = source.read_up_to(&mut buf);
        self.classify(&buf[..got])
    }

    /// Classify the bytes of one read attempt.
    ///
    /// The sentinel check runs over whatever was read, before length or
    /// position are considered.
    pub fn classify(&self, bytes: &[u8]) -> DecoderOutcome {
        if bytes.contains(&SENTINEL) {
            return DecoderOutcome::Terminate;
        }

        let Ok(bytes) = <[u8; RECORD_SIZE]>::try_from(bytes) else {
            return DecoderOutcome::ShortRead { got: bytes.len() };
        };

        let record = Record::from_bytes(bytes);
        if u16::from(record.column) < self.width && u16::from(record.row) < self.height {
            DecoderOutcome::Update {
                column: record.column,
                row: record.row,
                color: record.color(),
            }
        } else {
            DecoderOutcome::OutOfBounds {
                column: record.column,
                row: record.row,
            }
        }
    }
}
