//! Drive loop: the re-entrant step function that moves bytes onto the grid.
//!
//! Some external scheduler calls [`DriveLoop::step`] over and over. Each call
//! performs at most one decode, applies the result to the [`Grid`], notifies
//! the [`DisplaySink`], and decides whether the stream keeps going.
//!
//! ```text
//!            ┌──────────── step() ────────────┐
//!            ▼                                │
//!   ┌─────────────────┐  Update     ┌───────┐ │  refresh_cell  ┌──────┐
//!   │     RUNNING     │ ──────────▶ │ Grid  │ ┼──────────────▶ │ Sink │
//!   └─────────────────┘  OutOfBounds└───────┘ │                └──────┘
//!            │ Terminate / ShortRead          │
//!            ▼                                │
//!   ┌─────────────────┐                       │
//!   │     HALTED      │  step() is a no-op ◀──┘
//!   └─────────────────┘
//! ```
//!
//! No outcome escapes as an error: anomalies become a log event plus either
//! "keep going" or "halt".

use crate::grid::{Grid, Rgb};
use crate::protocol::{ByteSource, Decoder, DecoderOutcome, RECORD_SIZE};
use crate::sink::DisplaySink;

/// Why the stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The sentinel byte arrived.
    Terminated,
    /// A read came back with fewer bytes than a record.
    ShortRead {
        /// Bytes received in the failing read.
        got: usize,
    },
}

impl HaltReason {
    /// Human-readable status line for the display.
    pub fn describe(&self) -> String {
        match self {
            Self::Terminated => {
                "Received exit signal; no more bytes will be read. Press q to close.".to_string()
            }
            Self::ShortRead { got } => {
                format!("Stream cut short: read {got} of {RECORD_SIZE} bytes. Press q to close.")
            }
        }
    }
}

/// Drive loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveState {
    /// Reading and applying records.
    Running,
    /// Terminal state; no more reads.
    Halted(HaltReason),
}

/// What a single `step()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A cell was updated and the sink refreshed.
    Drew {
        /// Column index.
        column: u8,
        /// Row index.
        row: u8,
        /// New color.
        color: Rgb,
    },
    /// A record addressed a cell outside the grid; nothing changed.
    OutOfBounds {
        /// Column index.
        column: u8,
        /// Row index.
        row: u8,
    },
    /// The sentinel arrived; the loop is now halted.
    Terminated,
    /// A short read ended the stream; the loop is now halted.
    ShortRead {
        /// Bytes received.
        got: usize,
    },
    /// The source cannot answer a full read yet; try again later.
    Pending,
    /// The loop was already halted; nothing was read.
    Idle,
}

impl Step {
    /// Whether the scheduler should call `step()` again.
    #[inline]
    pub const fn should_continue(&self) -> bool {
        matches!(self, Self::Drew { .. } | Self::OutOfBounds { .. } | Self::Pending)
    }
}

/// Counters kept across steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveStats {
    /// Calls to `step()` that reached the decoder.
    pub decoded: u64,
    /// Cells drawn.
    pub drawn: u64,
    /// Records rejected as out of bounds.
    pub out_of_bounds: u64,
    /// Calls that found the source not ready.
    pub pending: u64,
}

/// Final state of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Why the stream stopped, if it did.
    pub halt_reason: Option<HaltReason>,
    /// Counters at the end of the run.
    pub stats: DriveStats,
    /// Grid contents at the end of the run.
    pub grid: Grid,
}

/// The decode → mutate → render loop.
///
/// Owns the grid (its only writer), the byte source, and the display sink.
pub struct DriveLoop<S, D> {
    decoder: Decoder,
    grid: Grid,
    source: S,
    sink: D,
    state: DriveState,
    stats: DriveStats,
}

impl<S: ByteSource, D: DisplaySink> DriveLoop<S, D> {
    /// Create a running loop over a fresh black `width` x `height` grid.
    ///
    /// # Panics
    /// Panics if width or height is 0.
    pub fn new(width: u16, height: u16, source: S, sink: D) -> Self {
        Self {
            decoder: Decoder::new(width, height),
            grid: Grid::new(width, height),
            source,
            sink,
            state: DriveState::Running,
            stats: DriveStats::default(),
        }
    }

    /// Current state.
    pub const fn state(&self) -> DriveState {
        self.state
    }

    /// Whether the loop still reads.
    pub const fn is_running(&self) -> bool {
        matches!(self.state, DriveState::Running)
    }

    /// The halt reason, once halted.
    pub const fn halt_reason(&self) -> Option<HaltReason> {
        match self.state {
            DriveState::Running => None,
            DriveState::Halted(reason) => Some(reason),
        }
    }

    /// Read-only view of the grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Counters so far.
    pub const fn stats(&self) -> DriveStats {
        self.stats
    }

    /// Mutable access to the byte source (e.g. to wait for readiness).
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The display sink.
    pub const fn sink(&self) -> &D {
        &self.sink
    }

    /// Run one iteration.
    ///
    /// Performs at most one bounded read and never blocks on a source that
    /// implements [`ByteSource::is_ready`] honestly.
    pub fn step(&mut self) -> Step {
        if !self.is_running() {
            return Step::Idle;
        }

        if !self.source.is_ready(self.decoder.record_size()) {
            self.stats.pending += 1;
            return Step::Pending;
        }

        self.stats.decoded += 1;
        match self.decoder.decode_next(&mut self.source) {
            DecoderOutcome::Update { column, row, color } => {
                if let Err(error) = self.grid.set(column.into(), row.into(), color) {
                    error!(%error, "decoder accepted a cell the grid rejects");
                    self.stats.out_of_bounds += 1;
                    return Step::OutOfBounds { column, row };
                }
                debug!(column, row, %color, "drawing block at ({column}, {row}) with color {color}");
                self.sink.refresh_cell(column, row, color);
                self.stats.drawn += 1;
                Step::Drew { column, row, color }
            }
            DecoderOutcome::OutOfBounds { column, row } => {
                warn!(column, row, "attempted to draw out of bounds ({column}, {row})");
                self.stats.out_of_bounds += 1;
                Step::OutOfBounds { column, row }
            }
            DecoderOutcome::ShortRead { got } => {
                error!(
                    got,
                    expected = self.decoder.record_size(),
                    "error reading {} bytes from stream, got {got}",
                    self.decoder.record_size()
                );
                self.halt(HaltReason::ShortRead { got });
                Step::ShortRead { got }
            }
            DecoderOutcome::Terminate => {
                info!("received exit signal, will not read any more bytes");
                self.halt(HaltReason::Terminated);
                Step::Terminated
            }
        }
    }

    /// Step until the source is pending, the loop halts, or `budget` records
    /// have been decoded. Returns the number decoded.
    ///
    /// This is one scheduler slice: it drains what is already available
    /// without holding the scheduler past the budget.
    pub fn run_batch(&mut self, budget: usize) -> usize {
        let mut decoded = 0;
        while decoded < budget {
            match self.step() {
                Step::Drew { .. } | Step::OutOfBounds { .. } => decoded += 1,
                Step::Terminated | Step::ShortRead { .. } => {
                    decoded += 1;
                    break;
                }
                Step::Pending | Step::Idle => break,
            }
        }
        decoded
    }

    /// Snapshot the run so far.
    pub fn summary(&self) -> Summary {
        Summary {
            halt_reason: self.halt_reason(),
            stats: self.stats,
            grid: self.grid.clone(),
        }
    }

    fn halt(&mut self, reason: HaltReason) {
        self.state = DriveState::Halted(reason);
        self.sink.show_status(&reason.describe());
    }
}

impl<S, D> std::fmt::Debug for DriveLoop<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveLoop")
            .field("state", &self.state)
            .field("grid", &self.grid)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SENTINEL;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSink {
        refreshed: Vec<(u8, u8, Rgb)>,
        status: Vec<String>,
    }

    impl DisplaySink for RecordingSink {
        fn refresh_cell(&mut self, column: u8, row: u8, color: Rgb) {
            self.refreshed.push((column, row, color));
        }

        fn show_status(&mut self, status: &str) {
            self.status.push(status.to_string());
        }
    }

    /// Source that counts how often it is read.
    struct CountingSource<'a> {
        bytes: &'a [u8],
        reads: usize,
    }

    impl ByteSource for CountingSource<'_> {
        fn read_up_to(&mut self, buf: &mut [u8]) -> usize {
            self.reads += 1;
            self.bytes.read_up_to(buf)
        }
    }

    /// Source that is never ready.
    struct Starved;

    impl ByteSource for Starved {
        fn read_up_to(&mut self, _buf: &mut [u8]) -> usize {
            panic!("read while not ready");
        }

        fn is_ready(&mut self, _n: usize) -> bool {
            false
        }
    }

    fn drive(bytes: &[u8]) -> DriveLoop<&[u8], RecordingSink> {
        DriveLoop::new(40, 30, bytes, RecordingSink::default())
    }

    #[test]
    fn test_end_to_end_draw_then_terminate() {
        let mut dl = drive(&[5, 10, 0b101, SENTINEL, 2, 7]);

        let magenta = Rgb::new(255, 0, 255);
        assert_eq!(dl.step(), Step::Drew { column: 5, row: 10, color: magenta });
        assert_eq!(dl.sink().refreshed, vec![(5, 10, magenta)]);

        assert_eq!(dl.step(), Step::Terminated);
        assert_eq!(dl.halt_reason(), Some(HaltReason::Terminated));
        assert_eq!(dl.step(), Step::Idle);

        assert_eq!(dl.sink().refreshed.len(), 1);
        assert_eq!(dl.grid().get(5, 10), Ok(magenta));
        assert_eq!(dl.sink().status.len(), 1);
    }

    #[test]
    fn test_out_of_bounds_keeps_running() {
        let mut dl = drive(&[40, 0, 7, 1, 1, 7]);
        let before = dl.grid().clone();

        assert_eq!(dl.step(), Step::OutOfBounds { column: 40, row: 0 });
        assert!(dl.is_running());
        assert_eq!(dl.grid(), &before);
        assert!(dl.sink().refreshed.is_empty());

        assert_eq!(dl.step(), Step::Drew { column: 1, row: 1, color: Rgb::WHITE });
        assert_eq!(dl.stats().out_of_bounds, 1);
        assert_eq!(dl.stats().drawn, 1);
    }

    #[test]
    fn test_short_read_halts() {
        let mut dl = drive(&[1, 2, 3, 4, 5]);
        assert!(matches!(dl.step(), Step::Drew { .. }));
        assert_eq!(dl.step(), Step::ShortRead { got: 2 });
        assert_eq!(dl.state(), DriveState::Halted(HaltReason::ShortRead { got: 2 }));
        assert_eq!(dl.step(), Step::Idle);
    }

    #[test]
    fn test_empty_stream_is_short_read() {
        let mut dl = drive(&[]);
        assert_eq!(dl.step(), Step::ShortRead { got: 0 });
        assert!(!dl.is_running());
    }

    #[test]
    fn test_halted_loop_never_reads() {
        let mut source = CountingSource { bytes: &[SENTINEL, 0, 0, 1, 1, 1], reads: 0 };
        let mut sink = RecordingSink::default();
        let mut dl = DriveLoop::new(40, 30, &mut source, &mut sink);

        assert_eq!(dl.step(), Step::Terminated);
        for _ in 0..5 {
            assert_eq!(dl.step(), Step::Idle);
        }
        drop(dl);
        assert_eq!(source.reads, 1);
        assert!(sink.refreshed.is_empty());
    }

    #[test]
    fn test_pending_source_is_not_read() {
        let mut dl = DriveLoop::new(40, 30, Starved, RecordingSink::default());
        assert_eq!(dl.step(), Step::Pending);
        assert_eq!(dl.step(), Step::Pending);
        assert!(dl.is_running());
        assert_eq!(dl.stats().pending, 2);
        assert_eq!(dl.stats().decoded, 0);
    }

    #[test]
    fn test_last_update_per_cell_wins() {
        let mut dl = drive(&[
            2, 3, 0b100, // (2,3) red
            4, 4, 0b010, // (4,4) green
            99, 3, 0b111, // out of bounds
            2, 3, 0b001, // (2,3) blue
        ]);
        while dl.step().should_continue() {}

        let grid = dl.grid();
        assert_eq!(grid.get(2, 3), Ok(Rgb::new(0, 0, 255)));
        assert_eq!(grid.get(4, 4), Ok(Rgb::new(0, 255, 0)));
        let lit = grid.cells().iter().filter(|c| **c != Rgb::BLACK).count();
        assert_eq!(lit, 2);
        assert_eq!(dl.halt_reason(), Some(HaltReason::ShortRead { got: 0 }));
    }

    #[test]
    fn test_run_batch_respects_budget() {
        let bytes: Vec<u8> = (0..10u8).flat_map(|i| [i, 0, 0b111]).collect();
        let mut dl = drive(&bytes);

        assert_eq!(dl.run_batch(4), 4);
        assert_eq!(dl.sink().refreshed.len(), 4);
        assert!(dl.is_running());

        // Six records left, then the empty read halts the loop.
        assert_eq!(dl.run_batch(100), 7);
        assert_eq!(dl.halt_reason(), Some(HaltReason::ShortRead { got: 0 }));
        assert_eq!(dl.run_batch(100), 0);
    }

    #[test]
    fn test_run_batch_stops_when_pending() {
        let mut dl = DriveLoop::new(40, 30, Starved, RecordingSink::default());
        assert_eq!(dl.run_batch(10), 0);
        assert!(dl.is_running());
    }

    #[test]
    fn test_summary() {
        let mut dl = drive(&[1, 1, 0b010, SENTINEL]);
        dl.run_batch(10);
        let summary = dl.summary();
        assert_eq!(summary.halt_reason, Some(HaltReason::Terminated));
        assert_eq!(summary.stats.drawn, 1);
        assert_eq!(summary.grid.get(1, 1), Ok(Rgb::new(0, 255, 0)));
    }

    #[test]
    fn test_halt_reasons_are_distinguishable() {
        let stopped = HaltReason::Terminated.describe();
        let cut = HaltReason::ShortRead { got: 1 }.describe();
        assert_ne!(stopped, cut);
        assert!(cut.contains("read 1 of"));
        assert!(cut.contains(&format!("of {RECORD_SIZE} bytes")));
    }

    /// Shared buffer the fmt subscriber writes formatted events into.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn line_with<'a>(lines: &'a [String], needle: &str) -> &'a str {
        lines
            .iter()
            .find(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("no event containing {needle:?} in {lines:#?}"))
    }

    #[test]
    fn test_step_emits_diagnostics() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .without_time()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut dl = drive(&[5, 10, 0b101, 99, 1, 1, SENTINEL, 2, 7]);
            while dl.step().should_continue() {}

            let mut cut = drive(&[1, 2]);
            assert_eq!(cut.step(), Step::ShortRead { got: 2 });
        });

        let lines = captured.lines();

        let draw = line_with(&lines, "drawing block at (5, 10) with color #ff00ff");
        assert!(draw.contains("DEBUG"), "{draw}");
        assert!(draw.contains("column=5 row=10 color=#ff00ff"), "{draw}");

        let oob = line_with(&lines, "out of bounds (99, 1)");
        assert!(oob.contains("WARN"), "{oob}");
        assert!(oob.contains("column=99 row=1"), "{oob}");

        let exit = line_with(&lines, "received exit signal");
        assert!(exit.contains("INFO"), "{exit}");

        let short = line_with(&lines, "from stream, got 2");
        assert!(short.contains("ERROR"), "{short}");
        assert!(short.contains("got=2 expected=3"), "{short}");

        // Nothing is drawn or reported once the loop has halted.
        assert_eq!(lines.iter().filter(|l| l.contains("drawing block")).count(), 1);
    }

    proptest! {
        #[test]
        fn prop_grid_holds_last_in_bounds_write(
            records in prop::collection::vec((0u8..60, 0u8..45, 0u8..8), 0..64)
        ) {
            // Column, row and mask ranges all stay below the sentinel.
            let bytes: Vec<u8> = records.iter().flat_map(|&(c, r, m)| [c, r, m]).collect();
            let mut dl = drive(&bytes);
            while dl.step().should_continue() {}

            let mut model = HashMap::new();
            let mut in_bounds = 0u64;
            for &(column, row, mask) in &records {
                if column < 40 && row < 30 {
                    model.insert((column, row), Rgb::from(crate::grid::ColorMask::from_byte(mask)));
                    in_bounds += 1;
                }
            }

            for (column, row, color) in dl.grid().iter() {
                let key = (u8::try_from(column).unwrap(), u8::try_from(row).unwrap());
                let expected = model.get(&key).copied().unwrap_or(Rgb::BLACK);
                prop_assert_eq!(color, expected, "cell ({}, {})", column, row);
            }

            let stats = dl.stats();
            prop_assert_eq!(stats.drawn, in_bounds);
            prop_assert_eq!(stats.out_of_bounds, records.len() as u64 - in_bounds);
            prop_assert_eq!(dl.sink().refreshed.len() as u64, in_bounds);
            prop_assert_eq!(dl.halt_reason(), Some(HaltReason::ShortRead { got: 0 }));
        }
    }
}
