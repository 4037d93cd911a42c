//! Headless runner: decode a stream without a terminal display.
//!
//! [`run`] uses the same reader thread and drive loop as the interactive
//! engine, with a [`LogSink`] in place of the renderer. [`run_blocking`]
//! skips the thread and reads on the caller's thread, which suits regular
//! files. Useful for piping a simulation's output through the decoder and
//! checking the final grid.

use crate::actor::{ChannelSource, ReaderActor, StreamChunk, DEFAULT_CHUNK_SIZE};
use crate::config::Config;
use crate::drive::{DriveLoop, Summary};
use crate::protocol::{skip_preamble, ByteSource, ReaderSource, RECORD_SIZE};
use crate::sink::LogSink;
use crossbeam_channel::bounded;
use std::io::{self, BufReader, Read};
use std::time::Duration;

/// How long to block on the stream before re-checking the loop.
const WAIT_SLICE: Duration = Duration::from_millis(50);

/// Decode `stream` until the drive loop halts and return the final state.
///
/// The first line of `stream` is discarded as preamble.
pub fn run<R>(config: &Config, stream: R) -> io::Result<Summary>
where
    R: Read + Send + 'static,
{
    config
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let (stream_tx, stream_rx) = bounded::<StreamChunk>(64);
    let _reader = ReaderActor::spawn(stream, stream_tx, DEFAULT_CHUNK_SIZE)?;

    let mut drive = DriveLoop::new(
        config.grid_width,
        config.grid_height,
        ChannelSource::new(stream_rx),
        LogSink::new(),
    );

    while drive.is_running() {
        if drive.run_batch(config.steps_per_tick) == 0 && drive.is_running() {
            drive.source_mut().wait_ready(RECORD_SIZE, WAIT_SLICE);
        }
    }

    Ok(finish(&drive))
}

/// Decode `stream` on the calling thread until the drive loop halts.
///
/// Every read blocks until a full record or end of stream, so this never
/// sees a pending source. The first line of `stream` is discarded as
/// preamble.
pub fn run_blocking<R: Read>(config: &Config, stream: R) -> io::Result<Summary> {
    config
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut reader = BufReader::new(stream);
    if skip_preamble(&mut reader)?.is_none() {
        debug!("stream ended before the preamble");
    }

    let mut drive = DriveLoop::new(
        config.grid_width,
        config.grid_height,
        ReaderSource::new(reader),
        LogSink::new(),
    );
    while drive.is_running() {
        drive.run_batch(config.steps_per_tick);
    }

    Ok(finish(&drive))
}

fn finish<S: ByteSource>(drive: &DriveLoop<S, LogSink>) -> Summary {
    let summary = drive.summary();
    info!(
        stats = ?summary.stats,
        halt = ?summary.halt_reason,
        refreshed = drive.sink().refreshed(),
        "stream finished"
    );
    summary
}
