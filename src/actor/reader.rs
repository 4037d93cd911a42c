//! Reader Actor: Dedicated thread for pulling the byte stream.
//!
//! Reading stdin (or a pipe) blocks, and the main loop must never block, so
//! a background thread owns the reader and forwards what it gets as
//! [`StreamChunk`]s over a bounded channel. The main loop sees the other end
//! as a [`ChannelSource`], which only claims to be ready once a full record
//! is buffered or the stream has ended.

use super::messages::StreamChunk;
use crate::protocol::{skip_preamble, ByteSource};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::collections::VecDeque;
use std::io::{self, BufReader, ErrorKind, Read};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default size of a single read from the underlying stream.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Reader actor that streams bytes from a blocking reader.
///
/// The thread cannot be interrupted while it waits inside `read`, so there
/// is no shutdown flag: it exits on end of stream, on a read error, or the
/// next time it tries to send after the [`ChannelSource`] is dropped.
pub struct ReaderActor {
    handle: Option<JoinHandle<()>>,
}

impl ReaderActor {
    /// Spawn the reader thread.
    ///
    /// The thread first discards the one-line text preamble, then forwards
    /// everything after it.
    pub fn spawn<R>(reader: R, sender: Sender<StreamChunk>, chunk_size: usize) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("blockview-reader".to_string())
            .spawn(move || {
                Self::run_loop(reader, &sender, chunk_size.max(1));
            })?;

        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Wait for the reader thread to finish.
    ///
    /// Blocks until the underlying reader reaches end of stream.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main read loop.
    fn run_loop<R: Read>(reader: R, sender: &Sender<StreamChunk>, chunk_size: usize) {
        let mut reader = BufReader::new(reader);

        match skip_preamble(&mut reader) {
            Ok(Some(_)) => {}
            Ok(None) => {
                let _ = sender.send(StreamChunk::End);
                return;
            }
            Err(e) => {
                let _ = sender.send(StreamChunk::Failed(e.to_string()));
                return;
            }
        }

        let mut buf = vec![0u8; chunk_size];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    let _ = sender.send(StreamChunk::End);
                    break;
                }
                Ok(n) => {
                    if sender.send(StreamChunk::Data(buf[..n].to_vec())).is_err() {
                        // Receiver dropped, exit
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    let _ = sender.send(StreamChunk::Failed(e.to_string()));
                    break;
                }
            }
        }
    }
}

/// Polled byte source fed by a [`ReaderActor`].
#[derive(Debug)]
pub struct ChannelSource {
    rx: Receiver<StreamChunk>,
    pending: VecDeque<u8>,
    finished: bool,
}

impl ChannelSource {
    /// Wrap the receiving end of a reader channel.
    pub const fn new(rx: Receiver<StreamChunk>) -> Self {
        Self {
            rx,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Bytes received but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Whether the stream has ended (no more bytes will arrive).
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Block up to `timeout` until a read of `n` bytes can be answered.
    ///
    /// For runners that have nothing else to do while the stream is idle.
    pub fn wait_ready(&mut self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_ready(n) {
                return true;
            }
            match self.rx.recv_deadline(deadline) {
                Ok(chunk) => self.absorb(chunk),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => self.finish(None),
            }
        }
    }

    /// Pull queued chunks until `want` bytes are buffered or the queue is empty.
    fn fill(&mut self, want: usize) {
        while self.pending.len() < want && !self.finished {
            match self.rx.try_recv() {
                Ok(chunk) => self.absorb(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.finish(None),
            }
        }
    }

    fn absorb(&mut self, chunk: StreamChunk) {
        match chunk {
            StreamChunk::Data(bytes) => self.pending.extend(bytes),
            StreamChunk::End => self.finish(None),
            StreamChunk::Failed(message) => self.finish(Some(message.as_str())),
        }
    }

    fn finish(&mut self, failure: Option<&str>) {
        if self.finished {
            return;
        }
        self.finished = true;
        match failure {
            Some(error) => warn!(error, buffered = self.pending.len(), "stream read failed"),
            None => debug!(buffered = self.pending.len(), "stream ended"),
        }
    }
}

impl ByteSource for ChannelSource {
    fn read_up_to(&mut self, buf: &mut [u8]) -> usize {
        self.fill(buf.len());
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        n
    }

    fn is_ready(&mut self, n: usize) -> bool {
        self.fill(n);
        self.pending.len() >= n || self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, unbounded};
    use std::io::Cursor;

    #[test]
    fn test_channel_source_waits_for_full_record() {
        let (tx, rx) = unbounded();
        let mut source = ChannelSource::new(rx);
        assert!(!source.is_ready(3));

        tx.send(StreamChunk::Data(vec![1, 2])).unwrap();
        assert!(!source.is_ready(3));

        tx.send(StreamChunk::Data(vec![3, 4])).unwrap();
        assert!(source.is_ready(3));

        let mut buf = [0u8; 3];
        assert_eq!(source.read_up_to(&mut buf), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(source.buffered(), 1);
    }

    #[test]
    fn test_channel_source_end_makes_short_read_ready() {
        let (tx, rx) = unbounded();
        let mut source = ChannelSource::new(rx);
        tx.send(StreamChunk::Data(vec![9])).unwrap();
        tx.send(StreamChunk::End).unwrap();

        assert!(source.is_ready(3));
        let mut buf = [0u8; 3];
        assert_eq!(source.read_up_to(&mut buf), 1);
        assert!(source.is_finished());
        assert_eq!(source.read_up_to(&mut buf), 0);
    }

    #[test]
    fn test_channel_source_disconnect_is_end() {
        let (tx, rx) = bounded::<StreamChunk>(1);
        drop(tx);
        let mut source = ChannelSource::new(rx);
        assert!(source.is_ready(3));
        assert!(source.is_finished());
    }

    #[test]
    fn test_channel_source_failure_is_end() {
        let (tx, rx) = unbounded();
        tx.send(StreamChunk::Failed("broken pipe".to_string())).unwrap();
        let mut source = ChannelSource::new(rx);
        assert!(source.is_ready(3));
        assert!(source.is_finished());
    }

    #[test]
    fn test_wait_ready_times_out() {
        let (_tx, rx) = unbounded::<StreamChunk>();
        let mut source = ChannelSource::new(rx);
        assert!(!source.wait_ready(3, Duration::from_millis(10)));
    }

    #[test]
    fn test_reader_actor_skips_preamble() {
        let (tx, rx) = unbounded();
        let input = Cursor::new(b"exception handler loaded\n\x05\x0a\x05\x01".to_vec());
        let actor = ReaderActor::spawn(input, tx, 2).unwrap();
        actor.join();

        let mut source = ChannelSource::new(rx);
        assert!(source.wait_ready(4, Duration::from_secs(1)));
        let mut buf = [0u8; 4];
        assert_eq!(source.read_up_to(&mut buf), 4);
        assert_eq!(buf, [5, 10, 5, 1]);
        assert!(source.is_ready(1));
        assert_eq!(source.read_up_to(&mut buf), 0);
        assert!(source.is_finished());
    }

    #[test]
    fn test_reader_actor_empty_input() {
        let (tx, rx) = unbounded();
        ReaderActor::spawn(Cursor::new(Vec::new()), tx, 16).unwrap().join();
        assert_eq!(rx.try_recv(), Ok(StreamChunk::End));
    }
}
