//! Byte sources: where the decoder pulls raw record bytes from.

use std::io::{self, BufRead, ErrorKind, Read};

/// A supplier of raw stream bytes.
///
/// `read_up_to` may hand back fewer bytes than asked for. A short answer
/// means either partial availability or end of stream; callers do not get
/// to tell the two apart.
pub trait ByteSource {
    /// Fill as much of `buf` as the source can supply and return the count.
    fn read_up_to(&mut self, buf: &mut [u8]) -> usize;

    /// Whether a read of `n` bytes would be answered without blocking.
    ///
    /// Sources that never block (in-memory slices) keep the default.
    fn is_ready(&mut self, n: usize) -> bool {
        let _ = n;
        true
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_up_to(&mut self, buf: &mut [u8]) -> usize {
        (**self).read_up_to(buf)
    }

    fn is_ready(&mut self, n: usize) -> bool {
        (**self).is_ready(n)
    }
}

impl ByteSource for &[u8] {
    fn read_up_to(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        n
    }
}

/// Blocking source over any [`Read`].
///
/// Each read keeps pulling until the buffer is full or the reader reports
/// end of stream, the same way a buffered `read(n)` on a pipe behaves.
/// I/O errors end the read early and are logged.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    /// Wrap a reader.
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_up_to(&mut self, buf: &mut [u8]) -> usize {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(error = %e, "byte source read failed");
                    break;
                }
            }
        }
        filled
    }
}

/// Discard the single text line that precedes the binary stream.
///
/// The line is dropped whatever it says. Returns the discarded bytes
/// (without the newline) so callers can log them, or `None` if the stream
/// ended before any byte arrived.
pub fn skip_preamble<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line)?;
    if n == 0 {
        return Ok(None);
    }
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    debug!(preamble = %String::from_utf8_lossy(&line), "discarded stream preamble");
    Ok(Some(line))
}
