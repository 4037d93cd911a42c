//! `OutputBuffer`: Single-syscall output buffer for ANSI sequences.

use crate::grid::Rgb;
use crate::layout::Rect;
use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// All output is accumulated here, then flushed in a single `write()` syscall
/// to prevent terminal flickering.
pub struct OutputBuffer {
    data: Vec<u8>,
    /// Last background color emitted, to skip redundant SGR sequences.
    bg: Option<Rgb>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            bg: None,
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    ///
    /// Color tracking survives, since the terminal keeps its attributes
    /// between flushes.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Move cursor to (x, y) position (1-indexed for ANSI).
    #[inline]
    pub fn cursor_move(&mut self, x: u16, y: u16) {
        // CSI row ; col H
        let _ = write!(self.data, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1);
    }

    /// Hide cursor.
    #[inline]
    pub fn cursor_hide(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25l");
    }

    /// Set background color (true color), skipping it if already active.
    #[inline]
    pub fn set_bg(&mut self, color: Rgb) {
        if self.bg == Some(color) {
            return;
        }
        let _ = write!(self.data, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b);
        self.bg = Some(color);
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
        self.bg = None;
    }

    /// Clear the entire screen.
    #[inline]
    pub fn clear_screen(&mut self) {
        self.data.extend_from_slice(b"\x1b[2J");
    }

    /// Clear from the cursor to the end of the line.
    #[inline]
    pub fn clear_line(&mut self) {
        self.data.extend_from_slice(b"\x1b[K");
    }

    /// Paint a rectangle as solid background color.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        if rect.is_empty() {
            return;
        }
        self.set_bg(color);
        for y in rect.y..rect.bottom() {
            self.cursor_move(rect.x, y);
            self.data.extend(std::iter::repeat_n(b' ', rect.width as usize));
        }
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_move_is_one_indexed() {
        let mut out = OutputBuffer::new();
        out.cursor_move(0, 0);
        assert_eq!(out.as_bytes(), b"\x1b[1;1H");
    }

    #[test]
    fn test_fill_rect() {
        let mut out = OutputBuffer::new();
        out.fill_rect(Rect::new(1, 2, 2, 2), Rgb::new(255, 0, 255));
        let text = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert_eq!(text, "\x1b[48;2;255;0;255m\x1b[3;2H  \x1b[4;2H  ");
    }

    #[test]
    fn test_bg_not_repeated() {
        let mut out = OutputBuffer::new();
        out.set_bg(Rgb::WHITE);
        let len = out.len();
        out.set_bg(Rgb::WHITE);
        assert_eq!(out.len(), len);

        out.reset_attrs();
        out.set_bg(Rgb::WHITE);
        assert!(out.len() > len + 4);
    }

    #[test]
    fn test_flush_to_writer() {
        let mut out = OutputBuffer::new();
        out.write_str("hello");
        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"hello");
        out.clear();
        assert!(out.is_empty());
    }
}
