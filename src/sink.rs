//! Display sinks: where successful updates are forwarded for rendering.
//!
//! The drive loop only knows the [`DisplaySink`] trait. The terminal
//! renderer is reached through [`RenderSink`], which hands each refresh to
//! the render thread; [`LogSink`] serves runs without a display.

use crate::actor::RenderCommand;
use crate::grid::Rgb;
use crossbeam_channel::Sender;

/// Receiver of rendered-cell notifications.
pub trait DisplaySink {
    /// Repaint one cell. Called once per successful update, with every
    /// channel either 0 or 255.
    fn refresh_cell(&mut self, column: u8, row: u8, color: Rgb);

    /// Show a one-line status message (e.g. why the stream stopped).
    fn show_status(&mut self, status: &str) {
        let _ = status;
    }
}

impl<D: DisplaySink + ?Sized> DisplaySink for &mut D {
    fn refresh_cell(&mut self, column: u8, row: u8, color: Rgb) {
        (**self).refresh_cell(column, row, color);
    }

    fn show_status(&mut self, status: &str) {
        (**self).show_status(status);
    }
}

/// Sink that forwards refreshes to the renderer thread.
#[derive(Debug, Clone)]
pub struct RenderSink {
    render_tx: Sender<RenderCommand>,
}

impl RenderSink {
    /// Create a sink feeding the given render channel.
    pub const fn new(render_tx: Sender<RenderCommand>) -> Self {
        Self { render_tx }
    }
}

impl DisplaySink for RenderSink {
    fn refresh_cell(&mut self, column: u8, row: u8, color: Rgb) {
        // A closed channel means the renderer is gone; nothing left to paint.
        let _ = self.render_tx.send(RenderCommand::RefreshCell { column, row, color });
    }

    fn show_status(&mut self, status: &str) {
        let _ = self.render_tx.send(RenderCommand::Status(status.to_string()));
    }
}

/// Sink for headless runs: counts refreshes and keeps the last status.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    refreshed: u64,
    status: Option<String>,
}

impl LogSink {
    /// Create an empty log sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells refreshed so far.
    pub const fn refreshed(&self) -> u64 {
        self.refreshed
    }

    /// Last status message, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

impl DisplaySink for LogSink {
    fn refresh_cell(&mut self, column: u8, row: u8, color: Rgb) {
        self.refreshed += 1;
        trace!(column, row, %color, "cell refreshed");
    }

    fn show_status(&mut self, status: &str) {
        info!(status, "display status");
        self.status = Some(status.to_string());
    }
}
