//! Renderer Actor: Dedicated thread for painting the grid to the terminal.
//!
//! This actor owns the terminal output and a mirror of the grid. It paints
//! each refreshed cell as a block of background color and batches every
//! command already queued into a single write.

use super::messages::RenderCommand;
use crate::config::Config;
use crate::grid::{Grid, Rgb};
use crate::layout::Rect;
use crate::terminal::OutputBuffer;
use crossbeam_channel::Receiver;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Renderer actor that handles terminal output.
pub struct RendererActor {
    /// Handle to the render thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

/// Render statistics for debugging/profiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total flushes to the terminal.
    pub flushes: u64,
    /// Total cells painted (including full redraws).
    pub cells_painted: u64,
    /// Total bytes written to terminal.
    pub bytes_written: u64,
}

/// Whether the render loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Internal renderer state.
struct Renderer<W> {
    /// Cell geometry.
    config: Config,
    /// Last known color of every cell, for full redraws.
    mirror: Grid,
    /// Status line text.
    status: Option<String>,
    /// Visible terminal area.
    screen: Rect,
    /// Pre-allocated output buffer.
    output: OutputBuffer,
    /// Terminal handle.
    writer: W,
    /// Render statistics.
    stats: RenderStats,
}

impl<W: Write> Renderer<W> {
    fn new(config: Config, screen: Rect, writer: W) -> Self {
        let mirror = Grid::new(config.grid_width, config.grid_height);
        Self {
            config,
            mirror,
            status: None,
            screen,
            output: OutputBuffer::with_capacity(65536),
            writer,
            stats: RenderStats::default(),
        }
    }

    /// Queue output for one command.
    fn apply(&mut self, command: RenderCommand) -> Flow {
        match command {
            RenderCommand::RefreshCell { column, row, color } => {
                let (column, row) = (u16::from(column), u16::from(row));
                match self.mirror.set(column, row, color) {
                    Ok(()) => self.paint_cell(column, row, color),
                    Err(error) => warn!(%error, "renderer dropped refresh"),
                }
            }
            RenderCommand::Status(text) => {
                self.status = Some(text);
                self.paint_status();
            }
            RenderCommand::FullRedraw => self.paint_all(),
            RenderCommand::Resize { width, height } => {
                self.screen = Rect::from_size(width, height);
                self.paint_all();
            }
            RenderCommand::Shutdown => {
                self.output.reset_attrs();
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn paint_cell(&mut self, column: u16, row: u16, color: Rgb) {
        let rect = self.config.cell_rect(column, row).clip(&self.screen);
        self.output.fill_rect(rect, color);
        self.stats.cells_painted += 1;
    }

    fn paint_status(&mut self) {
        let (x, _) = self.config.origin();
        let y = self.config.status_row();
        if !self.screen.contains(x, y) {
            return;
        }
        self.output.reset_attrs();
        self.output.cursor_move(x, y);
        self.output.clear_line();
        if let Some(status) = &self.status {
            let room = usize::from(self.screen.right() - x);
            let text: String = status.chars().take(room).collect();
            self.output.write_str(&text);
        }
    }

    fn paint_all(&mut self) {
        self.output.reset_attrs();
        self.output.clear_screen();
        self.output.cursor_hide();
        let Self { config, mirror, screen, output, stats, .. } = self;
        for (column, row, color) in mirror.iter() {
            output.fill_rect(config.cell_rect(column, row).clip(screen), color);
            stats.cells_painted += 1;
        }
        self.paint_status();
    }

    /// Write everything queued in one go.
    fn flush(&mut self) -> io::Result<()> {
        if self.output.is_empty() {
            return Ok(());
        }
        self.output.flush_to(&mut self.writer)?;
        self.stats.flushes += 1;
        self.stats.bytes_written += self.output.len() as u64;
        self.output.clear();
        Ok(())
    }
}

impl RendererActor {
    /// Spawn the renderer actor thread.
    ///
    /// # Arguments
    ///
    /// * `receiver` - Channel to receive render commands from.
    /// * `config` - Grid and cell geometry.
    /// * `width` - Initial terminal width.
    /// * `height` - Initial terminal height.
    pub fn spawn(
        receiver: Receiver<RenderCommand>,
        config: Config,
        width: u16,
        height: u16,
    ) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("blockview-render".to_string())
            .spawn(move || {
                let renderer = Renderer::new(config, Rect::from_size(width, height), io::stdout());
                match Self::run_loop(&receiver, &shutdown_clone, renderer) {
                    Ok(stats) => debug!(?stats, "render thread finished"),
                    Err(error) => error!(%error, "render thread failed"),
                }
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Signal the render thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the render thread to finish.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main render loop.
    fn run_loop<W: Write>(
        receiver: &Receiver<RenderCommand>,
        shutdown: &AtomicBool,
        mut renderer: Renderer<W>,
    ) -> io::Result<RenderStats> {
        renderer.paint_all();
        renderer.flush()?;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Wait for command with timeout
            let Ok(command) = receiver.recv_timeout(Duration::from_millis(16)) else {
                continue;
            };

            let mut flow = renderer.apply(command);
            while flow == Flow::Continue {
                match receiver.try_recv() {
                    Ok(command) => flow = renderer.apply(command),
                    Err(_) => break,
                }
            }
            renderer.flush()?;

            if flow == Flow::Stop {
                break;
            }
        }

        Ok(renderer.stats)
    }
}

impl Drop for RendererActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
