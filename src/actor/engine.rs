//! Engine: Main coordinator that ties actors together.
//!
//! The Engine owns the terminal, spawns the reader, input, render, and
//! ticker actors, and runs the drive loop one budgeted batch per tick.
//! After the stream halts it keeps serving input until the user closes
//! the display.

use super::messages::{InputEvent, RenderCommand, StreamChunk};
use super::reader::{ChannelSource, ReaderActor, DEFAULT_CHUNK_SIZE};
use super::ticker::{Tick, TickerActor};
use super::{InputActor, RendererActor};
use crate::config::Config;
use crate::drive::{DriveLoop, Summary};
use crate::sink::RenderSink;
use crossbeam_channel::{bounded, never, select, Receiver, Sender};
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use std::io::{self, Read};

/// Restores the terminal when dropped.
struct TerminalGuard {
    alternate_screen: bool,
}

impl TerminalGuard {
    /// Enter raw mode (and the alternate screen), hide the cursor, set the title.
    fn enter(config: &Config) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self {
            alternate_screen: config.alternate_screen,
        };

        let mut stdout = io::stdout();
        if config.alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        execute!(stdout, cursor::Hide, SetTitle(&config.title))?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show);
        if self.alternate_screen {
            let _ = execute!(stdout, LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
    }
}

/// The interactive viewer.
pub struct Engine {
    /// Configuration.
    config: Config,
    /// Input event receiver.
    input_rx: Receiver<InputEvent>,
    /// Render command sender.
    render_tx: Sender<RenderCommand>,
    /// Input actor handle.
    input_actor: Option<InputActor>,
    /// Renderer actor handle.
    renderer_actor: Option<RendererActor>,
    /// Ticker actor handle.
    ticker: Option<TickerActor>,
    /// Stream reader; detached on drop since it may be blocked in `read`.
    _reader: ReaderActor,
    /// The decode loop, writing to the renderer.
    drive: DriveLoop<ChannelSource, RenderSink>,
    /// Whether the display is still open.
    running: bool,
    /// Declared last so the terminal is restored after the actors stop.
    _terminal: TerminalGuard,
}

impl Engine {
    /// Set up the terminal and start viewing `stream`.
    ///
    /// The first line of `stream` is discarded as preamble; everything after
    /// it is decoded as records.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, terminal setup
    /// fails, or a thread cannot be spawned.
    pub fn with_config<R>(config: Config, stream: R) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let (width, height) = terminal::size()?;
        let (canvas_w, canvas_h) = config.canvas_size();
        if canvas_w > width || canvas_h > height {
            warn!(
                canvas_w,
                canvas_h, width, height, "terminal is smaller than the grid; cells will be clipped"
            );
        }

        let terminal_guard = TerminalGuard::enter(&config)?;

        // Create channels
        let (input_tx, input_rx) = bounded::<InputEvent>(64);
        let (render_tx, render_rx) = bounded::<RenderCommand>(1024);
        let (stream_tx, stream_rx) = bounded::<StreamChunk>(64);

        // Spawn actors
        let input_actor = InputActor::spawn(input_tx, config.input_poll_timeout)?;
        let renderer_actor = RendererActor::spawn(render_rx, config.clone(), width, height)?;
        let reader = ReaderActor::spawn(stream, stream_tx, DEFAULT_CHUNK_SIZE)?;
        let ticker = TickerActor::spawn(config.step_interval)?;

        let drive = DriveLoop::new(
            config.grid_width,
            config.grid_height,
            ChannelSource::new(stream_rx),
            RenderSink::new(render_tx.clone()),
        );

        info!(
            width = config.grid_width,
            height = config.grid_height,
            "viewer started"
        );

        Ok(Self {
            config,
            input_rx,
            render_tx,
            input_actor: Some(input_actor),
            renderer_actor: Some(renderer_actor),
            ticker: Some(ticker),
            _reader: reader,
            drive,
            running: true,
            _terminal: terminal_guard,
        })
    }

    /// Check if the display is still open.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Close the display.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Run until the user closes the display.
    pub fn run(&mut self) -> Summary {
        let input_rx = self.input_rx.clone();
        let mut ticks: Receiver<Tick> = self
            .ticker
            .as_ref()
            .map_or_else(never, |ticker| ticker.receiver().clone());

        while self.running {
            let mut halted = false;
            select! {
                recv(input_rx) -> event => match event {
                    Ok(event) => self.handle_input(&event),
                    Err(_) => self.stop(),
                },
                recv(ticks) -> _ => {
                    self.run_tick();
                    halted = !self.drive.is_running();
                },
            }

            if halted {
                // Nothing left to read; stop ticking but keep the display up.
                ticks = never();
                if let Some(ticker) = self.ticker.take() {
                    ticker.join();
                }
            }
        }

        let summary = self.drive.summary();
        info!(stats = ?summary.stats, halt = ?summary.halt_reason, "viewer closed");
        summary
    }

    /// Run one budgeted batch of drive-loop steps. Returns records decoded.
    pub fn run_tick(&mut self) -> usize {
        self.drive.run_batch(self.config.steps_per_tick)
    }

    /// React to one input event.
    pub fn handle_input(&mut self, event: &InputEvent) {
        if event.is_close_request() {
            self.stop();
            return;
        }
        if event.is_redraw_request() {
            let _ = self.render_tx.send(RenderCommand::FullRedraw);
            return;
        }

        match event {
            InputEvent::Resize { width, height } => {
                let _ = self.render_tx.send(RenderCommand::Resize {
                    width: *width,
                    height: *height,
                });
            }
            InputEvent::Error(error) => warn!(error = %error, "input error"),
            InputEvent::Shutdown => self.stop(),
            InputEvent::Key { .. } => {}
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Stop actors
        if let Some(ticker) = self.ticker.take() {
            ticker.join();
        }
        if let Some(actor) = self.input_actor.take() {
            actor.join();
        }

        let _ = self.render_tx.send(RenderCommand::Shutdown);
        if let Some(actor) = self.renderer_actor.take() {
            actor.join();
        }
    }
}
