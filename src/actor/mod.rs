//! Actor Model: Message-passing concurrency for the viewer.
//!
//! This module implements a simple actor system using crossbeam channels:
//! - **Reader Actor**: Blocks on the byte stream, forwards chunks to the main loop
//! - **Input Actor**: Polls terminal events, forwards to main loop
//! - **Render Actor**: Receives cell refreshes, paints and flushes
//! - **Ticker Actor**: Paces drive-loop batches
//! - **Main Loop**: Owns the drive loop and the grid
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     StreamChunk     ┌──────────────┐
//! │Reader Thread │ ─────────────────▶  │              │
//! └──────────────┘                     │              │
//! ┌──────────────┐     InputEvent      │  Main Loop   │
//! │ Input Thread │ ─────────────────▶  │ (DriveLoop)  │
//! └──────────────┘                     │              │
//! ┌──────────────┐        Tick         │              │
//! │Ticker Thread │ ─────────────────▶  │              │
//! └──────────────┘                     │              │
//! ┌──────────────┐    RenderCommand    │              │
//! │Render Thread │ ◀─────────────────  │              │
//! └──────────────┘                     └──────────────┘
//! ```

mod engine;
mod input;
mod messages;
mod reader;
mod renderer;
mod ticker;

pub use engine::Engine;
pub use input::InputActor;
pub use messages::{InputEvent, KeyCode, KeyModifiers, RenderCommand, StreamChunk};
pub use reader::{ChannelSource, ReaderActor, DEFAULT_CHUNK_SIZE};
pub use renderer::{RenderStats, RendererActor};
pub use ticker::{Tick, TickerActor};
