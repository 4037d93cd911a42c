//! Message types for actor communication.
//!
//! These enums define the protocol between the reader, input, and render
//! threads and the main loop.

use crate::grid::Rgb;

/// Key codes the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Escape key.
    Esc,
    /// Any other key.
    Other,
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    /// Control key held.
    pub control: bool,
}

impl KeyModifiers {
    /// No modifiers.
    pub const NONE: Self = Self { control: false };
}

/// Events from the input thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed.
    Key {
        /// The key code.
        code: KeyCode,
        /// Modifiers held during keypress.
        modifiers: KeyModifiers,
    },

    /// Terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },

    /// Input thread encountered an error.
    Error(String),

    /// Input thread is shutting down.
    Shutdown,
}

impl InputEvent {
    /// Whether this event asks to close the display (`q`, `Esc`, `Ctrl-C`).
    pub const fn is_close_request(&self) -> bool {
        match self {
            Self::Key { code: KeyCode::Char('q' | 'Q') | KeyCode::Esc, .. } => true,
            Self::Key {
                code: KeyCode::Char('c'),
                modifiers,
            } => modifiers.control,
            _ => false,
        }
    }

    /// Whether this event asks for a full repaint (`r` or `Ctrl-L`).
    pub const fn is_redraw_request(&self) -> bool {
        match self {
            Self::Key { code: KeyCode::Char('r' | 'R'), modifiers } => !modifiers.control,
            Self::Key { code: KeyCode::Char('l'), modifiers } => modifiers.control,
            _ => false,
        }
    }
}

/// Commands sent to the render thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    /// Repaint one grid cell.
    RefreshCell {
        /// Column index.
        column: u8,
        /// Row index.
        row: u8,
        /// New color.
        color: Rgb,
    },

    /// Replace the status line.
    Status(String),

    /// Repaint everything.
    FullRedraw,

    /// The terminal changed size.
    Resize {
        /// New width.
        width: u16,
        /// New height.
        height: u16,
    },

    /// Shutdown the render thread.
    Shutdown,
}

/// Chunks from the stream reader thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    /// Raw bytes, in stream order.
    Data(Vec<u8>),
    /// The stream reached end of file.
    End,
    /// The stream failed; no more data will follow.
    Failed(String),
}
