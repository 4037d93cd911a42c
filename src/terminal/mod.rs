//! Terminal module: ANSI output assembly.

mod output;

pub use output::OutputBuffer;
