//! Magic Brush: click-to-erase refinement of background-removed product images.
//!
//! A click flood-fills the color-connected region around the seed pixel and
//! makes it transparent. Every edit produces a new immutable buffer that is
//! committed to a bounded undo/redo history. [`session::EditSession`] is the
//! entry point for hosts; decoding inputs and displaying results stay outside.

#[macro_use]
pub mod logger;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod io;
pub mod ops;
pub mod session;
pub mod settings;
pub mod surface;

pub use canvas::{Color, Coordinate, RasterBuffer, Tolerance};
pub use components::history::{HISTORY_CAPACITY, HistoryManager};
pub use session::{ClickOutcome, EditSession, SessionError, SessionState};
