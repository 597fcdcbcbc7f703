//! Per-sample cursor processing
//!
//! This module contains the pure algorithms applied to every tracking
//! sample: mapping raw positions onto the screen and timing dwells.

pub mod cursor_mapper;
pub mod dwell;

pub use cursor_mapper::CursorMapper;
pub use dwell::{DwellTick, DwellTimer, Movement};
