//! # Formats Module
//!
//! Byte-level codecs for every file reppl reads or writes.
//!
//! These are pure transformations; file I/O is in the app layer.

mod formula;
mod persistence;

pub use formula::*;
pub use persistence::*;
