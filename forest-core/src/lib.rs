//! Core emissions estimation and forest layout library.
//!
//! Main components:
//! - [`usage`] — validated token counts and CSV usage import.
//! - [`emissions`] — token count to CO₂ and offset-tree conversion.
//! - [`scene`] — procedural placement of trees and decorations on a plot.
//! - [`forest`] — the combined estimate + layout for one submitted value.
//! - [`config`] — tunable constants for all of the above.
//! - [`types`] — object categories and their visual variants.
//! - [`error`] — the crate error type.

pub mod config;
pub mod emissions;
pub mod error;
pub mod forest;
pub mod scene;
pub mod types;
pub mod usage;

pub use error::{ForestError, Result};
