//! Output formatting for topology data.
//!
//! This module handles formatting and outputting topology data:
//! - [`csv`] - CSV output formatting
//! - [`terminal`] - Terminal helpers with colors

mod csv;
mod terminal;

pub use csv::{snapshot_print, snapshot_rows};
pub use terminal::{format_field, grade_colored};
