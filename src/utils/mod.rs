//! Shared utility functions.
//!
//! - HTML escaping for error reports placed in the output display
//! - Single-line excerpts of engine output
//! - Percentage formatting

mod format;
mod html;
mod string;

pub use format::format_percentage;
pub use html::escape_html;
pub use string::excerpt;
