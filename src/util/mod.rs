//! Text helpers for rendering user-entered labels in a terminal.

mod text;

pub use text::{display_width, sanitize_label, strip_control_chars, truncate_to_width};
