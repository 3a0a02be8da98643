//! Formatting and text measurement helpers shared by the panels.

pub mod formatting;
pub mod text;

pub use formatting::{
    format_age, format_count, format_duration_secs, format_memory_mb, format_percent, format_reward,
    get_current_memory_mb, preview, unix_now,
};
pub use text::truncate_text_to_fit;
