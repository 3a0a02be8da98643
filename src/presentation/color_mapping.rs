//! Semantic colors for trajectory outcomes, difficulty and import status.
//!
//! Panels never pick raw colors; they ask here with the active palette so
//! every theme stays consistent.

use egui::Color32;
use rtraj::{Difficulty, ImportStatus, ThemeColors};

pub fn success_color(is_success: bool, colors: &ThemeColors) -> Color32 {
    if is_success {
        colors.success
    } else {
        colors.failure
    }
}

pub fn difficulty_color(difficulty: Difficulty, colors: &ThemeColors) -> Color32 {
    match difficulty {
        Difficulty::Easy => colors.easy,
        Difficulty::Medium => colors.medium,
        Difficulty::Hard => colors.hard,
    }
}

/// Normal endings are plain text; timeouts warn; errors fail.
pub fn termination_color(reason: &str, colors: &ThemeColors) -> Color32 {
    match reason {
        "env_done" | "finish" => colors.text,
        "truncation" | "timeout" => colors.warning,
        "error" => colors.failure,
        _ => colors.text_dim,
    }
}

/// Positive rewards read as success, negative as failure, zero as neutral.
pub fn reward_color(reward: f64, colors: &ThemeColors) -> Color32 {
    if reward > 0.0 {
        colors.success
    } else if reward < 0.0 {
        colors.failure
    } else {
        colors.text_dim
    }
}

pub fn import_status_color(status: ImportStatus, colors: &ThemeColors) -> Color32 {
    match status {
        ImportStatus::Completed => colors.success,
        ImportStatus::Failed => colors.failure,
        ImportStatus::Pending | ImportStatus::Processing => colors.accent,
        ImportStatus::Unknown => colors.text_dim,
    }
}
