//! UI layout state.

use serde::{Deserialize, Serialize};

/// Number of columns in the trajectory table.
pub const TRAJECTORY_COLUMNS: usize = 11;

pub const DEFAULT_COLUMN_WIDTHS: [f32; TRAJECTORY_COLUMNS] =
    [170.0, 300.0, 110.0, 60.0, 60.0, 60.0, 110.0, 80.0, 60.0, 90.0, 100.0];

pub const MIN_COLUMN_WIDTH: f32 = 40.0;

/// Persisted widths and split sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutState {
    column_widths: [f32; TRAJECTORY_COLUMNS],
    /// Height of the step list inside the detail view, as a share of the view.
    detail_split_ratio: f32,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::with_column_widths(DEFAULT_COLUMN_WIDTHS)
    }
}

impl LayoutState {
    pub fn with_column_widths(column_widths: [f32; TRAJECTORY_COLUMNS]) -> Self {
        Self {
            column_widths: column_widths.map(|w| w.max(MIN_COLUMN_WIDTH)),
            detail_split_ratio: 0.6,
        }
    }

    pub fn column_widths(&self) -> &[f32; TRAJECTORY_COLUMNS] {
        &self.column_widths
    }

    pub fn detail_split_ratio(&self) -> f32 {
        self.detail_split_ratio
    }

    /// Total width of the table.
    pub fn table_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    /// Resizes column `index` by `delta`, keeping it above the minimum width.
    pub fn resize_column(&mut self, index: usize, delta: f32) {
        if let Some(width) = self.column_widths.get_mut(index) {
            *width = (*width + delta).max(MIN_COLUMN_WIDTH);
        }
    }

    pub fn reset_columns(&mut self) {
        self.column_widths = DEFAULT_COLUMN_WIDTHS;
    }
}
