//! Column header of the trajectory table.
//!
//! Painter-drawn so column widths line up with the painted rows. Labels of
//! sortable columns are clickable and show the active direction; the gaps
//! between columns are drag handles that resize the column on their left.

use eframe::egui;
use egui::Color32;
use rtraj::{SortDir, SortField, SortSpec};

use crate::state::{LayoutState, TRAJECTORY_COLUMNS};
use crate::utils::truncate_text_to_fit;

pub const HEADER_HEIGHT: f32 = 24.0;
const HANDLE_WIDTH: f32 = 8.0;

/// Column titles and the server sort each one maps to, left to right.
pub const COLUMNS: [(&str, Option<SortField>); TRAJECTORY_COLUMNS] = [
    ("Trajectory", None),
    ("Question", None),
    ("Training", None),
    ("Epoch", Some(SortField::EpochId)),
    ("Iter", Some(SortField::IterationId)),
    ("Sample", Some(SortField::SampleId)),
    ("Agent", None),
    ("Reward", Some(SortField::Reward)),
    ("Steps", Some(SortField::StepCount)),
    ("Exec time", Some(SortField::ExecTime)),
    ("Result", None),
];

fn sort_marker(column: Option<SortField>, sort: Option<SortSpec>) -> &'static str {
    match (column, sort) {
        (Some(field), Some(spec)) if spec.field == field => match spec.dir {
            SortDir::Asc => " ▲",
            SortDir::Desc => " ▼",
        },
        (Some(_), _) => " ↕",
        _ => "",
    }
}

/// Renders the header row. Returns the sortable column the user clicked.
pub fn render_table_header(
    ui: &mut egui::Ui,
    layout: &mut LayoutState,
    sort: Option<SortSpec>,
) -> Option<SortField> {
    let start = ui.cursor().min;
    let (_row, _) = ui.allocate_exact_size(
        egui::vec2(layout.table_width().max(ui.available_width()), HEADER_HEIGHT),
        egui::Sense::hover(),
    );

    let font_id = egui::FontId::proportional(14.0);
    let text_color = ui.visuals().strong_text_color();
    let idle_handle = ui.visuals().widgets.noninteractive.bg_stroke.color.gamma_multiply(0.5);
    let mut clicked = None;
    let mut x = start.x;

    for (i, (title, sort_field)) in COLUMNS.iter().enumerate() {
        let width = layout.column_widths()[i];
        let cell = egui::Rect::from_min_size(egui::pos2(x, start.y), egui::vec2(width, HEADER_HEIGHT));

        if sort_field.is_some() {
            let response = ui.interact(cell.shrink2(egui::vec2(HANDLE_WIDTH / 2.0, 0.0)), ui.id().with(("sort", i)), egui::Sense::click());
            if response.hovered() {
                ui.painter().rect_filled(cell, 2.0, ui.visuals().widgets.hovered.weak_bg_fill);
            }
            if response.clicked() {
                clicked = *sort_field;
            }
        }

        let label = format!("{title}{}", sort_marker(*sort_field, sort));
        let label = truncate_text_to_fit(&label, width, &font_id, ui.painter());
        ui.painter().text(
            cell.left_center() + egui::vec2(4.0, 0.0),
            egui::Align2::LEFT_CENTER,
            label,
            font_id.clone(),
            text_color,
        );

        x += width;

        let handle_rect = egui::Rect::from_center_size(
            egui::pos2(x, start.y + HEADER_HEIGHT / 2.0),
            egui::vec2(HANDLE_WIDTH, HEADER_HEIGHT),
        );
        let handle = ui.interact(handle_rect, ui.id().with(("resize", i)), egui::Sense::drag());
        if handle.dragged() {
            layout.resize_column(i, handle.drag_delta().x);
        }
        if handle.double_clicked() {
            layout.reset_columns();
        }
        let handle_color = if handle.hovered() || handle.dragged() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
            Color32::from_rgb(100, 150, 255)
        } else {
            idle_handle
        };
        ui.painter().rect_filled(handle_rect.shrink(2.0), 0.0, handle_color);
    }

    clicked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_show_active_direction() {
        let spec = SortSpec {
            field: SortField::Reward,
            dir: SortDir::Asc,
        };
        assert_eq!(sort_marker(Some(SortField::Reward), Some(spec)), " ▲");
        assert_eq!(sort_marker(Some(SortField::StepCount), Some(spec)), " ↕");
        assert_eq!(sort_marker(None, Some(spec)), "");
    }

    #[test]
    fn each_sort_field_has_one_column() {
        let sortable: Vec<_> = COLUMNS.iter().filter_map(|(_, field)| *field).collect();
        assert_eq!(sortable.len(), 6);
        for field in &sortable {
            assert_eq!(sortable.iter().filter(|f| *f == field).count(), 1, "{field:?}");
        }
    }
}
