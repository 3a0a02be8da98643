//! Column filter panel of the trajectory list.
//!
//! Each row edits a draft; nothing reaches the query until the row is
//! applied. Committed filters get an "active" checkbox so they can be
//! switched off without losing their value.

use eframe::egui;
use rtraj::{FilterField, FilterKind};

use crate::app::ListAction;
use crate::state::TrajectoryViewState;

pub fn render_filter_panel(ui: &mut egui::Ui, view: &mut TrajectoryViewState) -> Option<ListAction> {
    let mut action = None;

    egui::Grid::new("filter_grid")
        .num_columns(4)
        .spacing([8.0, 4.0])
        .striped(true)
        .show(ui, |ui| {
            for field in FilterField::ALL {
                let committed = view.list.filters().get(field).map(|filter| filter.active);

                match committed {
                    Some(active) => {
                        let mut checked = active;
                        if ui.checkbox(&mut checked, "").on_hover_text("Use this filter").changed() {
                            action = Some(ListAction::SetFilterActive(field, checked));
                        }
                    }
                    None => {
                        ui.label("");
                    }
                }
                ui.label(field.label());

                let submitted = render_inputs(ui, view, field);

                ui.horizontal(|ui| {
                    if ui.small_button("Apply").clicked() || submitted {
                        action = Some(ListAction::ApplyFilter(field));
                    }
                    let clearable = committed.is_some() || view.draft(field).is_some();
                    if ui.add_enabled(clearable, egui::Button::new("Clear").small()).clicked() {
                        action = Some(ListAction::ClearFilter(field));
                    }
                });
                ui.end_row();
            }
        });

    if let Some(err) = view.filter_error() {
        ui.colored_label(ui.visuals().error_fg_color, err);
    }

    ui.horizontal(|ui| {
        if ui.button("Clear all filters").clicked() {
            action = Some(ListAction::ClearAll);
        }
        if view.list.sort().is_some() && ui.button("Clear sort").clicked() {
            action = Some(ListAction::ClearSort);
        }
    });

    action
}

/// Input widgets for one row. Returns true when Enter was pressed in a
/// text box.
fn render_inputs(ui: &mut egui::Ui, view: &mut TrajectoryViewState, field: FilterField) -> bool {
    let draft = view.draft_mut(field);
    let mut submitted = false;
    let mut text_box = |ui: &mut egui::Ui, buffer: &mut String, hint: &str, width: f32| {
        let response = ui.add(egui::TextEdit::singleline(buffer).hint_text(hint).desired_width(width));
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submitted = true;
        }
    };

    ui.horizontal(|ui| match field.kind() {
        FilterKind::Text => text_box(ui, &mut draft.text, "contains…", 220.0),
        FilterKind::Integer => text_box(ui, &mut draft.text, "=", 80.0),
        FilterKind::Numeric { .. } => {
            text_box(ui, &mut draft.equals, "=", 60.0);
            ui.label("or");
            text_box(ui, &mut draft.min, "min", 60.0);
            ui.label("–");
            text_box(ui, &mut draft.max, "max", 60.0);
        }
        FilterKind::Bool => {
            let selected = match draft.flag {
                None => "Any",
                Some(true) => "Yes",
                Some(false) => "No",
            };
            egui::ComboBox::from_id_salt(("bool_filter", field))
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut draft.flag, None, "Any");
                    ui.selectable_value(&mut draft.flag, Some(true), "Yes");
                    ui.selectable_value(&mut draft.flag, Some(false), "No");
                });
        }
        FilterKind::MultiSelect => {
            for option in field.options() {
                let mut checked = draft.selected.iter().any(|s| s == option);
                if ui.checkbox(&mut checked, *option).changed() {
                    draft.toggle_option(option);
                }
            }
        }
    });

    submitted
}
