//! Trajectory list view state.
//!
//! Wraps the list controller together with the filter panel's edit buffers.
//! The controller lives here, in application state, so filters, sort, search
//! and page survive tab switches.

use std::collections::BTreeMap;
use std::path::Path;

use rtraj::query::{FilterKind, FilterSet};
use rtraj::{ApiError, FilterField, FilterValue, NumericFilter, TrajectoryListController};

/// Text typed into one row of the filter panel, before it is parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterDraft {
    pub text: String,
    pub equals: String,
    pub min: String,
    pub max: String,
    pub flag: Option<bool>,
    pub selected: Vec<String>,
}

impl FilterDraft {
    /// Fills the buffers from a committed filter value.
    fn from_value(value: &FilterValue) -> Self {
        let mut draft = Self::default();
        match value {
            FilterValue::Text(text) => draft.text = text.clone(),
            FilterValue::Integer(n) => draft.text = n.to_string(),
            FilterValue::Numeric(numeric) => {
                draft.equals = numeric.equals.map(|v| v.to_string()).unwrap_or_default();
                draft.min = numeric.min.map(|v| v.to_string()).unwrap_or_default();
                draft.max = numeric.max.map(|v| v.to_string()).unwrap_or_default();
            }
            FilterValue::Bool(flag) => draft.flag = Some(*flag),
            FilterValue::Select(options) => draft.selected = options.clone(),
        }
        draft
    }

    /// Parses the buffers for `field`. `Ok(None)` means the row is blank.
    pub fn parse(&self, field: FilterField) -> Result<Option<FilterValue>, String> {
        let value = match field.kind() {
            FilterKind::Text => {
                let text = self.text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                FilterValue::Text(text.to_string())
            }
            FilterKind::Integer => {
                let text = self.text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                let n = text
                    .parse::<i64>()
                    .map_err(|_| format!("{}: `{text}` is not a whole number", field.label()))?;
                FilterValue::Integer(n)
            }
            FilterKind::Numeric { integer, .. } => {
                let parse = |raw: &str| {
                    if integer {
                        parse_whole(field, raw)
                    } else {
                        parse_float(field, raw)
                    }
                };
                let numeric = NumericFilter {
                    equals: parse(&self.equals)?,
                    min: parse(&self.min)?,
                    max: parse(&self.max)?,
                };
                if numeric.is_empty() {
                    return Ok(None);
                }
                FilterValue::Numeric(numeric)
            }
            FilterKind::Bool => match self.flag {
                Some(flag) => FilterValue::Bool(flag),
                None => return Ok(None),
            },
            FilterKind::MultiSelect => {
                if self.selected.is_empty() {
                    return Ok(None);
                }
                FilterValue::Select(self.selected.clone())
            }
        };
        Ok(Some(value))
    }

    pub fn toggle_option(&mut self, option: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == option) {
            self.selected.remove(pos);
        } else {
            self.selected.push(option.to_string());
        }
    }
}

fn parse_float(field: FilterField, raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| format!("{}: `{raw}` is not a number", field.label()))
}

fn parse_whole(field: FilterField, raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(|n| Some(n as f64))
        .map_err(|_| format!("{}: `{raw}` is not a whole number", field.label()))
}

pub struct TrajectoryViewState {
    pub list: TrajectoryListController,
    filter_panel_open: bool,
    drafts: BTreeMap<FilterField, FilterDraft>,
    filter_error: Option<String>,
    export_pending: bool,
    last_export: Option<String>,
}

impl TrajectoryViewState {
    pub fn new(list: TrajectoryListController) -> Self {
        Self {
            list,
            filter_panel_open: false,
            drafts: BTreeMap::new(),
            filter_error: None,
            export_pending: false,
            last_export: None,
        }
    }

    // ===== Filter panel =====

    /// Whether the filter panel is shown. Always false while a jump filter
    /// is active.
    pub fn filter_panel_open(&self) -> bool {
        self.filter_panel_open && self.list.filter_panel_enabled()
    }

    pub fn toggle_filter_panel(&mut self) {
        self.filter_panel_open = !self.filter_panel_open;
    }

    pub fn draft_mut(&mut self, field: FilterField) -> &mut FilterDraft {
        self.drafts.entry(field).or_default()
    }

    pub fn draft(&self, field: FilterField) -> Option<&FilterDraft> {
        self.drafts.get(&field)
    }

    pub fn clear_draft(&mut self, field: FilterField) {
        self.drafts.remove(&field);
    }

    pub fn filter_error(&self) -> Option<&str> {
        self.filter_error.as_deref()
    }

    pub fn set_filter_error(&mut self, error: Option<String>) {
        self.filter_error = error;
    }

    /// Rebuilds the edit buffers from the controller's committed filters,
    /// after a clear or a seeded navigation replaced them.
    pub fn sync_drafts(&mut self) {
        self.drafts = drafts_from(self.list.filters());
        self.filter_error = None;
    }
}

impl TrajectoryViewState {
    // ===== Export =====

    pub fn export_pending(&self) -> bool {
        self.export_pending
    }

    /// Confirmation of the last successful export.
    pub fn last_export(&self) -> Option<&str> {
        self.last_export.as_deref()
    }

    /// Returns false while an export is already running.
    pub fn begin_export(&mut self) -> bool {
        if self.export_pending {
            return false;
        }
        self.export_pending = true;
        self.last_export = None;
        true
    }

    /// Records the outcome and hands back the failure message, if any.
    pub fn finish_export(&mut self, path: &Path, outcome: Result<usize, ApiError>) -> Option<String> {
        self.export_pending = false;
        match outcome {
            Ok(bytes) => {
                self.last_export = Some(format!("Saved {bytes} bytes to {}", path.display()));
                None
            }
            Err(err) => Some(err.user_message()),
        }
    }
}

fn drafts_from(filters: &FilterSet) -> BTreeMap<FilterField, FilterDraft> {
    FilterField::ALL
        .iter()
        .filter_map(|&field| {
            filters
                .get(field)
                .map(|filter| (field, FilterDraft::from_value(&filter.value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_rows_parse_to_nothing() {
        let draft = FilterDraft::default();
        for field in FilterField::ALL {
            assert_eq!(draft.parse(field), Ok(None), "{field:?}");
        }
    }

    #[test]
    fn numeric_row_keeps_equality_and_range() {
        let draft = FilterDraft {
            equals: "2".into(),
            min: " 1.5 ".into(),
            ..Default::default()
        };
        assert_eq!(
            draft.parse(FilterField::Reward),
            Ok(Some(FilterValue::Numeric(NumericFilter {
                equals: Some(2.0),
                min: Some(1.5),
                max: None,
            })))
        );
    }

    #[test]
    fn step_count_row_takes_whole_numbers_only() {
        let draft = FilterDraft {
            min: "3".into(),
            ..Default::default()
        };
        assert_eq!(
            draft.parse(FilterField::StepCount),
            Ok(Some(FilterValue::Numeric(NumericFilter::range(Some(3.0), None))))
        );
        let fractional = FilterDraft {
            max: "3.5".into(),
            ..Default::default()
        };
        assert!(fractional.parse(FilterField::StepCount).is_err());
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let draft = FilterDraft {
            text: "three".into(),
            max: "NaN".into(),
            ..Default::default()
        };
        assert!(draft.parse(FilterField::EpochId).is_err());
        assert!(draft.parse(FilterField::ExecTime).is_err());
    }

    #[test]
    fn drafts_follow_seeded_filters() {
        let mut view = TrajectoryViewState::new(TrajectoryListController::default());
        view.draft_mut(FilterField::AgentName).text = "stale".into();
        view.list.seed_filters([
            (FilterField::TrainingId, FilterValue::Text("train_7".into())),
            (FilterField::EpochId, FilterValue::Integer(3)),
        ]);
        view.sync_drafts();
        assert!(view.draft(FilterField::AgentName).is_none());
        assert_eq!(view.draft(FilterField::EpochId).map(|d| d.text.as_str()), Some("3"));
    }

    #[test]
    fn jump_filter_hides_open_panel() {
        let mut view = TrajectoryViewState::new(TrajectoryListController::default());
        view.toggle_filter_panel();
        assert!(view.filter_panel_open());
        view.list.seed_jump(rtraj::JumpFilter::Question("q1".into()));
        assert!(!view.filter_panel_open());
    }

    #[test]
    fn export_runs_one_at_a_time() {
        let mut view = TrajectoryViewState::new(TrajectoryListController::default());
        assert!(view.begin_export());
        assert!(!view.begin_export());
        assert_eq!(view.finish_export(Path::new("/tmp/t.csv"), Ok(12)), None);
        assert_eq!(view.last_export(), Some("Saved 12 bytes to /tmp/t.csv"));

        assert!(view.begin_export());
        let failure = view.finish_export(
            Path::new("/tmp/t.csv"),
            Err(ApiError::Status {
                code: 500,
                message: "database locked".into(),
            }),
        );
        assert_eq!(failure.as_deref(), Some("database locked"));
        assert_eq!(view.last_export(), None);
        assert!(!view.export_pending());
    }

    #[test]
    fn toggling_options() {
        let mut draft = FilterDraft::default();
        draft.toggle_option("timeout");
        draft.toggle_option("error");
        draft.toggle_option("timeout");
        assert_eq!(draft.selected, vec!["error".to_string()]);
    }
}
