//! Trajectory list query construction.
//!
//! Translates the list view's filter, sort, search and jump-filter state into
//! the query parameters understood by `GET /trajectories`. Construction is a
//! pure function of the state, so calling it twice with the same state yields
//! the same parameter list.
//!
//! Precedence, first match wins per concern:
//! 1. A jump filter alone determines the identity filter; generic column
//!    filters are not sent, even when marked active.
//! 2. Otherwise every active, non-empty column filter is sent (AND).
//! 3. A non-empty search term is sent as `search`.
//! 4. A sort, when set, is sent as `sort_by` + `sort_order`. Without one no
//!    sort parameters are sent and the backend returns insertion order.

use std::collections::BTreeMap;
use std::fmt;

/// Query parameters as ordered `(name, value)` pairs.
pub type QueryParams = Vec<(String, String)>;

/// Termination reasons the backend reports, in canonical display order.
pub const TERMINATION_REASONS: [&str; 5] = ["env_done", "finish", "truncation", "timeout", "error"];

/// How a column is filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring match on the server.
    Text,
    /// Exact integer match.
    Integer,
    /// Numeric equality or min/max range.
    Numeric {
        /// Whether the backend accepts a `<param>_exact` parameter.
        exact_param: bool,
        /// Whole numbers only, sent without a decimal point.
        integer: bool,
    },
    /// `"true"` / `"false"`.
    Bool,
    /// Comma-joined subset of a fixed option list.
    MultiSelect,
}

/// A filterable column of the trajectory table.
///
/// The declaration order is the order filters appear in emitted queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    TrajectoryId,
    DataId,
    TrainingId,
    AgentName,
    Question,
    EpochId,
    IterationId,
    SampleId,
    Reward,
    ToolcallReward,
    ResReward,
    StepCount,
    ExecTime,
    IsSuccess,
    IsBookmarked,
    TerminationReason,
}

impl FilterField {
    pub const ALL: [FilterField; 16] = [
        FilterField::TrajectoryId,
        FilterField::DataId,
        FilterField::TrainingId,
        FilterField::AgentName,
        FilterField::Question,
        FilterField::EpochId,
        FilterField::IterationId,
        FilterField::SampleId,
        FilterField::Reward,
        FilterField::ToolcallReward,
        FilterField::ResReward,
        FilterField::StepCount,
        FilterField::ExecTime,
        FilterField::IsSuccess,
        FilterField::IsBookmarked,
        FilterField::TerminationReason,
    ];

    /// Base query parameter name.
    pub fn param(self) -> &'static str {
        match self {
            FilterField::TrajectoryId => "trajectory_id",
            FilterField::DataId => "data_id",
            FilterField::TrainingId => "training_id",
            FilterField::AgentName => "agent_name",
            FilterField::Question => "question",
            FilterField::EpochId => "epoch_id",
            FilterField::IterationId => "iteration_id",
            FilterField::SampleId => "sample_id",
            FilterField::Reward => "reward",
            FilterField::ToolcallReward => "toolcall_reward",
            FilterField::ResReward => "res_reward",
            FilterField::StepCount => "step_count",
            FilterField::ExecTime => "exec_time",
            FilterField::IsSuccess => "is_success",
            FilterField::IsBookmarked => "is_bookmarked",
            FilterField::TerminationReason => "termination_reason",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterField::TrajectoryId => "Trajectory ID",
            FilterField::DataId => "Question ID",
            FilterField::TrainingId => "Training ID",
            FilterField::AgentName => "Agent",
            FilterField::Question => "Question",
            FilterField::EpochId => "Epoch",
            FilterField::IterationId => "Iteration",
            FilterField::SampleId => "Sample",
            FilterField::Reward => "Reward",
            FilterField::ToolcallReward => "Tool-call reward",
            FilterField::ResReward => "Result reward",
            FilterField::StepCount => "Steps",
            FilterField::ExecTime => "Exec time (s)",
            FilterField::IsSuccess => "Success",
            FilterField::IsBookmarked => "Bookmarked",
            FilterField::TerminationReason => "Termination",
        }
    }

    pub fn kind(self) -> FilterKind {
        match self {
            FilterField::TrajectoryId
            | FilterField::DataId
            | FilterField::TrainingId
            | FilterField::AgentName
            | FilterField::Question => FilterKind::Text,
            FilterField::EpochId | FilterField::IterationId | FilterField::SampleId => {
                FilterKind::Integer
            }
            FilterField::Reward | FilterField::ToolcallReward | FilterField::ResReward => {
                FilterKind::Numeric {
                    exact_param: true,
                    integer: false,
                }
            }
            FilterField::StepCount => FilterKind::Numeric {
                exact_param: false,
                integer: true,
            },
            FilterField::ExecTime => FilterKind::Numeric {
                exact_param: false,
                integer: false,
            },
            FilterField::IsSuccess | FilterField::IsBookmarked => FilterKind::Bool,
            FilterField::TerminationReason => FilterKind::MultiSelect,
        }
    }

    /// Options offered by a multi-select column.
    pub fn options(self) -> &'static [&'static str] {
        match self {
            FilterField::TerminationReason => &TERMINATION_REASONS,
            _ => &[],
        }
    }
}

/// Numeric filter holding equality and range bounds independently.
///
/// When `equals` is set it takes precedence: the range bounds are kept but
/// not emitted. A stored filter is always replaced as a whole, so a bound
/// left unset is unset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericFilter {
    pub equals: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericFilter {
    pub fn equals(value: f64) -> Self {
        Self {
            equals: Some(value),
            ..Self::default()
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            equals: None,
            min,
            max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_none() && self.min.is_none() && self.max.is_none()
    }

    fn values(&self) -> impl Iterator<Item = f64> {
        [self.equals, self.min, self.max].into_iter().flatten()
    }

    fn push_params(&self, param: &str, exact_param: bool, integer: bool, out: &mut QueryParams) {
        let format = |value: f64| {
            if integer {
                format!("{}", value as i64)
            } else {
                format_number(value)
            }
        };
        if let Some(value) = self.equals {
            if exact_param {
                out.push((format!("{param}_exact"), format(value)));
            } else {
                out.push((format!("{param}_min"), format(value)));
                out.push((format!("{param}_max"), format(value)));
            }
            return;
        }
        if let Some(min) = self.min {
            out.push((format!("{param}_min"), format(min)));
        }
        if let Some(max) = self.max {
            out.push((format!("{param}_max"), format(max)));
        }
    }
}

/// Value of a single column filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Numeric(NumericFilter),
    Bool(bool),
    Select(Vec<String>),
}

impl FilterValue {
    fn matches_kind(&self, kind: FilterKind) -> bool {
        matches!(
            (self, kind),
            (FilterValue::Text(_), FilterKind::Text)
                | (FilterValue::Integer(_), FilterKind::Integer)
                | (FilterValue::Numeric(_), FilterKind::Numeric { .. })
                | (FilterValue::Bool(_), FilterKind::Bool)
                | (FilterValue::Select(_), FilterKind::MultiSelect)
        )
    }

    /// Empty values never reach the query.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.trim().is_empty(),
            FilterValue::Numeric(numeric) => numeric.is_empty(),
            FilterValue::Select(options) => options.is_empty(),
            FilterValue::Integer(_) | FilterValue::Bool(_) => false,
        }
    }
}

/// Rejected filter updates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("{field} filters expect a {expected:?} value")]
    KindMismatch { field: FilterField, expected: FilterKind },
    #[error("unknown option `{option}` for {field}")]
    UnknownOption { field: FilterField, option: String },
    #[error("{field} range has min {min} greater than max {max}")]
    InvertedRange { field: FilterField, min: f64, max: f64 },
    #[error("{field} expects a whole number, got {value}")]
    NotWholeNumber { field: FilterField, value: f64 },
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A column filter and whether it currently participates in the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub value: FilterValue,
    pub active: bool,
}

/// All column filters of the list view, keyed by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    filters: BTreeMap<FilterField, ColumnFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a filter value, marking it active.
    ///
    /// The value replaces whatever the column held before. Multi-select
    /// values are normalized to the column's canonical option order.
    pub fn apply(&mut self, field: FilterField, value: FilterValue) -> Result<(), FilterError> {
        let kind = field.kind();
        if !value.matches_kind(kind) {
            return Err(FilterError::KindMismatch {
                field,
                expected: kind,
            });
        }

        let value = match value {
            FilterValue::Select(selected) => {
                FilterValue::Select(normalize_selection(field, selected)?)
            }
            FilterValue::Text(text) => FilterValue::Text(text.trim().to_string()),
            FilterValue::Numeric(numeric) => {
                if let FilterKind::Numeric { integer: true, .. } = kind {
                    if let Some(value) = numeric.values().find(|v| v.fract() != 0.0) {
                        return Err(FilterError::NotWholeNumber { field, value });
                    }
                }
                if let (None, Some(min), Some(max)) = (numeric.equals, numeric.min, numeric.max) {
                    if min > max {
                        return Err(FilterError::InvertedRange { field, min, max });
                    }
                }
                FilterValue::Numeric(numeric)
            }
            other => other,
        };

        self.filters.insert(
            field,
            ColumnFilter {
                value,
                active: true,
            },
        );
        Ok(())
    }

    /// Flips the active flag of a stored filter. Returns false when the
    /// column has no filter.
    pub fn set_active(&mut self, field: FilterField, active: bool) -> bool {
        match self.filters.get_mut(&field) {
            Some(filter) => {
                filter.active = active;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, field: FilterField) -> Option<ColumnFilter> {
        self.filters.remove(&field)
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn get(&self, field: FilterField) -> Option<&ColumnFilter> {
        self.filters.get(&field)
    }

    /// Active, non-empty filters in column order.
    pub fn active(&self) -> impl Iterator<Item = (FilterField, &FilterValue)> {
        self.filters
            .iter()
            .filter(|(_, filter)| filter.active && !filter.value.is_empty())
            .map(|(field, filter)| (*field, &filter.value))
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    fn push_params(&self, out: &mut QueryParams) {
        for (field, value) in self.active() {
            let param = field.param();
            match value {
                FilterValue::Text(text) => out.push((param.to_string(), text.clone())),
                FilterValue::Integer(n) => out.push((param.to_string(), n.to_string())),
                FilterValue::Bool(b) => out.push((param.to_string(), b.to_string())),
                FilterValue::Select(options) => out.push((param.to_string(), options.join(","))),
                FilterValue::Numeric(numeric) => {
                    if let FilterKind::Numeric { exact_param, integer } = field.kind() {
                        numeric.push_params(param, exact_param, integer, out);
                    }
                }
            }
        }
    }
}

fn normalize_selection(field: FilterField, selected: Vec<String>) -> Result<Vec<String>, FilterError> {
    let options = field.options();
    if let Some(unknown) = selected.iter().find(|s| !options.contains(&s.as_str())) {
        return Err(FilterError::UnknownOption {
            field,
            option: unknown.clone(),
        });
    }
    Ok(options
        .iter()
        .filter(|option| selected.iter().any(|s| s == *option))
        .map(|option| option.to_string())
        .collect())
}

/// A single preset filter seeded by navigating from another view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpFilter {
    /// All trajectories attempting one question.
    Question(String),
    /// A single trajectory.
    Trajectory(String),
}

impl JumpFilter {
    fn param(&self) -> (String, String) {
        match self {
            JumpFilter::Question(id) => (FilterField::DataId.param().to_string(), id.clone()),
            JumpFilter::Trajectory(id) => {
                (FilterField::TrajectoryId.param().to_string(), id.clone())
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            JumpFilter::Question(id) => format!("Question {id}"),
            JumpFilter::Trajectory(id) => format!("Trajectory {id}"),
        }
    }
}

/// Server-side sort columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Reward,
    StepCount,
    ExecTime,
    EpochId,
    IterationId,
    SampleId,
}

impl SortField {
    pub fn param(self) -> &'static str {
        match self {
            SortField::Reward => "reward",
            SortField::StepCount => "step_count",
            SortField::ExecTime => "exec_time",
            SortField::EpochId => "epoch_id",
            SortField::IterationId => "iteration_id",
            SortField::SampleId => "sample_id",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    /// Direction a newly selected sort column starts with.
    pub const DEFAULT: SortDir = SortDir::Desc;

    pub fn toggled(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: SortField,
    pub dir: SortDir,
}

impl SortSpec {
    /// Next sort after the user picks `field` while `current` is active.
    ///
    /// The same field flips direction; a different field starts at
    /// [`SortDir::DEFAULT`].
    pub fn next(current: Option<SortSpec>, field: SortField) -> SortSpec {
        match current {
            Some(spec) if spec.field == field => SortSpec {
                field,
                dir: spec.dir.toggled(),
            },
            _ => SortSpec {
                field,
                dir: SortDir::DEFAULT,
            },
        }
    }
}

/// Everything that determines which trajectories the list shows, except
/// the page number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryQuery {
    pub filters: FilterSet,
    pub jump: Option<JumpFilter>,
    pub search: String,
    pub sort: Option<SortSpec>,
}

impl TrajectoryQuery {
    /// Builds the parameters for one page.
    pub fn params(&self, page: u32, page_size: u32) -> QueryParams {
        let mut out: QueryParams = vec![
            ("page".to_string(), page.to_string()),
            ("pageSize".to_string(), page_size.to_string()),
        ];
        self.push_filter_params(&mut out);
        out
    }

    /// Filter, search and sort parameters without pagination.
    pub fn filter_params(&self) -> QueryParams {
        let mut out = QueryParams::new();
        self.push_filter_params(&mut out);
        out
    }

    fn push_filter_params(&self, out: &mut QueryParams) {
        match &self.jump {
            Some(jump) => out.push(jump.param()),
            None => self.filters.push_params(out),
        }

        let search = self.search.trim();
        if !search.is_empty() {
            out.push(("search".to_string(), search.to_string()));
        }

        if let Some(sort) = self.sort {
            out.push(("sort_by".to_string(), sort.field.param().to_string()));
            out.push(("sort_order".to_string(), sort.dir.as_str().to_string()));
        }
    }

    /// True when anything narrows the result set.
    pub fn is_narrowed(&self) -> bool {
        self.jump.is_some() || self.filters.has_active() || !self.search.trim().is_empty()
    }
}

/// Formats a float parameter. Integral values keep one decimal (`2.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &[(&str, &str)]) -> QueryParams {
        params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn equality_overrides_existing_range() {
        let mut filters = FilterSet::new();
        filters
            .apply(
                FilterField::Reward,
                FilterValue::Numeric(NumericFilter::range(Some(1.0), Some(3.0))),
            )
            .unwrap();
        filters
            .apply(FilterField::Reward, FilterValue::Numeric(NumericFilter::equals(2.0)))
            .unwrap();

        let query = TrajectoryQuery {
            filters,
            ..Default::default()
        };
        assert_eq!(query.filter_params(), pairs(&[("reward_exact", "2.0")]));
    }

    #[test]
    fn equality_without_exact_param_becomes_closed_range() {
        let mut filters = FilterSet::new();
        filters
            .apply(FilterField::StepCount, FilterValue::Numeric(NumericFilter::equals(4.0)))
            .unwrap();
        let query = TrajectoryQuery {
            filters,
            ..Default::default()
        };
        assert_eq!(
            query.filter_params(),
            pairs(&[("step_count_min", "4"), ("step_count_max", "4")])
        );
    }

    #[test]
    fn step_count_rejects_fractions() {
        let mut filters = FilterSet::new();
        assert_eq!(
            filters.apply(
                FilterField::StepCount,
                FilterValue::Numeric(NumericFilter::range(Some(2.5), None))
            ),
            Err(FilterError::NotWholeNumber {
                field: FilterField::StepCount,
                value: 2.5
            })
        );
        assert!(filters.is_empty());
    }

    fn reward_params(filters: FilterSet) -> QueryParams {
        TrajectoryQuery {
            filters,
            ..Default::default()
        }
        .filter_params()
    }

    #[test]
    fn range_replaces_previous_equality() {
        let mut filters = FilterSet::new();
        filters
            .apply(FilterField::Reward, FilterValue::Numeric(NumericFilter::equals(2.0)))
            .unwrap();
        filters
            .apply(
                FilterField::Reward,
                FilterValue::Numeric(NumericFilter::range(Some(1.0), Some(3.0))),
            )
            .unwrap();
        assert_eq!(
            reward_params(filters),
            pairs(&[("reward_min", "1.0"), ("reward_max", "3.0")])
        );
    }

    #[test]
    fn clearing_one_bound_drops_it_from_the_query() {
        let mut filters = FilterSet::new();
        filters
            .apply(
                FilterField::Reward,
                FilterValue::Numeric(NumericFilter::range(Some(1.0), Some(3.0))),
            )
            .unwrap();
        filters
            .apply(FilterField::Reward, FilterValue::Numeric(NumericFilter::range(Some(1.0), None)))
            .unwrap();
        assert_eq!(reward_params(filters.clone()), pairs(&[("reward_min", "1.0")]));

        // The old max no longer constrains a new min.
        filters
            .apply(FilterField::Reward, FilterValue::Numeric(NumericFilter::range(Some(5.0), None)))
            .unwrap();
        assert_eq!(reward_params(filters), pairs(&[("reward_min", "5.0")]));
    }

    #[test]
    fn jump_filter_suppresses_active_column_filters() {
        let mut filters = FilterSet::new();
        filters
            .apply(FilterField::TrainingId, FilterValue::Text("train_7".into()))
            .unwrap();
        filters.apply(FilterField::EpochId, FilterValue::Integer(3)).unwrap();
        let query = TrajectoryQuery {
            filters,
            jump: Some(JumpFilter::Question("q-42".into())),
            ..Default::default()
        };
        assert_eq!(query.filter_params(), pairs(&[("data_id", "q-42")]));
    }

    #[test]
    fn column_filters_combine_in_column_order_with_search_and_sort() {
        let mut filters = FilterSet::new();
        filters.apply(FilterField::EpochId, FilterValue::Integer(3)).unwrap();
        filters
            .apply(FilterField::TrainingId, FilterValue::Text(" train_7 ".into()))
            .unwrap();
        filters.apply(FilterField::IsSuccess, FilterValue::Bool(false)).unwrap();
        let query = TrajectoryQuery {
            filters,
            jump: None,
            search: "timeout".into(),
            sort: Some(SortSpec {
                field: SortField::Reward,
                dir: SortDir::Asc,
            }),
        };
        assert_eq!(
            query.params(2, 20),
            pairs(&[
                ("page", "2"),
                ("pageSize", "20"),
                ("training_id", "train_7"),
                ("epoch_id", "3"),
                ("is_success", "false"),
                ("search", "timeout"),
                ("sort_by", "reward"),
                ("sort_order", "asc"),
            ])
        );
    }

    #[test]
    fn inactive_and_empty_filters_are_not_sent() {
        let mut filters = FilterSet::new();
        filters.apply(FilterField::AgentName, FilterValue::Text("  ".into())).unwrap();
        filters.apply(FilterField::SampleId, FilterValue::Integer(1)).unwrap();
        filters.set_active(FilterField::SampleId, false);
        assert!(!filters.has_active());
        let query = TrajectoryQuery {
            filters,
            ..Default::default()
        };
        assert!(query.filter_params().is_empty());
    }

    #[test]
    fn termination_selection_uses_canonical_order() {
        let mut filters = FilterSet::new();
        filters
            .apply(
                FilterField::TerminationReason,
                FilterValue::Select(vec!["timeout".into(), "env_done".into()]),
            )
            .unwrap();
        let query = TrajectoryQuery {
            filters,
            ..Default::default()
        };
        assert_eq!(
            query.filter_params(),
            pairs(&[("termination_reason", "env_done,timeout")])
        );
    }

    #[test]
    fn rejects_wrong_kind_and_unknown_options() {
        let mut filters = FilterSet::new();
        assert!(matches!(
            filters.apply(FilterField::EpochId, FilterValue::Text("3".into())),
            Err(FilterError::KindMismatch { .. })
        ));
        assert!(matches!(
            filters.apply(
                FilterField::TerminationReason,
                FilterValue::Select(vec!["crashed".into()])
            ),
            Err(FilterError::UnknownOption { .. })
        ));
        assert!(matches!(
            filters.apply(
                FilterField::ExecTime,
                FilterValue::Numeric(NumericFilter::range(Some(5.0), Some(1.0)))
            ),
            Err(FilterError::InvertedRange { .. })
        ));
        assert!(filters.is_empty());
    }

    #[test]
    fn sort_cycle_toggles_same_field_and_resets_on_new_field() {
        let first = SortSpec::next(None, SortField::Reward);
        assert_eq!(first.dir, SortDir::Desc);
        let second = SortSpec::next(Some(first), SortField::Reward);
        assert_eq!(second.dir, SortDir::Asc);
        let third = SortSpec::next(Some(second), SortField::Reward);
        assert_eq!(third.dir, SortDir::Desc);
        let other = SortSpec::next(Some(second), SortField::StepCount);
        assert_eq!(
            other,
            SortSpec {
                field: SortField::StepCount,
                dir: SortDir::Desc
            }
        );
    }

    #[test]
    fn params_are_idempotent() {
        let mut filters = FilterSet::new();
        filters
            .apply(FilterField::Reward, FilterValue::Numeric(NumericFilter::range(Some(0.5), None)))
            .unwrap();
        let query = TrajectoryQuery {
            filters,
            search: "abc".into(),
            ..Default::default()
        };
        assert_eq!(query.params(1, 20), query.params(1, 20));
    }

    #[test]
    fn numbers_format_stably() {
        assert_eq!(format_number(2.0), "2.0");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-1.0), "-1.0");
    }
}
