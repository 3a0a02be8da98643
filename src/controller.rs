//! Trajectory list controller.
//!
//! Owns the filter, sort, search, pagination and jump-filter state of the
//! trajectory list and the last committed page of results. It performs no
//! I/O: every state change returns the [`FetchRequest`] the caller must run,
//! and the caller hands the outcome back through
//! [`TrajectoryListController::apply_response`].
//!
//! Invariants:
//! - any change to filters, sort, search or jump filter resets to page 1
//!   and issues a fetch;
//! - only the response to the newest issued request is committed;
//! - a failed fetch shows an empty page with total 0, never stale rows.

use std::time::{Duration, Instant};

use crate::debounce::Debouncer;
use crate::model::{Page, Trajectory};
use crate::pagination;
use crate::query::{
    FilterError, FilterField, FilterSet, FilterValue, JumpFilter, QueryParams, SortField,
    SortSpec, TrajectoryQuery,
};
use crate::remote::Seq;
use crate::transport::ApiError;

/// Records per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Quiet period before a typed search term is sent.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// A page fetch the caller must execute.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub seq: Seq,
    pub page: u32,
    pub params: QueryParams,
}

/// The page currently displayed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListResult {
    pub trajectories: Vec<Trajectory>,
    pub total: u64,
    /// False until the first response (success or failure) is committed.
    pub loaded: bool,
}

#[derive(Debug, Clone)]
pub struct TrajectoryListController {
    query: TrajectoryQuery,
    search: Debouncer<String>,
    /// Text as typed, ahead of the debounced term in `query.search`.
    search_input: String,
    page: u32,
    page_size: u32,
    issued: Seq,
    loading: bool,
    result: ListResult,
}

impl Default for TrajectoryListController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl TrajectoryListController {
    pub fn new(page_size: u32, search_debounce: Duration) -> Self {
        Self {
            query: TrajectoryQuery::default(),
            search: Debouncer::new(search_debounce),
            search_input: String::new(),
            page: 1,
            page_size: page_size.max(1),
            issued: 0,
            loading: false,
            result: ListResult::default(),
        }
    }

    // ===== Queries =====

    pub fn query(&self) -> &TrajectoryQuery {
        &self.query
    }

    pub fn filters(&self) -> &FilterSet {
        &self.query.filters
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.query.sort
    }

    pub fn jump(&self) -> Option<&JumpFilter> {
        self.query.jump.as_ref()
    }

    /// The search box contents, which may not have been sent yet.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// The search term included in queries.
    pub fn applied_search(&self) -> &str {
        &self.query.search
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_count(&self) -> u32 {
        pagination::page_count(self.result.total, self.page_size)
    }

    pub fn result(&self) -> &ListResult {
        &self.result
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the generic filter panel should be offered. A jump filter
    /// suppresses it.
    pub fn filter_panel_enabled(&self) -> bool {
        self.query.jump.is_none()
    }

    /// True when anything narrows the results; drives the "Clear filters"
    /// shortcut on the empty state.
    pub fn has_constraints(&self) -> bool {
        self.query.is_narrowed()
    }

    /// Parameters for `page` under the current state.
    pub fn params_for(&self, page: u32) -> QueryParams {
        self.query.params(page, self.page_size)
    }

    // ===== Fetching =====

    /// Requests `page` with the current parameters.
    pub fn fetch_page(&mut self, page: u32) -> FetchRequest {
        let page = page.max(1);
        self.page = page;
        self.issued += 1;
        self.loading = true;
        let request = FetchRequest {
            seq: self.issued,
            page,
            params: self.params_for(page),
        };
        tracing::debug!(seq = request.seq, page, "trajectory list fetch");
        request
    }

    /// Fetches page `n` without touching any other state. Out-of-range pages
    /// are clamped once a total is known.
    pub fn change_page(&mut self, n: u32) -> FetchRequest {
        let page = if self.result.loaded {
            pagination::clamp_page(n, self.result.total, self.page_size)
        } else {
            n.max(1)
        };
        self.fetch_page(page)
    }

    fn refetch_from_first_page(&mut self) -> FetchRequest {
        self.fetch_page(1)
    }

    /// Commits a response. Returns false when it answers a superseded request.
    pub fn apply_response(&mut self, seq: Seq, outcome: Result<Page<Trajectory>, ApiError>) -> bool {
        if seq != self.issued {
            tracing::debug!(seq, latest = self.issued, "discarding stale trajectory page");
            return false;
        }
        self.loading = false;
        self.result = match outcome {
            Ok(page) => ListResult {
                trajectories: page.data,
                total: page.total,
                loaded: true,
            },
            Err(err) => {
                tracing::warn!(error = %err, "trajectory fetch failed; showing empty page");
                ListResult {
                    trajectories: Vec::new(),
                    total: 0,
                    loaded: true,
                }
            }
        };
        true
    }

    // ===== Filters =====

    /// Applies a column filter, marks it active and refetches page 1.
    pub fn apply_filter(&mut self, field: FilterField, value: FilterValue) -> Result<FetchRequest, FilterError> {
        self.query.filters.apply(field, value)?;
        Ok(self.refetch_from_first_page())
    }

    /// Toggles whether a stored filter participates in the query.
    pub fn set_filter_active(&mut self, field: FilterField, active: bool) -> Option<FetchRequest> {
        if self.query.filters.set_active(field, active) {
            Some(self.refetch_from_first_page())
        } else {
            None
        }
    }

    pub fn clear_filter(&mut self, field: FilterField) -> FetchRequest {
        self.query.filters.remove(field);
        self.refetch_from_first_page()
    }

    /// Removes every filter, the sort, the search term and the jump filter.
    pub fn clear_all(&mut self) -> FetchRequest {
        self.clear_state();
        self.refetch_from_first_page()
    }

    fn clear_state(&mut self) {
        self.query = TrajectoryQuery::default();
        self.search.cancel();
        self.search_input.clear();
    }

    // ===== Sort =====

    /// Sorts by `field`; picking the active field again flips direction.
    pub fn set_sort(&mut self, field: SortField) -> FetchRequest {
        self.query.sort = Some(SortSpec::next(self.query.sort, field));
        self.refetch_from_first_page()
    }

    /// Returns to the server's default order.
    pub fn clear_sort(&mut self) -> FetchRequest {
        self.query.sort = None;
        self.refetch_from_first_page()
    }

    // ===== Search =====

    /// Records typed search text. Nothing is fetched until
    /// [`poll_search`](Self::poll_search) observes a quiet period.
    pub fn set_search(&mut self, term: impl Into<String>, now: Instant) {
        let term = term.into();
        self.search_input = term.clone();
        self.search.push(term, now);
    }

    /// Releases the debounced search term. Fetches only when the settled term
    /// differs from the one already applied.
    pub fn poll_search(&mut self, now: Instant) -> Option<FetchRequest> {
        let term = self.search.poll(now)?;
        let term = term.trim().to_string();
        if term == self.query.search {
            return None;
        }
        self.query.search = term;
        Some(self.refetch_from_first_page())
    }

    /// Time until a pending search term settles, for scheduling a repaint.
    pub fn search_pending_for(&self, now: Instant) -> Option<Duration> {
        self.search.remaining(now)
    }

    // ===== Navigation =====

    /// Restores the initial state and issues the first fetch.
    pub fn reset(&mut self) -> FetchRequest {
        self.clear_state();
        self.result = ListResult::default();
        self.refetch_from_first_page()
    }

    /// Arrives from another view with a single identity filter. Replaces the
    /// whole state; generic filters stay off while the jump is active.
    pub fn seed_jump(&mut self, jump: JumpFilter) -> FetchRequest {
        self.clear_state();
        self.query.jump = Some(jump);
        self.refetch_from_first_page()
    }

    /// Arrives from another view with preset column filters. Replaces the
    /// whole state. Invalid filters are skipped and reported.
    pub fn seed_filters(
        &mut self,
        filters: impl IntoIterator<Item = (FilterField, FilterValue)>,
    ) -> (FetchRequest, Vec<FilterError>) {
        self.clear_state();
        let mut errors = Vec::new();
        for (field, value) in filters {
            if let Err(err) = self.query.filters.apply(field, value) {
                errors.push(err);
            }
        }
        (self.refetch_from_first_page(), errors)
    }

    /// Drops the jump filter and returns to generic filtering.
    pub fn clear_jump(&mut self) -> Option<FetchRequest> {
        self.query.jump.take()?;
        Some(self.refetch_from_first_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::NumericFilter;

    fn page_of(n: usize, total: u64) -> Page<Trajectory> {
        Page {
            data: (0..n)
                .map(|i| Trajectory {
                    trajectory_id: format!("t{i}"),
                    ..Default::default()
                })
                .collect(),
            total,
            page: None,
            page_size: None,
        }
    }

    fn param<'a>(request: &'a FetchRequest, name: &str) -> Option<&'a str> {
        request
            .params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn every_parameter_change_resets_to_first_page() {
        let mut list = TrajectoryListController::default();
        let req = list.fetch_page(1);
        list.apply_response(req.seq, Ok(page_of(20, 100)));
        assert_eq!(list.change_page(4).page, 4);

        let req = list
            .apply_filter(FilterField::AgentName, FilterValue::Text("react".into()))
            .unwrap();
        assert_eq!((req.page, list.page()), (1, 1));

        list.change_page(3);
        assert_eq!(list.set_sort(SortField::Reward).page, 1);

        list.change_page(3);
        let now = Instant::now();
        list.set_search("abc", now);
        let req = list.poll_search(now + DEFAULT_SEARCH_DEBOUNCE).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(param(&req, "search"), Some("abc"));
    }

    #[test]
    fn change_page_keeps_parameters_and_clamps() {
        let mut list = TrajectoryListController::default();
        list.set_sort(SortField::StepCount);
        let req = list.fetch_page(1);
        list.apply_response(req.seq, Ok(page_of(20, 45)));
        let req = list.change_page(99);
        assert_eq!(req.page, 3);
        assert_eq!(param(&req, "sort_by"), Some("step_count"));
        assert_eq!(param(&req, "sort_order"), Some("desc"));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut list = TrajectoryListController::default();
        let slow = list.fetch_page(1);
        let fast = list
            .apply_filter(FilterField::IsSuccess, FilterValue::Bool(true))
            .unwrap();
        assert!(list.apply_response(fast.seq, Ok(page_of(2, 2))));
        assert!(!list.apply_response(slow.seq, Ok(page_of(20, 500))));
        assert_eq!(list.result().total, 2);
        assert!(!list.is_loading());
    }

    #[test]
    fn failure_shows_empty_page() {
        let mut list = TrajectoryListController::default();
        let req = list.fetch_page(1);
        list.apply_response(req.seq, Ok(page_of(5, 5)));
        let req = list.fetch_page(1);
        list.apply_response(
            req.seq,
            Err(ApiError::Status {
                code: 500,
                message: "boom".into(),
            }),
        );
        assert_eq!(list.result().trajectories.len(), 0);
        assert_eq!(list.result().total, 0);
        assert!(list.result().loaded);
    }

    #[test]
    fn jump_hides_filter_panel_until_cleared() {
        let mut list = TrajectoryListController::default();
        list.apply_filter(FilterField::EpochId, FilterValue::Integer(2))
            .unwrap();
        let req = list.seed_jump(JumpFilter::Question("q1".into()));
        assert!(!list.filter_panel_enabled());
        assert_eq!(param(&req, "data_id"), Some("q1"));
        assert_eq!(param(&req, "epoch_id"), None);

        let req = list.clear_jump().unwrap();
        assert!(list.filter_panel_enabled());
        assert_eq!(param(&req, "data_id"), None);
        assert!(list.clear_jump().is_none());
    }

    #[test]
    fn seeding_filters_replaces_previous_state() {
        let mut list = TrajectoryListController::default();
        list.set_sort(SortField::Reward);
        list.seed_jump(JumpFilter::Trajectory("t1".into()));
        let (req, errors) = list.seed_filters([
            (FilterField::TrainingId, FilterValue::Text("train_7".into())),
            (FilterField::EpochId, FilterValue::Integer(3)),
            (FilterField::EpochId, FilterValue::Bool(true)),
        ]);
        assert_eq!(errors.len(), 1);
        assert!(list.jump().is_none());
        assert!(list.sort().is_none());
        assert_eq!(
            req.params,
            vec![
                ("page".to_string(), "1".to_string()),
                ("pageSize".to_string(), "20".to_string()),
                ("training_id".to_string(), "train_7".to_string()),
                ("epoch_id".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn deactivating_a_filter_refetches_without_it() {
        let mut list = TrajectoryListController::default();
        list.apply_filter(
            FilterField::Reward,
            FilterValue::Numeric(NumericFilter::range(Some(1.0), None)),
        )
        .unwrap();
        let req = list.set_filter_active(FilterField::Reward, false).unwrap();
        assert_eq!(param(&req, "reward_min"), None);
        assert!(list.filters().get(FilterField::Reward).is_some());
        assert!(list.set_filter_active(FilterField::ExecTime, true).is_none());
    }

    #[test]
    fn unchanged_search_term_does_not_refetch() {
        let mut list = TrajectoryListController::default();
        let now = Instant::now();
        list.set_search("  ", now);
        assert!(list.poll_search(now + DEFAULT_SEARCH_DEBOUNCE).is_none());
        assert_eq!(list.search_input(), "  ");
    }
}
