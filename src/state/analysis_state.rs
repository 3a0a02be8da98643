//! Analysis charts state.

use rtraj::model::{
    ProcessRewardCorrelation, RewardCategoryStats, TerminationStats, ToolReturnStats,
    UnexpectedToolContexts,
};
use rtraj::Remote;

pub const DEFAULT_CONTEXT_LIMIT: u32 = 20;

#[derive(Debug)]
pub struct AnalysisState {
    pub termination: Remote<TerminationStats>,
    pub rewards: Remote<RewardCategoryStats>,
    pub tool_returns: Remote<ToolReturnStats>,
    pub correlation: Remote<ProcessRewardCorrelation>,
    pub contexts: Remote<UnexpectedToolContexts>,
    /// Tool-return category the context table is narrowed to.
    pub context_category: Option<String>,
    pub context_limit: u32,
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisState {
    pub fn new() -> Self {
        Self {
            termination: Remote::new(),
            rewards: Remote::new(),
            tool_returns: Remote::new(),
            correlation: Remote::new(),
            contexts: Remote::new(),
            context_category: None,
            context_limit: DEFAULT_CONTEXT_LIMIT,
        }
    }

    pub fn needs_load(&self) -> bool {
        self.termination.needs_load()
    }
}
