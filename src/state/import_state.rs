//! Import view state.

use rtraj::model::ImportHistoryEntry;
use rtraj::{ApiError, ImportFileType, ImportTracker, Remote};

pub const HISTORY_LIMIT: u32 = 20;

#[derive(Debug, Default)]
pub struct ImportViewState {
    pub tracker: ImportTracker,
    pub path_input: String,
    pub file_type: ImportFileType,
    pub allowed_dirs: Remote<Vec<String>>,
    pub history: Remote<Vec<ImportHistoryEntry>>,
    /// Confirmation checkbox guarding the clear-data button.
    pub clear_confirmed: bool,
    clear_pending: bool,
    clear_outcome: Option<Result<String, String>>,
}

impl ImportViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path and guesses the file type from its extension.
    pub fn set_path(&mut self, path: String) {
        self.file_type = ImportFileType::from_path(&path);
        self.path_input = path;
    }

    pub fn clear_pending(&self) -> bool {
        self.clear_pending
    }

    pub fn clear_outcome(&self) -> Option<&Result<String, String>> {
        self.clear_outcome.as_ref()
    }

    /// Starts a clear-data request. Requires the confirmation box.
    pub fn begin_clear(&mut self) -> bool {
        if !self.clear_confirmed || self.clear_pending {
            return false;
        }
        self.clear_pending = true;
        self.clear_outcome = None;
        true
    }

    pub fn finish_clear(&mut self, outcome: Result<String, ApiError>) {
        self.clear_pending = false;
        self.clear_confirmed = false;
        self.clear_outcome = Some(outcome.map_err(|err| err.user_message()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_requires_confirmation_and_resets_it() {
        let mut state = ImportViewState::new();
        assert!(!state.begin_clear());
        state.clear_confirmed = true;
        assert!(state.begin_clear());
        assert!(!state.begin_clear());
        state.finish_clear(Ok("All data cleared".into()));
        assert!(!state.clear_confirmed);
        assert_eq!(state.clear_outcome(), Some(&Ok("All data cleared".to_string())));
    }

    #[test]
    fn path_sets_file_type() {
        let mut state = ImportViewState::new();
        state.set_path("/data/run.JSONL".into());
        assert_eq!(state.file_type, ImportFileType::Jsonl);
    }
}
