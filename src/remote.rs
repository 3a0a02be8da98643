//! Fetch state for a single read-only view.
//!
//! Each panel owns one [`Remote`]. Starting a fetch hands out a sequence
//! number; only the response carrying the newest number is committed, so a
//! slow reply to a superseded request can never overwrite fresher data.

use crate::transport::ApiError;

/// Sequence number identifying one issued request.
pub type Seq = u64;

#[derive(Debug, Clone)]
pub struct Remote<T> {
    data: Option<T>,
    error: Option<String>,
    loading: bool,
    issued: Seq,
    requested: bool,
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Remote<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            issued: 0,
            requested: false,
        }
    }

    /// True until the first fetch has been started.
    pub fn needs_load(&self) -> bool {
        !self.requested
    }

    /// Starts a fetch and returns its sequence number.
    pub fn begin(&mut self) -> Seq {
        self.issued += 1;
        self.loading = true;
        self.requested = true;
        self.issued
    }

    /// Commits a response. Returns false when `seq` is stale.
    ///
    /// A failure clears the data: the view shows "no data" rather than a
    /// stale value.
    pub fn commit(&mut self, seq: Seq, result: Result<T, ApiError>) -> bool {
        if seq != self.issued {
            tracing::debug!(seq, latest = self.issued, "discarding stale response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(value) => {
                self.data = Some(value);
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "fetch failed; showing no data");
                self.data = None;
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Forgets everything; any in-flight response becomes stale.
    pub fn reset(&mut self) {
        self.issued += 1;
        self.data = None;
        self.error = None;
        self.loading = false;
        self.requested = false;
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn latest_seq(&self) -> Seq {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_newest_response_commits() {
        let mut remote: Remote<u32> = Remote::new();
        assert!(remote.needs_load());
        let first = remote.begin();
        let second = remote.begin();
        assert!(remote.commit(second, Ok(2)));
        assert!(!remote.commit(first, Ok(1)));
        assert_eq!(remote.data(), Some(&2));
        assert!(!remote.is_loading());
    }

    #[test]
    fn failure_replaces_data_with_nothing() {
        let mut remote: Remote<u32> = Remote::new();
        let seq = remote.begin();
        remote.commit(seq, Ok(7));
        let seq = remote.begin();
        remote.commit(
            seq,
            Err(ApiError::Status {
                code: 500,
                message: "boom".into(),
            }),
        );
        assert_eq!(remote.data(), None);
        assert_eq!(remote.error(), Some("HTTP 500: boom"));
    }

    #[test]
    fn reset_discards_in_flight_response() {
        let mut remote: Remote<u32> = Remote::new();
        let seq = remote.begin();
        remote.reset();
        assert!(!remote.commit(seq, Ok(1)));
        assert!(remote.needs_load());
    }
}
