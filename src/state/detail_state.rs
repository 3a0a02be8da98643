//! Trajectory detail view state.

use rtraj::{ApiError, Remote, Seq, TrajectoryDetail};

/// A write to the open trajectory's annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailEdit {
    Notes(String),
    AddTag(String),
    RemoveTag(String),
}

impl DetailEdit {
    fn describe(&self) -> &'static str {
        match self {
            DetailEdit::Notes(_) => "Saving notes",
            DetailEdit::AddTag(_) => "Adding tag",
            DetailEdit::RemoveTag(_) => "Removing tag",
        }
    }
}

#[derive(Debug, Default)]
pub struct DetailState {
    trajectory_id: Option<String>,
    pub detail: Remote<TrajectoryDetail>,
    bookmark_pending: bool,
    bookmark_error: Option<String>,
    /// Notes as edited, synced from the server copy on every load.
    pub notes_draft: String,
    pub tag_input: String,
    edit_pending: bool,
    edit_error: Option<String>,
}

impl DetailState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trajectory_id(&self) -> Option<&str> {
        self.trajectory_id.as_deref()
    }

    /// Starts loading `trajectory_id`, dropping whatever was shown before.
    pub fn open(&mut self, trajectory_id: String) -> Seq {
        self.detail.reset();
        self.bookmark_pending = false;
        self.bookmark_error = None;
        self.notes_draft.clear();
        self.tag_input.clear();
        self.edit_pending = false;
        self.edit_error = None;
        self.trajectory_id = Some(trajectory_id);
        self.detail.begin()
    }

    /// Commits a detail fetch and resets the notes editor to the loaded notes.
    pub fn commit(&mut self, seq: Seq, result: Result<TrajectoryDetail, ApiError>) -> bool {
        if !self.detail.commit(seq, result) {
            return false;
        }
        if let Some(detail) = self.detail.data() {
            self.notes_draft = detail.notes.clone();
        }
        true
    }

    /// Refetches the open trajectory.
    pub fn reload(&mut self) -> Option<(String, Seq)> {
        let id = self.trajectory_id.clone()?;
        Some((id, self.detail.begin()))
    }

    pub fn bookmark_pending(&self) -> bool {
        self.bookmark_pending
    }

    pub fn bookmark_error(&self) -> Option<&str> {
        self.bookmark_error.as_deref()
    }

    /// Marks a bookmark toggle as in flight. Returns false if one already is.
    pub fn begin_bookmark(&mut self) -> bool {
        if self.bookmark_pending {
            return false;
        }
        self.bookmark_pending = true;
        self.bookmark_error = None;
        true
    }

    /// Applies the server's answer to a bookmark toggle for `trajectory_id`.
    pub fn finish_bookmark(&mut self, trajectory_id: &str, outcome: Result<bool, ApiError>) {
        if self.trajectory_id.as_deref() != Some(trajectory_id) {
            return;
        }
        self.bookmark_pending = false;
        match outcome {
            Ok(flag) => {
                if let Some(detail) = self.detail.data_mut() {
                    detail.summary.is_bookmarked = flag;
                }
            }
            Err(err) => self.bookmark_error = Some(err.user_message()),
        }
    }
}

impl DetailState {
    pub fn edit_pending(&self) -> bool {
        self.edit_pending
    }

    pub fn edit_error(&self) -> Option<&str> {
        self.edit_error.as_deref()
    }

    /// Whether the notes editor differs from the saved notes.
    pub fn notes_dirty(&self) -> bool {
        self.detail.data().is_some_and(|d| d.notes != self.notes_draft)
    }

    /// Marks an annotation write as in flight. Returns false while another
    /// one is running or no trajectory is open.
    pub fn begin_edit(&mut self) -> bool {
        if self.edit_pending || self.trajectory_id.is_none() {
            return false;
        }
        self.edit_pending = true;
        self.edit_error = None;
        true
    }

    /// Applies the server's answer to an annotation write.
    ///
    /// Adding a tag returns the server's full tag list, which replaces ours.
    pub fn finish_edit(
        &mut self,
        trajectory_id: &str,
        edit: DetailEdit,
        outcome: Result<Option<Vec<String>>, ApiError>,
    ) {
        if self.trajectory_id.as_deref() != Some(trajectory_id) {
            return;
        }
        self.edit_pending = false;
        let tags = match outcome {
            Ok(tags) => tags,
            Err(err) => {
                self.edit_error = Some(format!("{} failed: {}", edit.describe(), err.user_message()));
                return;
            }
        };
        let Some(detail) = self.detail.data_mut() else {
            return;
        };
        match edit {
            DetailEdit::Notes(notes) => detail.notes = notes,
            DetailEdit::AddTag(tag) => {
                match tags {
                    Some(tags) => detail.tags = tags,
                    None if !detail.tags.contains(&tag) => detail.tags.push(tag),
                    None => {}
                }
                self.tag_input.clear();
            }
            DetailEdit::RemoveTag(tag) => detail.tags.retain(|t| *t != tag),
        }
    }
}
