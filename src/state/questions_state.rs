//! Questions table state.

use rtraj::pagination;
use rtraj::{Page, Question, Remote, Seq};

#[derive(Debug)]
pub struct QuestionsState {
    page: u32,
    page_size: u32,
    pub questions: Remote<Page<Question>>,
}

impl QuestionsState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            questions: Remote::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Moves to page `n` (clamped once a total is known) and starts the fetch.
    pub fn go_to(&mut self, n: u32) -> (u32, Seq) {
        self.page = match self.questions.data() {
            Some(page) => pagination::clamp_page(n, page.total, self.page_size),
            None => n.max(1),
        };
        (self.page, self.questions.begin())
    }
}
