use crate::store::Item;

/// Lifecycle of one paginated page session.
///
/// State is session-local: a reload builds a fresh session back at `Idle`
/// with cursor 0. Nothing persists per viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No batch requested yet.
    Idle,
    /// At least one batch emitted; more remain.
    Rendered,
    /// Cursor has reached the end; further requests yield empty batches.
    Exhausted,
}

/// Fixed-size pagination over an already-curated, in-memory sequence.
///
/// "Load more" is a synchronous re-slice — never a new fetch. The cursor
/// only moves forward; requesting past the end is well-defined and returns
/// an empty batch every time.
#[derive(Debug)]
pub struct PageSession {
    items: Vec<Item>,
    page_size: usize,
    cursor: usize,
    state: SessionState,
}

impl PageSession {
    pub fn new(items: Vec<Item>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            cursor: 0,
            state: SessionState::Idle,
        }
    }

    /// Emits the next batch and advances the cursor.
    ///
    /// Batches are full pages except possibly the last; once the view is
    /// exhausted every further call returns an empty slice.
    pub fn next_batch(&mut self) -> &[Item] {
        if self.state == SessionState::Exhausted {
            return &[];
        }

        let start = self.cursor;
        let end = (start + self.page_size).min(self.items.len());
        self.cursor = end;
        self.state = if self.cursor >= self.items.len() {
            SessionState::Exhausted
        } else {
            SessionState::Rendered
        };
        &self.items[start..end]
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == SessionState::Exhausted
    }

    /// Back to `Idle`, cursor 0 — the reload semantics.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.state = SessionState::Idle;
    }
}
