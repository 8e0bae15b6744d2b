//! Linear snapshot history with a cursor.
//!
//! Every entry is a full deep copy of the state. Pushing after an undo
//! discards the redo branch. Growth is unbounded.

use web_time::{Duration, Instant};

/// Snapshot undo/redo stack.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    last_commit: Option<(String, Instant)>,
}

impl<T: Clone> History<T> {
    /// Start a history whose base entry is `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            last_commit: None,
        }
    }

    /// Push a snapshot, truncating anything after the cursor.
    pub fn snapshot(&mut self, state: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(state);
        self.cursor = self.entries.len() - 1;
        self.last_commit = None;
        tracing::debug!(cursor = self.cursor, "history snapshot");
    }

    /// Push a snapshot, or replace the top one when the previous commit used
    /// the same `key` less than `window` ago and nothing was undone since.
    ///
    /// Returns `true` when the top entry was replaced.
    pub fn commit_coalesced(&mut self, state: T, key: &str, now: Instant, window: Duration) -> bool {
        let at_top = self.cursor + 1 == self.entries.len();
        let merge = at_top
            && self.cursor > 0
            && !window.is_zero()
            && self
                .last_commit
                .as_ref()
                .is_some_and(|(last_key, at)| last_key == key && now.saturating_duration_since(*at) < window);

        if merge {
            self.entries[self.cursor] = state;
            tracing::debug!(cursor = self.cursor, key, "history coalesced");
        } else {
            self.snapshot(state);
        }
        self.last_commit = Some((key.to_string(), now));
        merge
    }

    /// Step back one entry and return it, or `None` at the base.
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.last_commit = None;
        tracing::debug!(cursor = self.cursor, "undo");
        self.entries.get(self.cursor)
    }

    /// Step forward one entry and return it, or `None` at the top.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.last_commit = None;
        tracing::debug!(cursor = self.cursor, "redo");
        self.entries.get(self.cursor)
    }

    /// Whether [`History::undo`] would move.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`History::redo`] would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Drop every entry and start over from `state`.
    pub fn reset(&mut self, state: T) {
        self.entries.clear();
        self.entries.push(state);
        self.cursor = 0;
        self.last_commit = None;
    }

    /// The entry under the cursor.
    #[must_use]
    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    /// Cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; a history holds at least its base entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
