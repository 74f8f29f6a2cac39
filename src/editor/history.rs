use std::collections::VecDeque;
use tracing::debug;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint<T> {
    pub state: T,
    pub label: String,
    /// Consecutive checkpoints with the same non-empty key collapse into one step
    pub squash_key: Option<String>,
}

impl<T> Checkpoint<T> {
    pub fn new(state: T, label: impl Into<String>) -> Self {
        Self {
            state,
            label: label.into(),
            squash_key: None,
        }
    }

    pub fn squash(mut self, key: impl Into<String>) -> Self {
        self.squash_key = Some(key.into());
        self
    }

    fn squashes_into(&self, head: &Checkpoint<T>) -> bool {
        match (&self.squash_key, &head.squash_key) {
            (Some(a), Some(b)) => !a.is_empty() && a == b,
            _ => false,
        }
    }
}

/// Bounded undo/redo log. `head` points at the current state.
///
/// Not shared between sessions, each editing session owns one.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<Checkpoint<T>>,
    head: usize,
    limit: usize,
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new(initial: Checkpoint<T>, limit: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            head: 0,
            limit: limit.max(1),
        }
    }

    pub fn with_default_limit(initial: Checkpoint<T>) -> Self {
        Self::new(initial, DEFAULT_HISTORY_LIMIT)
    }

    pub fn current(&self) -> &Checkpoint<T> {
        &self.entries[self.head]
    }

    pub fn state(&self) -> &T {
        &self.current().state
    }

    /// Commits one edit and returns whether anything changed.
    ///
    /// `mutator` returning `None`, or a state equal to the current one, is a no-op.
    pub fn commit<F>(&mut self, mutator: F) -> bool
    where
        F: FnOnce(&T) -> Option<Checkpoint<T>>,
    {
        let Some(checkpoint) = mutator(self.state()) else {
            return false;
        };
        if checkpoint.state == *self.state() {
            return false;
        }

        // committing after undo drops the redo branch
        self.entries.truncate(self.head + 1);

        if checkpoint.squashes_into(self.current()) {
            debug!(label = %checkpoint.label, "Squashing checkpoint into head");
            self.entries[self.head] = checkpoint;
            return true;
        }

        self.entries.push_back(checkpoint);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.head = self.entries.len() - 1;
        true
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.head -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.head += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.head > 0
    }

    pub fn can_redo(&self) -> bool {
        self.head + 1 < self.entries.len()
    }

    /// Drops everything and starts over from `initial`, used when a new document is loaded.
    pub fn reset(&mut self, initial: Checkpoint<T>) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.head = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.label.as_str())
    }
}
