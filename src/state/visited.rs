use crate::state::PageState;
use crate::MirrorError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Set of normalized page URLs already claimed by the crawl in this run
///
/// The set only grows: a URL that failed stays in it, which is what keeps a
/// cyclic link graph from being re-rendered. Keys are expected to be
/// produced by [`crate::crawler::mirror_key`], so every URL variant that
/// lands in the same local file is one page.
#[derive(Debug, Default)]
pub struct VisitedSet {
    pages: Mutex<HashMap<String, PageState>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key` for processing
    ///
    /// Returns `true` and records `InProgress` if the URL was unseen, `false`
    /// if it is already in the set (in any state).
    pub fn begin(&self, key: &str) -> bool {
        let mut pages = self.lock();
        if pages.contains_key(key) {
            return false;
        }
        pages.insert(key.to_string(), PageState::InProgress);
        true
    }

    /// Records the terminal state of a page previously claimed with [`begin`]
    ///
    /// [`begin`]: VisitedSet::begin
    pub fn finish(&self, key: &str, state: PageState) -> Result<(), MirrorError> {
        let mut pages = self.lock();
        let current = pages.get(key).copied().unwrap_or(PageState::Unvisited);

        if !current.can_transition_to(state) {
            return Err(MirrorError::InvalidTransition {
                from: current,
                to: state,
            });
        }

        pages.insert(key.to_string(), state);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Current state of a page, `Unvisited` if never claimed
    pub fn state(&self, key: &str) -> PageState {
        self.lock().get(key).copied().unwrap_or(PageState::Unvisited)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of pages currently in `state`
    pub fn count(&self, state: PageState) -> usize {
        self.lock().values().filter(|s| **s == state).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PageState>> {
        // A poisoned set is still a consistent set: entries are whole inserts.
        self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
