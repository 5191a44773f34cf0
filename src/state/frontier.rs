use crate::state::PageState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// The set of URLs claimed during a single crawl
///
/// Every URL is inserted at most once. Deciding whether a URL is new and
/// recording it happen under the same shard lock, so when several workers race
/// on the same unseen URL exactly one of them wins the claim. The store only
/// grows; each entry additionally tracks the [`PageState`] the page ended in.
///
/// Stores are plain values rather than process-wide singletons, so independent
/// crawls in the same process never share state.
#[derive(Debug, Default)]
pub struct FrontierStore {
    pages: DashMap<String, PageState>,
}

impl FrontierStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not claimed before and is now recorded as [`PageState::Claimed`]
    /// * `false` - The URL had already been claimed
    pub fn try_claim(&self, url: &str) -> bool {
        // Fast path for the common case of an already-known link
        if self.pages.contains_key(url) {
            return false;
        }

        match self.pages.entry(url.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(PageState::Claimed);
                true
            }
        }
    }

    /// Records the state a claimed page ended in
    ///
    /// Unclaimed URLs are ignored; marking never adds to the store.
    pub fn mark(&self, url: &str, state: PageState) {
        if let Some(mut entry) = self.pages.get_mut(url) {
            *entry = state;
        }
    }

    /// Returns the recorded state of a URL, if it has been claimed
    pub fn state_of(&self, url: &str) -> Option<PageState> {
        self.pages.get(url).map(|entry| *entry.value())
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Returns every claimed URL, sorted
    ///
    /// Meant to be called after the crawl has quiesced; under concurrent
    /// mutation the result is a point-in-time view per shard.
    pub fn snapshot(&self) -> Vec<String> {
        self.snapshot_where(|_| true)
    }

    /// Returns the claimed URLs whose state satisfies `predicate`, sorted
    pub fn snapshot_where<F>(&self, predicate: F) -> Vec<String>
    where
        F: Fn(PageState) -> bool,
    {
        let mut urls: Vec<String> = self
            .pages
            .iter()
            .filter(|entry| predicate(*entry.value()))
            .map(|entry| entry.key().clone())
            .collect();
        urls.sort();
        urls
    }

    /// Counts the claimed URLs currently in the given state
    pub fn count_by_state(&self, state: PageState) -> usize {
        self.pages
            .iter()
            .filter(|entry| *entry.value() == state)
            .count()
    }
}
