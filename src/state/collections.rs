//! Mutable state shared by concurrent traversal branches
//!
//! These two collections are the only state branches mutate concurrently.
//! Both are guarded by a mutex; a poisoned lock is recovered rather than
//! propagated since neither collection can be left half-updated.

use crate::crawler::Record;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Outcome of trying to claim a URL for fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The URL was not seen before and is now marked; the caller owns its fetch
    New,
    /// Another branch already claimed this URL
    Seen,
    /// The run's page budget is used up; the URL was not marked
    BudgetExhausted,
}

/// Set of URLs already dispatched for fetching in one run
///
/// Grows monotonically. Membership check and insertion happen under one lock,
/// so each URL is claimed by exactly one branch.
#[derive(Debug)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
    max_pages: usize,
}

impl VisitedSet {
    /// Creates an empty set that accepts at most `max_pages` URLs
    pub fn new(max_pages: usize) -> Self {
        Self {
            urls: Mutex::new(HashSet::new()),
            max_pages,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically checks and marks a URL key
    pub fn claim(&self, key: &str) -> Claim {
        let mut urls = self.lock();

        if urls.contains(key) {
            Claim::Seen
        } else if urls.len() >= self.max_pages {
            Claim::BudgetExhausted
        } else {
            urls.insert(key.to_string());
            Claim::New
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Append-only aggregate of every record found by every branch
#[derive(Debug, Default)]
pub struct ResultCollection {
    records: Mutex<Vec<Record>>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a branch's records under exclusive access
    pub fn extend(&self, records: Vec<Record>) {
        if records.is_empty() {
            return;
        }
        self.lock().extend(records);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Takes the finalized records out, leaving the collection empty
    pub fn take(&self) -> Vec<Record> {
        std::mem::take(&mut *self.lock())
    }
}
