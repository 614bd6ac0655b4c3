//! Term index: run-local bidirectional term ↔ number mapping.
//!
//! The navigator prints a small number next to every term it shows so the
//! user can type `7` instead of a long concept or predicate name. Numbers are
//! handed out in first-seen order starting at 1, are never reused within a
//! run, and are not persisted.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Bidirectional mapping between terms and their session numbers.
pub struct TermIndex {
    next: AtomicU64,
    /// Forward map: term → number.
    number_by_term: DashMap<String, u64>,
    /// Reverse map: number → term.
    term_by_number: DashMap<u64, String>,
}

impl TermIndex {
    /// Create an empty index; the first term seen gets number 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            number_by_term: DashMap::new(),
            term_by_number: DashMap::new(),
        }
    }

    /// The number of `term`, allocating the next one on first sight.
    pub fn number_of(&self, term: &str) -> u64 {
        if let Some(number) = self.number_by_term.get(term) {
            return *number.value();
        }
        *self
            .number_by_term
            .entry(term.to_string())
            .or_insert_with(|| {
                let number = self.next.fetch_add(1, Ordering::Relaxed);
                self.term_by_number.insert(number, term.to_string());
                number
            })
            .value()
    }

    /// The term previously given `number`, if any.
    pub fn term_of(&self, number: u64) -> Option<String> {
        self.term_by_number.get(&number).map(|r| r.value().clone())
    }

    /// Number of terms seen so far.
    pub fn len(&self) -> usize {
        self.number_by_term.len()
    }

    /// Whether no term has been numbered yet.
    pub fn is_empty(&self) -> bool {
        self.number_by_term.is_empty()
    }
}

impl Default for TermIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TermIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermIndex")
            .field("count", &self.len())
            .finish()
    }
}
