//! Transposition cache for a single top-level decision.
use std::collections::HashMap;

use crate::board::Board;

/// Identity of a search node: exact cells, remaining depth and side to move.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeKey {
    pub board: Board,
    pub depth: u8,
    pub maximizing: bool,
}

/// Whether a stored score is exact or only a bound left behind by a cutoff.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CacheEntry {
    pub column: Option<usize>,
    pub score: i32,
    pub bound: Bound,
}

impl CacheEntry {
    /// Bound of a value found inside the window `(alpha, beta)`.
    pub fn classify(score: i32, alpha: i32, beta: i32) -> Bound {
        if score <= alpha {
            Bound::Upper
        } else if score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }

    fn answers(&self, alpha: i32, beta: i32) -> bool {
        match self.bound {
            Bound::Exact => true,
            Bound::Lower => self.score >= beta,
            Bound::Upper => self.score <= alpha,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TranspositionCache {
    entries: HashMap<NodeKey, CacheEntry>,
    hits: u64,
    probes: u64,
}

impl TranspositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored entry if it decides the node for `(alpha, beta)`.
    pub fn probe(&mut self, key: &NodeKey, alpha: i32, beta: i32) -> Option<CacheEntry> {
        self.probes += 1;
        let entry = self
            .entries
            .get(key)
            .copied()
            .filter(|entry| entry.answers(alpha, beta))?;
        self.hits += 1;
        Some(entry)
    }

    pub fn store(&mut self, key: NodeKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    pub fn get(&self, key: &NodeKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.probes = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn probes(&self) -> u64 {
        self.probes
    }
}
