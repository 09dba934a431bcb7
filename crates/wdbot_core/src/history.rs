//! Bounded, recency-ranked history window.
//!
//! Ranks run "backwards": a fresh window hands out `capacity`, then
//! `capacity - 1`, ... down to the floor rank 1. Once the floor is reached
//! every further insert shifts the survivors up by one and drops whatever
//! falls past `capacity`. Rank 1 is therefore always the newest value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest rank a live entry can hold.
pub const FLOOR_RANK: i64 = 1;

/// Independent history logs kept for the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryCategory {
    /// Entities the user opened (`Q42`, `P31`, ...).
    Entity,
    /// Locations the user searched for.
    Location,
}

impl HistoryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryCategory::Entity => "entity",
            HistoryCategory::Location => "location",
        }
    }
}

impl fmt::Display for HistoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entity" => Ok(HistoryCategory::Entity),
            "location" => Ok(HistoryCategory::Location),
            other => anyhow::bail!("Unknown history category: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub value: String,
    pub rank: i64,
}

/// Outcome of [`HistoryWindow::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The value was already in the window; nothing moved.
    Present,
    Inserted { rank: i64, evicted: Vec<String> },
}

/// One (user, category) window, held sorted by ascending rank.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    capacity: usize,
    entries: Vec<HistoryEntry>,
}

impl HistoryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    /// Rebuild a window from stored rows (any order).
    pub fn from_entries(capacity: usize, mut entries: Vec<HistoryEntry>) -> Self {
        entries.sort_by_key(|e| e.rank);
        Self {
            capacity: capacity.max(1),
            entries,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rank an empty window starts counting down from.
    pub fn first_rank(&self) -> i64 {
        self.capacity as i64 + 1
    }

    pub fn min_rank(&self) -> Option<i64> {
        self.entries.first().map(|e| e.rank)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|e| e.value == value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Values newest first.
    pub fn values(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.value.clone()).collect()
    }

    pub fn insert(&mut self, value: &str) -> Insertion {
        if self.contains(value) {
            return Insertion::Present;
        }

        let mut rank = self.min_rank().unwrap_or_else(|| self.first_rank()) - 1;
        self.entries.insert(
            0,
            HistoryEntry {
                value: value.to_string(),
                rank,
            },
        );

        // Below the floor: make room by pushing everyone one step older.
        if rank < FLOOR_RANK {
            let shift = FLOOR_RANK - rank;
            for entry in &mut self.entries {
                entry.rank += shift;
            }
            rank = FLOOR_RANK;
        }

        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.entries.pop() {
                evicted.push(oldest.value);
            }
        }

        Insertion::Inserted { rank, evicted }
    }
}
