//! Persistent channel numbering
//!
//! Every stream path ever seen keeps the number it was first given. The
//! mapping only grows: entries are never changed or removed, even when a
//! channel disappears from the directory, so a number once handed out is
//! never given to another channel.
//!
//! [`ChannelNumberRegistry`] holds the in-memory snapshot and performs
//! allocation; [`RegistryStore`] loads and saves it as a JSON object.
//! Allocation takes `&mut self`, so it can only run from one place at a
//! time, after the concurrent resolution phase has returned.

pub mod store;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::errors::{RegistryError, RegistryResult};
use crate::models::Allocation;

pub use store::RegistryStore;

#[derive(Debug, Clone, Default)]
pub struct ChannelNumberRegistry {
    entries: BTreeMap<String, u64>,
    used: BTreeSet<u64>,
    new_assignments: usize,
}

impl ChannelNumberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a persisted snapshot
    pub fn from_entries(entries: BTreeMap<String, u64>) -> Self {
        let used: BTreeSet<u64> = entries.values().copied().collect();
        if used.len() != entries.len() {
            warn!(
                "Channel map contains {} entries sharing a number; keeping them as-is",
                entries.len() - used.len()
            );
        }
        Self {
            entries,
            used,
            new_assignments: 0,
        }
    }

    /// Return the stream path's number, assigning a new one if it has none.
    ///
    /// New numbers are searched upward from one past the highest number in
    /// use (1 for an empty registry), skipping any number already taken.
    /// Gaps below the maximum are never filled.
    pub fn allocate_or_get(&mut self, stream_path: &str) -> RegistryResult<Allocation> {
        if let Some(&number) = self.entries.get(stream_path) {
            return Ok(Allocation {
                number,
                newly_assigned: false,
            });
        }

        let mut candidate = match self.max_number() {
            Some(max) => max.checked_add(1).ok_or(RegistryError::Exhausted)?,
            None => 1,
        };
        while self.used.contains(&candidate) {
            candidate = candidate.checked_add(1).ok_or(RegistryError::Exhausted)?;
        }

        self.entries.insert(stream_path.to_string(), candidate);
        self.used.insert(candidate);
        self.new_assignments += 1;
        info!("[NEW] Assigned channel #{} to {}", candidate, stream_path);

        Ok(Allocation {
            number: candidate,
            newly_assigned: true,
        })
    }

    pub fn get(&self, stream_path: &str) -> Option<u64> {
        self.entries.get(stream_path).copied()
    }

    pub fn max_number(&self) -> Option<u64> {
        self.used.last().copied()
    }

    /// True when at least one number was assigned since loading
    pub fn has_changes(&self) -> bool {
        self.new_assignments > 0
    }

    pub fn new_assignments(&self) -> usize {
        self.new_assignments
    }

    pub fn entries(&self) -> &BTreeMap<String, u64> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn registry(pairs: &[(&str, u64)]) -> ChannelNumberRegistry {
        ChannelNumberRegistry::from_entries(
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        )
    }

    #[test]
    fn test_empty_registry_numbers_from_one() {
        let mut reg = ChannelNumberRegistry::new();
        let numbers: Vec<u64> = ["a", "b", "c"]
            .iter()
            .map(|p| reg.allocate_or_get(p).unwrap().number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(reg.has_changes());
        assert_eq!(reg.new_assignments(), 3);
    }

    #[test]
    fn test_existing_entries_never_change() {
        let mut reg = registry(&[("a", 1), ("c", 3)]);

        let a = reg.allocate_or_get("a").unwrap();
        assert_eq!(a, Allocation { number: 1, newly_assigned: false });
        assert!(!reg.has_changes());

        let b = reg.allocate_or_get("b").unwrap();
        assert_eq!(b, Allocation { number: 4, newly_assigned: true });

        // Repeated lookups are stable after new assignments too
        assert_eq!(reg.allocate_or_get("a").unwrap().number, 1);
        assert_eq!(reg.allocate_or_get("b").unwrap().number, 4);
        assert_eq!(reg.get("c"), Some(3));
        assert_eq!(reg.new_assignments(), 1);
    }

    #[rstest]
    #[case(&[], "x", 1)]
    #[case(&[("a", 1), ("c", 3)], "b", 4)]
    #[case(&[("a", 7)], "b", 8)]
    #[case(&[("a", 2), ("b", 5), ("c", 9)], "d", 10)]
    fn test_new_number_follows_maximum(
        #[case] existing: &[(&str, u64)],
        #[case] path: &str,
        #[case] expected: u64,
    ) {
        let mut reg = registry(existing);
        assert_eq!(reg.allocate_or_get(path).unwrap().number, expected);
    }

    #[test]
    fn test_numbers_unique_across_batches() {
        let mut reg = ChannelNumberRegistry::new();
        for path in ["a", "b", "c"] {
            reg.allocate_or_get(path).unwrap();
        }
        // A later run without "b" still leaves "b" reserved
        let mut next_run = ChannelNumberRegistry::from_entries(reg.entries().clone());
        for path in ["c", "d", "a", "e"] {
            next_run.allocate_or_get(path).unwrap();
        }

        let numbers: BTreeSet<u64> = next_run.entries().values().copied().collect();
        assert_eq!(numbers.len(), next_run.len());
        assert_eq!(next_run.get("b"), Some(2));
        assert_eq!(next_run.get("d"), Some(4));
        assert_eq!(next_run.get("e"), Some(5));
    }

    #[test]
    fn test_exhausted_number_space() {
        let mut reg = registry(&[("a", u64::MAX)]);
        assert!(matches!(reg.allocate_or_get("b"), Err(RegistryError::Exhausted)));
        assert!(!reg.has_changes());
        assert_eq!(reg.allocate_or_get("a").unwrap().number, u64::MAX);
    }
}
