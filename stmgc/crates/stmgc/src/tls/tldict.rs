//! tldict - Per-thread map from global objects to their local copies
//!
//! Keyed by the global object's address. Objects never move inside a
//! transaction and the map is emptied at every boundary, so raw addresses
//! are stable keys for the map's whole lifetime.

use indexmap::IndexMap;

/// One entry of the audit list handed to the substrate at commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionalCopy {
    pub original: usize,
    pub copy: usize,
}

/// LocalCopies - global address -> local copy address
#[derive(Debug, Default)]
pub struct LocalCopies {
    map: IndexMap<usize, usize>,
}

impl LocalCopies {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn lookup(&self, global: usize) -> Option<usize> {
        self.map.get(&global).copied()
    }

    /// Insert a new mapping
    ///
    /// # Panics
    /// A second copy of the same global in one transaction is a protocol bug.
    pub fn add(&mut self, global: usize, local: usize) {
        if let Some(existing) = self.map.insert(global, local) {
            panic!(
                "global {:#x} localized twice ({:#x} and {:#x})",
                global, existing, local
            );
        }
    }

    /// (global, local) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.map.iter().map(|(&g, &l)| (g, l))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_enumerate() {
        let mut dict = LocalCopies::new();
        assert_eq!(dict.lookup(0x1000), None);

        dict.add(0x1000, 0x9000);
        dict.add(0x2000, 0x9100);
        assert_eq!(dict.lookup(0x1000), Some(0x9000));
        assert_eq!(
            dict.iter().collect::<Vec<_>>(),
            vec![(0x1000, 0x9000), (0x2000, 0x9100)]
        );

        dict.clear();
        assert!(dict.is_empty());
    }

    #[test]
    #[should_panic(expected = "localized twice")]
    fn test_duplicate_key_panics() {
        let mut dict = LocalCopies::new();
        dict.add(0x1000, 0x9000);
        dict.add(0x1000, 0x9100);
    }
}
