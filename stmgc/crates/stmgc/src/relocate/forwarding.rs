//! Forwarding Table - Address Mapping During Evacuation
//!
//! Maps nursery addresses of evacuated objects to their new addresses in
//! global space. One table lives for the duration of one local collection
//! and is only touched by the collecting thread.
//!
//! Usage:
//! 1. Add entry when copying an object
//! 2. Lookup while scanning pointer fields, root slots and weak fields
//! 3. Walk all entries to promote the new copies

use indexmap::IndexMap;

/// ForwardingTable - old address -> new address
#[derive(Debug, Default)]
pub struct ForwardingTable {
    entries: IndexMap<usize, usize>,
}

impl ForwardingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add forwarding entry
    ///
    /// # Panics
    /// An object evacuated twice would split into two live copies.
    pub fn add_entry(&mut self, old_address: usize, new_address: usize) {
        debug_assert!(new_address != 0, "forwarding {:#x} to null", old_address);
        if self.entries.insert(old_address, new_address).is_some() {
            panic!("object {:#x} evacuated twice", old_address);
        }
    }

    /// New address of `old_address`, if it was evacuated
    #[inline]
    pub fn lookup(&self, old_address: usize) -> Option<usize> {
        self.entries.get(&old_address).copied()
    }

    /// (old, new) pairs in evacuation order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().map(|(&old, &new)| (old, new))
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

    #[test]
    fn test_add_and_lookup() {
        let mut table = ForwardingTable::new();
        table.add_entry(0x1000, 0x8000);
        table.add_entry(0x1040, 0x8040);

        assert_eq!(table.lookup(0x1000), Some(0x8000));
        assert_eq!(table.lookup(0x1020), None);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![(0x1000, 0x8000), (0x1040, 0x8040)]
        );
    }

    #[test]
    #[should_panic(expected = "evacuated twice")]
    fn test_double_evacuation_panics() {
        let mut table = ForwardingTable::new();
        table.add_entry(0x1000, 0x8000);
        table.add_entry(0x1000, 0x9000);
    }
}
