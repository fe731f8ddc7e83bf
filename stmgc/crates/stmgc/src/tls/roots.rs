//! Shadow Stack - Explicit roots of one thread
//!
//! Mutator code keeps every live reference to a nursery object in a root
//! slot across anything that may run a local collection. Collection
//! rewrites the slots in place.

/// ShadowStack - root slots, innermost last
#[derive(Debug, Default)]
pub struct ShadowStack {
    slots: Vec<usize>,
}

impl ShadowStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, obj: usize) {
        self.slots.push(obj);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<usize> {
        self.slots.pop()
    }

    /// Slot `index`, counted from the bottom
    #[inline]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [usize] {
        &mut self.slots
    }
}
