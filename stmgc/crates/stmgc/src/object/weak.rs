//! Weak References
//!
//! A weak reference is an ordinary object whose type declares one weak
//! field. The field is not traced: at local collection a nursery target
//! that was evacuated is rewritten to its new address, one that was not is
//! nulled, and a global target is left for the read barrier to resolve.

use crate::object::header::header;
use crate::object::read_field;
use crate::tls::StmThread;

impl StmThread {
    /// Read the target of weak reference `wr`
    ///
    /// # Returns
    /// `None` if the target is gone, otherwise the read barrier applied
    /// to the target.
    ///
    /// # Panics
    /// Panics if the type of `wr` has no weak field.
    pub fn read_weakref(&self, wr: usize) -> Option<usize> {
        let wr = self.read_barrier(wr);
        let tid = unsafe { header(wr) }.type_id();
        let offset = match self.gc().types().layout(tid).weak_offset() {
            Some(offset) => offset,
            None => panic!("type {} has no weak field", tid),
        };

        match unsafe { read_field(wr, offset) } {
            0 => None,
            target => Some(self.read_barrier(target)),
        }
    }
}
