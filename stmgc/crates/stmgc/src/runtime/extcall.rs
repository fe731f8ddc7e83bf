//! External Calls - Pausing the transactional machinery around native code

use crate::tls::StmThread;

impl StmThread {
    /// Run `f` as an external (native) call
    ///
    /// Once threads are set up, `f` is bracketed by the substrate's
    /// before/after external call hooks.
    pub fn external_call<R>(&self, f: impl FnOnce() -> R) -> R {
        if !self.gc().thread_locals().threads_running() {
            return f();
        }
        let substrate = self.gc().substrate();
        substrate.before_external_call(self.num());
        let result = f();
        substrate.after_external_call(self.num());
        result
    }

    /// Run `f` as a callback from native code back into managed code
    pub fn callback_call<R>(&self, f: impl FnOnce() -> R) -> R {
        if !self.gc().thread_locals().threads_running() {
            return f();
        }
        let substrate = self.gc().substrate();
        substrate.enter_callback_call(self.num());
        let result = f();
        substrate.leave_callback_call(self.num());
        result
    }

    /// Whether this thread is inside an atomic transaction
    pub fn is_atomic(&self) -> bool {
        self.gc().substrate().is_atomic(self.num())
    }

    /// Enter an atomic (non-preemptible) section; sections nest
    pub fn enter_atomic(&self) {
        self.gc().substrate().increment_atomic(self.num());
    }

    pub fn leave_atomic(&self) {
        self.gc().substrate().decrement_atomic(self.num());
    }
}
