//! Atomic replacement of the active policy snapshot.
//!
//! Evaluations take an `Arc<PolicyIndex>` snapshot at the start and use it
//! end to end. `replace` swaps in a whole new index; evaluations already
//! holding the old snapshot are unaffected.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::index::PolicyIndex;

/// Holder of the current policy snapshot.
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Arc<PolicyIndex>>,
}

impl PolicyStore {
    pub fn new(index: PolicyIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// The snapshot to use for one evaluation.
    pub fn snapshot(&self) -> Arc<PolicyIndex> {
        // The guarded value is only ever replaced whole, so a poisoned lock
        // still holds a consistent snapshot.
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Install `index` as the current snapshot and return the previous one.
    pub fn replace(&self, index: PolicyIndex) -> Arc<PolicyIndex> {
        let next = Arc::new(index);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        info!(actions = next.len(), "policy snapshot replaced");
        std::mem::replace(&mut *guard, next)
    }
}
