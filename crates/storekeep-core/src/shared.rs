//! Shared, lockable entity handles.

use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;

/// A cloneable handle to an entity that several orders may touch.
///
/// Products and coupons are shared between orders; every read and write goes
/// through the handle's lock, so a check and the mutation that depends on it
/// can be made under a single guard.
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    /// Wrap an entity.
    pub fn new(value: T) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    /// Lock the entity.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock()
    }

    /// Check whether two handles point at the same entity.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Shared<T> {
    /// Copy out the current state.
    pub fn snapshot(&self) -> T {
        self.0.lock().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_lock() {
            Some(guard) => f.debug_tuple("Shared").field(&*guard).finish(),
            None => f.write_str("Shared(<locked>)"),
        }
    }
}

impl<T> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let a = Shared::new(1);
        let b = a.clone();
        *b.lock() += 41;

        assert_eq!(a.snapshot(), 42);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Shared::new(42)));
    }

    #[test]
    fn test_debug_while_locked() {
        let a = Shared::new("x");
        let _guard = a.lock();
        assert_eq!(format!("{:?}", a), "Shared(<locked>)");
    }
}
