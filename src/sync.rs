//! A mutex-guarded cell with scoped access.
//!
//! The guard never leaves the closure handed to [`Synchronized::lock`]. The
//! promise core only passes its own bookkeeping to `lock`; listeners and
//! other user callbacks always run after the guard is released.
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct Synchronized<T> {
    value: Mutex<T>,
    changed: Condvar,
}

impl<T> Synchronized<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            changed: Condvar::new(),
        }
    }

    // Nothing panics while holding the guard except crate bookkeeping that
    // leaves the value consistent, so a poisoned lock is still usable.
    fn guard(&self) -> MutexGuard<'_, T> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` inside the critical section.
    pub fn lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.guard())
    }

    /// Like [`Synchronized::lock`], then wakes everyone blocked in
    /// [`Synchronized::wait_map`].
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.guard());
        self.changed.notify_all();
        out
    }

    /// Blocks the calling thread until `f` returns `Some`. `f` is re-run
    /// after every [`Synchronized::update`].
    pub fn wait_map<R>(&self, mut f: impl FnMut(&mut T) -> Option<R>) -> R {
        let mut guard = self.guard();
        loop {
            if let Some(out) = f(&mut guard) {
                return out;
            }
            guard = self
                .changed
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn set(&self, value: T) {
        self.update(|slot| *slot = value);
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Access without locking, through exclusive ownership.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Synchronized<T> {
    pub fn get(&self) -> T {
        self.lock(|value| value.clone())
    }
}
