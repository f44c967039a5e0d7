// This file is part of the syzygy-platform library.
// Copyright (C) 2017-2025 Niklas Fiekas <niklas.fiekas@backscattering.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A blocking, non-recursive mutual exclusion primitive.
///
/// Initialized by [`Lock::new()`], acquired by [`Lock::lock()`], released
/// when the guard is dropped (or passed to [`Lock::unlock()`]) and
/// destroyed when dropped (or passed to [`Lock::destroy()`]).
///
/// There is no fairness among contending threads. Acquiring the lock again
/// while holding it on the same thread deadlocks.
#[derive(Debug, Default)]
pub struct Lock {
    inner: Mutex<()>,
}

/// Proof that a [`Lock`] is held.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<'a> {
    _inner: MutexGuard<'a, ()>,
}

impl Lock {
    pub const fn new() -> Lock {
        Lock {
            inner: Mutex::new(()),
        }
    }

    /// Blocks until the lock is held by the current thread.
    pub fn lock(&self) -> LockGuard<'_> {
        // Guards no data, so poisoning is meaningless.
        LockGuard {
            _inner: self.inner.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Acquires the lock only if it is currently free.
    pub fn try_lock(&self) -> Option<LockGuard<'_>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(LockGuard { _inner: guard }),
            Err(std::sync::TryLockError::Poisoned(poisoned)) => Some(LockGuard {
                _inner: poisoned.into_inner(),
            }),
            Err(std::sync::TryLockError::WouldBlock) => None,
        }
    }

    /// Releases the lock.
    pub fn unlock(guard: LockGuard<'_>) {
        drop(guard);
    }

    /// Destroys the lock. It can no longer be held at this point.
    pub fn destroy(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn test_lock_unlock() {
        let lock = Lock::new();
        let guard = lock.lock();
        assert!(lock.try_lock().is_none());
        Lock::unlock(guard);
        assert!(lock.try_lock().is_some());
        lock.destroy();
    }

    #[test]
    fn test_mutual_exclusion() {
        let lock = Arc::new(Lock::new());
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let _guard = lock.lock();
                        let seen = counter.load(std::sync::atomic::Ordering::Relaxed);
                        thread::yield_now();
                        counter.store(seen + 1, std::sync::atomic::Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("no panic");
        }

        assert_eq!(counter.load(std::sync::atomic::Ordering::Relaxed), 800);
    }

    #[test]
    fn test_survives_panicking_holder() {
        let lock = Arc::new(Lock::new());
        let cloned = Arc::clone(&lock);
        let result = thread::spawn(move || {
            let _guard = cloned.lock();
            panic!("while holding the lock");
        })
        .join();
        assert!(result.is_err());
        let _guard = lock.lock();
    }
}
