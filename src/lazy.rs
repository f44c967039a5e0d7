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

use std::{
    cell::UnsafeCell,
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::lock::Lock;

/// A value that is constructed at most once, on first use.
///
/// Reads after initialization take no lock.
pub struct Lazy<T> {
    initialized: AtomicBool,
    lock: Lock,
    value: UnsafeCell<Option<T>>,
}

// SAFETY: The value is written only once, while holding the lock and before
// `initialized` is released. Afterwards it is only ever shared immutably.
unsafe impl<T: Send + Sync> Sync for Lazy<T> {}
unsafe impl<T: Send> Send for Lazy<T> {}

impl<T> Default for Lazy<T> {
    fn default() -> Lazy<T> {
        Lazy::new()
    }
}

impl<T> Lazy<T> {
    pub const fn new() -> Lazy<T> {
        Lazy {
            initialized: AtomicBool::new(false),
            lock: Lock::new(),
            value: UnsafeCell::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Gets the value, if it has been initialized.
    pub fn get(&self) -> Option<&T> {
        if self.is_initialized() {
            // SAFETY: Initialized, so no more writes.
            unsafe { &*self.value.get() }.as_ref()
        } else {
            None
        }
    }

    /// Gets the value, initializing it with `f` if this is the first call.
    ///
    /// If `f` fails, the error is returned and the cell stays
    /// uninitialized, so that a later call can try again. `f` must not
    /// access this cell, or it will deadlock.
    pub fn get_or_try_init<F, E>(&self, f: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // Double-checked locking:
        // https://stackoverflow.com/a/45692413/722291

        if !self.initialized.load(Ordering::Acquire) {
            let _guard = self.lock.lock();

            if !self.initialized.load(Ordering::Relaxed) {
                let value = f()?;
                // SAFETY: Not yet initialized, so there are no readers, and
                // we hold the lock, so there are no other writers.
                unsafe { *self.value.get() = Some(value) };
                self.initialized.store(true, Ordering::Release);
            }
        }

        // SAFETY: Initialized, so no more writes.
        Ok(unsafe { &*self.value.get() }
            .as_ref()
            .expect("initialized lazy has value"))
    }

    pub fn get_or_init<F>(&self, f: F) -> &T
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_init(|| Ok::<T, std::convert::Infallible>(f())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Takes the value out, returning the cell to the uninitialized state.
    pub fn take(&mut self) -> Option<T> {
        *self.initialized.get_mut() = false;
        self.value.get_mut().take()
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Lazy").field(value).finish(),
            None => f.write_str("Lazy(<uninit>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Barrier,
        },
        thread,
    };

    use super::*;

    #[test]
    fn test_init_once() {
        let lazy = Lazy::new();
        assert!(lazy.get().is_none());
        assert_eq!(*lazy.get_or_init(|| 1), 1);
        assert_eq!(*lazy.get_or_init(|| 2), 1);
        assert_eq!(lazy.get(), Some(&1));
    }

    #[test]
    fn test_failed_init_can_be_retried() {
        let lazy = Lazy::new();
        assert_eq!(lazy.get_or_try_init(|| Err("nope")), Err("nope"));
        assert!(!lazy.is_initialized());
        assert_eq!(lazy.get_or_try_init(|| Ok::<_, &str>(42)), Ok(&42));
    }

    #[test]
    fn test_take() {
        let mut lazy = Lazy::new();
        lazy.get_or_init(|| String::from("catalogue"));
        assert_eq!(lazy.take().as_deref(), Some("catalogue"));
        assert!(!lazy.is_initialized());
        assert_eq!(lazy.get_or_init(|| String::from("again")), "again");
    }

    #[test]
    fn test_concurrent_init_runs_once() {
        let lazy = Arc::new(Lazy::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let lazy = Arc::clone(&lazy);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    *lazy.get_or_init(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        i
                    })
                })
            })
            .collect();

        let values: Vec<usize> = handles
            .into_iter()
            .map(|h| h.join().expect("no panic"))
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.windows(2).all(|w| w[0] == w[1]));
    }
}
