//! Critical-section protected cell.

use core::cell::RefCell;
use critical_section::Mutex;

/// Interior-mutable state shared between interrupt handlers and the
/// scheduler.
///
/// Every access runs inside `critical_section::with`, so an interrupt can
/// never observe a half-applied update. Closures must stay short: they run
/// with interrupts masked.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Run `f` with shared access.
    #[inline]
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        critical_section::with(|cs| {
            let value = self.inner.borrow_ref(cs);
            f(&value)
        })
    }
}

impl<T: Default> CriticalSectionCell<T> {
    /// Put the default value back.
    #[inline]
    pub fn reset(&self) {
        self.with(|value| *value = T::default());
    }
}

// SAFETY: all access goes through a critical section.
unsafe impl<T> Sync for CriticalSectionCell<T> {}
