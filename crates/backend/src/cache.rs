//! Write-once, read-many cache cells.
//!
//! [`OnceCache`] has the semantics of `std::sync::OnceLock` but also works on
//! no_std targets.
//!
//! # Caching Strategy
//!
//! - **std**: `OnceLock` (losers of the first-use race block until the winner publishes)
//! - **no_std with atomics**: UNINIT → INITING → READY state machine; the winner claims INITING
//!   with a compare-exchange, losers spin until READY. A panicking initialiser resets the state
//!   to UNINIT and the next caller retries, as `OnceLock` does
//! - **no_std without atomics**: per-call computation (single-threaded embedded)
//!
//! In every mode a reader that observes READY observes the fully written
//! value: the value store happens-before the Release store of READY, and
//! readers load the state with Acquire.

#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
use core::{cell::UnsafeCell, mem::MaybeUninit};

/// Lazily initialised, immutable-after-init value.
pub struct OnceCache<T: Copy> {
  #[cfg(feature = "std")]
  inner: std::sync::OnceLock<T>,

  #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
  state: core::sync::atomic::AtomicU8,
  #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
  value: UnsafeCell<MaybeUninit<T>>,

  #[cfg(all(not(feature = "std"), not(target_has_atomic = "8")))]
  _marker: core::marker::PhantomData<T>,
}

// SAFETY: `value` is written exactly once, by the thread that won the
// UNINIT -> INITING transition, before READY is published with Release.
// Readers only touch `value` after observing READY with Acquire.
#[allow(unsafe_code)]
#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
unsafe impl<T: Copy + Send + Sync> Sync for OnceCache<T> {}

impl<T: Copy> OnceCache<T> {
  #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
  const UNINIT: u8 = 0;
  #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
  const INITING: u8 = 1;
  #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
  const READY: u8 = 2;

  /// Create a new empty cache.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      #[cfg(feature = "std")]
      inner: std::sync::OnceLock::new(),

      #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
      state: core::sync::atomic::AtomicU8::new(0),
      #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
      value: UnsafeCell::new(MaybeUninit::uninit()),

      #[cfg(all(not(feature = "std"), not(target_has_atomic = "8")))]
      _marker: core::marker::PhantomData,
    }
  }

  /// Get the cached value, initialising it with `f` if not yet set.
  ///
  /// On targets with atomics `f` runs at most once per cache, even when
  /// several threads race the first call.
  #[inline]
  pub fn get_or_init(&self, f: impl FnOnce() -> T) -> T {
    #[cfg(feature = "std")]
    {
      *self.inner.get_or_init(f)
    }

    #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
    {
      use core::sync::atomic::Ordering;

      let mut f = Some(f);
      loop {
        if let Some(value) = self.get() {
          return value;
        }

        if self.state.compare_exchange(Self::UNINIT, Self::INITING, Ordering::AcqRel, Ordering::Acquire).is_ok() {
          // Rolls the state back to UNINIT if `init` unwinds, so a later
          // caller retries instead of spinning forever.
          let guard = ResetOnUnwind(&self.state);
          let value = match f.take() {
            Some(init) => init(),
            None => unreachable!("initialiser claimed twice by one caller"),
          };
          // SAFETY: we hold exclusive access while the state is INITING.
          #[allow(unsafe_code)]
          unsafe {
            (*self.value.get()).write(value);
          }
          core::mem::forget(guard);
          self.state.store(Self::READY, Ordering::Release);
          return value;
        }

        core::hint::spin_loop();
      }
    }

    #[cfg(all(not(feature = "std"), not(target_has_atomic = "8")))]
    {
      f()
    }
  }

  /// The cached value, if initialisation has completed.
  #[inline]
  #[must_use]
  pub fn get(&self) -> Option<T> {
    #[cfg(feature = "std")]
    {
      self.inner.get().copied()
    }

    #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
    {
      use core::sync::atomic::Ordering;

      if self.state.load(Ordering::Acquire) == Self::READY {
        // SAFETY: the value is initialised once the state is READY.
        #[allow(unsafe_code)]
        return Some(unsafe { (*self.value.get()).assume_init() });
      }
      None
    }

    #[cfg(all(not(feature = "std"), not(target_has_atomic = "8")))]
    {
      None
    }
  }
}

#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
struct ResetOnUnwind<'a>(&'a core::sync::atomic::AtomicU8);

#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
impl Drop for ResetOnUnwind<'_> {
  fn drop(&mut self) {
    self.0.store(0, core::sync::atomic::Ordering::Release);
  }
}

impl<T: Copy> Default for OnceCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Copy + core::fmt::Debug> core::fmt::Debug for OnceCache<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_tuple("OnceCache").field(&self.get()).finish()
  }
}
