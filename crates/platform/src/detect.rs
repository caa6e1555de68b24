//! One-time CPU capability detection.
//!
//! - Compile-time detection via `cfg!(target_feature = "...")`
//! - Runtime detection via `is_x86_feature_detected!` (std only)
//! - Caching via `OnceLock` (std) or an atomic state machine (no_std)
//! - A pre-init override for bare metal and tests
//! - Miri fallback (always `Caps::NONE`)
//!
//! Detection runs at most once per process. Once any caller has observed
//! the cached value, it never changes and overrides are rejected.

use core::fmt;

use crate::caps::Caps;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure to install a capability override.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum OverrideError {
  /// Detection already ran; the cached value is frozen.
  AlreadyInitialized,
  /// This target has no synchronisation primitive to hold an override.
  Unsupported,
}

impl fmt::Display for OverrideError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::AlreadyInitialized => f.write_str("capabilities already detected; override must be set before first use"),
      Self::Unsupported => f.write_str("capability override not supported on this target"),
    }
  }
}

impl core::error::Error for OverrideError {}

// ─────────────────────────────────────────────────────────────────────────────
// Cache and Override (std)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "std")]
mod store {
  use std::sync::{OnceLock, RwLock};

  use super::{Caps, OverrideError};

  static CACHED: OnceLock<Caps> = OnceLock::new();
  static OVERRIDE: RwLock<Option<Caps>> = RwLock::new(None);

  #[inline]
  pub(super) fn get_or_init(f: fn() -> Caps) -> Caps {
    *CACHED.get_or_init(f)
  }

  pub(super) fn is_initialized() -> bool {
    CACHED.get().is_some()
  }

  pub(super) fn try_set_override(value: Option<Caps>) -> Result<(), OverrideError> {
    if CACHED.get().is_some() {
      return Err(OverrideError::AlreadyInitialized);
    }
    match OVERRIDE.write() {
      Ok(mut guard) => {
        *guard = value;
        Ok(())
      }
      Err(_) => Err(OverrideError::Unsupported),
    }
  }

  pub(super) fn get_override() -> Option<Caps> {
    OVERRIDE.read().ok().and_then(|guard| *guard)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache and Override (no_std with 64-bit atomics)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(not(feature = "std"), target_has_atomic = "64"))]
mod store {
  use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

  use super::{Caps, OverrideError};

  const STATE_UNINIT: u8 = 0;
  const STATE_INITING: u8 = 1;
  const STATE_READY: u8 = 2;

  static STATE: AtomicU8 = AtomicU8::new(STATE_UNINIT);
  static CACHED: AtomicU64 = AtomicU64::new(0);

  static OVERRIDE_SET: AtomicBool = AtomicBool::new(false);
  static OVERRIDE_BITS: AtomicU64 = AtomicU64::new(0);

  pub(super) fn get_or_init(f: fn() -> Caps) -> Caps {
    if STATE.load(Ordering::Acquire) == STATE_READY {
      return Caps(CACHED.load(Ordering::Acquire));
    }

    match STATE.compare_exchange(STATE_UNINIT, STATE_INITING, Ordering::AcqRel, Ordering::Acquire) {
      Ok(_) => {
        let caps = f();
        CACHED.store(caps.0, Ordering::Release);
        STATE.store(STATE_READY, Ordering::Release);
        caps
      }
      Err(_) => {
        while STATE.load(Ordering::Acquire) != STATE_READY {
          core::hint::spin_loop();
        }
        Caps(CACHED.load(Ordering::Acquire))
      }
    }
  }

  pub(super) fn is_initialized() -> bool {
    STATE.load(Ordering::Acquire) == STATE_READY
  }

  pub(super) fn try_set_override(value: Option<Caps>) -> Result<(), OverrideError> {
    if STATE.load(Ordering::Acquire) != STATE_UNINIT {
      return Err(OverrideError::AlreadyInitialized);
    }
    if let Some(caps) = value {
      OVERRIDE_BITS.store(caps.0, Ordering::Release);
    }
    OVERRIDE_SET.store(value.is_some(), Ordering::Release);
    Ok(())
  }

  pub(super) fn get_override() -> Option<Caps> {
    OVERRIDE_SET.load(Ordering::Acquire).then(|| Caps(OVERRIDE_BITS.load(Ordering::Acquire)))
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// No caching (no_std without 64-bit atomics: single-threaded embedded)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(not(feature = "std"), not(target_has_atomic = "64")))]
mod store {
  use super::{Caps, OverrideError};

  #[inline]
  pub(super) fn get_or_init(f: fn() -> Caps) -> Caps {
    f()
  }

  pub(super) fn is_initialized() -> bool {
    false
  }

  pub(super) fn try_set_override(_value: Option<Caps>) -> Result<(), OverrideError> {
    Err(OverrideError::Unsupported)
  }

  pub(super) fn get_override() -> Option<Caps> {
    None
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main API
// ─────────────────────────────────────────────────────────────────────────────

/// Detected capabilities, cached after the first call.
#[inline]
#[must_use]
pub fn caps() -> Caps {
  // Miri cannot interpret SIMD intrinsics, so never report any.
  #[cfg(miri)]
  {
    Caps::NONE
  }

  #[cfg(not(miri))]
  {
    store::get_or_init(detect_with_override)
  }
}

/// Whether [`caps`] has already run detection and frozen its result.
#[inline]
#[must_use]
pub fn is_initialized() -> bool {
  store::is_initialized()
}

/// Install (or clear, with `None`) a capability override.
///
/// The override can only mask features out: [`caps`] reports its
/// intersection with [`detect_uncached`], so no kernel can be selected for a
/// feature the CPU lacks.
///
/// Contract: pre-init only. Once [`caps`] has cached a value, this returns
/// [`OverrideError::AlreadyInitialized`].
#[cold]
pub fn try_set_override(value: Option<Caps>) -> Result<(), OverrideError> {
  store::try_set_override(value)
}

/// Check if an override is currently installed.
#[inline]
#[must_use]
pub fn has_override() -> bool {
  store::get_override().is_some()
}

#[cold]
fn detect_with_override() -> Caps {
  apply_override(store::get_override(), detect_uncached())
}

#[inline]
const fn apply_override(value: Option<Caps>, detected: Caps) -> Caps {
  match value {
    Some(caps) => caps.intersection(detected),
    None => detected,
  }
}

/// Run detection without consulting or filling the cache.
#[must_use]
pub fn detect_uncached() -> Caps {
  #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "std"))]
  {
    caps_static().union(runtime_x86())
  }

  #[cfg(not(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "std")))]
  {
    caps_static()
  }
}

/// Features guaranteed by the compilation target (`-C target-feature`,
/// `-C target-cpu`).
#[must_use]
pub const fn caps_static() -> Caps {
  #[allow(unused_mut)]
  let mut caps = Caps::NONE;

  #[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
  {
    use crate::caps::x86;

    if cfg!(target_feature = "sse2") {
      caps = caps.union(x86::SSE2);
    }
    if cfg!(target_feature = "sse3") {
      caps = caps.union(x86::SSE3);
    }
    if cfg!(target_feature = "avx2") {
      caps = caps.union(x86::AVX2);
    }
    if cfg!(target_feature = "avx512f") {
      caps = caps.union(x86::AVX512F);
    }
  }

  caps
}

/// Runtime-detected x86 features.
///
/// `is_x86_feature_detected!` also verifies OS support (XCR0) for the YMM
/// and ZMM register state, so a set bit is always safe to act on.
#[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "std"))]
fn runtime_x86() -> Caps {
  use crate::caps::x86;

  let mut caps = Caps::NONE;
  if std::arch::is_x86_feature_detected!("sse2") {
    caps |= x86::SSE2;
  }
  if std::arch::is_x86_feature_detected!("sse3") {
    caps |= x86::SSE3;
  }
  if std::arch::is_x86_feature_detected!("avx2") {
    caps |= x86::AVX2;
  }
  if std::arch::is_x86_feature_detected!("avx512f") {
    caps |= x86::AVX512F;
  }
  caps
}
