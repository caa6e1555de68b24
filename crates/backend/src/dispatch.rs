//! Kernel dispatch: selection and resolve-once binding.
//!
//! - [`Candidate`]: a kernel with capability requirements
//! - [`Selected`]: the result of kernel selection
//! - [`select`]: choose the best kernel from a preference-ordered list
//! - [`Dispatcher`]: a process-wide slot bound to one kernel on first use
//!
//! # Design
//!
//! Algorithm crates register kernels as an ordered list of `Candidate`s, most
//! specialised first, ending in a baseline with `Caps::NONE`. Candidates that
//! were not compiled into the build are simply absent from the list, so the
//! preference walk is identical across build configurations.
//!
//! ```ignore
//! use backend::{candidates, dispatch::{Candidate, ConfigError, Dispatcher, Selected, select}};
//! use platform::{Caps, caps::x86};
//!
//! fn resolve() -> Result<Selected<fn(&mut [u64])>, ConfigError> {
//!   select(platform::caps(), candidates![
//!     #[cfg(target_arch = "x86_64")]
//!     "x86_64/avx2" => x86::AVX2 => avx2_kernel,
//!     "reference"   => Caps::NONE => reference_kernel,
//!   ])
//! }
//!
//! static KERNEL: Dispatcher<fn(&mut [u64])> = Dispatcher::new(resolve);
//!
//! (KERNEL.func())(&mut state);
//! ```

use core::fmt;

use platform::Caps;

use crate::cache::OnceCache;

// ─────────────────────────────────────────────────────────────────────────────
// Core Types
// ─────────────────────────────────────────────────────────────────────────────

/// A candidate kernel with capability requirements.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<F> {
  /// Human-readable name for diagnostics (e.g., "x86_64/avx2").
  pub name: &'static str,
  /// Required CPU capabilities. Must be a subset of detected caps.
  pub requires: Caps,
  pub func: F,
}

impl<F> Candidate<F> {
  #[inline]
  #[must_use]
  pub const fn new(name: &'static str, requires: Caps, func: F) -> Self {
    Self { name, requires, func }
  }
}

/// The result of kernel selection.
#[derive(Clone, Copy, Debug)]
pub struct Selected<F> {
  pub name: &'static str,
  pub func: F,
}

impl<F> Selected<F> {
  #[inline]
  #[must_use]
  pub const fn new(name: &'static str, func: F) -> Self {
    Self { name, func }
  }
}

/// Build a candidate slice from `"name" => caps => func` triples.
///
/// Entries may carry `#[cfg(...)]` attributes; a cfg'd-out entry is absent
/// from the resulting slice. Names are string literals.
#[macro_export]
macro_rules! candidates {
  ($( $(#[$meta:meta])* $name:literal => $requires:expr => $func:expr ),+ $(,)?) => {
    &[$( $(#[$meta])* $crate::dispatch::Candidate::new($name, $requires, $func) ),+]
  };
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// A candidate list that cannot produce a kernel.
///
/// This is a build invariant violation (the baseline entry is missing), never
/// a data-dependent failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
  /// No candidate's requirements were met, and no baseline entry exists.
  NoCandidate {
    /// Capabilities the selection ran against.
    caps: Caps,
    /// Number of candidates that were considered.
    considered: usize,
  },
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NoCandidate { caps, considered } => write!(
        f,
        "no kernel matches caps [{caps}] among {considered} candidate(s); the candidate list must end in a baseline"
      ),
    }
  }
}

impl core::error::Error for ConfigError {}

// ─────────────────────────────────────────────────────────────────────────────
// Selection
// ─────────────────────────────────────────────────────────────────────────────

/// Select the best kernel from a candidate list.
///
/// Returns the first candidate whose `requires` is satisfied by `caps`.
///
/// # Errors
///
/// [`ConfigError::NoCandidate`] if nothing matches (empty list, or no
/// `Caps::NONE` baseline).
#[inline]
pub fn select<F: Copy>(caps: Caps, candidates: &[Candidate<F>]) -> Result<Selected<F>, ConfigError> {
  candidates
    .iter()
    .find(|candidate| caps.has(candidate.requires))
    .map(|candidate| Selected::new(candidate.name, candidate.func))
    .ok_or(ConfigError::NoCandidate { caps, considered: candidates.len() })
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

/// A resolve-once kernel slot.
///
/// The resolver runs on the first [`get`](Self::get) (or any method that
/// needs the kernel) and its result is published through an [`OnceCache`].
/// Every later call is a single cached load; the capability probe inside the
/// resolver never runs again.
///
/// A resolver that returns [`ConfigError`] is a broken build; the first call
/// panics with the error message instead of falling back.
pub struct Dispatcher<F: Copy> {
  slot: OnceCache<Selected<F>>,
  resolver: fn() -> Result<Selected<F>, ConfigError>,
}

impl<F: Copy> Dispatcher<F> {
  /// Create a dispatcher. Nothing runs until first use.
  #[must_use]
  pub const fn new(resolver: fn() -> Result<Selected<F>, ConfigError>) -> Self {
    Self { slot: OnceCache::new(), resolver }
  }

  /// The selected kernel, resolving on first call.
  ///
  /// # Panics
  ///
  /// Panics if the resolver reports a [`ConfigError`].
  #[inline]
  #[must_use]
  pub fn get(&self) -> Selected<F> {
    self.slot.get_or_init(|| match (self.resolver)() {
      Ok(selected) => selected,
      Err(err) => panic!("kernel resolution failed: {err}"),
    })
  }

  /// The selected kernel function.
  #[inline]
  #[must_use]
  pub fn func(&self) -> F {
    self.get().func
  }

  /// Name of the selected kernel.
  #[inline]
  #[must_use]
  pub fn backend_name(&self) -> &'static str {
    self.get().name
  }

  /// Whether resolution has already happened. Never triggers it.
  #[inline]
  #[must_use]
  pub fn is_resolved(&self) -> bool {
    self.slot.get().is_some()
  }
}

impl<F: Copy> fmt::Debug for Dispatcher<F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Dispatcher").field("selected", &self.slot.get().map(|s| s.name)).finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  extern crate std;

  use std::{
    sync::{
      Arc, Barrier,
      atomic::{AtomicUsize, Ordering},
    },
    thread,
    vec::Vec,
  };

  use platform::caps::x86;

  use super::*;

  type KernelFn = fn(u32) -> u32;

  fn wide(x: u32) -> u32 {
    x.wrapping_mul(3)
  }

  fn narrow(x: u32) -> u32 {
    x.wrapping_mul(3)
  }

  fn baseline(x: u32) -> u32 {
    x.wrapping_mul(3)
  }

  const TABLE: &[Candidate<KernelFn>] = candidates![
    "wide" => x86::AVX512F => wide,
    "mid" => x86::AVX2 => narrow,
    "narrow" => x86::SSE3 => narrow,
    "baseline" => Caps::NONE => baseline,
  ];

  #[test]
  fn select_prefers_first_match() {
    let selected = select(x86::AVX512F | x86::SSE3, TABLE).unwrap();
    assert_eq!(selected.name, "wide");
  }

  #[test]
  fn select_skips_unavailable() {
    let selected = select(x86::SSE3, TABLE).unwrap();
    assert_eq!(selected.name, "narrow");
  }

  #[test]
  fn select_falls_back_to_baseline() {
    let selected = select(Caps::NONE, TABLE).unwrap();
    assert_eq!(selected.name, "baseline");
    assert_eq!((selected.func)(7), 21);
  }

  #[test]
  fn select_without_baseline_is_config_error() {
    let table: &[Candidate<KernelFn>] = candidates!["wide" => x86::AVX512F => wide];
    assert_eq!(select(Caps::NONE, table).unwrap_err(), ConfigError::NoCandidate { caps: Caps::NONE, considered: 1 });
    assert!(select::<KernelFn>(platform::caps::ALL, &[]).is_err());
  }

  #[test]
  fn cfg_gated_candidates_are_absent() {
    let table: &[Candidate<KernelFn>] = candidates![
      #[cfg(any())]
      "never" => Caps::NONE => wide,
      "baseline" => Caps::NONE => baseline,
    ];
    assert_eq!(table.len(), 1);
    assert_eq!(select(platform::caps::ALL, table).unwrap().name, "baseline");
  }

  #[test]
  fn dispatcher_resolves_once_under_contention() {
    static PROBES: AtomicUsize = AtomicUsize::new(0);

    fn resolve() -> Result<Selected<KernelFn>, ConfigError> {
      PROBES.fetch_add(1, Ordering::SeqCst);
      select(x86::AVX2, TABLE)
    }

    static DISPATCH: Dispatcher<KernelFn> = Dispatcher::new(resolve);
    assert!(!DISPATCH.is_resolved());

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
      .map(|_| {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
          barrier.wait();
          let selected = DISPATCH.get();
          (selected.name, selected.func as usize)
        })
      })
      .collect();

    let seen: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(PROBES.load(Ordering::SeqCst), 1);
    assert!(seen.iter().all(|s| *s == seen[0]));
    assert_eq!(seen[0].0, "mid");
    assert!(DISPATCH.is_resolved());

    assert_eq!(DISPATCH.backend_name(), "mid");
    assert_eq!((DISPATCH.func())(5), 15);
    assert_eq!(PROBES.load(Ordering::SeqCst), 1);
  }

  #[test]
  #[should_panic(expected = "kernel resolution failed")]
  fn dispatcher_panics_on_broken_table() {
    fn resolve() -> Result<Selected<KernelFn>, ConfigError> {
      select(Caps::NONE, candidates!["wide" => x86::AVX512F => wide])
    }

    static DISPATCH: Dispatcher<KernelFn> = Dispatcher::new(resolve);
    let _ = DISPATCH.get();
  }
}
