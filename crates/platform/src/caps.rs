//! CPU capability representation.
//!
//! [`Caps`] answers one question: "which of the instruction-set tiers we
//! ship kernels for may legally run on this machine?"
//!
//! The set of tracked features is deliberately closed. Only the extensions
//! that gate a kernel tier (plus the architecture baseline) get a bit; there
//! is no general-purpose feature inventory here.
//!
//! # Usage
//!
//! ```
//! use platform::{Caps, caps::x86};
//!
//! let host = platform::caps();
//! if host.has(x86::AVX2) {
//!   // AVX2 kernel is safe to call
//! }
//! assert!(host.has(Caps::NONE));
//! ```

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Core Capability Type
// ─────────────────────────────────────────────────────────────────────────────

/// CPU capabilities: a small feature bitset.
///
/// `Caps` is `Copy`, `Send`, and `Sync`; the detected value is computed once
/// per process and handed out by copy.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Caps(pub(crate) u64);

impl Caps {
  /// Empty capability set. Every baseline kernel requires exactly this.
  pub const NONE: Self = Self(0);

  /// Create a capability set from its raw word.
  ///
  /// Only available in test builds or with the `testing` feature.
  #[cfg(any(test, feature = "testing"))]
  #[inline]
  #[must_use]
  pub const fn from_raw(bits: u64) -> Self {
    Self(bits)
  }

  /// Raw underlying word.
  #[cfg(any(test, feature = "testing"))]
  #[inline]
  #[must_use]
  pub const fn as_raw(self) -> u64 {
    self.0
  }

  /// Check if all features in `required` are present.
  #[inline(always)]
  #[must_use]
  pub const fn has(self, required: Self) -> bool {
    (self.0 & required.0) == required.0
  }

  /// Union of two capability sets.
  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }

  /// Intersection of two capability sets.
  #[inline]
  #[must_use]
  pub const fn intersection(self, other: Self) -> Self {
    Self(self.0 & other.0)
  }

  /// Features in `self` that are not in `other`.
  #[inline]
  #[must_use]
  pub const fn difference(self, other: Self) -> Self {
    Self(self.0 & !other.0)
  }

  #[inline]
  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }

  /// Number of features present.
  #[inline]
  #[must_use]
  pub const fn count(self) -> u32 {
    self.0.count_ones()
  }

  /// Capability set with a single bit set. `bit` must be below 64.
  #[inline]
  #[must_use]
  pub const fn bit(bit: u8) -> Self {
    assert!(bit < 64, "capability bit out of range");
    Self(1u64 << bit)
  }

  /// Iterate over the names of the known features present in `self`.
  pub fn names(self) -> impl Iterator<Item = &'static str> {
    KNOWN.iter().filter(move |(_, caps)| self.has(*caps)).map(|(name, _)| *name)
  }
}

impl core::ops::BitOr for Caps {
  type Output = Self;

  #[inline]
  fn bitor(self, rhs: Self) -> Self::Output {
    self.union(rhs)
  }
}

impl core::ops::BitAnd for Caps {
  type Output = Self;

  #[inline]
  fn bitand(self, rhs: Self) -> Self::Output {
    self.intersection(rhs)
  }
}

impl core::ops::BitOrAssign for Caps {
  #[inline]
  fn bitor_assign(&mut self, rhs: Self) {
    *self = self.union(rhs);
  }
}

impl fmt::Debug for Caps {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Caps(")?;
    f.debug_list().entries(self.names()).finish()?;
    f.write_str(")")
  }
}

impl fmt::Display for Caps {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for name in self.names() {
      if !first {
        f.write_str(",")?;
      }
      f.write_str(name)?;
      first = false;
    }
    if first {
      f.write_str("none")?;
    }
    Ok(())
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86/x86_64 Features
// ─────────────────────────────────────────────────────────────────────────────

/// x86/x86_64 features that gate a kernel tier.
///
/// The constants exist on every target so dispatch tables and tests can name
/// them; detection only ever sets them on x86.
pub mod x86 {
  use super::Caps;

  /// Architectural baseline on x86_64.
  pub const SSE2: Caps = Caps::bit(0);
  pub const SSE3: Caps = Caps::bit(1);
  pub const AVX2: Caps = Caps::bit(2);
  /// AVX-512 Foundation. Also requires OS support for ZMM state.
  pub const AVX512F: Caps = Caps::bit(3);
}

/// Every feature this crate knows how to report, in bit order.
const KNOWN: &[(&str, Caps)] =
  &[("sse2", x86::SSE2), ("sse3", x86::SSE3), ("avx2", x86::AVX2), ("avx512f", x86::AVX512F)];

/// Union of every known feature.
pub const ALL: Caps = x86::SSE2.union(x86::SSE3).union(x86::AVX2).union(x86::AVX512F);
