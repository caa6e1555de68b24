use backend::{Candidate, ConfigError, candidates, select};
use platform::{Caps, caps::x86};

use crate::argon2::instance::{Instance, Position};

/// Signature shared by every fill kernel.
pub type FillSegmentFn = fn(&mut Instance, Position);

/// Instruction-set tier of a fill kernel.
///
/// Ordered by preference: `Avx512 > Avx2 > Sse3 > Reference`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FillTier {
  /// Portable `u64` code. Always compiled, runs everywhere.
  Reference = 0,
  Sse3 = 1,
  Avx2 = 2,
  Avx512 = 3,
}

/// Every tier, most preferred first.
pub const ALL: &[FillTier] = &[FillTier::Avx512, FillTier::Avx2, FillTier::Sse3, FillTier::Reference];

impl FillTier {
  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Reference => "reference",
      Self::Sse3 => "x86_64/sse3",
      Self::Avx2 => "x86_64/avx2",
      Self::Avx512 => "x86_64/avx512",
    }
  }

  /// Capabilities the tier's kernel needs at runtime.
  #[inline]
  #[must_use]
  pub const fn required_caps(self) -> Caps {
    match self {
      Self::Reference => Caps::NONE,
      Self::Sse3 => x86::SSE3,
      Self::Avx2 => x86::AVX2,
      Self::Avx512 => x86::AVX512F,
    }
  }

  /// Whether this build carries the tier's kernel.
  #[inline]
  #[must_use]
  pub const fn is_compiled(self) -> bool {
    kernel(self).is_some()
  }
}

impl core::fmt::Display for FillTier {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Parse a tier from its [`FillTier::as_str`] name.
#[must_use]
pub fn id_from_name(name: &str) -> Option<FillTier> {
  ALL.iter().copied().find(|tier| tier.as_str() == name)
}

/// A registry entry: the kernel plus the tier it belongs to.
#[derive(Clone, Copy, Debug)]
pub struct FillKernel {
  pub tier: FillTier,
  pub fill: FillSegmentFn,
}

impl FillKernel {
  pub const REFERENCE: Self = Self {
    tier: FillTier::Reference,
    fill: super::portable::fill_segment_reference,
  };
}

/// The kernel for `tier`, or `None` when the tier is not compiled in.
#[must_use]
pub(crate) const fn kernel(tier: FillTier) -> Option<FillSegmentFn> {
  match tier {
    FillTier::Reference => Some(super::portable::fill_segment_reference),
    #[cfg(all(target_arch = "x86_64", feature = "sse3"))]
    FillTier::Sse3 => Some(super::x86_64::sse3::fill_segment_sse3_runtime),
    #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
    FillTier::Avx2 => Some(super::x86_64::avx2::fill_segment_avx2_runtime),
    #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
    FillTier::Avx512 => Some(super::x86_64::avx512::fill_segment_avx512_runtime),
    #[allow(unreachable_patterns)]
    _ => None,
  }
}

/// Compiled-in fill kernels, most preferred first, ending in the reference
/// baseline.
pub(crate) const REGISTRY: &[Candidate<FillKernel>] = candidates![
  #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
  "x86_64/avx512" => x86::AVX512F => FillKernel {
    tier: FillTier::Avx512,
    fill: super::x86_64::avx512::fill_segment_avx512_runtime,
  },
  #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
  "x86_64/avx2" => x86::AVX2 => FillKernel {
    tier: FillTier::Avx2,
    fill: super::x86_64::avx2::fill_segment_avx2_runtime,
  },
  #[cfg(all(target_arch = "x86_64", feature = "sse3"))]
  "x86_64/sse3" => x86::SSE3 => FillKernel {
    tier: FillTier::Sse3,
    fill: super::x86_64::sse3::fill_segment_sse3_runtime,
  },
  "reference" => Caps::NONE => FillKernel::REFERENCE,
];

/// Tier the registry picks for `caps`.
///
/// # Errors
///
/// Only if `registry` lacks a baseline entry.
pub fn select_tier_in(caps: Caps, registry: &[Candidate<FillKernel>]) -> Result<FillTier, ConfigError> {
  select(caps, registry).map(|selected| selected.func.tier)
}

/// Tier this build's registry picks for `caps`.
///
/// # Errors
///
/// Never for this build's registry, which always ends in the reference tier.
pub fn select_tier(caps: Caps) -> Result<FillTier, ConfigError> {
  select_tier_in(caps, REGISTRY)
}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::vec::Vec;

  use super::*;

  #[test]
  fn registry_is_in_preference_order_and_ends_in_baseline() {
    let tiers: Vec<FillTier> = REGISTRY.iter().map(|c| c.func.tier).collect();
    assert!(tiers.windows(2).all(|w| w[0] > w[1]), "{tiers:?}");
    let last = REGISTRY.last().unwrap();
    assert_eq!(last.func.tier, FillTier::Reference);
    assert_eq!(last.requires, Caps::NONE);
    for candidate in REGISTRY {
      assert_eq!(candidate.name, candidate.func.tier.as_str());
      assert_eq!(candidate.requires, candidate.func.tier.required_caps());
    }
  }

  #[test]
  fn registry_matches_compiled_tiers() {
    for &tier in ALL {
      assert_eq!(REGISTRY.iter().any(|c| c.func.tier == tier), tier.is_compiled(), "{tier}");
    }
  }

  #[test]
  fn tier_order() {
    assert!(FillTier::Avx512 > FillTier::Avx2);
    assert!(FillTier::Avx2 > FillTier::Sse3);
    assert!(FillTier::Sse3 > FillTier::Reference);
  }

  #[test]
  fn names_roundtrip() {
    for &tier in ALL {
      assert_eq!(id_from_name(tier.as_str()), Some(tier));
    }
    assert_eq!(id_from_name("x86_64/avx512bw"), None);
  }

  #[test]
  fn no_caps_selects_reference() {
    assert_eq!(select_tier(Caps::NONE), Ok(FillTier::Reference));
  }

  #[test]
  fn reference_only_registry_ignores_caps() {
    let registry: &[Candidate<FillKernel>] = candidates!["reference" => Caps::NONE => FillKernel::REFERENCE];
    for caps in [Caps::NONE, x86::SSE3, x86::AVX2 | x86::SSE3, platform::caps::ALL] {
      assert_eq!(select_tier_in(caps, registry), Ok(FillTier::Reference));
    }
  }
}
