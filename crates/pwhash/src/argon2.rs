//! Argon2 (RFC 9106): Argon2d, Argon2i and Argon2id, versions 0x10 and 0x13.
//!
//! The memory fill runs through [`fill::fill_segment`], which binds itself on
//! first use to the fastest fill kernel the host CPU supports. Everything
//! else (H0, H', memory initialisation and finalisation) is scalar.
//!
//! # Example
//!
//! ```
//! use pwhash::{Algorithm, Argon2, Params, Version};
//!
//! let params = Params::new(64, 1, 1)?;
//! let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
//!
//! let mut tag = [0u8; 32];
//! argon2.hash_password_into(b"password", b"somesalt", &mut tag)?;
//! # Ok::<(), pwhash::Error>(())
//! ```

mod block;
pub mod fill;
mod instance;

pub use block::{BLOCK_BYTES, Block};
pub use fill::{FillTier, fill_segment, selected_tier};
pub use instance::{Instance, Position};

use crate::error::{Error, Result};

/// Slices per pass. Synchronisation points sit between slices.
pub const SYNC_POINTS: u32 = 4;

// ─────────────────────────────────────────────────────────────────────────────
// Algorithm & Version
// ─────────────────────────────────────────────────────────────────────────────

/// Argon2 variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Algorithm {
  /// Data-dependent addressing.
  Argon2d = 0,
  /// Data-independent addressing.
  Argon2i = 1,
  /// Data-independent for the first half of the first pass, data-dependent
  /// afterwards.
  #[default]
  Argon2id = 2,
}

impl Algorithm {
  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Argon2d => "argon2d",
      Self::Argon2i => "argon2i",
      Self::Argon2id => "argon2id",
    }
  }
}

impl core::fmt::Display for Algorithm {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Argon2 version number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Version {
  /// Blocks are overwritten on every pass.
  V0x10 = 0x10,
  /// Blocks are XORed into on passes after the first.
  #[default]
  V0x13 = 0x13,
}

// ─────────────────────────────────────────────────────────────────────────────
// Params
// ─────────────────────────────────────────────────────────────────────────────

/// Validated cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Params {
  m_cost: u32,
  t_cost: u32,
  lanes: u32,
}

impl Params {
  /// Minimum memory per lane, in KiB blocks.
  pub const MIN_M_COST_PER_LANE: u32 = 2 * SYNC_POINTS;
  pub const MIN_T_COST: u32 = 1;
  pub const MIN_LANES: u32 = 1;
  pub const MAX_LANES: u32 = 0xFF_FFFF;
  pub const MIN_SALT_LEN: usize = 8;
  pub const MIN_OUTPUT_LEN: usize = 4;

  pub const DEFAULT_M_COST: u32 = 19 * 1024;
  pub const DEFAULT_T_COST: u32 = 2;
  pub const DEFAULT_LANES: u32 = 1;

  /// Validate and build parameters.
  ///
  /// `m_cost` is in KiB and must be at least `8 * lanes`.
  ///
  /// # Errors
  ///
  /// [`Error::LanesTooFew`], [`Error::LanesTooMany`],
  /// [`Error::TimeTooSmall`] or [`Error::MemoryTooLittle`].
  pub const fn new(m_cost: u32, t_cost: u32, lanes: u32) -> Result<Self> {
    if lanes < Self::MIN_LANES {
      return Err(Error::LanesTooFew);
    }
    if lanes > Self::MAX_LANES {
      return Err(Error::LanesTooMany);
    }
    if t_cost < Self::MIN_T_COST {
      return Err(Error::TimeTooSmall);
    }
    if (m_cost as u64) < Self::MIN_M_COST_PER_LANE as u64 * lanes as u64 {
      return Err(Error::MemoryTooLittle);
    }
    Ok(Self { m_cost, t_cost, lanes })
  }

  #[inline]
  #[must_use]
  pub const fn m_cost(&self) -> u32 {
    self.m_cost
  }

  #[inline]
  #[must_use]
  pub const fn t_cost(&self) -> u32 {
    self.t_cost
  }

  #[inline]
  #[must_use]
  pub const fn lanes(&self) -> u32 {
    self.lanes
  }

  /// Blocks actually allocated: `m_cost` rounded down to a multiple of
  /// `4 * lanes`.
  #[inline]
  #[must_use]
  pub const fn block_count(&self) -> u32 {
    let unit = SYNC_POINTS * self.lanes;
    (self.m_cost / unit) * unit
  }

  #[inline]
  #[must_use]
  pub const fn lane_length(&self) -> u32 {
    self.block_count() / self.lanes
  }

  #[inline]
  #[must_use]
  pub const fn segment_length(&self) -> u32 {
    self.lane_length() / SYNC_POINTS
  }
}

impl Default for Params {
  fn default() -> Self {
    Self {
      m_cost: Self::DEFAULT_M_COST,
      t_cost: Self::DEFAULT_T_COST,
      lanes: Self::DEFAULT_LANES,
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Argon2
// ─────────────────────────────────────────────────────────────────────────────

/// An Argon2 context: variant, version and cost parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Argon2 {
  algorithm: Algorithm,
  version: Version,
  params: Params,
}

impl Argon2 {
  #[inline]
  #[must_use]
  pub const fn new(algorithm: Algorithm, version: Version, params: Params) -> Self {
    Self {
      algorithm,
      version,
      params,
    }
  }

  #[inline]
  #[must_use]
  pub const fn algorithm(&self) -> Algorithm {
    self.algorithm
  }

  #[inline]
  #[must_use]
  pub const fn version(&self) -> Version {
    self.version
  }

  #[inline]
  #[must_use]
  pub const fn params(&self) -> &Params {
    &self.params
  }

  /// Hash `pwd` with `salt`, writing a tag of `out.len()` bytes.
  ///
  /// # Errors
  ///
  /// Input-length errors (see [`Error`]) or [`Error::MemoryTooMuch`] if the
  /// memory matrix cannot be allocated.
  pub fn hash_password_into(&self, pwd: &[u8], salt: &[u8], out: &mut [u8]) -> Result<()> {
    self.hash_password_into_with(pwd, salt, &[], &[], out)
  }

  /// [`hash_password_into`](Self::hash_password_into) with a secret key and
  /// associated data.
  ///
  /// # Errors
  ///
  /// As for [`hash_password_into`](Self::hash_password_into), plus
  /// [`Error::SecretTooLong`] and [`Error::AdTooLong`].
  pub fn hash_password_into_with(
    &self,
    pwd: &[u8],
    salt: &[u8],
    secret: &[u8],
    ad: &[u8],
    out: &mut [u8],
  ) -> Result<()> {
    let mut instance = Instance::new(self, pwd, salt, secret, ad, out.len())?;
    instance.fill_memory();
    instance.finalize(out)
  }
}
