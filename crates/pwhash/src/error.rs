//! Error types for Argon2 parameter and input validation.
//!
//! Every variant except [`Error::MemoryTooMuch`] is detected before any
//! memory is allocated or hashed; `MemoryTooMuch` reports the allocation
//! failure itself.

use core::fmt;

/// Argon2 validation or allocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
  /// Associated data longer than 2^32 - 1 bytes.
  AdTooLong,
  /// Fewer than one lane.
  LanesTooFew,
  /// More than 2^24 - 1 lanes.
  LanesTooMany,
  /// `m_cost` below `8 * lanes` KiB.
  MemoryTooLittle,
  /// The memory matrix could not be allocated.
  MemoryTooMuch,
  /// Output tag shorter than 4 bytes.
  OutputTooShort,
  /// Output tag longer than 2^32 - 1 bytes.
  OutputTooLong,
  /// Password longer than 2^32 - 1 bytes.
  PwdTooLong,
  /// Salt shorter than 8 bytes.
  SaltTooShort,
  /// Salt longer than 2^32 - 1 bytes.
  SaltTooLong,
  /// Secret longer than 2^32 - 1 bytes.
  SecretTooLong,
  /// `t_cost` of zero.
  TimeTooSmall,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::AdTooLong => "associated data is too long",
      Self::LanesTooFew => "too few lanes",
      Self::LanesTooMany => "too many lanes",
      Self::MemoryTooLittle => "memory cost is too small",
      Self::MemoryTooMuch => "memory cost is too large",
      Self::OutputTooShort => "output is too short",
      Self::OutputTooLong => "output is too long",
      Self::PwdTooLong => "password is too long",
      Self::SaltTooShort => "salt is too short",
      Self::SaltTooLong => "salt is too long",
      Self::SecretTooLong => "secret is too long",
      Self::TimeTooSmall => "time cost is too small",
    })
  }
}

impl core::error::Error for Error {}

/// Result alias for this crate.
pub type Result<T> = core::result::Result<T, Error>;
