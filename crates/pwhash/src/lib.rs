//! Argon2 password hashing with a runtime CPU-tier dispatcher for the memory
//! fill.
//!
//! The memory-hard core of Argon2 is the segment fill: millions of calls to
//! the BlaMka compression G. This crate ships four implementations of it
//! (AVX-512F, AVX2, SSE3 and a portable reference) and binds
//! [`argon2::fill_segment`] to the fastest one the host supports the first
//! time it is called.
//!
//! # Quick Start
//!
//! ```
//! use pwhash::{Argon2, Params};
//!
//! let argon2 = Argon2::new(pwhash::Algorithm::Argon2id, pwhash::Version::V0x13, Params::new(64, 1, 1)?);
//! let mut tag = [0u8; 32];
//! argon2.hash_password_into(b"hunter2", b"NaCl-salt", &mut tag)?;
//! # Ok::<(), pwhash::Error>(())
//! ```
//!
//! # Dispatch
//!
//! | Tier | Requires | Cargo feature |
//! |------|----------|---------------|
//! | `x86_64/avx512` | AVX-512F | `avx512` |
//! | `x86_64/avx2` | AVX2 | `avx2` |
//! | `x86_64/sse3` | SSE3 | `sse3` |
//! | `reference` | nothing | always |
//!
//! Resolution is lazy and happens once per process. [`init`] resolves
//! eagerly; [`argon2::selected_tier`] reports the choice.
//!
//! # Features
//!
//! - `std` (default): runtime CPU detection and `OnceLock` caching
//! - `sse3`, `avx2`, `avx512` (default): compile the matching fill tier
//! - `tracing` (default): log the resolved tier at `debug` level

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod argon2;
pub mod blake2b;
mod error;

pub use argon2::{Algorithm, Argon2, FillTier, Params, Version};
pub use error::{Error, Result};

/// Resolve the fill tier now instead of on the first hash.
///
/// Idempotent; returns the bound tier.
#[inline]
pub fn init() -> FillTier {
  argon2::fill::resolve_now()
}

#[doc(hidden)]
pub mod __internal {
  pub mod kernel_test {
    pub use crate::argon2::fill::kernel_test::{KernelResult, run_all_fill_kernels, verify_fill_kernels};
  }
}
