//! CPU capability detection for the pwhash workspace.
//!
//! This crate is the single source of truth for "which instruction-set tiers
//! may run on this machine". Algorithm crates query [`caps()`] instead of
//! doing ad-hoc detection.
//!
//! # Design
//!
//! 1. **One probe**: detection runs once per process and is cached in a `OnceLock` (std) or an
//!    atomic state machine (no_std).
//! 2. **Closed feature set**: only features that gate a shipped kernel tier are tracked.
//! 3. **Compile-time first**: features enabled via `-C target-feature` are always reported, even
//!    without `std`.
//! 4. **Pre-init override**: bare metal and tests can pin the capability set before first use.
//! 5. **Miri-safe**: under Miri, no capabilities are reported.
//!
//! # Example
//!
//! ```
//! use platform::caps::x86;
//!
//! let caps = platform::caps();
//! if caps.has(x86::AVX2) {
//!   // AVX2 path
//! }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod caps;
mod detect;

pub use caps::Caps;
pub use detect::{OverrideError, caps, caps_static, detect_uncached, has_override, is_initialized, try_set_override};
