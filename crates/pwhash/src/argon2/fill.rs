//! The Argon2 memory-fill entry point and its CPU-tier dispatcher.
//!
//! [`fill_segment`] looks like a direct call. The first call (from any
//! thread) probes the CPU once, walks the tier registry in preference order
//! (`avx512 > avx2 > sse3 > reference`) and binds the first compiled-in tier
//! whose capabilities are present. Every later call goes straight to the
//! bound kernel with no probing.
//!
//! # Caching Strategy
//!
//! - **std**: `OnceLock`; threads racing the first call wait for the winner
//! - **no_std**: atomic UNINIT → INITING → READY, losers spin until READY
//!
//! Either way the probe runs once and every caller observes the same kernel.
//! Call [`crate::init`] at startup to pay for resolution eagerly.

use backend::{ConfigError, Dispatcher, Selected};
use platform::Caps;

mod kernels;
mod portable;
pub(crate) mod segment;
#[cfg(target_arch = "x86_64")]
mod x86_64;


pub use kernels::{ALL, FillKernel, FillSegmentFn, FillTier, id_from_name, select_tier, select_tier_in};
pub(crate) use kernels::{REGISTRY, kernel};

use super::instance::{Instance, Position};

static FILL: Dispatcher<FillKernel> = Dispatcher::new(resolve);

fn resolve() -> Result<Selected<FillKernel>, ConfigError> {
  resolve_with(platform::caps)
}

/// Probe capabilities with `probe` and select from this build's registry.
pub(crate) fn resolve_with(probe: fn() -> Caps) -> Result<Selected<FillKernel>, ConfigError> {
  let caps = probe();
  let selected = backend::select(caps, REGISTRY)?;

  #[cfg(feature = "tracing")]
  tracing::debug!(
    tier = selected.name,
    caps = %caps,
    compiled = REGISTRY.len(),
    "argon2 fill tier resolved"
  );

  Ok(selected)
}

/// Fill one segment of `instance` at `position` with the selected kernel.
///
/// Descriptors are passed through untouched. Output is bit-identical across
/// tiers.
///
/// # Panics
///
/// On first use only, if the registry has no usable entry (a broken build).
#[inline]
pub fn fill_segment(instance: &mut Instance, position: Position) {
  (FILL.func().fill)(instance, position);
}

/// The tier [`fill_segment`] is bound to. Resolves on first call.
#[inline]
#[must_use]
pub fn selected_tier() -> FillTier {
  FILL.func().tier
}

/// Whether the tier has been resolved yet. Never triggers resolution.
#[inline]
#[must_use]
pub fn is_resolved() -> bool {
  FILL.is_resolved()
}

/// Force resolution now.
pub(crate) fn resolve_now() -> FillTier {
  selected_tier()
}
