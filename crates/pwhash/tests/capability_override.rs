//! A capability override installed before first use can only mask features.
//!
//! Kept to a single test: the override must land before anything in this
//! process resolves capabilities.

use platform::Caps;
use pwhash::argon2::{fill, selected_tier};

#[test]
fn override_with_undetected_bits_never_binds_an_unsupported_tier() {
  let detected = platform::detect_uncached();
  platform::try_set_override(Some(Caps::from_raw(u64::MAX))).unwrap();
  assert!(!fill::is_resolved());

  let caps = platform::caps();
  assert!(detected.has(caps), "caps={caps} detected={detected}");

  let tier = selected_tier();
  assert!(detected.has(tier.required_caps()), "tier={tier} detected={detected}");
  assert_eq!(fill::select_tier(detected), Ok(tier));

  assert_eq!(
    platform::try_set_override(None),
    Err(platform::OverrideError::AlreadyInitialized)
  );
}
