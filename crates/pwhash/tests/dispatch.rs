//! Properties of the public fill dispatcher.

use std::{sync::Arc, thread};

use pwhash::{
  Algorithm, Argon2, FillTier, Params, Version,
  __internal::kernel_test::{run_all_fill_kernels, verify_fill_kernels},
  argon2::{Instance, Position, SYNC_POINTS, fill, fill_segment, selected_tier},
};

#[test]
fn init_binds_the_same_tier_as_lazy_resolution() {
  let eager = pwhash::init();
  assert!(fill::is_resolved());
  assert_eq!(selected_tier(), eager);
  assert_eq!(pwhash::init(), eager);
}

#[test]
fn bound_tier_is_compiled_and_supported() {
  let tier = selected_tier();
  assert!(tier.is_compiled(), "{tier}");
  assert!(platform::caps().has(tier.required_caps()), "{tier} on {}", platform::caps());
  assert_eq!(fill::select_tier(platform::caps()), Ok(tier));
}

#[test]
fn bound_tier_is_the_most_preferred_runnable_one() {
  let caps = platform::caps();
  let best = fill::ALL
    .iter()
    .copied()
    .find(|t| t.is_compiled() && caps.has(t.required_caps()))
    .unwrap_or(FillTier::Reference);
  assert_eq!(selected_tier(), best);
}

#[test]
fn bound_tier_name_parses_back() {
  let tier = selected_tier();
  assert_eq!(fill::id_from_name(tier.as_str()), Some(tier));
  assert_eq!(fill::id_from_name("reference"), Some(FillTier::Reference));
  assert_eq!(fill::id_from_name("x86_64/avx512vl"), None);
}

#[test]
fn reference_tier_is_always_compiled() {
  assert!(FillTier::Reference.is_compiled());
  assert_eq!(fill::select_tier(platform::Caps::NONE), Ok(FillTier::Reference));
}

#[test]
fn manual_segment_walk_matches_one_shot_hash() {
  let ctx = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::new(64, 2, 2).unwrap());
  let mut instance = Instance::new(&ctx, b"password", b"somesalt", &[], &[], 32).unwrap();
  for pass in 0..instance.passes() {
    for slice in 0..SYNC_POINTS as u8 {
      for lane in 0..instance.lanes() {
        fill_segment(&mut instance, Position::new(pass, slice, lane));
      }
    }
  }
  let mut walked = [0u8; 32];
  instance.finalize(&mut walked).unwrap();

  let mut direct = [0u8; 32];
  ctx.hash_password_into(b"password", b"somesalt", &mut direct).unwrap();
  assert_eq!(walked, direct);
}

#[test]
fn runnable_kernels_agree_with_each_other() {
  for algorithm in [Algorithm::Argon2d, Algorithm::Argon2i, Algorithm::Argon2id] {
    for version in [Version::V0x10, Version::V0x13] {
      let ctx = Argon2::new(algorithm, version, Params::new(48, 2, 3).unwrap());
      verify_fill_kernels(&ctx, b"pwd", b"saltsalt", b"secret", b"ad").unwrap();
    }
  }
}

#[test]
fn reference_is_always_among_runnable_kernels() {
  let ctx = Argon2::new(Algorithm::Argon2d, Version::V0x13, Params::new(8, 1, 1).unwrap());
  let results = run_all_fill_kernels(&ctx, b"pwd", b"saltsalt", &[], &[]).unwrap();
  assert!(results.iter().any(|r| r.tier == FillTier::Reference));
  assert!(results.iter().any(|r| r.tier == selected_tier()));
}

#[test]
fn concurrent_hashing_is_deterministic() {
  let ctx = Arc::new(Argon2::new(Algorithm::Argon2i, Version::V0x13, Params::new(32, 1, 4).unwrap()));
  let handles: Vec<_> = (0..8)
    .map(|_| {
      let ctx = Arc::clone(&ctx);
      thread::spawn(move || {
        let mut tag = [0u8; 32];
        ctx.hash_password_into(b"password", b"somesalt", &mut tag).unwrap();
        (selected_tier(), tag)
      })
    })
    .collect();

  let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
  assert!(results.iter().all(|r| *r == results[0]));
}
