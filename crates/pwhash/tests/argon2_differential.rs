//! Differential tests against the RustCrypto `argon2` crate.

use proptest::prelude::*;
use pwhash::{Algorithm, Argon2, Params, Version};

fn oracle_algorithm(algorithm: Algorithm) -> argon2::Algorithm {
  match algorithm {
    Algorithm::Argon2d => argon2::Algorithm::Argon2d,
    Algorithm::Argon2i => argon2::Algorithm::Argon2i,
    Algorithm::Argon2id => argon2::Algorithm::Argon2id,
  }
}

fn oracle_version(version: Version) -> argon2::Version {
  match version {
    Version::V0x10 => argon2::Version::V0x10,
    Version::V0x13 => argon2::Version::V0x13,
  }
}

#[allow(clippy::too_many_arguments)]
fn oracle(
  algorithm: Algorithm,
  version: Version,
  m: u32,
  t: u32,
  p: u32,
  pwd: &[u8],
  salt: &[u8],
  secret: &[u8],
  ad: &[u8],
  out_len: usize,
) -> Vec<u8> {
  let params = argon2::ParamsBuilder::new()
    .m_cost(m)
    .t_cost(t)
    .p_cost(p)
    .data(argon2::AssociatedData::new(ad).unwrap())
    .output_len(out_len)
    .build()
    .unwrap();
  let ctx = argon2::Argon2::new_with_secret(secret, oracle_algorithm(algorithm), oracle_version(version), params).unwrap();
  let mut out = vec![0u8; out_len];
  ctx.hash_password_into(pwd, salt, &mut out).unwrap();
  out
}

#[allow(clippy::too_many_arguments)]
fn ours(
  algorithm: Algorithm,
  version: Version,
  m: u32,
  t: u32,
  p: u32,
  pwd: &[u8],
  salt: &[u8],
  secret: &[u8],
  ad: &[u8],
  out_len: usize,
) -> Vec<u8> {
  let ctx = Argon2::new(algorithm, version, Params::new(m, t, p).unwrap());
  let mut out = vec![0u8; out_len];
  ctx.hash_password_into_with(pwd, salt, secret, ad, &mut out).unwrap();
  out
}

fn arb_algorithm() -> impl Strategy<Value = Algorithm> {
  prop_oneof![Just(Algorithm::Argon2d), Just(Algorithm::Argon2i), Just(Algorithm::Argon2id)]
}

fn arb_version() -> impl Strategy<Value = Version> {
  prop_oneof![Just(Version::V0x10), Just(Version::V0x13)]
}

#[test]
fn default_params_match_oracle() {
  let ctx = Argon2::default();
  let mut ours = [0u8; 32];
  ctx.hash_password_into(b"password", b"somesalt", &mut ours).unwrap();

  let mut expected = [0u8; 32];
  argon2::Argon2::default().hash_password_into(b"password", b"somesalt", &mut expected).unwrap();
  assert_eq!(ours, expected);
}

#[test]
fn long_tags_match_oracle() {
  for out_len in [4usize, 63, 64, 65, 96, 129, 1024] {
    for version in [Version::V0x10, Version::V0x13] {
      assert_eq!(
        ours(Algorithm::Argon2id, version, 32, 2, 2, b"pwd", b"saltsalt", &[], &[], out_len),
        oracle(Algorithm::Argon2id, version, 32, 2, 2, b"pwd", b"saltsalt", &[], &[], out_len),
        "out_len={out_len} {version:?}"
      );
    }
  }
}

#[test]
fn multi_address_block_segments_match_oracle() {
  // 1024 blocks over 2 lanes: 128-block segments, and 1200 over 2: 150.
  for m in [1024u32, 1200] {
    for algorithm in [Algorithm::Argon2i, Algorithm::Argon2id] {
      assert_eq!(
        ours(algorithm, Version::V0x13, m, 2, 2, b"pwd", b"saltsalt", &[], &[], 32),
        oracle(algorithm, Version::V0x13, m, 2, 2, b"pwd", b"saltsalt", &[], &[], 32),
        "m={m} {algorithm}"
      );
    }
  }
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(48))]

  #[test]
  fn random_inputs_match_oracle(
    algorithm in arb_algorithm(),
    version in arb_version(),
    p in 1u32..=4,
    extra in 0u32..40,
    t in 1u32..=3,
    pwd in proptest::collection::vec(any::<u8>(), 0..64),
    salt in proptest::collection::vec(any::<u8>(), 8..32),
    secret in proptest::collection::vec(any::<u8>(), 0..32),
    ad in proptest::collection::vec(any::<u8>(), 0..32),
    out_len in 4usize..=80,
  ) {
    let m = 8 * p + extra;
    prop_assert_eq!(
      ours(algorithm, version, m, t, p, &pwd, &salt, &secret, &ad, out_len),
      oracle(algorithm, version, m, t, p, &pwd, &salt, &secret, &ad, out_len)
    );
  }
}
