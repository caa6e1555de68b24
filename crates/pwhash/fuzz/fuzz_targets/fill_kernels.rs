#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pwhash::{Algorithm, Argon2, Params, Version, __internal::kernel_test::verify_fill_kernels};

#[derive(Arbitrary, Debug)]
struct Input {
  algorithm: u8,
  v0x10: bool,
  lanes: u8,
  extra_blocks: u8,
  passes: u8,
  pwd: Vec<u8>,
  salt: [u8; 16],
  secret: Vec<u8>,
  ad: Vec<u8>,
}

fuzz_target!(|input: Input| {
  let algorithm = match input.algorithm % 3 {
    0 => Algorithm::Argon2d,
    1 => Algorithm::Argon2i,
    _ => Algorithm::Argon2id,
  };
  let version = if input.v0x10 { Version::V0x10 } else { Version::V0x13 };

  // Small matrices keep each run fast; up to 4 lanes and 3 passes.
  let lanes = u32::from(input.lanes % 4) + 1;
  let m_cost = 8 * lanes + u32::from(input.extra_blocks % 64);
  let t_cost = u32::from(input.passes % 3) + 1;
  let Ok(params) = Params::new(m_cost, t_cost, lanes) else {
    return;
  };

  let ctx = Argon2::new(algorithm, version, params);
  verify_fill_kernels(&ctx, &input.pwd, &input.salt, &input.secret, &input.ad).expect("argon2 fill kernels should agree");
});
