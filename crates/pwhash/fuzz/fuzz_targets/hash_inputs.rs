#![no_main]

use libfuzzer_sys::fuzz_target;
use pwhash::{Argon2, Params};

fuzz_target!(|input: &[u8]| {
  // Layout:
  // - 1 byte: out_len (mod 200)
  // - 1 byte: salt_len (mod 24)
  // - rest: salt followed by password
  let out_len = input.first().copied().unwrap_or(0) as usize % 200;
  let salt_len = input.get(1).copied().unwrap_or(0) as usize % 24;
  let rest = input.get(2..).unwrap_or(&[]);
  let split = salt_len.min(rest.len());
  let (salt, pwd) = rest.split_at(split);

  let ctx = Argon2::new(Default::default(), Default::default(), Params::new(16, 1, 2).expect("static params"));
  let mut a = vec![0u8; out_len];
  let mut b = vec![0u8; out_len];
  let ra = ctx.hash_password_into(pwd, salt, &mut a);
  let rb = ctx.hash_password_into(pwd, salt, &mut b);
  assert_eq!(ra, rb);

  match ra {
    Ok(()) => assert_eq!(a, b),
    Err(_) => assert!(salt.len() < Params::MIN_SALT_LEN || out_len < Params::MIN_OUTPUT_LEN),
  }
});
