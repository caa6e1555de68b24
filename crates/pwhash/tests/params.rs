//! Parameter and input validation.

use pwhash::{Algorithm, Argon2, Error, Params, Version};

fn ctx() -> Argon2 {
  Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::new(8, 1, 1).unwrap())
}

#[test]
fn lanes_bounds() {
  assert_eq!(Params::new(64, 1, 0), Err(Error::LanesTooFew));
  assert_eq!(Params::new(u32::MAX, 1, Params::MAX_LANES + 1), Err(Error::LanesTooMany));
  assert!(Params::new(8 * Params::MAX_LANES, 1, Params::MAX_LANES).is_ok());
}

#[test]
fn time_cost_must_be_positive() {
  assert_eq!(Params::new(64, 0, 1), Err(Error::TimeTooSmall));
}

#[test]
fn memory_must_cover_two_blocks_per_slice() {
  assert_eq!(Params::new(7, 1, 1), Err(Error::MemoryTooLittle));
  assert_eq!(Params::new(31, 1, 4), Err(Error::MemoryTooLittle));
  assert!(Params::new(32, 1, 4).is_ok());
}

#[test]
fn memory_rounds_down_to_whole_segments() {
  let params = Params::new(37, 1, 2).unwrap();
  assert_eq!(params.block_count(), 32);
  assert_eq!(params.lane_length(), 16);
  assert_eq!(params.segment_length(), 4);
}

#[test]
fn default_params() {
  let params = Params::default();
  assert_eq!(params.m_cost(), 19 * 1024);
  assert_eq!(params.t_cost(), 2);
  assert_eq!(params.lanes(), 1);
}

#[test]
fn salt_too_short() {
  let mut out = [0u8; 32];
  assert_eq!(ctx().hash_password_into(b"pwd", b"1234567", &mut out), Err(Error::SaltTooShort));
  assert!(ctx().hash_password_into(b"pwd", b"12345678", &mut out).is_ok());
}

#[test]
fn output_too_short() {
  let mut out = [0u8; 3];
  assert_eq!(ctx().hash_password_into(b"pwd", b"saltsalt", &mut out), Err(Error::OutputTooShort));
  let mut out = [0u8; 4];
  assert!(ctx().hash_password_into(b"pwd", b"saltsalt", &mut out).is_ok());
}

#[test]
fn rejected_inputs_leave_output_untouched() {
  let mut out = [0xAAu8; 32];
  assert!(ctx().hash_password_into(b"pwd", b"short", &mut out).is_err());
  assert_eq!(out, [0xAA; 32]);
}

#[test]
fn errors_display() {
  assert_eq!(Error::SaltTooShort.to_string(), "salt is too short");
  assert_eq!(Error::MemoryTooLittle.to_string(), "memory cost is too small");
}
