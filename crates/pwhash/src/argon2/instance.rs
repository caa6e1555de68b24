//! Argon2 working state: the memory matrix and the segment descriptors the
//! fill kernels operate on.

extern crate alloc;

use alloc::vec::Vec;

use zeroize::Zeroize;

use super::{Algorithm, Argon2, SYNC_POINTS, Version, block::Block, fill};
use crate::{
  blake2b,
  error::{Error, Result},
};

/// Identifies one segment of the memory matrix: a (pass, slice, lane) cell,
/// plus the block index within the segment where filling begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
  pub pass: u32,
  pub lane: u32,
  /// `0..SYNC_POINTS`.
  pub slice: u8,
  /// First block within the segment to compute. The scheduler always passes
  /// 0; the two seeded blocks of pass 0 slice 0 are skipped regardless.
  pub index: u32,
}

impl Position {
  #[inline]
  #[must_use]
  pub const fn new(pass: u32, slice: u8, lane: u32) -> Self {
    Self {
      pass,
      lane,
      slice,
      index: 0,
    }
  }
}

/// The memory matrix and the parameters that shape it.
///
/// Created by [`Instance::new`] with the first two blocks of every lane
/// already seeded from H0. Memory is wiped when the instance is dropped.
#[derive(Clone)]
pub struct Instance {
  memory: Vec<Block>,
  tag_len: u32,
  passes: u32,
  lanes: u32,
  lane_length: u32,
  segment_length: u32,
  memory_blocks: u32,
  algorithm: Algorithm,
  version: Version,
}

impl Instance {
  /// Validate inputs, compute H0 and seed the memory matrix.
  ///
  /// # Errors
  ///
  /// Returns the first failing input check, or [`Error::MemoryTooMuch`] if
  /// the matrix cannot be allocated.
  pub fn new(ctx: &Argon2, pwd: &[u8], salt: &[u8], secret: &[u8], ad: &[u8], out_len: usize) -> Result<Self> {
    check_len(pwd, Error::PwdTooLong)?;
    check_len(salt, Error::SaltTooLong)?;
    check_len(secret, Error::SecretTooLong)?;
    check_len(ad, Error::AdTooLong)?;
    if salt.len() < super::Params::MIN_SALT_LEN {
      return Err(Error::SaltTooShort);
    }
    if out_len < super::Params::MIN_OUTPUT_LEN {
      return Err(Error::OutputTooShort);
    }
    if u32::try_from(out_len).is_err() {
      return Err(Error::OutputTooLong);
    }

    let params = ctx.params();
    let memory_blocks = params.block_count();

    let mut memory = Vec::new();
    memory.try_reserve_exact(memory_blocks as usize).map_err(|_| Error::MemoryTooMuch)?;
    memory.resize(memory_blocks as usize, Block::ZERO);

    let mut instance = Self {
      memory,
      tag_len: out_len as u32,
      passes: params.t_cost(),
      lanes: params.lanes(),
      lane_length: params.lane_length(),
      segment_length: params.segment_length(),
      memory_blocks,
      algorithm: ctx.algorithm(),
      version: ctx.version(),
    };

    let mut h0 = initial_hash(ctx, pwd, salt, secret, ad, out_len as u32);
    instance.seed(&h0);
    h0.zeroize();
    Ok(instance)
  }

  /// Blocks 0 and 1 of each lane: `H'^1024(H0 || LE32(i) || LE32(lane))`.
  fn seed(&mut self, h0: &[u8; 64]) {
    let mut bytes = [0u8; super::BLOCK_BYTES];
    for lane in 0..self.lanes {
      for i in 0..2u32 {
        blake2b::hash_long(&[&h0[..], &i.to_le_bytes()[..], &lane.to_le_bytes()[..]], &mut bytes);
        let at = self.block_index(lane, i);
        self.memory[at] = Block::from_le_bytes(&bytes);
      }
    }
    bytes.zeroize();
  }

  /// Run every pass through the dispatched fill kernel.
  pub fn fill_memory(&mut self) {
    self.fill_memory_with(fill::fill_segment);
  }

  /// Run every pass with an explicit fill kernel.
  pub(crate) fn fill_memory_with(&mut self, kernel: fill::FillSegmentFn) {
    for pass in 0..self.passes {
      for slice in 0..SYNC_POINTS as u8 {
        for lane in 0..self.lanes {
          kernel(self, Position::new(pass, slice, lane));
        }
      }
    }
  }

  /// XOR the last block of every lane and hash it into `out`.
  ///
  /// # Errors
  ///
  /// [`Error::OutputTooShort`] or [`Error::OutputTooLong`] when `out` is not
  /// the tag length H0 was computed with; `out` is left untouched.
  pub fn finalize(&self, out: &mut [u8]) -> Result<()> {
    match out.len().cmp(&(self.tag_len as usize)) {
      core::cmp::Ordering::Less => return Err(Error::OutputTooShort),
      core::cmp::Ordering::Greater => return Err(Error::OutputTooLong),
      core::cmp::Ordering::Equal => {}
    }

    let mut acc = self.memory[self.block_index(0, self.lane_length - 1)];
    for lane in 1..self.lanes {
      acc ^= &self.memory[self.block_index(lane, self.lane_length - 1)];
    }
    let mut bytes = acc.to_le_bytes();
    blake2b::hash_long(&[&bytes[..]], out);
    bytes.zeroize();
    acc.0.zeroize();
    Ok(())
  }

  #[inline]
  #[must_use]
  pub(crate) const fn block_index(&self, lane: u32, index: u32) -> usize {
    lane as usize * self.lane_length as usize + index as usize
  }

  #[inline]
  #[must_use]
  pub fn memory(&self) -> &[Block] {
    &self.memory
  }

  #[inline]
  pub(crate) fn memory_mut(&mut self) -> &mut [Block] {
    &mut self.memory
  }

  #[inline]
  #[must_use]
  pub const fn passes(&self) -> u32 {
    self.passes
  }

  #[inline]
  #[must_use]
  pub const fn lanes(&self) -> u32 {
    self.lanes
  }

  #[inline]
  #[must_use]
  pub const fn lane_length(&self) -> u32 {
    self.lane_length
  }

  #[inline]
  #[must_use]
  pub const fn segment_length(&self) -> u32 {
    self.segment_length
  }

  /// Tag length in bytes, bound into H0.
  #[inline]
  #[must_use]
  pub const fn tag_len(&self) -> u32 {
    self.tag_len
  }

  /// Total blocks in the matrix (`lanes * lane_length`).
  #[inline]
  #[must_use]
  pub const fn memory_blocks(&self) -> u32 {
    self.memory_blocks
  }

  #[inline]
  #[must_use]
  pub const fn algorithm(&self) -> Algorithm {
    self.algorithm
  }

  #[inline]
  #[must_use]
  pub const fn version(&self) -> Version {
    self.version
  }
}

impl core::fmt::Debug for Instance {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Instance")
      .field("algorithm", &self.algorithm)
      .field("version", &self.version)
      .field("passes", &self.passes)
      .field("lanes", &self.lanes)
      .field("lane_length", &self.lane_length)
      .finish_non_exhaustive()
  }
}

impl Drop for Instance {
  fn drop(&mut self) {
    for block in &mut self.memory {
      block.0.zeroize();
    }
  }
}

fn check_len(input: &[u8], err: Error) -> Result<()> {
  if u32::try_from(input.len()).is_err() {
    return Err(err);
  }
  Ok(())
}

/// H0 = BLAKE2b-512 over the parameters and the length-prefixed inputs.
fn initial_hash(ctx: &Argon2, pwd: &[u8], salt: &[u8], secret: &[u8], ad: &[u8], out_len: u32) -> [u8; 64] {
  let params = ctx.params();
  let mut h = blake2b::Blake2b::new(blake2b::MAX_OUTPUT_LEN);
  h.update(&params.lanes().to_le_bytes());
  h.update(&out_len.to_le_bytes());
  h.update(&params.m_cost().to_le_bytes());
  h.update(&params.t_cost().to_le_bytes());
  h.update(&(ctx.version() as u32).to_le_bytes());
  h.update(&(ctx.algorithm() as u32).to_le_bytes());
  for input in [pwd, salt, secret, ad] {
    h.update(&(input.len() as u32).to_le_bytes());
    h.update(input);
  }
  let mut out = [0u8; 64];
  h.finalize_into(&mut out);
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::argon2::Params;

  fn ctx(m: u32, t: u32, p: u32) -> Argon2 {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::new(m, t, p).unwrap())
  }

  #[test]
  fn geometry_rounds_memory_down_to_whole_segments() {
    let instance = Instance::new(&ctx(37, 1, 2), b"pwd", b"saltsalt", &[], &[], 32).unwrap();
    assert_eq!(instance.memory_blocks(), 32);
    assert_eq!(instance.lane_length(), 16);
    assert_eq!(instance.segment_length(), 4);
    assert_eq!(instance.memory().len(), 32);
  }

  #[test]
  fn seeding_fills_only_first_two_blocks_of_each_lane() {
    let instance = Instance::new(&ctx(32, 1, 4), b"pwd", b"saltsalt", &[], &[], 32).unwrap();
    for lane in 0..4 {
      let first = instance.memory()[instance.block_index(lane, 0)];
      let second = instance.memory()[instance.block_index(lane, 1)];
      assert_ne!(first, Block::ZERO);
      assert_ne!(second, Block::ZERO);
      assert_ne!(first, second);
      assert_eq!(instance.memory()[instance.block_index(lane, 2)], Block::ZERO);
    }
  }

  #[test]
  fn input_checks() {
    let c = ctx(8, 1, 1);
    assert_eq!(Instance::new(&c, b"", b"short", &[], &[], 32).unwrap_err(), Error::SaltTooShort);
    assert_eq!(Instance::new(&c, b"", b"saltsalt", &[], &[], 3).unwrap_err(), Error::OutputTooShort);
    assert!(Instance::new(&c, b"", b"saltsalt", &[], &[], 4).is_ok());
  }

  #[test]
  fn finalize_requires_the_seeded_tag_length() {
    let mut instance = Instance::new(&ctx(8, 1, 1), b"pwd", b"saltsalt", &[], &[], 32).unwrap();
    instance.fill_memory();
    assert_eq!(instance.tag_len(), 32);

    let mut empty = [0u8; 0];
    assert_eq!(instance.finalize(&mut empty), Err(Error::OutputTooShort));
    let mut short = [0xAAu8; 31];
    assert_eq!(instance.finalize(&mut short), Err(Error::OutputTooShort));
    assert_eq!(short, [0xAA; 31]);
    let mut long = [0xAAu8; 33];
    assert_eq!(instance.finalize(&mut long), Err(Error::OutputTooLong));
    assert_eq!(long, [0xAA; 33]);

    let mut tag = [0u8; 32];
    instance.finalize(&mut tag).unwrap();
    let mut direct = [0u8; 32];
    ctx(8, 1, 1).hash_password_into(b"pwd", b"saltsalt", &mut direct).unwrap();
    assert_eq!(tag, direct);
  }

  #[test]
  fn clone_copies_memory_and_geometry() {
    let instance = Instance::new(&ctx(32, 1, 4), b"pwd", b"saltsalt", &[], &[], 48).unwrap();
    let copy = instance.clone();
    assert_eq!(copy.memory(), instance.memory());
    assert_eq!(copy.tag_len(), 48);
    assert_eq!((copy.lanes(), copy.lane_length()), (instance.lanes(), instance.lane_length()));
  }

  #[test]
  fn position_defaults_to_segment_start() {
    let pos = Position::new(1, 3, 2);
    assert_eq!((pos.pass, pos.slice, pos.lane, pos.index), (1, 3, 2, 0));
  }
}
