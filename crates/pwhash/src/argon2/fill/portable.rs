//! Reference fill kernel: portable `u64` code, available on every target.

use super::segment::fill_segment_with;
use crate::argon2::{
  block::{Block, COLUMN_PAIRS, ROW_PAIRS, WORDS},
  instance::{Instance, Position},
};

/// `x + y + 2 * lo32(x) * lo32(y)`, the BlaMka multiply-add.
#[inline(always)]
fn blamka(x: u64, y: u64) -> u64 {
  let product = (x & 0xFFFF_FFFF).wrapping_mul(y & 0xFFFF_FFFF);
  x.wrapping_add(y).wrapping_add(product.wrapping_mul(2))
}

#[inline(always)]
fn gb(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize) {
  v[a] = blamka(v[a], v[b]);
  v[d] = (v[d] ^ v[a]).rotate_right(32);
  v[c] = blamka(v[c], v[d]);
  v[b] = (v[b] ^ v[c]).rotate_right(24);
  v[a] = blamka(v[a], v[b]);
  v[d] = (v[d] ^ v[a]).rotate_right(16);
  v[c] = blamka(v[c], v[d]);
  v[b] = (v[b] ^ v[c]).rotate_right(63);
}

/// Permutation P over the eight 16-byte registers at `pairs`.
#[inline(always)]
fn permute(q: &mut [u64; WORDS], pairs: &[usize; 8]) {
  let mut v = [0u64; 16];
  for (k, &p) in pairs.iter().enumerate() {
    v[2 * k] = q[p];
    v[2 * k + 1] = q[p + 1];
  }

  gb(&mut v, 0, 4, 8, 12);
  gb(&mut v, 1, 5, 9, 13);
  gb(&mut v, 2, 6, 10, 14);
  gb(&mut v, 3, 7, 11, 15);

  gb(&mut v, 0, 5, 10, 15);
  gb(&mut v, 1, 6, 11, 12);
  gb(&mut v, 2, 7, 8, 13);
  gb(&mut v, 3, 4, 9, 14);

  for (k, &p) in pairs.iter().enumerate() {
    q[p] = v[2 * k];
    q[p + 1] = v[2 * k + 1];
  }
}

/// G(x, y) = R ^ P(R), with R = x ^ y, P applied to rows then columns.
#[must_use]
pub(crate) fn compress(x: &Block, y: &Block) -> Block {
  let r = x ^ y;
  let mut q = r;
  for pairs in &ROW_PAIRS {
    permute(q.words_mut(), pairs);
  }
  for pairs in &COLUMN_PAIRS {
    permute(q.words_mut(), pairs);
  }
  q ^= &r;
  q
}

/// Reference tier entry point.
pub(crate) fn fill_segment_reference(instance: &mut Instance, position: Position) {
  fill_segment_with(instance, position, compress);
}
