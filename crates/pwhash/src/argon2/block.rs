//! The 1 KiB Argon2 memory block.

use core::ops::{BitXor, BitXorAssign};

/// Words per block.
pub const WORDS: usize = 128;

/// Bytes per block.
pub const BLOCK_BYTES: usize = WORDS * 8;

/// 1024-byte memory block, viewed as 128 little-endian `u64` words.
///
/// The compression function G reads the block as an 8×8 matrix of 16-byte
/// registers: register `r` holds words `2r` and `2r + 1`.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct Block(pub(crate) [u64; WORDS]);

impl Block {
  pub const ZERO: Self = Self([0u64; WORDS]);

  #[inline]
  #[must_use]
  pub const fn words(&self) -> &[u64; WORDS] {
    &self.0
  }

  #[inline]
  pub fn words_mut(&mut self) -> &mut [u64; WORDS] {
    &mut self.0
  }

  /// Load from 1024 little-endian bytes.
  #[must_use]
  pub fn from_le_bytes(bytes: &[u8; BLOCK_BYTES]) -> Self {
    let mut block = Self::ZERO;
    let (chunks, _) = bytes.as_chunks::<8>();
    for (word, chunk) in block.0.iter_mut().zip(chunks) {
      *word = u64::from_le_bytes(*chunk);
    }
    block
  }

  #[must_use]
  pub fn to_le_bytes(&self) -> [u8; BLOCK_BYTES] {
    let mut bytes = [0u8; BLOCK_BYTES];
    for (chunk, word) in bytes.chunks_exact_mut(8).zip(self.0) {
      chunk.copy_from_slice(&word.to_le_bytes());
    }
    bytes
  }
}

impl Default for Block {
  #[inline]
  fn default() -> Self {
    Self::ZERO
  }
}

impl core::fmt::Debug for Block {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Block").field("head", &&self.0[..4]).finish_non_exhaustive()
  }
}

impl BitXorAssign<&Block> for Block {
  #[inline]
  fn bitxor_assign(&mut self, rhs: &Block) {
    for (dst, src) in self.0.iter_mut().zip(rhs.0.iter()) {
      *dst ^= *src;
    }
  }
}

impl BitXor<&Block> for &Block {
  type Output = Block;

  #[inline]
  fn bitxor(self, rhs: &Block) -> Block {
    let mut out = *self;
    out ^= rhs;
    out
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permutation layout
// ─────────────────────────────────────────────────────────────────────────────

/// Word offsets of the 8 register pairs fed to each of the 8 row permutations.
///
/// Row `i` covers the contiguous registers `8i..8i + 8`.
pub(crate) const ROW_PAIRS: [[usize; 8]; 8] = pair_table(16, 2);

/// Word offsets of the 8 register pairs fed to each of the 8 column
/// permutations.
///
/// Column `i` takes register `i` from every row.
pub(crate) const COLUMN_PAIRS: [[usize; 8]; 8] = pair_table(2, 16);

const fn pair_table(outer: usize, inner: usize) -> [[usize; 8]; 8] {
  let mut table = [[0usize; 8]; 8];
  let mut i = 0;
  while i < 8 {
    let mut k = 0;
    while k < 8 {
      table[i][k] = outer * i + inner * k;
      k += 1;
    }
    i += 1;
  }
  table
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn layout() {
    assert_eq!(core::mem::size_of::<Block>(), BLOCK_BYTES);
    assert_eq!(core::mem::align_of::<Block>(), 64);
  }

  #[test]
  fn rows_and_columns_cover_every_register_once() {
    for table in [&ROW_PAIRS, &COLUMN_PAIRS] {
      let mut seen = [false; WORDS];
      for offsets in table {
        for &off in offsets {
          assert_eq!(off % 2, 0);
          assert!(!seen[off] && !seen[off + 1]);
          seen[off] = true;
          seen[off + 1] = true;
        }
      }
      assert!(seen.iter().all(|&s| s));
    }
    assert_eq!(ROW_PAIRS[1], [16, 18, 20, 22, 24, 26, 28, 30]);
    assert_eq!(COLUMN_PAIRS[1], [2, 18, 34, 50, 66, 82, 98, 114]);
  }

  #[test]
  fn bytes_roundtrip_is_little_endian() {
    let mut block = Block::ZERO;
    block.words_mut()[0] = 0x0807_0605_0403_0201;
    block.words_mut()[127] = u64::MAX;
    let bytes = block.to_le_bytes();
    assert_eq!(&bytes[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(Block::from_le_bytes(&bytes), block);
  }

  #[test]
  fn xor() {
    let mut a = Block::ZERO;
    let mut b = Block::ZERO;
    a.words_mut()[3] = 0b1100;
    b.words_mut()[3] = 0b1010;
    assert_eq!((&a ^ &b).words()[3], 0b0110);
    a ^= &b;
    assert_eq!(a.words()[3], 0b0110);
  }
}
