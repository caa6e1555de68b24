//! BLAKE2b (RFC 7693) with variable output length, and the Argon2
//! variable-length hash H' (RFC 9106 §3.3).
//!
//! Portable, `no_std`, unkeyed. Argon2 only ever hashes a few hundred bytes
//! through this path (H0, the initial blocks and the final tag), so it stays
//! scalar; the memory fill is where the SIMD tiers live.

#![allow(clippy::indexing_slicing)] // Compression schedule uses fixed indices

const BLOCK_LEN: usize = 128;

/// Largest BLAKE2b digest, in bytes.
pub const MAX_OUTPUT_LEN: usize = 64;

const IV: [u64; 8] = [
  0x6a09_e667_f3bc_c908,
  0xbb67_ae85_84ca_a73b,
  0x3c6e_f372_fe94_f82b,
  0xa54f_f53a_5f1d_36f1,
  0x510e_527f_ade6_82d1,
  0x9b05_688c_2b3e_6c1f,
  0x1f83_d9ab_fb41_bd6b,
  0x5be0_cd19_137e_2179,
];

const SIGMA: [[usize; 16]; 12] = [
  [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
  [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
  [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
  [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
  [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
  [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
  [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
  [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
  [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
  [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
  [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
  [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
];

#[inline(always)]
fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
  v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
  v[d] = (v[d] ^ v[a]).rotate_right(32);
  v[c] = v[c].wrapping_add(v[d]);
  v[b] = (v[b] ^ v[c]).rotate_right(24);
  v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
  v[d] = (v[d] ^ v[a]).rotate_right(16);
  v[c] = v[c].wrapping_add(v[d]);
  v[b] = (v[b] ^ v[c]).rotate_right(63);
}

fn compress(h: &mut [u64; 8], block: &[u8; BLOCK_LEN], t: u128, is_last: bool) {
  let (chunks, _) = block.as_chunks::<8>();
  let mut m = [0u64; 16];
  for (word, chunk) in m.iter_mut().zip(chunks) {
    *word = u64::from_le_bytes(*chunk);
  }

  let mut v = [0u64; 16];
  v[..8].copy_from_slice(h);
  v[8..].copy_from_slice(&IV);
  v[12] ^= t as u64;
  v[13] ^= (t >> 64) as u64;
  if is_last {
    v[14] = !v[14];
  }

  for s in &SIGMA {
    g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
    g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
    g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
    g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);

    g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
    g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
    g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
    g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
  }

  for i in 0..8 {
    h[i] ^= v[i] ^ v[i + 8];
  }
}

/// Streaming BLAKE2b with a digest length fixed at construction.
#[derive(Clone)]
pub struct Blake2b {
  h: [u64; 8],
  buf: [u8; BLOCK_LEN],
  buf_len: usize,
  bytes_hashed: u128,
  out_len: usize,
}

impl Blake2b {
  /// New hasher producing `out_len` bytes (1..=64).
  #[must_use]
  pub fn new(out_len: usize) -> Self {
    debug_assert!((1..=MAX_OUTPUT_LEN).contains(&out_len));
    let mut h = IV;
    // Parameter block: digest length, keylen=0, fanout=1, depth=1.
    h[0] ^= 0x0101_0000 ^ out_len as u64;
    Self {
      h,
      buf: [0u8; BLOCK_LEN],
      buf_len: 0,
      bytes_hashed: 0,
      out_len,
    }
  }

  pub fn update(&mut self, mut data: &[u8]) {
    if data.is_empty() {
      return;
    }

    if self.buf_len != 0 {
      let take = core::cmp::min(BLOCK_LEN - self.buf_len, data.len());
      self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
      self.buf_len += take;
      data = &data[take..];

      // A full buffer is only compressed once more input arrives, so the
      // final block can still carry the `is_last` flag.
      if self.buf_len == BLOCK_LEN && !data.is_empty() {
        self.bytes_hashed = self.bytes_hashed.wrapping_add(BLOCK_LEN as u128);
        compress(&mut self.h, &self.buf, self.bytes_hashed, false);
        self.buf_len = 0;
      }
    }

    let (blocks, rest) = data.as_chunks::<BLOCK_LEN>();
    if !blocks.is_empty() {
      let (to_compress, last_full) = if rest.is_empty() {
        (&blocks[..blocks.len() - 1], Some(blocks[blocks.len() - 1]))
      } else {
        (blocks, None)
      };

      for block in to_compress {
        self.bytes_hashed = self.bytes_hashed.wrapping_add(BLOCK_LEN as u128);
        compress(&mut self.h, block, self.bytes_hashed, false);
      }

      if let Some(last) = last_full {
        self.buf.copy_from_slice(&last);
        self.buf_len = BLOCK_LEN;
      }
    }
    data = rest;

    if !data.is_empty() {
      self.buf[..data.len()].copy_from_slice(data);
      self.buf_len = data.len();
    }
  }

  /// Write the digest into `out`, which must be exactly `out_len` bytes.
  pub fn finalize_into(mut self, out: &mut [u8]) {
    debug_assert_eq!(out.len(), self.out_len);
    let len = self.buf_len;
    self.buf[len..].fill(0);
    let t = self.bytes_hashed.wrapping_add(len as u128);
    compress(&mut self.h, &self.buf, t, true);

    let mut full = [0u8; MAX_OUTPUT_LEN];
    for (chunk, word) in full.chunks_exact_mut(8).zip(self.h) {
      chunk.copy_from_slice(&word.to_le_bytes());
    }
    out.copy_from_slice(&full[..self.out_len]);
  }
}

/// One-shot BLAKE2b-512 over the concatenation of `parts`.
#[must_use]
pub fn digest512(parts: &[&[u8]]) -> [u8; MAX_OUTPUT_LEN] {
  let mut h = Blake2b::new(MAX_OUTPUT_LEN);
  for part in parts {
    h.update(part);
  }
  let mut out = [0u8; MAX_OUTPUT_LEN];
  h.finalize_into(&mut out);
  out
}

/// The Argon2 variable-length hash H'.
///
/// Digests of up to 64 bytes are a single BLAKE2b call over
/// `LE32(len) || parts`. Longer outputs chain BLAKE2b-512, emitting 32 bytes
/// per link and the whole of the final, shortened link.
///
/// An empty `out` is a no-op. Lengths above 2^32 - 1 are rejected by the
/// Argon2 layer before reaching here.
pub fn hash_long(parts: &[&[u8]], out: &mut [u8]) {
  if out.is_empty() {
    return;
  }
  let len_prefix = (out.len() as u32).to_le_bytes();

  if out.len() <= MAX_OUTPUT_LEN {
    let mut h = Blake2b::new(out.len());
    h.update(&len_prefix);
    for part in parts {
      h.update(part);
    }
    h.finalize_into(out);
    return;
  }

  const HALF: usize = MAX_OUTPUT_LEN / 2;

  let mut h = Blake2b::new(MAX_OUTPUT_LEN);
  h.update(&len_prefix);
  for part in parts {
    h.update(part);
  }
  let mut v = [0u8; MAX_OUTPUT_LEN];
  h.finalize_into(&mut v);

  let mut written = 0;
  out[..HALF].copy_from_slice(&v[..HALF]);
  written += HALF;

  while out.len() - written > MAX_OUTPUT_LEN {
    v = digest512(&[&v[..]]);
    out[written..written + HALF].copy_from_slice(&v[..HALF]);
    written += HALF;
  }

  let tail = out.len() - written;
  let mut h = Blake2b::new(tail);
  h.update(&v);
  h.finalize_into(&mut out[written..]);
}
