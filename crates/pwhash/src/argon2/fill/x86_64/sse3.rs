//! SSE3 fill kernel: two 64-bit lanes per vector.

use core::arch::x86_64::*;

use crate::argon2::{
  block::{Block, COLUMN_PAIRS, ROW_PAIRS},
  fill::segment::fill_segment_with,
  instance::{Instance, Position},
};

const REGISTERS: usize = 64;

#[inline(always)]
unsafe fn blamka(x: __m128i, y: __m128i) -> __m128i {
  let z = _mm_mul_epu32(x, y);
  _mm_add_epi64(_mm_add_epi64(x, y), _mm_add_epi64(z, z))
}

#[inline(always)]
unsafe fn rotr32(x: __m128i) -> __m128i {
  _mm_shuffle_epi32::<0xB1>(x)
}

#[inline(always)]
unsafe fn rotr24(x: __m128i) -> __m128i {
  _mm_or_si128(_mm_srli_epi64::<24>(x), _mm_slli_epi64::<40>(x))
}

#[inline(always)]
unsafe fn rotr16(x: __m128i) -> __m128i {
  _mm_or_si128(_mm_srli_epi64::<16>(x), _mm_slli_epi64::<48>(x))
}

#[inline(always)]
unsafe fn rotr63(x: __m128i) -> __m128i {
  _mm_or_si128(_mm_srli_epi64::<63>(x), _mm_add_epi64(x, x))
}

/// Column step of G on two register pairs at once.
#[inline(always)]
unsafe fn g(a0: &mut __m128i, b0: &mut __m128i, c0: &mut __m128i, d0: &mut __m128i) {
  *a0 = blamka(*a0, *b0);
  *d0 = rotr32(_mm_xor_si128(*d0, *a0));
  *c0 = blamka(*c0, *d0);
  *b0 = rotr24(_mm_xor_si128(*b0, *c0));
  *a0 = blamka(*a0, *b0);
  *d0 = rotr16(_mm_xor_si128(*d0, *a0));
  *c0 = blamka(*c0, *d0);
  *b0 = rotr63(_mm_xor_si128(*b0, *c0));
}

/// P over the registers at `regs` (register indices, not word offsets).
#[inline(always)]
unsafe fn permute(state: &mut [__m128i; REGISTERS], regs: [usize; 8]) {
  let [ia0, ia1, ib0, ib1, ic0, ic1, id0, id1] = regs;
  let (mut a0, mut a1) = (state[ia0], state[ia1]);
  let (mut b0, mut b1) = (state[ib0], state[ib1]);
  let (mut c0, mut c1) = (state[ic0], state[ic1]);
  let (mut d0, mut d1) = (state[id0], state[id1]);

  g(&mut a0, &mut b0, &mut c0, &mut d0);
  g(&mut a1, &mut b1, &mut c1, &mut d1);

  // Diagonalise: b rotates left by one word, c by two, d by three.
  let (t0, t1) = (d0, b0);
  core::mem::swap(&mut c0, &mut c1);
  d0 = _mm_unpackhi_epi64(d1, _mm_unpacklo_epi64(t0, t0));
  d1 = _mm_unpackhi_epi64(t0, _mm_unpacklo_epi64(d1, d1));
  b0 = _mm_unpackhi_epi64(b0, _mm_unpacklo_epi64(b1, b1));
  b1 = _mm_unpackhi_epi64(b1, _mm_unpacklo_epi64(t1, t1));

  g(&mut a0, &mut b0, &mut c0, &mut d0);
  g(&mut a1, &mut b1, &mut c1, &mut d1);

  let (t0, t1) = (b0, d0);
  core::mem::swap(&mut c0, &mut c1);
  b0 = _mm_unpackhi_epi64(b1, _mm_unpacklo_epi64(b0, b0));
  b1 = _mm_unpackhi_epi64(t0, _mm_unpacklo_epi64(b1, b1));
  d0 = _mm_unpackhi_epi64(d0, _mm_unpacklo_epi64(d1, d1));
  d1 = _mm_unpackhi_epi64(d1, _mm_unpacklo_epi64(t1, t1));

  state[ia0] = a0;
  state[ia1] = a1;
  state[ib0] = b0;
  state[ib1] = b1;
  state[ic0] = c0;
  state[ic1] = c1;
  state[id0] = d0;
  state[id1] = d1;
}

#[inline(always)]
fn registers(pairs: &[usize; 8]) -> [usize; 8] {
  pairs.map(|offset| offset / 2)
}

/// G(x, y) with SSE3.
///
/// # Safety
///
/// Caller must ensure SSE3 is available.
#[target_feature(enable = "sse3")]
pub(crate) unsafe fn compress_sse3(x: &Block, y: &Block) -> Block {
  let xp = x.words().as_ptr().cast::<__m128i>();
  let yp = y.words().as_ptr().cast::<__m128i>();

  let mut r = [_mm_setzero_si128(); REGISTERS];
  for (i, reg) in r.iter_mut().enumerate() {
    *reg = _mm_xor_si128(_mm_lddqu_si128(xp.add(i)), _mm_lddqu_si128(yp.add(i)));
  }

  let mut state = r;
  for pairs in &ROW_PAIRS {
    permute(&mut state, registers(pairs));
  }
  for pairs in &COLUMN_PAIRS {
    permute(&mut state, registers(pairs));
  }

  let mut out = Block::ZERO;
  let op = out.words_mut().as_mut_ptr().cast::<__m128i>();
  for (i, (s, r)) in state.iter().zip(r.iter()).enumerate() {
    _mm_storeu_si128(op.add(i), _mm_xor_si128(*s, *r));
  }
  out
}

/// Fill one segment with the SSE3 kernel.
///
/// # Safety
///
/// Caller must ensure SSE3 is available.
#[target_feature(enable = "sse3")]
pub(crate) unsafe fn fill_segment_sse3_unchecked(instance: &mut Instance, position: Position) {
  // SAFETY: this function's contract guarantees SSE3.
  fill_segment_with(instance, position, |x, y| unsafe { compress_sse3(x, y) });
}

/// Registry entry for the SSE3 tier.
pub(crate) fn fill_segment_sse3_runtime(instance: &mut Instance, position: Position) {
  // SAFETY: the fill registry binds this entry only when SSE3 was detected.
  unsafe { fill_segment_sse3_unchecked(instance, position) }
}
