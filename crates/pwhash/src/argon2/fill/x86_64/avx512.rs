//! AVX-512F fill kernel: each `__m512i` carries the same row of two
//! independent P calls, so a 256-bit half per permutation.

use core::arch::x86_64::*;

use crate::argon2::{
  block::{Block, COLUMN_PAIRS, ROW_PAIRS},
  fill::segment::fill_segment_with,
  instance::{Instance, Position},
};

#[inline(always)]
unsafe fn blamka(x: __m512i, y: __m512i) -> __m512i {
  let z = _mm512_mul_epu32(x, y);
  _mm512_add_epi64(_mm512_add_epi64(x, y), _mm512_add_epi64(z, z))
}

#[inline(always)]
unsafe fn g(a: &mut __m512i, b: &mut __m512i, c: &mut __m512i, d: &mut __m512i) {
  *a = blamka(*a, *b);
  *d = _mm512_ror_epi64::<32>(_mm512_xor_si512(*d, *a));
  *c = blamka(*c, *d);
  *b = _mm512_ror_epi64::<24>(_mm512_xor_si512(*b, *c));
  *a = blamka(*a, *b);
  *d = _mm512_ror_epi64::<16>(_mm512_xor_si512(*d, *a));
  *c = blamka(*c, *d);
  *b = _mm512_ror_epi64::<63>(_mm512_xor_si512(*b, *c));
}

#[inline(always)]
unsafe fn load256(q: *const u64, lo: usize, hi: usize) -> __m256i {
  _mm256_set_m128i(_mm_loadu_si128(q.add(hi).cast()), _mm_loadu_si128(q.add(lo).cast()))
}

#[inline(always)]
unsafe fn store256(q: *mut u64, lo: usize, hi: usize, v: __m256i) {
  _mm_storeu_si128(q.add(lo).cast(), _mm256_castsi256_si128(v));
  _mm_storeu_si128(q.add(hi).cast(), _mm256_extracti128_si256::<1>(v));
}

/// Registers `(first[lo], first[hi])` in the low half and
/// `(second[lo], second[hi])` in the high half.
#[inline(always)]
unsafe fn load(q: *const u64, first: &[usize; 8], second: &[usize; 8], k: usize) -> __m512i {
  let lo = load256(q, first[k], first[k + 1]);
  let hi = load256(q, second[k], second[k + 1]);
  _mm512_inserti64x4::<1>(_mm512_castsi256_si512(lo), hi)
}

#[inline(always)]
unsafe fn store(q: *mut u64, first: &[usize; 8], second: &[usize; 8], k: usize, v: __m512i) {
  store256(q, first[k], first[k + 1], _mm512_castsi512_si256(v));
  store256(q, second[k], second[k + 1], _mm512_extracti64x4_epi64::<1>(v));
}

/// P over two independent register sets at once, in place.
#[inline(always)]
unsafe fn permute2(q: *mut u64, first: &[usize; 8], second: &[usize; 8]) {
  let mut a = load(q, first, second, 0);
  let mut b = load(q, first, second, 2);
  let mut c = load(q, first, second, 4);
  let mut d = load(q, first, second, 6);

  g(&mut a, &mut b, &mut c, &mut d);

  // `vpermq` with an immediate permutes each 256-bit half independently.
  b = _mm512_permutex_epi64::<0x39>(b);
  c = _mm512_permutex_epi64::<0x4E>(c);
  d = _mm512_permutex_epi64::<0x93>(d);

  g(&mut a, &mut b, &mut c, &mut d);

  b = _mm512_permutex_epi64::<0x93>(b);
  c = _mm512_permutex_epi64::<0x4E>(c);
  d = _mm512_permutex_epi64::<0x39>(d);

  store(q, first, second, 0, a);
  store(q, first, second, 2, b);
  store(q, first, second, 4, c);
  store(q, first, second, 6, d);
}

/// G(x, y) with AVX-512F.
///
/// # Safety
///
/// Caller must ensure AVX-512F is available.
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn compress_avx512(x: &Block, y: &Block) -> Block {
  let mut r = Block::ZERO;
  let xp = x.words().as_ptr().cast::<__m512i>();
  let yp = y.words().as_ptr().cast::<__m512i>();
  let rp = r.words_mut().as_mut_ptr().cast::<__m512i>();
  for i in 0..16 {
    _mm512_storeu_si512(rp.add(i), _mm512_xor_si512(_mm512_loadu_si512(xp.add(i)), _mm512_loadu_si512(yp.add(i))));
  }

  let mut q = r;
  let qp = q.words_mut().as_mut_ptr();
  for pair in ROW_PAIRS.chunks_exact(2) {
    permute2(qp, &pair[0], &pair[1]);
  }
  for pair in COLUMN_PAIRS.chunks_exact(2) {
    permute2(qp, &pair[0], &pair[1]);
  }

  let qv = qp.cast::<__m512i>();
  let rv = r.words().as_ptr().cast::<__m512i>();
  for i in 0..16 {
    _mm512_storeu_si512(qv.add(i), _mm512_xor_si512(_mm512_loadu_si512(qv.add(i)), _mm512_loadu_si512(rv.add(i))));
  }
  q
}

/// Fill one segment with the AVX-512F kernel.
///
/// # Safety
///
/// Caller must ensure AVX-512F is available.
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn fill_segment_avx512_unchecked(instance: &mut Instance, position: Position) {
  // SAFETY: this function's contract guarantees AVX-512F.
  fill_segment_with(instance, position, |x, y| unsafe { compress_avx512(x, y) });
}

/// Registry entry for the AVX-512F tier.
pub(crate) fn fill_segment_avx512_runtime(instance: &mut Instance, position: Position) {
  // SAFETY: the fill registry binds this entry only when AVX-512F was detected.
  unsafe { fill_segment_avx512_unchecked(instance, position) }
}
