//! AVX2 fill kernel: one P call per four `__m256i` rows.

use core::arch::x86_64::*;

use crate::argon2::{
  block::{Block, COLUMN_PAIRS, ROW_PAIRS},
  fill::segment::fill_segment_with,
  instance::{Instance, Position},
};

#[inline(always)]
unsafe fn blamka(x: __m256i, y: __m256i) -> __m256i {
  let z = _mm256_mul_epu32(x, y);
  _mm256_add_epi64(_mm256_add_epi64(x, y), _mm256_add_epi64(z, z))
}

#[inline(always)]
unsafe fn rotr32(x: __m256i) -> __m256i {
  _mm256_shuffle_epi32::<0xB1>(x)
}

#[inline(always)]
unsafe fn rotr24(x: __m256i) -> __m256i {
  _mm256_or_si256(_mm256_srli_epi64::<24>(x), _mm256_slli_epi64::<40>(x))
}

#[inline(always)]
unsafe fn rotr16(x: __m256i) -> __m256i {
  _mm256_or_si256(_mm256_srli_epi64::<16>(x), _mm256_slli_epi64::<48>(x))
}

#[inline(always)]
unsafe fn rotr63(x: __m256i) -> __m256i {
  _mm256_or_si256(_mm256_srli_epi64::<63>(x), _mm256_add_epi64(x, x))
}

#[inline(always)]
unsafe fn g(a: &mut __m256i, b: &mut __m256i, c: &mut __m256i, d: &mut __m256i) {
  *a = blamka(*a, *b);
  *d = rotr32(_mm256_xor_si256(*d, *a));
  *c = blamka(*c, *d);
  *b = rotr24(_mm256_xor_si256(*b, *c));
  *a = blamka(*a, *b);
  *d = rotr16(_mm256_xor_si256(*d, *a));
  *c = blamka(*c, *d);
  *b = rotr63(_mm256_xor_si256(*b, *c));
}

/// Two 16-byte registers at word offsets `lo` and `hi` as one vector.
#[inline(always)]
unsafe fn load(q: *const u64, lo: usize, hi: usize) -> __m256i {
  _mm256_set_m128i(_mm_loadu_si128(q.add(hi).cast()), _mm_loadu_si128(q.add(lo).cast()))
}

#[inline(always)]
unsafe fn store(q: *mut u64, lo: usize, hi: usize, v: __m256i) {
  _mm_storeu_si128(q.add(lo).cast(), _mm256_castsi256_si128(v));
  _mm_storeu_si128(q.add(hi).cast(), _mm256_extracti128_si256::<1>(v));
}

/// P over the eight registers at word offsets `pairs`, in place.
#[inline(always)]
unsafe fn permute(q: *mut u64, pairs: &[usize; 8]) {
  let [p0, p1, p2, p3, p4, p5, p6, p7] = *pairs;
  let mut a = load(q, p0, p1);
  let mut b = load(q, p2, p3);
  let mut c = load(q, p4, p5);
  let mut d = load(q, p6, p7);

  g(&mut a, &mut b, &mut c, &mut d);

  b = _mm256_permute4x64_epi64::<0x39>(b);
  c = _mm256_permute4x64_epi64::<0x4E>(c);
  d = _mm256_permute4x64_epi64::<0x93>(d);

  g(&mut a, &mut b, &mut c, &mut d);

  b = _mm256_permute4x64_epi64::<0x93>(b);
  c = _mm256_permute4x64_epi64::<0x4E>(c);
  d = _mm256_permute4x64_epi64::<0x39>(d);

  store(q, p0, p1, a);
  store(q, p2, p3, b);
  store(q, p4, p5, c);
  store(q, p6, p7, d);
}

/// G(x, y) with AVX2.
///
/// # Safety
///
/// Caller must ensure AVX2 is available.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn compress_avx2(x: &Block, y: &Block) -> Block {
  let mut r = Block::ZERO;
  let xp = x.words().as_ptr().cast::<__m256i>();
  let yp = y.words().as_ptr().cast::<__m256i>();
  let rp = r.words_mut().as_mut_ptr().cast::<__m256i>();
  for i in 0..32 {
    _mm256_storeu_si256(rp.add(i), _mm256_xor_si256(_mm256_loadu_si256(xp.add(i)), _mm256_loadu_si256(yp.add(i))));
  }

  let mut q = r;
  let qp = q.words_mut().as_mut_ptr();
  for pairs in &ROW_PAIRS {
    permute(qp, pairs);
  }
  for pairs in &COLUMN_PAIRS {
    permute(qp, pairs);
  }

  let qv = qp.cast::<__m256i>();
  let rv = r.words().as_ptr().cast::<__m256i>();
  for i in 0..32 {
    _mm256_storeu_si256(qv.add(i), _mm256_xor_si256(_mm256_loadu_si256(qv.add(i)), _mm256_loadu_si256(rv.add(i))));
  }
  q
}

/// Fill one segment with the AVX2 kernel.
///
/// # Safety
///
/// Caller must ensure AVX2 is available.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn fill_segment_avx2_unchecked(instance: &mut Instance, position: Position) {
  // SAFETY: this function's contract guarantees AVX2.
  fill_segment_with(instance, position, |x, y| unsafe { compress_avx2(x, y) });
}

/// Registry entry for the AVX2 tier.
pub(crate) fn fill_segment_avx2_runtime(instance: &mut Instance, position: Position) {
  // SAFETY: the fill registry binds this entry only when AVX2 was detected.
  unsafe { fill_segment_avx2_unchecked(instance, position) }
}
