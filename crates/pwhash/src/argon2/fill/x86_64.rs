//! x86_64 SIMD fill kernels (SSE3, AVX2, AVX-512F).
//!
//! Every tier computes the same G as the reference kernel: the block is an
//! 8×8 matrix of 16-byte registers, P runs over each row and then each
//! column, and the permutation layout comes from the shared
//! `ROW_PAIRS`/`COLUMN_PAIRS` tables. The tiers differ only in how many
//! 64-bit lanes one vector carries:
//!
//! | Tier     | Vector    | Per P call                           |
//! |----------|-----------|--------------------------------------|
//! | SSE3     | `__m128i` | 8 vectors, unpack-based diagonals    |
//! | AVX2     | `__m256i` | 4 vectors, `vpermq` diagonals        |
//! | AVX-512F | `__m512i` | 4 vectors carrying two P calls       |
//!
//! # Safety
//!
//! The `*_unchecked` functions require the named CPU feature. The
//! `*_runtime` wrappers are only reachable through the fill registry, which
//! checks detected capabilities before binding them.

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::undocumented_unsafe_blocks)]

#[cfg(feature = "avx2")]
pub(crate) mod avx2;
#[cfg(feature = "avx512")]
pub(crate) mod avx512;
#[cfg(feature = "sse3")]
pub(crate) mod sse3;
