//! The segment walker shared by every fill tier.
//!
//! Tiers differ only in the compression function G they hand to
//! [`fill_segment_with`]; reference-block selection, address generation and
//! the version-dependent write are identical, which is what makes tier output
//! bit-for-bit interchangeable.

use crate::argon2::{
  Algorithm, SYNC_POINTS, Version,
  block::{Block, WORDS},
  instance::{Instance, Position},
};

/// Pseudo-random values carried by one address block.
const ADDRESSES_PER_BLOCK: u32 = WORDS as u32;

/// Segment geometry copied out of the instance so the memory can be
/// borrowed mutably while walking.
#[derive(Clone, Copy)]
struct Geometry {
  lanes: u32,
  lane_length: u32,
  segment_length: u32,
}

/// Fill one segment using `compress` as G.
///
/// `compress(x, y)` must return `(x ^ y) ^ P(x ^ y)`.
#[inline(always)]
pub(crate) fn fill_segment_with<G>(instance: &mut Instance, position: Position, compress: G)
where
  G: Fn(&Block, &Block) -> Block,
{
  let geometry = Geometry {
    lanes: instance.lanes(),
    lane_length: instance.lane_length(),
    segment_length: instance.segment_length(),
  };
  let data_independent = match instance.algorithm() {
    Algorithm::Argon2d => false,
    Algorithm::Argon2i => true,
    Algorithm::Argon2id => position.pass == 0 && u32::from(position.slice) < SYNC_POINTS / 2,
  };
  let overwrite = instance.version() == Version::V0x10 || position.pass == 0;

  let mut start = position.index;
  if position.pass == 0 && position.slice == 0 {
    start = start.max(2);
  }
  if start >= geometry.segment_length {
    return;
  }

  let mut input = Block::ZERO;
  let mut addresses = Block::ZERO;
  if data_independent {
    let words = input.words_mut();
    words[0] = u64::from(position.pass);
    words[1] = u64::from(position.lane);
    words[2] = u64::from(position.slice);
    words[3] = u64::from(instance.memory_blocks());
    words[4] = u64::from(instance.passes());
    words[5] = instance.algorithm() as u64;
    // Counter of the address block before the one covering `start`.
    words[6] = u64::from(start / ADDRESSES_PER_BLOCK);
    if start % ADDRESSES_PER_BLOCK != 0 {
      next_addresses(&mut addresses, &mut input, &compress);
    }
  }

  let lane_start = position.lane as usize * geometry.lane_length as usize;
  let lane_length = geometry.lane_length as usize;
  let mut curr = lane_start + position.slice as usize * geometry.segment_length as usize + start as usize;
  let mut prev = if curr % lane_length == 0 { curr + lane_length - 1 } else { curr - 1 };

  let memory = instance.memory_mut();
  for index in start..geometry.segment_length {
    if curr % lane_length == 1 {
      prev = curr - 1;
    }

    let pseudo_rand = if data_independent {
      if index % ADDRESSES_PER_BLOCK == 0 {
        next_addresses(&mut addresses, &mut input, &compress);
      }
      addresses.words()[(index % ADDRESSES_PER_BLOCK) as usize]
    } else {
      memory[prev].words()[0]
    };

    let ref_lane = if position.pass == 0 && position.slice == 0 {
      position.lane
    } else {
      ((pseudo_rand >> 32) % u64::from(geometry.lanes)) as u32
    };
    let ref_index = index_alpha(&geometry, position, index, pseudo_rand as u32, ref_lane == position.lane);
    let reference = ref_lane as usize * lane_length + ref_index as usize;

    let next = compress(&memory[prev], &memory[reference]);
    if overwrite {
      memory[curr] = next;
    } else {
      memory[curr] ^= &next;
    }

    curr += 1;
    prev += 1;
  }
}

/// Advance the address counter and compute the next address block,
/// `G(0, G(0, input))`.
#[inline(always)]
fn next_addresses<G>(addresses: &mut Block, input: &mut Block, compress: &G)
where
  G: Fn(&Block, &Block) -> Block,
{
  input.words_mut()[6] += 1;
  let first = compress(&Block::ZERO, input);
  *addresses = compress(&Block::ZERO, &first);
}

/// Map the low 32 bits of a pseudo-random value to a block index within the
/// reference lane (RFC 9106 §3.4.1.2).
#[inline]
fn index_alpha(geometry: &Geometry, position: Position, index: u32, pseudo_rand: u32, same_lane: bool) -> u32 {
  let segment_length = u64::from(geometry.segment_length);
  let lane_length = u64::from(geometry.lane_length);
  let index = u64::from(index);
  let slice = u64::from(position.slice);

  // Blocks already finished and not in the segment being filled, minus the
  // block immediately before the current one when it is in this lane.
  let area = if position.pass == 0 {
    if position.slice == 0 || same_lane {
      slice * segment_length + index - 1
    } else if index == 0 {
      slice * segment_length - 1
    } else {
      slice * segment_length
    }
  } else if same_lane {
    lane_length - segment_length + index - 1
  } else if index == 0 {
    lane_length - segment_length - 1
  } else {
    lane_length - segment_length
  };

  let x = u64::from(pseudo_rand);
  let x = (x * x) >> 32;
  let relative = area - 1 - ((area * x) >> 32);

  let start = if position.pass != 0 && u32::from(position.slice) != SYNC_POINTS - 1 {
    (slice + 1) * segment_length
  } else {
    0
  };

  ((start + relative) % lane_length) as u32
}

#[cfg(test)]
mod tests {
  use super::*;

  const GEOMETRY: Geometry = Geometry {
    lanes: 2,
    lane_length: 16,
    segment_length: 4,
  };

  #[test]
  fn first_segment_references_only_earlier_blocks() {
    for index in 2..4 {
      for rand in [0u32, 1, 0x8000_0000, u32::MAX] {
        let r = index_alpha(&GEOMETRY, Position::new(0, 0, 0), index, rand, true);
        assert!(r < index - 1, "index={index} rand={rand} r={r}");
      }
    }
  }

  #[test]
  fn extremes_of_pseudo_rand_span_the_area() {
    // Large pseudo-random values land near the start of the area, small
    // values near its end.
    let pos = Position::new(1, 1, 0);
    let lo = index_alpha(&GEOMETRY, pos, 2, u32::MAX, true);
    let hi = index_alpha(&GEOMETRY, pos, 2, 0, true);
    let start = 2 * GEOMETRY.segment_length;
    assert_eq!(lo, start);
    let area = GEOMETRY.lane_length - GEOMETRY.segment_length + 2 - 1;
    assert_eq!(hi, (start + area - 1) % GEOMETRY.lane_length);
  }

  #[test]
  fn later_passes_skip_the_segment_being_filled() {
    for slice in 0..4u8 {
      let pos = Position::new(1, slice, 1);
      let seg_start = u32::from(slice) * GEOMETRY.segment_length;
      for rand in (0..=u32::MAX).step_by(0x0100_0001) {
        let r = index_alpha(&GEOMETRY, pos, 0, rand, false);
        assert!(
          !(seg_start..seg_start + GEOMETRY.segment_length).contains(&r),
          "slice={slice} rand={rand} r={r}"
        );
      }
    }
  }

  #[test]
  fn other_lane_in_first_pass_sees_only_finished_slices() {
    let pos = Position::new(0, 2, 0);
    for rand in (0..=u32::MAX).step_by(0x0010_0001) {
      let r = index_alpha(&GEOMETRY, pos, 1, rand, false);
      assert!(r < 2 * GEOMETRY.segment_length, "rand={rand} r={r}");
    }
  }
}
