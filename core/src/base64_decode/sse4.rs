#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{
	FILLER,
	SHIFT_LUT
};

const BLOCK: usize = 16;
const OUT_PER_BLOCK: usize = 12;

#[inline]
#[target_feature(enable = "ssse3,sse4.1")]
unsafe fn lookup(input: __m128i) -> __m128i {
	let higher_nibble = _mm_and_si128(_mm_srli_epi32::<4>(input), _mm_set1_epi8(0x0f));
	let shift_lut = _mm_loadu_si128(SHIFT_LUT.as_ptr() as *const __m128i);

	let sh = _mm_shuffle_epi8(shift_lut, higher_nibble);
	let eq_2f = _mm_cmpeq_epi8(input, _mm_set1_epi8(0x2f));
	let shift = _mm_blendv_epi8(sh, _mm_set1_epi8(16), eq_2f);

	_mm_add_epi8(input, shift)
}

#[inline]
#[target_feature(enable = "ssse3,sse4.1")]
unsafe fn pack(values: __m128i) -> __m128i {
	let merge = _mm_maddubs_epi16(values, _mm_set1_epi32(0x01400140));
	_mm_madd_epi16(merge, _mm_set1_epi32(0x00011000))
}

/// Decodes 16 characters, storing 16 bytes at `dst` of which the first 12 are meaningful
#[inline]
#[target_feature(enable = "ssse3,sse4.1")]
unsafe fn decode_block(block: *const u8, dst: *mut u8) {
	let compact = _mm_setr_epi8(
		2, 1, 0,
		6, 5, 4,
		10, 9, 8,
		14, 13, 12,
		-1, -1, -1, -1);

	let input = _mm_loadu_si128(block as *const __m128i);
	let merged = pack(lookup(input));
	_mm_storeu_si128(dst as *mut __m128i, _mm_shuffle_epi8(merged, compact));
}

/// Decodes unpadded, validated input. The result may carry filler bytes past the decoded
/// length, which the caller truncates.
#[target_feature(enable = "ssse3,sse4.1")]
pub(super) unsafe fn decode(data: &[u8]) -> Vec<u8> {
	let blocks = (data.len() + BLOCK - 1) / BLOCK;
	// The last store spills 4 bytes past its 12
	let mut out = vec![0u8; blocks * OUT_PER_BLOCK + (BLOCK - OUT_PER_BLOCK)];
	let mut dst = out.as_mut_ptr();

	let mut chunks = data.chunks_exact(BLOCK);
	for chunk in chunks.by_ref() {
		decode_block(chunk.as_ptr(), dst);
		dst = dst.add(OUT_PER_BLOCK);
	}

	let tail = chunks.remainder();
	if !tail.is_empty() {
		let mut last = [FILLER; BLOCK];
		last[..tail.len()].copy_from_slice(tail);
		decode_block(last.as_ptr(), dst);
	}

	out
}
