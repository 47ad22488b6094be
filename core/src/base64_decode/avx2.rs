#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{
	FILLER,
	SHIFT_LUT
};

const BLOCK: usize = 32;
const OUT_PER_BLOCK: usize = 24;

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn lookup(input: __m256i) -> __m256i {
	let higher_nibble = _mm256_and_si256(_mm256_srli_epi32::<4>(input), _mm256_set1_epi8(0x0f));
	// pshufb works within 128-bit lanes, so both lanes get a copy of the table
	let shift_lut = _mm256_broadcastsi128_si256(_mm_loadu_si128(SHIFT_LUT.as_ptr() as *const __m128i));

	let sh = _mm256_shuffle_epi8(shift_lut, higher_nibble);
	let eq_2f = _mm256_cmpeq_epi8(input, _mm256_set1_epi8(0x2f));
	let shift = _mm256_blendv_epi8(sh, _mm256_set1_epi8(16), eq_2f);

	_mm256_add_epi8(input, shift)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn pack(values: __m256i) -> __m256i {
	let merge = _mm256_maddubs_epi16(values, _mm256_set1_epi32(0x01400140));
	_mm256_madd_epi16(merge, _mm256_set1_epi32(0x00011000))
}

/// Decodes 32 characters, storing 28 bytes at `dst` of which the first 24 are meaningful
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn decode_block(block: *const u8, dst: *mut u8) {
	let compact = _mm256_setr_epi8(
		2, 1, 0,
		6, 5, 4,
		10, 9, 8,
		14, 13, 12,
		-1, -1, -1, -1,
		2, 1, 0,
		6, 5, 4,
		10, 9, 8,
		14, 13, 12,
		-1, -1, -1, -1);

	let input = _mm256_loadu_si256(block as *const __m256i);
	let shuffled = _mm256_shuffle_epi8(pack(lookup(input)), compact);

	_mm_storeu_si128(dst as *mut __m128i, _mm256_extracti128_si256::<0>(shuffled));
	_mm_storeu_si128(dst.add(12) as *mut __m128i, _mm256_extracti128_si256::<1>(shuffled));
}

/// Decodes unpadded, validated input. The result may carry filler bytes past the decoded
/// length, which the caller truncates.
#[target_feature(enable = "avx2")]
pub(super) unsafe fn decode(data: &[u8]) -> Vec<u8> {
	let blocks = (data.len() + BLOCK - 1) / BLOCK;
	// The second half of the last block spills 4 bytes
	let mut out = vec![0u8; blocks * OUT_PER_BLOCK + 4];
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
