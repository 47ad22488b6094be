use super::SHIFT_LUT;

/// Maps a validated alphabet byte to its 6-bit value
#[inline(always)]
pub(super) fn sextet(c: u8) -> u8 {
	// '/' lands in the same nibble bucket as '+'
	if c == b'/' {
		return 63;
	}

	c.wrapping_add(SHIFT_LUT[(c >> 4) as usize] as u8)
}

/// Merges four sextets into three bytes
#[inline(always)]
pub(super) fn pack(s: [u8; 4]) -> [u8; 3] {
	let hi = s[0] as u32 * 0x40 + s[1] as u32;
	let lo = s[2] as u32 * 0x40 + s[3] as u32;
	let word = hi * 0x1000 + lo;

	[(word >> 16) as u8, (word >> 8) as u8, word as u8]
}

/// Decodes unpadded, validated input one 4-character group at a time
pub(super) fn decode(data: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(data.len() / 4 * 3 + 2);
	let mut group = [0; 4];
	let mut filled = 0;

	for &c in data {
		group[filled] = sextet(c);
		filled += 1;

		if filled == 4 {
			out.extend_from_slice(&pack(group));
			filled = 0;
		}
	}

	// A final group of 2 or 3 characters carries 1 or 2 bytes
	if filled > 1 {
		group[filled..].fill(0);
		out.extend_from_slice(&pack(group)[..filled - 1]);
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sextet() {
		assert_eq!(0, sextet(b'A'));
		assert_eq!(25, sextet(b'Z'));
		assert_eq!(26, sextet(b'a'));
		assert_eq!(51, sextet(b'z'));
		assert_eq!(52, sextet(b'0'));
		assert_eq!(61, sextet(b'9'));
		assert_eq!(62, sextet(b'+'));
		assert_eq!(63, sextet(b'/'));
	}

	#[test]
	fn test_pack() {
		assert_eq!([0xFF, 0xFF, 0xFF], pack([63, 63, 63, 63]));
		assert_eq!([0xFF, 0xEF, 0x00], pack([63, 62, 60, 0]));
		assert_eq!([b'a', b'b', b'c'], pack([24, 22, 9, 35]));
	}

	#[test]
	fn test_partial_groups() {
		assert_eq!(b"a".to_vec(), decode(b"YQ"));
		assert_eq!(b"ab".to_vec(), decode(b"YWI"));
		assert_eq!(b"abcab".to_vec(), decode(b"YWJjYWI"));
	}
}
