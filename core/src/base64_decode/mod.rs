//! Base64 decoding with runtime-selected vector kernels.
//!
//! All kernels share the same arithmetic. ASCII bytes are mapped to sextets by adding an
//! offset selected by the byte's high nibble (`/` is the one character whose bucket disagrees
//! with its neighbours, so it is matched explicitly). Four sextets are then merged into a
//! 24-bit word by two multiply-add steps: `s0 * 0x40 + s1` and `s2 * 0x40 + s3`, followed by
//! `hi * 0x1000 + lo`. The vector kernels compact the resulting 4-byte lanes into dense 3-byte
//! groups with a byte shuffle.
//!
//! Input is validated once, up front, so every kernel decodes the same byte sequence and they
//! produce identical output.

use std::{
	fmt::{
		Display,
		Formatter,
		self
	},
	sync::OnceLock
};

use thiserror::Error;
use tracing::debug;

mod scalar;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod avx2;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod sse4;

/// Offset added to an ASCII byte to obtain its sextet, indexed by the byte's high nibble
pub(crate) const SHIFT_LUT: [i8; 16] = [
	0, 0, 19, 4, -65, -65, -71, -71,
	0, 0, 0, 0, 0, 0, 0, 0,
];

/// Right padding for a partial vector block. Decodes to a zero sextet.
pub(crate) const FILLER: u8 = b'A';

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum Base64Error {
	#[error("Invalid base64 byte {byte:#04x} at offset {offset}")]
	InvalidByte {
		offset: usize,
		byte: u8,
	},
	#[error("Invalid base64 length: {0}")]
	InvalidLength(usize),
	#[error("Base64 decoder not supported on this CPU: {0}")]
	Unsupported(Decoder),
}

/// One of the interchangeable decoding kernels
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Decoder {
	/// 32 input bytes per step
	Avx2,
	/// 16 input bytes per step
	Sse4,
	/// 4 input bytes per step, no hardware requirements
	Scalar,
}

impl Decoder {
	pub const ALL: [Decoder; 3] = [Decoder::Avx2, Decoder::Sse4, Decoder::Scalar];

	/// Returns the widest decoder the running CPU supports.
	/// The probe runs once per process.
	pub fn detect() -> Decoder {
		static DETECTED: OnceLock<Decoder> = OnceLock::new();

		*DETECTED.get_or_init(|| {
			let decoder = Decoder::ALL.into_iter()
				.find(|d| d.is_supported())
				.unwrap_or(Decoder::Scalar);
			debug!(%decoder, "selected base64 decoder");
			decoder
		})
	}

	/// Every decoder usable on this CPU, widest first
	pub fn available() -> Vec<Decoder> {
		Decoder::ALL.into_iter().filter(|d| d.is_supported()).collect()
	}

	pub fn is_supported(self) -> bool {
		match self {
			#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
			Decoder::Avx2 => is_x86_feature_detected!("avx2"),
			#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
			Decoder::Sse4 => is_x86_feature_detected!("ssse3") && is_x86_feature_detected!("sse4.1"),
			Decoder::Scalar => true,
			#[allow(unreachable_patterns)]
			_ => false,
		}
	}

	/// Number of encoded bytes consumed per step
	pub fn block_size(self) -> usize {
		match self {
			Decoder::Avx2 => 32,
			Decoder::Sse4 => 16,
			Decoder::Scalar => 4,
		}
	}

	/// Decodes `encoded` with this kernel
	pub fn decode(self, encoded: &[u8]) -> Result<Vec<u8>, Base64Error> {
		if !self.is_supported() {
			return Err(Base64Error::Unsupported(self));
		}

		let padding = validate(encoded)?;
		let data = &encoded[..encoded.len() - padding];

		let mut out = match self {
			// SAFETY: support for the target features was checked above
			#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
			Decoder::Avx2 => unsafe { avx2::decode(data) },
			#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
			Decoder::Sse4 => unsafe { sse4::decode(data) },
			_ => scalar::decode(data),
		};

		// Drops the bytes produced by filler sextets
		out.truncate(decoded_len(encoded.len(), padding));
		Ok(out)
	}
}

impl Display for Decoder {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Decoder::Avx2 => write!(f, "avx2"),
			Decoder::Sse4 => write!(f, "sse4.1"),
			Decoder::Scalar => write!(f, "scalar"),
		}
	}
}

/// Counts the trailing `=` characters (at most 2)
pub fn padding(encoded: &[u8]) -> usize {
	encoded.iter().rev().take(2).take_while(|&&c| c == b'=').count()
}

/// Size of the decoded data for `encoded_len` input bytes ending in `padding` `=` characters
pub const fn decoded_len(encoded_len: usize, padding: usize) -> usize {
	(encoded_len - padding) * 3 / 4
}

/// Decodes with the widest kernel available on this CPU
pub fn decode(encoded: &[u8]) -> Result<Vec<u8>, Base64Error> {
	Decoder::detect().decode(encoded)
}

/// Decodes without any vector instructions
pub fn decode_scalar(encoded: &[u8]) -> Result<Vec<u8>, Base64Error> {
	Decoder::Scalar.decode(encoded)
}

#[inline]
fn is_alphabet(c: u8) -> bool {
	c.is_ascii_alphanumeric() || c == b'+' || c == b'/'
}

/// Checks the whole input and returns its padding count
fn validate(encoded: &[u8]) -> Result<usize, Base64Error> {
	let padding = padding(encoded);
	let data_len = encoded.len() - padding;

	// A single dangling sextet cannot hold a byte, and padding only completes whole groups
	if data_len % 4 == 1 || (padding > 0 && encoded.len() % 4 != 0) {
		return Err(Base64Error::InvalidLength(encoded.len()));
	}

	match encoded[..data_len].iter().position(|&c| !is_alphabet(c)) {
		Some(offset) => Err(Base64Error::InvalidByte {
			offset,
			byte: encoded[offset],
		}),
		None => Ok(padding),
	}
}

#[cfg(test)]
mod tests {
	use rand::{
		Rng,
		rngs::StdRng,
		SeedableRng
	};

	use super::*;

	fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
		let mut bytes = vec![0; len];
		rng.fill(&mut bytes[..]);
		bytes
	}

	#[test]
	fn test_empty() {
		for decoder in Decoder::available() {
			assert_eq!(Vec::<u8>::new(), decoder.decode(b"").unwrap());
		}
	}

	#[test]
	fn test_fixtures() {
		for decoder in Decoder::available() {
			assert_eq!(vec![0xFF], decoder.decode(b"/w==").unwrap());
			assert_eq!(vec![0xFF, 0xEF], decoder.decode(b"/+8=").unwrap());
			assert_eq!(vec![0xFF], decoder.decode(b"//==").unwrap());
			assert_eq!(b"Hello World. Hello World.".to_vec(),
				decoder.decode(b"SGVsbG8gV29ybGQuIEhlbGxvIFdvcmxkLg==").unwrap());
		}
	}

	#[test]
	fn test_unpadded() {
		for decoder in Decoder::available() {
			assert_eq!(b"ab".to_vec(), decoder.decode(b"YWI").unwrap());
			assert_eq!(b"a".to_vec(), decoder.decode(b"YQ").unwrap());
			assert_eq!(b"abc".to_vec(), decoder.decode(b"YWJj").unwrap());
		}
	}

	#[test]
	fn test_padding() {
		assert_eq!(0, padding(b""));
		assert_eq!(0, padding(b"YWJj"));
		assert_eq!(1, padding(b"YWI="));
		assert_eq!(2, padding(b"YQ=="));
		assert_eq!(2, padding(b"Y==="));
		assert_eq!(1, decoded_len(4, 2));
		assert_eq!(2, decoded_len(4, 1));
		assert_eq!(5, decoded_len(7, 0));
	}

	#[test]
	fn test_malformed() {
		for decoder in Decoder::available() {
			assert_eq!(Err(Base64Error::InvalidByte { offset: 2, byte: b'=' }), decoder.decode(b"YW=j"));
			assert_eq!(Err(Base64Error::InvalidByte { offset: 1, byte: b'-' }), decoder.decode(b"Y-Jj"));
			assert_eq!(Err(Base64Error::InvalidByte { offset: 1, byte: b'=' }), decoder.decode(b"Y==="));
			assert_eq!(Err(Base64Error::InvalidLength(5)), decoder.decode(b"YWJjZ"));
			assert_eq!(Err(Base64Error::InvalidLength(3)), decoder.decode(b"YW="));
			assert!(decoder.decode(&[0xC3, 0xA9, b'A', b'A']).is_err());
		}
	}

	#[test]
	fn test_unsupported_decoder() {
		for decoder in Decoder::ALL {
			if !decoder.is_supported() {
				assert_eq!(Err(Base64Error::Unsupported(decoder)), decoder.decode(b"YWJj"));
			}
		}
	}

	#[test]
	fn test_detect_is_available() {
		let detected = Decoder::detect();
		assert!(detected.is_supported());
		assert_eq!(Some(&detected), Decoder::available().first());
		assert_eq!(detected, Decoder::detect());
	}

	#[test]
	fn test_roundtrip_lengths() {
		let mut rng = StdRng::seed_from_u64(0xB64);

		for len in 0..4096 {
			let bytes = random_bytes(&mut rng, len);
			let encoded = base64::encode(&bytes);
			assert_eq!(bytes, decode(encoded.as_bytes()).unwrap(), "length {}", len);
		}
	}

	#[test]
	fn test_decoders_agree() {
		let mut rng = StdRng::seed_from_u64(0x5EED);
		let decoders = Decoder::available();

		for _ in 0..500 {
			let len = rng.gen_range(0..1500);
			let bytes = random_bytes(&mut rng, len);

			for encoded in [base64::encode(&bytes), base64::encode_config(&bytes, base64::STANDARD_NO_PAD)] {
				let expected = decode_scalar(encoded.as_bytes()).unwrap();
				assert_eq!(bytes, expected);

				for decoder in decoders.iter() {
					assert_eq!(expected, decoder.decode(encoded.as_bytes()).unwrap(),
						"{} disagrees on {:?}", decoder, encoded);
				}
			}
		}
	}

	#[test]
	fn test_every_alphabet_byte() {
		// 64 characters at every lane offset of a vector block
		let alphabet = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

		for rotate in 0..64 {
			let mut input = alphabet.to_vec();
			input.rotate_left(rotate);
			let expected = decode_scalar(&input).unwrap();
			assert_eq!(48, expected.len());

			for decoder in Decoder::available() {
				assert_eq!(expected, decoder.decode(&input).unwrap());
			}
		}
	}
}
