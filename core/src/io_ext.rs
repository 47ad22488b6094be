use std::io::{
	Read,
	Result,
	Seek,
	SeekFrom
};

pub trait ReadBinExt: Read {
	/// Reads exactly `len` bytes into a freshly allocated buffer
	#[inline]
	fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
		let mut buf = vec![0; len];
		self.read_exact(&mut buf)?;
		Ok(buf)
	}

	/// Reads two consecutive little endian 32-bit integers, e.g. a length/tag pair
	#[inline]
	fn read_u32_pair_le(&mut self) -> Result<(u32, u32)> {
		let mut a = [0; 4];
		let mut b = a;

		self.read_exact(&mut a)?;
		self.read_exact(&mut b)?;

		Ok((u32::from_le_bytes(a), u32::from_le_bytes(b)))
	}
}

impl<R> ReadBinExt for R
where
	R: Read + ?Sized,
{
}

pub trait SeekBinExt: Read + Seek {
	/// Fills `buf` with the bytes starting at absolute `offset`
	#[inline]
	fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
		self.seek(SeekFrom::Start(offset))?;
		self.read_exact(buf)
	}
}

impl<R> SeekBinExt for R
where
	R: Read + Seek + ?Sized,
{
}

#[cfg(test)]
mod tests {
	use std::io::{
		Cursor,
		ErrorKind
	};

	use super::*;

	#[test]
	fn test_read_bytes() {
		let mut data = &b"abcdef"[..];
		assert_eq!(b"abcd".to_vec(), data.read_bytes(4).unwrap());
		assert_eq!(ErrorKind::UnexpectedEof, data.read_bytes(4).unwrap_err().kind());
	}

	#[test]
	fn test_read_u32_pair_le() {
		let mut data = &b"\x0c\x00\x00\x00JSON"[..];
		assert_eq!((12, 0x4E4F534A), data.read_u32_pair_le().unwrap());
	}

	#[test]
	fn test_read_exact_at() {
		let mut data = Cursor::new(b"0123456789".to_vec());
		let mut buf = [0; 3];
		data.read_exact_at(4, &mut buf).unwrap();
		assert_eq!(b"456", &buf);
		assert!(data.read_exact_at(8, &mut buf).is_err());
	}
}
