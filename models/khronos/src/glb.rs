//! The GLB binary container: a 12 byte header followed by a JSON chunk and an optional
//! binary chunk, all little endian.

use qgltf_core::rtag4;

pub const MAGIC: u32 = rtag4!(b"glTF");
pub const VERSION: u32 = 2;
pub const HEADER_SIZE: u64 = 12;
pub const CHUNK_HEADER_SIZE: u64 = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
	pub magic: u32,
	pub version: u32,
	/// Total container length, headers included
	pub length: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ChunkType {
	Json = rtag4!(b"JSON"),
	Binary = rtag4!(b"BIN\x00"),
}

impl ChunkType {
	pub fn from_tag(tag: u32) -> Option<Self> {
		match tag {
			t if t == ChunkType::Json as u32 => Some(ChunkType::Json),
			t if t == ChunkType::Binary as u32 => Some(ChunkType::Binary),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChunkHeader {
	pub length: u32,
	pub kind: u32,
}

/// The BIN chunk. `data` is only filled when the caller asked for it to be loaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmbeddedBinaryChunk {
	/// Offset of the chunk's first data byte from the start of the file
	pub file_offset: u64,
	pub byte_length: usize,
	pub data: Option<Vec<u8>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Container {
	pub header: Header,
	pub json: Vec<u8>,
	pub binary: Option<EmbeddedBinaryChunk>,
}

#[cfg(feature = "import")]
pub mod import {
	use byteorder::{
		LE,
		ReadBytesExt
	};

	use std::io::{
		Read,
		Seek,
		SeekFrom
	};

	use tracing::{
		debug,
		warn
	};

	use qgltf_core::io_ext::{
		ReadBinExt,
		SeekBinExt
	};

	use crate::error::{
		Error,
		Result
	};

	use super::*;

	fn header<R>(buf: &mut R) -> Result<Header>
	where
		R: ReadBytesExt,
	{
		let magic = buf.read_u32::<LE>().map_err(|_| Error::InvalidGlb)?;
		if magic != MAGIC {
			warn!(magic, "not a GLB container");
			return Err(Error::InvalidGlb);
		}

		let version = buf.read_u32::<LE>().map_err(|_| Error::InvalidGlb)?;
		if version != VERSION {
			warn!(version, "unsupported GLB version");
			return Err(Error::InvalidGlb);
		}

		Ok(Header {
			magic: magic,
			version: version,
			length: buf.read_u32::<LE>().map_err(|_| Error::InvalidGlb)?,
		})
	}

	/// Reads the chunk header at `offset`, checking the chunk fits before `end`
	fn chunk_header<R>(buf: &mut R, offset: u64, end: u64) -> Result<ChunkHeader>
	where
		R: Read + Seek,
	{
		if offset + CHUNK_HEADER_SIZE > end {
			return Err(Error::InvalidGlb);
		}

		buf.seek(SeekFrom::Start(offset)).map_err(|_| Error::InvalidGlb)?;
		let (length, kind) = buf.read_u32_pair_le().map_err(|_| Error::InvalidGlb)?;

		if offset + CHUNK_HEADER_SIZE + length as u64 > end {
			warn!(offset, length, "chunk overruns the container");
			return Err(Error::InvalidGlb);
		}

		Ok(ChunkHeader {
			length,
			kind,
		})
	}

	/// Reads the container structure. The binary chunk's bytes are only read when
	/// `load_binary` is set; its location is always recorded.
	pub fn container<R>(buf: &mut R, load_binary: bool) -> Result<Container>
	where
		R: Read + Seek,
	{
		let file_len = buf.seek(SeekFrom::End(0)).map_err(|_| Error::InvalidGlb)?;
		buf.seek(SeekFrom::Start(0)).map_err(|_| Error::InvalidGlb)?;

		let header = header(buf)?;
		let end = header.length as u64;
		if end > file_len {
			warn!(length = header.length, file_len, "GLB header length exceeds the file");
			return Err(Error::InvalidGlb);
		}

		let first = chunk_header(buf, HEADER_SIZE, end)?;
		if ChunkType::from_tag(first.kind) != Some(ChunkType::Json) {
			warn!(kind = first.kind, "first chunk is not JSON");
			return Err(Error::InvalidGlb);
		}
		let json = buf.read_bytes(first.length as usize).map_err(|_| Error::InvalidGlb)?;

		let mut offset = HEADER_SIZE + CHUNK_HEADER_SIZE + first.length as u64;
		let mut binary = None;

		while offset + CHUNK_HEADER_SIZE <= end {
			let chunk = chunk_header(buf, offset, end)?;
			let data_offset = offset + CHUNK_HEADER_SIZE;

			match ChunkType::from_tag(chunk.kind) {
				Some(ChunkType::Binary) if binary.is_none() => {
					let data = if load_binary {
						let mut data = vec![0; chunk.length as usize];
						buf.read_exact_at(data_offset, &mut data).map_err(|_| Error::InvalidGlb)?;
						Some(data)
					} else {
						None
					};

					binary = Some(EmbeddedBinaryChunk {
						file_offset: data_offset,
						byte_length: chunk.length as usize,
						data,
					});
				},
				Some(kind) => {
					warn!(?kind, offset, "unexpected second chunk");
					return Err(Error::InvalidGlb);
				},
				None => debug!(kind = chunk.kind, offset, "skipping unknown chunk"),
			}

			offset = data_offset + chunk.length as u64;
		}

		Ok(Container {
			header,
			json,
			binary,
		})
	}
}
