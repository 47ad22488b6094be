//! Turns buffer and image references into [`DataSource`]s: data URIs are decoded, GLB chunk
//! and file references are either recorded or loaded, depending on the options.

use std::{
	fs::File,
	path::{
		Path,
		PathBuf
	}
};

use percent_encoding::percent_decode_str;
use tracing::{
	debug,
	warn
};

use qgltf_core::{
	base64_decode,
	io_ext::SeekBinExt
};

use crate::{
	error::{
		Error,
		Result
	},
	glb::EmbeddedBinaryChunk,
	gltf::MimeType,
	gltf2::DataSource,
	memory::{
		BufferAllocator,
		BufferMemoryRequest,
		with_buffer_memory
	},
	Options
};

/// A `data:[<media type>];base64,<payload>` URI
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DataUri<'u> {
	pub mime: MimeType,
	pub payload: &'u str,
}

/// Splits a data URI. Returns `None` for any other kind of URI.
pub fn data_uri(uri: &str) -> Result<Option<DataUri<'_>>> {
	let rest = match uri.strip_prefix("data:") {
		Some(rest) => rest,
		None => return Ok(None),
	};

	let (header, payload) = rest.split_once(',').ok_or(Error::InvalidGltf)?;
	let media_type = header.strip_suffix(";base64").ok_or_else(|| {
		warn!(header, "data uri is not base64 encoded");
		Error::InvalidGltf
	})?;

	Ok(Some(DataUri {
		mime: MimeType::parse(media_type),
		payload,
	}))
}

/// `scheme:` prefix of an absolute URI. A single letter is a drive, not a scheme.
fn has_scheme(uri: &str) -> bool {
	match uri.split_once(':') {
		Some((scheme, _)) => scheme.len() > 1 &&
			scheme.starts_with(|c: char| c.is_ascii_alphabetic()) &&
			scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
		None => false,
	}
}

pub struct Resolver<'a> {
	directory: &'a Path,
	options: Options,
	glb: Option<(&'a Path, Option<&'a EmbeddedBinaryChunk>)>,
	allocator: Option<&'a mut (dyn BufferAllocator + 'static)>,
	user_context: u64,
}

impl<'a> Resolver<'a> {
	/// Relative paths are resolved against `directory`
	pub fn new(directory: &'a Path, options: Options) -> Self {
		Self {
			directory,
			options,
			glb: None,
			allocator: None,
			user_context: 0,
		}
	}

	/// Lets the first buffer refer to the binary chunk of the container at `path`
	pub fn with_glb(mut self, path: &'a Path, chunk: Option<&'a EmbeddedBinaryChunk>) -> Self {
		self.glb = Some((path, chunk));
		self
	}

	pub fn with_allocator(mut self, allocator: Option<&'a mut (dyn BufferAllocator + 'static)>,
		user_context: u64) -> Self
	{
		self.allocator = allocator;
		self.user_context = user_context;
		self
	}

	/// Resolves a relative or `file://` URI to a path
	pub fn path(&self, uri: &str) -> Result<PathBuf> {
		let uri = uri.strip_prefix("file://").unwrap_or(uri);
		if has_scheme(uri) {
			warn!(uri, "unsupported uri scheme");
			return Err(Error::InvalidGltf);
		}

		let decoded = percent_decode_str(uri).decode_utf8().map_err(|_| Error::InvalidGltf)?;
		let path = Path::new(&*decoded);

		Ok(match path.is_absolute() {
			true => path.to_path_buf(),
			false => self.directory.join(path),
		})
	}

	fn decode(&self, payload: &str) -> Result<Vec<u8>> {
		let decode = if self.options.contains(Options::DONT_USE_SIMD) {
			base64_decode::decode_scalar
		} else {
			base64_decode::decode
		};

		decode(payload.as_bytes()).map_err(|e| {
			warn!(error = %e, "invalid base64 payload");
			Error::InvalidGltf
		})
	}

	/// Writes `byte_size` bytes through `fill`, into allocator memory if an allocator is set
	fn materialize<F>(&mut self, byte_size: usize, mime: MimeType, fill: F) -> Result<DataSource>
	where
		F: FnOnce(&mut [u8]) -> Result<()>,
	{
		match self.allocator.as_deref_mut() {
			Some(allocator) => {
				let request = BufferMemoryRequest {
					byte_size,
					user_context: self.user_context,
				};
				let id = with_buffer_memory(allocator, &request, fill)?;
				Ok(DataSource::CustomBuffer { id, mime })
			},
			None => {
				let mut bytes = vec![0; byte_size];
				fill(&mut bytes)?;
				Ok(DataSource::Vector { bytes, mime })
			},
		}
	}

	/// Stores bytes that were already decoded
	fn store(&mut self, bytes: Vec<u8>, mime: MimeType) -> Result<DataSource> {
		match self.allocator {
			Some(_) => self.materialize(bytes.len(), mime, |region| {
				region.copy_from_slice(&bytes);
				Ok(())
			}),
			None => Ok(DataSource::Vector { bytes, mime }),
		}
	}

	pub fn buffer(&mut self, index: usize, uri: Option<&str>, byte_length: usize) -> Result<DataSource> {
		let uri = match uri {
			Some(uri) => uri,
			None => return self.embedded_buffer(index, byte_length),
		};

		if let Some(data) = data_uri(uri)? {
			let mut bytes = self.decode(data.payload)?;
			if bytes.len() < byte_length {
				warn!(index, byte_length, decoded = bytes.len(), "data uri is shorter than the buffer");
				return Err(Error::InvalidGltf);
			}
			bytes.truncate(byte_length);
			return self.store(bytes, data.mime);
		}

		let path = self.path(uri)?;
		if !self.options.contains(Options::LOAD_EXTERNAL_BUFFERS) {
			return Ok(DataSource::FilePath {
				path,
				file_byte_offset: 0,
				byte_length: Some(byte_length),
				mime: MimeType::None,
			});
		}

		debug!(index, path = %path.display(), "loading external buffer");
		let mut file = File::open(&path).map_err(|e| {
			warn!(path = %path.display(), error = %e, "cannot open external buffer");
			Error::MissingExternalBuffer
		})?;

		let file_len = file.metadata().map_err(|_| Error::MissingExternalBuffer)?.len();
		if file_len < byte_length as u64 {
			warn!(path = %path.display(), file_len, byte_length, "external buffer is too short");
			return Err(Error::MissingExternalBuffer);
		}

		self.materialize(byte_length, MimeType::None, |region| {
			file.read_exact_at(0, region).map_err(|_| Error::MissingExternalBuffer)
		})
	}

	fn embedded_buffer(&mut self, index: usize, byte_length: usize) -> Result<DataSource> {
		let (path, chunk) = match self.glb {
			Some((path, Some(chunk))) if index == 0 => (path, chunk),
			Some((_, None)) if index == 0 => {
				warn!("buffer refers to a missing binary chunk");
				return Err(Error::MissingExternalBuffer);
			},
			_ => {
				warn!(index, "buffer has no uri");
				return Err(Error::InvalidGltf);
			},
		};

		if byte_length > chunk.byte_length {
			warn!(byte_length, chunk = chunk.byte_length, "buffer is larger than the binary chunk");
			return Err(Error::MissingExternalBuffer);
		}

		match &chunk.data {
			Some(data) => self.materialize(byte_length, MimeType::GltfBuffer, |region| {
				region.copy_from_slice(&data[..byte_length]);
				Ok(())
			}),
			None => Ok(DataSource::FilePath {
				path: path.to_path_buf(),
				file_byte_offset: chunk.file_offset,
				byte_length: Some(byte_length),
				mime: MimeType::GltfBuffer,
			}),
		}
	}

	/// Images are decoded from data URIs, otherwise only located. `mime` is the declared
	/// `mimeType`, or [`MimeType::None`].
	pub fn image(&mut self, uri: Option<&str>, buffer_view: Option<usize>, mime: MimeType) -> Result<DataSource> {
		match (uri, buffer_view) {
			(Some(uri), None) => {
				if let Some(data) = data_uri(uri)? {
					let bytes = self.decode(data.payload)?;
					let mime = match data.mime {
						MimeType::None => mime,
						declared => declared,
					};
					return self.store(bytes, mime);
				}

				let path = self.path(uri)?;
				let mime = match mime {
					MimeType::None => path.extension()
						.and_then(|ext| ext.to_str())
						.map_or(MimeType::None, MimeType::from_extension),
					mime => mime,
				};

				Ok(DataSource::FilePath {
					path,
					file_byte_offset: 0,
					byte_length: None,
					mime,
				})
			},
			(None, Some(buffer_view)) => Ok(DataSource::BufferView {
				buffer_view,
				mime,
			}),
			_ => {
				warn!("image needs exactly one of uri and bufferView");
				Err(Error::InvalidGltf)
			},
		}
	}
}
