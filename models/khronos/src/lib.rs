//! Khronos glTF 2.0 loading: `.gltf` documents, `.glb` containers, embedded and external
//! buffers, and a selectable subset of the element categories.
//!
//! ```no_run
//! use qgltf_khronos::{
//! 	Category,
//! 	Extensions,
//! 	Options,
//! 	Parser
//! };
//!
//! let mut parser = Parser::new(Extensions::KHR_TEXTURE_TRANSFORM);
//! let mut gltf = parser.load_binary_gltf("Box.glb", Options::LOAD_GLB_BUFFERS)?;
//! gltf.parse(Category::ONLY_RENDERABLE)?;
//! let asset = gltf.take_asset();
//! # Ok::<(), qgltf_khronos::Error>(())
//! ```

pub mod category;
pub mod error;
pub mod extensions;
pub mod glb;
pub mod gltf;
pub mod gltf2;
pub mod memory;

#[cfg(feature = "import")]
mod json_ext;
#[cfg(feature = "import")]
pub mod parser;
#[cfg(feature = "import")]
pub mod resolver;
#[cfg(feature = "import")]
mod sections;

use bitflags::bitflags;

#[cfg(feature = "import")]
use byteorder::{
	LE,
	ReadBytesExt
};

#[cfg(feature = "import")]
use std::{
	fs::File,
	path::Path
};

pub use category::{
	Category,
	Section
};
pub use error::{
	Error,
	Result
};
pub use extensions::Extensions;
pub use gltf2::{
	Asset,
	DataLocation,
	DataSource
};
pub use memory::{
	BufferAllocator,
	BufferMemoryHandle,
	BufferMemoryRequest
};

#[cfg(feature = "import")]
pub use parser::{
	Gltf,
	JsonData,
	Parser
};

bitflags! {
	pub struct Options: u32 {
		/// Accept accessors with double precision components
		const ALLOW_DOUBLE = 1 << 0;
		const DONT_REQUIRE_VALID_ASSET_MEMBER = 1 << 1;
		/// Decode base64 without vector instructions
		const DONT_USE_SIMD = 1 << 2;
		/// Read the GLB binary chunk instead of recording its file offset
		const LOAD_GLB_BUFFERS = 1 << 3;
		/// Read external buffer files instead of recording their paths
		const LOAD_EXTERNAL_BUFFERS = 1 << 4;
	}
}

impl Default for Options {
	fn default() -> Self {
		Options::empty()
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParseCfg {
	pub options: Options,
	pub categories: Category,
	pub extensions: Extensions,
}

impl Default for ParseCfg {
	fn default() -> Self {
		Self {
			options: Options::LOAD_GLB_BUFFERS | Options::LOAD_EXTERNAL_BUFFERS,
			categories: Category::ALL,
			extensions: Extensions::all(),
		}
	}
}

#[cfg(feature = "import")]
fn is_glb(path: &Path) -> bool {
	File::open(path)
		.and_then(|mut file| file.read_u32::<LE>())
		.map_or(false, |magic| magic == glb::MAGIC)
}

/// Loads and fully parses a `.gltf` or `.glb` file in one call
#[cfg(feature = "import")]
pub fn read<P: AsRef<Path>>(filepath: P, cfg: ParseCfg) -> Result<Asset> {
	let filepath = filepath.as_ref();
	let mut parser = Parser::new(cfg.extensions);

	let mut gltf = match is_glb(filepath) {
		true => parser.load_binary_gltf(filepath, cfg.options)?,
		false => parser.load_gltf_file(filepath, cfg.options)?,
	};

	gltf.parse(cfg.categories)?;
	gltf.take_asset().ok_or(Error::InvalidGltf)
}
