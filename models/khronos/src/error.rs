use thiserror::Error;

/// Fatal parse conditions. The numeric values are stable and may be persisted by callers.
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
#[repr(u32)]
pub enum Error {
	#[error("The file could not be opened")]
	InvalidPath = 1,
	#[error("A required extension is known but was not enabled by the caller")]
	MissingExtensions = 2,
	#[error("A required extension is not supported")]
	UnknownRequiredExtension = 3,
	#[error("The JSON document could not be parsed")]
	InvalidJson = 4,
	#[error("The document does not follow the glTF schema")]
	InvalidGltf = 5,
	#[error("The asset field is missing or invalid")]
	InvalidOrMissingAssetField = 6,
	#[error("A required field is missing")]
	MissingField = 7,
	#[error("A buffer could not be loaded")]
	MissingExternalBuffer = 8,
	#[error("The glTF version is not supported")]
	UnsupportedVersion = 9,
	#[error("The GLB container is malformed")]
	InvalidGlb = 10,
}

impl Error {
	/// Stable numeric code of this error
	pub fn code(self) -> u32 {
		self as u32
	}
}

pub type Result<T> = std::result::Result<T, Error>;
