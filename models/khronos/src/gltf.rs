//! Enumerations shared by the glTF schema, with their JSON encodings.

use mime::Mime;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum ComponentType {
	Int8 = 5120,
	UInt8,
	Int16,
	UInt16,
	UInt32 = 5125,
	Float = 5126,
	/// Only accepted when the caller allows double precision
	Double = 5130,
}

impl ComponentType {
	pub fn from_gl(value: u64, allow_double: bool) -> Option<Self> {
		match value {
			5120 => Some(Self::Int8),
			5121 => Some(Self::UInt8),
			5122 => Some(Self::Int16),
			5123 => Some(Self::UInt16),
			5125 => Some(Self::UInt32),
			5126 => Some(Self::Float),
			5130 if allow_double => Some(Self::Double),
			_ => None,
		}
	}

	pub fn gl_enum(self) -> u32 {
		self as u32
	}

	pub fn byte_size(self) -> usize {
		match self {
			Self::Int8 | Self::UInt8 => 1,
			Self::Int16 | Self::UInt16 => 2,
			Self::UInt32 | Self::Float => 4,
			Self::Double => 8,
		}
	}

	/// Whether the type may index sparse accessor elements
	pub fn is_index(self) -> bool {
		matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32)
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AccessorType {
	Scalar,
	Vec2,
	Vec3,
	Vec4,
	Mat2,
	Mat3,
	Mat4,
}

impl AccessorType {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"SCALAR" => Some(Self::Scalar),
			"VEC2" => Some(Self::Vec2),
			"VEC3" => Some(Self::Vec3),
			"VEC4" => Some(Self::Vec4),
			"MAT2" => Some(Self::Mat2),
			"MAT3" => Some(Self::Mat3),
			"MAT4" => Some(Self::Mat4),
			_ => None,
		}
	}

	pub fn num_components(self) -> usize {
		match self {
			Self::Scalar => 1,
			Self::Vec2 => 2,
			Self::Vec3 => 3,
			Self::Vec4 | Self::Mat2 => 4,
			Self::Mat3 => 9,
			Self::Mat4 => 16,
		}
	}
}

/// Size of one accessor element, ignoring matrix column padding
pub fn element_byte_size(kind: AccessorType, component_type: ComponentType) -> usize {
	kind.num_components() * component_type.byte_size()
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum PrimitiveType {
	Points = 0,
	Lines,
	LineLoop,
	LineStrip,
	Triangles,
	TriangleStrip,
	TriangleFan,
}

impl PrimitiveType {
	pub fn from_mode(mode: u64) -> Option<Self> {
		match mode {
			0 => Some(Self::Points),
			1 => Some(Self::Lines),
			2 => Some(Self::LineLoop),
			3 => Some(Self::LineStrip),
			4 => Some(Self::Triangles),
			5 => Some(Self::TriangleStrip),
			6 => Some(Self::TriangleFan),
			_ => None,
		}
	}
}

impl Default for PrimitiveType {
	fn default() -> Self {
		Self::Triangles
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum Filter {
	Nearest = 9728,
	Linear = 9729,
	NearestMipMapNearest = 9984,
	LinearMipMapNearest = 9985,
	NearestMipMapLinear = 9986,
	LinearMipMapLinear = 9987,
}

impl Filter {
	pub fn from_gl(value: u64) -> Option<Self> {
		match value {
			9728 => Some(Self::Nearest),
			9729 => Some(Self::Linear),
			9984 => Some(Self::NearestMipMapNearest),
			9985 => Some(Self::LinearMipMapNearest),
			9986 => Some(Self::NearestMipMapLinear),
			9987 => Some(Self::LinearMipMapLinear),
			_ => None,
		}
	}

	/// Only the two non-mipmapped filters are valid magnification filters
	pub fn is_mag_filter(self) -> bool {
		matches!(self, Self::Nearest | Self::Linear)
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum Wrap {
	ClampToEdge = 33071,
	MirroredRepeat = 33648,
	Repeat = 10497,
}

impl Wrap {
	pub fn from_gl(value: u64) -> Option<Self> {
		match value {
			33071 => Some(Self::ClampToEdge),
			33648 => Some(Self::MirroredRepeat),
			10497 => Some(Self::Repeat),
			_ => None,
		}
	}
}

impl Default for Wrap {
	fn default() -> Self {
		Self::Repeat
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum BufferTarget {
	ArrayBuffer = 34962,
	ElementArrayBuffer = 34963,
}

impl BufferTarget {
	pub fn from_gl(value: u64) -> Option<Self> {
		match value {
			34962 => Some(Self::ArrayBuffer),
			34963 => Some(Self::ElementArrayBuffer),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MimeType {
	None,
	Jpeg,
	Png,
	Ktx2,
	Dds,
	Webp,
	GltfBuffer,
	OctetStream,
}

impl MimeType {
	/// Maps a media type to one of the known kinds. Parameters are ignored and unknown
	/// types map to [`MimeType::None`].
	pub fn parse(media_type: &str) -> Self {
		match media_type.parse::<Mime>() {
			Ok(m) => match m.essence_str() {
				"image/jpeg" => Self::Jpeg,
				"image/png" => Self::Png,
				"image/ktx2" => Self::Ktx2,
				"image/vnd-ms.dds" => Self::Dds,
				"image/webp" => Self::Webp,
				"application/gltf-buffer" => Self::GltfBuffer,
				"application/octet-stream" => Self::OctetStream,
				_ => Self::None,
			},
			Err(_) => Self::None,
		}
	}

	/// Guesses the type of an image file from its extension
	pub fn from_extension(ext: &str) -> Self {
		match ext.to_ascii_lowercase().as_str() {
			"jpg" | "jpeg" => Self::Jpeg,
			"png" => Self::Png,
			"ktx2" => Self::Ktx2,
			"dds" => Self::Dds,
			"webp" => Self::Webp,
			"bin" | "glbin" => Self::GltfBuffer,
			_ => Self::None,
		}
	}

	pub fn as_str(self) -> Option<&'static str> {
		match self {
			Self::None => None,
			Self::Jpeg => Some("image/jpeg"),
			Self::Png => Some("image/png"),
			Self::Ktx2 => Some("image/ktx2"),
			Self::Dds => Some("image/vnd-ms.dds"),
			Self::Webp => Some("image/webp"),
			Self::GltfBuffer => Some("application/gltf-buffer"),
			Self::OctetStream => Some("application/octet-stream"),
		}
	}
}

impl Default for MimeType {
	fn default() -> Self {
		Self::None
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AlphaMode {
	Opaque,
	Mask,
	Blend,
}

impl AlphaMode {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"OPAQUE" => Some(Self::Opaque),
			"MASK" => Some(Self::Mask),
			"BLEND" => Some(Self::Blend),
			_ => None,
		}
	}
}

impl Default for AlphaMode {
	fn default() -> Self {
		Self::Opaque
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AnimationInterpolation {
	Linear,
	Step,
	CubicSpline,
}

impl AnimationInterpolation {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"LINEAR" => Some(Self::Linear),
			"STEP" => Some(Self::Step),
			"CUBICSPLINE" => Some(Self::CubicSpline),
			_ => None,
		}
	}
}

impl Default for AnimationInterpolation {
	fn default() -> Self {
		Self::Linear
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AnimationPath {
	Translation,
	Rotation,
	Scale,
	Weights,
}

impl AnimationPath {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"translation" => Some(Self::Translation),
			"rotation" => Some(Self::Rotation),
			"scale" => Some(Self::Scale),
			"weights" => Some(Self::Weights),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_component_type() {
		assert_eq!(Some(ComponentType::UInt16), ComponentType::from_gl(5123, false));
		assert_eq!(None, ComponentType::from_gl(5124, true));
		assert_eq!(None, ComponentType::from_gl(5130, false));
		assert_eq!(Some(ComponentType::Double), ComponentType::from_gl(5130, true));
		assert_eq!(5121, ComponentType::UInt8.gl_enum());
		assert_eq!(12, element_byte_size(AccessorType::Vec3, ComponentType::Float));
		assert_eq!(128, element_byte_size(AccessorType::Mat4, ComponentType::Double));
		assert!(!ComponentType::Int16.is_index());
	}

	#[test]
	fn test_gl_enums() {
		assert_eq!(Some(PrimitiveType::TriangleFan), PrimitiveType::from_mode(6));
		assert_eq!(None, PrimitiveType::from_mode(7));
		assert_eq!(Some(Filter::LinearMipMapLinear), Filter::from_gl(9987));
		assert!(!Filter::NearestMipMapNearest.is_mag_filter());
		assert_eq!(Some(Wrap::MirroredRepeat), Wrap::from_gl(33648));
		assert_eq!(None, Wrap::from_gl(0));
		assert_eq!(Some(BufferTarget::ElementArrayBuffer), BufferTarget::from_gl(34963));
	}

	#[test]
	fn test_mime_type() {
		assert_eq!(MimeType::Png, MimeType::parse("image/png"));
		assert_eq!(MimeType::OctetStream, MimeType::parse("application/octet-stream"));
		assert_eq!(MimeType::GltfBuffer, MimeType::parse("application/gltf-buffer; charset=binary"));
		assert_eq!(MimeType::None, MimeType::parse("text/plain"));
		assert_eq!(MimeType::None, MimeType::parse(""));
		assert_eq!(MimeType::Jpeg, MimeType::from_extension("JPG"));
		assert_eq!(Some("image/vnd-ms.dds"), MimeType::Dds.as_str());
	}

	#[test]
	fn test_names() {
		assert_eq!(Some(AccessorType::Mat3), AccessorType::from_name("MAT3"));
		assert_eq!(None, AccessorType::from_name("vec3"));
		assert_eq!(Some(AlphaMode::Mask), AlphaMode::from_name("MASK"));
		assert_eq!(Some(AnimationInterpolation::CubicSpline), AnimationInterpolation::from_name("CUBICSPLINE"));
		assert_eq!(Some(AnimationPath::Weights), AnimationPath::from_name("weights"));
	}
}
