//! The parsed glTF 2.0 asset. Elements refer to each other by index into the arrays of
//! [`Asset`]; indices are stored as read and are not checked against array lengths.

use std::{
	collections::HashMap,
	path::PathBuf
};

use ultraviolet::{
	mat::Mat4,
	rotor::Rotor3,
	vec::{
		Vec3,
		Vec4
	}
};

use crate::{
	extensions::{
		DracoCompression,
		Light,
		MaterialClearcoat,
		MaterialIridescence,
		MaterialSheen,
		MaterialSpecular,
		MaterialTransmission,
		MaterialVolume,
		MeshoptCompression,
		TextureTransform
	},
	gltf::*
};

/// Where a buffer's or image's bytes are stored
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DataLocation {
	VectorWithMime,
	FilePathWithByteRange,
	BufferViewWithMime,
	CustomBufferWithId,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataSource {
	/// Bytes owned by the asset
	Vector {
		bytes: Vec<u8>,
		mime: MimeType,
	},
	/// Bytes left in a file: `byte_length` bytes starting at `file_byte_offset`, or the rest
	/// of the file when the length is unknown
	FilePath {
		path: PathBuf,
		file_byte_offset: u64,
		byte_length: Option<usize>,
		mime: MimeType,
	},
	/// An image stored inside a buffer view
	BufferView {
		buffer_view: usize,
		mime: MimeType,
	},
	/// Bytes written to memory handed out by the caller's allocator
	CustomBuffer {
		id: u64,
		mime: MimeType,
	},
}

impl DataSource {
	pub fn location(&self) -> DataLocation {
		match self {
			DataSource::Vector { .. } => DataLocation::VectorWithMime,
			DataSource::FilePath { .. } => DataLocation::FilePathWithByteRange,
			DataSource::BufferView { .. } => DataLocation::BufferViewWithMime,
			DataSource::CustomBuffer { .. } => DataLocation::CustomBufferWithId,
		}
	}

	pub fn mime_type(&self) -> MimeType {
		match *self {
			DataSource::Vector { mime, .. } |
			DataSource::FilePath { mime, .. } |
			DataSource::BufferView { mime, .. } |
			DataSource::CustomBuffer { mime, .. } => mime,
		}
	}

	/// The file window of a [`DataSource::FilePath`] as `(offset, length)`
	pub fn file_range(&self) -> Option<(u64, Option<usize>)> {
		match *self {
			DataSource::FilePath { file_byte_offset, byte_length, .. } => Some((file_byte_offset, byte_length)),
			_ => None,
		}
	}

	/// The bytes, if they are owned by the asset
	pub fn bytes(&self) -> Option<&[u8]> {
		match self {
			DataSource::Vector { bytes, .. } => Some(bytes),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetInfo {
	pub version: String,
	pub min_version: Option<String>,
	pub generator: Option<String>,
	pub copyright: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Buffer {
	pub byte_length: usize,
	pub data: DataSource,
	pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BufferView {
	pub buffer: usize,
	pub byte_offset: usize,
	pub byte_length: usize,
	pub byte_stride: Option<usize>,
	pub target: Option<BufferTarget>,
	pub meshopt_compression: Option<MeshoptCompression>,
	pub name: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SparseAccessor {
	pub count: usize,
	pub indices_buffer_view: usize,
	pub indices_byte_offset: usize,
	pub indices_component_type: ComponentType,
	pub values_buffer_view: usize,
	pub values_byte_offset: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Accessor {
	pub byte_offset: usize,
	pub count: usize,
	pub kind: AccessorType,
	pub component_type: ComponentType,
	pub normalized: bool,
	pub buffer_view: Option<usize>,
	pub min: Vec<f64>,
	pub max: Vec<f64>,
	pub sparse: Option<SparseAccessor>,
	pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
	pub data: DataSource,
	pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sampler {
	pub mag_filter: Option<Filter>,
	pub min_filter: Option<Filter>,
	pub wrap_s: Wrap,
	pub wrap_t: Wrap,
	pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Texture {
	/// Image to sample. Points at an extension image (basisu, dds, webp) when one was used.
	pub image: Option<usize>,
	/// The core `source` image when an extension image replaced it
	pub fallback_image: Option<usize>,
	pub sampler: Option<usize>,
	pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureInfo {
	pub texture: usize,
	pub tex_coord: usize,
	/// Normal scale or occlusion strength; 1 for other textures
	pub scale: f32,
	pub transform: Option<TextureTransform>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PbrData {
	pub base_color_factor: Vec4,
	pub metallic_factor: f32,
	pub roughness_factor: f32,
	pub base_color_texture: Option<TextureInfo>,
	pub metallic_roughness_texture: Option<TextureInfo>,
}

impl Default for PbrData {
	fn default() -> Self {
		Self {
			base_color_factor: Vec4::one(),
			metallic_factor: 1.0,
			roughness_factor: 1.0,
			base_color_texture: None,
			metallic_roughness_texture: None,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
	pub pbr_data: PbrData,
	pub normal_texture: Option<TextureInfo>,
	pub occlusion_texture: Option<TextureInfo>,
	pub emissive_texture: Option<TextureInfo>,
	pub emissive_factor: Vec3,
	/// KHR_materials_emissive_strength
	pub emissive_strength: f32,
	pub alpha_mode: AlphaMode,
	pub alpha_cutoff: f32,
	pub double_sided: bool,
	/// KHR_materials_unlit
	pub unlit: bool,
	/// KHR_materials_ior
	pub ior: f32,
	pub specular: Option<MaterialSpecular>,
	pub iridescence: Option<MaterialIridescence>,
	pub volume: Option<MaterialVolume>,
	pub transmission: Option<MaterialTransmission>,
	pub clearcoat: Option<MaterialClearcoat>,
	pub sheen: Option<MaterialSheen>,
	pub name: String,
}

impl Default for Material {
	fn default() -> Self {
		Self {
			pbr_data: PbrData::default(),
			normal_texture: None,
			occlusion_texture: None,
			emissive_texture: None,
			emissive_factor: Vec3::zero(),
			emissive_strength: 1.0,
			alpha_mode: AlphaMode::Opaque,
			alpha_cutoff: 0.5,
			double_sided: false,
			unlit: false,
			ior: 1.5,
			specular: None,
			iridescence: None,
			volume: None,
			transmission: None,
			clearcoat: None,
			sheen: None,
			name: String::new(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraKind {
	Perspective {
		aspect_ratio: Option<f32>,
		yfov: f32,
		zfar: Option<f32>,
		znear: f32,
	},
	Orthographic {
		xmag: f32,
		ymag: f32,
		zfar: f32,
		znear: f32,
	},
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
	pub kind: CameraKind,
	pub name: String,
}

/// Attribute semantic to accessor index
pub type AttributeMap = HashMap<String, usize>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Primitive {
	pub attributes: AttributeMap,
	pub kind: PrimitiveType,
	pub indices: Option<usize>,
	pub material: Option<usize>,
	pub targets: Vec<AttributeMap>,
	pub draco_compression: Option<DracoCompression>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
	pub primitives: Vec<Primitive>,
	pub weights: Vec<f32>,
	pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skin {
	pub joints: Vec<usize>,
	pub skeleton: Option<usize>,
	pub inverse_bind_matrices: Option<usize>,
	pub name: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnimationChannel {
	pub sampler: usize,
	pub node: Option<usize>,
	pub path: AnimationPath,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnimationSampler {
	pub input: usize,
	pub output: usize,
	pub interpolation: AnimationInterpolation,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
	pub channels: Vec<AnimationChannel>,
	pub samplers: Vec<AnimationSampler>,
	pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
	Matrix(Mat4),
	Trs {
		translation: Vec3,
		rotation: Rotor3,
		scale: Vec3,
	},
}

impl Default for Transform {
	fn default() -> Self {
		Transform::Trs {
			translation: Vec3::zero(),
			rotation: Rotor3::identity(),
			scale: Vec3::one(),
		}
	}
}

impl Transform {
	/// The transform as a column-major matrix
	pub fn matrix(&self) -> Mat4 {
		match *self {
			Transform::Matrix(m) => m,
			Transform::Trs { translation, rotation, scale } => {
				let mut m = rotation.into_matrix().into_homogeneous();
				m.cols[0] *= scale.x;
				m.cols[1] *= scale.y;
				m.cols[2] *= scale.z;
				m.cols[3] = translation.into_homogeneous_point();
				m
			},
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
	pub mesh: Option<usize>,
	pub skin: Option<usize>,
	pub camera: Option<usize>,
	/// KHR_lights_punctual
	pub light: Option<usize>,
	pub children: Vec<usize>,
	pub transform: Transform,
	pub weights: Vec<f32>,
	pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub nodes: Vec<usize>,
	pub name: String,
}

/// Everything read from one document. Element arrays of categories that were not parsed
/// stay empty.
#[derive(Debug, Default)]
pub struct Asset {
	pub asset_info: Option<AssetInfo>,
	pub default_scene: Option<usize>,
	pub extensions_used: Vec<String>,
	pub extensions_required: Vec<String>,
	pub accessors: Vec<Accessor>,
	pub animations: Vec<Animation>,
	pub buffers: Vec<Buffer>,
	pub buffer_views: Vec<BufferView>,
	pub cameras: Vec<Camera>,
	pub images: Vec<Image>,
	pub lights: Vec<Light>,
	pub materials: Vec<Material>,
	pub meshes: Vec<Mesh>,
	pub nodes: Vec<Node>,
	pub samplers: Vec<Sampler>,
	pub scenes: Vec<Scene>,
	pub skins: Vec<Skin>,
	pub textures: Vec<Texture>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_data_source() {
		let source = DataSource::FilePath {
			path: PathBuf::from("Box.glb"),
			file_byte_offset: 1016,
			byte_length: Some(648),
			mime: MimeType::GltfBuffer,
		};
		assert_eq!(DataLocation::FilePathWithByteRange, source.location());
		assert_eq!(Some((1016, Some(648))), source.file_range());
		assert_eq!(MimeType::GltfBuffer, source.mime_type());
		assert_eq!(None, source.bytes());

		let source = DataSource::Vector { bytes: vec![1, 2], mime: MimeType::None };
		assert_eq!(DataLocation::VectorWithMime, source.location());
		assert_eq!(Some(&[1u8, 2][..]), source.bytes());
		assert_eq!(None, source.file_range());
	}

	#[test]
	fn test_transform_matrix() {
		assert_eq!(Mat4::identity(), Transform::default().matrix());

		let trs = Transform::Trs {
			translation: Vec3::new(1.0, 2.0, 3.0),
			rotation: Rotor3::identity(),
			scale: Vec3::new(2.0, 2.0, 2.0),
		};
		let m = trs.matrix();
		assert_eq!(Vec4::new(1.0, 2.0, 3.0, 1.0), m.cols[3]);
		assert_eq!(Vec4::new(2.0, 0.0, 0.0, 0.0), m.cols[0]);
	}

	#[test]
	fn test_defaults() {
		let material = Material::default();
		assert_eq!(Vec4::one(), material.pbr_data.base_color_factor);
		assert_eq!(0.5, material.alpha_cutoff);
		assert_eq!(1.0, material.emissive_strength);
		assert_eq!(PrimitiveType::Triangles, Primitive::default().kind);
		assert_eq!(Wrap::Repeat, Sampler::default().wrap_s);
	}
}
