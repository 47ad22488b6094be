use bitflags::bitflags;
use json::JsonValue;
use tracing::warn;

use ultraviolet::vec::{
	Vec2,
	Vec3
};

use crate::{
	error::{
		Error,
		Result
	},
	gltf2::{
		AttributeMap,
		TextureInfo
	}
};

bitflags! {
	/// Extensions the caller allows the parser to honour
	pub struct Extensions: u64 {
		const KHR_TEXTURE_TRANSFORM = 1 << 1;
		const KHR_TEXTURE_BASISU = 1 << 2;
		const MSFT_TEXTURE_DDS = 1 << 3;
		const KHR_MESH_QUANTIZATION = 1 << 4;
		const EXT_MESHOPT_COMPRESSION = 1 << 5;
		const KHR_LIGHTS_PUNCTUAL = 1 << 6;
		const KHR_DRACO_MESH_COMPRESSION = 1 << 7;
		const EXT_TEXTURE_WEBP = 1 << 8;
		const KHR_MATERIALS_SPECULAR = 1 << 9;
		const KHR_MATERIALS_IOR = 1 << 10;
		const KHR_MATERIALS_IRIDESCENCE = 1 << 11;
		const KHR_MATERIALS_VOLUME = 1 << 12;
		const KHR_MATERIALS_TRANSMISSION = 1 << 13;
		const KHR_MATERIALS_CLEARCOAT = 1 << 14;
		const KHR_MATERIALS_EMISSIVE_STRENGTH = 1 << 15;
		const KHR_MATERIALS_SHEEN = 1 << 16;
		const KHR_MATERIALS_UNLIT = 1 << 17;
	}
}

const NAMES: [(&str, Extensions); 17] = [
	("KHR_texture_transform", Extensions::KHR_TEXTURE_TRANSFORM),
	("KHR_texture_basisu", Extensions::KHR_TEXTURE_BASISU),
	("MSFT_texture_dds", Extensions::MSFT_TEXTURE_DDS),
	("KHR_mesh_quantization", Extensions::KHR_MESH_QUANTIZATION),
	("EXT_meshopt_compression", Extensions::EXT_MESHOPT_COMPRESSION),
	("KHR_lights_punctual", Extensions::KHR_LIGHTS_PUNCTUAL),
	("KHR_draco_mesh_compression", Extensions::KHR_DRACO_MESH_COMPRESSION),
	("EXT_texture_webp", Extensions::EXT_TEXTURE_WEBP),
	("KHR_materials_specular", Extensions::KHR_MATERIALS_SPECULAR),
	("KHR_materials_ior", Extensions::KHR_MATERIALS_IOR),
	("KHR_materials_iridescence", Extensions::KHR_MATERIALS_IRIDESCENCE),
	("KHR_materials_volume", Extensions::KHR_MATERIALS_VOLUME),
	("KHR_materials_transmission", Extensions::KHR_MATERIALS_TRANSMISSION),
	("KHR_materials_clearcoat", Extensions::KHR_MATERIALS_CLEARCOAT),
	("KHR_materials_emissive_strength", Extensions::KHR_MATERIALS_EMISSIVE_STRENGTH),
	("KHR_materials_sheen", Extensions::KHR_MATERIALS_SHEEN),
	("KHR_materials_unlit", Extensions::KHR_MATERIALS_UNLIT),
];

impl Extensions {
	/// Looks up the flag for an extension identifier as it appears in a document
	pub fn from_name(name: &str) -> Option<Extensions> {
		NAMES.iter().find(|(n, _)| *n == name).map(|(_, flag)| *flag)
	}

	/// Identifiers of every extension in this set
	pub fn names(self) -> impl Iterator<Item = &'static str> {
		NAMES.into_iter().filter(move |(_, flag)| self.contains(*flag)).map(|(n, _)| n)
	}
}

/// Rejects documents whose `extensionsRequired` list names an extension that is unknown, or
/// known but not enabled.
pub fn check_required(required: &JsonValue, enabled: Extensions) -> Result<()> {
	if required.is_null() {
		return Ok(());
	}
	if !required.is_array() {
		return Err(Error::InvalidGltf);
	}

	for ext in required.members() {
		let name = ext.as_str().ok_or(Error::InvalidGltf)?;

		match Extensions::from_name(name) {
			None => {
				warn!(extension = name, "required extension is not supported");
				return Err(Error::UnknownRequiredExtension);
			},
			Some(flag) if !enabled.contains(flag) => {
				warn!(extension = name, "required extension is not enabled");
				return Err(Error::MissingExtensions);
			},
			Some(_) => (),
		}
	}

	Ok(())
}

/// KHR_texture_transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureTransform {
	pub offset: Vec2,
	pub rotation: f32,
	pub scale: Vec2,
	pub tex_coord: Option<usize>,
}

impl Default for TextureTransform {
	fn default() -> Self {
		Self {
			offset: Vec2::zero(),
			rotation: 0.0,
			scale: Vec2::one(),
			tex_coord: None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MeshoptCompressionMode {
	Attributes,
	Triangles,
	Indices,
}

impl MeshoptCompressionMode {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"ATTRIBUTES" => Some(Self::Attributes),
			"TRIANGLES" => Some(Self::Triangles),
			"INDICES" => Some(Self::Indices),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MeshoptCompressionFilter {
	None,
	Octahedral,
	Quaternion,
	Exponential,
}

impl MeshoptCompressionFilter {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"NONE" => Some(Self::None),
			"OCTAHEDRAL" => Some(Self::Octahedral),
			"QUATERNION" => Some(Self::Quaternion),
			"EXPONENTIAL" => Some(Self::Exponential),
			_ => None,
		}
	}
}

/// EXT_meshopt_compression, attached to a buffer view
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MeshoptCompression {
	pub buffer: usize,
	pub byte_offset: usize,
	pub byte_length: usize,
	pub byte_stride: usize,
	pub count: usize,
	pub mode: MeshoptCompressionMode,
	pub filter: MeshoptCompressionFilter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LightType {
	Directional,
	Spot,
	Point,
}

impl LightType {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"directional" => Some(Self::Directional),
			"spot" => Some(Self::Spot),
			"point" => Some(Self::Point),
			_ => None,
		}
	}
}

/// KHR_lights_punctual
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
	pub kind: LightType,
	pub color: Vec3,
	pub intensity: f32,
	pub range: Option<f32>,
	pub inner_cone_angle: Option<f32>,
	pub outer_cone_angle: Option<f32>,
	pub name: String,
}

/// KHR_draco_mesh_compression, attached to a primitive. The attribute values are Draco
/// attribute ids, not accessor indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DracoCompression {
	pub buffer_view: usize,
	pub attributes: AttributeMap,
}

/// KHR_materials_specular
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialSpecular {
	pub specular_factor: f32,
	pub specular_texture: Option<TextureInfo>,
	pub specular_color_factor: Vec3,
	pub specular_color_texture: Option<TextureInfo>,
}

impl Default for MaterialSpecular {
	fn default() -> Self {
		Self {
			specular_factor: 1.0,
			specular_texture: None,
			specular_color_factor: Vec3::one(),
			specular_color_texture: None,
		}
	}
}

/// KHR_materials_iridescence
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialIridescence {
	pub iridescence_factor: f32,
	pub iridescence_texture: Option<TextureInfo>,
	pub iridescence_ior: f32,
	pub iridescence_thickness_minimum: f32,
	pub iridescence_thickness_maximum: f32,
	pub iridescence_thickness_texture: Option<TextureInfo>,
}

impl Default for MaterialIridescence {
	fn default() -> Self {
		Self {
			iridescence_factor: 0.0,
			iridescence_texture: None,
			iridescence_ior: 1.3,
			iridescence_thickness_minimum: 100.0,
			iridescence_thickness_maximum: 400.0,
			iridescence_thickness_texture: None,
		}
	}
}

/// KHR_materials_volume
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialVolume {
	pub thickness_factor: f32,
	pub thickness_texture: Option<TextureInfo>,
	/// Infinite when absent
	pub attenuation_distance: f32,
	pub attenuation_color: Vec3,
}

impl Default for MaterialVolume {
	fn default() -> Self {
		Self {
			thickness_factor: 0.0,
			thickness_texture: None,
			attenuation_distance: f32::INFINITY,
			attenuation_color: Vec3::one(),
		}
	}
}

/// KHR_materials_transmission
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialTransmission {
	pub transmission_factor: f32,
	pub transmission_texture: Option<TextureInfo>,
}

/// KHR_materials_clearcoat
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialClearcoat {
	pub clearcoat_factor: f32,
	pub clearcoat_texture: Option<TextureInfo>,
	pub clearcoat_roughness_factor: f32,
	pub clearcoat_roughness_texture: Option<TextureInfo>,
	pub clearcoat_normal_texture: Option<TextureInfo>,
}

/// KHR_materials_sheen
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialSheen {
	pub sheen_color_factor: Vec3,
	pub sheen_color_texture: Option<TextureInfo>,
	pub sheen_roughness_factor: f32,
	pub sheen_roughness_texture: Option<TextureInfo>,
}

impl Default for MaterialSheen {
	fn default() -> Self {
		Self {
			sheen_color_factor: Vec3::zero(),
			sheen_color_texture: None,
			sheen_roughness_factor: 0.0,
			sheen_roughness_texture: None,
		}
	}
}
