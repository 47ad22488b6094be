//! Readers for the individual glTF elements. Each takes one JSON object from a top-level
//! array and validates it against the schema's required fields and value sets.

use std::f32::consts::FRAC_PI_4;

use json::JsonValue;
use tracing::warn;

use ultraviolet::{
	mat::Mat4,
	rotor::Rotor3,
	vec::{
		Vec2,
		Vec3,
		Vec4
	}
};

use crate::{
	error::{
		Error,
		Result
	},
	extensions::*,
	gltf::*,
	gltf2::*,
	json_ext::JsonObjectExt,
	resolver::Resolver,
	Options
};

fn object(value: &JsonValue) -> Result<&JsonValue> {
	match value.is_object() {
		true => Ok(value),
		false => {
			warn!("element is not an object");
			Err(Error::InvalidGltf)
		},
	}
}

fn invalid(field: &str) -> Error {
	warn!(field, "value outside the allowed set");
	Error::InvalidGltf
}

/// Maps an optional enumerated field through `parse`, rejecting unknown values
fn enumerated<V, T, F>(value: Option<V>, field: &str, parse: F) -> Result<Option<T>>
where
	F: FnOnce(V) -> Option<T>,
{
	value.map(|v| parse(v).ok_or_else(|| invalid(field))).transpose()
}

fn vec3(v: Option<[f32; 3]>, default: Vec3) -> Vec3 {
	v.map_or(default, |[x, y, z]| Vec3::new(x, y, z))
}

fn mat4(m: [f32; 16]) -> Mat4 {
	let col = |i: usize| Vec4::new(m[i * 4], m[i * 4 + 1], m[i * 4 + 2], m[i * 4 + 3]);
	Mat4::new(col(0), col(1), col(2), col(3))
}

/// Reads the `asset` object. Fails with [`Error::InvalidOrMissingAssetField`] when it or its
/// version is missing.
pub fn asset_info(value: &JsonValue) -> Result<AssetInfo> {
	let info = (|| -> Result<AssetInfo> {
		let obj = object(value)?;
		Ok(AssetInfo {
			version: obj.required_str("version")?.to_string(),
			min_version: obj.optional_str("minVersion")?.map(str::to_string),
			generator: obj.optional_str("generator")?.map(str::to_string),
			copyright: obj.optional_str("copyright")?.map(str::to_string),
		})
	})();

	info.map_err(|_| Error::InvalidOrMissingAssetField)
}

fn major_minor(version: &str) -> Result<(u32, u32)> {
	let parsed = version.split_once('.').and_then(|(major, minor)| {
		Some((major.parse().ok()?, minor.parse().ok()?))
	});

	parsed.ok_or_else(|| {
		warn!(version, "malformed version string");
		Error::InvalidOrMissingAssetField
	})
}

/// Only glTF 2.x documents that don't require a newer minor version are accepted
pub fn check_version(info: &AssetInfo) -> Result<()> {
	let (major, _) = major_minor(&info.version)?;
	if major != 2 {
		warn!(version = info.version.as_str(), "unsupported glTF version");
		return Err(Error::UnsupportedVersion);
	}

	if let Some(min_version) = &info.min_version {
		if major_minor(min_version)? > (2, 0) {
			warn!(min_version = min_version.as_str(), "document requires a newer glTF version");
			return Err(Error::UnsupportedVersion);
		}
	}

	Ok(())
}

pub fn buffer(value: &JsonValue, index: usize, resolver: &mut Resolver) -> Result<Buffer> {
	let obj = object(value)?;
	let byte_length = obj.required_usize("byteLength")?;

	Ok(Buffer {
		byte_length,
		data: resolver.buffer(index, obj.optional_str("uri")?, byte_length)?,
		name: obj.name()?,
	})
}

fn meshopt_compression(ext: &JsonValue) -> Result<MeshoptCompression> {
	let mode = ext.required_str("mode")?;

	Ok(MeshoptCompression {
		buffer: ext.required_usize("buffer")?,
		byte_offset: ext.optional_usize("byteOffset")?.unwrap_or(0),
		byte_length: ext.required_usize("byteLength")?,
		byte_stride: ext.required_usize("byteStride")?,
		count: ext.required_usize("count")?,
		mode: MeshoptCompressionMode::from_name(mode).ok_or_else(|| invalid("mode"))?,
		filter: enumerated(ext.optional_str("filter")?, "filter", MeshoptCompressionFilter::from_name)?
			.unwrap_or(MeshoptCompressionFilter::None),
	})
}

pub fn buffer_view(value: &JsonValue, extensions: Extensions) -> Result<BufferView> {
	let obj = object(value)?;

	let byte_stride = obj.optional_usize("byteStride")?;
	if let Some(stride) = byte_stride {
		if !(4..=252).contains(&stride) || stride % 4 != 0 {
			return Err(invalid("byteStride"));
		}
	}

	let meshopt_compression = match extensions.contains(Extensions::EXT_MESHOPT_COMPRESSION) {
		true => obj.extension("EXT_meshopt_compression").map(meshopt_compression).transpose()?,
		false => None,
	};

	Ok(BufferView {
		buffer: obj.required_usize("buffer")?,
		byte_offset: obj.optional_usize("byteOffset")?.unwrap_or(0),
		byte_length: obj.required_usize("byteLength")?,
		byte_stride,
		target: enumerated(obj.optional_u64("target")?, "target", BufferTarget::from_gl)?,
		meshopt_compression,
		name: obj.name()?,
	})
}

fn sparse_accessor(obj: &JsonValue) -> Result<SparseAccessor> {
	let indices = obj.required_object("indices")?;
	let values = obj.required_object("values")?;

	let indices_component_type = ComponentType::from_gl(indices.required_u64("componentType")?, false)
		.filter(|c| c.is_index())
		.ok_or_else(|| invalid("componentType"))?;

	Ok(SparseAccessor {
		count: obj.required_usize("count")?,
		indices_buffer_view: indices.required_usize("bufferView")?,
		indices_byte_offset: indices.optional_usize("byteOffset")?.unwrap_or(0),
		indices_component_type,
		values_buffer_view: values.required_usize("bufferView")?,
		values_byte_offset: values.optional_usize("byteOffset")?.unwrap_or(0),
	})
}

pub fn accessor(value: &JsonValue, options: Options) -> Result<Accessor> {
	let obj = object(value)?;
	let allow_double = options.contains(Options::ALLOW_DOUBLE);

	let component_type = ComponentType::from_gl(obj.required_u64("componentType")?, allow_double)
		.ok_or_else(|| invalid("componentType"))?;
	let kind = AccessorType::from_name(obj.required_str("type")?).ok_or_else(|| invalid("type"))?;

	Ok(Accessor {
		byte_offset: obj.optional_usize("byteOffset")?.unwrap_or(0),
		count: obj.required_usize("count")?,
		kind,
		component_type,
		normalized: obj.optional_bool("normalized")?.unwrap_or(false),
		buffer_view: obj.optional_usize("bufferView")?,
		min: obj.array("min", JsonValue::as_f64)?,
		max: obj.array("max", JsonValue::as_f64)?,
		sparse: obj.optional_object("sparse")?.map(sparse_accessor).transpose()?,
		name: obj.name()?,
	})
}

pub fn image(value: &JsonValue, resolver: &mut Resolver) -> Result<Image> {
	let obj = object(value)?;
	let uri = obj.optional_str("uri")?;
	let buffer_view = obj.optional_usize("bufferView")?;

	let mime = match buffer_view {
		Some(_) => Some(obj.required_str("mimeType")?),
		None => obj.optional_str("mimeType")?,
	};

	Ok(Image {
		data: resolver.image(uri, buffer_view, mime.map_or(MimeType::None, MimeType::parse))?,
		name: obj.name()?,
	})
}

pub fn sampler(value: &JsonValue) -> Result<Sampler> {
	let obj = object(value)?;

	let mag_filter = enumerated(obj.optional_u64("magFilter")?, "magFilter", |f| {
		Filter::from_gl(f).filter(|f| f.is_mag_filter())
	})?;

	Ok(Sampler {
		mag_filter,
		min_filter: enumerated(obj.optional_u64("minFilter")?, "minFilter", Filter::from_gl)?,
		wrap_s: enumerated(obj.optional_u64("wrapS")?, "wrapS", Wrap::from_gl)?.unwrap_or_default(),
		wrap_t: enumerated(obj.optional_u64("wrapT")?, "wrapT", Wrap::from_gl)?.unwrap_or_default(),
		name: obj.name()?,
	})
}

/// Extensions that replace a texture's image with another format
const IMAGE_EXTENSIONS: [(Extensions, &str); 3] = [
	(Extensions::KHR_TEXTURE_BASISU, "KHR_texture_basisu"),
	(Extensions::MSFT_TEXTURE_DDS, "MSFT_texture_dds"),
	(Extensions::EXT_TEXTURE_WEBP, "EXT_texture_webp"),
];

pub fn texture(value: &JsonValue, extensions: Extensions) -> Result<Texture> {
	let obj = object(value)?;
	let source = obj.optional_usize("source")?;

	let ext_source = IMAGE_EXTENSIONS.into_iter()
		.filter(|(flag, _)| extensions.contains(*flag))
		.find_map(|(_, name)| obj.extension(name))
		.map(|ext| ext.optional_usize("source"))
		.transpose()?
		.flatten();

	let (image, fallback_image) = match ext_source {
		Some(image) => (Some(image), source),
		None => (source, None),
	};

	Ok(Texture {
		image,
		fallback_image,
		sampler: obj.optional_usize("sampler")?,
		name: obj.name()?,
	})
}

fn texture_transform(ext: &JsonValue) -> Result<TextureTransform> {
	let vec2 = |v: Option<[f32; 2]>, default: Vec2| v.map_or(default, |[x, y]| Vec2::new(x, y));

	Ok(TextureTransform {
		offset: vec2(ext.optional_f32_array::<2>("offset")?, Vec2::zero()),
		rotation: ext.optional_f32("rotation")?.unwrap_or(0.0),
		scale: vec2(ext.optional_f32_array::<2>("scale")?, Vec2::one()),
		tex_coord: ext.optional_usize("texCoord")?,
	})
}

/// `scale_key` names the factor stored in [`TextureInfo::scale`] (`scale` for normal maps,
/// `strength` for occlusion maps)
fn texture_info(obj: &JsonValue, key: &str, extensions: Extensions, scale_key: Option<&str>)
	-> Result<Option<TextureInfo>>
{
	let info = match obj.optional_object(key)? {
		Some(info) => info,
		None => return Ok(None),
	};

	let scale = match scale_key {
		Some(scale_key) => info.optional_f32(scale_key)?.unwrap_or(1.0),
		None => 1.0,
	};

	let transform = match extensions.contains(Extensions::KHR_TEXTURE_TRANSFORM) {
		true => info.extension("KHR_texture_transform").map(texture_transform).transpose()?,
		false => None,
	};

	Ok(Some(TextureInfo {
		texture: info.required_usize("index")?,
		tex_coord: info.optional_usize("texCoord")?.unwrap_or(0),
		scale,
		transform,
	}))
}

/// The object of extension `flag` on `obj`, if the caller enabled it
fn enabled_extension<'a>(obj: &'a JsonValue, extensions: Extensions, flag: Extensions) -> Option<&'a JsonValue> {
	match extensions.contains(flag) {
		true => flag.names().next().and_then(|name| obj.extension(name)),
		false => None,
	}
}

fn specular(ext: &JsonValue, extensions: Extensions) -> Result<MaterialSpecular> {
	Ok(MaterialSpecular {
		specular_factor: ext.optional_f32("specularFactor")?.unwrap_or(1.0),
		specular_texture: texture_info(ext, "specularTexture", extensions, None)?,
		specular_color_factor: vec3(ext.optional_f32_array::<3>("specularColorFactor")?, Vec3::one()),
		specular_color_texture: texture_info(ext, "specularColorTexture", extensions, None)?,
	})
}

fn iridescence(ext: &JsonValue, extensions: Extensions) -> Result<MaterialIridescence> {
	Ok(MaterialIridescence {
		iridescence_factor: ext.optional_f32("iridescenceFactor")?.unwrap_or(0.0),
		iridescence_texture: texture_info(ext, "iridescenceTexture", extensions, None)?,
		iridescence_ior: ext.optional_f32("iridescenceIor")?.unwrap_or(1.3),
		iridescence_thickness_minimum: ext.optional_f32("iridescenceThicknessMinimum")?.unwrap_or(100.0),
		iridescence_thickness_maximum: ext.optional_f32("iridescenceThicknessMaximum")?.unwrap_or(400.0),
		iridescence_thickness_texture: texture_info(ext, "iridescenceThicknessTexture", extensions, None)?,
	})
}

fn volume(ext: &JsonValue, extensions: Extensions) -> Result<MaterialVolume> {
	Ok(MaterialVolume {
		thickness_factor: ext.optional_f32("thicknessFactor")?.unwrap_or(0.0),
		thickness_texture: texture_info(ext, "thicknessTexture", extensions, None)?,
		attenuation_distance: ext.optional_f32("attenuationDistance")?.unwrap_or(f32::INFINITY),
		attenuation_color: vec3(ext.optional_f32_array::<3>("attenuationColor")?, Vec3::one()),
	})
}

fn transmission(ext: &JsonValue, extensions: Extensions) -> Result<MaterialTransmission> {
	Ok(MaterialTransmission {
		transmission_factor: ext.optional_f32("transmissionFactor")?.unwrap_or(0.0),
		transmission_texture: texture_info(ext, "transmissionTexture", extensions, None)?,
	})
}

fn clearcoat(ext: &JsonValue, extensions: Extensions) -> Result<MaterialClearcoat> {
	Ok(MaterialClearcoat {
		clearcoat_factor: ext.optional_f32("clearcoatFactor")?.unwrap_or(0.0),
		clearcoat_texture: texture_info(ext, "clearcoatTexture", extensions, None)?,
		clearcoat_roughness_factor: ext.optional_f32("clearcoatRoughnessFactor")?.unwrap_or(0.0),
		clearcoat_roughness_texture: texture_info(ext, "clearcoatRoughnessTexture", extensions, None)?,
		clearcoat_normal_texture: texture_info(ext, "clearcoatNormalTexture", extensions, Some("scale"))?,
	})
}

fn sheen(ext: &JsonValue, extensions: Extensions) -> Result<MaterialSheen> {
	Ok(MaterialSheen {
		sheen_color_factor: vec3(ext.optional_f32_array::<3>("sheenColorFactor")?, Vec3::zero()),
		sheen_color_texture: texture_info(ext, "sheenColorTexture", extensions, None)?,
		sheen_roughness_factor: ext.optional_f32("sheenRoughnessFactor")?.unwrap_or(0.0),
		sheen_roughness_texture: texture_info(ext, "sheenRoughnessTexture", extensions, None)?,
	})
}

pub fn material(value: &JsonValue, extensions: Extensions) -> Result<Material> {
	let obj = object(value)?;
	let mut material = Material::default();

	if let Some(pbr) = obj.optional_object("pbrMetallicRoughness")? {
		let data = &mut material.pbr_data;

		if let Some([r, g, b, a]) = pbr.optional_f32_array::<4>("baseColorFactor")? {
			data.base_color_factor = Vec4::new(r, g, b, a);
		}
		data.metallic_factor = pbr.optional_f32("metallicFactor")?.unwrap_or(1.0);
		data.roughness_factor = pbr.optional_f32("roughnessFactor")?.unwrap_or(1.0);
		data.base_color_texture = texture_info(pbr, "baseColorTexture", extensions, None)?;
		data.metallic_roughness_texture = texture_info(pbr, "metallicRoughnessTexture", extensions, None)?;
	}

	material.normal_texture = texture_info(obj, "normalTexture", extensions, Some("scale"))?;
	material.occlusion_texture = texture_info(obj, "occlusionTexture", extensions, Some("strength"))?;
	material.emissive_texture = texture_info(obj, "emissiveTexture", extensions, None)?;
	material.emissive_factor = vec3(obj.optional_f32_array::<3>("emissiveFactor")?, Vec3::zero());
	material.alpha_mode = enumerated(obj.optional_str("alphaMode")?, "alphaMode", AlphaMode::from_name)?
		.unwrap_or_default();
	material.alpha_cutoff = obj.optional_f32("alphaCutoff")?.unwrap_or(0.5);
	material.double_sided = obj.optional_bool("doubleSided")?.unwrap_or(false);

	if extensions.contains(Extensions::KHR_MATERIALS_EMISSIVE_STRENGTH) {
		if let Some(ext) = obj.extension("KHR_materials_emissive_strength") {
			material.emissive_strength = ext.optional_f32("emissiveStrength")?.unwrap_or(1.0);
		}
	}
	material.unlit = extensions.contains(Extensions::KHR_MATERIALS_UNLIT) &&
		obj.extension("KHR_materials_unlit").is_some();

	if let Some(ext) = enabled_extension(obj, extensions, Extensions::KHR_MATERIALS_IOR) {
		material.ior = ext.optional_f32("ior")?.unwrap_or(1.5);
	}
	material.specular = enabled_extension(obj, extensions, Extensions::KHR_MATERIALS_SPECULAR)
		.map(|ext| specular(ext, extensions))
		.transpose()?;
	material.iridescence = enabled_extension(obj, extensions, Extensions::KHR_MATERIALS_IRIDESCENCE)
		.map(|ext| iridescence(ext, extensions))
		.transpose()?;
	material.volume = enabled_extension(obj, extensions, Extensions::KHR_MATERIALS_VOLUME)
		.map(|ext| volume(ext, extensions))
		.transpose()?;
	material.transmission = enabled_extension(obj, extensions, Extensions::KHR_MATERIALS_TRANSMISSION)
		.map(|ext| transmission(ext, extensions))
		.transpose()?;
	material.clearcoat = enabled_extension(obj, extensions, Extensions::KHR_MATERIALS_CLEARCOAT)
		.map(|ext| clearcoat(ext, extensions))
		.transpose()?;
	material.sheen = enabled_extension(obj, extensions, Extensions::KHR_MATERIALS_SHEEN)
		.map(|ext| sheen(ext, extensions))
		.transpose()?;

	material.name = obj.name()?;
	Ok(material)
}

pub fn camera(value: &JsonValue) -> Result<Camera> {
	let obj = object(value)?;

	let kind = match obj.required_str("type")? {
		"perspective" => {
			let p = obj.required_object("perspective")?;
			CameraKind::Perspective {
				aspect_ratio: p.optional_f32("aspectRatio")?,
				yfov: p.required_f32("yfov")?,
				zfar: p.optional_f32("zfar")?,
				znear: p.required_f32("znear")?,
			}
		},
		"orthographic" => {
			let o = obj.required_object("orthographic")?;
			CameraKind::Orthographic {
				xmag: o.required_f32("xmag")?,
				ymag: o.required_f32("ymag")?,
				zfar: o.required_f32("zfar")?,
				znear: o.required_f32("znear")?,
			}
		},
		_ => return Err(invalid("type")),
	};

	Ok(Camera {
		kind,
		name: obj.name()?,
	})
}

fn attribute_map(value: &JsonValue) -> Result<AttributeMap> {
	object(value)?.entries()
		.map(|(name, index)| match index.as_usize() {
			Some(index) => Ok((name.to_string(), index)),
			None => Err(invalid(name)),
		})
		.collect()
}

fn draco_compression(ext: &JsonValue) -> Result<DracoCompression> {
	Ok(DracoCompression {
		buffer_view: ext.required_usize("bufferView")?,
		attributes: attribute_map(ext.required_object("attributes")?)?,
	})
}

fn primitive(obj: &JsonValue, extensions: Extensions) -> Result<Primitive> {
	Ok(Primitive {
		attributes: attribute_map(obj.required_object("attributes")?)?,
		kind: enumerated(obj.optional_u64("mode")?, "mode", PrimitiveType::from_mode)?.unwrap_or_default(),
		indices: obj.optional_usize("indices")?,
		material: obj.optional_usize("material")?,
		targets: obj.objects("targets")?.into_iter().map(attribute_map).collect::<Result<_>>()?,
		draco_compression: enabled_extension(obj, extensions, Extensions::KHR_DRACO_MESH_COMPRESSION)
			.map(draco_compression)
			.transpose()?,
	})
}

pub fn mesh(value: &JsonValue, extensions: Extensions) -> Result<Mesh> {
	let obj = object(value)?;
	let primitives = obj.required_array("primitives", |v| v.is_object().then(|| v))?;

	Ok(Mesh {
		primitives: primitives.into_iter().map(|p| primitive(p, extensions)).collect::<Result<_>>()?,
		weights: obj.array("weights", JsonValue::as_f32)?,
		name: obj.name()?,
	})
}

pub fn skin(value: &JsonValue) -> Result<Skin> {
	let obj = object(value)?;

	Ok(Skin {
		joints: obj.required_array("joints", JsonValue::as_usize)?,
		skeleton: obj.optional_usize("skeleton")?,
		inverse_bind_matrices: obj.optional_usize("inverseBindMatrices")?,
		name: obj.name()?,
	})
}

fn animation_channel(obj: &JsonValue) -> Result<AnimationChannel> {
	let target = obj.required_object("target")?;
	let path = target.required_str("path")?;

	Ok(AnimationChannel {
		sampler: obj.required_usize("sampler")?,
		node: target.optional_usize("node")?,
		path: AnimationPath::from_name(path).ok_or_else(|| invalid("path"))?,
	})
}

fn animation_sampler(obj: &JsonValue) -> Result<AnimationSampler> {
	let interpolation = obj.optional_str("interpolation")?;

	Ok(AnimationSampler {
		input: obj.required_usize("input")?,
		output: obj.required_usize("output")?,
		interpolation: enumerated(interpolation, "interpolation", AnimationInterpolation::from_name)?
			.unwrap_or_default(),
	})
}

pub fn animation(value: &JsonValue) -> Result<Animation> {
	let obj = object(value)?;
	let channels = obj.required_array("channels", |v| v.is_object().then(|| v))?;
	let samplers = obj.required_array("samplers", |v| v.is_object().then(|| v))?;

	Ok(Animation {
		channels: channels.into_iter().map(animation_channel).collect::<Result<_>>()?,
		samplers: samplers.into_iter().map(animation_sampler).collect::<Result<_>>()?,
		name: obj.name()?,
	})
}

pub fn node(value: &JsonValue, extensions: Extensions) -> Result<Node> {
	let obj = object(value)?;

	let transform = match obj.optional_f32_array::<16>("matrix")? {
		Some(m) => Transform::Matrix(mat4(m)),
		None => Transform::Trs {
			translation: vec3(obj.optional_f32_array::<3>("translation")?, Vec3::zero()),
			rotation: obj.optional_f32_array::<4>("rotation")?
				.map_or(Rotor3::identity(), Rotor3::from_quaternion_array),
			scale: vec3(obj.optional_f32_array::<3>("scale")?, Vec3::one()),
		},
	};

	let light = match extensions.contains(Extensions::KHR_LIGHTS_PUNCTUAL) {
		true => obj.extension("KHR_lights_punctual").map(|ext| ext.required_usize("light")).transpose()?,
		false => None,
	};

	Ok(Node {
		mesh: obj.optional_usize("mesh")?,
		skin: obj.optional_usize("skin")?,
		camera: obj.optional_usize("camera")?,
		light,
		children: obj.array("children", JsonValue::as_usize)?,
		transform,
		weights: obj.array("weights", JsonValue::as_f32)?,
		name: obj.name()?,
	})
}

pub fn scene(value: &JsonValue) -> Result<Scene> {
	let obj = object(value)?;

	Ok(Scene {
		nodes: obj.array("nodes", JsonValue::as_usize)?,
		name: obj.name()?,
	})
}

pub fn light(value: &JsonValue) -> Result<Light> {
	let obj = object(value)?;
	let kind = LightType::from_name(obj.required_str("type")?).ok_or_else(|| invalid("type"))?;

	let (inner_cone_angle, outer_cone_angle) = match kind {
		LightType::Spot => {
			let spot = obj.required_object("spot")?;
			(Some(spot.optional_f32("innerConeAngle")?.unwrap_or(0.0)),
				Some(spot.optional_f32("outerConeAngle")?.unwrap_or(FRAC_PI_4)))
		},
		_ => (None, None),
	};

	Ok(Light {
		kind,
		color: vec3(obj.optional_f32_array::<3>("color")?, Vec3::one()),
		intensity: obj.optional_f32("intensity")?.unwrap_or(1.0),
		range: obj.optional_f32("range")?,
		inner_cone_angle,
		outer_cone_angle,
		name: obj.name()?,
	})
}
