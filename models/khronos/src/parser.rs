//! Loading and parsing of glTF documents.
//!
//! Loading ([`Parser::load_gltf`] and friends) reads the JSON, validates the `asset` field and
//! checks `extensionsRequired`. It yields a [`Gltf`] session, which parses the requested
//! [`Category`] set in dependency order. The first error a session hits is kept: later calls
//! return it again and no asset is handed out.

use std::{
	fs::{
		File,
		self
	},
	io::BufReader,
	mem,
	path::{
		Path,
		PathBuf
	}
};

use json::JsonValue;
use tracing::{
	debug,
	trace,
	warn
};

use crate::{
	category::{
		Category,
		Section
	},
	error::{
		Error,
		Result
	},
	extensions::{
		check_required,
		Extensions
	},
	glb::{
		import::container,
		EmbeddedBinaryChunk
	},
	gltf2::Asset,
	json_ext::JsonObjectExt,
	memory::BufferAllocator,
	resolver::Resolver,
	sections,
	Options
};

/// The text of a JSON document
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JsonData {
	text: String,
}

impl JsonData {
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let text = std::str::from_utf8(bytes).map_err(|e| {
			warn!(error = %e, "document is not UTF-8");
			Error::InvalidJson
		})?;

		Ok(Self {
			text: text.trim_start_matches('\u{feff}').to_string(),
		})
	}

	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let bytes = fs::read(path).map_err(|e| {
			warn!(path = %path.display(), error = %e, "cannot read document");
			Error::InvalidPath
		})?;

		Self::from_bytes(&bytes)
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}
}

struct GlbSource {
	path: PathBuf,
	binary: Option<EmbeddedBinaryChunk>,
}

/// A document that passed the load-time checks
struct Document {
	root: JsonValue,
	directory: PathBuf,
	options: Options,
	glb: Option<GlbSource>,
}

impl Document {
	fn open(text: &str, directory: PathBuf, options: Options, extensions: Extensions, glb: Option<GlbSource>)
		-> Result<Self>
	{
		let root = json::parse(text).map_err(|e| {
			warn!(error = %e, "invalid JSON");
			Error::InvalidJson
		})?;
		if !root.is_object() {
			warn!("document root is not an object");
			return Err(Error::InvalidGltf);
		}

		if !options.contains(Options::DONT_REQUIRE_VALID_ASSET_MEMBER) {
			let info = sections::asset_info(&root["asset"])?;
			sections::check_version(&info)?;
		}

		check_required(&root["extensionsRequired"], extensions)?;

		Ok(Self {
			root,
			directory,
			options,
			glb,
		})
	}
}

fn directory_of(path: &Path) -> PathBuf {
	path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Reads every element of the top-level array `key`. A missing array is empty.
fn elements<T, F>(root: &JsonValue, key: &str, mut element: F) -> Result<Vec<T>>
where
	F: FnMut(usize, &JsonValue) -> Result<T>,
{
	match root.field(key) {
		Some(array) if array.is_array() => array.members()
			.enumerate()
			.map(|(i, value)| {
				trace!(key, index = i, "parsing element");
				element(i, value)
			})
			.collect(),
		Some(_) => {
			warn!(key, "expected an array");
			Err(Error::InvalidGltf)
		},
		None => Ok(vec![]),
	}
}

/// Loads documents. Holds the enabled extensions and the buffer allocator, which every
/// session created by this parser uses.
pub struct Parser {
	extensions: Extensions,
	allocator: Option<Box<dyn BufferAllocator>>,
	user_context: u64,
	error: Option<Error>,
}

impl Default for Parser {
	fn default() -> Self {
		Self::new(Extensions::empty())
	}
}

impl Parser {
	pub fn new(extensions: Extensions) -> Self {
		Self {
			extensions,
			allocator: None,
			user_context: 0,
			error: None,
		}
	}

	pub fn extensions(&self) -> Extensions {
		self.extensions
	}

	/// Routes eagerly loaded buffer bytes into memory provided by `allocator`
	pub fn set_buffer_allocator<A>(&mut self, allocator: A)
	where
		A: BufferAllocator + 'static,
	{
		self.allocator = Some(Box::new(allocator));
	}

	/// Value passed to the allocator with every request
	pub fn set_user_context(&mut self, user_context: u64) {
		self.user_context = user_context;
	}

	/// The error of the most recent load, if it failed
	pub fn error(&self) -> Option<Error> {
		self.error
	}

	fn session(&mut self, document: Result<Document>) -> Result<Gltf<'_>> {
		match document {
			Ok(document) => {
				self.error = None;
				Ok(Gltf {
					parser: self,
					document,
					state: State::Unparsed,
					error: None,
				})
			},
			Err(e) => {
				self.error = Some(e);
				Err(e)
			},
		}
	}

	/// Loads a document from memory. Relative URIs resolve against `directory`.
	pub fn load_gltf<P: AsRef<Path>>(&mut self, json: &JsonData, directory: P, options: Options)
		-> Result<Gltf<'_>>
	{
		let document = Document::open(json.as_str(), directory.as_ref().to_path_buf(), options,
			self.extensions, None);
		self.session(document)
	}

	pub fn load_gltf_file<P: AsRef<Path>>(&mut self, path: P, options: Options) -> Result<Gltf<'_>> {
		let path = path.as_ref();
		debug!(path = %path.display(), "loading glTF");

		let document = JsonData::from_file(path).and_then(|json| {
			Document::open(json.as_str(), directory_of(path), options, self.extensions, None)
		});
		self.session(document)
	}

	/// Loads a GLB container. Its binary chunk is only read when
	/// [`Options::LOAD_GLB_BUFFERS`] is set.
	pub fn load_binary_gltf<P: AsRef<Path>>(&mut self, path: P, options: Options) -> Result<Gltf<'_>> {
		let path = path.as_ref();
		debug!(path = %path.display(), "loading GLB");

		let extensions = self.extensions;
		let document = (|| -> Result<Document> {
			let file = File::open(path).map_err(|e| {
				warn!(path = %path.display(), error = %e, "cannot open container");
				Error::InvalidPath
			})?;

			let glb = container(&mut BufReader::new(file), options.contains(Options::LOAD_GLB_BUFFERS))?;
			let json = JsonData::from_bytes(&glb.json)?;
			let source = GlbSource {
				path: path.to_path_buf(),
				binary: glb.binary,
			};

			Document::open(json.as_str(), directory_of(path), options, extensions, Some(source))
		})();
		self.session(document)
	}
}

enum State {
	Unparsed,
	Parsed(Asset),
	Retrieved,
}

/// One loaded document
pub struct Gltf<'p> {
	parser: &'p mut Parser,
	document: Document,
	state: State,
	error: Option<Error>,
}

impl<'p> Gltf<'p> {
	pub fn options(&self) -> Options {
		self.document.options
	}

	/// The error that stopped this session, if any
	pub fn error(&self) -> Option<Error> {
		self.error
	}

	pub fn is_parsed(&self) -> bool {
		matches!(self.state, State::Parsed(_))
	}

	/// Parses exactly the sections selected in `categories`. The named flags already carry
	/// their dependencies; a hand-built set can be completed with [`Category::closure`].
	/// Only the first successful call does any work.
	pub fn parse(&mut self, categories: Category) -> Result<()> {
		if let Some(error) = self.error {
			return Err(error);
		}

		if !matches!(self.state, State::Unparsed) {
			debug!("document already parsed");
			return Ok(());
		}

		match self.parse_asset(categories) {
			Ok(asset) => {
				self.state = State::Parsed(asset);
				Ok(())
			},
			Err(e) => {
				warn!(error = %e, "parsing failed");
				self.error = Some(e);
				Err(e)
			},
		}
	}

	/// Hands out the parsed asset. Returns `None` before a successful parse and after the
	/// asset was taken.
	pub fn take_asset(&mut self) -> Option<Asset> {
		match mem::replace(&mut self.state, State::Retrieved) {
			State::Parsed(asset) => Some(asset),
			State::Unparsed => {
				self.state = State::Unparsed;
				None
			},
			State::Retrieved => None,
		}
	}

	fn parse_asset(&mut self, selected: Category) -> Result<Asset> {
		let Document { root, directory, options, glb } = &self.document;
		let options = *options;
		let extensions = self.parser.extensions;
		let user_context = self.parser.user_context;

		let mut resolver = Resolver::new(directory, options)
			.with_allocator(self.parser.allocator.as_deref_mut(), user_context);
		if let Some(glb) = glb {
			resolver = resolver.with_glb(&glb.path, glb.binary.as_ref());
		}

		let mut asset = Asset::default();

		if selected.includes(Section::Asset) && root.has_key("asset") {
			let info = sections::asset_info(&root["asset"]);
			asset.asset_info = match options.contains(Options::DONT_REQUIRE_VALID_ASSET_MEMBER) {
				true => info.ok(),
				false => Some(info?),
			};
		}
		asset.default_scene = root.optional_usize("scene")?;
		asset.extensions_used = root.array("extensionsUsed", |v| v.as_str().map(str::to_string))?;
		asset.extensions_required = root.array("extensionsRequired", |v| v.as_str().map(str::to_string))?;

		for section in selected.sections() {
			debug!(?section, "parsing section");
			let key = section.key();

			match section {
				Section::Buffers => {
					asset.buffers = elements(root, key, |i, v| sections::buffer(v, i, &mut resolver))?;
				},
				Section::BufferViews => {
					asset.buffer_views = elements(root, key, |_, v| sections::buffer_view(v, extensions))?;
				},
				Section::Accessors => {
					asset.accessors = elements(root, key, |_, v| sections::accessor(v, options))?;
				},
				Section::Images => {
					asset.images = elements(root, key, |_, v| sections::image(v, &mut resolver))?;
				},
				Section::Samplers => asset.samplers = elements(root, key, |_, v| sections::sampler(v))?,
				Section::Textures => {
					asset.textures = elements(root, key, |_, v| sections::texture(v, extensions))?;
				},
				Section::Materials => {
					asset.materials = elements(root, key, |_, v| sections::material(v, extensions))?;
				},
				Section::Cameras => asset.cameras = elements(root, key, |_, v| sections::camera(v))?,
				Section::Meshes => {
					asset.meshes = elements(root, key, |_, v| sections::mesh(v, extensions))?;
				},
				Section::Skins => asset.skins = elements(root, key, |_, v| sections::skin(v))?,
				Section::Animations => asset.animations = elements(root, key, |_, v| sections::animation(v))?,
				Section::Nodes => {
					asset.nodes = elements(root, key, |_, v| sections::node(v, extensions))?;

					// Lights are only referenced from nodes
					if extensions.contains(Extensions::KHR_LIGHTS_PUNCTUAL) {
						if let Some(lights) = root.extension("KHR_lights_punctual") {
							asset.lights = elements(lights, "lights", |_, v| sections::light(v))?;
						}
					}
				},
				Section::Scenes => asset.scenes = elements(root, key, |_, v| sections::scene(v))?,
				Section::Asset => (),
			}
		}

		debug!(buffers = asset.buffers.len(), meshes = asset.meshes.len(), nodes = asset.nodes.len(),
			"parsed asset");
		Ok(asset)
	}
}

#[cfg(test)]
mod tests {
	use std::{
		cell::RefCell,
		rc::Rc
	};

	use tempfile::{
		tempdir,
		TempDir
	};

	use crate::{
		glb::test_util::{
			align_up,
			build
		},
		gltf::MimeType,
		gltf2::{
			DataLocation,
			DataSource
		},
		memory::{
			BufferMemoryHandle,
			BufferMemoryRequest,
			VecAllocator
		}
	};

	use super::*;

	const BOX: &str = r#"{
		"asset": {"version": "2.0", "generator": "qgltf tests"},
		"scene": 0,
		"scenes": [{"nodes": [0]}],
		"nodes": [{"mesh": 0, "camera": 0, "skin": 0, "name": "root"}],
		"cameras": [{"type": "perspective", "perspective": {"yfov": 0.5, "znear": 0.5}}],
		"meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "indices": 1, "material": 0}]}],
		"materials": [{"pbrMetallicRoughness": {"baseColorTexture": {"index": 0}}}],
		"textures": [{"source": 0, "sampler": 0}],
		"images": [{"bufferView": 2, "mimeType": "image/png"}],
		"samplers": [{}],
		"accessors": [
			{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
			{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
		],
		"bufferViews": [
			{"buffer": 0, "byteLength": 36},
			{"buffer": 0, "byteOffset": 36, "byteLength": 6},
			{"buffer": 0, "byteOffset": 44, "byteLength": 4}
		],
		"buffers": [{"byteLength": 48}],
		"skins": [{"joints": [0]}],
		"animations": [{
			"channels": [{"sampler": 0, "target": {"node": 0, "path": "translation"}}],
			"samplers": [{"input": 0, "output": 0}]
		}]
	}"#;

	fn bin() -> Vec<u8> {
		(0..48).collect()
	}

	fn write_glb(dir: &TempDir, json: &str) -> PathBuf {
		let path = dir.path().join("Box.glb");
		fs::write(&path, build(json, Some(&bin()))).unwrap();
		path
	}

	fn load_json(parser: &mut Parser, text: &str) -> Result<Asset> {
		let json = JsonData::from_bytes(text.as_bytes())?;
		let mut gltf = parser.load_gltf(&json, ".", Options::empty())?;
		gltf.parse(Category::ALL)?;
		Ok(gltf.take_asset().unwrap())
	}

	/// Copies every region on release so tests can inspect what the parser wrote
	#[derive(Default)]
	struct LoggingAllocator {
		inner: VecAllocator,
		log: Rc<RefCell<Vec<(u64, u64, Vec<u8>)>>>,
	}

	impl BufferAllocator for LoggingAllocator {
		fn acquire(&mut self, request: &BufferMemoryRequest) -> BufferMemoryHandle<'_> {
			self.inner.acquire(request)
		}

		fn release(&mut self, custom_id: u64) {
			self.inner.release(custom_id);
			let i = custom_id as usize;
			self.log.borrow_mut().push((custom_id, self.inner.contexts[i], self.inner.regions[i].clone()));
		}
	}

	#[test]
	fn test_glb_lazy_buffer() {
		let dir = tempdir().unwrap();
		let path = write_glb(&dir, BOX);

		let mut parser = Parser::default();
		let mut gltf = parser.load_binary_gltf(&path, Options::empty()).unwrap();
		gltf.parse(Category::ALL).unwrap();
		let asset = gltf.take_asset().unwrap();

		let expected_offset = 12 + 8 + align_up(BOX.len(), 4) as u64 + 8;
		assert_eq!(DataSource::FilePath {
			path: path.clone(),
			file_byte_offset: expected_offset,
			byte_length: Some(48),
			mime: MimeType::GltfBuffer,
		}, asset.buffers[0].data);
		assert_eq!(48, asset.buffers[0].byte_length);

		let bytes = fs::read(&path).unwrap();
		assert_eq!(&bin()[..], &bytes[expected_offset as usize..expected_offset as usize + 48]);
	}

	#[test]
	fn test_glb_eager_buffer() {
		let dir = tempdir().unwrap();
		let path = write_glb(&dir, BOX);

		let mut parser = Parser::default();
		let mut gltf = parser.load_binary_gltf(&path, Options::LOAD_GLB_BUFFERS).unwrap();
		gltf.parse(Category::BUFFERS).unwrap();
		let asset = gltf.take_asset().unwrap();

		assert_eq!(DataLocation::VectorWithMime, asset.buffers[0].data.location());
		assert_eq!(Some(&bin()[..]), asset.buffers[0].data.bytes());
		assert_eq!(MimeType::GltfBuffer, asset.buffers[0].data.mime_type());
	}

	#[test]
	fn test_full_parse() {
		let mut parser = Parser::default();
		let dir = tempdir().unwrap();
		let path = write_glb(&dir, BOX);

		let mut gltf = parser.load_binary_gltf(&path, Options::empty()).unwrap();
		assert!(!gltf.is_parsed());
		gltf.parse(Category::ALL).unwrap();
		assert!(gltf.is_parsed());
		let asset = gltf.take_asset().unwrap();

		assert_eq!(Some("qgltf tests".to_string()), asset.asset_info.unwrap().generator);
		assert_eq!(Some(0), asset.default_scene);
		assert_eq!(1, asset.scenes.len());
		assert_eq!("root", asset.nodes[0].name);
		assert_eq!(3, asset.buffer_views.len());
		assert_eq!(2, asset.accessors.len());
		assert_eq!(1, asset.cameras.len());
		assert_eq!(1, asset.skins.len());
		assert_eq!(1, asset.animations.len());
		assert_eq!(DataSource::BufferView { buffer_view: 2, mime: MimeType::Png }, asset.images[0].data);
		assert_eq!(Some(0), asset.textures[0].image);
		assert_eq!(0, asset.materials[0].pbr_data.base_color_texture.unwrap().texture);
	}

	#[test]
	fn test_category_subset() {
		let dir = tempdir().unwrap();
		let path = write_glb(&dir, BOX);

		let mut parser = Parser::default();
		let mut gltf = parser.load_binary_gltf(&path, Options::empty()).unwrap();
		gltf.parse(Category::MESHES).unwrap();
		let asset = gltf.take_asset().unwrap();

		assert_eq!(1, asset.meshes.len());
		assert_eq!(1, asset.buffers.len());
		assert_eq!(2, asset.accessors.len());
		assert_eq!(1, asset.materials.len());
		assert_eq!(1, asset.textures.len());
		assert_eq!(1, asset.images.len());
		assert_eq!(1, asset.samplers.len());
		assert_eq!(3, asset.buffer_views.len());
		assert!(asset.nodes.is_empty());
		assert!(asset.scenes.is_empty());
		assert!(asset.skins.is_empty());
		assert!(asset.cameras.is_empty());
		assert!(asset.animations.is_empty());
		assert_eq!(None, asset.asset_info);
	}

	#[test]
	fn test_renderable_preset() {
		let dir = tempdir().unwrap();
		let path = write_glb(&dir, BOX);

		let mut parser = Parser::default();
		let mut gltf = parser.load_binary_gltf(&path, Options::empty()).unwrap();
		gltf.parse(Category::ONLY_RENDERABLE).unwrap();
		let asset = gltf.take_asset().unwrap();

		assert_eq!(1, asset.nodes.len());
		assert_eq!(1, asset.scenes.len());
		assert_eq!(1, asset.meshes.len());
		assert_eq!(1, asset.cameras.len());
		assert!(asset.skins.is_empty());
		assert!(asset.animations.is_empty());
	}

	#[test]
	fn test_hand_built_selection() {
		let dir = tempdir().unwrap();
		let path = write_glb(&dir, BOX);
		let meshes_only = Category::from_bits_truncate(Section::Meshes.bit());

		let mut parser = Parser::default();
		let mut gltf = parser.load_binary_gltf(&path, Options::empty()).unwrap();
		gltf.parse(meshes_only).unwrap();
		let asset = gltf.take_asset().unwrap();
		assert_eq!(1, asset.meshes.len());
		assert!(asset.accessors.is_empty());
		assert!(asset.buffers.is_empty());

		let mut gltf = parser.load_binary_gltf(&path, Options::empty()).unwrap();
		gltf.parse(meshes_only.closure()).unwrap();
		let asset = gltf.take_asset().unwrap();
		assert_eq!(2, asset.accessors.len());
		assert_eq!(1, asset.buffers.len());
	}

	#[test]
	fn test_sticky_error() {
		let text = r#"{
			"asset": {"version": "2.0"},
			"accessors": [{"componentType": 5126, "type": "VEC3"}]
		}"#;
		let json = JsonData::from_bytes(text.as_bytes()).unwrap();

		let mut parser = Parser::default();
		let mut gltf = parser.load_gltf(&json, ".", Options::empty()).unwrap();
		assert_eq!(Err(Error::MissingField), gltf.parse(Category::ALL));
		assert_eq!(Some(Error::MissingField), gltf.error());
		assert!(gltf.take_asset().is_none());

		// Even a selection that would skip the broken element reports the first error
		assert_eq!(Err(Error::MissingField), gltf.parse(Category::CAMERAS));
		assert!(gltf.take_asset().is_none());
	}

	#[test]
	fn test_take_asset_once() {
		let json = JsonData::from_bytes(br#"{"asset": {"version": "2.0"}}"#).unwrap();
		let mut parser = Parser::default();
		let mut gltf = parser.load_gltf(&json, ".", Options::empty()).unwrap();

		assert!(gltf.take_asset().is_none());
		gltf.parse(Category::ALL).unwrap();
		assert!(gltf.take_asset().is_some());
		assert!(gltf.take_asset().is_none());
		assert_eq!(Ok(()), gltf.parse(Category::ALL));
		assert!(gltf.take_asset().is_none());
	}

	#[test]
	fn test_extension_gating() {
		let unknown = JsonData::from_bytes(br#"{
			"asset": {"version": "2.0"},
			"extensionsRequired": ["EXT_not_supported_anywhere"]
		}"#).unwrap();

		let mut parser = Parser::new(Extensions::all());
		assert_eq!(Some(Error::UnknownRequiredExtension),
			parser.load_gltf(&unknown, ".", Options::empty()).err());
		assert_eq!(Some(Error::UnknownRequiredExtension), parser.error());

		let known = JsonData::from_bytes(br#"{
			"asset": {"version": "2.0"},
			"extensionsRequired": ["KHR_texture_transform"]
		}"#).unwrap();

		let mut parser = Parser::default();
		assert_eq!(Some(Error::MissingExtensions), parser.load_gltf(&known, ".", Options::empty()).err());

		let mut parser = Parser::new(Extensions::KHR_TEXTURE_TRANSFORM);
		assert!(parser.load_gltf(&known, ".", Options::empty()).is_ok());
		assert_eq!(None, parser.error());
	}

	#[test]
	fn test_material_and_draco_extensions() {
		let text = JsonData::from_bytes(br#"{
			"asset": {"version": "2.0"},
			"extensionsRequired": ["KHR_materials_clearcoat", "KHR_draco_mesh_compression",
				"KHR_materials_transmission"],
			"materials": [{"extensions": {
				"KHR_materials_clearcoat": {"clearcoatFactor": 1.0},
				"KHR_materials_transmission": {"transmissionFactor": 0.5}
			}}],
			"meshes": [{"primitives": [{
				"attributes": {"POSITION": 0},
				"extensions": {"KHR_draco_mesh_compression": {"bufferView": 0, "attributes": {"POSITION": 0}}}
			}]}]
		}"#).unwrap();

		let mut parser = Parser::new(Extensions::all());
		let mut gltf = parser.load_gltf(&text, ".", Options::empty()).unwrap();
		gltf.parse(Category::MATERIALS | Category::MESHES).unwrap();
		let asset = gltf.take_asset().unwrap();

		assert_eq!(1.0, asset.materials[0].clearcoat.as_ref().unwrap().clearcoat_factor);
		assert_eq!(0.5, asset.materials[0].transmission.as_ref().unwrap().transmission_factor);
		let draco = asset.meshes[0].primitives[0].draco_compression.as_ref().unwrap();
		assert_eq!(0, draco.buffer_view);

		let mut parser = Parser::new(Extensions::KHR_MATERIALS_CLEARCOAT);
		assert_eq!(Some(Error::MissingExtensions), parser.load_gltf(&text, ".", Options::empty()).err());
	}

	#[test]
	fn test_load_errors() {
		let mut parser = Parser::default();

		let broken = JsonData::from_bytes(b"{\"asset\": ").unwrap();
		assert_eq!(Some(Error::InvalidJson), parser.load_gltf(&broken, ".", Options::empty()).err());
		assert_eq!(Err(Error::InvalidJson), JsonData::from_bytes(&[0xFF, 0xFE, 0x00]));

		let no_asset = JsonData::from_bytes(b"{}").unwrap();
		assert_eq!(Some(Error::InvalidOrMissingAssetField),
			parser.load_gltf(&no_asset, ".", Options::empty()).err());
		assert!(parser.load_gltf(&no_asset, ".", Options::DONT_REQUIRE_VALID_ASSET_MEMBER).is_ok());

		let old = JsonData::from_bytes(br#"{"asset": {"version": "1.0"}}"#).unwrap();
		assert_eq!(Some(Error::UnsupportedVersion), parser.load_gltf(&old, ".", Options::empty()).err());

		let array = JsonData::from_bytes(b"[]").unwrap();
		assert_eq!(Some(Error::InvalidGltf), parser.load_gltf(&array, ".", Options::empty()).err());

		let dir = tempdir().unwrap();
		let missing = dir.path().join("missing.gltf");
		assert_eq!(Some(Error::InvalidPath), parser.load_gltf_file(&missing, Options::empty()).err());
		assert_eq!(Some(Error::InvalidPath), parser.load_binary_gltf(&missing, Options::empty()).err());
		assert_eq!(Some(Error::InvalidPath), parser.error());

		let not_glb = dir.path().join("Box.glb");
		fs::write(&not_glb, BOX).unwrap();
		assert_eq!(Some(Error::InvalidGlb), parser.load_binary_gltf(&not_glb, Options::empty()).err());
	}

	#[test]
	fn test_external_buffers() {
		let dir = tempdir().unwrap();
		fs::write(dir.path().join("Box0.bin"), bin()).unwrap();

		let text = r#"{
			"asset": {"version": "2.0"},
			"buffers": [{"uri": "Box0.bin", "byteLength": 48}]
		}"#;
		let gltf_path = dir.path().join("Box.gltf");
		fs::write(&gltf_path, text).unwrap();

		let mut parser = Parser::default();
		let mut gltf = parser.load_gltf_file(&gltf_path, Options::empty()).unwrap();
		gltf.parse(Category::BUFFERS).unwrap();
		assert_eq!(DataSource::FilePath {
			path: dir.path().join("Box0.bin"),
			file_byte_offset: 0,
			byte_length: Some(48),
			mime: MimeType::None,
		}, gltf.take_asset().unwrap().buffers[0].data);

		let mut gltf = parser.load_gltf_file(&gltf_path, Options::LOAD_EXTERNAL_BUFFERS).unwrap();
		gltf.parse(Category::BUFFERS).unwrap();
		assert_eq!(Some(&bin()[..]), gltf.take_asset().unwrap().buffers[0].data.bytes());

		fs::remove_file(dir.path().join("Box0.bin")).unwrap();
		let mut gltf = parser.load_gltf_file(&gltf_path, Options::LOAD_EXTERNAL_BUFFERS).unwrap();
		assert_eq!(Err(Error::MissingExternalBuffer), gltf.parse(Category::BUFFERS));
		assert_eq!(Some(Error::MissingExternalBuffer), gltf.error());
	}

	#[test]
	fn test_glb_without_binary_chunk() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("empty.glb");
		fs::write(&path, build(r#"{"asset": {"version": "2.0"}, "buffers": [{"byteLength": 4}]}"#, None)).unwrap();

		let mut parser = Parser::default();
		let mut gltf = parser.load_binary_gltf(&path, Options::LOAD_GLB_BUFFERS).unwrap();
		assert_eq!(Err(Error::MissingExternalBuffer), gltf.parse(Category::ALL));
		assert!(gltf.take_asset().is_none());
	}

	#[test]
	fn test_custom_allocator() {
		let dir = tempdir().unwrap();
		let path = write_glb(&dir, BOX);

		let allocator = LoggingAllocator::default();
		let log = allocator.log.clone();

		let mut parser = Parser::default();
		parser.set_buffer_allocator(allocator);
		parser.set_user_context(0xC0FFEE);

		let mut gltf = parser.load_binary_gltf(&path, Options::LOAD_GLB_BUFFERS).unwrap();
		gltf.parse(Category::BUFFERS).unwrap();
		let asset = gltf.take_asset().unwrap();

		assert_eq!(DataSource::CustomBuffer { id: 0, mime: MimeType::GltfBuffer }, asset.buffers[0].data);
		assert_eq!(vec![(0, 0xC0FFEE, bin())], *log.borrow());
	}

	#[test]
	fn test_data_uri_decoders_agree() {
		let payload = base64::encode(&bin());
		let text = format!(r#"{{
			"asset": {{"version": "2.0"}},
			"buffers": [{{"uri": "data:application/octet-stream;base64,{}", "byteLength": 48}}]
		}}"#, payload);
		let json = JsonData::from_bytes(text.as_bytes()).unwrap();

		let mut parser = Parser::default();
		let mut assets = vec![];
		for options in [Options::empty(), Options::DONT_USE_SIMD] {
			let mut gltf = parser.load_gltf(&json, ".", options).unwrap();
			gltf.parse(Category::BUFFERS).unwrap();
			assets.push(gltf.take_asset().unwrap());
		}

		assert_eq!(assets[0].buffers, assets[1].buffers);
		assert_eq!(Some(&bin()[..]), assets[0].buffers[0].data.bytes());
	}

	#[test]
	fn test_lights() {
		let text = r#"{
			"asset": {"version": "2.0"},
			"extensionsUsed": ["KHR_lights_punctual"],
			"extensions": {"KHR_lights_punctual": {"lights": [{"type": "directional"}]}},
			"nodes": [{"extensions": {"KHR_lights_punctual": {"light": 0}}}]
		}"#;

		let enabled = load_json(&mut Parser::new(Extensions::KHR_LIGHTS_PUNCTUAL), text).unwrap();
		assert_eq!(1, enabled.lights.len());
		assert_eq!(Some(0), enabled.nodes[0].light);
		assert_eq!(vec!["KHR_lights_punctual".to_string()], enabled.extensions_used);

		let disabled = load_json(&mut Parser::default(), text).unwrap();
		assert!(disabled.lights.is_empty());
		assert_eq!(None, disabled.nodes[0].light);
	}

	#[test]
	fn test_top_level_type_errors() {
		let mut parser = Parser::default();
		assert_eq!(Err(Error::InvalidGltf), load_json(&mut parser,
			r#"{"asset": {"version": "2.0"}, "nodes": {}}"#).map(|_| ()));
		assert_eq!(Err(Error::InvalidGltf), load_json(&mut parser,
			r#"{"asset": {"version": "2.0"}, "nodes": [5]}"#).map(|_| ()));
	}
}
