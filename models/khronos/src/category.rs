//! Element categories and the dependency graph between them.
//!
//! Every category flag carries its own bit plus the bits of everything it references,
//! transitively. Selecting [`Category::MESHES`] therefore also selects accessors, buffer views,
//! buffers, materials, textures, images and samplers. Skins and nodes reference each other,
//! so the closure is computed as a fixed point over the [`DEPENDENCIES`] table.

use bitflags::bitflags;

/// One top-level element array of a glTF document (plus the `asset` metadata).
/// The discriminant is the section's bit position in [`Category`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum Section {
	Buffers = 0,
	BufferViews,
	Accessors,
	Images,
	Samplers,
	Textures,
	Animations,
	Cameras,
	Materials,
	Meshes,
	Skins,
	Nodes,
	Scenes,
	Asset,
}

pub const SECTION_COUNT: usize = 14;

impl Section {
	pub const ALL: [Section; SECTION_COUNT] = [
		Section::Buffers,
		Section::BufferViews,
		Section::Accessors,
		Section::Images,
		Section::Samplers,
		Section::Textures,
		Section::Animations,
		Section::Cameras,
		Section::Materials,
		Section::Meshes,
		Section::Skins,
		Section::Nodes,
		Section::Scenes,
		Section::Asset,
	];

	/// The section's own bit, without dependencies
	pub const fn bit(self) -> u32 {
		1 << self as u32
	}

	/// Sections referenced directly by elements of this section
	pub const fn dependencies(self) -> &'static [Section] {
		DEPENDENCIES[self as usize]
	}

	/// JSON key of the section's array in the document root
	pub fn key(self) -> &'static str {
		match self {
			Section::Buffers => "buffers",
			Section::BufferViews => "bufferViews",
			Section::Accessors => "accessors",
			Section::Images => "images",
			Section::Samplers => "samplers",
			Section::Textures => "textures",
			Section::Animations => "animations",
			Section::Cameras => "cameras",
			Section::Materials => "materials",
			Section::Meshes => "meshes",
			Section::Skins => "skins",
			Section::Nodes => "nodes",
			Section::Scenes => "scenes",
			Section::Asset => "asset",
		}
	}
}

/// Direct references, indexed by [`Section`] discriminant
pub const DEPENDENCIES: [&[Section]; SECTION_COUNT] = [
	&[],
	&[Section::Buffers],
	&[Section::BufferViews],
	&[Section::BufferViews],
	&[],
	&[Section::Images, Section::Samplers],
	&[Section::Accessors],
	&[],
	&[Section::Textures],
	&[Section::Accessors, Section::Materials],
	&[Section::Accessors, Section::Nodes],
	&[Section::Cameras, Section::Meshes, Section::Skins],
	&[Section::Nodes],
	&[],
];

/// Sections in the order they are parsed. A section comes after everything it depends on,
/// except for the skins/nodes cycle, which only exchanges indices.
pub const PARSE_ORDER: [Section; SECTION_COUNT - 1] = [
	Section::Buffers,
	Section::BufferViews,
	Section::Accessors,
	Section::Images,
	Section::Samplers,
	Section::Textures,
	Section::Materials,
	Section::Cameras,
	Section::Meshes,
	Section::Skins,
	Section::Animations,
	Section::Nodes,
	Section::Scenes,
];

/// Expands `bits` until every selected section's dependencies are selected too
pub const fn closure_bits(bits: u32) -> u32 {
	let mut bits = bits;

	loop {
		let mut next = bits;
		let mut i = 0;
		while i < SECTION_COUNT {
			if bits & (1 << i) != 0 {
				let deps = DEPENDENCIES[i];
				let mut j = 0;
				while j < deps.len() {
					next |= deps[j].bit();
					j += 1;
				}
			}
			i += 1;
		}

		if next == bits {
			return bits;
		}
		bits = next;
	}
}

const fn closure(section: Section) -> u32 {
	closure_bits(section.bit())
}

bitflags! {
	pub struct Category: u32 {
		const BUFFERS = closure(Section::Buffers);
		const BUFFER_VIEWS = closure(Section::BufferViews);
		const ACCESSORS = closure(Section::Accessors);
		const IMAGES = closure(Section::Images);
		const SAMPLERS = closure(Section::Samplers);
		const TEXTURES = closure(Section::Textures);
		const ANIMATIONS = closure(Section::Animations);
		const CAMERAS = closure(Section::Cameras);
		const MATERIALS = closure(Section::Materials);
		const MESHES = closure(Section::Meshes);
		const SKINS = closure(Section::Skins);
		const NODES = closure(Section::Nodes);
		const SCENES = closure(Section::Scenes);
		const ASSET = closure(Section::Asset);

		const ALL = (1 << SECTION_COUNT) - 1;
		/// Everything needed to draw the scene, without animations and skins
		const ONLY_RENDERABLE = Self::ALL.bits & !Section::Animations.bit() & !Section::Skins.bit();
		const ONLY_ANIMATIONS = closure(Section::Animations) | closure(Section::Nodes);
	}
}

impl Default for Category {
	fn default() -> Self {
		Category::ALL
	}
}

impl Category {
	/// The category selecting `section` and everything it depends on
	pub const fn of(section: Section) -> Category {
		Category {
			bits: closure(section),
		}
	}

	/// Adds any dependency missing from a hand-built set of bits.
	/// Values composed from the named flags are already closed.
	pub fn closure(self) -> Category {
		Category {
			bits: closure_bits(self.bits),
		}
	}

	/// Whether the section's own bit is selected
	pub fn includes(self, section: Section) -> bool {
		self.bits & section.bit() != 0
	}

	/// Selected sections, in parse order. [`Section::Asset`] is never yielded.
	pub fn sections(self) -> impl Iterator<Item = Section> {
		PARSE_ORDER.into_iter().filter(move |&s| self.includes(s))
	}
}
