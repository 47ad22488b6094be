//! Caller-provided storage for eagerly loaded buffer bytes.
//!
//! When an allocator is installed, the parser asks it for a region sized for each buffer it
//! materializes, writes the bytes into that region, then releases the handle. The asset keeps
//! only the allocator's identifier ([`DataSource::CustomBuffer`](crate::gltf2::DataSource)).

use tracing::warn;

use crate::error::{
	Error,
	Result
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BufferMemoryRequest {
	pub byte_size: usize,
	/// Opaque value set on the parser, passed through unchanged
	pub user_context: u64,
}

#[derive(Debug)]
pub struct BufferMemoryHandle<'a> {
	/// At least `byte_size` writable bytes
	pub region: &'a mut [u8],
	/// Identifier stored in the asset for this buffer
	pub custom_id: u64,
}

pub trait BufferAllocator {
	fn acquire(&mut self, request: &BufferMemoryRequest) -> BufferMemoryHandle<'_>;

	/// Called once the region for `custom_id` has been filled. The memory stays owned by
	/// the allocator.
	fn release(&mut self, custom_id: u64);
}

/// Acquires a region for `request`, lets `fill` write into it and releases it again.
/// `release` is called exactly once for every successful `acquire`, whether or not `fill`
/// succeeds.
pub fn with_buffer_memory<A, F>(allocator: &mut A, request: &BufferMemoryRequest, fill: F) -> Result<u64>
where
	A: BufferAllocator + ?Sized,
	F: FnOnce(&mut [u8]) -> Result<()>,
{
	let handle = allocator.acquire(request);
	let id = handle.custom_id;

	let filled = if handle.region.len() < request.byte_size {
		warn!(id, requested = request.byte_size, provided = handle.region.len(),
			"allocator returned a short region");
		Err(Error::MissingExternalBuffer)
	} else {
		fill(&mut handle.region[..request.byte_size])
	};

	allocator.release(id);
	filled.map(|_| id)
}

/// Allocator backed by owned vectors, mostly useful for tests and tooling
#[derive(Debug, Default)]
pub struct VecAllocator {
	pub regions: Vec<Vec<u8>>,
	pub released: Vec<u64>,
	/// User contexts of every request, in order
	pub contexts: Vec<u64>,
}

impl BufferAllocator for VecAllocator {
	fn acquire(&mut self, request: &BufferMemoryRequest) -> BufferMemoryHandle<'_> {
		self.contexts.push(request.user_context);
		self.regions.push(vec![0; request.byte_size]);

		let custom_id = self.regions.len() as u64 - 1;
		let region = match self.regions.last_mut() {
			Some(region) => region.as_mut_slice(),
			None => &mut [],
		};

		BufferMemoryHandle {
			region,
			custom_id,
		}
	}

	fn release(&mut self, custom_id: u64) {
		self.released.push(custom_id);
	}
}
