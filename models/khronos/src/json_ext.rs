use json::JsonValue;
use tracing::debug;

use crate::error::{
	Error,
	Result
};

fn missing(key: &str) -> Error {
	debug!(field = key, "missing required field");
	Error::MissingField
}

fn mistyped(key: &str) -> Error {
	debug!(field = key, "field has an unexpected type");
	Error::InvalidGltf
}

/// Typed access to the fields of a glTF JSON object. Absent optional fields are `None` (or
/// empty); present fields of the wrong type are schema errors.
pub trait JsonObjectExt {
	fn field(&self, key: &str) -> Option<&JsonValue>;

	fn optional<'a, T, F>(&'a self, key: &str, convert: F) -> Result<Option<T>>
	where
		F: FnOnce(&'a JsonValue) -> Option<T>,
	{
		match self.field(key) {
			Some(value) => convert(value).map(Some).ok_or_else(|| mistyped(key)),
			None => Ok(None),
		}
	}

	fn required<'a, T, F>(&'a self, key: &str, convert: F) -> Result<T>
	where
		F: FnOnce(&'a JsonValue) -> Option<T>,
	{
		self.optional(key, convert)?.ok_or_else(|| missing(key))
	}

	#[inline]
	fn optional_usize(&self, key: &str) -> Result<Option<usize>> {
		self.optional(key, JsonValue::as_usize)
	}

	#[inline]
	fn required_usize(&self, key: &str) -> Result<usize> {
		self.required(key, JsonValue::as_usize)
	}

	#[inline]
	fn optional_u64(&self, key: &str) -> Result<Option<u64>> {
		self.optional(key, JsonValue::as_u64)
	}

	#[inline]
	fn required_u64(&self, key: &str) -> Result<u64> {
		self.required(key, JsonValue::as_u64)
	}

	#[inline]
	fn optional_f32(&self, key: &str) -> Result<Option<f32>> {
		self.optional(key, JsonValue::as_f32)
	}

	#[inline]
	fn required_f32(&self, key: &str) -> Result<f32> {
		self.required(key, JsonValue::as_f32)
	}

	#[inline]
	fn optional_bool(&self, key: &str) -> Result<Option<bool>> {
		self.optional(key, JsonValue::as_bool)
	}

	#[inline]
	fn optional_str(&self, key: &str) -> Result<Option<&str>> {
		self.optional(key, JsonValue::as_str)
	}

	#[inline]
	fn required_str(&self, key: &str) -> Result<&str> {
		self.required(key, JsonValue::as_str)
	}

	/// The optional `name` of an element, empty if absent
	fn name(&self) -> Result<String> {
		Ok(self.optional_str("name")?.unwrap_or_default().to_string())
	}

	/// An object-valued field, absent if missing
	fn optional_object(&self, key: &str) -> Result<Option<&JsonValue>> {
		self.optional(key, |v| v.is_object().then(|| v))
	}

	fn required_object(&self, key: &str) -> Result<&JsonValue> {
		self.required(key, |v| v.is_object().then(|| v))
	}

	/// An array-valued field, converting every member. Absent arrays are empty.
	fn array<'a, T, F>(&'a self, key: &str, mut convert: F) -> Result<Vec<T>>
	where
		F: FnMut(&'a JsonValue) -> Option<T>,
	{
		let array = match self.field(key) {
			Some(array) if array.is_array() => array,
			Some(_) => return Err(mistyped(key)),
			None => return Ok(vec![]),
		};

		array.members().map(|v| convert(v).ok_or_else(|| mistyped(key))).collect()
	}

	fn required_array<'a, T, F>(&'a self, key: &str, convert: F) -> Result<Vec<T>>
	where
		F: FnMut(&'a JsonValue) -> Option<T>,
	{
		match self.field(key) {
			Some(_) => self.array(key, convert),
			None => Err(missing(key)),
		}
	}

	/// Members of an array of objects. Absent arrays are empty.
	fn objects(&self, key: &str) -> Result<Vec<&JsonValue>> {
		self.array(key, |v| v.is_object().then(|| v))
	}

	/// A fixed-length number array such as a vector or matrix
	fn optional_f32_array<const N: usize>(&self, key: &str) -> Result<Option<[f32; N]>> {
		match self.field(key) {
			Some(_) => {
				let values = self.array(key, JsonValue::as_f32)?;
				values.try_into().map(Some).map_err(|_| mistyped(key))
			},
			None => Ok(None),
		}
	}

	/// The object stored under `extensions.<name>`, if any
	fn extension(&self, name: &str) -> Option<&JsonValue> {
		self.field("extensions")
			.and_then(|exts| exts.field(name))
			.filter(|ext| ext.is_object())
	}
}

impl JsonObjectExt for JsonValue {
	#[inline]
	fn field(&self, key: &str) -> Option<&JsonValue> {
		match self.has_key(key) {
			true => Some(&self[key]),
			false => None,
		}
	}
}
