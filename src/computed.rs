use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::path::Path;
use crate::record::{Accessor, Record};
use crate::Error;

pub type Getter = Rc<dyn Fn(&Record) -> Value>;
pub type Setter = Rc<dyn Fn(&mut Map<String, Value>, Value)>;

/// Getter/setter pair for an installed property. Both halves are optional:
/// no getter makes the property write-only, no setter makes writes under
/// the property name no-ops.
#[derive(Default, Clone)]
pub struct Descriptor {
	pub get: Option<Getter>,
	pub set: Option<Setter>,
}

impl Descriptor {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_get(mut self, get: impl Fn(&Record) -> Value + 'static) -> Self {
		self.get = Some(Rc::new(get));
		self
	}

	pub fn with_set(mut self, set: impl Fn(&mut Map<String, Value>, Value) + 'static) -> Self {
		self.set = Some(Rc::new(set));
		self
	}
}

/// The descriptor-position argument of [`computed_property`]. Mirrors the
/// call shapes the installer accepts: a full descriptor, a bare getter
/// shortcut, or a plain value supplied dynamically.
pub enum Property {
	Descriptor(Descriptor),
	Getter(Getter),
	Raw(Value),
}

impl Property {
	pub fn getter(get: impl Fn(&Record) -> Value + 'static) -> Self {
		Property::Getter(Rc::new(get))
	}

	fn resolve(self) -> Result<Descriptor, Error> {
		match self {
			Property::Descriptor(descriptor) => Ok(descriptor),
			Property::Getter(get) => Ok(Descriptor {
				get: Some(get),
				set: None,
			}),
			// A plain object is a valid, capability-less descriptor.
			Property::Raw(Value::Object(_)) => Ok(Descriptor::default()),
			Property::Raw(other) => Err(Error::InvalidProperty(kind_name(&other))),
		}
	}
}

impl From<Descriptor> for Property {
	fn from(descriptor: Descriptor) -> Self {
		Property::Descriptor(descriptor)
	}
}

impl From<Value> for Property {
	fn from(value: Value) -> Self {
		Property::Raw(value)
	}
}

fn kind_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

/// One entry of a dependency list: a single path or a batch of paths.
/// Batches are flattened one level, so lists composed from multiple
/// sources keep their left-to-right order.
pub enum Dep {
	One(Path),
	Many(Vec<Path>),
}

impl From<&str> for Dep {
	fn from(path: &str) -> Self {
		Dep::One(Path::new(path))
	}
}

impl From<String> for Dep {
	fn from(path: String) -> Self {
		Dep::One(Path::new(&path))
	}
}

impl From<Path> for Dep {
	fn from(path: Path) -> Self {
		Dep::One(path)
	}
}

impl From<Vec<&str>> for Dep {
	fn from(paths: Vec<&str>) -> Self {
		Dep::Many(paths.into_iter().map(Path::new).collect())
	}
}

impl From<&[&str]> for Dep {
	fn from(paths: &[&str]) -> Self {
		Dep::Many(paths.iter().map(|path| Path::new(path)).collect())
	}
}

/// Ordered, flattened list of watched dependency paths. Empty means
/// watching is disabled and the property recomputes on every read.
#[derive(Default)]
pub struct Dependencies {
	paths: SmallVec<[Path; 4]>,
}

impl Dependencies {
	pub fn none() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.paths.len()
	}

	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}
}

impl<D> FromIterator<D> for Dependencies
where
	D: Into<Dep>,
{
	fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
		let mut paths = SmallVec::new();
		for dep in iter {
			match dep.into() {
				Dep::One(path) => paths.push(path),
				Dep::Many(batch) => paths.extend(batch),
			}
		}
		Dependencies { paths }
	}
}

/// Private per-accessor cache: the last computed value plus the last
/// observed value at each watched path. Owned by exactly one accessor.
pub(crate) struct Snapshot {
	cached: Option<Value>,
	watched: SmallVec<[Watched; 4]>,
}

struct Watched {
	path: Path,
	seen: Option<Value>,
}

impl Snapshot {
	fn new(dependencies: Dependencies, data: &Map<String, Value>) -> Self {
		let watched = dependencies
			.paths
			.into_iter()
			.map(|path| {
				let seen = path.resolve(data).cloned();
				Watched { path, seen }
			})
			.collect();
		Snapshot {
			cached: None,
			watched,
		}
	}

	pub(crate) fn watching(&self) -> bool {
		!self.watched.is_empty()
	}

	pub(crate) fn has_value(&self) -> bool {
		self.cached.is_some()
	}

	pub(crate) fn store(&mut self, value: Value) {
		self.cached = Some(value);
	}

	pub(crate) fn value(&self) -> &Value {
		self.cached.as_ref().unwrap()
	}

	/// Compares every watched path against the live data and refreshes the
	/// snapshot of each one that differs, not only the first. Returns
	/// whether any path differed.
	pub(crate) fn refresh(&mut self, data: &Map<String, Value>) -> bool {
		let mut changed = false;
		for watched in &mut self.watched {
			let current = watched.path.resolve(data);
			if current != watched.seen.as_ref() {
				tracing::trace!(path = %watched.path, "dependency changed");
				watched.seen = current.cloned();
				changed = true;
			}
		}
		changed
	}
}

/// Defines a computed accessor named `name` on `record`.
///
/// The getter runs lazily on read and its result is cached until one of
/// the watched dependency paths deep-changes. The setter, if any, is
/// passed through unmodified and never touches the cache. Validation of
/// the property argument happens before the record is mutated.
pub fn computed_property(
	record: &mut Record,
	name: &str,
	dependencies: Dependencies,
	property: impl Into<Property>,
) -> Result<(), Error> {
	let descriptor = property.into().resolve()?;

	tracing::trace!(name, deps = dependencies.len(), "define computed property");

	let snapshot = Snapshot::new(dependencies, record.data());
	record.define(Accessor {
		name: name.to_owned(),
		get: descriptor.get,
		set: descriptor.set,
		snapshot: RefCell::new(snapshot),
	});

	Ok(())
}
