use std::cell::{self, RefCell};
use std::fmt::Debug;
use std::ops::Deref;

use fxhash::FxHashMap;
use serde_json::{Map, Value};

use crate::computed::{Getter, Setter, Snapshot};
use crate::path::Path;

/// The target object: plain JSON data plus installed computed accessors.
/// Reads and writes go through [`Record::get`] and [`Record::set`], which
/// intercept whole-name matches against installed accessors before falling
/// back to the raw nested path.
pub struct Record {
	data: Map<String, Value>,
	accessors: FxHashMap<String, Accessor>,
}

pub(crate) struct Accessor {
	pub(crate) name: String,
	pub(crate) get: Option<Getter>,
	pub(crate) set: Option<Setter>,
	pub(crate) snapshot: RefCell<Snapshot>,
}

impl Record {
	pub fn new() -> Self {
		Record {
			data: Map::new(),
			accessors: FxHashMap::default(),
		}
	}

	pub fn data(&self) -> &Map<String, Value> {
		&self.data
	}

	pub fn into_data(self) -> Map<String, Value> {
		self.data
	}

	/// Reads `path`. A whole-name match against an installed accessor runs
	/// the memoized getter; anything else is a raw nested read. Returns
	/// `None` for absent locations and for accessors without a getter.
	pub fn get(&self, path: &str) -> Option<Ref<'_>> {
		if let Some(accessor) = self.accessors.get(path) {
			return accessor.read(self);
		}
		Path::new(path).resolve(&self.data).map(Ref::Plain)
	}

	/// Writes `value` at `path`. A whole-name match against an installed
	/// accessor goes through its setter, untouched by the cache; a match
	/// without a setter is ignored. Anything else is a raw nested write.
	pub fn set(&mut self, path: &str, value: Value) {
		if let Some(accessor) = self.accessors.get(path) {
			let setter = match accessor.set.clone() {
				Some(setter) => setter,
				None => return,
			};
			setter(&mut self.data, value);
			return;
		}
		Path::new(path).assign(&mut self.data, value);
	}

	/// Enumerates plain data keys and installed accessor names.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.data
			.keys()
			.map(String::as_str)
			.chain(self.accessors.keys().map(String::as_str))
	}

	/// Removes an installed accessor, together with its cache.
	pub fn remove_property(&mut self, name: &str) -> bool {
		self.accessors.remove(name).is_some()
	}

	pub(crate) fn define(&mut self, accessor: Accessor) {
		// An accessor shadows (and replaces) a plain data key of the
		// same name, as redefining a data property would.
		self.data.remove(&accessor.name);
		self.accessors.insert(accessor.name.clone(), accessor);
	}
}

impl Accessor {
	fn read<'a>(&'a self, record: &'a Record) -> Option<Ref<'a>> {
		let get = self.get.clone()?;

		// Short-circuit order matters: change detection (and its snapshot
		// refresh) only runs when watching is on and a cached value exists.
		let recompute = {
			let mut snapshot = self.snapshot.borrow_mut();
			!snapshot.watching() || !snapshot.has_value() || snapshot.refresh(&record.data)
		};

		if recompute {
			tracing::trace!(name = %self.name, "recompute");
			let value = get(record);
			self.snapshot.borrow_mut().store(value);
		}

		Some(Ref::Cell(cell::Ref::map(self.snapshot.borrow(), |s| {
			s.value()
		})))
	}
}

impl Default for Record {
	fn default() -> Self {
		Record::new()
	}
}

impl From<Map<String, Value>> for Record {
	fn from(data: Map<String, Value>) -> Self {
		Record {
			data,
			accessors: FxHashMap::default(),
		}
	}
}

impl Debug for Record {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Record")
			.field("data", &self.data)
			.field("computed", &self.accessors.keys().collect::<Vec<_>>())
			.finish()
	}
}

pub enum Ref<'a> {
	Plain(&'a Value),
	Cell(cell::Ref<'a, Value>),
}

impl Deref for Ref<'_> {
	type Target = Value;

	fn deref(&self) -> &Self::Target {
		match self {
			Ref::Plain(value) => value,
			Ref::Cell(guard) => guard.deref(),
		}
	}
}

impl Debug for Ref<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.deref().fmt(f)
	}
}
