use std::fmt::{self, Display};

use serde_json::{Map, Value};
use smallvec::SmallVec;

/// A dotted key like `data.title`, resolved against a record's plain data.
/// Always has at least one segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
	head: String,
	rest: SmallVec<[String; 2]>,
}

impl Path {
	pub fn new(path: &str) -> Self {
		let mut segments = path.split('.').map(str::to_owned);
		let head = segments.next().unwrap_or_default();
		Path {
			head,
			rest: segments.collect(),
		}
	}

	/// Nested read. An absent location at any depth resolves to `None`.
	pub fn resolve<'a>(&self, data: &'a Map<String, Value>) -> Option<&'a Value> {
		let mut current = data.get(&self.head)?;
		for segment in &self.rest {
			current = current.as_object()?.get(segment)?;
		}
		Some(current)
	}

	/// Nested write. Intermediate objects are created as needed; an
	/// intermediate that exists but is not an object is replaced.
	pub fn assign(&self, data: &mut Map<String, Value>, value: Value) {
		let (last, middle) = match self.rest.split_last() {
			Some(split) => split,
			None => {
				data.insert(self.head.clone(), value);
				return;
			}
		};

		let mut current = data
			.entry(self.head.clone())
			.or_insert_with(|| Value::Object(Map::new()));

		for segment in middle {
			current = ensure_object(current)
				.entry(segment.clone())
				.or_insert_with(|| Value::Object(Map::new()));
		}

		ensure_object(current).insert(last.clone(), value);
	}
}

fn ensure_object(slot: &mut Value) -> &mut Map<String, Value> {
	if !slot.is_object() {
		*slot = Value::Object(Map::new());
	}
	match slot {
		Value::Object(map) => map,
		_ => unreachable!(),
	}
}

impl From<&str> for Path {
	fn from(path: &str) -> Self {
		Path::new(path)
	}
}

impl Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.head)?;
		for segment in &self.rest {
			write!(f, ".{}", segment)?;
		}
		Ok(())
	}
}
