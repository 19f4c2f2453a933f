pub mod macros;

mod computed;
mod error;
mod path;
mod record;

pub use computed::{computed_property, Dep, Dependencies, Descriptor, Getter, Property, Setter};
pub use error::Error;
pub use path::Path;
pub use record::{Record, Ref};
