use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
	#[error("expected property to be an object, received {0}")]
	InvalidProperty(&'static str),
}
