//! A cheaply-clonable interned string, used anywhere the rest of the
//! workspace would otherwise reach for `String` or `Arc<str>`.
//!
//! Cloning a `Strng` is a refcount bump, not an allocation, which matters
//! for route identifiers and predicate/filter names that get copied every
//! time a route list is canonicalized or deep-copied.

pub type Strng = arcstr::ArcStr;

pub fn new(s: impl AsRef<str>) -> Strng {
	Strng::from(s.as_ref())
}

#[macro_export]
macro_rules! strng_format {
	($($arg:tt)*) => {
		$crate::strng::Strng::from(::std::format!($($arg)*))
	};
}
pub use strng_format as format;

#[macro_export]
macro_rules! strng_literal {
	($s:expr) => {
		$crate::strng::Strng::from(arcstr::literal!($s))
	};
}
pub use strng_literal as literal;
