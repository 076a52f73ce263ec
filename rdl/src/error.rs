//! Error taxonomy. Every fallible operation in this crate returns one
//! of these typed variants rather than a bare string, in the style of
//! `agentgateway`'s per-component `thiserror` enums (`http::filters::Error`,
//! `cel::Error`).

use agent_core::prelude::Strng;

/// A `(line, column)` location in the source text, 1-indexed, used by
/// the lexer and parser to report the approximate position of the
/// first offending token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
	pub line: usize,
	pub column: usize,
}

impl std::fmt::Display for Position {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line, self.column)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum RdlError {
	#[error("lexical error at {0}: {1}")]
	Lexical(Position, String),

	#[error("parse error at {0}: {1}")]
	Parse(Position, String),

	#[error("duplicate-path-tree")]
	DuplicatePath,

	#[error("duplicate-method")]
	DuplicateMethod,

	#[error("duplicate header predicate: {0}")]
	DuplicateHeader(Strng),

	#[error("invalid predicate arg")]
	InvalidPredicateArg,

	#[error("invalid predicate count arg")]
	InvalidPredicateArgCount,

	#[error("invalid backend")]
	InvalidBackend,

	#[error("predicate validation: {0}")]
	PredicateValidation(String),

	#[error("unknown backend type: {0}")]
	UnknownBackendType(String),

	#[error("id {0:?} used by more than one route in the list")]
	DuplicateRouteId(Strng),

	#[error("{0}")]
	Json(String),

	/// Aggregated failure from [`crate::args::ArgReader`]: an arity
	/// mismatch message (if any), followed by every per-position
	/// [`CoercionError`], joined by `", "` — the coercer never fails
	/// fast.
	#[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
	Coercion(Vec<CoercionError>),
}

/// A single argument coercion failure: the position in the argument
/// vector and a human-readable message. The bare arity-mismatch case is
/// represented as a [`CoercionError`] with no position-specific
/// argument, carrying the "expects N arguments" message, so it composes
/// into the same joined list as the rest.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CoercionError {
	pub index: Option<usize>,
	pub message: String,
}

impl CoercionError {
	pub fn at(index: usize, message: impl Into<String>) -> Self {
		Self {
			index: Some(index),
			message: message.into(),
		}
	}

	pub fn arity(expected: usize) -> Self {
		Self {
			index: None,
			message: format!("expects {expected} arguments"),
		}
	}
}

pub type Result<T> = std::result::Result<T, RdlError>;
