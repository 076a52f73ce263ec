//! Route definition language: a small DSL that describes an HTTP
//! reverse-proxy routing table as a list of frontend matchers, filter
//! chains, and backends.
//!
//! The pipeline mirrors the module split described above: text flows through
//! [`lexer`] → [`parser`] → [`apply`] to produce [`model::Route`]s in
//! pre-canonical shape, then [`canonical`] folds the legacy shorthand
//! fields into the generic predicate list. [`equality`], [`copy`], and
//! [`serialize`] all operate on the canonical shape.

mod apply;
pub mod args;
pub mod canonical;
pub mod copy;
pub mod equality;
pub mod error;
mod lexer;
pub mod model;
mod parser;
pub mod serialize;
pub mod template;
pub mod validate;

pub use canonical::{canonical, canonical_list};
pub use copy::{copy, copy_list};
pub use equality::{equal, equal_list};
pub use error::{Position, RdlError, Result};
pub use model::{Arg, BackendType, Filter, LBEndpoint, Predicate, Route, RouteList};
pub use parser::{parse, parse_filters};
pub use serialize::json::{marshal, unmarshal};
pub use serialize::text::{format, format_document};
pub use template::compile_template;
pub use validate::{validate_predicates, validate_unique_ids};

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

const ROUTE_ID_LEN: usize = 16;
const ROUTE_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The sanitizer pattern (`\W` — not `[0-9A-Za-z_]`).
/// Compiled once; `generate_route_id`/`sanitize_route_id_fragment` are
/// called once per route in a typical routing table load, so a
/// per-call `Regex::new` would be wasted work.
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").unwrap());

/// Generate a route id: a `route` prefix followed by 16 random
/// alphanumeric characters. Not cryptographically random — uniqueness
/// within a single routing table is all that's required.
pub fn generate_route_id() -> agent_core::Strng {
	let mut rng = rand::rng();
	let suffix: String = (0..ROUTE_ID_LEN)
		.map(|_| {
			let idx = rng.random_range(0..ROUTE_ID_ALPHABET.len());
			ROUTE_ID_ALPHABET[idx] as char
		})
		.collect();
	agent_core::strng::format!("route{suffix}")
}

/// Sanitize an arbitrary string into one usable as a route id component:
/// every non-word character (`\W`, i.e. not `[0-9A-Za-z_]`) becomes `x`.
pub fn sanitize_route_id_fragment(s: &str) -> agent_core::Strng {
	agent_core::strng::new(NON_WORD.replace_all(s, "x").into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generated_ids_have_fixed_shape() {
		let id = generate_route_id();
		assert!(id.starts_with("route"));
		assert_eq!(id.len(), "route".len() + ROUTE_ID_LEN);
	}

	#[test]
	fn sanitizes_non_word_characters() {
		assert_eq!(sanitize_route_id_fragment("a-b c.d").as_str(), "axbxcxd");
	}
}
