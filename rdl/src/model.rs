//! The route object model: routes, predicates, filters, backends.
//!
//! This is the central aggregate the rest of the crate operates on.
//! `Route` as produced by [`crate::parser::parse`] is in *pre-canonical*
//! form: the legacy shorthand fields (`path`, `method`, `host_regexps`,
//! `path_regexps`, `headers`, `header_regexps`, `shunt`) may be populated
//! alongside (or instead of) `predicates`. [`crate::canonical::canonical`]
//! folds the shorthand into `predicates` and clears it; everything past
//! that point (equality, copy, serialization) operates on the canonical
//! shape only.

use agent_core::prelude::Strng;

/// A single predicate or filter argument.
///
/// The grammar only ever produces [`Arg::Number`], [`Arg::String`], or
/// [`Arg::Regex`] (numbers are always parsed as `f64`, per the lexer's
/// permissive/parser-reparses split). [`Arg::Integer`] exists so the
/// structured-interchange reader can round-trip a JSON integer without
/// forcing it through a float — see [`crate::serialize::json`].
#[derive(Debug, Clone)]
pub enum Arg {
	Number(f64),
	Integer(i64),
	String(Strng),
	Regex(Strng),
}

impl Arg {
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Arg::Number(n) => Some(*n),
			Arg::Integer(i) => Some(*i as f64),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Arg::String(s) | Arg::Regex(s) => Some(s.as_str()),
			_ => None,
		}
	}

	pub fn is_string_like(&self) -> bool {
		matches!(self, Arg::String(_) | Arg::Regex(_))
	}
}

/// Numeric args compare by value regardless of `Number` vs `Integer`
/// tagging; string and regex args compare by their (carrier-significant)
/// tag and text.
impl PartialEq for Arg {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Arg::String(a), Arg::String(b)) => a == b,
			(Arg::Regex(a), Arg::Regex(b)) => a == b,
			(a, b) if a.as_f64().is_some() && b.as_f64().is_some() => a.as_f64() == b.as_f64(),
			_ => false,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
	pub name: Strng,
	pub args: Vec<Arg>,
}

impl Predicate {
	pub fn new(name: impl Into<Strng>, args: Vec<Arg>) -> Self {
		Self {
			name: name.into(),
			args,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
	pub name: Strng,
	pub args: Vec<Arg>,
}

impl Filter {
	pub fn new(name: impl Into<Strng>, args: Vec<Arg>) -> Self {
		Self {
			name: name.into(),
			args,
		}
	}
}

/// An address (and optional locality zone) inside a load-balanced backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LBEndpoint {
	pub address: Strng,
	pub zone: Option<Strng>,
}

impl LBEndpoint {
	pub fn new(address: impl Into<Strng>, zone: Option<Strng>) -> Self {
		Self {
			address: address.into(),
			zone,
		}
	}
}

/// The route's destination, as a tagged union. Replaces the source
/// data model's coexisting `{backend_type, backend_address, shunt_bool,
/// lb_algorithm, lb_endpoints[]}` split (see DESIGN.md).
#[derive(Debug, Clone, PartialEq)]
pub enum BackendType {
	Network(Strng),
	Shunt,
	Loopback,
	Dynamic,
	LB {
		algorithm: Strng,
		endpoints: Vec<LBEndpoint>,
	},
}

impl BackendType {
	pub fn is_lb(&self) -> bool {
		matches!(self, BackendType::LB { .. })
	}
}

/// The central aggregate: predicates + filters + backend, bound to an
/// (optionally empty) route id.
///
/// Before canonicalization the shorthand fields may carry predicate
/// semantics outside `predicates` — see the module docs.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
	pub id: Strng,
	pub predicates: Vec<Predicate>,
	pub filters: Vec<Filter>,
	pub backend: BackendType,

	// Legacy/shorthand fields. Only meaningful before canonicalization.
	pub path: Option<Strng>,
	pub host_regexps: Vec<Strng>,
	pub path_regexps: Vec<Strng>,
	pub method: Option<Strng>,
	pub headers: Vec<(Strng, Strng)>,
	pub header_regexps: Vec<(Strng, Strng)>,
	pub shunt: bool,
}

impl Route {
	/// Construct a route, generating a fresh id if `id` is empty rather
	/// than leaving the route anonymous.
	pub fn with_id(id: impl Into<Strng>, backend: BackendType) -> Self {
		let id = id.into();
		let id = if id.is_empty() { crate::generate_route_id() } else { id };
		Self::new(id, backend)
	}

	pub fn new(id: impl Into<Strng>, backend: BackendType) -> Self {
		Self {
			id: id.into(),
			predicates: Vec::new(),
			filters: Vec::new(),
			backend,
			path: None,
			host_regexps: Vec::new(),
			path_regexps: Vec::new(),
			method: None,
			headers: Vec::new(),
			header_regexps: Vec::new(),
			shunt: false,
		}
	}

	/// True once every shorthand field has been folded away (or was never
	/// populated to begin with).
	pub fn is_canonical_shape(&self) -> bool {
		self.path.is_none()
			&& self.host_regexps.is_empty()
			&& self.path_regexps.is_empty()
			&& self.method.is_none()
			&& self.headers.is_empty()
			&& self.header_regexps.is_empty()
			&& !self.shunt
	}

	/// Insert `predicate` at the front of the predicate list, after
	/// validating the cross-predicate invariants on the list that would
	/// result. On failure the route's predicates are left unchanged.
	pub fn prepend_predicate(&mut self, predicate: Predicate) -> crate::error::Result<()> {
		let mut next = self.predicates.clone();
		next.insert(0, predicate);
		crate::validate::validate_predicates(&next)?;
		self.predicates = next;
		Ok(())
	}

	/// Append `predicate` to the predicate list, after validating the
	/// resulting list.
	pub fn append_predicate(&mut self, predicate: Predicate) -> crate::error::Result<()> {
		let mut next = self.predicates.clone();
		next.push(predicate);
		crate::validate::validate_predicates(&next)?;
		self.predicates = next;
		Ok(())
	}

	/// Replace the whole predicate list, after validating it.
	pub fn replace_predicates(&mut self, predicates: Vec<Predicate>) -> crate::error::Result<()> {
		crate::validate::validate_predicates(&predicates)?;
		self.predicates = predicates;
		Ok(())
	}
}

pub type RouteList = Vec<Route>;

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::RdlError;

	fn predicate(name: &str) -> Predicate {
		Predicate::new(name, vec![Arg::String("x".into())])
	}

	#[test]
	fn with_id_generates_a_fresh_id_when_empty() {
		let r = Route::with_id("", BackendType::Shunt);
		assert!(r.id.starts_with("route"));
	}

	#[test]
	fn with_id_keeps_a_supplied_id() {
		let r = Route::with_id("mine", BackendType::Shunt);
		assert_eq!(r.id.as_str(), "mine");
	}

	#[test]
	fn append_predicate_rejects_invalid_result_and_leaves_list_unchanged() {
		let mut r = Route::new("r", BackendType::Shunt);
		r.predicates.push(predicate("Weight"));
		let err = r.append_predicate(predicate("Weight")).unwrap_err();
		assert!(matches!(err, RdlError::PredicateValidation(_)));
		assert_eq!(r.predicates.len(), 1);
	}

	#[test]
	fn prepend_predicate_succeeds_and_goes_first() {
		let mut r = Route::new("r", BackendType::Shunt);
		r.predicates.push(predicate("Path"));
		r.prepend_predicate(predicate("Method")).unwrap();
		assert_eq!(r.predicates[0].name.as_str(), "Method");
	}
}
