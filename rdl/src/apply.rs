//! Predicate applier: folds each parsed matcher into either a shorthand
//! field or the generic predicate list, enforcing the per-route
//! uniqueness rules along the way.

use agent_core::prelude::Strng;

use crate::error::RdlError;
use crate::model::{Arg, BackendType, Predicate, Route};
use crate::parser::{Matcher, ParsedBackend, ParsedRoute};

fn arg_text(arg: &Arg) -> Option<Strng> {
	match arg {
		Arg::String(s) | Arg::Regex(s) => Some(s.clone()),
		_ => None,
	}
}

fn expect_one_string(m: &Matcher) -> Result<Strng, RdlError> {
	if m.args.len() != 1 {
		return Err(RdlError::InvalidPredicateArgCount);
	}
	arg_text(&m.args[0]).ok_or(RdlError::InvalidPredicateArg)
}

fn expect_two_strings(m: &Matcher) -> Result<(Strng, Strng), RdlError> {
	if m.args.len() != 2 {
		return Err(RdlError::InvalidPredicateArgCount);
	}
	let a = arg_text(&m.args[0]).ok_or(RdlError::InvalidPredicateArg)?;
	let b = arg_text(&m.args[1]).ok_or(RdlError::InvalidPredicateArg)?;
	Ok((a, b))
}

pub(crate) fn apply(parsed: ParsedRoute) -> Result<Route, RdlError> {
	let ParsedRoute {
		id,
		matchers,
		filters,
		backend,
	} = parsed;

	let mut predicates = Vec::new();
	let mut path: Option<Strng> = None;
	let mut method: Option<Strng> = None;
	let mut host_regexps = Vec::new();
	let mut path_regexps = Vec::new();
	let mut headers: Vec<(Strng, Strng)> = Vec::new();
	let mut header_regexps: Vec<(Strng, Strng)> = Vec::new();

	for m in matchers {
		match m.name.as_str() {
			"*" | "Any" => continue,
			"Path" => {
				let s = expect_one_string(&m)?;
				if path.is_some() {
					return Err(RdlError::DuplicatePath);
				}
				path = Some(s);
			},
			"Method" => {
				let s = expect_one_string(&m)?;
				if method.is_some() {
					return Err(RdlError::DuplicateMethod);
				}
				method = Some(s);
			},
			"Host" => host_regexps.push(expect_one_string(&m)?),
			"PathRegexp" => path_regexps.push(expect_one_string(&m)?),
			"HeaderRegexp" => header_regexps.push(expect_two_strings(&m)?),
			"Header" => {
				let (name, value) = expect_two_strings(&m)?;
				if headers.iter().any(|(n, _)| *n == name) {
					return Err(RdlError::DuplicateHeader(name));
				}
				headers.push((name, value));
			},
			_ => predicates.push(Predicate {
				name: m.name,
				args: m.args,
			}),
		}
	}

	let (backend_type, shunt) = match backend {
		ParsedBackend::Network(addr) => (BackendType::Network(addr), false),
		ParsedBackend::Shunt => (BackendType::Shunt, true),
		ParsedBackend::Loopback => (BackendType::Loopback, false),
		ParsedBackend::Dynamic => (BackendType::Dynamic, false),
		ParsedBackend::LB(algorithm, endpoints) => (BackendType::LB { algorithm, endpoints }, false),
	};

	Ok(Route {
		id,
		predicates,
		filters,
		backend: backend_type,
		path,
		host_regexps,
		path_regexps,
		method,
		headers,
		header_regexps,
		shunt,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::parse_to_parsed_routes;

	fn applied(src: &str) -> Route {
		let mut routes = parse_to_parsed_routes(src).unwrap();
		apply(routes.remove(0)).unwrap()
	}

	#[test]
	fn wildcard_contributes_nothing() {
		let r = applied("* -> \"https://u\";");
		assert!(r.predicates.is_empty());
		assert!(r.path.is_none());
	}

	#[test]
	fn header_duplicate_name_rejected() {
		let err = crate::parse(r#"Header("H","1") && Header("H","2") -> "https://u";"#).unwrap_err();
		match err {
			RdlError::DuplicateHeader(name) => assert_eq!(name.as_str(), "H"),
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn shunt_backend_sets_legacy_flag() {
		let r = applied("* -> <shunt>;");
		assert!(r.shunt);
		assert_eq!(r.backend, BackendType::Shunt);
	}

	#[test]
	fn unknown_predicate_kept_verbatim() {
		let r = applied(r#"Weight(10) -> "https://u";"#);
		assert_eq!(r.predicates.len(), 1);
		assert_eq!(r.predicates[0].name.as_str(), "Weight");
	}
}
