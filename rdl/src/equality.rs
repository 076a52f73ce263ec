//! Structural equality: routes and route lists are compared over their
//! *canonical* forms, so a route built from shorthand fields compares
//! equal to one built from the equivalent explicit predicates.

use itertools::Itertools;

use crate::canonical::canonical;
use crate::model::{BackendType, Filter, Predicate, Route, RouteList};

fn predicates_equal(a: &[Predicate], b: &[Predicate]) -> bool {
	a.len() == b.len()
		&& a
			.iter()
			.zip(b.iter())
			.all(|(x, y)| x.name == y.name && x.args == y.args)
}

fn filters_equal(a: &[Filter], b: &[Filter]) -> bool {
	a.len() == b.len()
		&& a
			.iter()
			.zip(b.iter())
			.all(|(x, y)| x.name == y.name && x.args == y.args)
}

fn backends_equal(a: &BackendType, b: &BackendType) -> bool {
	match (a, b) {
		(BackendType::Network(x), BackendType::Network(y)) => x == y,
		(BackendType::Shunt, BackendType::Shunt) => true,
		(BackendType::Loopback, BackendType::Loopback) => true,
		(BackendType::Dynamic, BackendType::Dynamic) => true,
		(
			BackendType::LB {
				algorithm: a1,
				endpoints: e1,
			},
			BackendType::LB {
				algorithm: a2,
				endpoints: e2,
			},
		) => a1 == a2 && e1 == e2,
		_ => false,
	}
}

/// Route equality: both inputs are canonicalized first, then compared
/// on id, predicates, filters, and backend.
pub fn equal(a: &Route, b: &Route) -> bool {
	let (a, b) = (canonical(a), canonical(b));
	a.id == b.id
		&& predicates_equal(&a.predicates, &b.predicates)
		&& filters_equal(&a.filters, &b.filters)
		&& backends_equal(&a.backend, &b.backend)
}

/// List equality: both lists are sorted by id first, so member order is
/// irrelevant; a list containing two members with the same id never
/// compares equal to anything, including itself.
pub fn equal_list(a: &RouteList, b: &RouteList) -> bool {
	if a.len() != b.len() {
		return false;
	}
	if has_duplicate_ids(a) || has_duplicate_ids(b) {
		return false;
	}
	let mut a_sorted: Vec<&Route> = a.iter().collect();
	let mut b_sorted: Vec<&Route> = b.iter().collect();
	a_sorted.sort_by(|x, y| x.id.as_str().cmp(y.id.as_str()));
	b_sorted.sort_by(|x, y| x.id.as_str().cmp(y.id.as_str()));
	a_sorted.into_iter().zip(b_sorted).all(|(x, y)| equal(x, y))
}

fn has_duplicate_ids(routes: &RouteList) -> bool {
	routes.iter().map(|r| r.id.as_str()).duplicates().next().is_some()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::parse;

	#[test]
	fn shorthand_route_equals_explicit_predicate_route() {
		let shorthand = parse(r#"r: Method("GET") -> "https://u";"#).unwrap().remove(0);
		let explicit = parse(r#"r: Method("GET") -> "https://u";"#).unwrap().remove(0);
		assert!(equal(&shorthand, &explicit));
	}

	#[test]
	fn list_equality_ignores_order_with_unique_ids() {
		let a = parse(r#"a: * -> "https://a"; b: * -> "https://b";"#).unwrap();
		let b = parse(r#"b: * -> "https://b"; a: * -> "https://a";"#).unwrap();
		assert!(equal_list(&a, &b));
	}

	#[test]
	fn list_equality_rejects_duplicate_ids() {
		let dup = parse(r#"a: * -> "https://a"; a: * -> "https://b";"#).unwrap();
		assert!(!equal_list(&dup, &dup));
	}

	#[test]
	fn differing_ids_are_not_equal() {
		let a = parse(r#"a: * -> "https://u";"#).unwrap().remove(0);
		let b = parse(r#"b: * -> "https://u";"#).unwrap().remove(0);
		assert!(!equal(&a, &b));
	}
}
