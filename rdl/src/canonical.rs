//! Canonicalizer: folds legacy shorthand fields into a single,
//! stably-sorted predicate list and reshapes the backend into its final
//! tagged-variant form.
//!
//! Canonicalization is idempotent — `canonical(canonical(r)) ==
//! canonical(r)` under [`crate::equality::equal`] — because folding an
//! already-canonical route (whose shorthand fields are all empty) is a
//! no-op past the sort, and the sort itself is stable.

use crate::model::{Arg, BackendType, Predicate, Route, RouteList};

/// Fold a route's shorthand fields into its predicate list, sort the
/// result by predicate name (stable, so authored order survives within
/// a name), and reshape its backend.
///
/// Fold order: carried predicates first, then synthetic `Path`,
/// `Host`*, `PathRegexp`*, `Method` (prepended — see below), `Header`*,
/// `HeaderRegexp`*.
pub fn canonical(route: &Route) -> Route {
	let mut predicates = route.predicates.clone();

	let has_path_predicate = predicates.iter().any(|p| p.name.as_str() == "Path");
	if let Some(path) = &route.path {
		if !has_path_predicate {
			predicates.push(Predicate::new("Path", vec![Arg::String(path.clone())]));
		}
	}
	for host in &route.host_regexps {
		predicates.push(Predicate::new("Host", vec![Arg::Regex(host.clone())]));
	}
	for path_re in &route.path_regexps {
		predicates.push(Predicate::new("PathRegexp", vec![Arg::Regex(path_re.clone())]));
	}
	// The shorthand `method` is prepended, not appended: if the route
	// also carried an explicit `Method` predicate, matching semantics are
	// "last Method predicate wins", so the legacy one must sort/iterate
	// ahead of it.
	if let Some(method) = &route.method {
		if predicates.iter().any(|p| p.name.as_str() == "Method") {
			tracing::warn!("route has both shorthand `method` and an explicit Method predicate; prepending the shorthand to preserve last-wins semantics");
		}
		predicates.insert(0, Predicate::new("Method", vec![Arg::String(method.clone())]));
	}
	for (name, value) in &route.headers {
		predicates.push(Predicate::new(
			"Header",
			vec![Arg::String(name.clone()), Arg::String(value.clone())],
		));
	}
	for (name, value) in &route.header_regexps {
		predicates.push(Predicate::new(
			"HeaderRegexp",
			vec![Arg::String(name.clone()), Arg::Regex(value.clone())],
		));
	}

	predicates.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));

	let backend = canonical_backend(&route.backend, route.shunt);

	Route {
		id: route.id.clone(),
		predicates,
		filters: route.filters.clone(),
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

fn canonical_backend(backend: &BackendType, shunt: bool) -> BackendType {
	match backend {
		BackendType::Network(_addr) if shunt => BackendType::Shunt,
		BackendType::LB { algorithm, endpoints } => {
			let mut endpoints = endpoints.clone();
			endpoints.sort_by(|a, b| a.address.as_str().cmp(b.address.as_str()));
			BackendType::LB {
				algorithm: algorithm.clone(),
				endpoints,
			}
		},
		other => other.clone(),
	}
}

pub fn canonical_list(routes: &RouteList) -> RouteList {
	routes.iter().map(canonical).collect()
}

/// True once a route's shorthand fields are empty and its predicates are
/// sorted by name — used by tests to check idempotence without a full
/// structural comparison.
pub fn is_sorted_by_name(route: &Route) -> bool {
	route
		.predicates
		.windows(2)
		.all(|w| w[0].name.as_str() <= w[1].name.as_str())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::equality::equal;
	use crate::parser::parse;

	fn first(src: &str) -> Route {
		parse(src).unwrap().remove(0)
	}

	#[test]
	fn folds_shorthand_and_sorts_by_name() {
		let r = first(r#"r: Method("GET") && Path("/foo") -> setPath("/bar") -> "https://upstream";"#);
		let c = canonical(&r);
		assert!(c.is_canonical_shape());
		let names: Vec<_> = c.predicates.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, vec!["Method", "Path"]);
	}

	#[test]
	fn is_idempotent() {
		let r = first(r#"r: Host(/example\.org/) && Path("/a") -> "https://u";"#);
		let once = canonical(&r);
		let twice = canonical(&once);
		assert!(equal(&once, &twice));
		assert!(is_sorted_by_name(&twice));
	}

	#[test]
	fn shorthand_method_prepended_ahead_of_explicit() {
		// Simulate a parsed route that (unusually) carries both the
		// shorthand and an explicit Method predicate.
		let mut r = first(r#"r: Method("GET") -> "https://u";"#);
		r.predicates.push(Predicate::new("Method", vec![Arg::String("POST".into())]));
		let c = canonical(&r);
		let methods: Vec<_> = c
			.predicates
			.iter()
			.filter(|p| p.name.as_str() == "Method")
			.collect();
		assert_eq!(methods.len(), 2);
		assert_eq!(methods[0].args[0].as_str(), Some("GET"));
		assert_eq!(methods[1].args[0].as_str(), Some("POST"));
	}

	#[test]
	fn lb_endpoints_sorted_by_address() {
		let r = first(r#"r: * -> <roundRobin, "http://b", "http://a">;"#);
		let c = canonical(&r);
		let BackendType::LB { endpoints, .. } = &c.backend else {
			panic!("expected lb backend")
		};
		assert_eq!(endpoints[0].address.as_str(), "http://a");
		assert_eq!(endpoints[1].address.as_str(), "http://b");
	}

	#[test]
	fn shunt_shorthand_upgrades_network_backend() {
		let mut r = first(r#"r: * -> "https://u";"#);
		r.shunt = true;
		let c = canonical(&r);
		assert_eq!(c.backend, BackendType::Shunt);
	}
}
