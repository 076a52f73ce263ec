//! Deep copy. Copying first canonicalizes, then returns a route with
//! fresh predicate/filter/endpoint containers; individual argument
//! values are copied shallowly since every supported [`Arg`] variant is
//! either a scalar or a cheaply-clonable interned string.

use crate::canonical::canonical;
use crate::model::{BackendType, Route, RouteList};

/// Deep-copy a route: canonicalize, then rebuild `predicates`, `filters`,
/// and (for an `LB` backend) `endpoints` as fresh `Vec`s so mutating the
/// copy never aliases the source's containers.
pub fn copy(route: &Route) -> Route {
	let canon = canonical(route);
	Route {
		id: canon.id.clone(),
		predicates: canon.predicates.iter().cloned().collect(),
		filters: canon.filters.iter().cloned().collect(),
		backend: match canon.backend {
			BackendType::LB { algorithm, endpoints } => BackendType::LB {
				algorithm,
				endpoints: endpoints.iter().cloned().collect(),
			},
			other => other,
		},
		path: None,
		host_regexps: Vec::new(),
		path_regexps: Vec::new(),
		method: None,
		headers: Vec::new(),
		header_regexps: Vec::new(),
		shunt: false,
	}
}

pub fn copy_list(routes: &RouteList) -> RouteList {
	routes.iter().map(copy).collect()
}
