//! Cross-predicate validation: rules that span more than one predicate
//! in a route and so can't be checked by the predicate applier (which
//! only ever sees one matcher at a time).
//!
//! Exposed standalone (not just wired into the three mutation
//! operations) so callers assembling a route's predicate list by hand
//! can validate before assignment rather than only at mutation time.

use itertools::Itertools;

use crate::error::RdlError;
use crate::model::{Predicate, RouteList};

const SINGLETON_PREDICATES: &[&str] = &["Weight"];
const MUTUALLY_EXCLUSIVE: &[(&str, &str)] = &[("Path", "PathSubtree")];

/// Validate the cross-predicate invariants: at most one `Weight`
/// predicate, and `Path`/`PathSubtree` never both present on the same
/// route. Returns the violating predicate name(s) in the error on
/// failure; the caller's predicate list is left untouched.
pub fn validate_predicates(predicates: &[Predicate]) -> Result<(), RdlError> {
	for name in SINGLETON_PREDICATES {
		let count = predicates.iter().filter(|p| p.name.as_str() == *name).count();
		if count > 1 {
			return Err(RdlError::PredicateValidation(format!(
				"predicate {name} must appear at most once, found {count}"
			)));
		}
	}
	for (a, b) in MUTUALLY_EXCLUSIVE {
		let has_a = predicates.iter().any(|p| p.name.as_str() == *a);
		let has_b = predicates.iter().any(|p| p.name.as_str() == *b);
		if has_a && has_b {
			return Err(RdlError::PredicateValidation(format!(
				"predicates {a} and {b} are mutually exclusive"
			)));
		}
	}
	Ok(())
}

/// Fail fast on a route list carrying duplicate ids, for callers
/// loading a routing table who want a hard error
/// rather than [`crate::equality::equal_list`]'s implicit "never equal
/// to anything" treatment of such a list.
pub fn validate_unique_ids(routes: &RouteList) -> Result<(), RdlError> {
	if let Some(dup) = routes.iter().map(|r| r.id.clone()).duplicates().next() {
		return Err(RdlError::DuplicateRouteId(dup));
	}
	Ok(())
}
