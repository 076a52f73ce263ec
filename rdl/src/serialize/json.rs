//! Structured interchange serializer: routes ↔ a tagged-backend JSON
//! shape, the machine-friendly counterpart to the text serializer.
//!
//! Only the tagged shape (`{"type": "network", "address": ...}`, etc.)
//! is ever *emitted*. [`unmarshal`] additionally accepts the older
//! "flat fields" shape on ingress — a route object carrying the legacy
//! shorthand fields (`path`, `method`, `hostRegexps`, `pathRegexps`,
//! `headers`, `headerRegexps`, `shunt`) instead of (or alongside)
//! `predicates` — for backward compatibility. It is folded through the
//! same canonicalization used for text parsing, so the two ingestion
//! paths converge on one normalized `Route`.

use serde_json::{Map, Value, json};

use crate::canonical::canonical;
use crate::error::RdlError;
use crate::model::{Arg, BackendType, Filter, LBEndpoint, Predicate, Route, RouteList};

/// The closed set of predicate-argument positions that carry a regex
/// literal — not generalized to any predicate whose name merely
/// contains "Regexp".
fn regex_arg_position(predicate_name: &str) -> Option<usize> {
	match predicate_name {
		"Host" => Some(0),
		"PathRegexp" => Some(0),
		"HeaderRegexp" => Some(1),
		_ => None,
	}
}

fn arg_to_json(arg: &Arg) -> Value {
	match arg {
		Arg::Number(n) => json!(n),
		Arg::Integer(i) => json!(i),
		Arg::String(s) | Arg::Regex(s) => json!(s.as_str()),
	}
}

fn json_to_arg(value: &Value, is_regex: bool) -> Result<Arg, RdlError> {
	match value {
		Value::String(s) => Ok(if is_regex {
			Arg::Regex(s.as_str().into())
		} else {
			Arg::String(s.as_str().into())
		}),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				Ok(Arg::Integer(i))
			} else if let Some(f) = n.as_f64() {
				Ok(Arg::Number(f))
			} else {
				Err(RdlError::Json(format!("unsupported numeric argument: {n}")))
			}
		},
		other => Err(RdlError::Json(format!("unsupported argument value: {other}"))),
	}
}

fn call_to_json(name: &str, args: &[Arg]) -> Value {
	json!({
		"name": name,
		"args": args.iter().map(arg_to_json).collect::<Vec<_>>(),
	})
}

fn predicate_from_json(value: &Value) -> Result<Predicate, RdlError> {
	let obj = value
		.as_object()
		.ok_or_else(|| RdlError::Json("predicate must be an object".to_string()))?;
	let name = obj
		.get("name")
		.and_then(Value::as_str)
		.ok_or_else(|| RdlError::Json("predicate missing \"name\"".to_string()))?;
	let regex_pos = regex_arg_position(name);
	let args = obj
		.get("args")
		.and_then(Value::as_array)
		.map(|arr| {
			arr
				.iter()
				.enumerate()
				.map(|(i, v)| json_to_arg(v, regex_pos == Some(i)))
				.collect::<Result<Vec<_>, _>>()
		})
		.transpose()?
		.unwrap_or_default();
	Ok(Predicate::new(name, args))
}

fn filter_from_json(value: &Value) -> Result<Filter, RdlError> {
	let obj = value
		.as_object()
		.ok_or_else(|| RdlError::Json("filter must be an object".to_string()))?;
	let name = obj
		.get("name")
		.and_then(Value::as_str)
		.ok_or_else(|| RdlError::Json("filter missing \"name\"".to_string()))?;
	let args = obj
		.get("args")
		.and_then(Value::as_array)
		.map(|arr| arr.iter().map(|v| json_to_arg(v, false)).collect::<Result<Vec<_>, _>>())
		.transpose()?
		.unwrap_or_default();
	Ok(Filter::new(name, args))
}

fn backend_to_json(backend: &BackendType) -> Value {
	match backend {
		BackendType::Network(addr) => json!({"type": "network", "address": addr.as_str()}),
		BackendType::Shunt => json!({"type": "shunt"}),
		BackendType::Loopback => json!({"type": "loopback"}),
		BackendType::Dynamic => json!({"type": "dynamic"}),
		BackendType::LB { algorithm, endpoints } => json!({
			"type": "lb",
			"algorithm": algorithm.as_str(),
			"endpoints": endpoints.iter().map(|e| e.address.as_str()).collect::<Vec<_>>(),
		}),
	}
}

fn backend_from_json(value: &Value) -> Result<BackendType, RdlError> {
	let obj = value
		.as_object()
		.ok_or_else(|| RdlError::Json("backend must be an object".to_string()))?;
	let ty = obj
		.get("type")
		.and_then(Value::as_str)
		.ok_or_else(|| RdlError::Json("backend missing \"type\"".to_string()))?;
	match ty {
		"network" => {
			let address = obj
				.get("address")
				.and_then(Value::as_str)
				.ok_or_else(|| RdlError::Json("network backend missing \"address\"".to_string()))?;
			Ok(BackendType::Network(address.into()))
		},
		"shunt" => Ok(BackendType::Shunt),
		"loopback" => Ok(BackendType::Loopback),
		"dynamic" => Ok(BackendType::Dynamic),
		"lb" => {
			let algorithm = obj.get("algorithm").and_then(Value::as_str).unwrap_or("");
			let endpoints = obj
				.get("endpoints")
				.and_then(Value::as_array)
				.map(|arr| {
					arr
						.iter()
						.map(|v| {
							v.as_str()
								.map(|s| LBEndpoint::new(s, None))
								.ok_or_else(|| RdlError::Json("lb endpoint must be a string".to_string()))
						})
						.collect::<Result<Vec<_>, _>>()
				})
				.transpose()?
				.unwrap_or_default();
			Ok(BackendType::LB {
				algorithm: algorithm.into(),
				endpoints,
			})
		},
		other => Err(RdlError::UnknownBackendType(other.to_string())),
	}
}

fn string_array(obj: &Map<String, Value>, key: &str) -> Vec<String> {
	obj
		.get(key)
		.and_then(Value::as_array)
		.map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
		.unwrap_or_default()
}

/// Marshal a single route to the tagged-backend structured form. The
/// route is canonicalized first, so shorthand fields never appear in
/// the output, matching the text serializer's behavior.
pub fn marshal(route: &Route) -> Value {
	let canon = canonical(route);
	json!({
		"id": canon.id.as_str(),
		"backend": backend_to_json(&canon.backend),
		"predicates": canon.predicates.iter().map(|p| call_to_json(p.name.as_str(), &p.args)).collect::<Vec<_>>(),
		"filters": canon.filters.iter().map(|f| call_to_json(f.name.as_str(), &f.args)).collect::<Vec<_>>(),
	})
}

pub fn marshal_list(routes: &RouteList) -> Value {
	Value::Array(routes.iter().map(marshal).collect())
}

/// Unmarshal a single route from either the tagged-backend shape or the
/// legacy flat-fields shape (see module docs). Malformed input raises
/// [`RdlError::Json`]; an unrecognized `backend.type` raises
/// [`RdlError::UnknownBackendType`].
pub fn unmarshal(value: &Value) -> Result<Route, RdlError> {
	let obj = value
		.as_object()
		.ok_or_else(|| RdlError::Json("route must be an object".to_string()))?;

	let id = obj.get("id").and_then(Value::as_str).unwrap_or("").to_string();

	let predicates = obj
		.get("predicates")
		.and_then(Value::as_array)
		.map(|arr| arr.iter().map(predicate_from_json).collect::<Result<Vec<_>, _>>())
		.transpose()?
		.unwrap_or_default();

	let filters = obj
		.get("filters")
		.and_then(Value::as_array)
		.map(|arr| arr.iter().map(filter_from_json).collect::<Result<Vec<_>, _>>())
		.transpose()?
		.unwrap_or_default();

	let backend = obj
		.get("backend")
		.map(backend_from_json)
		.transpose()?
		.unwrap_or(BackendType::Shunt);

	let path = obj.get("path").and_then(Value::as_str).map(str::to_string);
	let method = obj.get("method").and_then(Value::as_str).map(str::to_string);
	let host_regexps = string_array(obj, "hostRegexps");
	let path_regexps = string_array(obj, "pathRegexps");
	let headers = obj
		.get("headers")
		.and_then(Value::as_object)
		.map(|m| {
			m.iter()
				.filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
				.collect::<Vec<_>>()
		})
		.unwrap_or_default();
	let header_regexps = obj
		.get("headerRegexps")
		.and_then(Value::as_object)
		.map(|m| {
			m.iter()
				.flat_map(|(k, v)| {
					v.as_array()
						.map(|arr| {
							arr
								.iter()
								.filter_map(|v| v.as_str().map(|v| (k.clone(), v.to_string())))
								.collect::<Vec<_>>()
						})
						.unwrap_or_default()
				})
				.collect::<Vec<_>>()
		})
		.unwrap_or_default();
	let shunt = obj.get("shunt").and_then(Value::as_bool).unwrap_or(false);

	// Legacy ingress carries `shunt` as an independent boolean flag
	// alongside the tagged backend, so the two can disagree in a way the
	// grammar (whose backend is a single-variant token) never allows.
	if shunt && matches!(&backend, BackendType::Loopback | BackendType::Dynamic) {
		return Err(RdlError::InvalidBackend);
	}

	let mut route = Route::new(id, backend);
	route.predicates = predicates;
	route.filters = filters;
	route.path = path.map(Into::into);
	route.method = method.map(Into::into);
	route.host_regexps = host_regexps.into_iter().map(Into::into).collect();
	route.path_regexps = path_regexps.into_iter().map(Into::into).collect();
	route.headers = headers.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
	route.header_regexps = header_regexps.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
	route.shunt = shunt;

	Ok(canonical(&route))
}

pub fn unmarshal_list(value: &Value) -> Result<RouteList, RdlError> {
	let arr = value
		.as_array()
		.ok_or_else(|| RdlError::Json("route list must be an array".to_string()))?;
	arr.iter().map(unmarshal).collect()
}
