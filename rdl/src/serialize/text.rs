//! RDL text serializer: routes → RDL source, in compact or pretty
//! presentation.

use crate::canonical::canonical;
use crate::model::{Arg, BackendType, Filter, Predicate, Route};

/// Presentation options for the text serializer. The crate's only
/// "configuration" surface — there is no global config file, just this
/// small per-call struct, the same shape as a per-call policy struct
/// (`http::retry::Policy`, `http::timeout::Policy`).
#[derive(Debug, Clone)]
pub struct Options {
	pub pretty: bool,
	pub indent: String,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			pretty: false,
			indent: "  ".to_string(),
		}
	}
}

impl Options {
	pub fn compact() -> Self {
		Self::default()
	}

	pub fn pretty() -> Self {
		Self {
			pretty: true,
			indent: "  ".to_string(),
		}
	}
}

fn escape_string(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('"');
	for c in s.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\u{07}' => out.push_str("\\a"),
			'\u{08}' => out.push_str("\\b"),
			'\u{0c}' => out.push_str("\\f"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			'\u{0b}' => out.push_str("\\v"),
			c => out.push(c),
		}
	}
	out.push('"');
	out
}

fn escape_regex(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('/');
	for c in s.chars() {
		if c == '/' {
			out.push('\\');
		}
		out.push(c);
	}
	out.push('/');
	out
}

fn format_number(n: f64) -> String {
	if n.fract() == 0.0 && n.is_finite() {
		format!("{}", n as i64)
	} else {
		format!("{n}")
	}
}

fn format_arg(arg: &Arg) -> String {
	match arg {
		Arg::Number(n) => format_number(*n),
		Arg::Integer(i) => i.to_string(),
		Arg::String(s) => escape_string(s.as_str()),
		Arg::Regex(s) => escape_regex(s.as_str()),
	}
}

fn format_call(name: &str, args: &[Arg]) -> String {
	let args = args.iter().map(format_arg).collect::<Vec<_>>().join(", ");
	format!("{name}({args})")
}

fn format_predicate(p: &Predicate) -> String {
	format_call(p.name.as_str(), &p.args)
}

fn format_filter(f: &Filter) -> String {
	format_call(f.name.as_str(), &f.args)
}

fn format_backend(backend: &BackendType) -> String {
	match backend {
		BackendType::Network(addr) => escape_string(addr.as_str()),
		BackendType::Shunt => "<shunt>".to_string(),
		BackendType::Loopback => "<loopback>".to_string(),
		BackendType::Dynamic => "<dynamic>".to_string(),
		BackendType::LB { algorithm, endpoints } => {
			let eps = endpoints
				.iter()
				.map(|e| escape_string(e.address.as_str()))
				.collect::<Vec<_>>()
				.join(", ");
			if algorithm.is_empty() {
				format!("<{eps}>")
			} else {
				format!("<{algorithm}, {eps}>")
			}
		},
	}
}

fn format_frontend(predicates: &[Predicate]) -> String {
	if predicates.is_empty() {
		"*".to_string()
	} else {
		predicates.iter().map(format_predicate).collect::<Vec<_>>().join(" && ")
	}
}

/// Render a single route. The input is canonicalized first, so
/// shorthand fields are folded into the predicate list regardless of
/// the route's incoming shape.
pub fn format(route: &Route, opts: &Options) -> String {
	let canon = canonical(route);
	let mut segments = vec![format_frontend(&canon.predicates)];
	segments.extend(canon.filters.iter().map(format_filter));
	segments.push(format_backend(&canon.backend));
	let arrow = if opts.pretty {
		format!("\n{}-> ", opts.indent)
	} else {
		" -> ".to_string()
	};
	segments.join(&arrow)
}

fn format_definition(route: &Route, opts: &Options) -> String {
	let body = format(route, opts);
	if route.id.is_empty() {
		format!("{body};")
	} else {
		format!("{}: {body};", route.id)
	}
}

/// Render a document of one or more routes. A single route with no id
/// is rendered as a bare expression (no
/// `id:` prefix, no trailing `;`); anything else is rendered as one
/// `id: expression;` definition per route.
pub fn format_document(routes: &[Route], opts: &Options) -> String {
	if routes.len() == 1 && routes[0].id.is_empty() {
		return format(&routes[0], opts);
	}
	let sep = if opts.pretty { "\n\n" } else { "\n" };
	routes
		.iter()
		.map(|r| format_definition(r, opts))
		.collect::<Vec<_>>()
		.join(sep)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::parse;

	#[test]
	fn wildcard_route_serializes_as_star() {
		let r = parse(r#"Any() -> "https://u";"#).unwrap().remove(0);
		assert_eq!(format(&r, &Options::compact()), r#"* -> "https://u""#);
	}

	#[test]
	fn float_without_fraction_drops_decimal_point() {
		let r = parse(r#"* -> setWeight(3.0) -> <shunt>;"#).unwrap().remove(0);
		let text = format(&r, &Options::compact());
		assert_eq!(text, r#"* -> setWeight(3) -> <shunt>"#);
		let reparsed = parse(&format!("{text};")).unwrap().remove(0);
		assert_eq!(reparsed.filters[0].args[0], Arg::Number(3.0));
	}

	#[test]
	fn lb_backend_round_trips_sorted() {
		let r = parse(r#"r: * -> <roundRobin, "http://b", "http://a">;"#)
			.unwrap()
			.remove(0);
		let text = format(&r, &Options::compact());
		assert_eq!(text, r#"r: * -> <roundRobin, "http://a", "http://b">;"#);
	}

	#[test]
	fn pretty_mode_puts_each_arrow_on_its_own_line() {
		let r = parse(r#"* -> setPath("/a") -> setQuery("x", "y") -> "https://u";"#)
			.unwrap()
			.remove(0);
		let text = format(&r, &Options::pretty());
		assert_eq!(
			text,
			"*\n  -> setPath(\"/a\")\n  -> setQuery(\"x\", \"y\")\n  -> \"https://u\""
		);
	}

	#[test]
	fn document_of_single_anonymous_route_has_no_id_prefix() {
		let routes = parse(r#"* -> "https://u";"#).unwrap();
		assert_eq!(
			format_document(&routes, &Options::compact()),
			r#"* -> "https://u""#
		);
	}

	#[test]
	fn document_of_named_routes_joins_definitions() {
		let routes = parse(r#"a: * -> "https://a"; b: * -> "https://b";"#).unwrap();
		assert_eq!(
			format_document(&routes, &Options::compact()),
			"a: * -> \"https://a\";\nb: * -> \"https://b\";"
		);
	}

	#[test]
	fn string_escapes_control_characters() {
		let arg = Arg::String("line1\nline2\ttab\"quote".into());
		assert_eq!(format_arg(&arg), r#""line1\nline2\ttab\"quote""#);
	}

	#[test]
	fn regex_escapes_only_the_delimiter() {
		let arg = Arg::Regex(r"a/b\d+".into());
		assert_eq!(format_arg(&arg), r#"/a\/b\d+/"#);
	}

	#[test]
	fn shorthand_route_serializes_through_canonical_form() {
		let r = parse(r#"r: Method("GET") && Path("/foo") -> "https://u";"#)
			.unwrap()
			.remove(0);
		assert_eq!(
			format(&r, &Options::compact()),
			r#"Method("GET") && Path("/foo") -> "https://u""#
		);
	}
}
