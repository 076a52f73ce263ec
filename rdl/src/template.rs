//! Context-aware template expander: `${key}` substitution over
//! route-literal strings (e.g. a filter's `setPath` argument), either
//! from a caller-supplied getter or from a structured per-request
//! context.
//!
//! A compiled [`Template`] is immutable and shareable across threads;
//! expansion state lives entirely in the call.

use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
	Literal(String),
	Placeholder(String),
}

/// A `${...}`-substitution template compiled once and applied many
/// times. See [`compile_template`].
#[derive(Debug, Clone)]
pub struct Template {
	segments: Vec<Segment>,
}

/// Compile `text` into a [`Template`]. `${key}` opens a placeholder that
/// runs to the next `}`; an unterminated `${` is left as literal text
/// verbatim — malformed templates fail open rather than rejecting route
/// literals at expansion time.
pub fn compile_template(text: &str) -> Template {
	let mut segments = Vec::new();
	let mut literal = String::new();
	let bytes = text.as_bytes();
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
			if let Some(end) = text[i + 2..].find('}') {
				if !literal.is_empty() {
					segments.push(Segment::Literal(std::mem::take(&mut literal)));
				}
				let key = &text[i + 2..i + 2 + end];
				segments.push(Segment::Placeholder(key.to_string()));
				i = i + 2 + end + 1;
				continue;
			}
		}
		let ch = text[i..].chars().next().unwrap();
		literal.push(ch);
		i += ch.len_utf8();
	}
	if !literal.is_empty() {
		segments.push(Segment::Literal(literal));
	}
	Template { segments }
}

impl Template {
	/// True if this template contains no `${...}` placeholders at all.
	pub fn is_literal(&self) -> bool {
		!self.segments.iter().any(|s| matches!(s, Segment::Placeholder(_)))
	}

	/// Expand using a getter function. Keys the getter returns `None` for
	/// expand to the empty string; if no getter is supplied at all, every
	/// placeholder is preserved verbatim as `${key}`.
	pub fn apply(&self, getter: Option<&dyn Fn(&str) -> Option<String>>) -> String {
		let mut out = String::new();
		for seg in &self.segments {
			match seg {
				Segment::Literal(s) => out.push_str(s),
				Segment::Placeholder(key) => match getter {
					Some(get) => out.push_str(&get(key).unwrap_or_default()),
					None => {
						out.push_str("${");
						out.push_str(key);
						out.push('}');
					},
				},
			}
		}
		out
	}

	/// Expand against a structured per-request context. Returns `(text,
	/// all_resolved)`: `all_resolved` is `false`
	/// if any referenced key was absent or resolved to the empty string.
	pub fn apply_context(&self, ctx: &RequestContext) -> (String, bool) {
		let mut out = String::new();
		let mut all_resolved = true;
		for seg in &self.segments {
			match seg {
				Segment::Literal(s) => out.push_str(s),
				Segment::Placeholder(key) => {
					let value = ctx.resolve(key);
					if value.as_deref().unwrap_or("").is_empty() {
						all_resolved = false;
					}
					out.push_str(&value.unwrap_or_default());
				},
			}
		}
		(out, all_resolved)
	}
}

/// A single request/response header, cookie, or query parameter entry.
pub type KeyValue = (String, String);

/// The structured per-request context the `request.*`/`response.*` keys
/// resolve against. Every collection is a flat `Vec` of pairs rather
/// than a map, mirroring HTTP's own repeated-key semantics (first match
/// wins).
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	pub method: String,
	pub host: String,
	pub path: String,
	pub raw_query: String,
	pub headers: Vec<KeyValue>,
	pub query: Vec<KeyValue>,
	pub cookies: Vec<KeyValue>,
	/// Forwarding chain as recorded front-to-back (closest-to-client
	/// first), e.g. parsed from `X-Forwarded-For`.
	pub forwarded_chain: Vec<String>,
	/// The immediate peer address (no forwarding headers consulted).
	pub peer_addr: String,
	pub response_headers: Option<Vec<KeyValue>>,
	/// Path parameters captured by the route match, if any.
	pub path_params: Vec<KeyValue>,
}

fn first_value(pairs: &[KeyValue], name: &str, case_insensitive: bool) -> Option<String> {
	pairs
		.iter()
		.find(|(k, _)| {
			if case_insensitive {
				k.eq_ignore_ascii_case(name)
			} else {
				k == name
			}
		})
		.map(|(_, v)| v.clone())
}

/// Whether `addr` should be skipped when walking a forwarding chain —
/// loopback, link-local, and the RFC1918 private ranges. An address that
/// doesn't parse as an IP is treated as non-internal so malformed
/// forwarding headers don't get stuck skipping everything.
fn is_internal_address(addr: &str) -> bool {
	let host = addr.rsplit_once(':').map(|(h, _)| h).unwrap_or(addr);
	let host = host.trim_start_matches('[').trim_end_matches(']');
	match host.parse::<IpAddr>() {
		Ok(IpAddr::V4(v4)) => {
			v4.is_loopback() || v4.is_link_local() || v4.is_private() || v4.is_unspecified()
		},
		Ok(IpAddr::V6(v6)) => v6.is_loopback() || v6.is_unspecified() || (v6.segments()[0] & 0xfe00) == 0xfc00,
		Err(_) => false,
	}
}

impl RequestContext {
	fn source_front_to_back(&self) -> Option<String> {
		self
			.forwarded_chain
			.iter()
			.find(|a| !is_internal_address(a))
			.cloned()
			.or_else(|| Some(self.peer_addr.clone()).filter(|s| !s.is_empty()))
	}

	fn source_back_to_front(&self) -> Option<String> {
		self
			.forwarded_chain
			.iter()
			.rev()
			.find(|a| !is_internal_address(a))
			.cloned()
			.or_else(|| Some(self.peer_addr.clone()).filter(|s| !s.is_empty()))
	}

	fn resolve(&self, key: &str) -> Option<String> {
		match key {
			"request.method" => Some(self.method.clone()),
			"request.host" => Some(self.host.clone()),
			"request.path" => Some(self.path.clone()),
			"request.rawQuery" => Some(self.raw_query.clone()),
			"request.source" => self.source_front_to_back(),
			"request.sourceFromLast" => self.source_back_to_front(),
			"request.clientIP" => Some(self.peer_addr.clone()),
			_ if key.starts_with("request.header.") => {
				let name = &key["request.header.".len()..];
				first_value(&self.headers, name, true)
			},
			_ if key.starts_with("request.query.") => {
				let name = &key["request.query.".len()..];
				first_value(&self.query, name, false)
			},
			_ if key.starts_with("request.cookie.") => {
				let name = &key["request.cookie.".len()..];
				first_value(&self.cookies, name, false)
			},
			_ if key.starts_with("response.header.") => {
				let name = &key["response.header.".len()..];
				self
					.response_headers
					.as_ref()
					.and_then(|headers| first_value(headers, name, true))
			},
			_ => first_value(&self.path_params, key, false),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn literal_template_is_unchanged_with_no_getter() {
		let t = compile_template("hello world");
		assert!(t.is_literal());
		assert_eq!(t.apply(None), "hello world");
	}

	#[test]
	fn placeholder_preserved_verbatim_without_getter() {
		let t = compile_template("hi ${name}!");
		assert_eq!(t.apply(None), "hi ${name}!");
	}

	#[test]
	fn getter_based_expansion_defaults_missing_to_empty() {
		let t = compile_template("hi ${name}!");
		let getter: &dyn Fn(&str) -> Option<String> = &|k: &str| {
			if k == "name" {
				Some("world".to_string())
			} else {
				None
			}
		};
		assert_eq!(t.apply(Some(getter)), "hi world!");
		let t2 = compile_template("hi ${missing}!");
		assert_eq!(t2.apply(Some(getter)), "hi !");
	}

	#[test]
	fn request_context_expansion_reports_all_resolved() {
		let t = compile_template("hello ${request.query.name} ${request.header.X-Foo}");
		let mut ctx = RequestContext {
			query: vec![("name".into(), "world".into())],
			headers: vec![("X-Foo".into(), "bar".into())],
			..Default::default()
		};
		let (text, resolved) = t.apply_context(&ctx);
		assert_eq!(text, "hello world bar");
		assert!(resolved);

		ctx.headers.clear();
		let (text, resolved) = t.apply_context(&ctx);
		assert_eq!(text, "hello world ");
		assert!(!resolved);
	}

	#[test]
	fn path_params_are_the_fallback_key_space() {
		let t = compile_template("${id}");
		let ctx = RequestContext {
			path_params: vec![("id".into(), "42".into())],
			..Default::default()
		};
		let (text, resolved) = t.apply_context(&ctx);
		assert_eq!(text, "42");
		assert!(resolved);
	}

	#[test]
	fn source_skips_private_addresses_front_to_back() {
		let ctx = RequestContext {
			forwarded_chain: vec!["10.0.0.1".into(), "203.0.113.5".into()],
			peer_addr: "10.0.0.254".into(),
			..Default::default()
		};
		assert_eq!(ctx.resolve("request.source").as_deref(), Some("203.0.113.5"));
	}

	#[test]
	fn client_ip_ignores_forwarding_chain() {
		let ctx = RequestContext {
			forwarded_chain: vec!["203.0.113.5".into()],
			peer_addr: "10.0.0.254".into(),
			..Default::default()
		};
		assert_eq!(ctx.resolve("request.clientIP").as_deref(), Some("10.0.0.254"));
	}

	#[test]
	fn response_header_missing_without_response_is_empty() {
		let ctx = RequestContext::default();
		assert_eq!(ctx.resolve("response.header.X-Trace"), None);
	}
}
