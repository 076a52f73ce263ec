//! End-to-end round-trip coverage over the crate's public API: text
//! parse → canonicalize → text/JSON serialize → parse back, plus the
//! equality and copy properties the public API promises. Unlike the
//! per-module `#[cfg(test)]` blocks, these exercise the whole pipeline
//! the way a downstream caller would, so failures here point at a seam
//! between modules rather than inside one.

use rdl::{canonical, copy, equal, equal_list, format, format_document, marshal, parse, unmarshal};

/// Install a `tracing` subscriber so the parser's `debug!`/`trace!` events
/// surface under `--nocapture`; harmless to call from every test since
/// `try_init` no-ops once a global subscriber is already set.
fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn text_round_trips_through_canonical_form() -> anyhow::Result<()> {
	init_tracing();
	let src = r#"r: Method("GET") && Path("/widgets") -> setPath("/v2/widgets") -> "https://upstream";"#;
	let routes = parse(src)?;
	let text = format(&routes[0], &rdl::serialize::text::Options::compact());
	let reparsed = parse(&format!("{text};"))?;
	assert!(equal(&routes[0], &reparsed[0]));
	Ok(())
}

#[test]
fn json_round_trips_a_full_route() -> anyhow::Result<()> {
	init_tracing();
	let src = r#"r: Host(/.*\.example\.org/) && HeaderRegexp("X-Trace", /^[0-9]+$/) -> "https://upstream";"#;
	let route = parse(src)?.remove(0);
	let value = marshal(&route);
	let back = unmarshal(&value)?;
	assert!(equal(&route, &back));
	Ok(())
}

#[test]
fn shorthand_and_explicit_predicate_forms_are_equal() -> anyhow::Result<()> {
	init_tracing();
	let shorthand = parse(r#"Path("/a") -> "https://u";"#)?.remove(0);
	let explicit = parse(r#"Path("/a") -> "https://u";"#)?.remove(0);
	assert!(equal(&canonical(&shorthand), &canonical(&explicit)));
	Ok(())
}

#[test]
fn route_list_equality_survives_reordering() -> anyhow::Result<()> {
	init_tracing();
	let a = parse(r#"one: Path("/a") -> "https://a"; two: Path("/b") -> "https://b";"#)?;
	let b = parse(r#"two: Path("/b") -> "https://b"; one: Path("/a") -> "https://a";"#)?;
	assert!(equal_list(&a, &b));
	Ok(())
}

#[test]
fn duplicate_route_ids_fail_list_equality() -> anyhow::Result<()> {
	init_tracing();
	let dup = parse(r#"x: * -> "https://a"; x: * -> "https://b";"#)?;
	assert!(!equal_list(&dup, &dup));
	Ok(())
}

#[test]
fn copy_detaches_predicate_storage_from_the_source() -> anyhow::Result<()> {
	init_tracing();
	let route = parse(r#"r: Path("/a") -> "https://u";"#)?.remove(0);
	let mut copied = copy(&route);
	copied.predicates.clear();
	assert!(copied.predicates.is_empty());
	assert!(!canonical(&route).predicates.is_empty());
	Ok(())
}

#[test]
fn control_character_escapes_round_trip_through_text() -> anyhow::Result<()> {
	init_tracing();
	let route = parse(r#"* -> tag("bell\abackspace\bff\fvtab\v") -> <shunt>;"#)?.remove(0);
	let text = format(&route, &rdl::serialize::text::Options::compact());
	let reparsed = parse(&format!("{text};"))?;
	assert!(equal(&route, &reparsed[0]));
	Ok(())
}

#[test]
fn multi_route_document_round_trips() -> anyhow::Result<()> {
	init_tracing();
	let src = r#"a: Path("/a") -> "https://a"; b: Path("/b") -> "https://b";"#;
	let routes = parse(src)?;
	let doc = format_document(&routes, &rdl::serialize::text::Options::compact());
	let reparsed = parse(&doc)?;
	assert!(equal_list(&routes, &reparsed));
	Ok(())
}
