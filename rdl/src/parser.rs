//! Grammar-driven parser: token stream → [`ParsedRoute`]s.
//!
//! `ParsedRoute` is internal: it is produced here, consumed once by
//! [`crate::apply::apply`], and never escapes this crate's boundary in
//! that shape.

use agent_core::prelude::Strng;

use crate::error::{Position, RdlError};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::model::{Arg, Filter, LBEndpoint};

#[derive(Debug, Clone)]
pub(crate) struct Matcher {
	pub name: Strng,
	pub args: Vec<Arg>,
}

#[derive(Debug, Clone)]
pub(crate) enum ParsedBackend {
	Network(Strng),
	Shunt,
	Loopback,
	Dynamic,
	LB(Strng, Vec<LBEndpoint>),
}

#[derive(Debug, Clone)]
pub(crate) struct ParsedRoute {
	pub id: Strng,
	pub matchers: Vec<Matcher>,
	pub filters: Vec<Filter>,
	pub backend: ParsedBackend,
}

struct Cursor<'a> {
	toks: &'a [Token],
	pos: usize,
}

impl<'a> Cursor<'a> {
	fn peek(&self) -> &Token {
		&self.toks[self.pos.min(self.toks.len() - 1)]
	}

	fn advance(&mut self) -> Token {
		let t = self.peek().clone();
		if self.pos < self.toks.len() - 1 {
			self.pos += 1;
		}
		t
	}

	fn expect(&mut self, kind: TokenKind) -> Result<Token, RdlError> {
		if self.peek().kind == kind {
			Ok(self.advance())
		} else {
			Err(RdlError::Parse(
				self.peek().pos,
				format!("expected {kind:?}, found {:?}", self.peek().kind),
			))
		}
	}

	fn parse_document(&mut self) -> Result<Vec<ParsedRoute>, RdlError> {
		let mut routes = Vec::new();
		loop {
			if self.peek().kind == TokenKind::Eof {
				break;
			}
			let id = self.parse_optional_id()?;
			let mut route = self.parse_route()?;
			route.id = id;
			routes.push(route);
			if self.peek().kind == TokenKind::Semicolon {
				self.advance();
				continue;
			}
			break;
		}
		self.expect(TokenKind::Eof)?;
		Ok(routes)
	}

	fn parse_optional_id(&mut self) -> Result<Strng, RdlError> {
		if let TokenKind::Identifier(name) = &self.peek().kind {
			let next_is_colon = matches!(
				self.toks.get(self.pos + 1).map(|t| &t.kind),
				Some(TokenKind::Colon)
			);
			if next_is_colon {
				let name = name.clone();
				self.advance();
				self.advance();
				return Ok(name);
			}
		}
		Ok(Strng::from(""))
	}

	fn parse_route(&mut self) -> Result<ParsedRoute, RdlError> {
		let matchers = self.parse_frontend()?;
		self.expect(TokenKind::Arrow)?;
		let mut filters = Vec::new();
		loop {
			match self.peek().kind.clone() {
				TokenKind::String(_) | TokenKind::LAngle => {
					let backend = self.parse_backend()?;
					return Ok(ParsedRoute {
						id: Strng::from(""),
						matchers,
						filters,
						backend,
					});
				},
				TokenKind::Identifier(_) => {
					filters.push(self.parse_call()?);
					self.expect(TokenKind::Arrow)?;
				},
				_ => {
					return Err(RdlError::Parse(
						self.peek().pos,
						format!("expected filter or backend, found {:?}", self.peek().kind),
					));
				},
			}
		}
	}

	fn parse_frontend(&mut self) -> Result<Vec<Matcher>, RdlError> {
		let mut out = Vec::new();
		loop {
			out.push(self.parse_matcher()?);
			if self.peek().kind == TokenKind::And {
				self.advance();
				continue;
			}
			break;
		}
		Ok(out)
	}

	fn parse_matcher(&mut self) -> Result<Matcher, RdlError> {
		if self.peek().kind == TokenKind::Star {
			self.advance();
			return Ok(Matcher {
				name: Strng::from("*"),
				args: Vec::new(),
			});
		}
		let call = self.parse_call()?;
		Ok(Matcher {
			name: call.name,
			args: call.args,
		})
	}

	/// A `name(args)` call, shared shape for matchers and filters.
	fn parse_call(&mut self) -> Result<Filter, RdlError> {
		let name = match self.peek().kind.clone() {
			TokenKind::Identifier(name) => {
				self.advance();
				name
			},
			_ => {
				return Err(RdlError::Parse(
					self.peek().pos,
					format!("expected identifier, found {:?}", self.peek().kind),
				));
			},
		};
		self.expect(TokenKind::OpenParen)?;
		let args = self.parse_args()?;
		self.expect(TokenKind::CloseParen)?;
		Ok(Filter { name, args })
	}

	fn parse_args(&mut self) -> Result<Vec<Arg>, RdlError> {
		let mut out = Vec::new();
		if self.peek().kind == TokenKind::CloseParen {
			return Ok(out);
		}
		loop {
			out.push(self.parse_arg()?);
			if self.peek().kind == TokenKind::Comma {
				self.advance();
				continue;
			}
			break;
		}
		Ok(out)
	}

	fn parse_arg(&mut self) -> Result<Arg, RdlError> {
		let tok = self.peek().clone();
		match tok.kind {
			TokenKind::Number(raw) => {
				self.advance();
				let n: f64 = raw
					.parse()
					.map_err(|_| RdlError::Parse(tok.pos, format!("invalid number: {raw}")))?;
				Ok(Arg::Number(n))
			},
			TokenKind::String(s) => {
				self.advance();
				Ok(Arg::String(s))
			},
			TokenKind::Regex(s) => {
				self.advance();
				Ok(Arg::Regex(s))
			},
			other => Err(RdlError::Parse(
				tok.pos,
				format!("expected argument, found {other:?}"),
			)),
		}
	}

	fn parse_backend(&mut self) -> Result<ParsedBackend, RdlError> {
		match self.peek().kind.clone() {
			TokenKind::String(s) => {
				self.advance();
				Ok(ParsedBackend::Network(s))
			},
			TokenKind::LAngle => {
				self.advance();
				if let TokenKind::Identifier(name) = self.peek().kind.clone() {
					if matches!(name.as_str(), "shunt" | "loopback" | "dynamic") {
						let save = self.pos;
						self.advance();
						if self.peek().kind == TokenKind::RAngle {
							self.advance();
							return Ok(match name.as_str() {
								"shunt" => ParsedBackend::Shunt,
								"loopback" => ParsedBackend::Loopback,
								"dynamic" => ParsedBackend::Dynamic,
								_ => unreachable!(),
							});
						}
						self.pos = save;
					}
				}
				self.parse_lb_backend()
			},
			other => Err(RdlError::Parse(
				self.peek().pos,
				format!("expected backend, found {other:?}"),
			)),
		}
	}

	fn parse_lb_backend(&mut self) -> Result<ParsedBackend, RdlError> {
		let mut algorithm = Strng::from("");
		if let TokenKind::Identifier(name) = self.peek().kind.clone() {
			algorithm = name;
			self.advance();
			if self.peek().kind == TokenKind::Comma {
				self.advance();
			}
		}
		let mut endpoints = Vec::new();
		loop {
			match self.peek().kind.clone() {
				TokenKind::String(addr) => {
					self.advance();
					endpoints.push(LBEndpoint::new(addr, None));
					if self.peek().kind == TokenKind::Comma {
						self.advance();
						continue;
					}
					break;
				},
				TokenKind::RAngle => break,
				other => {
					return Err(RdlError::Parse(
						self.peek().pos,
						format!("expected endpoint or '>', found {other:?}"),
					));
				},
			}
		}
		self.expect(TokenKind::RAngle)?;
		Ok(ParsedBackend::LB(algorithm, endpoints))
	}
}

pub(crate) fn parse_to_parsed_routes(text: &str) -> Result<Vec<ParsedRoute>, RdlError> {
	let toks = Lexer::new(text).tokenize()?;
	let mut cur = Cursor { toks: &toks, pos: 0 };
	cur.parse_document()
}

/// Parse RDL source into a route list. This runs the full pipeline:
/// lexer → parser → predicate applier. The result is
/// in *pre-canonical* shape — call [`crate::canonical::canonical_list`]
/// to fold shorthand fields.
pub fn parse(text: &str) -> Result<Vec<crate::model::Route>, RdlError> {
	let start = std::time::Instant::now();
	let parsed = parse_to_parsed_routes(text)?;
	let routes: Result<Vec<_>, _> = parsed.into_iter().map(crate::apply::apply).collect();
	tracing::debug!(
		routes = routes.as_ref().map(Vec::len).unwrap_or(0),
		elapsed = ?start.elapsed(),
		"parsed route document"
	);
	routes
}

/// Parse a bare filter chain, with no predicates and no backend, by
/// wrapping it as `* -> <chain> -> <shunt>` and reusing the route
/// grammar.
pub fn parse_filters(text: &str) -> Result<Vec<Filter>, RdlError> {
	let wrapped = format!("* -> {text} -> <shunt>");
	let parsed = parse_to_parsed_routes(&wrapped)?;
	let route = parsed
		.into_iter()
		.next()
		.ok_or_else(|| RdlError::Parse(Position::default(), "empty filter chain".to_string()))?;
	Ok(route.filters)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_shorthand_route() {
		let routes =
			parse(r#"r: Method("GET") && Path("/foo") -> setPath("/bar") -> "https://upstream";"#)
				.unwrap();
		assert_eq!(routes.len(), 1);
		let r = &routes[0];
		assert_eq!(r.id.as_str(), "r");
		assert_eq!(r.method.as_deref(), Some("GET"));
		assert_eq!(r.path.as_deref(), Some("/foo"));
		assert_eq!(r.filters.len(), 1);
		assert_eq!(r.filters[0].name.as_str(), "setPath");
	}

	#[test]
	fn parses_anonymous_wildcard_route() {
		let routes = parse(r#"* -> "https://u";"#).unwrap();
		assert_eq!(routes.len(), 1);
		assert_eq!(routes[0].id.as_str(), "");
		assert!(routes[0].predicates.is_empty());
	}

	#[test]
	fn parses_lb_backend() {
		let routes = parse(r#"r: * -> <roundRobin, "http://b", "http://a">;"#).unwrap();
		let crate::model::BackendType::LB { algorithm, endpoints } = &routes[0].backend else {
			panic!("expected lb backend")
		};
		assert_eq!(algorithm.as_str(), "roundRobin");
		assert_eq!(endpoints.len(), 2);
	}

	#[test]
	fn parse_filters_wraps_chain() {
		let filters = parse_filters(r#"setPath("/x") -> setQuery("a", "b")"#).unwrap();
		assert_eq!(filters.len(), 2);
		assert_eq!(filters[0].name.as_str(), "setPath");
		assert_eq!(filters[1].name.as_str(), "setQuery");
	}

	#[test]
	fn rejects_double_path() {
		let err = parse(r#"Path("/a") && Path("/b") -> "https://u";"#).unwrap_err();
		assert!(matches!(err, RdlError::DuplicatePath));
	}
}
