//! Tokenizer for RDL source text.
//!
//! The lexer is deliberately permissive about numbers — it just grabs a
//! maximal run of sign/digit/dot characters and hands the raw text to
//! the parser, which does the actual `f64` parse: lexer permissive,
//! parser re-parses.

use agent_core::prelude::Strng;

use crate::error::{Position, RdlError};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
	Identifier(Strng),
	Number(Strng),
	String(Strng),
	Regex(Strng),
	Arrow,
	And,
	OpenParen,
	CloseParen,
	Comma,
	Colon,
	Semicolon,
	Star,
	LAngle,
	RAngle,
	Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub pos: Position,
}

pub struct Lexer<'a> {
	src: &'a str,
	chars: std::iter::Peekable<std::str::CharIndices<'a>>,
	line: usize,
	col: usize,
}

impl<'a> Lexer<'a> {
	pub fn new(src: &'a str) -> Self {
		Self {
			src,
			chars: src.char_indices().peekable(),
			line: 1,
			col: 1,
		}
	}

	fn pos(&self) -> Position {
		Position {
			line: self.line,
			column: self.col,
		}
	}

	fn bump(&mut self) -> Option<(usize, char)> {
		let next = self.chars.next();
		if let Some((_, c)) = next {
			if c == '\n' {
				self.line += 1;
				self.col = 1;
			} else {
				self.col += 1;
			}
		}
		next
	}

	fn peek_char(&mut self) -> Option<char> {
		self.chars.peek().map(|&(_, c)| c)
	}

	fn skip_trivia(&mut self) {
		loop {
			match self.peek_char() {
				Some(c) if c.is_whitespace() => {
					self.bump();
				},
				Some('/') => {
					let mut ahead = self.chars.clone();
					ahead.next();
					if matches!(ahead.peek(), Some(&(_, '/'))) {
						while let Some(c) = self.peek_char() {
							if c == '\n' {
								break;
							}
							self.bump();
						}
					} else {
						break;
					}
				},
				_ => break,
			}
		}
	}

	/// Tokenize the full input. On a lexical error, returns the token
	/// prefix successfully scanned and the error describing the first
	/// failure — the parser never sees a token it didn't ask for.
	pub fn tokenize(mut self) -> Result<Vec<Token>, RdlError> {
		let mut out = Vec::new();
		loop {
			self.skip_trivia();
			let start_pos = self.pos();
			let Some((byte_idx, c)) = self.chars.peek().copied() else {
				out.push(Token {
					kind: TokenKind::Eof,
					pos: start_pos,
				});
				break;
			};
			let kind = match c {
				'-' => {
					let mut ahead = self.chars.clone();
					ahead.next();
					match ahead.peek() {
						Some(&(_, '>')) => {
							self.bump();
							self.bump();
							TokenKind::Arrow
						},
						Some(&(_, d)) if d.is_ascii_digit() => self.lex_number(start_pos),
						_ => {
							return Err(RdlError::Lexical(start_pos, "expected '->'".to_string()));
						},
					}
				},
				'&' => {
					self.bump();
					if self.peek_char() == Some('&') {
						self.bump();
						TokenKind::And
					} else {
						return Err(RdlError::Lexical(start_pos, "expected '&&'".to_string()));
					}
				},
				'(' => {
					self.bump();
					TokenKind::OpenParen
				},
				')' => {
					self.bump();
					TokenKind::CloseParen
				},
				',' => {
					self.bump();
					TokenKind::Comma
				},
				':' => {
					self.bump();
					TokenKind::Colon
				},
				';' => {
					self.bump();
					TokenKind::Semicolon
				},
				'*' => {
					self.bump();
					TokenKind::Star
				},
				'<' => {
					self.bump();
					TokenKind::LAngle
				},
				'>' => {
					self.bump();
					TokenKind::RAngle
				},
				'"' => self.lex_string(start_pos)?,
				'/' => self.lex_regex(start_pos)?,
				c if c.is_ascii_digit() => self.lex_number(start_pos),
				c if c.is_alphabetic() || c == '_' => self.lex_identifier(start_pos),
				other => {
					return Err(RdlError::Lexical(
						start_pos,
						format!("unexpected character {other:?}"),
					));
				},
			};
			let _ = byte_idx;
			tracing::trace!(?kind, pos = %start_pos, "lexed token");
			out.push(Token {
				kind,
				pos: start_pos,
			});
		}
		Ok(out)
	}

	fn lex_identifier(&mut self, _start: Position) -> TokenKind {
		let mut s = String::new();
		while let Some(c) = self.peek_char() {
			if c.is_alphanumeric() || c == '_' {
				s.push(c);
				self.bump();
			} else {
				break;
			}
		}
		TokenKind::Identifier(Strng::from(s))
	}

	fn lex_number(&mut self, _start: Position) -> TokenKind {
		let mut s = String::new();
		if matches!(self.peek_char(), Some('+') | Some('-')) {
			s.push(self.bump().unwrap().1);
		}
		while let Some(c) = self.peek_char() {
			if c.is_ascii_digit() {
				s.push(c);
				self.bump();
			} else {
				break;
			}
		}
		if self.peek_char() == Some('.') {
			s.push('.');
			self.bump();
			while let Some(c) = self.peek_char() {
				if c.is_ascii_digit() {
					s.push(c);
					self.bump();
				} else {
					break;
				}
			}
		}
		TokenKind::Number(Strng::from(s))
	}

	fn lex_string(&mut self, start: Position) -> Result<TokenKind, RdlError> {
		self.bump(); // opening quote
		let mut s = String::new();
		loop {
			match self.bump() {
				None => return Err(RdlError::Lexical(start, "unterminated string".to_string())),
				Some((_, '"')) => break,
				Some((_, '\\')) => match self.bump() {
					Some((_, '"')) => s.push('"'),
					Some((_, '\\')) => s.push('\\'),
					Some((_, 'n')) => s.push('\n'),
					Some((_, 't')) => s.push('\t'),
					Some((_, 'r')) => s.push('\r'),
					Some((_, 'a')) => s.push('\u{07}'),
					Some((_, 'b')) => s.push('\u{08}'),
					Some((_, 'f')) => s.push('\u{0c}'),
					Some((_, 'v')) => s.push('\u{0b}'),
					Some((_, other)) => s.push(other),
					None => return Err(RdlError::Lexical(start, "unterminated string".to_string())),
				},
				Some((_, c)) => s.push(c),
			}
		}
		Ok(TokenKind::String(Strng::from(s)))
	}

	fn lex_regex(&mut self, start: Position) -> Result<TokenKind, RdlError> {
		self.bump(); // opening '/'
		let mut s = String::new();
		loop {
			match self.bump() {
				None => return Err(RdlError::Lexical(start, "unterminated regex".to_string())),
				Some((_, '/')) => break,
				Some((_, '\\')) => match self.bump() {
					Some((_, '/')) => s.push('/'),
					Some((_, other)) => {
						s.push('\\');
						s.push(other);
					},
					None => return Err(RdlError::Lexical(start, "unterminated regex".to_string())),
				},
				Some((_, c)) => s.push(c),
			}
		}
		Ok(TokenKind::Regex(Strng::from(s)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(src: &str) -> Vec<TokenKind> {
		Lexer::new(src)
			.tokenize()
			.unwrap()
			.into_iter()
			.map(|t| t.kind)
			.collect()
	}

	#[test]
	fn tokenizes_simple_route() {
		let toks = kinds(r#"Path("/foo") -> "https://u""#);
		assert_eq!(
			toks,
			vec![
				TokenKind::Identifier("Path".into()),
				TokenKind::OpenParen,
				TokenKind::String("/foo".into()),
				TokenKind::CloseParen,
				TokenKind::Arrow,
				TokenKind::String("https://u".into()),
				TokenKind::Eof,
			]
		);
	}

	#[test]
	fn strips_line_comments() {
		let toks = kinds("* -> \"u\" // trailing note\n;");
		assert!(matches!(toks[0], TokenKind::Star));
		assert!(toks.iter().any(|k| *k == TokenKind::Semicolon));
	}

	#[test]
	fn regex_unescapes_only_the_delimiter() {
		let toks = kinds(r#"/a\/b\d+/"#);
		assert_eq!(toks[0], TokenKind::Regex(r"a/b\d+".into()));
	}

	#[test]
	fn unterminated_string_is_lexical_error() {
		let err = Lexer::new(r#""abc"#).tokenize().unwrap_err();
		assert!(matches!(err, RdlError::Lexical(_, _)));
	}

	#[test]
	fn string_unescapes_control_characters() {
		let toks = kinds(r#""\a\b\f\n\r\t\v""#);
		assert_eq!(
			toks[0],
			TokenKind::String("\u{07}\u{08}\u{0c}\n\r\t\u{0b}".into())
		);
	}
}
