//! Argument coercer: a stateful sequential accessor over a
//! predicate/filter's heterogeneous argument vector, used by filter and
//! predicate implementations living outside this crate (this crate only
//! exposes and tests the facility).
//!
//! Every non-optional access advances an internal position counter and,
//! on failure, records a [`CoercionError`] rather than returning early:
//! callers get one aggregated diagnostic from [`ArgReader::err`] instead
//! of bailing on the first bad argument.

use std::time::Duration;

use crate::error::CoercionError;
use crate::model::Arg;

/// Sequential, error-aggregating accessor over a predicate/filter's
/// argument vector. Construct one per use: this type carries mutable
/// position/error state and must not be shared across threads.
pub struct ArgReader<'a> {
	args: &'a [Arg],
	pos: usize,
	non_optional_accesses: usize,
	errors: Vec<CoercionError>,
}

impl<'a> ArgReader<'a> {
	pub fn new(args: &'a [Arg]) -> Self {
		Self {
			args,
			pos: 0,
			non_optional_accesses: 0,
			errors: Vec::new(),
		}
	}

	fn next_arg(&mut self) -> Option<(usize, &'a Arg)> {
		let idx = self.pos;
		let arg = self.args.get(idx);
		self.pos += 1;
		arg.map(|a| (idx, a))
	}

	fn record(&mut self, index: usize, message: impl Into<String>) {
		self.errors.push(CoercionError::at(index, message.into()));
	}

	/// Next argument as a string.
	pub fn string(&mut self) -> String {
		self.non_optional_accesses += 1;
		match self.next_arg() {
			Some((idx, Arg::String(s))) | Some((idx, Arg::Regex(s))) => {
				let _ = idx;
				s.as_str().to_string()
			},
			Some((idx, other)) => {
				self.record(idx, format!("{other:?} is not a string"));
				String::new()
			},
			None => String::new(),
		}
	}

	/// Next argument as an optional string, returning `default` if the
	/// reader is past the end of the argument vector.
	pub fn optional_string(&mut self, default: &str) -> String {
		if self.pos >= self.args.len() {
			self.pos += 1;
			return default.to_string();
		}
		self.string()
	}

	/// Next argument as `f64`; integers widen losslessly.
	pub fn float(&mut self) -> f64 {
		self.non_optional_accesses += 1;
		match self.next_arg() {
			Some((_, arg)) if arg.as_f64().is_some() => arg.as_f64().unwrap(),
			Some((idx, other)) => {
				self.record(idx, format!("{other:?} is not a number"));
				0.0
			},
			None => 0.0,
		}
	}

	/// Next argument as `i64`. A `Number` is accepted only if it has no
	/// fractional part.
	pub fn int(&mut self) -> i64 {
		self.non_optional_accesses += 1;
		match self.next_arg() {
			Some((_, Arg::Integer(i))) => *i,
			Some((_, Arg::Number(n))) if n.fract() == 0.0 => *n as i64,
			Some((idx, Arg::Number(n))) => {
				self.record(idx, format!("{n} is not an integer"));
				0
			},
			Some((idx, other)) => {
				self.record(idx, format!("{other:?} is not an integer"));
				0
			},
			None => 0,
		}
	}

	pub fn optional_int(&mut self, default: i64) -> i64 {
		if self.pos >= self.args.len() {
			self.pos += 1;
			return default;
		}
		self.int()
	}

	/// Next argument as `i64` (the `Int64` accessor kind — accepts the
	/// same inputs as [`Self::int`], kept distinct because callers
	/// sometimes need to distinguish a 32- from a 64-bit integer kind).
	pub fn int64(&mut self) -> i64 {
		self.int()
	}

	/// Next argument as a [`Duration`]: a numeric string `<value><unit>`
	/// (`ns`/`µs`/`ms`/`s`/`m`/`h`, per `duration_str`), rejecting
	/// negative durations.
	pub fn duration(&mut self) -> Duration {
		self.non_optional_accesses += 1;
		match self.next_arg() {
			Some((idx, Arg::String(s))) => self.parse_duration_str(idx, s.as_str()),
			Some((idx, other)) => {
				self.record(idx, format!("{other:?} is not a duration"));
				Duration::ZERO
			},
			None => Duration::ZERO,
		}
	}

	fn parse_duration_str(&mut self, idx: usize, raw: &str) -> Duration {
		if let Some(stripped) = raw.strip_prefix('-') {
			match duration_str::parse(stripped) {
				Ok(_) => {
					self.record(idx, format!("duration -{stripped} is negative"));
				},
				Err(e) => self.record(idx, format!("invalid duration {raw:?}: {e}")),
			}
			return Duration::ZERO;
		}
		match duration_str::parse(raw) {
			Ok(d) => d,
			Err(e) => {
				self.record(idx, format!("invalid duration {raw:?}: {e}"));
				Duration::ZERO
			},
		}
	}

	/// Next argument as a [`Duration`], where a bare number is
	/// interpreted as that many multiples of `scale` (e.g. `scale =
	/// Duration::from_secs(1)` for a plain-seconds filter argument);
	/// string arguments defer to [`Self::duration`].
	pub fn duration_or_number(&mut self, scale: Duration) -> Duration {
		self.non_optional_accesses += 1;
		match self.next_arg() {
			Some((idx, arg)) if arg.as_f64().is_some() => {
				let n = arg.as_f64().unwrap();
				if n.is_sign_negative() {
					self.record(idx, format!("duration {n} is negative"));
					Duration::ZERO
				} else {
					scale.mul_f64(n)
				}
			},
			Some((idx, Arg::String(s))) => self.parse_duration_str(idx, s.as_str()),
			Some((idx, other)) => {
				self.record(idx, format!("{other:?} is not a duration"));
				Duration::ZERO
			},
			None => Duration::ZERO,
		}
	}

	/// Consumes every remaining argument as a string (the `Strings (rest)`
	/// accessor kind).
	pub fn strings(&mut self) -> Vec<String> {
		let mut out = Vec::new();
		while self.pos < self.args.len() {
			out.push(self.string());
		}
		out
	}

	/// Number of arguments actually supplied.
	pub fn len(&self) -> usize {
		self.args.len()
	}

	pub fn is_empty(&self) -> bool {
		self.args.is_empty()
	}

	/// Terminal check: `None` iff every non-optional access succeeded and
	/// the number performed equals `len(args)`; otherwise an aggregated
	/// [`crate::error::RdlError::Coercion`] carrying the arity mismatch
	/// (if any) followed by every per-argument failure.
	pub fn err(mut self) -> Option<crate::error::RdlError> {
		if self.non_optional_accesses != self.args.len() {
			self
				.errors
				.insert(0, CoercionError::arity(self.non_optional_accesses));
		}
		if self.errors.is_empty() {
			None
		} else {
			Some(crate::error::RdlError::Coercion(self.errors))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::Arg;

	#[test]
	fn aggregates_coercion_errors_without_failing_fast() {
		let args = vec![
			Arg::String("x".into()),
			Arg::Number(1.5),
			Arg::String("-1s".into()),
		];
		let mut r = ArgReader::new(&args);
		let s = r.string();
		let i = r.int();
		let d = r.duration();
		assert_eq!(s, "x");
		assert_eq!(i, 0);
		assert_eq!(d, Duration::ZERO);
		let err = r.err().unwrap();
		let msg = err.to_string();
		assert!(msg.contains("1.5 is not an integer"), "{msg}");
		assert!(msg.contains("duration -1s is negative"), "{msg}");
	}

	#[test]
	fn arity_ok_when_all_args_consumed() {
		let args = vec![Arg::String("a".into())];
		let mut r = ArgReader::new(&args);
		let _ = r.string();
		assert!(r.err().is_none());
	}

	#[test]
	fn arity_mismatch_reported() {
		let args = vec![Arg::String("a".into()), Arg::String("b".into())];
		let mut r = ArgReader::new(&args);
		let _ = r.string();
		let err = r.err().unwrap();
		assert!(err.to_string().contains("expects 1 arguments"));
	}

	#[test]
	fn optional_string_uses_default_past_end() {
		let args: Vec<Arg> = vec![];
		let mut r = ArgReader::new(&args);
		assert_eq!(r.optional_string("fallback"), "fallback");
		assert!(r.err().is_none());
	}

	#[test]
	fn duration_or_number_scales_plain_numbers() {
		let args = vec![Arg::Number(2.0)];
		let mut r = ArgReader::new(&args);
		let d = r.duration_or_number(Duration::from_secs(1));
		assert_eq!(d, Duration::from_secs(2));
		assert!(r.err().is_none());
	}
}
