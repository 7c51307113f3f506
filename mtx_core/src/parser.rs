use std::fmt::Display;
use std::str::FromStr;

use derive_more::Deref;
use snailquote::unescape;

use crate::MtxError;
use crate::MtxResult;
use crate::lexer::PathToken;
use crate::lexer::SpannedToken;
use crate::lexer::tokenize;

/// One parsed unit of a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
	/// A literal object key, written bare (`name`) or quoted (`['x.y']`).
	Property(String),
	/// A literal array index, written `[n]`.
	Index(usize),
	/// `[*]`: every element of the current container.
	Wildcard,
	/// `**`: the current node and every node below it.
	RecursiveWildcard,
}

impl Display for Segment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Property(name) if is_bare_key(name) => f.write_str(name),
			Self::Property(name) => write!(f, "[{}]", quote_key(name)),
			Self::Index(index) => write!(f, "[{index}]"),
			Self::Wildcard => f.write_str("[*]"),
			Self::RecursiveWildcard => f.write_str("**"),
		}
	}
}

/// A parsed path expression: the source text plus its segments.
///
/// Dereferences to the segment list.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct PathExpr {
	source: String,
	#[deref]
	segments: Vec<Segment>,
}

impl PathExpr {
	/// Parse `path` into segments.
	///
	/// ```rust
	/// use mtx_core::PathExpr;
	/// use mtx_core::Segment;
	///
	/// let path = PathExpr::parse("meta['x.y'][0]").unwrap();
	/// assert_eq!(path.segments(), &[
	/// 	Segment::Property("meta".into()),
	/// 	Segment::Property("x.y".into()),
	/// 	Segment::Index(0),
	/// ]);
	/// ```
	pub fn parse(path: &str) -> MtxResult<Self> {
		Ok(Self {
			source: path.to_string(),
			segments: parse(path)?,
		})
	}

	/// The original text of the expression.
	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}
}

impl FromStr for PathExpr {
	type Err = MtxError;

	fn from_str(path: &str) -> Result<Self, Self::Err> {
		Self::parse(path)
	}
}

impl Display for PathExpr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.source)
	}
}

/// Parse a path string into its ordered segments.
///
/// Parsing is purely lexical and never consults a document.
pub fn parse(path: &str) -> MtxResult<Vec<Segment>> {
	PathParser::new(path).parse()
}

struct PathParser<'a> {
	source: &'a str,
	tokens: Vec<SpannedToken>,
	cursor: usize,
	segments: Vec<Segment>,
}

impl<'a> PathParser<'a> {
	fn new(source: &'a str) -> Self {
		Self {
			source,
			tokens: tokenize(source),
			cursor: 0,
			segments: Vec::new(),
		}
	}

	fn parse(mut self) -> MtxResult<Vec<Segment>> {
		if self.source.is_empty() {
			return Err(self.error(0, "path is empty"));
		}

		match self.peek() {
			Some((Some(PathToken::OpenBracket), _)) => self.parse_bracket()?,
			_ => self.parse_dotted()?,
		}

		while let Some((token, span)) = self.peek() {
			match token {
				Some(PathToken::Dot) => {
					self.cursor += 1;
					if self.peek().is_none() {
						return Err(self.error(span.start, "path cannot end with `.`"));
					}
					self.parse_dotted()?;
				}
				Some(PathToken::OpenBracket) => self.parse_bracket()?,
				_ => return Err(self.unexpected(token, span.start)),
			}
		}

		Ok(self.segments)
	}

	/// A segment at the start of the path or after a `.`.
	fn parse_dotted(&mut self) -> MtxResult<()> {
		let Some((token, span)) = self.peek() else {
			return Err(self.error(self.source.len(), "expected a property name"));
		};

		let segment = match token {
			Some(PathToken::Ident) => Segment::Property(self.source[span.clone()].to_string()),
			Some(PathToken::DoubleStar) => Segment::RecursiveWildcard,
			Some(PathToken::Star) => Segment::Wildcard,
			Some(PathToken::Dot) => {
				return Err(self.error(span.start, "empty segment between `.` separators"));
			}
			Some(PathToken::OpenBracket) => {
				return Err(self.error(span.start, "brackets cannot follow `.`"));
			}
			_ => return Err(self.unexpected(token, span.start)),
		};

		self.cursor += 1;
		self.segments.push(segment);
		Ok(())
	}

	/// A `[...]` segment. The cursor is on the opening bracket.
	fn parse_bracket(&mut self) -> MtxResult<()> {
		self.cursor += 1;
		let end = self.source.len();

		let Some((token, span)) = self.peek() else {
			return Err(self.error(end, "missing closing bracket"));
		};

		let segment = match token {
			Some(quote @ (PathToken::DoubleQuoted | PathToken::SingleQuoted)) => {
				Segment::Property(self.unquote(quote, span.clone())?)
			}
			Some(PathToken::Star) => Segment::Wildcard,
			Some(PathToken::Ident) => {
				let literal = &self.source[span.clone()];
				if !literal.bytes().all(|byte| byte.is_ascii_digit()) {
					return Err(self.error(
						span.start,
						"expected an integer index, a quoted key or `*` inside brackets",
					));
				}
				let index = literal
					.parse::<usize>()
					.map_err(|_| self.error(span.start, "index is too large"))?;
				Segment::Index(index)
			}
			Some(PathToken::Minus) => {
				return Err(self.error(span.start, "array index cannot be negative"));
			}
			Some(PathToken::CloseBracket) => {
				return Err(self.error(span.start, "empty brackets"));
			}
			_ => return Err(self.unexpected(token, span.start)),
		};
		self.cursor += 1;

		match self.peek() {
			Some((Some(PathToken::CloseBracket), _)) => self.cursor += 1,
			Some((Some(PathToken::Dot), span)) if matches!(segment, Segment::Index(_)) => {
				return Err(self.error(span.start, "array index must be an integer"));
			}
			Some((_, span)) => return Err(self.error(span.start, "expected `]`")),
			None => return Err(self.error(end, "missing closing bracket")),
		}

		self.segments.push(segment);
		Ok(())
	}

	fn unquote(&self, token: PathToken, span: std::ops::Range<usize>) -> MtxResult<String> {
		let slice = &self.source[span.clone()];
		let inner = &slice[1..slice.len() - 1];

		if !inner.contains('\\') {
			return Ok(inner.to_string());
		}

		// Double quotes support the usual escape sequences (`\n`, `\"`); single
		// quotes only escape the next character.
		if token == PathToken::DoubleQuoted {
			return unescape(slice).map_err(|_| self.error(span.start, "invalid escape sequence"));
		}

		let mut unquoted = String::with_capacity(inner.len());
		let mut chars = inner.chars();
		while let Some(ch) = chars.next() {
			match ch {
				'\\' => {
					let escaped = chars
						.next()
						.ok_or_else(|| self.error(span.start, "invalid escape sequence"))?;
					unquoted.push(escaped);
				}
				_ => unquoted.push(ch),
			}
		}

		Ok(unquoted)
	}

	fn peek(&self) -> Option<SpannedToken> {
		self.tokens.get(self.cursor).cloned()
	}

	fn unexpected(&self, token: Option<PathToken>, position: usize) -> MtxError {
		let rest = &self.source[position..];

		if token.is_some() {
			let end = self
				.tokens
				.get(self.cursor)
				.map_or(self.source.len(), |(_, span)| span.end);
			return self.error(
				position,
				format!("unexpected `{}`", &self.source[position..end]),
			);
		}

		if rest.starts_with(['\'', '"']) {
			return self.error(position, "unterminated quote");
		}

		let found = rest.chars().next().map_or_else(String::new, String::from);
		self.error(position, format!("unexpected character `{found}`"))
	}

	fn error(&self, position: usize, reason: impl Into<String>) -> MtxError {
		let len = usize::from(position < self.source.len());
		MtxError::PathSyntax {
			path: self.source.to_string(),
			position,
			reason: reason.into(),
			span: (position, len).into(),
		}
	}
}

/// Whether `key` can be written without quotes.
pub(crate) fn is_bare_key(key: &str) -> bool {
	!key.is_empty()
		&& key
			.bytes()
			.all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

/// Quote `key` for use inside brackets so that it parses back to itself.
pub(crate) fn quote_key(key: &str) -> String {
	let mut quoted = String::with_capacity(key.len() + 2);
	quoted.push('\'');
	for ch in key.chars() {
		if matches!(ch, '\'' | '\\') {
			quoted.push('\\');
		}
		quoted.push(ch);
	}
	quoted.push('\'');
	quoted
}
