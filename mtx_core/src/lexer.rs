use std::ops::Range;

use logos::Logos;

/// Raw tokens of a path expression.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathToken {
	#[token(".")]
	Dot,
	#[token("[")]
	OpenBracket,
	#[token("]")]
	CloseBracket,
	#[token("**")]
	DoubleStar,
	#[token("*")]
	Star,
	#[token("-")]
	Minus,
	#[regex(r"[A-Za-z0-9_]+")]
	Ident,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuoted,
	#[regex(r"'([^'\\]|\\.)*'")]
	SingleQuoted,
}

/// A token together with its byte span in the source path. `None` marks a
/// span logos could not tokenize.
pub(crate) type SpannedToken = (Option<PathToken>, Range<usize>);

/// Tokenize a path expression. Lexing never fails: unrecognized input is
/// returned as a `None` token so the parser can report its position.
pub(crate) fn tokenize(path: &str) -> Vec<SpannedToken> {
	PathToken::lexer(path)
		.spanned()
		.map(|(token, span)| (token.ok(), span))
		.collect()
}
