use miette::Diagnostic;
use miette::SourceSpan;
use thiserror::Error;

use crate::DocumentFormat;
use crate::Operator;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum MtxError {
	#[error(transparent)]
	#[diagnostic(code(mtx::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid path `{path}`: {reason} at position {position}")]
	#[diagnostic(
		code(mtx::path_syntax),
		help("paths look like `site.name`, `items[0]`, `items[*].tags`, `meta['x.y']` or `**.enabled`")
	)]
	PathSyntax {
		#[source_code]
		path: String,
		position: usize,
		reason: String,
		#[label("here")]
		span: SourceSpan,
	},

	#[error("path `{path}` does not resolve to any value")]
	#[diagnostic(code(mtx::path_not_found))]
	PathNotFound { path: String },

	#[error("cannot address `{segment}` inside the {found} at `{path}`")]
	#[diagnostic(
		code(mtx::path_conflict),
		help("properties need an object and indices need an array; replace the value first")
	)]
	PathConflict {
		path: String,
		segment: String,
		found: &'static str,
	},

	#[error("index {index} is out of bounds for the array at `{path}` (length {len})")]
	#[diagnostic(code(mtx::index_out_of_bounds))]
	IndexOutOfBounds { path: String, index: usize, len: usize },

	#[error("operation '{0}' is not supported")]
	#[diagnostic(
		code(mtx::unsupported_operator),
		help("supported operations: set, replace, copy, move, insert, append, merge, remove")
	)]
	UnsupportedOperator(String),

	#[error("expected at most {max} matching target(s), found {found}")]
	#[diagnostic(code(mtx::guard_violation))]
	TooManyTargets { max: usize, found: usize },

	#[error("expected exactly {expected} matching target(s), found {found}")]
	#[diagnostic(code(mtx::guard_violation))]
	TargetCountMismatch { expected: usize, found: usize },

	#[error("{operator} requires from/source")]
	#[diagnostic(code(mtx::missing_source))]
	MissingSource { operator: Operator },

	#[error("{operator} requires non-negative index")]
	#[diagnostic(code(mtx::invalid_index))]
	InvalidIndex { operator: Operator },

	#[error("{operator} requires an array at `{path}`, found {found}")]
	#[diagnostic(code(mtx::not_an_array))]
	NotAnArray {
		operator: Operator,
		path: String,
		found: &'static str,
	},

	#[error("merge requires an object at `{path}`, found {found}")]
	#[diagnostic(code(mtx::not_an_object))]
	NotAnObject { path: String, found: &'static str },

	#[error("merge requires an object value, found {found}")]
	#[diagnostic(code(mtx::merge_value))]
	MergeValueNotObject { found: &'static str },

	#[error("{operator} resolved {sources} source(s) but {targets} target(s); the counts must match")]
	#[diagnostic(code(mtx::cardinality_mismatch))]
	CardinalityMismatch {
		operator: Operator,
		sources: usize,
		targets: usize,
	},

	#[error("cannot move `{from}` to `{to}`: source and target overlap")]
	#[diagnostic(code(mtx::overlapping_move))]
	OverlappingMove { from: String, to: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mtx::config_parse),
		help("check that mtx.toml is valid TOML with `[[transform]]` entries")
	)]
	ConfigParse(String),

	#[error("no config file found in `{0}`")]
	#[diagnostic(
		code(mtx::missing_config),
		help("create an mtx.toml (or .mtx.toml, .config/mtx.toml) with `[[transform]]` entries")
	)]
	MissingConfig(String),

	#[error("unknown transform: `{0}`")]
	#[diagnostic(code(mtx::unknown_transform))]
	UnknownTransform(String),

	#[error("failed to load document `{path}`: {reason}")]
	#[diagnostic(code(mtx::document_parse))]
	DocumentParse { path: String, reason: String },

	#[error("failed to render document as {format}: {reason}")]
	#[diagnostic(code(mtx::document_render))]
	DocumentRender { format: DocumentFormat, reason: String },

	#[error("failed to render report: {0}")]
	#[diagnostic(code(mtx::report_render))]
	ReportRender(String),

	#[error("unsupported document format: `{0}`")]
	#[diagnostic(code(mtx::unsupported_format), help("supported formats: json, yaml, yml, toml"))]
	UnsupportedFormat(String),

	#[error("failed to load operations from `{path}`: {reason}")]
	#[diagnostic(code(mtx::operations_parse))]
	OperationsParse { path: String, reason: String },
}

impl MtxError {
	/// Whether the error is a `maxTargets` / `exactTargets` violation.
	pub fn is_guard_violation(&self) -> bool {
		matches!(self, Self::TooManyTargets { .. } | Self::TargetCountMismatch { .. })
	}
}

pub type MtxResult<T> = Result<T, MtxError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
