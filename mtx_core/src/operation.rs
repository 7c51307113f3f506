use std::fmt::Display;
use std::str::FromStr;

use crate::MtxError;
use crate::Node;
use crate::TargetGuard;

/// The eight mutation kinds understood by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
	Set,
	Replace,
	Copy,
	Move,
	Insert,
	Append,
	Merge,
	Remove,
}

impl Operator {
	pub const ALL: [Operator; 8] = [
		Self::Set,
		Self::Replace,
		Self::Copy,
		Self::Move,
		Self::Insert,
		Self::Append,
		Self::Merge,
		Self::Remove,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Set => "set",
			Self::Replace => "replace",
			Self::Copy => "copy",
			Self::Move => "move",
			Self::Insert => "insert",
			Self::Append => "append",
			Self::Merge => "merge",
			Self::Remove => "remove",
		}
	}

	/// Whether the operator reads a `from` path.
	pub fn needs_source(self) -> bool {
		matches!(self, Self::Copy | Self::Move)
	}
}

impl Display for Operator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Operator {
	type Err = MtxError;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|operator| operator.as_str() == name)
			.ok_or_else(|| MtxError::UnsupportedOperator(name.to_string()))
	}
}

/// One mutation request.
///
/// The operator is kept as written so that an unknown name is reported by
/// the session as a failed operation rather than rejected while loading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
	pub op: String,
	pub path: String,
	pub from: Option<String>,
	pub value: Option<Node>,
	pub index: Option<i64>,
	pub max_targets: Option<usize>,
	pub exact_targets: Option<usize>,
}

impl Operation {
	pub fn new(op: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			op: op.into(),
			path: path.into(),
			..Self::default()
		}
	}

	pub fn set(path: impl Into<String>, value: impl Into<Node>) -> Self {
		Self::new("set", path).with_value(value)
	}

	pub fn replace(path: impl Into<String>, value: impl Into<Node>) -> Self {
		Self::new("replace", path).with_value(value)
	}

	pub fn copy(from: impl Into<String>, path: impl Into<String>) -> Self {
		Self::new("copy", path).with_from(from)
	}

	pub fn r#move(from: impl Into<String>, path: impl Into<String>) -> Self {
		Self::new("move", path).with_from(from)
	}

	pub fn insert(path: impl Into<String>, index: i64, value: impl Into<Node>) -> Self {
		Self::new("insert", path).with_index(index).with_value(value)
	}

	pub fn append(path: impl Into<String>, value: impl Into<Node>) -> Self {
		Self::new("append", path).with_value(value)
	}

	pub fn merge(path: impl Into<String>, value: impl Into<Node>) -> Self {
		Self::new("merge", path).with_value(value)
	}

	pub fn remove(path: impl Into<String>) -> Self {
		Self::new("remove", path)
	}

	#[must_use]
	pub fn with_value(mut self, value: impl Into<Node>) -> Self {
		self.value = Some(value.into());
		self
	}

	#[must_use]
	pub fn with_from(mut self, from: impl Into<String>) -> Self {
		self.from = Some(from.into());
		self
	}

	#[must_use]
	pub fn with_index(mut self, index: i64) -> Self {
		self.index = Some(index);
		self
	}

	#[must_use]
	pub fn with_max_targets(mut self, max_targets: usize) -> Self {
		self.max_targets = Some(max_targets);
		self
	}

	#[must_use]
	pub fn with_exact_targets(mut self, exact_targets: usize) -> Self {
		self.exact_targets = Some(exact_targets);
		self
	}

	/// The literal value, `null` when none was given.
	pub fn value_or_null(&self) -> Node {
		self.value.clone().unwrap_or(Node::NULL)
	}

	pub fn guard(&self) -> TargetGuard {
		TargetGuard::new(self.max_targets, self.exact_targets)
	}
}
