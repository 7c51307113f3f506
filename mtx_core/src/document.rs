use std::fmt::Display;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;

use crate::Step;

/// The ordered mapping used for object nodes. Iteration follows insertion
/// order so that wildcard matches are reported in declaration order.
pub type ObjectMap = IndexMap<String, Node>;

/// A node of a tree-shaped document.
///
/// Documents are loaded from JSON, YAML or TOML by the caller and converted
/// into this closed union so that every resolver and executor branch is an
/// exhaustive match instead of a runtime type probe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Node {
	Object(ObjectMap),
	Array(Vec<Node>),
	Scalar(Scalar),
}

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
	Null,
	Bool(bool),
	Number(serde_json::Number),
	String(String),
}

impl Node {
	/// The `null` scalar.
	pub const NULL: Node = Node::Scalar(Scalar::Null);

	/// An empty object node.
	pub fn object() -> Self {
		Self::Object(ObjectMap::new())
	}

	/// An empty array node.
	pub fn array() -> Self {
		Self::Array(Vec::new())
	}

	/// Human readable name of the node kind, used in error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Object(_) => "object",
			Self::Array(_) => "array",
			Self::Scalar(Scalar::Null) => "null",
			Self::Scalar(Scalar::Bool(_)) => "boolean",
			Self::Scalar(Scalar::Number(_)) => "number",
			Self::Scalar(Scalar::String(_)) => "string",
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Scalar(Scalar::Null))
	}

	pub fn is_object(&self) -> bool {
		matches!(self, Self::Object(_))
	}

	pub fn is_array(&self) -> bool {
		matches!(self, Self::Array(_))
	}

	pub fn as_object(&self) -> Option<&ObjectMap> {
		match self {
			Self::Object(map) => Some(map),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&Vec<Node>> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Scalar(Scalar::String(value)) => Some(value),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Scalar(Scalar::Number(number)) => number.as_i64(),
			_ => None,
		}
	}

	/// The direct child addressed by `step`, if present.
	pub fn child(&self, step: &Step) -> Option<&Node> {
		match (self, step) {
			(Self::Object(map), Step::Key(key)) => map.get(key),
			(Self::Array(items), Step::Index(index)) => items.get(*index),
			_ => None,
		}
	}

	/// Mutable access to the direct child addressed by `step`.
	pub fn child_mut(&mut self, step: &Step) -> Option<&mut Node> {
		match (self, step) {
			(Self::Object(map), Step::Key(key)) => map.get_mut(key),
			(Self::Array(items), Step::Index(index)) => items.get_mut(*index),
			_ => None,
		}
	}

	/// Follow `steps` from this node.
	pub fn descendant(&self, steps: &[Step]) -> Option<&Node> {
		steps.iter().try_fold(self, |node, step| node.child(step))
	}

	/// Follow `steps` from this node, mutably.
	pub fn descendant_mut(&mut self, steps: &[Step]) -> Option<&mut Node> {
		steps
			.iter()
			.try_fold(self, |node, step| node.child_mut(step))
	}

	/// Look up a value by path expression, returning the first match.
	///
	/// This is a read-only convenience over [`crate::resolve`] for callers
	/// and tests that want to inspect a transformed document.
	pub fn pointer(&self, path: &str) -> Option<&Node> {
		let path = crate::PathExpr::parse(path).ok()?;
		let locations = crate::resolve(self, &path, crate::ResolveMode::Existing).ok()?;
		locations.first().and_then(|location| location.get(self))
	}
}

impl Display for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let rendered = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
		f.write_str(&rendered)
	}
}

impl From<serde_json::Value> for Node {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Scalar(Scalar::Null),
			serde_json::Value::Bool(value) => Self::Scalar(Scalar::Bool(value)),
			serde_json::Value::Number(number) => Self::Scalar(Scalar::Number(number)),
			serde_json::Value::String(value) => Self::Scalar(Scalar::String(value)),
			serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Node::from).collect()),
			serde_json::Value::Object(map) => {
				Self::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
			}
		}
	}
}

impl From<Node> for serde_json::Value {
	fn from(node: Node) -> Self {
		match node {
			Node::Scalar(Scalar::Null) => Self::Null,
			Node::Scalar(Scalar::Bool(value)) => Self::Bool(value),
			Node::Scalar(Scalar::Number(number)) => Self::Number(number),
			Node::Scalar(Scalar::String(value)) => Self::String(value),
			Node::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
			Node::Object(map) => {
				Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
			}
		}
	}
}

impl From<&str> for Node {
	fn from(value: &str) -> Self {
		Self::Scalar(Scalar::String(value.to_string()))
	}
}

impl From<String> for Node {
	fn from(value: String) -> Self {
		Self::Scalar(Scalar::String(value))
	}
}

impl From<bool> for Node {
	fn from(value: bool) -> Self {
		Self::Scalar(Scalar::Bool(value))
	}
}

impl From<i64> for Node {
	fn from(value: i64) -> Self {
		Self::Scalar(Scalar::Number(value.into()))
	}
}

impl Serialize for Node {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Object(map) => {
				let mut state = serializer.serialize_map(Some(map.len()))?;
				for (key, value) in map {
					state.serialize_entry(key, value)?;
				}
				state.end()
			}
			Self::Array(items) => {
				let mut state = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					state.serialize_element(item)?;
				}
				state.end()
			}
			Self::Scalar(scalar) => scalar.serialize(serializer),
		}
	}
}

impl Serialize for Scalar {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Null => serializer.serialize_unit(),
			Self::Bool(value) => serializer.serialize_bool(*value),
			Self::Number(number) => number.serialize(serializer),
			Self::String(value) => serializer.serialize_str(value),
		}
	}
}
