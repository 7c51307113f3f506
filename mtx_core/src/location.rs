use std::fmt::Display;

use crate::MtxError;
use crate::MtxResult;
use crate::Node;
use crate::parser::is_bare_key;
use crate::parser::quote_key;

/// One concrete step from a container to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
	Key(String),
	Index(usize),
}

impl Step {
	/// The empty container a missing step of this kind lives in.
	fn container(&self) -> Node {
		match self {
			Self::Key(_) => Node::object(),
			Self::Index(_) => Node::array(),
		}
	}
}

impl Display for Step {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Key(key) if is_bare_key(key) => f.write_str(key),
			Self::Key(key) => write!(f, "[{}]", quote_key(key)),
			Self::Index(index) => write!(f, "[{index}]"),
		}
	}
}

/// A resolved address inside a document: the owning container (reached by
/// `parent()`) plus the key or index of the addressed slot.
///
/// Locations hold no borrows into the document, so a target set can be kept
/// while the document is mutated. The addressed slot may not exist yet when
/// the location was resolved for an operation that creates values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
	steps: Vec<Step>,
}

impl Location {
	/// Build a location from a non-empty list of steps.
	pub(crate) fn new(steps: Vec<Step>) -> Self {
		debug_assert!(!steps.is_empty(), "a location needs at least one step");
		Self { steps }
	}

	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	/// Steps leading to the owning container.
	pub fn parent(&self) -> &[Step] {
		&self.steps[..self.steps.len() - 1]
	}

	/// The key or index of the addressed slot inside its container.
	pub fn last(&self) -> &Step {
		&self.steps[self.steps.len() - 1]
	}

	/// Whether `self` lies strictly above `other` in the tree.
	pub fn is_ancestor_of(&self, other: &Location) -> bool {
		self.steps.len() < other.steps.len() && other.steps.starts_with(&self.steps)
	}

	/// Whether the two locations are equal or one contains the other.
	pub fn overlaps(&self, other: &Location) -> bool {
		self == other || self.is_ancestor_of(other) || other.is_ancestor_of(self)
	}

	pub fn get<'a>(&self, root: &'a Node) -> Option<&'a Node> {
		root.descendant(&self.steps)
	}

	pub fn get_mut<'a>(&self, root: &'a mut Node) -> Option<&'a mut Node> {
		root.descendant_mut(&self.steps)
	}

	/// Write `value` into the addressed slot, creating missing intermediate
	/// containers on the way. Existing object keys keep their position.
	pub fn assign(&self, root: &mut Node, value: Node) -> MtxResult<()> {
		let container = self.vivify_parent(root)?;

		match (container, self.last()) {
			(Node::Object(map), Step::Key(key)) => {
				map.insert(key.clone(), value);
				Ok(())
			}
			(Node::Array(items), Step::Index(index)) => {
				let len = items.len();
				match (*index).cmp(&len) {
					std::cmp::Ordering::Less => items[*index] = value,
					std::cmp::Ordering::Equal => items.push(value),
					std::cmp::Ordering::Greater => {
						return Err(MtxError::IndexOutOfBounds {
							path: render_steps(self.parent()),
							index: *index,
							len,
						});
					}
				}
				Ok(())
			}
			(other, step) => Err(conflict(self.parent(), step, other)),
		}
	}

	/// Mutable access to the addressed slot. When the slot is missing or
	/// holds `null` it is first filled with `init()`.
	pub fn entry<'a>(
		&self,
		root: &'a mut Node,
		init: impl FnOnce() -> Node,
	) -> MtxResult<&'a mut Node> {
		let missing = self.get(root).is_none_or(Node::is_null);
		if missing {
			self.assign(root, init())?;
		}

		self.get_mut(root)
			.ok_or_else(|| MtxError::PathNotFound {
				path: self.to_string(),
			})
	}

	/// Delete the addressed slot, returning the removed value. Array elements
	/// after the removed one shift left.
	pub fn remove(&self, root: &mut Node) -> Option<Node> {
		match (root.descendant_mut(self.parent())?, self.last()) {
			(Node::Object(map), Step::Key(key)) => map.shift_remove(key),
			(Node::Array(items), Step::Index(index)) if *index < items.len() => {
				Some(items.remove(*index))
			}
			_ => None,
		}
	}

	/// Walk to the owning container, creating every missing (or `null`)
	/// intermediate with the kind the following step needs.
	fn vivify_parent<'a>(&self, root: &'a mut Node) -> MtxResult<&'a mut Node> {
		let mut node = root;

		for (depth, pair) in self.steps.windows(2).enumerate() {
			let (step, next) = (&pair[0], &pair[1]);
			let walked = &self.steps[..depth];

			let needs_container = node.child(step).is_none_or(Node::is_null);
			if needs_container {
				let path = render_steps(walked);
				match (&mut *node, step) {
					(Node::Object(map), Step::Key(key)) => {
						map.insert(key.clone(), next.container());
					}
					(Node::Array(items), Step::Index(index)) if *index < items.len() => {
						items[*index] = next.container();
					}
					(Node::Array(items), Step::Index(index)) if *index == items.len() => {
						items.push(next.container());
					}
					(Node::Array(items), Step::Index(index)) => {
						return Err(MtxError::IndexOutOfBounds {
							path,
							index: *index,
							len: items.len(),
						});
					}
					(other, step) => return Err(conflict(walked, step, other)),
				}
			}

			node = match node.child_mut(step) {
				Some(child) => child,
				None => return Err(conflict(walked, step, &Node::NULL)),
			};
		}

		Ok(node)
	}
}

impl Display for Location {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&render_steps(&self.steps))
	}
}

/// Render steps as a path expression that parses back to the same location.
pub(crate) fn render_steps(steps: &[Step]) -> String {
	let mut rendered = String::new();
	for step in steps {
		if !rendered.is_empty() && matches!(step, Step::Key(key) if is_bare_key(key)) {
			rendered.push('.');
		}
		rendered.push_str(&step.to_string());
	}

	if rendered.is_empty() {
		rendered.push_str("<root>");
	}
	rendered
}

pub(crate) fn conflict(parent: &[Step], step: &Step, found: &Node) -> MtxError {
	MtxError::PathConflict {
		path: render_steps(parent),
		segment: step.to_string(),
		found: found.type_name(),
	}
}
