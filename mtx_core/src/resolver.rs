use indexmap::IndexSet;

use crate::Location;
use crate::MtxError;
use crate::MtxResult;
use crate::Node;
use crate::PathExpr;
use crate::Segment;
use crate::Step;
use crate::location::conflict;
use crate::location::render_steps;

/// How a path treats slots that do not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
	/// Only existing values match. Used by `replace`, `remove`, `insert` and
	/// the source side of `copy` / `move`.
	Existing,
	/// Missing property and index segments still produce a location. The
	/// intermediate containers are created when the location is written.
	/// Used by `set`, `append`, `merge` and the target side of `copy` /
	/// `move`.
	Create,
}

/// Resolve `path` against `root` into an ordered target set.
///
/// Object keys are visited in declaration order, array elements in index
/// order and recursive wildcards in pre-order. Each location is reported
/// once. The document is never modified.
pub fn resolve(root: &Node, path: &PathExpr, mode: ResolveMode) -> MtxResult<Vec<Location>> {
	let mut resolver = Resolver {
		locations: IndexSet::new(),
	};
	let mut steps = Vec::new();
	resolver.walk(Some(root), &mut steps, path.segments(), mode)?;

	Ok(resolver.locations.into_iter().collect())
}

struct Resolver {
	locations: IndexSet<Location>,
}

impl Resolver {
	/// Match `rest` against `node`, which sits at `steps`. A `None` node is a
	/// slot that does not exist yet and only occurs in create mode.
	fn walk(
		&mut self,
		node: Option<&Node>,
		steps: &mut Vec<Step>,
		rest: &[Segment],
		mode: ResolveMode,
	) -> MtxResult<()> {
		let Some((segment, rest)) = rest.split_first() else {
			if !steps.is_empty() {
				self.push(Location::new(steps.clone()));
			}
			return Ok(());
		};

		// A `null` slot may be replaced by a container when creating.
		let node = node.filter(|node| mode == ResolveMode::Existing || !node.is_null());

		match segment {
			Segment::Property(name) => {
				let step = Step::Key(name.clone());
				match node {
					Some(Node::Object(map)) => {
						let child = map.get(name);
						if child.is_none() && mode == ResolveMode::Existing {
							return Ok(());
						}
						self.step_into(child, steps, step, rest, mode)
					}
					None => self.step_into(None, steps, step, rest, mode),
					Some(other) => mismatch(other, steps, &step, mode),
				}
			}
			Segment::Index(index) => {
				let step = Step::Index(*index);
				match node {
					Some(Node::Array(items)) => {
						if let Some(child) = items.get(*index) {
							return self.step_into(Some(child), steps, step, rest, mode);
						}
						match mode {
							ResolveMode::Existing => Ok(()),
							ResolveMode::Create if *index == items.len() => {
								self.step_into(None, steps, step, rest, mode)
							}
							ResolveMode::Create => {
								Err(out_of_bounds(steps, *index, items.len()))
							}
						}
					}
					None if *index == 0 => self.step_into(None, steps, step, rest, mode),
					None => Err(out_of_bounds(steps, *index, 0)),
					Some(other) => mismatch(other, steps, &step, mode),
				}
			}
			Segment::Wildcard => {
				match node {
					Some(Node::Object(map)) => {
						for (key, child) in map {
							self.step_into(Some(child), steps, Step::Key(key.clone()), rest, mode)?;
						}
					}
					Some(Node::Array(items)) => {
						for (index, child) in items.iter().enumerate() {
							self.step_into(Some(child), steps, Step::Index(index), rest, mode)?;
						}
					}
					_ => {}
				}
				Ok(())
			}
			Segment::RecursiveWildcard => {
				match node {
					Some(node) => self.descend(node, steps, rest),
					None => Ok(()),
				}
			}
		}
	}

	/// Pre-order walk for `**`: match the suffix at `node` itself before
	/// visiting its children in container order. Matches below `**` are
	/// always resolved against existing values.
	fn descend(&mut self, node: &Node, steps: &mut Vec<Step>, suffix: &[Segment]) -> MtxResult<()> {
		self.walk(Some(node), steps, suffix, ResolveMode::Existing)?;

		match node {
			Node::Object(map) => {
				for (key, child) in map {
					steps.push(Step::Key(key.clone()));
					let result = self.descend(child, steps, suffix);
					steps.pop();
					result?;
				}
			}
			Node::Array(items) => {
				for (index, child) in items.iter().enumerate() {
					steps.push(Step::Index(index));
					let result = self.descend(child, steps, suffix);
					steps.pop();
					result?;
				}
			}
			Node::Scalar(_) => {}
		}

		Ok(())
	}

	fn step_into(
		&mut self,
		child: Option<&Node>,
		steps: &mut Vec<Step>,
		step: Step,
		rest: &[Segment],
		mode: ResolveMode,
	) -> MtxResult<()> {
		steps.push(step);
		let result = self.walk(child, steps, rest, mode);
		steps.pop();
		result
	}

	/// Keeps the first position of a location reached more than once.
	fn push(&mut self, location: Location) {
		self.locations.insert(location);
	}
}

fn out_of_bounds(steps: &[Step], index: usize, len: usize) -> MtxError {
	MtxError::IndexOutOfBounds {
		path: render_steps(steps),
		index,
		len,
	}
}

/// A property used on a non-object or an index used on a non-array. No match
/// when reading, a conflict when creating.
fn mismatch(found: &Node, steps: &[Step], step: &Step, mode: ResolveMode) -> MtxResult<()> {
	match mode {
		ResolveMode::Existing => Ok(()),
		ResolveMode::Create => Err(conflict(steps, step, found)),
	}
}
