use tracing::trace;

use crate::Location;
use crate::MtxError;
use crate::MtxResult;
use crate::Node;
use crate::Operation;
use crate::Operator;
use crate::PathExpr;
use crate::ResolveMode;
use crate::resolve;

/// Apply one operation to `root` and return the number of locations it
/// mutated.
///
/// Every target is resolved and validated before the first write, so an
/// operation either applies to its whole target set or leaves the document
/// untouched. Writes run in reverse resolution order: later array elements
/// and deeper nodes change first, which keeps the pending locations valid.
pub fn execute(root: &mut Node, operation: &Operation) -> MtxResult<usize> {
	let operator: Operator = operation.op.parse()?;
	let path = PathExpr::parse(&operation.path)?;

	match operator {
		Operator::Set => apply_set(root, operation, &path),
		Operator::Replace => apply_replace(root, operation, &path),
		Operator::Copy | Operator::Move => apply_transfer(root, operator, operation, &path),
		Operator::Insert => apply_insert(root, operation, &path),
		Operator::Append => apply_append(root, operation, &path),
		Operator::Merge => apply_merge(root, operation, &path),
		Operator::Remove => apply_remove(root, operation, &path),
	}
}

/// Resolve existing targets, failing when nothing matches.
fn resolve_existing(root: &Node, path: &PathExpr) -> MtxResult<Vec<Location>> {
	let locations = resolve(root, path, ResolveMode::Existing)?;
	if locations.is_empty() {
		return Err(MtxError::PathNotFound {
			path: path.source().to_string(),
		});
	}

	Ok(locations)
}

fn apply_set(root: &mut Node, operation: &Operation, path: &PathExpr) -> MtxResult<usize> {
	let targets = resolve(root, path, ResolveMode::Create)?;
	operation.guard().check(&targets)?;

	let value = operation.value_or_null();
	for target in targets.iter().rev() {
		trace!(%target, "set");
		target.assign(root, value.clone())?;
	}

	Ok(targets.len())
}

fn apply_replace(root: &mut Node, operation: &Operation, path: &PathExpr) -> MtxResult<usize> {
	let targets = resolve_existing(root, path)?;
	operation.guard().check(&targets)?;

	let value = operation.value_or_null();
	for target in targets.iter().rev() {
		trace!(%target, "replace");
		target.assign(root, value.clone())?;
	}

	Ok(targets.len())
}

/// `copy` and `move`: read every source, write them to the paired targets,
/// then (for `move`) delete the sources.
fn apply_transfer(
	root: &mut Node,
	operator: Operator,
	operation: &Operation,
	path: &PathExpr,
) -> MtxResult<usize> {
	let from = operation
		.from
		.as_deref()
		.ok_or(MtxError::MissingSource { operator })?;
	let from = PathExpr::parse(from)?;

	let sources = resolve_existing(root, &from)?;
	let targets = resolve(root, path, ResolveMode::Create)?;
	operation.guard().check(&targets)?;

	if sources.len() != targets.len() {
		return Err(MtxError::CardinalityMismatch {
			operator,
			sources: sources.len(),
			targets: targets.len(),
		});
	}

	// Every target is written before any source is deleted, so no source may
	// overlap any target, paired or not.
	if operator == Operator::Move {
		for source in &sources {
			if let Some(target) = targets.iter().find(|target| source.overlaps(target)) {
				return Err(MtxError::OverlappingMove {
					from: source.to_string(),
					to: target.to_string(),
				});
			}
		}
	}

	let values = sources
		.iter()
		.map(|source| {
			source.get(root).cloned().ok_or_else(|| MtxError::PathNotFound {
				path: source.to_string(),
			})
		})
		.collect::<MtxResult<Vec<_>>>()?;

	for (target, value) in targets.iter().zip(values).rev() {
		trace!(%target, %operator, "write");
		target.assign(root, value)?;
	}

	if operator == Operator::Move {
		// Resolution order lists array elements by ascending index, so the
		// reverse walk deletes the highest index first.
		for source in sources.iter().rev() {
			trace!(%source, "delete moved source");
			source.remove(root);
		}
	}

	Ok(targets.len())
}

fn apply_insert(root: &mut Node, operation: &Operation, path: &PathExpr) -> MtxResult<usize> {
	let index = operation
		.index
		.and_then(|index| usize::try_from(index).ok())
		.ok_or(MtxError::InvalidIndex {
			operator: Operator::Insert,
		})?;

	let targets = resolve_existing(root, path)?;
	operation.guard().check(&targets)?;

	for target in &targets {
		match target.get(root) {
			Some(Node::Array(items)) if index <= items.len() => {}
			Some(Node::Array(items)) => {
				return Err(MtxError::IndexOutOfBounds {
					path: target.to_string(),
					index,
					len: items.len(),
				});
			}
			found => {
				return Err(MtxError::NotAnArray {
					operator: Operator::Insert,
					path: target.to_string(),
					found: found.map_or("nothing", Node::type_name),
				});
			}
		}
	}

	let value = operation.value_or_null();
	for target in targets.iter().rev() {
		if let Some(Node::Array(items)) = target.get_mut(root) {
			trace!(%target, index, "insert");
			items.insert(index, value.clone());
		}
	}

	Ok(targets.len())
}

fn apply_append(root: &mut Node, operation: &Operation, path: &PathExpr) -> MtxResult<usize> {
	let targets = resolve(root, path, ResolveMode::Create)?;
	operation.guard().check(&targets)?;

	for target in &targets {
		match target.get(root) {
			None | Some(Node::Array(_)) => {}
			Some(found) if found.is_null() => {}
			Some(found) => {
				return Err(MtxError::NotAnArray {
					operator: Operator::Append,
					path: target.to_string(),
					found: found.type_name(),
				});
			}
		}
	}

	let value = operation.value_or_null();
	for target in targets.iter().rev() {
		if let Node::Array(items) = target.entry(root, Node::array)? {
			trace!(%target, "append");
			items.push(value.clone());
		}
	}

	Ok(targets.len())
}

fn apply_merge(root: &mut Node, operation: &Operation, path: &PathExpr) -> MtxResult<usize> {
	let patch = match &operation.value {
		Some(Node::Object(patch)) => patch,
		other => {
			return Err(MtxError::MergeValueNotObject {
				found: other.as_ref().map_or("nothing", Node::type_name),
			});
		}
	};

	let targets = resolve(root, path, ResolveMode::Create)?;
	operation.guard().check(&targets)?;

	for target in &targets {
		match target.get(root) {
			None | Some(Node::Object(_)) => {}
			Some(found) if found.is_null() => {}
			Some(found) => {
				return Err(MtxError::NotAnObject {
					path: target.to_string(),
					found: found.type_name(),
				});
			}
		}
	}

	for target in targets.iter().rev() {
		if let Node::Object(map) = target.entry(root, Node::object)? {
			trace!(%target, keys = patch.len(), "merge");
			for (key, value) in patch {
				map.insert(key.clone(), value.clone());
			}
		}
	}

	Ok(targets.len())
}

fn apply_remove(root: &mut Node, operation: &Operation, path: &PathExpr) -> MtxResult<usize> {
	let targets = resolve_existing(root, path)?;
	operation.guard().check(&targets)?;

	let mut removed = 0;
	for target in targets.iter().rev() {
		if target.remove(root).is_some() {
			trace!(%target, "remove");
			removed += 1;
		}
	}

	Ok(removed)
}
