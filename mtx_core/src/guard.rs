use crate::Location;
use crate::MtxError;
use crate::MtxResult;

/// Cardinality preconditions for a resolved target set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetGuard {
	/// Fail when more than this many locations match.
	pub max_targets: Option<usize>,
	/// Fail unless exactly this many locations match.
	pub exact_targets: Option<usize>,
}

impl TargetGuard {
	pub fn new(max_targets: Option<usize>, exact_targets: Option<usize>) -> Self {
		Self {
			max_targets,
			exact_targets,
		}
	}

	/// Check a target set. Runs after resolution and before any mutation.
	pub fn check(&self, locations: &[Location]) -> MtxResult<()> {
		self.check_count(locations.len())
	}

	pub fn check_count(&self, found: usize) -> MtxResult<()> {
		if let Some(max) = self.max_targets {
			if found > max {
				return Err(MtxError::TooManyTargets { max, found });
			}
		}

		if let Some(expected) = self.exact_targets {
			if found != expected {
				return Err(MtxError::TargetCountMismatch { expected, found });
			}
		}

		Ok(())
	}
}
