use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::MtxResult;

/// Per-session record of what each operation did.
///
/// Serialized with the field names downstream tooling reads:
/// `OperationsTotal`, `OperationsSucceeded`, `OperationsFailed` and
/// `Operations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformReport {
	operations_total: usize,
	operations_succeeded: usize,
	operations_failed: usize,
	operations: Vec<OperationReport>,
}

/// The outcome of a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperationReport {
	operator: String,
	targets_applied: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

impl TransformReport {
	pub(crate) fn new(operations_total: usize) -> Self {
		Self {
			operations_total,
			operations: Vec::with_capacity(operations_total),
			..Self::default()
		}
	}

	pub(crate) fn record_success(&mut self, operator: &str, targets_applied: usize) {
		self.operations_succeeded += 1;
		self.operations.push(OperationReport {
			operator: operator.to_string(),
			targets_applied,
			error: None,
		});
	}

	pub(crate) fn record_failure(&mut self, operator: &str, error: String) {
		self.operations_failed += 1;
		self.operations.push(OperationReport {
			operator: operator.to_string(),
			targets_applied: 0,
			error: Some(error),
		});
	}

	/// Number of operations submitted to the session.
	pub fn operations_total(&self) -> usize {
		self.operations_total
	}

	pub fn operations_succeeded(&self) -> usize {
		self.operations_succeeded
	}

	pub fn operations_failed(&self) -> usize {
		self.operations_failed
	}

	/// Entries for every attempted operation, in declared order.
	pub fn operations(&self) -> &[OperationReport] {
		&self.operations
	}

	/// Sum of `TargetsApplied` over all entries.
	pub fn targets_applied(&self) -> usize {
		self.operations.iter().map(|entry| entry.targets_applied).sum()
	}

	pub fn to_json_pretty(&self) -> MtxResult<String> {
		let mut rendered = serde_json::to_string_pretty(self)
			.map_err(|e| crate::MtxError::ReportRender(e.to_string()))?;
		rendered.push('\n');
		Ok(rendered)
	}

	/// Write the report as JSON, creating parent directories.
	pub fn write_to(&self, path: &Path) -> MtxResult<()> {
		if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, self.to_json_pretty()?)?;
		Ok(())
	}
}

impl OperationReport {
	pub fn operator(&self) -> &str {
		&self.operator
	}

	pub fn targets_applied(&self) -> usize {
		self.targets_applied
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn is_ok(&self) -> bool {
		self.error.is_none()
	}
}
