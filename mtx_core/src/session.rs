use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::Node;
use crate::Operation;
use crate::TransformReport;
use crate::execute;

/// Lifecycle of a transform session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	Ready,
	Running,
	Succeeded,
	Failed,
}

/// Applies an ordered list of operations to one document.
///
/// In strict mode the first failing operation stops the session; the
/// document keeps every mutation made before it. In non-strict mode failures
/// are recorded and the remaining operations still run.
#[derive(Debug)]
pub struct TransformSession {
	strict: bool,
	state: SessionState,
}

/// What a finished session hands back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
	pub state: SessionState,
	pub report: TransformReport,
	/// The fatal error in strict mode.
	pub error: Option<String>,
}

impl SessionOutcome {
	pub fn success(&self) -> bool {
		self.state == SessionState::Succeeded
	}
}

impl Default for TransformSession {
	fn default() -> Self {
		Self::new(true)
	}
}

impl TransformSession {
	pub fn new(strict: bool) -> Self {
		Self {
			strict,
			state: SessionState::Ready,
		}
	}

	pub fn is_strict(&self) -> bool {
		self.strict
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Run every operation against `document`, in declared order.
	#[instrument(name = "transform", skip_all, fields(strict = self.strict, operations = operations.len()))]
	pub fn run(mut self, document: &mut Node, operations: &[Operation]) -> SessionOutcome {
		self.state = SessionState::Running;
		let mut report = TransformReport::new(operations.len());
		let mut error = None;

		for (position, operation) in operations.iter().enumerate() {
			match execute(document, operation) {
				Ok(targets) => {
					debug!(
						position,
						op = %operation.op,
						path = %operation.path,
						targets,
						"operation applied"
					);
					report.record_success(&operation.op, targets);
				}
				Err(e) => {
					let message = e.to_string();
					report.record_failure(&operation.op, message.clone());

					if self.strict {
						debug!(position, op = %operation.op, error = %message, "operation failed");
						error = Some(message);
						self.state = SessionState::Failed;
						break;
					}

					warn!(position, op = %operation.op, error = %message, "operation failed, continuing");
				}
			}
		}

		if self.state == SessionState::Running {
			self.state = SessionState::Succeeded;
		}

		info!(
			succeeded = report.operations_succeeded(),
			failed = report.operations_failed(),
			state = ?self.state,
			"transform finished"
		);

		SessionOutcome {
			state: self.state,
			report,
			error,
		}
	}
}

/// The terminal outputs of [`transform`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
	pub document: Node,
	pub report: TransformReport,
	pub success: bool,
	pub error: Option<String>,
}

/// Apply `operations` to an owned document.
///
/// ```rust
/// use mtx_core::Operation;
/// use mtx_core::transform;
///
/// let document = serde_json::json!({ "site": { "name": "Old" } }).into();
/// let result = transform(document, &[Operation::set("site.name", "New")], true);
///
/// assert!(result.success);
/// assert_eq!(result.document.pointer("site.name").and_then(|n| n.as_str()), Some("New"));
/// ```
pub fn transform(mut document: Node, operations: &[Operation], strict: bool) -> Transformed {
	let outcome = TransformSession::new(strict).run(&mut document, operations);

	Transformed {
		success: outcome.success(),
		document,
		report: outcome.report,
		error: outcome.error,
	}
}
