use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use crate::MtxConfig;
use crate::MtxResult;
use crate::Node;
use crate::TransformConfig;
use crate::TransformReport;
use crate::TransformSession;
use crate::load_document;
use crate::write_document;

/// Options for running configured transforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
	/// Run the session but write neither the output document nor the report.
	pub dry_run: bool,
}

/// The result of one configured transform.
#[derive(Debug, Clone)]
pub struct TaskResult {
	pub name: String,
	pub strict: bool,
	pub success: bool,
	/// The fatal error of a failed strict session.
	pub error: Option<String>,
	pub report: TransformReport,
	/// The transformed document, in whatever state the session reached.
	pub document: Node,
	/// Where the document was written, if it was.
	pub output: Option<PathBuf>,
	/// Where the report was written, if it was.
	pub report_path: Option<PathBuf>,
}

/// Load the input of `transform`, run its operations and write the results.
///
/// Configuration and I/O problems are returned as errors. A failing session
/// is not an error: it is reported through [`TaskResult::success`]. The
/// output document is only written when the session succeeds; the report is
/// always written when configured.
pub fn run_transform(
	root: &Path,
	config: &MtxConfig,
	transform: &TransformConfig,
	options: RunOptions,
) -> MtxResult<TaskResult> {
	let strict = transform.is_strict(config);
	let input = root.join(&transform.input);
	let mut document = load_document(&input, transform.format)?;
	let operations = transform.load_operations(root)?;

	debug!(
		name = %transform.name,
		input = %input.display(),
		operations = operations.len(),
		strict,
		"running transform"
	);

	let outcome = TransformSession::new(strict).run(&mut document, &operations);
	let success = outcome.success();

	let mut output = None;
	let mut report_path = None;

	if !options.dry_run {
		if success {
			let path = root.join(transform.output_path());
			write_document(&path, &document, transform.format)?;
			info!(name = %transform.name, output = %path.display(), "wrote document");
			output = Some(path);
		}

		if let Some(report) = &transform.report {
			let path = root.join(report);
			outcome.report.write_to(&path)?;
			report_path = Some(path);
		}
	}

	Ok(TaskResult {
		name: transform.name.clone(),
		strict,
		success,
		error: outcome.error,
		report: outcome.report,
		document,
		output,
		report_path,
	})
}

/// Run every transform in `config` (or only those named in `only`) in
/// declared order. Stops at the first configuration or I/O error.
pub fn run_config(
	root: &Path,
	config: &MtxConfig,
	only: &[String],
	options: RunOptions,
) -> MtxResult<Vec<TaskResult>> {
	for name in only {
		config.transform(name)?;
	}

	config
		.transforms
		.iter()
		.filter(|transform| only.is_empty() || only.contains(&transform.name))
		.map(|transform| run_transform(root, config, transform, options))
		.collect()
}
