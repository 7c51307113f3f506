use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DocumentFormat;
use crate::MtxError;
use crate::MtxResult;
use crate::Node;
use crate::Operation;
use crate::load_document;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["mtx.toml", ".mtx.toml", ".config/mtx.toml"];

/// Configuration loaded from an `mtx.toml` file.
///
/// ```toml
/// strict = true
///
/// [[transform]]
/// name = "site"
/// input = "site.json"
/// output = "dist/site.json"
/// report = "reports/site.json"
/// operations = [
///   { op = "set", path = "site.name", value = "New" },
///   { op = "remove", path = "draft" },
/// ]
///
/// [[transform]]
/// name = "nav"
/// input = "nav.yaml"
/// strict = false
/// operations_file = "nav-ops.json"
/// ```
#[derive(Debug, Deserialize)]
pub struct MtxConfig {
	/// Default strictness for transforms that do not set their own. Defaults
	/// to `true`.
	#[serde(default = "default_strict")]
	pub strict: bool,
	/// Transforms in the order they run.
	#[serde(default, rename = "transform")]
	pub transforms: Vec<TransformConfig>,
}

/// One `[[transform]]` entry: a document, its operations and where the
/// results go.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
	pub name: String,
	/// Input document, relative to the project root.
	pub input: PathBuf,
	/// Output document. Defaults to `input`, rewriting it in place.
	#[serde(default)]
	pub output: Option<PathBuf>,
	/// Where to write the JSON report, if anywhere.
	#[serde(default)]
	pub report: Option<PathBuf>,
	/// Overrides the top-level `strict` flag.
	#[serde(default)]
	pub strict: Option<bool>,
	/// Forces the document format instead of detecting it from extensions.
	#[serde(default)]
	pub format: Option<DocumentFormat>,
	/// Inline operations, applied before those from `operations_file`.
	#[serde(default)]
	pub operations: Vec<OperationEntry>,
	/// A JSON, YAML or TOML file holding a list of operations (or a table
	/// with an `operations` list).
	#[serde(default, alias = "operationsFile")]
	pub operations_file: Option<PathBuf>,
}

/// An operation as written in configuration. Accepts the canonical field
/// names and the documented aliases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationEntry {
	#[serde(alias = "operator", alias = "operation")]
	pub op: String,
	#[serde(alias = "target")]
	pub path: String,
	#[serde(default, alias = "source")]
	pub from: Option<String>,
	#[serde(default)]
	pub value: Option<Node>,
	#[serde(default)]
	pub index: Option<i64>,
	#[serde(default, rename = "maxTargets", alias = "max_targets")]
	pub max_targets: Option<usize>,
	#[serde(default, rename = "exactTargets", alias = "exact_targets")]
	pub exact_targets: Option<usize>,
}

impl From<OperationEntry> for Operation {
	fn from(entry: OperationEntry) -> Self {
		Self {
			op: entry.op,
			path: entry.path,
			from: entry.from,
			value: entry.value,
			index: entry.index,
			max_targets: entry.max_targets,
			exact_targets: entry.exact_targets,
		}
	}
}

fn default_strict() -> bool {
	true
}

impl MtxConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> MtxResult<Option<MtxConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::parse(&content).map(Some)
	}

	pub fn parse(content: &str) -> MtxResult<MtxConfig> {
		toml::from_str(content).map_err(|e| MtxError::ConfigParse(e.to_string()))
	}

	/// Find a transform by name.
	pub fn transform(&self, name: &str) -> MtxResult<&TransformConfig> {
		self.transforms
			.iter()
			.find(|transform| transform.name == name)
			.ok_or_else(|| MtxError::UnknownTransform(name.to_string()))
	}
}

impl TransformConfig {
	/// Strictness after applying the top-level default.
	pub fn is_strict(&self, config: &MtxConfig) -> bool {
		self.strict.unwrap_or(config.strict)
	}

	pub fn output_path(&self) -> &Path {
		self.output.as_deref().unwrap_or(&self.input)
	}

	/// Collect the inline operations followed by those in
	/// `operations_file`.
	pub fn load_operations(&self, root: &Path) -> MtxResult<Vec<Operation>> {
		let mut operations: Vec<Operation> =
			self.operations.iter().cloned().map(Operation::from).collect();

		if let Some(file) = &self.operations_file {
			operations.extend(load_operations(&root.join(file))?);
		}

		Ok(operations)
	}
}

/// Load operations from a JSON, YAML or TOML file. The file holds either a
/// list of operations or a table with an `operations` list.
pub fn load_operations(path: &Path) -> MtxResult<Vec<Operation>> {
	let document = load_document(path, None)?;
	parse_operations(document, &path.display().to_string())
}

/// Convert a parsed document into operations.
pub fn parse_operations(document: Node, path_display: &str) -> MtxResult<Vec<Operation>> {
	let list = match document {
		Node::Array(items) => Node::Array(items),
		Node::Object(mut map) => {
			map.shift_remove("operations")
				.ok_or_else(|| MtxError::OperationsParse {
					path: path_display.to_string(),
					reason: "expected a list of operations or an `operations` key".to_string(),
				})?
		}
		Node::Scalar(_) => {
			return Err(MtxError::OperationsParse {
				path: path_display.to_string(),
				reason: "expected a list of operations".to_string(),
			});
		}
	};

	let entries: Vec<OperationEntry> =
		serde_json::from_value(serde_json::Value::from(list)).map_err(|e| {
			MtxError::OperationsParse {
				path: path_display.to_string(),
				reason: e.to_string(),
			}
		})?;

	Ok(entries.into_iter().map(Operation::from).collect())
}
