use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::MtxError;
use crate::MtxResult;
use crate::Node;

/// Serialized forms a document can be loaded from and written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum DocumentFormat {
	Json,
	Yaml,
	Toml,
}

impl DocumentFormat {
	/// Detect the format from a file extension (`json`, `yaml`, `yml`,
	/// `toml`).
	pub fn from_extension(extension: &str) -> Option<Self> {
		match extension.to_ascii_lowercase().as_str() {
			"json" => Some(Self::Json),
			"yaml" | "yml" => Some(Self::Yaml),
			"toml" => Some(Self::Toml),
			_ => None,
		}
	}

	/// Detect the format of `path` from its extension.
	pub fn from_path(path: &Path) -> MtxResult<Self> {
		let extension = path
			.extension()
			.and_then(|extension| extension.to_str())
			.unwrap_or("");

		Self::from_extension(extension).ok_or_else(|| {
			MtxError::UnsupportedFormat(if extension.is_empty() {
				path.display().to_string()
			} else {
				extension.to_string()
			})
		})
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Yaml => "yaml",
			Self::Toml => "toml",
		}
	}
}

impl Display for DocumentFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for DocumentFormat {
	type Err = MtxError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Self::from_extension(value.trim()).ok_or_else(|| MtxError::UnsupportedFormat(value.to_string()))
	}
}

/// Parse document text. `path_display` only feeds error messages.
pub fn parse_document(content: &str, format: DocumentFormat, path_display: &str) -> MtxResult<Node> {
	let parse_error = |reason: String| MtxError::DocumentParse {
		path: path_display.to_string(),
		reason,
	};

	let value: serde_json::Value = match format {
		DocumentFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
		DocumentFormat::Yaml => {
			serde_yaml_ng::from_str(content).map_err(|e| parse_error(e.to_string()))?
		}
		DocumentFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
	};

	Ok(Node::from(value))
}

/// Render a document. JSON is pretty printed with a trailing newline.
pub fn render_document(node: &Node, format: DocumentFormat) -> MtxResult<String> {
	let render_error = |reason: String| MtxError::DocumentRender { format, reason };

	match format {
		DocumentFormat::Json => {
			let mut rendered =
				serde_json::to_string_pretty(node).map_err(|e| render_error(e.to_string()))?;
			rendered.push('\n');
			Ok(rendered)
		}
		DocumentFormat::Yaml => serde_yaml_ng::to_string(node).map_err(|e| render_error(e.to_string())),
		DocumentFormat::Toml => toml::to_string_pretty(node).map_err(|e| render_error(e.to_string())),
	}
}

/// Read and parse the document at `path`. The format comes from the file
/// extension unless one is given.
pub fn load_document(path: &Path, format: Option<DocumentFormat>) -> MtxResult<Node> {
	let format = match format {
		Some(format) => format,
		None => DocumentFormat::from_path(path)?,
	};

	let content = std::fs::read_to_string(path).map_err(|e| MtxError::DocumentParse {
		path: path.display().to_string(),
		reason: e.to_string(),
	})?;

	parse_document(&content, format, &path.display().to_string())
}

/// Render `node` and write it to `path`, creating parent directories.
pub fn write_document(path: &Path, node: &Node, format: Option<DocumentFormat>) -> MtxResult<()> {
	let format = match format {
		Some(format) => format,
		None => DocumentFormat::from_path(path)?,
	};

	let rendered = render_document(node, format)?;
	if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, rendered)?;

	Ok(())
}
