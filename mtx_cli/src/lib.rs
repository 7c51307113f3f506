use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Apply ordered, guarded mutations to JSON, YAML and TOML documents.",
	long_about = "mtx (model transformer) applies an ordered list of operations to a structured \
	              document using a small path language: `site.name`, `items[0]`, \
	              `items[*].tags`, `meta['x.y']` and `**.enabled`.\n\nOperations: set, replace, \
	              copy, move, insert, append, merge and remove, each optionally guarded by \
	              `maxTargets` / `exactTargets`.\n\nQuick start:\n  mtx run     Run every \
	              transform in mtx.toml\n  mtx apply   Apply operations to a single document\n  \
	              mtx query   Show what a path matches"
)]
pub struct MtxCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Run the transforms declared in `mtx.toml`.
	///
	/// Each transform loads its input document, applies its operations in
	/// declared order and writes the output document (only when the session
	/// succeeds) and the JSON report. Exits with status 1 when any transform
	/// fails.
	Run {
		/// Only run the transforms with these names, in config order.
		names: Vec<String>,

		/// Run the transforms without writing documents or reports.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Output format for the run summary.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Apply operations to a single document without a config file.
	///
	/// Operations come from a file (`--ops`) holding a list of operations or
	/// from repeated `--op` JSON objects. The document is rewritten in place
	/// unless `--output` is given.
	Apply {
		/// The document to transform (json, yaml, yml or toml).
		#[arg(long, short)]
		input: PathBuf,

		/// A file holding the operations.
		#[arg(long, conflicts_with = "op")]
		ops: Option<PathBuf>,

		/// A single operation as a JSON object, e.g.
		/// `{"op":"set","path":"site.name","value":"New"}`. Repeatable.
		#[arg(long, required_unless_present = "ops")]
		op: Vec<String>,

		/// Where to write the transformed document. Defaults to the input.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Where to write the JSON report.
		#[arg(long)]
		report: Option<PathBuf>,

		/// Record failures and keep going instead of stopping at the first
		/// one.
		#[arg(long, default_value_t = false)]
		no_strict: bool,

		/// Print the transformed document instead of writing it.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Show a unified diff between the input and the transformed
		/// document.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for the result summary.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Print every location a path matches in a document.
	///
	/// Useful to check wildcard paths before guarding them with
	/// `maxTargets` or `exactTargets`.
	Query {
		/// The document to search.
		#[arg(long, short)]
		input: PathBuf,

		/// The path expression.
		#[arg(value_name = "PATH")]
		expression: String,

		/// Output format for the matches.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
