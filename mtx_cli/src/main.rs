use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use mtx_cli::Commands;
use mtx_cli::MtxCli;
use mtx_cli::OutputFormat;
use mtx_core::AnyEmptyResult;
use mtx_core::DocumentFormat;
use mtx_core::MtxConfig;
use mtx_core::MtxError;
use mtx_core::MtxResult;
use mtx_core::Node;
use mtx_core::Operation;
use mtx_core::PathExpr;
use mtx_core::ResolveMode;
use mtx_core::RunOptions;
use mtx_core::TaskResult;
use mtx_core::TransformReport;
use mtx_core::load_document;
use mtx_core::load_operations;
use mtx_core::parse_operations;
use mtx_core::render_document;
use mtx_core::resolve;
use mtx_core::run_config;
use mtx_core::transform;
use mtx_core::write_document;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = MtxCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Run {
			names,
			dry_run,
			format,
		}) => run_transforms(&args, names, *dry_run, *format),
		Some(Commands::Apply {
			input,
			ops,
			op,
			output,
			report,
			no_strict,
			dry_run,
			diff,
			format,
		}) => {
			run_apply(&ApplyArgs {
				input,
				ops: ops.as_deref(),
				op,
				output: output.as_deref(),
				report: report.as_deref(),
				strict: !no_strict,
				dry_run: *dry_run,
				diff: *diff,
				format: *format,
			})
		}
		Some(Commands::Query {
			input,
			expression,
			format,
		}) => run_query(input, expression, *format),
		None => {
			eprintln!("No subcommand specified. Run `mtx --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<MtxError>() {
			Ok(mtx_err) => {
				let report: miette::Report = (*mtx_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr. `MTX_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env("MTX_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.try_init()
		.ok();
}

fn resolve_root(args: &MtxCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_transforms(
	args: &MtxCli,
	names: &[String],
	dry_run: bool,
	format: OutputFormat,
) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config = MtxConfig::load(&root)?
		.ok_or_else(|| MtxError::MissingConfig(root.display().to_string()))?;

	if config.transforms.is_empty() {
		println!("No transforms configured.");
		return Ok(());
	}

	let results = run_config(&root, &config, names, RunOptions { dry_run })?;
	let failed = results.iter().filter(|result| !result.success).count();

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = results
				.iter()
				.map(|result| task_json(result, &root))
				.collect();
			let output = serde_json::json!({
				"ok": failed == 0,
				"transforms": entries,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			for result in &results {
				print_task(result, &root, args.verbose);
			}

			println!();
			if failed == 0 {
				println!(
					"{}",
					colored!(format!("{} transform(s) succeeded.", results.len()), green)
				);
			} else {
				eprintln!(
					"{}",
					colored!(
						format!("{failed} of {} transform(s) failed.", results.len()),
						red
					)
				);
			}
		}
	}

	if failed > 0 {
		process::exit(1);
	}

	Ok(())
}

fn print_task(result: &TaskResult, root: &Path, verbose: bool) {
	let report = &result.report;
	let marker = if result.success {
		colored!("ok", green)
	} else {
		colored!("failed", red)
	};

	println!(
		"{} {marker} ({} succeeded, {} failed of {})",
		colored!(&result.name, bold),
		report.operations_succeeded(),
		report.operations_failed(),
		report.operations_total()
	);

	if let Some(error) = &result.error {
		println!("  {} {error}", colored!("error:", red));
	} else if report.operations_failed() > 0 {
		print_failed_operations(report);
	}

	if verbose {
		print_report_entries(report);
	}

	if let Some(output) = &result.output {
		println!("  wrote {}", make_relative(output, root));
	}
	if let Some(path) = &result.report_path {
		println!("  report {}", make_relative(path, root));
	}
}

fn print_failed_operations(report: &TransformReport) {
	for (position, entry) in report.operations().iter().enumerate() {
		if let Some(error) = entry.error() {
			println!(
				"  {} #{} {}: {error}",
				colored!("warning:", yellow),
				position + 1,
				entry.operator()
			);
		}
	}
}

fn print_report_entries(report: &TransformReport) {
	for (position, entry) in report.operations().iter().enumerate() {
		match entry.error() {
			Some(error) => println!("  #{} {} failed: {error}", position + 1, entry.operator()),
			None => {
				println!(
					"  #{} {} applied to {} target(s)",
					position + 1,
					entry.operator(),
					entry.targets_applied()
				);
			}
		}
	}
}

fn task_json(result: &TaskResult, root: &Path) -> serde_json::Value {
	serde_json::json!({
		"name": result.name,
		"success": result.success,
		"strict": result.strict,
		"error": result.error,
		"output": result.output.as_deref().map(|path| make_relative(path, root)),
		"report": result.report,
	})
}

struct ApplyArgs<'a> {
	input: &'a Path,
	ops: Option<&'a Path>,
	op: &'a [String],
	output: Option<&'a Path>,
	report: Option<&'a Path>,
	strict: bool,
	dry_run: bool,
	diff: bool,
	format: OutputFormat,
}

fn run_apply(args: &ApplyArgs<'_>) -> AnyEmptyResult {
	let document = load_document(args.input, None)?;
	let operations = match args.ops {
		Some(path) => load_operations(path)?,
		None => inline_operations(args.op)?,
	};

	let output_path = args.output.unwrap_or(args.input);
	let output_format = DocumentFormat::from_path(output_path)?;
	let before = render_document(&document, output_format)?;

	let result = transform(document, &operations, args.strict);
	let after = render_document(&result.document, output_format)?;

	if !args.dry_run {
		if result.success {
			write_document(output_path, &result.document, Some(output_format))?;
		}
		if let Some(path) = args.report {
			result.report.write_to(path)?;
		}
	}

	match args.format {
		OutputFormat::Json => {
			let mut output = serde_json::json!({
				"success": result.success,
				"error": result.error,
				"report": result.report,
			});
			if args.dry_run {
				output["document"] = serde_json::Value::from(result.document.clone());
			}
			println!("{output}");
		}
		OutputFormat::Text => {
			if args.diff {
				print_diff(&before, &after);
			} else if args.dry_run {
				print!("{after}");
			}

			print_summary(&result.report, result.error.as_deref());
			if result.success && !args.dry_run {
				println!("Wrote {}.", output_path.display());
			}
		}
	}

	if !result.success {
		process::exit(1);
	}

	Ok(())
}

/// Collect `--op` JSON objects into operations.
fn inline_operations(raw: &[String]) -> MtxResult<Vec<Operation>> {
	let items = raw
		.iter()
		.map(|op| {
			serde_json::from_str::<serde_json::Value>(op)
				.map(Node::from)
				.map_err(|e| {
					MtxError::OperationsParse {
						path: "--op".to_string(),
						reason: e.to_string(),
					}
				})
		})
		.collect::<MtxResult<Vec<_>>>()?;

	parse_operations(Node::Array(items), "--op")
}

fn print_summary(report: &TransformReport, error: Option<&str>) {
	let line = format!(
		"{} operation(s): {} succeeded, {} failed, {} target(s) applied.",
		report.operations_total(),
		report.operations_succeeded(),
		report.operations_failed(),
		report.targets_applied()
	);

	match error {
		Some(error) => {
			eprintln!("{} {error}", colored!("error:", red));
			eprintln!("{line}");
		}
		None => {
			print_failed_operations(report);
			println!("{line}");
		}
	}
}

fn run_query(input: &Path, expression: &str, format: OutputFormat) -> AnyEmptyResult {
	let document = load_document(input, None)?;
	let path = PathExpr::parse(expression)?;
	let locations = resolve(&document, &path, ResolveMode::Existing)?;

	match format {
		OutputFormat::Json => {
			let matches: Vec<serde_json::Value> = locations
				.iter()
				.map(|location| {
					serde_json::json!({
						"path": location.to_string(),
						"value": location.get(&document).cloned().unwrap_or(Node::NULL),
					})
				})
				.collect();
			println!("{}", serde_json::Value::Array(matches));
		}
		OutputFormat::Text => {
			for location in &locations {
				let value = location.get(&document).cloned().unwrap_or(Node::NULL);
				println!("{} = {value}", colored!(location.to_string(), bold));
			}
			println!("{} match(es) for `{expression}`.", locations.len());
		}
	}

	Ok(())
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("{}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("{}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!(" {change}");
			}
		}
	}
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
