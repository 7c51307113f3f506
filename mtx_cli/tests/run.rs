mod common;

use clap::Parser;
use mtx_cli::Commands;
use mtx_cli::MtxCli;
use mtx_cli::OutputFormat;
use mtx_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;
use serde_json::json;

const SITE: &str = r#"{
  "items": [{ "id": 1 }],
  "legacy": { "items": [{ "id": 0 }] },
  "draft": true,
  "site": { "name": "Old" }
}"#;

const CONFIG: &str = r#"
[[transform]]
name = "site"
input = "site.json"
output = "dist/site.json"
report = "reports/site.json"
operations = [
	{ op = "set", path = "site.name", value = "New" },
	{ op = "replace", path = "site.name", value = "Newest" },
	{ op = "copy", from = "site.name", path = "site.displayName" },
	{ op = "insert", path = "items", index = 0, value = { id = 99 } },
	{ op = "append", path = "items", value = { id = 2 } },
	{ op = "merge", path = "site", value = { environment = "ci" } },
	{ op = "remove", path = "draft" },
]
"#;

fn read_json(path: &std::path::Path) -> Result<Value, Box<dyn std::error::Error>> {
	Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

#[test]
fn run_applies_configured_transforms() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("site.json"), SITE)?;
	std::fs::write(tmp.path().join("mtx.toml"), CONFIG)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("site ok (7 succeeded, 0 failed of 7)"))
		.stdout(predicates::str::contains("wrote dist/site.json"))
		.stdout(predicates::str::contains("1 transform(s) succeeded."));

	let output = read_json(&tmp.path().join("dist/site.json"))?;
	assert_eq!(
		output,
		json!({
			"items": [{ "id": 99 }, { "id": 1 }, { "id": 2 }],
			"legacy": { "items": [{ "id": 0 }] },
			"site": { "name": "Newest", "displayName": "Newest", "environment": "ci" }
		})
	);

	let report = read_json(&tmp.path().join("reports/site.json"))?;
	assert_eq!(report["OperationsTotal"], json!(7));
	assert_eq!(report["OperationsSucceeded"], json!(7));
	assert_eq!(report["OperationsFailed"], json!(0));
	assert_eq!(report["Operations"][3]["Operator"], json!("insert"));

	Ok(())
}

#[test]
fn run_exits_with_one_when_a_transform_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("site.json"), SITE)?;
	std::fs::write(
		tmp.path().join("mtx.toml"),
		r#"
[[transform]]
name = "site"
input = "site.json"
report = "report.json"
operations = [
	{ op = "set", path = "site.name", value = "New" },
	{ op = "insert", path = "items", value = 1 },
]
"#,
	)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("insert requires non-negative index"))
		.stderr(predicates::str::contains("1 of 1 transform(s) failed."));

	// The input is left untouched; the report is still written.
	let input = read_json(&tmp.path().join("site.json"))?;
	assert_eq!(input["site"]["name"], json!("Old"));
	let report = read_json(&tmp.path().join("report.json"))?;
	assert_eq!(report["OperationsFailed"], json!(1));
	assert_eq!(
		report["Operations"][1]["Error"],
		json!("insert requires non-negative index")
	);

	Ok(())
}

#[test]
fn run_non_strict_records_failures() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("site.json"), SITE)?;
	std::fs::write(
		tmp.path().join("mtx.toml"),
		r#"
strict = false

[[transform]]
name = "site"
input = "site.json"
operations = [
	{ op = "remove", path = "missing" },
	{ op = "remove", path = "draft" },
]
"#,
	)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("site ok (1 succeeded, 1 failed of 2)"))
		.stdout(predicates::str::contains(
			"warning: #1 remove: path `missing` does not resolve to any value",
		));

	let output = read_json(&tmp.path().join("site.json"))?;
	assert!(output.get("draft").is_none());

	Ok(())
}

#[test]
fn run_only_named_transforms() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.json"), r#"{ "name": "a" }"#)?;
	std::fs::write(tmp.path().join("b.yaml"), "name: b\n")?;
	std::fs::write(
		tmp.path().join("mtx.toml"),
		r#"
[[transform]]
name = "a"
input = "a.json"
operations = [{ op = "set", path = "done", value = true }]

[[transform]]
name = "b"
input = "b.yaml"
operations = [{ op = "set", path = "done", value = true }]
"#,
	)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("run")
		.arg("b")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("b ok").and(predicates::str::contains("a ok").not()));

	assert_eq!(read_json(&tmp.path().join("a.json"))?, json!({ "name": "a" }));
	let b = std::fs::read_to_string(tmp.path().join("b.yaml"))?;
	assert!(b.contains("done: true"), "{b}");

	Ok(())
}

#[test]
fn run_dry_run_writes_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("site.json"), SITE)?;
	std::fs::write(tmp.path().join("mtx.toml"), CONFIG)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("run")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert!(!tmp.path().join("dist").exists());
	assert!(!tmp.path().join("reports").exists());

	Ok(())
}

#[test]
fn run_json_format() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("site.json"), SITE)?;
	std::fs::write(tmp.path().join("mtx.toml"), CONFIG)?;

	let mut cmd = common::mtx_cmd();
	let output = cmd
		.arg("run")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());
	let value: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(value["ok"], json!(true));
	assert_eq!(value["transforms"][0]["name"], json!("site"));
	assert_eq!(value["transforms"][0]["output"], json!("dist/site.json"));
	assert_eq!(value["transforms"][0]["report"]["OperationsSucceeded"], json!(7));

	Ok(())
}

#[test]
fn run_without_config_exits_with_two() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no config file found"));

	Ok(())
}

#[test]
fn run_unknown_transform_exits_with_two() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("site.json"), SITE)?;
	std::fs::write(tmp.path().join("mtx.toml"), CONFIG)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("run")
		.arg("docs")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unknown transform: `docs`"));

	Ok(())
}

#[test]
fn run_discovers_dot_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(tmp.path().join("site.json"), SITE)?;
	std::fs::write(tmp.path().join(".config/mtx.toml"), CONFIG)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert!(tmp.path().join("dist/site.json").is_file());

	Ok(())
}

#[test]
fn parse_run_arguments() {
	let cli = MtxCli::parse_from(["mtx", "run", "site", "nav", "--dry-run", "--format", "json"]);
	let Some(Commands::Run {
		names,
		dry_run,
		format,
	}) = cli.command
	else {
		panic!("expected the run command");
	};

	assert_eq!(names, vec!["site".to_string(), "nav".to_string()]);
	assert!(dry_run);
	assert_eq!(format, OutputFormat::Json);
}
