mod common;

use clap::Parser;
use mtx_cli::Commands;
use mtx_cli::MtxCli;
use mtx_core::AnyEmptyResult;
use serde_json::Value;
use serde_json::json;

const FLAGS: &str = r#"{
  "enabled": true,
  "root": { "enabled": true, "child": { "enabled": true } },
  "items": [{ "enabled": true }, { "meta": { "enabled": true } }]
}"#;

fn read_json(path: &std::path::Path) -> Result<Value, Box<dyn std::error::Error>> {
	Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

#[test]
fn apply_inline_operations_in_place() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("flags.json");
	std::fs::write(&input, FLAGS)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("apply")
		.arg("--input")
		.arg(&input)
		.arg("--op")
		.arg(r#"{"op":"set","path":"**.enabled","value":false}"#)
		.arg("--op")
		.arg(r#"{"operator":"remove","target":"root.child"}"#)
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"2 operation(s): 2 succeeded, 0 failed, 6 target(s) applied.",
		));

	assert_eq!(
		read_json(&input)?,
		json!({
			"enabled": false,
			"root": { "enabled": false },
			"items": [{ "enabled": false }, { "meta": { "enabled": false } }]
		})
	);

	Ok(())
}

#[test]
fn apply_operations_file_to_yaml_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("site.json");
	let ops = tmp.path().join("ops.yaml");
	let output = tmp.path().join("out/site.yaml");
	let report = tmp.path().join("report.json");
	std::fs::write(&input, r#"{ "site": { "name": "Old" }, "tags": [] }"#)?;
	std::fs::write(
		&ops,
		"operations:\n  - op: merge\n    path: site\n    value:\n      environment: ci\n  - op: \
		 append\n    path: tags\n    value: rust\n",
	)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("apply")
		.arg("-i")
		.arg(&input)
		.arg("--ops")
		.arg(&ops)
		.arg("-o")
		.arg(&output)
		.arg("--report")
		.arg(&report)
		.assert()
		.success();

	let rendered = std::fs::read_to_string(&output)?;
	assert!(rendered.contains("environment: ci"), "{rendered}");
	assert!(rendered.contains("- rust"), "{rendered}");
	assert_eq!(read_json(&report)?["OperationsSucceeded"], json!(2));

	Ok(())
}

#[test]
fn apply_guard_violation_fails_without_writing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("flags.json");
	std::fs::write(&input, FLAGS)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("apply")
		.arg("--input")
		.arg(&input)
		.arg("--op")
		.arg(r#"{"op":"set","path":"items[*]","value":null,"maxTargets":1}"#)
		.assert()
		.code(1)
		.stderr(predicates::str::contains(
			"expected at most 1 matching target(s), found 2",
		));

	assert_eq!(read_json(&input)?, serde_json::from_str::<Value>(FLAGS)?);

	Ok(())
}

#[test]
fn apply_non_strict_keeps_going() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.json");
	std::fs::write(&input, r#"{ "draft": true }"#)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("apply")
		.arg("--input")
		.arg(&input)
		.arg("--no-strict")
		.arg("--op")
		.arg(r#"{"op":"unknown-op","path":"a"}"#)
		.arg("--op")
		.arg(r#"{"op":"remove","path":"draft"}"#)
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"warning: #1 unknown-op: operation 'unknown-op' is not supported",
		))
		.stdout(predicates::str::contains("1 succeeded, 1 failed"));

	assert_eq!(read_json(&input)?, json!({}));

	Ok(())
}

#[test]
fn apply_dry_run_prints_the_document() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.json");
	std::fs::write(&input, r#"{ "a": 1 }"#)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("apply")
		.arg("--input")
		.arg(&input)
		.arg("--dry-run")
		.arg("--op")
		.arg(r#"{"op":"set","path":"b","value":2}"#)
		.assert()
		.success()
		.stdout(predicates::str::contains("\"b\": 2"));

	assert_eq!(read_json(&input)?, json!({ "a": 1 }));

	Ok(())
}

#[test]
fn apply_diff_shows_changed_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.json");
	std::fs::write(&input, r#"{ "name": "Old" }"#)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("apply")
		.arg("--input")
		.arg(&input)
		.arg("--diff")
		.arg("--dry-run")
		.arg("--op")
		.arg(r#"{"op":"replace","path":"name","value":"New"}"#)
		.assert()
		.success()
		.stdout(predicates::str::contains("-  \"name\": \"Old\""))
		.stdout(predicates::str::contains("+  \"name\": \"New\""));

	Ok(())
}

#[test]
fn apply_json_format() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.json");
	std::fs::write(&input, r#"{ "a": 1 }"#)?;

	let mut cmd = common::mtx_cmd();
	let output = cmd
		.arg("apply")
		.arg("--input")
		.arg(&input)
		.arg("--format")
		.arg("json")
		.arg("--dry-run")
		.arg("--op")
		.arg(r#"{"op":"move","from":"a","path":"b"}"#)
		.output()?;

	assert!(output.status.success());
	let value: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(value["success"], json!(true));
	assert_eq!(value["document"], json!({ "b": 1 }));
	assert_eq!(value["report"]["Operations"][0]["TargetsApplied"], json!(1));

	Ok(())
}

#[test]
fn apply_rejects_malformed_paths() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.json");
	std::fs::write(&input, r#"{ "items": [] }"#)?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("apply")
		.arg("--input")
		.arg(&input)
		.arg("--op")
		.arg(r#"{"op":"set","path":"items[-1]","value":1}"#)
		.assert()
		.code(1)
		.stderr(predicates::str::contains("array index cannot be negative"));

	Ok(())
}

#[test]
fn apply_invalid_operation_json_exits_with_two() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.json");
	std::fs::write(&input, "{}")?;

	let mut cmd = common::mtx_cmd();
	cmd.arg("apply")
		.arg("--input")
		.arg(&input)
		.arg("--op")
		.arg("{not json")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to load operations from `--op`"));

	Ok(())
}

#[test]
fn apply_requires_operations() {
	let result = MtxCli::try_parse_from(["mtx", "apply", "--input", "doc.json"]);

	assert!(result.is_err());
}

#[test]
fn parse_apply_arguments() {
	let cli = MtxCli::parse_from([
		"mtx",
		"apply",
		"--input",
		"doc.json",
		"--op",
		"{}",
		"--no-strict",
	]);
	let Some(Commands::Apply {
		input,
		op,
		no_strict,
		dry_run,
		..
	}) = cli.command
	else {
		panic!("expected the apply command");
	};

	assert_eq!(input, std::path::PathBuf::from("doc.json"));
	assert_eq!(op, vec!["{}".to_string()]);
	assert!(no_strict);
	assert!(!dry_run);
}
