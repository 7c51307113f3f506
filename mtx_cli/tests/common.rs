use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn mtx_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("mtx"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("MTX_LOG");
	cmd
}
