//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated build root with a stub compiler.
///
/// The stub appends its arguments to `cc.log`, creates whatever file follows
/// `-o` and exits with the configured status.
pub struct TestEnv {
  pub temp: TempDir,
  pub compiler: PathBuf,
}

impl TestEnv {
  /// A stub compiler that always succeeds.
  pub fn succeeding() -> Self {
    Self::with_exit_code(0)
  }

  /// A stub compiler that always exits non-zero.
  pub fn failing() -> Self {
    Self::with_exit_code(1)
  }

  fn with_exit_code(code: i32) -> Self {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let compiler = temp.path().join("stub-cc");
    let log = temp.path().join("cc.log");
    let script = format!(
      r#"#!/bin/sh
echo "$@" >> "{log}"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
if [ {code} -eq 0 ] && [ -n "$out" ]; then : > "$out"; fi
exit {code}
"#,
      log = log.display(),
      code = code
    );
    std::fs::write(&compiler, script).unwrap();
    std::fs::set_permissions(&compiler, std::fs::Permissions::from_mode(0o755)).unwrap();

    Self { temp, compiler }
  }

  /// Build root (isolated per test).
  pub fn root(&self) -> PathBuf {
    let p = self.temp.path().join("root");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Every invocation the stub compiler received, one line each.
  pub fn invocations(&self) -> Vec<String> {
    std::fs::read_to_string(self.temp.path().join("cc.log"))
      .map(|s| s.lines().map(str::to_string).collect())
      .unwrap_or_default()
  }

  /// Files under the build root, relative and sorted.
  pub fn produced_files(&self) -> Vec<String> {
    let root = self.root();
    let mut files = Vec::new();
    collect_files(&root, &root, &mut files);
    files.sort();
    files
  }

  /// Get a pre-configured Command for the exbuild binary.
  ///
  /// Self-rebuild is disabled and the stub compiler and isolated root are set.
  pub fn exbuild_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("exbuild");
    cmd.arg("--no-rebuild");
    cmd.arg("--root").arg(self.root());
    cmd.arg("--cc").arg(&self.compiler);
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) {
  for entry in std::fs::read_dir(dir).unwrap() {
    let path = entry.unwrap().path();
    if path.is_dir() {
      collect_files(base, &path, out);
    } else {
      out.push(path.strip_prefix(base).unwrap().to_string_lossy().replace('\\', "/"));
    }
  }
}
