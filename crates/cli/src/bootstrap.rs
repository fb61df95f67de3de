//! Self-rebuild wiring for the `exbuild` binary.
//!
//! The orchestrator's sources are the cargo workspace it was compiled from.
//! When the running binary is the one cargo produced inside that workspace
//! and any workspace source is newer, it is rebuilt with cargo and relaunched
//! with the original arguments.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use exbuild_lib::command::Command;
use exbuild_lib::consts::APP_NAME;
use exbuild_lib::execute::SystemExecutor;
use exbuild_lib::rebuild::{Bootstrap, SelfRebuild, relaunch};

fn workspace_dir() -> PathBuf {
  let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
  manifest_dir
    .ancestors()
    .nth(2)
    .map(Path::to_path_buf)
    .unwrap_or_else(|| manifest_dir.to_path_buf())
}

fn cargo_command(workspace: &Path) -> Command {
  let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
  let mut cmd = Command::new(cargo);
  cmd.args(["build", "--manifest-path"]);
  cmd.arg(workspace.join("Cargo.toml").to_string_lossy());
  cmd.args(["--bin", APP_NAME]);
  if !cfg!(debug_assertions) {
    cmd.arg("--release");
  }
  cmd
}

/// Where cargo puts this workspace's build output, following `CARGO_TARGET_DIR`.
fn target_dir(workspace: &Path, configured: Option<OsString>) -> PathBuf {
  match configured {
    Some(dir) if !dir.is_empty() => workspace.join(dir),
    _ => workspace.join("target"),
  }
}

/// The rebuild collaborator for this binary, or `None` when it does not live
/// in its workspace's target directory (installed copies are never rebuilt).
fn self_rebuild() -> Result<Option<SelfRebuild>> {
  let binary = std::env::current_exe().context("Failed to locate the running executable")?;
  let workspace = workspace_dir();
  let target = target_dir(&workspace, std::env::var_os("CARGO_TARGET_DIR"));

  if !binary.starts_with(&target) {
    debug!(
      binary = %binary.display(),
      target = %target.display(),
      "running outside the workspace target directory; self-rebuild disabled"
    );
    return Ok(None);
  }

  let sources = vec![workspace.join("Cargo.toml"), workspace.join("crates")];
  Ok(Some(SelfRebuild::new(binary, sources, cargo_command(&workspace))))
}

/// Rebuild and relaunch when stale. Only returns when the current binary is fresh.
pub fn go_rebuild_self() -> Result<()> {
  let Some(rebuild) = self_rebuild()? else {
    return Ok(());
  };

  let mut executor = SystemExecutor::new();
  match rebuild.run(&mut executor).context("Self-rebuild failed")? {
    Bootstrap::Continue => Ok(()),
    Bootstrap::Rebuilt => {
      let args: Vec<OsString> = std::env::args_os().skip(1).collect();
      let code = relaunch(rebuild.binary(), &args)?;
      std::process::exit(code);
    }
  }
}
