mod build;
mod info;
mod list;
mod plan;

pub use build::cmd_build;
pub use info::cmd_info;
pub use list::cmd_list;
pub use plan::cmd_plan;

use std::path::PathBuf;

use anyhow::{Context, Result};

use exbuild_lib::command::Toolchain;
use exbuild_lib::target::{OutputDirs, Registry};

/// Settings shared by every subcommand, resolved from global flags.
#[derive(Debug, Clone)]
pub struct Workspace {
  /// Directory toolchain invocations run in and output directories are created under.
  pub root: PathBuf,
  pub toolchain: Toolchain,
  pub output_dirs: OutputDirs,
}

impl Workspace {
  /// The built-in registry, narrowed to `targets` when any are named.
  pub fn registry(&self, targets: &[String]) -> Result<Registry> {
    let registry = Registry::builtin(&self.output_dirs).context("Invalid target registry")?;
    registry.filter(targets).context("Invalid target selection")
  }
}
