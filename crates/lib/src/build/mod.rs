//! Build orchestration.
//!
//! A build prepares the output directories, then runs each selected pass in
//! fixed order (native, web-module, host-module), and within a pass every
//! target in registration order. The first failing invocation ends the run:
//! no later target or pass is attempted.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::command::{Command, Pass, Toolchain};
use crate::execute::Executor;
use crate::target::{OutputDirs, Registry, Target};

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("failed to create output directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("output directory {0} exists but is not a directory")]
  NotADirectory(PathBuf),

  #[error("{pass} build of {target} failed: {command}")]
  ToolchainFailed {
    pass: Pass,
    target: String,
    command: String,
  },
}

/// Everything a build needs besides the registry and the executor.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Directory the output directories are created under.
  pub root: PathBuf,
  pub output_dirs: OutputDirs,
  pub toolchain: Toolchain,
  /// Passes to run; normalized into run order before use.
  pub passes: Vec<Pass>,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      output_dirs: OutputDirs::default(),
      toolchain: Toolchain::default(),
      passes: Pass::ALL.to_vec(),
    }
  }
}

/// Summary of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
  /// Toolchain invocations that ran, all of which succeeded.
  pub invocations: usize,
  pub elapsed: Duration,
}

/// One planned invocation.
#[derive(Debug, Clone)]
pub struct Step<'a> {
  pub pass: Pass,
  pub target: &'a Target,
  pub command: Command,
}

/// Ensure both output directories exist under `root`. Existing directories are fine.
pub fn prepare_output_dirs(root: &Path, dirs: &OutputDirs) -> Result<(), BuildError> {
  for dir in [&dirs.native, &dirs.module] {
    let path = root.join(dir);

    if path.exists() && !path.is_dir() {
      return Err(BuildError::NotADirectory(path));
    }

    std::fs::create_dir_all(&path).map_err(|source| BuildError::CreateDir {
      path: path.clone(),
      source,
    })?;
    debug!(path = %path.display(), "output directory ready");
  }
  Ok(())
}

/// Every invocation a build of `passes` would make, in execution order.
pub fn plan<'a>(registry: &'a Registry, toolchain: &Toolchain, passes: &[Pass]) -> Vec<Step<'a>> {
  Pass::normalize(passes)
    .into_iter()
    .flat_map(|pass| {
      registry.iter().map(move |target| Step {
        pass,
        target,
        command: toolchain.command(target, pass),
      })
    })
    .collect()
}

/// Run the passes over the registry, stopping at the first failure.
///
/// Returns the number of successful invocations.
pub fn run_passes<E: Executor>(
  registry: &Registry,
  toolchain: &Toolchain,
  passes: &[Pass],
  executor: &mut E,
) -> Result<usize, BuildError> {
  let mut invocations = 0;

  for pass in Pass::normalize(passes) {
    info!(pass = %pass, targets = registry.len(), "starting pass");

    for target in registry {
      let command = toolchain.command(target, pass);
      debug!(pass = %pass, target = %target.name, output = pass.output(target), "building");

      if !executor.run(&command) {
        error!(pass = %pass, target = %target.name, "toolchain invocation failed");
        return Err(BuildError::ToolchainFailed {
          pass,
          target: target.name.clone(),
          command: command.to_string(),
        });
      }
      invocations += 1;
    }
  }

  Ok(invocations)
}

/// Prepare output directories and run every selected pass.
pub fn build<E: Executor>(
  options: &BuildOptions,
  registry: &Registry,
  executor: &mut E,
) -> Result<BuildReport, BuildError> {
  let start = Instant::now();

  prepare_output_dirs(&options.root, &options.output_dirs)?;
  let invocations = run_passes(registry, &options.toolchain, &options.passes, executor)?;

  let report = BuildReport {
    invocations,
    elapsed: start.elapsed(),
  };
  info!(invocations, elapsed_ms = report.elapsed.as_millis() as u64, "build complete");
  Ok(report)
}
