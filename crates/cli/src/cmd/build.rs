//! Implementation of the `exbuild build` command.
//!
//! Runs every pass over every target, stopping at the first toolchain failure.

use anyhow::{Context, Result};

use exbuild_lib::build::{BuildOptions, build, run_passes};
use exbuild_lib::command::Pass;
use exbuild_lib::execute::{DryRunExecutor, SystemExecutor};

use super::Workspace;
use crate::output::{count, format_duration, print_info, print_success};

pub fn cmd_build(ws: &Workspace, passes: &[Pass], targets: &[String], dry_run: bool) -> Result<()> {
  let registry = ws.registry(targets)?;
  let passes = Pass::normalize(passes);

  if dry_run {
    let mut executor = DryRunExecutor::new();
    run_passes(&registry, &ws.toolchain, &passes, &mut executor)?;
    print_info(&format!("Would run {}", count(executor.commands().len(), "command")));
    return Ok(());
  }

  let options = BuildOptions {
    root: ws.root.clone(),
    output_dirs: ws.output_dirs.clone(),
    toolchain: ws.toolchain.clone(),
    passes: passes.clone(),
  };

  let mut executor = SystemExecutor::in_dir(&ws.root);
  let report = build(&options, &registry, &mut executor).context("Build failed")?;

  print_success(&format!(
    "Built {} in {} ({}, {})",
    count(registry.len(), "target"),
    count(passes.len(), "pass"),
    count(report.invocations, "invocation"),
    format_duration(report.elapsed)
  ));
  Ok(())
}
