//! Implementation of the `exbuild plan` command.
//!
//! Prints every toolchain invocation a build would make, in execution order,
//! without running anything.

use anyhow::Result;
use serde::Serialize;

use exbuild_lib::build::plan;
use exbuild_lib::command::Pass;

use super::Workspace;
use crate::output::{OutputFormat, print_heading, print_json};

#[derive(Serialize)]
struct PlannedStep<'a> {
  pass: Pass,
  target: &'a str,
  command: Vec<&'a str>,
}

pub fn cmd_plan(ws: &Workspace, passes: &[Pass], targets: &[String], format: OutputFormat) -> Result<()> {
  let registry = ws.registry(targets)?;
  let steps = plan(&registry, &ws.toolchain, passes);

  if format.is_json() {
    let planned: Vec<_> = steps
      .iter()
      .map(|s| PlannedStep {
        pass: s.pass,
        target: &s.target.name,
        command: s.command.tokens().collect(),
      })
      .collect();
    return print_json(&planned);
  }

  let mut current = None;
  for step in &steps {
    if current != Some(step.pass) {
      if current.is_some() {
        println!();
      }
      print_heading(&format!("{}:", step.pass));
      current = Some(step.pass);
    }
    println!("  {}", step.command);
  }

  Ok(())
}
