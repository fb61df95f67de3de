//! Implementation of the `exbuild list` command.

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};

use super::Workspace;
use crate::output::{OutputFormat, print_json, symbols};

pub fn cmd_list(ws: &Workspace, format: OutputFormat) -> Result<()> {
  let registry = ws.registry(&[])?;

  if format.is_json() {
    return print_json(&registry.targets());
  }

  for target in &registry {
    println!(
      "{} {}",
      target.name.if_supports_color(Stream::Stdout, |s| s.bold()),
      target.source_path.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
    for output in target.outputs() {
      println!("  {} {}", symbols::ARROW, output);
    }
  }

  Ok(())
}
