//! Implementation of the `exbuild info` command.

use anyhow::Result;
use serde::Serialize;

use exbuild_lib::command::{Pass, Toolchain};
use exbuild_lib::target::OutputDirs;

use super::Workspace;
use crate::output::{OutputFormat, print_heading, print_json, print_stat};

#[derive(Serialize)]
struct Info<'a> {
  version: &'a str,
  root: String,
  toolchain: &'a Toolchain,
  output_dirs: &'a OutputDirs,
  passes: [Pass; 3],
}

pub fn cmd_info(ws: &Workspace, format: OutputFormat) -> Result<()> {
  let info = Info {
    version: env!("CARGO_PKG_VERSION"),
    root: ws.root.display().to_string(),
    toolchain: &ws.toolchain,
    output_dirs: &ws.output_dirs,
    passes: Pass::ALL,
  };

  if format.is_json() {
    return print_json(&info);
  }

  print_heading(&format!("exbuild v{}", info.version));
  print_stat("Root", &info.root);
  print_stat("Compiler", &ws.toolchain.compiler);
  print_stat("Include dir", &ws.toolchain.include_dir);
  print_stat("Library dir", &ws.toolchain.lib_dir);
  print_stat("Link libraries", &ws.toolchain.link_libs.join(", "));
  print_stat("Portable target", &ws.toolchain.portable_target);
  print_stat("Native outputs", &ws.output_dirs.native);
  print_stat("Module outputs", &ws.output_dirs.module);
  print_stat(
    "Passes",
    &Pass::ALL.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", "),
  );

  Ok(())
}
