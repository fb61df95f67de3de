//! Types describing build targets and where their artifacts land.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{HOST_MODULE_EXT, MODULE_DIR, MODULE_EXT, NATIVE_DIR};

/// One example program and the three artifacts built from it.
///
/// Paths are kept as the exact strings handed to the toolchain, relative to
/// the build root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
  /// Short name used in listings and logs.
  pub name: String,
  /// The single translation unit compiled for every pass.
  pub source_path: String,
  /// Native executable.
  pub native_binary_path: String,
  /// Browser-flavoured portable module.
  pub web_module_path: String,
  /// Host-flavoured portable module (no browser platform define).
  pub host_module_path: String,
}

impl Target {
  /// Derive the artifact paths for `name` from the output directory convention:
  /// `<native>/<name>`, `<module>/<name>.wasm` and `<module>/<name>.native.wasm`.
  pub fn conventional(name: &str, source_path: &str, dirs: &OutputDirs) -> Self {
    Self {
      name: name.to_string(),
      source_path: source_path.to_string(),
      native_binary_path: format!("{}/{}", dirs.native, name),
      web_module_path: format!("{}/{}.{}", dirs.module, name, MODULE_EXT),
      host_module_path: format!("{}/{}.{}", dirs.module, name, HOST_MODULE_EXT),
    }
  }

  /// The three output paths in pass order.
  pub fn outputs(&self) -> [&str; 3] {
    [
      self.native_binary_path.as_str(),
      self.web_module_path.as_str(),
      self.host_module_path.as_str(),
    ]
  }

  pub(crate) fn fields(&self) -> [(&'static str, &str); 5] {
    [
      ("name", self.name.as_str()),
      ("source_path", self.source_path.as_str()),
      ("native_binary_path", self.native_binary_path.as_str()),
      ("web_module_path", self.web_module_path.as_str()),
      ("host_module_path", self.host_module_path.as_str()),
    ]
  }
}

/// The two directories artifacts are written into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDirs {
  /// Native executables.
  pub native: String,
  /// Portable modules, both flavours.
  pub module: String,
}

impl Default for OutputDirs {
  fn default() -> Self {
    Self {
      native: NATIVE_DIR.to_string(),
      module: MODULE_DIR.to_string(),
    }
  }
}

/// Errors raised while assembling a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
  /// A target has an empty path or name.
  #[error("target #{index} has an empty {field}")]
  EmptyPath { index: usize, field: &'static str },

  /// Two output slots point at the same file, so one build would clobber the other.
  #[error("output path {path} is produced by both {first} and {second}")]
  DuplicateOutput { path: String, first: String, second: String },

  /// A target selection named something not in the registry.
  #[error("unknown target: {0}")]
  UnknownTarget(String),
}
