//! The target registry.
//!
//! The registry is plain data: an ordered list of [`Target`] records fixed at
//! startup. There is no discovery. Adding an example means adding one record
//! to [`Registry::builtin`]. Source files are not checked here; a bad path
//! surfaces as a toolchain failure when the target is built.

mod types;

pub use types::{OutputDirs, RegistryError, Target};

use std::collections::HashMap;

use tracing::debug;

/// Stock examples as `(name, source)` in build order.
const BUILTIN_EXAMPLES: &[(&str, &str)] = &[
  ("core_basic_window", "./examples/core_basic_window.c"),
  ("core_basic_screen_manager", "./examples/core_basic_screen_manager.c"),
  ("core_input_keys", "./examples/core_input_keys.c"),
  ("shapes_colors_palette", "./examples/shapes_colors_palette.c"),
  ("tsoding_ball", "./examples/tsoding_ball.c"),
  ("tsoding_snake", "./examples/tsoding_snake/tsoding_snake.c"),
  ("core_input_mouse_wheel", "./examples/core_input_mouse_wheel.c"),
  ("text_writing_anim", "./examples/text_writing_anim.c"),
  ("textures_logo_raylib", "./examples/textures_logo_raylib.c"),
];

/// An ordered, validated, immutable sequence of targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
  targets: Vec<Target>,
}

impl Registry {
  /// Build a registry, rejecting empty paths and shared output paths.
  pub fn new(targets: Vec<Target>) -> Result<Self, RegistryError> {
    let mut owners: HashMap<&str, &str> = HashMap::new();

    for (index, target) in targets.iter().enumerate() {
      if let Some((field, _)) = target.fields().into_iter().find(|(_, value)| value.is_empty()) {
        return Err(RegistryError::EmptyPath { index, field });
      }

      for output in target.outputs() {
        if let Some(first) = owners.insert(output, target.name.as_str()) {
          return Err(RegistryError::DuplicateOutput {
            path: output.to_string(),
            first: first.to_string(),
            second: target.name.clone(),
          });
        }
      }
    }

    debug!(targets = targets.len(), "registry validated");
    Ok(Self { targets })
  }

  /// The stock examples, writing into the given output directories.
  pub fn builtin(dirs: &OutputDirs) -> Result<Self, RegistryError> {
    let targets = BUILTIN_EXAMPLES
      .iter()
      .map(|(name, source)| Target::conventional(name, source, dirs))
      .collect();
    Self::new(targets)
  }

  /// Keep only the named targets, in registration order.
  ///
  /// An empty selection keeps everything.
  pub fn filter(&self, names: &[String]) -> Result<Self, RegistryError> {
    if names.is_empty() {
      return Ok(self.clone());
    }

    if let Some(unknown) = names.iter().find(|n| !self.targets.iter().any(|t| &t.name == *n)) {
      return Err(RegistryError::UnknownTarget(unknown.clone()));
    }

    let targets = self
      .targets
      .iter()
      .filter(|t| names.contains(&t.name))
      .cloned()
      .collect();
    Ok(Self { targets })
  }

  pub fn targets(&self) -> &[Target] {
    &self.targets
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Target> {
    self.targets.iter()
  }

  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }
}

impl<'a> IntoIterator for &'a Registry {
  type Item = &'a Target;
  type IntoIter = std::slice::Iter<'a, Target>;

  fn into_iter(self) -> Self::IntoIter {
    self.targets.iter()
  }
}
