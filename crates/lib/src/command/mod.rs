//! Toolchain command construction.
//!
//! [`Toolchain::command`] is a pure function of a target and a pass: it does
//! no I/O and cannot fail. Token order is fixed because linkers can be
//! sensitive to the position of their directives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{
  BROWSER_DEFINE, DEFAULT_COMPILER, DEFAULT_INCLUDE_DIR, DEFAULT_LIB_DIR, DEFAULT_LINK_LIBS, ENTRY_SYMBOL,
  PORTABLE_TARGET,
};
use crate::target::Target;

/// One full sweep over the registry producing one kind of artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pass {
  /// Native executable linked against the graphics and math libraries.
  Native,
  /// Freestanding portable module compiled for the browser.
  WebModule,
  /// Freestanding portable module for a native module runtime.
  HostModule,
}

impl Pass {
  /// Every pass, in the order a build runs them.
  pub const ALL: [Pass; 3] = [Pass::Native, Pass::WebModule, Pass::HostModule];

  pub fn as_str(self) -> &'static str {
    match self {
      Pass::Native => "native",
      Pass::WebModule => "web-module",
      Pass::HostModule => "host-module",
    }
  }

  /// Sort a selection into run order and drop repeats. An empty selection means all passes.
  pub fn normalize(selection: &[Pass]) -> Vec<Pass> {
    if selection.is_empty() {
      return Pass::ALL.to_vec();
    }
    let mut passes = selection.to_vec();
    passes.sort();
    passes.dedup();
    passes
  }

  /// The artifact this pass writes for `target`.
  pub fn output<'a>(self, target: &'a Target) -> &'a str {
    match self {
      Pass::Native => &target.native_binary_path,
      Pass::WebModule => &target.web_module_path,
      Pass::HostModule => &target.host_module_path,
    }
  }
}

impl fmt::Display for Pass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Pass {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Pass::ALL
      .into_iter()
      .find(|p| p.as_str() == s)
      .ok_or_else(|| format!("unknown pass '{}' (expected native, web-module or host-module)", s))
  }
}

/// One external invocation: a program and its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  program: String,
  args: Vec<String>,
}

impl Command {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
    }
  }

  pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(&mut self, args: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// By-value variant of [`Command::args`] for building a command in one expression.
  pub fn with_args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args(args);
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn arguments(&self) -> &[String] {
    &self.args
  }

  /// Program followed by every argument.
  pub fn tokens(&self) -> impl Iterator<Item = &str> {
    std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, token) in self.tokens().enumerate() {
      if i > 0 {
        f.write_str(" ")?;
      }
      if token.is_empty() || token.contains(char::is_whitespace) {
        write!(f, "'{}'", token)?;
      } else {
        f.write_str(token)?;
      }
    }
    Ok(())
  }
}

/// The external compiler and the fixed inputs every recipe refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
  /// Compiler executable, resolved through `PATH` when not a path.
  pub compiler: String,
  /// Header directory passed with `-I`.
  pub include_dir: String,
  /// Library directory passed with `-L` to native links.
  pub lib_dir: String,
  /// Libraries linked into native executables, in link order.
  pub link_libs: Vec<String>,
  /// Architecture for the portable-module passes.
  pub portable_target: String,
  /// Preprocessor define selecting the browser code path.
  pub browser_define: String,
  /// Symbol exported from portable modules as the entry point.
  pub entry_symbol: String,
}

impl Default for Toolchain {
  fn default() -> Self {
    Self {
      compiler: DEFAULT_COMPILER.to_string(),
      include_dir: DEFAULT_INCLUDE_DIR.to_string(),
      lib_dir: DEFAULT_LIB_DIR.to_string(),
      link_libs: DEFAULT_LINK_LIBS.iter().map(|l| l.to_string()).collect(),
      portable_target: PORTABLE_TARGET.to_string(),
      browser_define: BROWSER_DEFINE.to_string(),
      entry_symbol: ENTRY_SYMBOL.to_string(),
    }
  }
}

impl Toolchain {
  /// Default toolchain with a different compiler.
  pub fn with_compiler(compiler: impl Into<String>) -> Self {
    Self {
      compiler: compiler.into(),
      ..Self::default()
    }
  }

  /// The invocation that builds `target` for `pass`.
  pub fn command(&self, target: &Target, pass: Pass) -> Command {
    match pass {
      Pass::Native => self.native(target),
      Pass::WebModule => {
        let mut cmd = self.portable_module(&target.web_module_path, &target.source_path);
        cmd.arg(format!("-D{}", self.browser_define));
        cmd
      }
      Pass::HostModule => self.portable_module(&target.host_module_path, &target.source_path),
    }
  }

  fn native(&self, target: &Target) -> Command {
    let mut cmd = Command::new(&self.compiler);
    cmd.arg(format!("-I{}", self.include_dir));
    cmd.args(["-o", target.native_binary_path.as_str(), target.source_path.as_str()]);
    cmd.arg(format!("-L{}", self.lib_dir));
    cmd.args(self.link_libs.iter().map(|lib| format!("-l{}", lib)));
    cmd
  }

  fn portable_module(&self, output: &str, source: &str) -> Command {
    let mut cmd = Command::new(&self.compiler);
    cmd.arg(format!("--target={}", self.portable_target));
    cmd.arg(format!("-I{}", self.include_dir));
    cmd.arg("--no-standard-libraries");
    cmd.args(["-Wl,--export-table", "-Wl,--no-entry", "-Wl,--allow-undefined"]);
    cmd.arg(format!("-Wl,--export={}", self.entry_symbol));
    cmd.args(["-o", output, source]);
    cmd
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::target::{OutputDirs, Registry};

  fn foo() -> Target {
    Target::conventional("foo", "foo.c", &OutputDirs::default())
  }

  fn tokens(cmd: &Command) -> Vec<&str> {
    cmd.tokens().collect()
  }

  #[test]
  fn native_recipe() {
    let cmd = Toolchain::default().command(&foo(), Pass::Native);
    assert_eq!(
      tokens(&cmd),
      vec!["clang", "-I./include", "-o", "./build/foo", "foo.c", "-L./lib", "-lraylib", "-lm"]
    );
  }

  #[test]
  fn web_module_recipe() {
    let cmd = Toolchain::default().command(&foo(), Pass::WebModule);
    assert_eq!(
      tokens(&cmd),
      vec![
        "clang",
        "--target=wasm32",
        "-I./include",
        "--no-standard-libraries",
        "-Wl,--export-table",
        "-Wl,--no-entry",
        "-Wl,--allow-undefined",
        "-Wl,--export=main",
        "-o",
        "./wasm/foo.wasm",
        "foo.c",
        "-DPLATFORM_WEB",
      ]
    );
  }

  #[test]
  fn host_module_differs_only_by_define_and_output() {
    let toolchain = Toolchain::default();
    let target = foo();
    let web = toolchain.command(&target, Pass::WebModule);
    let host = toolchain.command(&target, Pass::HostModule);

    assert!(web.arguments().contains(&"-DPLATFORM_WEB".to_string()));
    assert!(!host.arguments().contains(&"-DPLATFORM_WEB".to_string()));

    let expected: Vec<String> = web
      .tokens()
      .filter(|t| *t != "-DPLATFORM_WEB")
      .map(|t| if t == target.web_module_path { target.host_module_path.clone() } else { t.to_string() })
      .collect();
    let actual: Vec<String> = host.tokens().map(str::to_string).collect();
    assert_eq!(actual, expected);
  }

  #[test]
  fn source_and_output_appear_exactly_once() {
    let toolchain = Toolchain::default();
    let registry = Registry::builtin(&OutputDirs::default()).unwrap();

    for target in &registry {
      for pass in Pass::ALL {
        let cmd = toolchain.command(target, pass);
        let count = |needle: &str| cmd.tokens().filter(|t| *t == needle).count();
        assert_eq!(count(target.source_path.as_str()), 1, "{} {}", pass, target.name);
        assert_eq!(count(pass.output(target)), 1, "{} {}", pass, target.name);
      }
    }
  }

  #[test]
  fn cross_target_flag_only_on_module_passes() {
    let toolchain = Toolchain::default();
    let target = foo();
    let has_target = |pass| {
      toolchain
        .command(&target, pass)
        .tokens()
        .any(|t| t.starts_with("--target="))
    };

    assert!(!has_target(Pass::Native));
    assert!(has_target(Pass::WebModule));
    assert!(has_target(Pass::HostModule));
  }

  #[test]
  fn compiler_override() {
    let cmd = Toolchain::with_compiler("/opt/llvm/bin/clang").command(&foo(), Pass::Native);
    assert_eq!(cmd.program(), "/opt/llvm/bin/clang");
  }

  #[test]
  fn normalize_orders_and_dedups() {
    assert_eq!(Pass::normalize(&[]), Pass::ALL.to_vec());
    assert_eq!(
      Pass::normalize(&[Pass::HostModule, Pass::Native, Pass::HostModule]),
      vec![Pass::Native, Pass::HostModule]
    );
  }

  #[test]
  fn pass_names_round_trip() {
    for pass in Pass::ALL {
      assert_eq!(pass.as_str().parse::<Pass>(), Ok(pass));
    }
    assert!("wasm".parse::<Pass>().is_err());
  }

  #[test]
  fn pass_serializes_like_its_cli_name() {
    assert_eq!(serde_json::to_string(&Pass::WebModule).unwrap(), "\"web-module\"");
    assert_eq!(serde_json::from_str::<Pass>("\"host-module\"").unwrap(), Pass::HostModule);
  }

  #[test]
  fn display_quotes_whitespace() {
    let cmd = Command::new("clang").with_args(["-o", "my out", "a.c"]);
    assert_eq!(cmd.to_string(), "clang -o 'my out' a.c");
  }
}
