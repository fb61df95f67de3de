//! Subprocess execution.
//!
//! The orchestrator only ever asks one question of the outside world: "run
//! these arguments, did it work?". [`Executor`] is that question. Launch
//! failures and non-zero exits both answer `false`; the toolchain's own
//! diagnostics reach the user through the inherited standard streams.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tracing::{debug, error, info};

use crate::command::Command;

/// Runs one command to completion and reports whether it succeeded.
pub trait Executor {
  fn run(&mut self, command: &Command) -> bool;
}

impl<F> Executor for F
where
  F: FnMut(&Command) -> bool,
{
  fn run(&mut self, command: &Command) -> bool {
    self(command)
  }
}

/// Spawns commands on the host, blocking until each exits.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
  cwd: Option<PathBuf>,
}

impl SystemExecutor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run every command from `cwd` instead of the current directory.
  pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
    Self { cwd: Some(cwd.into()) }
  }

  fn spawn(&self, command: &Command) -> io::Result<std::process::ExitStatus> {
    let mut process = std::process::Command::new(command.program());
    process
      .args(command.arguments())
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit());

    if let Some(cwd) = &self.cwd {
      process.current_dir(cwd);
    }

    debug!(working_dir = ?self.cwd, "spawning process");
    process.status()
  }
}

impl Executor for SystemExecutor {
  fn run(&mut self, command: &Command) -> bool {
    info!(cmd = %command, "executing command");

    match self.spawn(command) {
      Ok(status) if status.success() => true,
      Ok(status) => {
        match status.code() {
          Some(code) => error!(program = %command.program(), code, "command exited with non-zero status"),
          None => error!(program = %command.program(), "command terminated by signal"),
        }
        false
      }
      Err(e) => {
        error!(program = %command.program(), error = %e, "could not start command");
        false
      }
    }
  }
}

/// Prints commands instead of running them. Always reports success.
#[derive(Debug, Clone, Default)]
pub struct DryRunExecutor {
  seen: Vec<Command>,
}

impl DryRunExecutor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every command offered so far, in order.
  pub fn commands(&self) -> &[Command] {
    &self.seen
  }
}

impl Executor for DryRunExecutor {
  fn run(&mut self, command: &Command) -> bool {
    println!("{}", command);
    self.seen.push(command.clone());
    true
  }
}
