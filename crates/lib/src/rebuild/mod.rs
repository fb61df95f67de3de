//! Self-rebuild bootstrap.
//!
//! The orchestrator compares the modification time of its own binary against
//! its sources before doing anything else. A stale (or missing) binary is
//! recompiled through the same [`Executor`] used for targets, and the caller
//! relaunches the fresh binary with the original arguments.
//!
//! States: `Fresh` continues the run; `Stale` rebuilds and then relaunches,
//! fails, or continues when the compile left the binary unchanged.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::command::Command;
use crate::consts::{NO_REBUILD_ENV, OLD_BINARY_SUFFIX};
use crate::execute::Executor;

/// Why a rebuild is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
  /// There is no binary at the expected path.
  BinaryMissing,
  /// A source file was modified after the binary was built.
  SourceNewer { source: PathBuf },
}

/// Result of comparing the binary with its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildState {
  Fresh,
  Stale(StaleReason),
}

/// What the caller should do after the bootstrap ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
  /// The running binary is current; carry on with the build.
  Continue,
  /// A new binary was compiled; relaunch it and exit with its status.
  Rebuilt,
}

#[derive(Debug, Error)]
pub enum RebuildError {
  #[error("failed to read modification time of {path}: {source}")]
  Metadata {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to walk source directory {path}: {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to move {from} aside to {to}: {source}")]
  Backup {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to rebuild orchestrator: {command}")]
  CompileFailed { command: String },

  #[error("rebuild reported success but produced no binary at {0}")]
  BinaryNotProduced(PathBuf),

  #[error("failed to relaunch {path}: {source}")]
  Relaunch {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Keeps the orchestrator binary in step with its sources.
#[derive(Debug, Clone)]
pub struct SelfRebuild {
  binary: PathBuf,
  sources: Vec<PathBuf>,
  command: Command,
}

impl SelfRebuild {
  /// `sources` may mix files and directories; directories are walked recursively.
  pub fn new(binary: impl Into<PathBuf>, sources: Vec<PathBuf>, command: Command) -> Self {
    Self {
      binary: binary.into(),
      sources,
      command,
    }
  }

  pub fn binary(&self) -> &Path {
    &self.binary
  }

  /// Compare the binary against the newest source.
  ///
  /// Sources that do not exist are skipped, so a binary running away from
  /// its source tree is always fresh.
  pub fn check(&self) -> Result<RebuildState, RebuildError> {
    let binary_mtime = match fs::metadata(&self.binary) {
      Ok(meta) => modified(&self.binary, &meta)?,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Ok(RebuildState::Stale(StaleReason::BinaryMissing));
      }
      Err(source) => {
        return Err(RebuildError::Metadata {
          path: self.binary.clone(),
          source,
        });
      }
    };

    match self.newest_source()? {
      Some((source, mtime)) if mtime > binary_mtime => Ok(RebuildState::Stale(StaleReason::SourceNewer { source })),
      Some((source, _)) => {
        debug!(newest = %source.display(), "orchestrator binary is up to date");
        Ok(RebuildState::Fresh)
      }
      None => {
        debug!("no orchestrator sources found; skipping rebuild check");
        Ok(RebuildState::Fresh)
      }
    }
  }

  /// Rebuild when stale.
  ///
  /// The previous binary is moved to `<binary>.old` for the duration of the
  /// compile and put back if the compile fails.
  ///
  /// A compile that succeeds but leaves the binary older than its sources
  /// only re-linked the old object code. The binary's mtime is refreshed and
  /// the run continues in this process.
  pub fn run<E: Executor>(&self, executor: &mut E) -> Result<Bootstrap, RebuildError> {
    let reason = match self.check()? {
      RebuildState::Fresh => return Ok(Bootstrap::Continue),
      RebuildState::Stale(reason) => reason,
    };

    match &reason {
      StaleReason::BinaryMissing => info!(binary = %self.binary.display(), "orchestrator binary missing, building it"),
      StaleReason::SourceNewer { source } => {
        info!(source = %source.display(), "orchestrator source changed, rebuilding")
      }
    }

    let backup = self.backup_path();
    let backed_up = self.move_aside(&backup)?;

    if !executor.run(&self.command) {
      if backed_up {
        if let Err(e) = fs::rename(&backup, &self.binary) {
          warn!(error = %e, backup = %backup.display(), "could not restore previous binary");
        }
      }
      return Err(RebuildError::CompileFailed {
        command: self.command.to_string(),
      });
    }

    if !self.binary.exists() {
      return Err(RebuildError::BinaryNotProduced(self.binary.clone()));
    }

    if let RebuildState::Stale(reason) = self.check()? {
      debug!(?reason, "compile left the binary unchanged, refreshing its mtime");
      if let Err(e) = touch(&self.binary) {
        warn!(error = %e, binary = %self.binary.display(), "could not refresh binary mtime");
      }
      return Ok(Bootstrap::Continue);
    }

    Ok(Bootstrap::Rebuilt)
  }

  fn backup_path(&self) -> PathBuf {
    let mut name = self.binary.as_os_str().to_os_string();
    name.push(".");
    name.push(OLD_BINARY_SUFFIX);
    PathBuf::from(name)
  }

  fn move_aside(&self, backup: &Path) -> Result<bool, RebuildError> {
    if !self.binary.exists() {
      return Ok(false);
    }

    // Renaming over an existing file fails on some platforms.
    match fs::remove_file(backup) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(source) => {
        return Err(RebuildError::Backup {
          from: self.binary.clone(),
          to: backup.to_path_buf(),
          source,
        });
      }
    }

    fs::rename(&self.binary, backup).map_err(|source| RebuildError::Backup {
      from: self.binary.clone(),
      to: backup.to_path_buf(),
      source,
    })?;
    Ok(true)
  }

  fn newest_source(&self) -> Result<Option<(PathBuf, SystemTime)>, RebuildError> {
    let mut newest: Option<(PathBuf, SystemTime)> = None;

    for root in self.sources.iter().filter(|s| s.exists()) {
      for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| RebuildError::Walk {
          path: root.clone(),
          source,
        })?;
        if !entry.file_type().is_file() {
          continue;
        }

        let meta = entry.metadata().map_err(|source| RebuildError::Walk {
          path: entry.path().to_path_buf(),
          source,
        })?;
        let mtime = modified(entry.path(), &meta)?;

        if newest.as_ref().is_none_or(|(_, current)| mtime > *current) {
          newest = Some((entry.path().to_path_buf(), mtime));
        }
      }
    }

    Ok(newest)
  }
}

fn modified(path: &Path, meta: &fs::Metadata) -> Result<SystemTime, RebuildError> {
  meta.modified().map_err(|source| RebuildError::Metadata {
    path: path.to_path_buf(),
    source,
  })
}

// Unix allows setting timestamps through a read-only handle, which also
// works on an executable that is currently running.
fn touch(path: &Path) -> io::Result<()> {
  #[cfg(windows)]
  let file = fs::OpenOptions::new().write(true).open(path)?;
  #[cfg(not(windows))]
  let file = fs::File::open(path)?;
  file.set_modified(SystemTime::now())
}

/// Run `binary` with `args`, inheriting stdio, and return its exit code.
///
/// The child runs with [`NO_REBUILD_ENV`] set, so it never rebuilds itself
/// again. A child killed by a signal reports 1.
pub fn relaunch(binary: &Path, args: &[OsString]) -> Result<i32, RebuildError> {
  info!(binary = %binary.display(), "relaunching rebuilt orchestrator");

  let status = std::process::Command::new(binary)
    .args(args)
    .env(NO_REBUILD_ENV, "true")
    .stdin(Stdio::inherit())
    .stdout(Stdio::inherit())
    .stderr(Stdio::inherit())
    .status()
    .map_err(|source| RebuildError::Relaunch {
      path: binary.to_path_buf(),
      source,
    })?;

  Ok(status.code().unwrap_or(1))
}
