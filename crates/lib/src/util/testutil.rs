//! Test utilities for exbuild-lib.
//!
//! Cross-platform helpers for tests that need to spawn real processes through
//! the system executor.

use std::path::Path;

use crate::command::Command;

/// A command that exits with status zero.
#[cfg(unix)]
pub fn succeeding() -> Command {
  Command::new("/bin/sh").with_args(["-c", "exit 0"])
}

#[cfg(windows)]
pub fn succeeding() -> Command {
  Command::new("cmd.exe").with_args(["/C", "exit 0"])
}

/// A command that exits with the given non-zero status.
#[cfg(unix)]
pub fn failing(code: i32) -> Command {
  Command::new("/bin/sh").with_args(["-c".to_string(), format!("exit {}", code)])
}

#[cfg(windows)]
pub fn failing(code: i32) -> Command {
  Command::new("cmd.exe").with_args(["/C".to_string(), format!("exit {}", code)])
}

/// A command that creates an empty file at `path`, relative to the working directory.
#[cfg(unix)]
pub fn touch(path: &str) -> Command {
  Command::new("/usr/bin/touch").with_args([path])
}

#[cfg(windows)]
pub fn touch(path: &str) -> Command {
  Command::new("powershell.exe").with_args([
    "-NoProfile".to_string(),
    "-Command".to_string(),
    format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", path),
  ])
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

/// Shift a file's modification time by `offset_secs` relative to now.
pub fn set_mtime_offset(path: &Path, offset_secs: i64) {
  use std::time::{Duration, SystemTime};

  let now = SystemTime::now();
  let time = if offset_secs >= 0 {
    now + Duration::from_secs(offset_secs as u64)
  } else {
    now - Duration::from_secs(offset_secs.unsigned_abs())
  };
  let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
  file.set_modified(time).unwrap();
}
