//! exbuild-lib: build orchestration for the example programs.
//!
//! This crate provides the pieces the `exbuild` binary wires together:
//! - `Registry`: the ordered, validated list of example targets
//! - `Command`/`Pass`: the exact toolchain invocation for a target in one pass
//! - `Executor`: the narrow "run these arguments, report success" capability
//! - `SelfRebuild`: keeps the orchestrator binary in step with its own source
//! - `build`: directory preparation and fail-fast sequencing of the passes

pub mod build;
pub mod command;
pub mod consts;
pub mod execute;
pub mod rebuild;
pub mod target;
pub mod util;

pub use build::{BuildError, BuildOptions, BuildReport};
pub use command::{Command, Pass, Toolchain};
pub use execute::{DryRunExecutor, Executor, SystemExecutor};
pub use rebuild::{Bootstrap, RebuildError, RebuildState, SelfRebuild};
pub use target::{OutputDirs, Registry, RegistryError, Target};
