mod bootstrap;
mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exbuild_lib::command::{Pass, Toolchain};
use exbuild_lib::consts::DEFAULT_COMPILER;
use exbuild_lib::target::OutputDirs;

use cmd::Workspace;
use output::OutputFormat;

/// exbuild - builds every example as a native executable and two wasm modules
#[derive(Parser)]
#[command(name = "exbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Directory to build in (default: current directory)
  #[arg(long, global = true, env = "EXBUILD_ROOT")]
  root: Option<PathBuf>,

  /// C compiler used for every pass
  #[arg(long, global = true, env = "EXBUILD_CC", default_value = DEFAULT_COMPILER)]
  cc: String,

  /// Skip the self-rebuild check
  #[arg(long, global = true, env = "EXBUILD_NO_REBUILD")]
  no_rebuild: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Args, Default)]
struct Selection {
  /// Only run this pass (repeatable): native, web-module, host-module
  #[arg(long = "pass", value_name = "PASS")]
  passes: Vec<Pass>,

  /// Only build this target (repeatable)
  #[arg(long = "target", value_name = "NAME")]
  targets: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
  /// Build every target in every pass (the default)
  Build {
    #[command(flatten)]
    selection: Selection,

    /// Print the commands instead of running them
    #[arg(long)]
    dry_run: bool,
  },

  /// Show the toolchain invocations a build would make
  Plan {
    #[command(flatten)]
    selection: Selection,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// List the registered targets and their outputs
  List {
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Show toolchain and output configuration
  Info {
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      output::print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  if !cli.no_rebuild {
    bootstrap::go_rebuild_self()?;
  }

  let ws = workspace(cli.root, cli.cc)?;

  match cli.command.unwrap_or(Commands::Build {
    selection: Selection::default(),
    dry_run: false,
  }) {
    Commands::Build { selection, dry_run } => cmd::cmd_build(&ws, &selection.passes, &selection.targets, dry_run),
    Commands::Plan { selection, format } => cmd::cmd_plan(&ws, &selection.passes, &selection.targets, format),
    Commands::List { format } => cmd::cmd_list(&ws, format),
    Commands::Info { format } => cmd::cmd_info(&ws, format),
  }
}

fn workspace(root: Option<PathBuf>, cc: String) -> Result<Workspace> {
  let root = match root {
    Some(root) => dunce::canonicalize(&root).with_context(|| format!("Build root not found: {}", root.display()))?,
    None => std::env::current_dir().context("Failed to read current directory")?,
  };

  // Toolchain commands run inside the build root, so a relative compiler
  // path has to be resolved against the invoking directory first.
  let cc = if cc.contains(std::path::is_separator) {
    dunce::canonicalize(&cc)
      .with_context(|| format!("Compiler not found: {}", cc))?
      .to_string_lossy()
      .into_owned()
  } else {
    cc
  };

  Ok(Workspace {
    root,
    toolchain: Toolchain::with_compiler(cc),
    output_dirs: OutputDirs::default(),
  })
}
