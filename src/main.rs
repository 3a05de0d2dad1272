mod commands;
mod core;
mod graph;
mod manifest;
mod runner;
mod utils;

use clap::{Parser, Subcommand};
use core::error::{MonoError, print_error};
use std::path::PathBuf;

/// Run only the tests a change can affect, across monorepo workspaces
#[derive(Parser)]
#[command(name = "monotest")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Show debug logs
  #[arg(short, long, global = true, conflicts_with = "quiet")]
  verbose: bool,

  /// Only show warnings and errors
  #[arg(short, long, global = true)]
  quiet: bool,

  /// Read the workspace manifest from a JSON file instead of the configured provider
  #[arg(long, global = true)]
  manifest: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show which workspaces are affected by changes
  Affected {
    /// Git ref to compare against (default: [changes] base, origin/master)
    #[arg(long)]
    since: Option<String>,
    /// Use these changed paths instead of asking git
    #[arg(long, num_args = 1..)]
    files: Vec<String>,
    /// Output format: text (default), json, names-only, locations
    #[arg(long, default_value = "text")]
    format: String,
  },

  /// Run tests for affected workspaces
  Test {
    /// Run the whole suite instead of affected workspaces
    #[arg(long)]
    all: bool,
    /// Git ref to compare against (default: [changes] base, origin/master)
    #[arg(long)]
    since: Option<String>,
    /// Use these changed paths instead of asking git
    #[arg(long, num_args = 1..)]
    files: Vec<String>,
    /// 1-based index of this CI shard
    #[arg(long, env = "CI_NODE_INDEX", default_value_t = 1)]
    shard_index: usize,
    /// Number of parallel CI shards
    #[arg(long, env = "CI_NODE_TOTAL", default_value_t = 1)]
    shard_total: usize,
    /// Show dry-run plan without execution
    #[arg(long)]
    dry_run: bool,
    /// Additional arguments passed to the test runner
    #[arg(last = true)]
    passthrough: Vec<String>,
  },

  /// List workspace manifests matched by the root package.json globs
  Workspaces {
    /// Only list workspaces directly under this declared workspace directory
    path: Option<String>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: bool, quiet: bool) {
  let level = if verbose {
    log::LevelFilter::Debug
  } else if quiet {
    log::LevelFilter::Warn
  } else {
    log::LevelFilter::Info
  };

  // RUST_LOG still wins when set
  env_logger::Builder::new()
    .filter_level(level)
    .parse_default_env()
    .format_timestamp(None)
    .format_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose, cli.quiet);

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let ctx = match core::context::WorkspaceContext::build(&workspace_root, cli.manifest) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Affected { since, files, format } => commands::run_affected(&ctx, since, files, format),
    Commands::Test {
      all,
      since,
      files,
      shard_index,
      shard_total,
      dry_run,
      passthrough,
    } => commands::run_test(
      &ctx,
      commands::TestOptions {
        all,
        since,
        files,
        shard: runner::ShardSpec::new(shard_index, shard_total),
        dry_run,
        passthrough,
      },
    ),
    Commands::Workspaces { path, json } => commands::run_workspaces(&ctx, path, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: MonoError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
