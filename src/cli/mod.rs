//! CLI definitions and entry point.

use crate::config::CliOverrides;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Convert Maestro test logs into Allure results with nested steps
#[derive(Parser, Debug)]
#[command(name = "maestro-allure", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write JSON-lines logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// BrowserStack username (falls back to $BROWSERSTACK_USERNAME)
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// BrowserStack access key (falls back to $BROWSERSTACK_ACCESS_KEY)
    #[arg(long, global = true)]
    pub access_key: Option<String>,

    /// Network timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Config overrides from global flags plus the subcommand's own.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            username: self.username.clone(),
            access_key: self.access_key.clone(),
            timeout: self.timeout,
            ..CliOverrides::default()
        };

        match &self.command {
            Commands::Convert(args) => {
                overrides.suite.clone_from(&args.suite);
                overrides.test.clone_from(&args.test);
                overrides.out_dir.clone_from(&args.out_dir);
            }
            Commands::Build(args) => {
                overrides.suite.clone_from(&args.suite);
                overrides.out_dir.clone_from(&args.out_dir);
            }
            Commands::Tree(_) | Commands::Version | Commands::Completions(_) => {}
        }

        overrides
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a single Maestro log (URL or file)
    Convert(ConvertArgs),

    /// Convert every test of a BrowserStack Maestro build
    Build(BuildArgs),

    /// Print the reconstructed step tree without writing anything
    Tree(TreeArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// HTTP(S) URL or local path of a Maestro text log
    pub source: String,

    /// Allure test name
    #[arg(long)]
    pub test: Option<String>,

    /// Allure suite name
    #[arg(long)]
    pub suite: Option<String>,

    /// Directory to write Allure results
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Calendar time of the first log event, e.g. "2025-05-20 13:38:35 +0000"
    #[arg(long)]
    pub start_time: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// BrowserStack Maestro build ID
    #[arg(long)]
    pub build_id: String,

    /// Allure suite name
    #[arg(long)]
    pub suite: Option<String>,

    /// Directory to write Allure results
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    /// HTTP(S) URL or local path of a Maestro text log
    pub source: String,
}

/// Arguments for the completions command.
#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}
