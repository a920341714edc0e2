//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use cordsync::util::shell::ColorChoice;

/// cordsync - keep config.xml, build.gradle and AndroidManifest.xml in sync
#[derive(Parser)]
#[command(name = "cordsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Project root (directory containing config.xml); searched upward from
    /// the current directory when omitted
    #[arg(
        short = 'C',
        long,
        global = true,
        value_name = "DIR",
        env = "CORDSYNC_PROJECT_ROOT"
    )]
    pub project_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the project artifacts that were found
    Scan,

    /// Print the merged project configuration
    Show,

    /// Edit config.xml and propagate the version code to build.gradle
    Edit(EditArgs),

    /// Sync the generated Android files (run after `cordova prepare`)
    Prepare(PrepareArgs),

    /// Pin the Gradle wrapper distribution
    PinGradle(PinGradleArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Application id (reverse domain)
    #[arg(long)]
    pub id: Option<String>,

    /// Display version, e.g. 1.2.0
    #[arg(long)]
    pub version_name: Option<String>,

    /// Build number
    #[arg(long)]
    pub version_code: Option<String>,

    /// App name shown on the launcher
    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    /// Entry page, e.g. index.html
    #[arg(long)]
    pub entry_content: Option<String>,

    /// Screen orientation on Android
    #[arg(long, value_parser = ["portrait", "landscape", "default"])]
    pub orientation: Option<String>,

    /// Set a field by name; explicit field flags take precedence
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Print the regenerated config.xml without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Platforms being prepared; the sync only runs for android
    #[arg(
        long = "platform",
        value_name = "PLATFORM",
        env = "CORDOVA_PLATFORMS",
        value_delimiter = ','
    )]
    pub platforms: Vec<String>,

    /// Leave gradle-wrapper.properties untouched
    #[arg(long)]
    pub no_pin_gradle: bool,
}

#[derive(Args, Debug)]
pub struct PinGradleArgs {
    /// Gradle version (defaults to the configured `wrapper.gradle_version`)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
