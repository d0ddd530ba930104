//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rollout - deployment archive installer
///
/// Install deployment archives into content-server environments with
/// per-component reconciliation and database-layer remapping.
#[derive(Parser, Debug)]
#[command(
    name = "rollout",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Installs deployment archives into content-server environments",
    long_about = "rollout reconciles the components a deployment archive declares \
                  (services, project apps, web apps) against a running content-server \
                  environment and resolves cross-environment database-layer references \
                  through a configurable remapping policy.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  rollout validate --config batch.json\n    \
                  rollout mapping --inventory layers.json --expression \"srcA=dstA,*=FB\"\n    \
                  rollout mapping --inventory layers.json --expression \"*=CREATE_NEW\"\n    \
                  rollout completions --shell zsh"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a batch configuration file against the local filesystem
    Validate(ValidateArgs),

    /// Resolve a database-layer mapping table without touching a server
    Mapping(MappingArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Validate a batch configuration:\n    rollout validate --config batch.json\n\n\
                  The configuration is a JSON array with one entry per installation:\n    \
                  [{ \"archive\": \"dist/forms.zip\", \"project\": \"Mithras\",\n       \
                  \"webAppScopes\": [\"webedit\"], \"layerMapping\": \"*=CREATE_NEW\" }]")]
pub struct ValidateArgs {
    /// Path to the batch configuration JSON file
    #[arg(long, short = 'c')]
    pub config: PathBuf,
}

/// Arguments for the mapping command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Identity resolution over an inventory:\n    rollout mapping --inventory layers.json\n\n\
                  Wildcard fallback with one override:\n    rollout mapping --inventory layers.json --expression \"srcA=dstA,*=FB\"\n\n\
                  A new destination layer for every source layer:\n    rollout mapping --inventory layers.json --expression \"*=CREATE_NEW\"\n\n\
                  The inventory file lists the archive's layers:\n    \
                  { \"mapped\": { \"srcA\": \"dstA\" }, \"unmapped\": [\"srcB\"] }")]
pub struct MappingArgs {
    /// Path to the layer inventory JSON file
    #[arg(long, short = 'i')]
    pub inventory: PathBuf,

    /// Mapping expression, e.g. "srcA=dstA,srcB=dstB,*=fallback"
    #[arg(long, short = 'e')]
    pub expression: Option<String>,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    rollout completions --shell bash > ~/.bash_completion.d/rollout\n\n\
                  Generate zsh completions:\n    rollout completions --shell zsh > ~/.zfunc/_rollout")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
