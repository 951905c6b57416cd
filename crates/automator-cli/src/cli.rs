//! Command line arguments

use automator_config::RunSettings;
use automator_sequencer::RunConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Automator - plays back action sequences from YAML files
#[derive(Debug, Parser)]
#[command(name = "automator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play a playback file
    Play(PlayArgs),

    /// Print the expanded action list of a playback file
    Expand(ExpandArgs),
}

/// Arguments for `automator play`.
#[derive(Debug, Clone, Args)]
pub struct PlayArgs {
    /// Playback file to run
    pub file: PathBuf,

    /// Number of iterations (overrides the file)
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Delay between actions in milliseconds (overrides the file)
    #[arg(long, env = "AUTOMATOR_STEP_DELAY")]
    pub step_delay: Option<u64>,

    /// Delay between iterations in milliseconds (overrides the file)
    #[arg(long, env = "AUTOMATOR_ITERATION_DELAY")]
    pub iteration_delay: Option<u64>,
}

impl PlayArgs {
    /// Layer the flags over the file's settings
    pub fn overrides(&self, mut settings: RunSettings, debug: bool) -> RunSettings {
        settings.debug |= debug;
        if let Some(delay) = self.step_delay {
            settings.step_delay = delay;
        }
        if let Some(delay) = self.iteration_delay {
            settings.iteration_delay = delay;
        }
        settings
    }
}

/// Arguments for `automator expand`.
#[derive(Debug, Clone, Args)]
pub struct ExpandArgs {
    /// Playback file to expand
    pub file: PathBuf,
}

/// Map file settings onto a run configuration
pub fn apply_settings(config: RunConfig, settings: &RunSettings) -> RunConfig {
    config
        .with_debug(settings.debug)
        .with_step_delay(settings.step_delay())
        .with_iteration_delay(settings.iteration_delay())
}
