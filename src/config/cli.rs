//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use super::defaults;
use crate::emit::OutputFormat;
use crate::target::Platform;

/// periphgen: peripheral configuration resolver and code generator
///
/// Validates a device configuration document, links its components and
/// emits the setup routine, build flags and library declarations.
#[derive(Debug, Parser)]
#[command(name = "periphgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the configuration document
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Target chip family (overrides [target] platform)
    #[arg(long, value_enum, global = true)]
    pub target: Option<TargetArg>,

    /// Artifact directory (overrides [build] output_dir)
    #[arg(long = "output-dir", short)]
    pub output_dir: Option<PathBuf>,

    /// Artifact format (overrides [build] format)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// IR library source as 'url#ref' (overrides [build] ir_library)
    #[arg(long = "ir-library", value_name = "URL")]
    pub ir_library: Option<String>,

    /// Print artifacts to stdout instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for periphgen
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration document
    Init {
        /// Output path for the configuration document
        #[arg(long, short, default_value = defaults::CONFIG_PATH)]
        output: PathBuf,
    },
    /// Validate and link the document without writing artifacts
    Check,
}

/// Target platform argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    /// Espressif ESP32
    #[value(name = "esp32")]
    Esp32,
    /// Espressif ESP8266
    #[value(name = "esp8266")]
    Esp8266,
}

impl From<TargetArg> for Platform {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Esp32 => Self::Esp32,
            TargetArg::Esp8266 => Self::Esp8266,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }

    /// Returns true if this is the check command.
    #[must_use]
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Some(Command::Check))
    }

    /// Returns the configuration document path, falling back to the default.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::CONFIG_PATH))
    }
}
