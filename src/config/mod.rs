//! Configuration layer for periphgen.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - Configuration document parsing ([`Document`])
//! - Validated run settings ([`Settings`])
//! - Configuration file generation ([`write_default_config`])
//! - Error types shared by the whole pipeline ([`ConfigError`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Run settings are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - `--target`, `--output-dir`, `--format`, `--ir-library`
//! 2. **Document** - the `[target]` and `[build]` sections
//! 3. **Built-in defaults** - see [`defaults`]
//!
//! The target has no default: a run without one fails with
//! [`ConfigError::MissingRequired`].

mod cli;
pub mod defaults;
mod document;
mod error;
mod settings;


pub use cli::{Cli, Command, TargetArg};
pub use document::{
    BuildSection, Document, Entry, TargetSection, default_config_template, write_default_config,
};
pub use error::{ConfigError, ReferenceFailure, Violations, field};
pub use settings::Settings;
