//! Run settings after merging CLI and document sources.
//!
//! All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::build_context::LibraryDeclaration;
use crate::emit::OutputFormat;
use crate::pipeline::ResolveOptions;
use crate::target::Platform;

use super::cli::Cli;
use super::defaults;
use super::document::Document;
use super::error::{ConfigError, field};

/// Fully validated run settings.
///
/// Use [`Settings::from_raw`] to merge CLI arguments over the document's
/// `[target]` and `[build]` sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Target chip family (required)
    pub target: Platform,

    /// Artifact directory
    pub output_dir: PathBuf,

    /// Artifact format
    pub format: OutputFormat,

    /// IR library declaration
    pub ir_library: LibraryDeclaration,

    /// Print artifacts instead of writing them
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings {{ target: {}, output_dir: {}, format: {:?}, ir_library: {}, dry_run: {} }}",
            self.target,
            self.output_dir.display(),
            self.format,
            self.ir_library.lib_dep(),
            self.dry_run,
        )
    }
}

impl Settings {
    /// Merges CLI arguments over the document settings.
    ///
    /// Priority: CLI explicit > document > default.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No target is given anywhere (`MissingRequired`)
    /// - The document names an unknown target
    /// - The IR library source is not a valid URL
    pub fn from_raw(cli: &Cli, document: &Document) -> Result<Self, ConfigError> {
        let target = Self::resolve_target(cli, document)?;
        let ir_library = Self::resolve_ir_library(cli, document)?;

        let output_dir = cli
            .output_dir
            .clone()
            .or_else(|| document.build.output_dir.as_deref().map(PathBuf::from))
            .map_or_else(defaults::output_dir, |p| expand_home(&p));

        let format = cli
            .format
            .or(document.build.format)
            .unwrap_or_default();

        Ok(Self {
            target,
            output_dir,
            format,
            ir_library,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Returns the options the resolution pipeline needs.
    #[must_use]
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            target: self.target,
            ir_library: self.ir_library.clone(),
        }
    }

    fn resolve_target(cli: &Cli, document: &Document) -> Result<Platform, ConfigError> {
        if let Some(target) = cli.target {
            return Ok(target.into());
        }

        match document.target.platform.as_deref() {
            Some(name) => name
                .parse()
                .map_err(|e: crate::target::UnknownPlatform| {
                    ConfigError::violation("target.platform", e.to_string())
                }),
            None => Err(ConfigError::missing(
                field::TARGET,
                "Use --target or set platform in the [target] section",
            )),
        }
    }

    fn resolve_ir_library(cli: &Cli, document: &Document) -> Result<LibraryDeclaration, ConfigError> {
        cli.ir_library
            .as_deref()
            .or(document.build.ir_library.as_deref())
            .map_or_else(defaults::ir_library, |source| {
                LibraryDeclaration::from_source(defaults::IR_LIBRARY_NAME, source)
            })
    }
}

/// Expands a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
