//! Application execution logic.
//!
//! Resolves the document into a build plan, then checks, prints or writes
//! its artifacts depending on the run mode.

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;

use periphgen::config::{ConfigError, Document, Settings};
use periphgen::emit::{RenderError, render, write_plan};
use periphgen::pipeline;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The document does not resolve.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Artifacts could not be rendered or written.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// What a successful run did.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The document resolved; nothing was written.
    Checked {
        /// Number of initialization operations
        operations: usize,
        /// Number of finalized build flags
        flags: usize,
    },
    /// Artifacts were printed instead of written.
    Printed,
    /// Artifacts were written to these paths.
    Written(Vec<PathBuf>),
}

/// Resolves `document` and produces its artifacts.
///
/// With `check_only` the plan is resolved and discarded. In dry-run mode
/// every artifact is printed to `out` under a `==> name <==` header.
///
/// # Errors
///
/// Returns [`RunError::Config`] if resolution fails and [`RunError::Render`]
/// if an artifact cannot be rendered, printed or written.
pub fn execute(
    settings: &Settings,
    document: &Document,
    check_only: bool,
    out: &mut impl Write,
) -> Result<Outcome, RunError> {
    let plan = pipeline::resolve(document, &settings.resolve_options())?;

    if check_only {
        return Ok(Outcome::Checked {
            operations: plan.operations.len(),
            flags: plan.build_flags.len(),
        });
    }

    if settings.dry_run {
        for artifact in render(&plan, settings.format)? {
            writeln!(out, "==> {} <==\n{}", artifact.file_name, artifact.contents)
                .map_err(|source| RenderError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
        return Ok(Outcome::Printed);
    }

    let written = write_plan(&plan, &settings.output_dir, settings.format)?;
    Ok(Outcome::Written(written))
}
