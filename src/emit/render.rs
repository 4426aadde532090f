//! Renders a [`BuildPlan`] to artifacts and writes them to disk.
//!
//! The setup routine is rendered through a Handlebars template; the build
//! flag fragment is a PlatformIO `[env]` snippet meant to be included by
//! the project file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{BuildPlan, RenderError};

/// Template of the generated setup routine.
///
/// Variables: `target`, `statements` (one C++ statement each),
/// `flags` (`-DNAME=VALUE` strings) and `libraries` (`name=source` strings).
pub const SETUP_TEMPLATE: &str = "\
// Generated by periphgen for {{target}}. Do not edit.
#include \"esphome.h\"

using namespace esphome;
{{#if flags}}

// Build flags:
{{#each flags}}
//   {{this}}
{{/each}}
{{/if}}
{{#if libraries}}

// Libraries:
{{#each libraries}}
//   {{this}}
{{/each}}
{{/if}}

void setup_peripherals() {
{{#each statements}}
  {{this}}
{{/each}}
}
";

/// Name of the generated setup routine.
pub const SETUP_FILE: &str = "setup.cpp";
/// Name of the build flag fragment.
pub const BUILD_FLAGS_FILE: &str = "build_flags.txt";
/// Name of the JSON plan.
pub const PLAN_FILE: &str = "plan.json";

/// Artifact format selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `setup.cpp` and `build_flags.txt`
    #[default]
    #[value(name = "cpp")]
    Cpp,
    /// `plan.json`
    #[value(name = "json")]
    Json,
}

/// A rendered file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name relative to the output directory
    pub file_name: &'static str,
    /// File contents
    pub contents: String,
}

#[derive(Serialize)]
struct SetupData<'a> {
    target: &'a str,
    statements: Vec<String>,
    flags: Vec<String>,
    libraries: Vec<String>,
}

/// Renders the setup routine.
///
/// # Errors
///
/// Returns [`RenderError::Template`] if rendering fails.
pub fn render_setup(plan: &BuildPlan) -> Result<String, RenderError> {
    let data = SetupData {
        target: plan.target.name(),
        statements: plan.statements(),
        flags: plan.build_flags.iter().map(|f| f.define()).collect(),
        libraries: plan.libraries.iter().map(|l| l.lib_dep()).collect(),
    };

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .render_template(SETUP_TEMPLATE, &data)
        .map_err(|e| RenderError::Template(e.to_string()))
}

/// Renders the build flag fragment.
#[must_use]
pub fn render_build_flags(plan: &BuildPlan) -> String {
    let mut out = format!("; Generated by periphgen for {}. Do not edit.\n", plan.target);
    if plan.serial_override {
        out.push_str("; IR library keeps the UART enabled: do not disable serial logging\n");
    }

    out.push_str("build_flags =\n");
    for flag in &plan.build_flags {
        let _ = writeln!(out, "    {}", flag.define());
    }

    if !plan.libraries.is_empty() {
        out.push_str("lib_deps =\n");
        for library in &plan.libraries {
            let _ = writeln!(out, "    {}", library.lib_dep());
        }
    }
    out
}

/// Renders the plan as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`RenderError::Serialize`] if serialization fails.
pub fn render_json(plan: &BuildPlan) -> Result<String, RenderError> {
    let mut json = serde_json::to_string_pretty(plan)?;
    json.push('\n');
    Ok(json)
}

/// Renders every artifact of `format`.
///
/// # Errors
///
/// Returns the first [`RenderError`] raised by a renderer.
pub fn render(plan: &BuildPlan, format: OutputFormat) -> Result<Vec<Artifact>, RenderError> {
    let artifacts = match format {
        OutputFormat::Cpp => vec![
            Artifact {
                file_name: SETUP_FILE,
                contents: render_setup(plan)?,
            },
            Artifact {
                file_name: BUILD_FLAGS_FILE,
                contents: render_build_flags(plan),
            },
        ],
        OutputFormat::Json => vec![Artifact {
            file_name: PLAN_FILE,
            contents: render_json(plan)?,
        }],
    };
    Ok(artifacts)
}

/// Renders `plan` and writes its artifacts into `dir`.
///
/// Each file is written to `{path}.tmp` and renamed into place, so a failed
/// run never leaves a half-written artifact behind.
///
/// # Errors
///
/// Returns a [`RenderError`] if rendering fails or a file cannot be written.
pub fn write_plan(
    plan: &BuildPlan,
    dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, RenderError> {
    let artifacts = render(plan, format)?;

    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    artifacts
        .iter()
        .map(|artifact| {
            let path = dir.join(artifact.file_name);
            write_atomic(&path, &artifact.contents)?;
            info!("Wrote {}", path.display());
            Ok(path)
        })
        .collect()
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), RenderError> {
    let temp_path = PathBuf::from(format!("{}.tmp", path.display()));
    let write_error = |source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };

    std::fs::write(&temp_path, contents).map_err(write_error)?;
    std::fs::rename(&temp_path, path).map_err(write_error)
}
