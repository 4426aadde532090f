//! Build context arbitration.
//!
//! Components contribute preprocessor flags, external library declarations
//! and the serial override to one shared [`BuildContext`] while the plan is
//! assembled. Contributions are only recorded there; [`BuildContext::finalize`]
//! decides the winning value of every flag in a single pass at the end, so
//! the result does not depend on the order components are visited in.
//!
//! Every contribution carries a [`Precedence`] class. A value contributed
//! for debugging beats any value contributed as a size optimization; within
//! one class the latest contribution wins.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use url::Url;

use crate::config::ConfigError;

/// Precedence class of a flag contribution, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Turns optional library code off to save flash.
    RestrictiveOptimization,
    /// Turns library code back on so a debugging component can use it.
    OverrideForDebug,
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RestrictiveOptimization => "restrictive optimization",
            Self::OverrideForDebug => "debug override",
        })
    }
}

/// One recorded flag contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequirement {
    /// Preprocessor symbol
    pub name: String,
    /// Value assigned to the symbol
    pub value: String,
    /// Precedence class
    pub precedence: Precedence,
    /// Identifier of the contributing instance
    pub contributor: String,
    /// Order of the contribution
    pub sequence: usize,
}

/// A winning preprocessor definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFlag {
    /// Preprocessor symbol
    pub name: String,
    /// Final value
    pub value: String,
}

impl BuildFlag {
    /// Formats the flag as a compiler define, e.g. `-DSEND_DAIKIN312=true`.
    #[must_use]
    pub fn define(&self) -> String {
        format!("-D{}={}", self.name, self.value)
    }
}

/// An external library dependency fetched from a source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryDeclaration {
    /// Library name
    pub name: String,
    /// Repository URL without the reference fragment
    pub repository: String,
    /// Branch, tag or commit (the URL fragment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl LibraryDeclaration {
    /// Parses a library source of the form `https://host/repo.git#reference`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the source is not an absolute
    /// `http`, `https`, `ssh` or `git` URL.
    pub fn from_source(name: &str, source: &str) -> Result<Self, ConfigError> {
        let mut url = Url::parse(source.trim()).map_err(|e| ConfigError::InvalidUrl {
            url: source.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https" | "ssh" | "git") {
            return Err(ConfigError::InvalidUrl {
                url: source.to_string(),
                reason: format!(
                    "unsupported scheme '{}', expected http, https, ssh or git",
                    url.scheme()
                ),
            });
        }

        let reference = url
            .fragment()
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string);
        url.set_fragment(None);

        Ok(Self {
            name: name.to_string(),
            repository: url.to_string(),
            reference,
        })
    }

    /// Returns the full source, including the reference fragment.
    #[must_use]
    pub fn source(&self) -> String {
        match &self.reference {
            Some(reference) => format!("{}#{reference}", self.repository),
            None => self.repository.clone(),
        }
    }

    /// Formats the declaration as a `lib_deps` entry.
    #[must_use]
    pub fn lib_dep(&self) -> String {
        format!("{}={}", self.name, self.source())
    }
}

/// Accumulates contributions while a plan is assembled.
#[derive(Debug, Default)]
pub struct BuildContext {
    requirements: Vec<BuildRequirement>,
    libraries: Vec<LibraryDeclaration>,
    serial_override: bool,
}

impl BuildContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a flag contribution.
    pub fn contribute(
        &mut self,
        contributor: impl fmt::Display,
        name: &str,
        value: impl Into<String>,
        precedence: Precedence,
    ) {
        let requirement = BuildRequirement {
            name: name.to_string(),
            value: value.into(),
            precedence,
            contributor: contributor.to_string(),
            sequence: self.requirements.len(),
        };
        tracing::debug!(
            "{} requests {}={} ({})",
            requirement.contributor,
            requirement.name,
            requirement.value,
            requirement.precedence
        );
        self.requirements.push(requirement);
    }

    /// Declares an external library.
    ///
    /// Declaring the same library again from the same source is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LibraryConflict`] if the library is already
    /// declared from a different source.
    pub fn declare_library(&mut self, library: LibraryDeclaration) -> Result<(), ConfigError> {
        match self.libraries.iter().find(|l| l.name == library.name) {
            Some(existing) if *existing == library => Ok(()),
            Some(existing) => Err(ConfigError::LibraryConflict {
                name: library.name.clone(),
                first: existing.source(),
                second: library.source(),
            }),
            None => {
                self.libraries.push(library);
                Ok(())
            }
        }
    }

    /// Requests that the serial port be overridden to the second UART.
    pub fn require_serial_override(&mut self) {
        self.serial_override = true;
    }

    /// Returns every recorded contribution in order.
    #[must_use]
    pub fn requirements(&self) -> &[BuildRequirement] {
        &self.requirements
    }

    /// Selects the winning value of every flag.
    ///
    /// For each symbol the contribution with the highest precedence class
    /// wins; ties go to the latest contribution. Flags are returned sorted by
    /// symbol name.
    #[must_use]
    pub fn finalize(self) -> FinalizedBuild {
        let mut winners: BTreeMap<&str, &BuildRequirement> = BTreeMap::new();

        for requirement in &self.requirements {
            let rank = (requirement.precedence, requirement.sequence);
            match winners.get(requirement.name.as_str()) {
                Some(current) if (current.precedence, current.sequence) > rank => {}
                Some(current) => {
                    if current.value != requirement.value {
                        tracing::debug!(
                            "{}={} from {} overrides {} from {}",
                            requirement.name,
                            requirement.value,
                            requirement.contributor,
                            current.value,
                            current.contributor
                        );
                    }
                    winners.insert(&requirement.name, requirement);
                }
                None => {
                    winners.insert(&requirement.name, requirement);
                }
            }
        }

        let flags = winners
            .into_values()
            .map(|r| BuildFlag {
                name: r.name.clone(),
                value: r.value.clone(),
            })
            .collect();

        FinalizedBuild {
            flags,
            libraries: self.libraries,
            serial_override: self.serial_override,
        }
    }
}

/// Result of arbitration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalizedBuild {
    /// Winning flags, sorted by name
    pub flags: Vec<BuildFlag>,
    /// Declared libraries, in declaration order
    pub libraries: Vec<LibraryDeclaration>,
    /// Whether the serial port override is required
    pub serial_override: bool,
}

impl FinalizedBuild {
    /// Returns the winning value of `name`, if any component set it.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

#[cfg(test)]
#[path = "build_context_tests.rs"]
mod tests;
