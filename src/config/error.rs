//! Error types for configuration parsing, validation and resolution.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::component::ComponentKind;
use crate::target::Platform;

/// Error type for configuration operations.
///
/// Covers the whole build-time pipeline: reading the document, validating
/// each component against its schema, merging presets, linking identifier
/// references and declaring external libraries.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration document.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML document.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write a file (template or generated artifact).
    #[error("Failed to write file '{}': {source}", path.display())]
    FileWrite {
        /// Path of the file being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Missing setting that must be provided by CLI or config file.
    #[error("Missing required setting: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing setting
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// Invalid library source URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A field value does not satisfy its schema.
    #[error("{path}: {reason}")]
    SchemaViolation {
        /// Dotted path of the offending field, e.g. `display[0].data_pins`
        path: String,
        /// What is wrong with the value
        reason: String,
    },

    /// A required field is still absent after the preset merge.
    #[error(
        "{component} '{id}': missing required field '{field}' (not set and not provided by the model preset)"
    )]
    MissingRequiredField {
        /// Kind of the component being resolved
        component: ComponentKind,
        /// Identifier of the instance (explicit or generated)
        id: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// Two instances declare the same identifier.
    #[error("Duplicate identifier '{id}': already declared by a {first}, redeclared by a {second}")]
    DuplicateIdentifier {
        /// The duplicated identifier
        id: String,
        /// Kind of the first declaration (which is kept)
        first: ComponentKind,
        /// Kind of the rejected declaration
        second: ComponentKind,
    },

    /// A reference could not be resolved against the registry.
    #[error("{referrer}.{field}: cannot resolve '{target}': {reason}")]
    UnresolvedReference {
        /// Identifier of the referring instance
        referrer: String,
        /// Field holding the reference
        field: String,
        /// The referenced identifier
        target: String,
        /// Why resolution failed
        reason: ReferenceFailure,
    },

    /// A defaulted reference has more than one candidate.
    #[error(
        "{referrer}.{field}: more than one {expected} declared ({listed}); set '{field}' explicitly",
        listed = .candidates.join(", ")
    )]
    AmbiguousReference {
        /// Identifier of the referring instance
        referrer: String,
        /// Field holding the reference
        field: String,
        /// Kind the reference expects
        expected: ComponentKind,
        /// Identifiers of all candidates
        candidates: Vec<String>,
    },

    /// A component cannot be built for the selected target.
    #[error("{component} is not supported on {target}")]
    UnsupportedTarget {
        /// The component kind
        component: ComponentKind,
        /// The selected target
        target: Platform,
    },

    /// Two components declare the same external library from different sources.
    #[error("Library '{name}' declared from '{first}' and '{second}'")]
    LibraryConflict {
        /// Library name
        name: String,
        /// Source of the first declaration
        first: String,
        /// Source of the conflicting declaration
        second: String,
    },

    /// One or more validation failures, collected over the whole document.
    #[error("Configuration is invalid ({count} error(s)):\n{0}", count = .0.len())]
    Invalid(Violations),
}

/// Why a reference failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFailure {
    /// No instance with that identifier exists.
    NotDeclared {
        /// Kind the reference expects
        expected: ComponentKind,
    },
    /// The instance exists but is declared after the referrer.
    DeclaredLater {
        /// Kind the reference expects
        expected: ComponentKind,
    },
    /// The instance exists but has an incompatible kind.
    WrongKind {
        /// Kind the reference expects
        expected: ComponentKind,
        /// Kind of the declared instance
        actual: ComponentKind,
    },
}

impl fmt::Display for ReferenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDeclared { expected } => write!(f, "no {expected} with this id is declared"),
            Self::DeclaredLater { expected } => write!(
                f,
                "the {expected} is declared after its referrer; move it earlier in the document"
            ),
            Self::WrongKind { expected, actual } => {
                write!(f, "expected a {expected}, found a {actual}")
            }
        }
    }
}

/// Well-known setting names for `MissingRequired` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The target platform setting.
    pub const TARGET: &str = "target";
}

impl ConfigError {
    /// Creates a `MissingRequired` error for a required setting.
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }

    /// Creates a `SchemaViolation` for the field at `path`.
    #[must_use]
    pub fn violation(path: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Validation failures gathered during one pass over the document.
///
/// Schema validation is exhaustive: every component is checked and all
/// failures are reported together instead of stopping at the first one.
#[derive(Debug, Default)]
pub struct Violations(Vec<ConfigError>);

impl Violations {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a failure.
    pub fn push(&mut self, error: ConfigError) {
        self.0.push(error);
    }

    /// Records the error of `result`, returning the success value if any.
    pub fn check<T>(&mut self, result: Result<T, ConfigError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    /// Returns the number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the recorded failures in document order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter()
    }

    /// Converts the collection into `Ok(())` when empty, [`ConfigError::Invalid`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if any failure was recorded.
    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(self))
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {error}")?;
        }
        Ok(())
    }
}
