//! Identifier registry.
//!
//! An arena of declared component instances keyed by their symbolic
//! [`Identifier`]. Each declaration records its position in the document;
//! lookups are made *from* a position and only see instances declared
//! strictly before it, so references can point backwards but never forwards.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::component::ComponentKind;
use crate::config::{ConfigError, ReferenceFailure};
use crate::schema::FieldPath;

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Symbolic name of a component instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Validates a user-supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] unless `raw` is a valid
    /// C identifier (`[A-Za-z_][A-Za-z0-9_]*`).
    pub fn parse(path: &FieldPath, raw: &str) -> Result<Self, ConfigError> {
        if IDENTIFIER.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ConfigError::violation(
                path,
                format!("invalid id '{raw}': use letters, digits and '_' and do not start with a digit"),
            ))
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A declared instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Identifier of the instance
    pub id: Identifier,
    /// Kind of the instance
    pub kind: ComponentKind,
    /// Position of the declaring component in document order
    pub position: usize,
    /// Whether the identifier was generated rather than written by the user
    pub generated: bool,
}

/// Arena of declared instances.
#[derive(Debug, Default)]
pub struct Registry {
    declarations: Vec<Declaration>,
    index: HashMap<Identifier, usize>,
    reserved: HashSet<Identifier>,
    counters: HashMap<ComponentKind, usize>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a user-written identifier so generated ones never take it.
    pub fn reserve(&mut self, id: &Identifier) {
        self.reserved.insert(id.clone());
    }

    /// Generates a fresh identifier for an instance declared without one.
    ///
    /// Generated identifiers look like `<kind prefix>_<n>` and skip every
    /// reserved or already declared identifier.
    pub fn generate_id(&mut self, kind: ComponentKind) -> Identifier {
        loop {
            let counter = self.counters.entry(kind).or_insert(0);
            let candidate = Identifier(format!("{}_{counter}", kind.id_prefix()));
            *counter += 1;

            if !self.reserved.contains(&candidate) && !self.index.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Declares a new instance at `position`.
    ///
    /// The first declaration of an identifier wins.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateIdentifier`] if `id` is already declared.
    pub fn declare(
        &mut self,
        id: Identifier,
        kind: ComponentKind,
        position: usize,
        generated: bool,
    ) -> Result<&Declaration, ConfigError> {
        if let Some(&existing) = self.index.get(&id) {
            return Err(ConfigError::DuplicateIdentifier {
                id: id.to_string(),
                first: self.declarations[existing].kind,
                second: kind,
            });
        }

        tracing::debug!("Declared {kind} '{id}' at position {position}");

        let slot = self.declarations.len();
        self.index.insert(id.clone(), slot);
        self.declarations.push(Declaration {
            id,
            kind,
            position,
            generated,
        });
        Ok(&self.declarations[slot])
    }

    /// Looks up `id` as seen from the component at position `from`.
    ///
    /// # Errors
    ///
    /// Returns the [`ReferenceFailure`] describing why the lookup failed:
    /// the identifier is unknown, declared at or after `from`, or of a kind
    /// that does not satisfy `expected`.
    pub fn resolve(
        &self,
        id: &Identifier,
        expected: ComponentKind,
        from: usize,
    ) -> Result<&Declaration, ReferenceFailure> {
        let declaration = self
            .get(id)
            .ok_or(ReferenceFailure::NotDeclared { expected })?;

        if declaration.position >= from {
            return Err(ReferenceFailure::DeclaredLater { expected });
        }

        if !declaration.kind.is_a(expected) {
            return Err(ReferenceFailure::WrongKind {
                expected,
                actual: declaration.kind,
            });
        }

        Ok(declaration)
    }

    /// Returns every instance of `expected` kind declared before `from`.
    ///
    /// Used for references that may be omitted when exactly one candidate exists.
    #[must_use]
    pub fn candidates(&self, expected: ComponentKind, from: usize) -> Vec<&Declaration> {
        self.declarations
            .iter()
            .filter(|d| d.position < from && d.kind.is_a(expected))
            .collect()
    }

    /// Returns the declaration of `id`, regardless of position.
    #[must_use]
    pub fn get(&self, id: &Identifier) -> Option<&Declaration> {
        self.index.get(id).map(|&slot| &self.declarations[slot])
    }

    /// Returns the number of declared instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterates over declarations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }
}
