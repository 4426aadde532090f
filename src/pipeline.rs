//! Resolution pipeline.
//!
//! Runs the stages in order, each consuming the previous stage's output:
//!
//! 1. **Validate** every entry against its schema and merge presets.
//!    All violations are collected before failing.
//! 2. **Declare** every instance (and every automation trigger) in the
//!    registry, generating identifiers where the user wrote none.
//! 3. **Link** every reference to an instance declared strictly earlier.
//!    Automation actions may name any instance of the document.
//! 4. **Contribute** build flags and libraries, then arbitrate them.
//! 5. **Emit** the ordered initialization operations, automations last.
//!
//! Stages 2 to 5 abort on the first failure.

use tracing::{debug, info};

use crate::build_context::{BuildContext, LibraryDeclaration};
use crate::component::{self, Component, ComponentKind, LinkDirection};
use crate::config::{ConfigError, Document};
use crate::emit::{BuildPlan, Emitter};
use crate::registry::{Identifier, Registry};
use crate::target::Platform;

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

/// Inputs of a resolution run that do not come from the component entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Target chip family
    pub target: Platform,
    /// Source of the IR library
    pub ir_library: LibraryDeclaration,
}

/// A reference bound to a declared instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Field holding the reference
    pub field: String,
    /// Setter that wires the link
    pub setter: &'static str,
    /// The referenced instance
    pub target: Identifier,
    /// Kind the reference expects
    pub expected: ComponentKind,
    /// Which side calls the setter
    pub direction: LinkDirection,
}

/// An instance with its identifier fixed and its references bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedInstance {
    /// Explicit or generated identifier
    pub id: Identifier,
    /// Bound references, in field order
    pub links: Vec<Link>,
    /// Trigger identifiers, one per automation of the component
    pub triggers: Vec<Identifier>,
}

struct Declared {
    id: Identifier,
    triggers: Vec<Identifier>,
}

/// Resolves a document into a build plan.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if any entry fails validation, or the
/// first declaration, linking, library or emission error.
pub fn resolve(document: &Document, options: &ResolveOptions) -> Result<BuildPlan, ConfigError> {
    let components = component::validate_document(document, options.target.capabilities())?;
    info!("Validated {} component(s) for {}", components.len(), options.target);

    let mut registry = Registry::new();
    let declared = declare(&components, &mut registry)?;
    let instances = link(&components, declared, &registry)?;

    let mut build = BuildContext::new();
    for (component, instance) in components.iter().zip(&instances) {
        component.contribute(&instance.id, &mut build, options)?;
    }
    let finalized = build.finalize();

    let plan = Emitter::new(options.target).emit(&components, &instances, finalized)?;
    info!(
        "Plan ready: {} operation(s), {} build flag(s), {} librar{}",
        plan.operations.len(),
        plan.build_flags.len(),
        plan.libraries.len(),
        if plan.libraries.len() == 1 { "y" } else { "ies" }
    );
    Ok(plan)
}

/// Declares every instance and trigger.
///
/// User-written identifiers are reserved first so that generated ones never
/// collide with an identifier that appears later in the document.
fn declare(
    components: &[Box<dyn Component>],
    registry: &mut Registry,
) -> Result<Vec<Declared>, ConfigError> {
    for component in components {
        let explicit = component
            .id()
            .into_iter()
            .chain(component.automations().iter().filter_map(|a| a.trigger_id.as_ref()));
        for id in explicit {
            registry.reserve(id);
        }
    }

    let mut declared = Vec::with_capacity(components.len());
    for (position, component) in components.iter().enumerate() {
        let id = declare_one(registry, component.id(), component.kind(), position)?;

        let mut triggers = Vec::new();
        for automation in component.automations() {
            let trigger = declare_one(
                registry,
                automation.trigger_id.as_ref(),
                automation.trigger_kind,
                position,
            )?;
            triggers.push(trigger);
        }

        declared.push(Declared { id, triggers });
    }
    Ok(declared)
}

fn declare_one(
    registry: &mut Registry,
    explicit: Option<&Identifier>,
    kind: ComponentKind,
    position: usize,
) -> Result<Identifier, ConfigError> {
    let (id, generated) = match explicit {
        Some(id) => (id.clone(), false),
        None => (registry.generate_id(kind), true),
    };
    registry.declare(id.clone(), kind, position, generated)?;
    Ok(id)
}

/// Binds every reference and action target.
fn link(
    components: &[Box<dyn Component>],
    declared: Vec<Declared>,
    registry: &Registry,
) -> Result<Vec<LinkedInstance>, ConfigError> {
    let everything = components.len();
    components
        .iter()
        .zip(declared)
        .enumerate()
        .map(|(position, (component, declared))| {
            let links = component
                .references()
                .into_iter()
                .map(|reference| {
                    let target = bind(
                        registry,
                        &declared.id,
                        &reference.field,
                        reference.target.as_ref(),
                        reference.expected,
                        position,
                    )?;
                    debug!("Linked {}.{} -> {target}", declared.id, reference.field);
                    Ok(Link {
                        field: reference.field,
                        setter: reference.setter,
                        target,
                        expected: reference.expected,
                        direction: reference.direction,
                    })
                })
                .collect::<Result<Vec<_>, ConfigError>>()?;

            // Actions run after setup, so they may name any instance.
            for (a, automation) in component.automations().iter().enumerate() {
                for (i, action) in automation.actions.iter().enumerate() {
                    if let Some((target, expected)) = action.target() {
                        let field = format!("{}[{a}].then[{i}]", automation.event);
                        bind(registry, &declared.id, &field, Some(target), expected, everything)?;
                    }
                }
            }

            Ok(LinkedInstance {
                id: declared.id,
                links,
                triggers: declared.triggers,
            })
        })
        .collect()
}

/// Resolves one reference as seen from `position`.
///
/// An omitted target selects the only declared candidate of the expected
/// kind.
fn bind(
    registry: &Registry,
    referrer: &Identifier,
    field: &str,
    target: Option<&Identifier>,
    expected: ComponentKind,
    position: usize,
) -> Result<Identifier, ConfigError> {
    if let Some(target) = target {
        return registry
            .resolve(target, expected, position)
            .map(|declaration| declaration.id.clone())
            .map_err(|reason| ConfigError::UnresolvedReference {
                referrer: referrer.to_string(),
                field: field.to_string(),
                target: target.to_string(),
                reason,
            });
    }

    match registry.candidates(expected, position).as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(ConfigError::UnresolvedReference {
            referrer: referrer.to_string(),
            field: field.to_string(),
            target: format!("<any {expected}>"),
            reason: crate::config::ReferenceFailure::NotDeclared { expected },
        }),
        many => Err(ConfigError::AmbiguousReference {
            referrer: referrer.to_string(),
            field: field.to_string(),
            expected,
            candidates: many.iter().map(|d| d.id.to_string()).collect(),
        }),
    }
}
