//! Component schemas.
//!
//! Every entry of the document is validated into a typed component that
//! implements [`Component`]. The trait is the seam between the per-platform
//! schemas and the pipeline: the pipeline only asks a component for its
//! identifier, the references it makes, the automations it owns, the build
//! requirements it contributes and the operations that construct it.
//!
//! | Section          | Platform         | Component                         |
//! |------------------|------------------|-----------------------------------|
//! | `climate`        | `daikin_312`     | [`climate::Daikin312Climate`]     |
//! | `switch`         | `daikin_312`     | [`entities::Daikin312Switch`]     |
//! | `select`         | `daikin_312`     | [`entities::Daikin312Select`]     |
//! | `number`         | `daikin_312`     | [`entities::Daikin312Number`]     |
//! | `irremote_debug` | (hub)            | [`debug::IrRemoteDebug`]          |
//! | `button`         | `irremote_debug` | [`debug::DumpButton`]             |
//! | `text_sensor`    | `irremote_debug` | [`debug::ProtocolSensor`]         |
//! | `display`        | `st7789_i80`     | [`display::St7789I80`]            |
//! | `sensor`         | any other        | [`sensor::ExternalSensor`]        |
//! | `text_sensor`    | any other        | [`sensor::ExternalSensor`]        |

mod automation;
pub mod climate;
pub mod debug;
pub mod display;
pub mod entities;
mod kind;
pub mod sensor;

use std::fmt;

use serde::de::DeserializeOwned;

use crate::build_context::BuildContext;
use crate::config::{ConfigError, Document, Violations};
use crate::emit::InitOp;
use crate::pipeline::ResolveOptions;
use crate::registry::Identifier;
use crate::schema::FieldPath;
use crate::target::TargetCapabilities;

pub use automation::{
    Action, Automation, EventHook, LogLevel, RawAction, RawAutomation, TriggerBinding, TriggerSet,
    cpp_string,
};
pub use kind::ComponentKind;

/// Sections whose entries are hubs without a `platform` key.
const HUB_SECTIONS: &[&str] = &["irremote_debug"];

/// Sections whose entries are dispatched on their `platform` key.
const PLATFORM_SECTIONS: &[&str] = &[
    "climate",
    "switch",
    "select",
    "number",
    "button",
    "sensor",
    "text_sensor",
    "display",
];

/// Which side of a link calls the setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    /// The referrer's setter receives the referenced instance.
    Outgoing,
    /// The referenced instance's setter receives the referrer.
    Incoming,
}

/// A reference from a component field to another instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Field holding the reference
    pub field: String,
    /// Referenced identifier; `None` selects the sole declared candidate
    pub target: Option<Identifier>,
    /// Kind the referenced instance must have
    pub expected: ComponentKind,
    /// Setter used to wire the link
    pub setter: &'static str,
    /// Which side calls the setter
    pub direction: LinkDirection,
}

impl Reference {
    /// A required reference wired with the referrer's `setter`.
    #[must_use]
    pub fn to(field: &str, target: &Identifier, expected: ComponentKind, setter: &'static str) -> Self {
        Self {
            field: field.to_string(),
            target: Some(target.clone()),
            expected,
            setter,
            direction: LinkDirection::Outgoing,
        }
    }

    /// A reference that falls back to the only declared instance of `expected`.
    #[must_use]
    pub fn defaulted(
        field: &str,
        target: Option<&Identifier>,
        expected: ComponentKind,
        setter: &'static str,
    ) -> Self {
        Self {
            field: field.to_string(),
            target: target.cloned(),
            expected,
            setter,
            direction: LinkDirection::Outgoing,
        }
    }

    /// Wires the link from the referenced side instead.
    #[must_use]
    pub const fn incoming(mut self) -> Self {
        self.direction = LinkDirection::Incoming;
        self
    }
}

/// A validated component instance.
pub trait Component: fmt::Debug {
    /// Kind of the instance.
    fn kind(&self) -> ComponentKind;

    /// Identifier written by the user, if any.
    fn id(&self) -> Option<&Identifier>;

    /// References to other instances, in field order.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Automations owned by this instance.
    fn automations(&self) -> &[Automation] {
        &[]
    }

    /// Records build flags, libraries and the serial override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LibraryConflict`] if a library clashes with an
    /// earlier declaration.
    fn contribute(
        &self,
        _id: &Identifier,
        _build: &mut BuildContext,
        _options: &ResolveOptions,
    ) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Appends the operations that construct and configure the instance.
    ///
    /// Links to referenced instances and automations are emitted separately.
    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>);
}

/// Validates every component entry of the document.
///
/// Validation does not stop at the first invalid entry: every failure is
/// collected and reported together.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] listing every violation found.
pub fn validate_document(
    document: &Document,
    target: &TargetCapabilities,
) -> Result<Vec<Box<dyn Component>>, ConfigError> {
    let mut violations = Violations::new();
    let mut components = Vec::new();

    for entry in document.entries() {
        let result = validate_entry(entry.section, entry.path, entry.value, target);
        if let Some(component) = violations.check(result) {
            components.push(component);
        }
    }

    violations.into_result()?;
    Ok(components)
}

fn validate_entry(
    section: &str,
    path: &FieldPath,
    value: &toml::Value,
    target: &TargetCapabilities,
) -> Result<Box<dyn Component>, ConfigError> {
    let platform = platform_of(section, path, value)?;

    let component: Box<dyn Component> = match (section, platform) {
        ("irremote_debug", None) => Box::new(debug::IrRemoteDebug::validate(path, value, target)?),
        ("climate", Some(climate::PLATFORM)) => {
            Box::new(climate::Daikin312Climate::validate(path, value, target)?)
        }
        ("switch", Some(climate::PLATFORM)) => Box::new(entities::Daikin312Switch::validate(path, value)?),
        ("select", Some(climate::PLATFORM)) => Box::new(entities::Daikin312Select::validate(path, value)?),
        ("number", Some(climate::PLATFORM)) => Box::new(entities::Daikin312Number::validate(path, value)?),
        ("button", Some(debug::PLATFORM)) => Box::new(debug::DumpButton::validate(path, value)?),
        ("text_sensor", Some(debug::PLATFORM)) => Box::new(debug::ProtocolSensor::validate(path, value)?),
        ("display", Some(display::PLATFORM)) => Box::new(display::St7789I80::validate(path, value, target)?),
        ("sensor", Some(_)) => Box::new(sensor::ExternalSensor::validate(path, value, ComponentKind::Sensor)?),
        ("text_sensor", Some(_)) => {
            Box::new(sensor::ExternalSensor::validate(path, value, ComponentKind::TextSensor)?)
        }
        (_, Some(platform)) => {
            return Err(ConfigError::violation(
                path.field("platform"),
                format!("unknown {section} platform '{platform}'"),
            ));
        }
        (_, None) => return Err(ConfigError::violation(path, "missing field `platform`")),
    };

    Ok(component)
}

fn platform_of<'a>(
    section: &str,
    path: &FieldPath,
    value: &'a toml::Value,
) -> Result<Option<&'a str>, ConfigError> {
    if HUB_SECTIONS.contains(&section) {
        return Ok(None);
    }

    if !PLATFORM_SECTIONS.contains(&section) {
        let known: Vec<_> = HUB_SECTIONS.iter().chain(PLATFORM_SECTIONS).copied().collect();
        return Err(ConfigError::violation(
            path,
            format!("unknown section '{section}', expected one of: {}", known.join(", ")),
        ));
    }

    match value.get("platform") {
        Some(toml::Value::String(platform)) => Ok(Some(platform.as_str())),
        Some(_) => Err(ConfigError::violation(path.field("platform"), "platform must be a string")),
        None => Err(ConfigError::violation(path, "missing field `platform`")),
    }
}

/// Deserializes an entry into its raw schema record.
///
/// Structural problems (missing or unknown fields, wrong types) are reported
/// as violations at `path`.
pub(crate) fn deserialize<T: DeserializeOwned>(
    path: &FieldPath,
    value: &toml::Value,
) -> Result<T, ConfigError> {
    value
        .clone()
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::violation(path, e.message()))
}

/// Validates an optional identifier field.
pub(crate) fn optional_id(
    path: &FieldPath,
    field: &str,
    raw: Option<&str>,
) -> Result<Option<Identifier>, ConfigError> {
    raw.map(|raw| Identifier::parse(&path.field(field), raw)).transpose()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
