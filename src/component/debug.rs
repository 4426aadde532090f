//! IR receiver debug hub and its entities.
//!
//! The hub decodes every IR frame it receives and logs it at the configured
//! verbosity. Because it must recognize any protocol, it turns the IR
//! library's default protocol set back on, overriding the size optimization
//! contributed by the climate controller.

use serde::Deserialize;

use crate::build_context::{BuildContext, Precedence};
use crate::config::ConfigError;
use crate::emit::{Arg, InitOp};
use crate::pipeline::ResolveOptions;
use crate::registry::Identifier;
use crate::schema::{
    FieldPath, Literal, PinRole, PinSpec, RawPin, Token, in_range, pin, positive_millis, time_period,
    whole_millis,
};
use crate::target::TargetCapabilities;

use super::climate::IR_ENABLE_DEFAULT;
use super::{Component, ComponentKind, Reference, deserialize, optional_id};

/// Platform name of the hub's entities.
pub const PLATFORM: &str = "irremote_debug";

/// Default capture buffer size in entries.
pub const DEFAULT_BUFFER_SIZE: u16 = 1024;

/// Default end-of-frame timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 15;

/// Default polling interval in milliseconds.
pub const DEFAULT_UPDATE_INTERVAL_MS: u32 = 100;

const HUB_FIELD: &str = "irremote_debug_id";

/// How much the hub logs per received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Protocol name only
    Minimal,
    /// Protocol, bits and value
    #[default]
    Normal,
    /// Decoded state description
    Detailed,
    /// Raw timings
    Raw,
}

impl Token for Verbosity {
    const ALL: &'static [Self] = &[Self::Minimal, Self::Normal, Self::Detailed, Self::Raw];

    fn token(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Normal => "normal",
            Self::Detailed => "detailed",
            Self::Raw => "raw",
        }
    }
}

impl Verbosity {
    const fn constant(self) -> &'static str {
        match self {
            Self::Minimal => "irremote_debug::VERBOSITY_MINIMAL",
            Self::Normal => "irremote_debug::VERBOSITY_NORMAL",
            Self::Detailed => "irremote_debug::VERBOSITY_DETAILED",
            Self::Raw => "irremote_debug::VERBOSITY_RAW",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDebug {
    id: Option<String>,
    pin: RawPin,
    buffer_size: Option<i64>,
    timeout: Option<Literal>,
    verbosity: Option<String>,
    update_interval: Option<Literal>,
}

/// A validated `irremote_debug` hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrRemoteDebug {
    /// Identifier written by the user
    pub id: Option<Identifier>,
    /// IR receiver input
    pub pin: PinSpec,
    /// Capture buffer size in entries
    pub buffer_size: u16,
    /// End-of-frame timeout in milliseconds
    pub timeout_ms: u32,
    /// Log detail
    pub verbosity: Verbosity,
    /// Polling interval in milliseconds
    pub update_interval_ms: u32,
}

impl IrRemoteDebug {
    /// Validates the `irremote_debug` section.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] for the first invalid field.
    pub fn validate(
        path: &FieldPath,
        value: &toml::Value,
        target: &TargetCapabilities,
    ) -> Result<Self, ConfigError> {
        let raw: RawDebug = deserialize(path, value)?;

        let buffer_size = match raw.buffer_size {
            Some(size) => in_range(&path.field("buffer_size"), size, 100, 2048)?,
            None => i64::from(DEFAULT_BUFFER_SIZE),
        };

        Ok(Self {
            id: optional_id(path, "id", raw.id.as_deref())?,
            pin: pin(&path.field("pin"), &raw.pin, PinRole::Input, target)?,
            buffer_size: u16::try_from(buffer_size).unwrap_or(DEFAULT_BUFFER_SIZE),
            timeout_ms: match &raw.timeout {
                Some(literal) => {
                    let path = path.field("timeout");
                    whole_millis(&path, time_period(&path, literal)?)?
                }
                None => DEFAULT_TIMEOUT_MS,
            },
            verbosity: raw
                .verbosity
                .as_deref()
                .map(|v| Verbosity::parse_token(&path.field("verbosity"), v))
                .transpose()?
                .unwrap_or_default(),
            update_interval_ms: millis_or(
                path,
                "update_interval",
                raw.update_interval.as_ref(),
                DEFAULT_UPDATE_INTERVAL_MS,
            )?,
        })
    }
}

fn millis_or(
    path: &FieldPath,
    field: &str,
    literal: Option<&Literal>,
    default: u32,
) -> Result<u32, ConfigError> {
    let Some(literal) = literal else {
        return Ok(default);
    };
    let path = path.field(field);
    positive_millis(&path, time_period(&path, literal)?)
}

impl Component for IrRemoteDebug {
    fn kind(&self) -> ComponentKind {
        ComponentKind::IrRemoteDebug
    }

    fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    fn contribute(
        &self,
        id: &Identifier,
        build: &mut BuildContext,
        options: &ResolveOptions,
    ) -> Result<(), ConfigError> {
        if options.target.capabilities().ir_library_needs_serial {
            build.require_serial_override();
        }
        build.contribute(id, IR_ENABLE_DEFAULT, "true", Precedence::OverrideForDebug);
        build.declare_library(options.ir_library.clone())
    }

    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>) {
        ops.push(InitOp::construct(id, self.kind()));
        ops.push(InitOp::register(id, "register_component"));
        ops.push(InitOp::set(id, "set_update_interval", self.update_interval_ms));
        ops.push(InitOp::set(id, "set_pin", self.pin.clone()));
        ops.push(InitOp::set(id, "set_buffer_size", self.buffer_size));
        ops.push(InitOp::set(id, "set_timeout", self.timeout_ms));
        ops.push(InitOp::set(id, "set_verbosity", Arg::Const(self.verbosity.constant().to_string())));
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHubEntity {
    #[allow(dead_code)]
    platform: String,
    id: Option<String>,
    name: Option<String>,
    icon: Option<String>,
    irremote_debug_id: Option<String>,
}

/// Fields shared by the hub's entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubEntity {
    /// Identifier written by the user
    pub id: Option<Identifier>,
    /// Display name
    pub name: Option<String>,
    /// Icon override
    pub icon: Option<String>,
    /// Hub this entity belongs to; defaults to the only declared hub
    pub hub: Option<Identifier>,
}

impl HubEntity {
    fn parse(path: &FieldPath, value: &toml::Value) -> Result<Self, ConfigError> {
        let raw: RawHubEntity = deserialize(path, value)?;
        Ok(Self {
            id: optional_id(path, "id", raw.id.as_deref())?,
            name: raw.name,
            icon: raw.icon,
            hub: optional_id(path, HUB_FIELD, raw.irremote_debug_id.as_deref())?,
        })
    }

    fn emit_entity(&self, id: &Identifier, kind: ComponentKind, registry: &'static str, icon: &str, ops: &mut Vec<InitOp>) {
        ops.push(InitOp::construct(id, kind));
        ops.push(InitOp::register(id, registry));
        if let Some(name) = &self.name {
            ops.push(InitOp::set(id, "set_name", name.as_str()));
        }
        ops.push(InitOp::set(id, "set_icon", self.icon.as_deref().unwrap_or(icon)));
        ops.push(InitOp::set(
            id,
            "set_entity_category",
            Arg::Const("ENTITY_CATEGORY_DIAGNOSTIC".to_string()),
        ));
    }
}

/// Button that dumps the hub's last captured frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpButton {
    /// Shared entity fields
    pub entity: HubEntity,
}

impl DumpButton {
    /// Validates an `irremote_debug` button entry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] for the first invalid field.
    pub fn validate(path: &FieldPath, value: &toml::Value) -> Result<Self, ConfigError> {
        Ok(Self {
            entity: HubEntity::parse(path, value)?,
        })
    }
}

impl Component for DumpButton {
    fn kind(&self) -> ComponentKind {
        ComponentKind::IrRemoteDumpButton
    }

    fn id(&self) -> Option<&Identifier> {
        self.entity.id.as_ref()
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::defaulted(
            HUB_FIELD,
            self.entity.hub.as_ref(),
            ComponentKind::IrRemoteDebug,
            "set_parent",
        )]
    }

    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>) {
        self.entity
            .emit_entity(id, self.kind(), "register_button", "mdi:pulse", ops);
    }
}

/// Text sensor publishing the protocol of the last decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolSensor {
    /// Shared entity fields
    pub entity: HubEntity,
}

impl ProtocolSensor {
    /// Validates an `irremote_debug` text sensor entry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] for the first invalid field.
    pub fn validate(path: &FieldPath, value: &toml::Value) -> Result<Self, ConfigError> {
        Ok(Self {
            entity: HubEntity::parse(path, value)?,
        })
    }
}

impl Component for ProtocolSensor {
    fn kind(&self) -> ComponentKind {
        ComponentKind::IrRemoteProtocolSensor
    }

    fn id(&self) -> Option<&Identifier> {
        self.entity.id.as_ref()
    }

    fn references(&self) -> Vec<Reference> {
        // The hub owns the sensor: the hub's setter receives it.
        vec![
            Reference::defaulted(
                HUB_FIELD,
                self.entity.hub.as_ref(),
                ComponentKind::IrRemoteDebug,
                "set_protocol_text_sensor",
            )
            .incoming(),
        ]
    }

    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>) {
        self.entity
            .emit_entity(id, self.kind(), "register_text_sensor", "mdi:remote", ops);
    }
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
