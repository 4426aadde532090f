//! Feature entities of the Daikin 312 climate controller.
//!
//! Each entity names its controller through `daikin_312_id` and is wired to
//! it with `set_parent`; its `type` selects which controller feature it
//! drives.

use serde::Deserialize;

use crate::config::ConfigError;
use crate::emit::{Arg, InitOp};
use crate::registry::Identifier;
use crate::schema::{FieldPath, Token};

use super::{Component, ComponentKind, Reference, deserialize, optional_id};

const PARENT_FIELD: &str = "daikin_312_id";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntity {
    #[allow(dead_code)]
    platform: String,
    id: Option<String>,
    name: Option<String>,
    icon: Option<String>,
    daikin_312_id: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Fields shared by every controller entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBase {
    /// Identifier written by the user
    pub id: Option<Identifier>,
    /// Display name
    pub name: Option<String>,
    /// Icon override
    pub icon: Option<String>,
    /// Controller this entity belongs to
    pub parent: Identifier,
}

impl EntityBase {
    fn parse<T: Token>(path: &FieldPath, value: &toml::Value) -> Result<(Self, T), ConfigError> {
        let raw: RawEntity = deserialize(path, value)?;
        let kind = T::parse_token(&path.field("type"), &raw.kind)?;
        let base = Self {
            id: optional_id(path, "id", raw.id.as_deref())?,
            name: raw.name,
            icon: raw.icon,
            parent: Identifier::parse(&path.field(PARENT_FIELD), &raw.daikin_312_id)?,
        };
        Ok((base, kind))
    }

    fn parent_reference(&self) -> Vec<Reference> {
        vec![Reference::to(
            PARENT_FIELD,
            &self.parent,
            ComponentKind::Daikin312Climate,
            "set_parent",
        )]
    }

    fn emit_entity(&self, id: &Identifier, kind: ComponentKind, registry: &'static str, icon: &str, ops: &mut Vec<InitOp>) {
        ops.push(InitOp::construct(id, kind));
        ops.push(InitOp::register(id, "register_component"));
        ops.push(InitOp::register(id, registry));
        if let Some(name) = &self.name {
            ops.push(InitOp::set(id, "set_name", name.as_str()));
        }
        ops.push(InitOp::set(id, "set_icon", self.icon.as_deref().unwrap_or(icon)));
    }
}

/// Feature driven by a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchType {
    /// Air purifier
    Purify,
    /// Presence sensor
    Eye,
    /// Presence sensor automatic mode
    EyeAuto,
}

impl Token for SwitchType {
    const ALL: &'static [Self] = &[Self::Purify, Self::Eye, Self::EyeAuto];

    fn token(self) -> &'static str {
        match self {
            Self::Purify => "purify",
            Self::Eye => "eye",
            Self::EyeAuto => "eye_auto",
        }
    }
}

impl SwitchType {
    /// Default icon of the switch.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Purify => "mdi:air-filter",
            Self::Eye => "mdi:eye",
            Self::EyeAuto => "mdi:eye-refresh",
        }
    }

    const fn constant(self) -> &'static str {
        match self {
            Self::Purify => "daikin_312::DAIKIN312_SWITCH_PURIFY",
            Self::Eye => "daikin_312::DAIKIN312_SWITCH_EYE",
            Self::EyeAuto => "daikin_312::DAIKIN312_SWITCH_EYE_AUTO",
        }
    }
}

/// A validated `daikin_312` switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Daikin312Switch {
    /// Shared entity fields
    pub base: EntityBase,
    /// Feature driven by the switch
    pub switch_type: SwitchType,
}

impl Daikin312Switch {
    /// Validates a `switch` entry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] for the first invalid field.
    pub fn validate(path: &FieldPath, value: &toml::Value) -> Result<Self, ConfigError> {
        let (base, switch_type) = EntityBase::parse(path, value)?;
        Ok(Self { base, switch_type })
    }
}

impl Component for Daikin312Switch {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Daikin312Switch
    }

    fn id(&self) -> Option<&Identifier> {
        self.base.id.as_ref()
    }

    fn references(&self) -> Vec<Reference> {
        self.base.parent_reference()
    }

    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>) {
        self.base
            .emit_entity(id, self.kind(), "register_switch", self.switch_type.icon(), ops);
        ops.push(InitOp::set(
            id,
            "set_switch_type",
            Arg::Const(self.switch_type.constant().to_string()),
        ));
    }
}

/// Setting driven by a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectType {
    /// Display brightness
    Light,
    /// Confirmation beep volume
    Beep,
}

impl Token for SelectType {
    const ALL: &'static [Self] = &[Self::Light, Self::Beep];

    fn token(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Beep => "beep",
        }
    }
}

impl SelectType {
    /// Options offered by the select, in order.
    #[must_use]
    pub const fn options(self) -> &'static [&'static str] {
        match self {
            Self::Light => &["Off", "Dim", "Bright"],
            Self::Beep => &["Off", "Quiet", "Loud"],
        }
    }

    /// Default icon of the select.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Light => "mdi:lightbulb",
            Self::Beep => "mdi:volume-high",
        }
    }

    const fn constant(self) -> &'static str {
        match self {
            Self::Light => "daikin_312::DAIKIN312_SELECT_LIGHT",
            Self::Beep => "daikin_312::DAIKIN312_SELECT_BEEP",
        }
    }
}

/// A validated `daikin_312` select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Daikin312Select {
    /// Shared entity fields
    pub base: EntityBase,
    /// Setting driven by the select
    pub select_type: SelectType,
}

impl Daikin312Select {
    /// Validates a `select` entry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] for the first invalid field.
    pub fn validate(path: &FieldPath, value: &toml::Value) -> Result<Self, ConfigError> {
        let (base, select_type) = EntityBase::parse(path, value)?;
        Ok(Self { base, select_type })
    }
}

impl Component for Daikin312Select {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Daikin312Select
    }

    fn id(&self) -> Option<&Identifier> {
        self.base.id.as_ref()
    }

    fn references(&self) -> Vec<Reference> {
        self.base.parent_reference()
    }

    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>) {
        self.base
            .emit_entity(id, self.kind(), "register_select", self.select_type.icon(), ops);
        ops.push(InitOp::set(id, "set_entity_category", Arg::Const("ENTITY_CATEGORY_CONFIG".to_string())));
        ops.push(InitOp::set(
            id,
            "set_options",
            Arg::Options(self.select_type.options().iter().map(ToString::to_string).collect()),
        ));
        ops.push(InitOp::set(
            id,
            "set_select_type",
            Arg::Const(self.select_type.constant().to_string()),
        ));
    }
}

/// Setting driven by a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberType {
    /// Minutes until the controller turns itself off
    SleepTimer,
}

impl Token for NumberType {
    const ALL: &'static [Self] = &[Self::SleepTimer];

    fn token(self) -> &'static str {
        match self {
            Self::SleepTimer => "sleep_timer",
        }
    }
}

impl NumberType {
    /// Accepted range and step, as `(min, max, step)`.
    #[must_use]
    pub const fn range(self) -> (u16, u16, u16) {
        match self {
            Self::SleepTimer => (0, 720, 1),
        }
    }

    const fn constant(self) -> &'static str {
        match self {
            Self::SleepTimer => "daikin_312::DAIKIN312_NUMBER_SLEEP_TIMER",
        }
    }
}

/// A validated `daikin_312` number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Daikin312Number {
    /// Shared entity fields
    pub base: EntityBase,
    /// Setting driven by the number
    pub number_type: NumberType,
}

impl Daikin312Number {
    /// Validates a `number` entry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] for the first invalid field.
    pub fn validate(path: &FieldPath, value: &toml::Value) -> Result<Self, ConfigError> {
        let (base, number_type) = EntityBase::parse(path, value)?;
        Ok(Self { base, number_type })
    }
}

impl Component for Daikin312Number {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Daikin312Number
    }

    fn id(&self) -> Option<&Identifier> {
        self.base.id.as_ref()
    }

    fn references(&self) -> Vec<Reference> {
        self.base.parent_reference()
    }

    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>) {
        let (min, max, step) = self.number_type.range();

        self.base
            .emit_entity(id, self.kind(), "register_number", "mdi:power-sleep", ops);
        ops.push(InitOp::set(id, "set_entity_category", Arg::Const("ENTITY_CATEGORY_CONFIG".to_string())));
        ops.push(InitOp::set(id, "set_unit_of_measurement", "min"));
        ops.push(InitOp::set(id, "set_device_class", "duration"));
        ops.push(InitOp::set(id, "set_min_value", min));
        ops.push(InitOp::set(id, "set_max_value", max));
        ops.push(InitOp::set(id, "set_step", step));
        ops.push(InitOp::set(
            id,
            "set_number_type",
            Arg::Const(self.number_type.constant().to_string()),
        ));
    }
}

#[cfg(test)]
#[path = "entities_tests.rs"]
mod tests;
