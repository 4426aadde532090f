//! Daikin 312-bit IR climate controller.
//!
//! Drives the air conditioner through an IR LED on an output pin. The
//! controller can follow an external room temperature sensor and mirror its
//! mode, fan and swing settings from external text sensors. Its feature
//! switches, selects and sleep timer are separate entities (see
//! [`super::entities`]) that reference it by identifier.

use serde::Deserialize;

use crate::build_context::{BuildContext, Precedence};
use crate::config::ConfigError;
use crate::emit::InitOp;
use crate::pipeline::ResolveOptions;
use crate::registry::Identifier;
use crate::schema::{FieldPath, PinRole, PinSpec, RawPin, pin};
use crate::target::TargetCapabilities;

use super::{
    Automation, Component, ComponentKind, EventHook, RawAutomation, Reference, deserialize,
    optional_id,
};

/// Platform name in the `climate` section.
pub const PLATFORM: &str = "daikin_312";

/// Flag that enables every protocol of the IR library by default.
pub const IR_ENABLE_DEFAULT: &str = "_IR_ENABLE_DEFAULT_";

/// Flags the controller needs: every other protocol off, Daikin 312 on.
const FLAGS: [(&str, &str); 3] = [
    (IR_ENABLE_DEFAULT, "false"),
    ("SEND_DAIKIN312", "true"),
    ("DECODE_DAIKIN312", "true"),
];

const TURN_OFF: EventHook = EventHook {
    event: "on_turn_off",
    trigger_kind: ComponentKind::Daikin312TurnOffTrigger,
    setter: "set_turn_off_trigger",
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClimate {
    #[allow(dead_code)]
    platform: String,
    id: Option<String>,
    name: Option<String>,
    pin: RawPin,
    sensor: Option<String>,
    external_mode: Option<String>,
    external_temperature: Option<String>,
    external_fan_mode: Option<String>,
    external_swing_mode: Option<String>,
    #[serde(default)]
    on_turn_off: Vec<RawAutomation>,
}

/// A validated `daikin_312` climate entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Daikin312Climate {
    /// Identifier written by the user
    pub id: Option<Identifier>,
    /// Display name
    pub name: Option<String>,
    /// IR LED output
    pub pin: PinSpec,
    /// Room temperature sensor
    pub sensor: Option<Identifier>,
    /// Text sensor mirrored into the mode
    pub external_mode: Option<Identifier>,
    /// Sensor mirrored into the target temperature
    pub external_temperature: Option<Identifier>,
    /// Text sensor mirrored into the fan mode
    pub external_fan_mode: Option<Identifier>,
    /// Text sensor mirrored into the swing mode
    pub external_swing_mode: Option<Identifier>,
    /// `on_turn_off` automations
    pub on_turn_off: Vec<Automation>,
}

impl Daikin312Climate {
    /// Validates a `climate` entry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] for the first invalid field.
    pub fn validate(
        path: &FieldPath,
        value: &toml::Value,
        target: &TargetCapabilities,
    ) -> Result<Self, ConfigError> {
        let raw: RawClimate = deserialize(path, value)?;

        Ok(Self {
            id: optional_id(path, "id", raw.id.as_deref())?,
            name: raw.name,
            pin: pin(&path.field("pin"), &raw.pin, PinRole::Output, target)?,
            sensor: optional_id(path, "sensor", raw.sensor.as_deref())?,
            external_mode: optional_id(path, "external_mode", raw.external_mode.as_deref())?,
            external_temperature: optional_id(
                path,
                "external_temperature",
                raw.external_temperature.as_deref(),
            )?,
            external_fan_mode: optional_id(path, "external_fan_mode", raw.external_fan_mode.as_deref())?,
            external_swing_mode: optional_id(
                path,
                "external_swing_mode",
                raw.external_swing_mode.as_deref(),
            )?,
            on_turn_off: TURN_OFF.automations(&path.field("on_turn_off"), &raw.on_turn_off)?,
        })
    }
}

impl Component for Daikin312Climate {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Daikin312Climate
    }

    fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    fn references(&self) -> Vec<Reference> {
        let optional = [
            ("sensor", &self.sensor, ComponentKind::Sensor, "set_sensor"),
            (
                "external_mode",
                &self.external_mode,
                ComponentKind::TextSensor,
                "set_external_mode_sensor",
            ),
            (
                "external_temperature",
                &self.external_temperature,
                ComponentKind::Sensor,
                "set_external_temperature_sensor",
            ),
            (
                "external_fan_mode",
                &self.external_fan_mode,
                ComponentKind::TextSensor,
                "set_external_fan_mode_sensor",
            ),
            (
                "external_swing_mode",
                &self.external_swing_mode,
                ComponentKind::TextSensor,
                "set_external_swing_mode_sensor",
            ),
        ];

        optional
            .into_iter()
            .filter_map(|(field, target, expected, setter)| {
                target
                    .as_ref()
                    .map(|target| Reference::to(field, target, expected, setter))
            })
            .collect()
    }

    fn automations(&self) -> &[Automation] {
        &self.on_turn_off
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
        for (name, value) in FLAGS {
            build.contribute(id, name, value, Precedence::RestrictiveOptimization);
        }
        build.declare_library(options.ir_library.clone())
    }

    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>) {
        ops.push(InitOp::construct(id, self.kind()));
        ops.push(InitOp::register(id, "register_component"));
        ops.push(InitOp::register(id, "register_climate"));
        if let Some(name) = &self.name {
            ops.push(InitOp::set(id, "set_name", name.as_str()));
        }
        ops.push(InitOp::set(id, "set_pin", self.pin.clone()));
    }
}

#[cfg(test)]
#[path = "climate_tests.rs"]
mod tests;
