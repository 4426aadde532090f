//! External sensors.
//!
//! Sensors and text sensors from other platforms (usually mirrored from
//! Home Assistant) are only declared here so the climate controller can
//! reference them. Their own configuration belongs to their platform and
//! passes through untouched.

use serde::Deserialize;

use crate::config::ConfigError;
use crate::emit::InitOp;
use crate::registry::Identifier;
use crate::schema::FieldPath;

use super::{Component, ComponentKind, deserialize, optional_id};

#[derive(Debug, Deserialize)]
struct RawExternalSensor {
    platform: String,
    id: Option<String>,
    name: Option<String>,
    entity_id: Option<String>,
}

/// A sensor or text sensor owned by another platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSensor {
    /// `Sensor` or `TextSensor`
    pub kind: ComponentKind,
    /// Platform providing the sensor
    pub platform: String,
    /// Identifier written by the user
    pub id: Option<Identifier>,
    /// Display name
    pub name: Option<String>,
    /// Mirrored Home Assistant entity
    pub entity_id: Option<String>,
}

impl ExternalSensor {
    /// Validates a `sensor` or `text_sensor` entry of another platform.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] if the identifier is invalid.
    pub fn validate(
        path: &FieldPath,
        value: &toml::Value,
        kind: ComponentKind,
    ) -> Result<Self, ConfigError> {
        let raw: RawExternalSensor = deserialize(path, value)?;
        Ok(Self {
            kind,
            platform: raw.platform,
            id: optional_id(path, "id", raw.id.as_deref())?,
            name: raw.name,
            entity_id: raw.entity_id,
        })
    }
}

impl Component for ExternalSensor {
    fn kind(&self) -> ComponentKind {
        self.kind
    }

    fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>) {
        let registry = if self.kind == ComponentKind::TextSensor {
            "register_text_sensor"
        } else {
            "register_sensor"
        };

        ops.push(InitOp::construct(id, self.kind));
        ops.push(InitOp::register(id, registry));
        if let Some(name) = &self.name {
            ops.push(InitOp::set(id, "set_name", name.as_str()));
        }
        if let Some(entity_id) = &self.entity_id {
            ops.push(InitOp::set(id, "set_entity_id", entity_id.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(toml_str: &str, kind: ComponentKind) -> Result<ExternalSensor, ConfigError> {
        let value: toml::Value = toml::from_str(toml_str).unwrap();
        ExternalSensor::validate(&FieldPath::entry("sensor", 0), &value, kind)
    }

    #[test]
    fn other_platform_fields_pass_through() {
        let sensor = validate(
            r#"
            platform = "homeassistant"
            id = "room_temp"
            entity_id = "sensor.living_room"
            unit_of_measurement = "°C"
            "#,
            ComponentKind::Sensor,
        )
        .unwrap();

        assert_eq!(sensor.platform, "homeassistant");
        assert_eq!(sensor.id.as_ref().map(Identifier::as_str), Some("room_temp"));
        assert_eq!(sensor.entity_id.as_deref(), Some("sensor.living_room"));
    }

    #[test]
    fn invalid_id_is_rejected() {
        let err = validate(
            r#"
            platform = "homeassistant"
            id = "room-temp"
            "#,
            ComponentKind::TextSensor,
        )
        .unwrap_err();

        assert!(err.to_string().starts_with("sensor[0].id"));
    }

    #[test]
    fn text_sensor_registers_as_text_sensor() {
        let sensor = validate(r#"platform = "homeassistant""#, ComponentKind::TextSensor).unwrap();
        let id = Identifier::parse(&FieldPath::section("t"), "mode").unwrap();

        let mut ops = Vec::new();
        sensor.emit(&id, &mut ops);
        assert_eq!(ops[1].to_string(), "App.register_text_sensor(mode);");
    }
}
