//! Component kinds known to the registry.

use std::fmt;

use serde::Serialize;

/// Kind of a declared instance.
///
/// References name the kind they expect; the registry checks the declared
/// kind against it with [`ComponentKind::is_a`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// External numeric sensor
    Sensor,
    /// External text sensor
    TextSensor,
    /// Daikin 312-bit IR climate controller
    Daikin312Climate,
    /// Feature switch of the climate controller
    Daikin312Switch,
    /// Option select of the climate controller
    Daikin312Select,
    /// Numeric setting of the climate controller
    Daikin312Number,
    /// Turn-off automation trigger of the climate controller
    Daikin312TurnOffTrigger,
    /// IR receiver debug hub
    IrRemoteDebug,
    /// Dump button of the debug hub
    IrRemoteDumpButton,
    /// Decoded-protocol text sensor of the debug hub
    IrRemoteProtocolSensor,
    /// ST7789 display on the 8-bit parallel bus
    St7789I80,
}

impl ComponentKind {
    /// Returns true if an instance of this kind satisfies a reference to `expected`.
    ///
    /// Kinds match nominally, except that the debug hub's protocol sensor is
    /// also a text sensor.
    #[must_use]
    pub fn is_a(self, expected: Self) -> bool {
        self == expected || matches!((self, expected), (Self::IrRemoteProtocolSensor, Self::TextSensor))
    }

    /// Returns the runtime class constructed for this kind.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Sensor => "sensor::Sensor",
            Self::TextSensor | Self::IrRemoteProtocolSensor => "text_sensor::TextSensor",
            Self::Daikin312Climate => "daikin_312::Daikin312Climate",
            Self::Daikin312Switch => "daikin_312::Daikin312Switch",
            Self::Daikin312Select => "daikin_312::Daikin312Select",
            Self::Daikin312Number => "daikin_312::Daikin312Number",
            Self::Daikin312TurnOffTrigger => "daikin_312::Daikin312TurnOffTrigger",
            Self::IrRemoteDebug => "irremote_debug::IRremoteDebugComponent",
            Self::IrRemoteDumpButton => "irremote_debug::DumpButton",
            Self::St7789I80 => "st7789_i80::ST7789I80",
        }
    }

    /// Returns the prefix of generated identifiers for this kind.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::TextSensor => "text_sensor",
            Self::Daikin312Climate => "daikin312climate",
            Self::Daikin312Switch => "daikin312switch",
            Self::Daikin312Select => "daikin312select",
            Self::Daikin312Number => "daikin312number",
            Self::Daikin312TurnOffTrigger => "daikin312turnofftrigger",
            Self::IrRemoteDebug => "irremotedebugcomponent",
            Self::IrRemoteDumpButton => "dumpbutton",
            Self::IrRemoteProtocolSensor => "irremote_protocol",
            Self::St7789I80 => "st7789i80",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sensor => "sensor",
            Self::TextSensor => "text_sensor",
            Self::Daikin312Climate => "daikin_312 climate",
            Self::Daikin312Switch => "daikin_312 switch",
            Self::Daikin312Select => "daikin_312 select",
            Self::Daikin312Number => "daikin_312 number",
            Self::Daikin312TurnOffTrigger => "daikin_312 on_turn_off trigger",
            Self::IrRemoteDebug => "irremote_debug hub",
            Self::IrRemoteDumpButton => "irremote_debug button",
            Self::IrRemoteProtocolSensor => "irremote_debug text_sensor",
            Self::St7789I80 => "st7789_i80 display",
        };
        f.write_str(name)
    }
}
