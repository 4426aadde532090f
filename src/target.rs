//! Target chip families and what each of them can do.
//!
//! Every platform-dependent decision (valid GPIO numbers, input-only pins,
//! parallel LCD support, serial override for the IR library) is read from a
//! single [`TargetCapabilities`] descriptor instead of being scattered as
//! special cases through the component schemas.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Supported chip families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Espressif ESP32
    Esp32,
    /// Espressif ESP8266
    Esp8266,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Self; 2] = [Self::Esp32, Self::Esp8266];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Esp32 => "esp32",
            Self::Esp8266 => "esp8266",
        }
    }

    /// Returns the capability descriptor for this platform.
    #[must_use]
    pub const fn capabilities(self) -> &'static TargetCapabilities {
        match self {
            Self::Esp32 => &ESP32,
            Self::Esp8266 => &ESP8266,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a platform name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target platform '{0}': expected esp32 or esp8266")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// What a chip family supports, consulted once per component during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCapabilities {
    /// The platform this descriptor belongs to.
    pub platform: Platform,

    /// Highest valid GPIO number.
    pub max_gpio: u8,

    /// Pins that can only be used as inputs.
    pub input_only_pins: &'static [u8],

    /// Whether the chip has an i80 (8080-style) parallel LCD peripheral.
    pub parallel_lcd_bus: bool,

    /// Whether the IR library needs the framework serial port enabled.
    pub ir_library_needs_serial: bool,
}

/// ESP32 capabilities.
pub const ESP32: TargetCapabilities = TargetCapabilities {
    platform: Platform::Esp32,
    max_gpio: 39,
    input_only_pins: &[34, 35, 36, 37, 38, 39],
    parallel_lcd_bus: true,
    ir_library_needs_serial: false,
};

/// ESP8266 capabilities.
pub const ESP8266: TargetCapabilities = TargetCapabilities {
    platform: Platform::Esp8266,
    max_gpio: 17,
    input_only_pins: &[],
    parallel_lcd_bus: false,
    ir_library_needs_serial: true,
};

impl TargetCapabilities {
    /// Returns true if `number` is a GPIO that exists on this chip.
    #[must_use]
    pub const fn has_gpio(&self, number: u8) -> bool {
        number <= self.max_gpio
    }

    /// Returns true if `number` cannot drive an output.
    #[must_use]
    pub fn is_input_only(&self, number: u8) -> bool {
        self.input_only_pins.contains(&number)
    }
}
