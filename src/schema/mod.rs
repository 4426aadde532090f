//! Field-level validation primitives shared by the component schemas.
//!
//! This module provides:
//! - Field paths for error reporting ([`FieldPath`])
//! - Case-insensitive enumerated vocabularies ([`Token`])
//! - Human time and frequency literals ([`Literal`], [`time_period`], [`frequency_hz`])
//! - Role-tagged pin assignments ([`PinSpec`], [`RawPin`], [`pin`], [`data_bus`])
//! - Numeric range checks ([`in_range`])
//!
//! Component schemas combine these into typed records; serde handles the
//! structural part (field names, basic types, unknown fields) and these
//! helpers enforce the value-level constraints.

mod pin;
mod token;
mod units;

#[cfg(test)]
mod units_tests;

use std::fmt;

use crate::config::ConfigError;

pub use pin::{DATA_BUS_WIDTH, PinLabel, PinRole, PinSpec, RawPin, data_bus, pin, pin_label};
pub use token::Token;
pub use units::{Literal, MAX_TIME_PERIOD, frequency_hz, positive_millis, time_period, whole_millis};

/// Dotted path to a value inside the configuration document.
///
/// Rendered as `section[index].field.subfield`, e.g. `display[0].data_pins[3]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    /// Path to the `index`-th entry of a top-level section.
    #[must_use]
    pub fn entry(section: &str, index: usize) -> Self {
        Self(format!("{section}[{index}]"))
    }

    /// Path to a top-level section that holds a single table.
    #[must_use]
    pub fn section(section: &str) -> Self {
        Self(section.to_string())
    }

    /// Path to a named field below this path.
    #[must_use]
    pub fn field(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    /// Path to a list element below this path.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks that `value` lies within `min..=max`.
///
/// # Errors
///
/// Returns a [`ConfigError::SchemaViolation`] naming the allowed range.
pub fn in_range<T>(path: &FieldPath, value: T, min: T, max: T) -> Result<T, ConfigError>
where
    T: PartialOrd + fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(ConfigError::violation(
            path,
            format!("value {value} is out of range, expected {min}..={max}"),
        ));
    }
    Ok(value)
}
