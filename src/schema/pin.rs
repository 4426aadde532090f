//! Role-tagged GPIO pin assignments.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::target::TargetCapabilities;

use super::FieldPath;

/// Number of data lines of the 8-bit parallel (i80) bus.
pub const DATA_BUS_WIDTH: usize = 8;

static PIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:gpio)?(\d{1,2})$").expect("pin label pattern is valid"));

/// Electrical role of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinRole {
    /// Digital input
    Input,
    /// Push-pull output
    Output,
    /// Open-drain output
    OpenDrain,
}

impl PinRole {
    /// Returns true for roles that drive the line.
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Output | Self::OpenDrain)
    }

    /// Returns the pin mode constant used by the runtime.
    #[must_use]
    pub const fn mode(self) -> &'static str {
        match self {
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
            Self::OpenDrain => "OUTPUT_OPEN_DRAIN",
        }
    }
}

/// A validated pin assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinSpec {
    /// GPIO number
    pub number: u8,
    /// Electrical role
    pub role: PinRole,
    /// Whether the logic level is inverted
    pub inverted: bool,
    /// Position on an ordered bus (data line index)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl PinSpec {
    /// Creates a non-inverted pin with the given role.
    #[must_use]
    pub const fn new(number: u8, role: PinRole) -> Self {
        Self {
            number,
            role,
            inverted: false,
            position: None,
        }
    }

    /// Places this pin at `position` on an ordered bus.
    #[must_use]
    pub const fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for PinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.number)?;
        if self.inverted {
            f.write_str(" (inverted)")?;
        }
        Ok(())
    }
}

/// A pin number as written in the document: `16` or `"GPIO16"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PinLabel {
    /// Bare GPIO number
    Number(i64),
    /// `GPIOn` label (case-insensitive, prefix optional)
    Label(String),
}

/// Extended pin options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinOptions {
    /// GPIO number or label
    pub number: PinLabel,

    /// Invert the logic level
    #[serde(default)]
    pub inverted: bool,

    /// Pin mode: `input`, `output` or `open_drain`
    pub mode: Option<String>,
}

/// A pin field as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawPin {
    /// `pin = "GPIO4"` or `pin = 4`
    Simple(PinLabel),
    /// `pin = { number = "GPIO4", inverted = true }`
    Detailed(PinOptions),
}

impl From<&str> for RawPin {
    fn from(label: &str) -> Self {
        Self::Simple(PinLabel::Label(label.to_string()))
    }
}

/// Validates a pin field against the role its schema requires.
///
/// Output schemas accept `mode = "open_drain"`; input schemas only accept
/// `mode = "input"`.
///
/// # Errors
///
/// Returns a [`ConfigError::SchemaViolation`] if the label is malformed, the
/// GPIO does not exist on the target, or the role cannot be satisfied.
pub fn pin(
    path: &FieldPath,
    raw: &RawPin,
    role: PinRole,
    target: &TargetCapabilities,
) -> Result<PinSpec, ConfigError> {
    match raw {
        RawPin::Simple(label) => pin_label(path, label, role, target),
        RawPin::Detailed(options) => {
            let role = resolve_mode(path, options.mode.as_deref(), role)?;
            let mut spec = pin_label(path, &options.number, role, target)?;
            spec.inverted = options.inverted;
            Ok(spec)
        }
    }
}

/// Validates a bare pin label.
///
/// # Errors
///
/// See [`pin`].
pub fn pin_label(
    path: &FieldPath,
    label: &PinLabel,
    role: PinRole,
    target: &TargetCapabilities,
) -> Result<PinSpec, ConfigError> {
    let number = match label {
        PinLabel::Number(n) => u8::try_from(*n).ok(),
        PinLabel::Label(text) => PIN_LABEL
            .captures(text.trim())
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u8>().ok()),
    }
    .ok_or_else(|| ConfigError::violation(path, format!("invalid pin {}", describe(label))))?;

    if !target.has_gpio(number) {
        return Err(ConfigError::violation(
            path,
            format!(
                "GPIO{number} does not exist on {} (max GPIO{})",
                target.platform, target.max_gpio
            ),
        ));
    }

    if role.is_output() && target.is_input_only(number) {
        return Err(ConfigError::violation(
            path,
            format!("GPIO{number} is input-only on {} and cannot be used as an output", target.platform),
        ));
    }

    Ok(PinSpec::new(number, role))
}

/// Validates an ordered parallel data bus.
///
/// The bus must hold exactly [`DATA_BUS_WIDTH`] distinct output pins; each
/// pin is tagged with its position.
///
/// # Errors
///
/// Returns a [`ConfigError::SchemaViolation`] naming the expected and actual
/// pin count, or the first invalid/repeated pin.
pub fn data_bus(
    path: &FieldPath,
    raw: &[RawPin],
    target: &TargetCapabilities,
) -> Result<Vec<PinSpec>, ConfigError> {
    if raw.len() != DATA_BUS_WIDTH {
        return Err(ConfigError::violation(
            path,
            format!(
                "exactly {DATA_BUS_WIDTH} data pins required for 8-bit parallel mode, got {}",
                raw.len()
            ),
        ));
    }

    let mut seen = HashSet::new();
    raw.iter()
        .enumerate()
        .map(|(position, raw_pin)| {
            let pin_path = path.index(position);
            let spec = pin(&pin_path, raw_pin, PinRole::Output, target)?;
            if !seen.insert(spec.number) {
                return Err(ConfigError::violation(
                    pin_path,
                    format!("GPIO{} is used more than once on the data bus", spec.number),
                ));
            }
            Ok(spec.at(position))
        })
        .collect()
}

fn resolve_mode(path: &FieldPath, mode: Option<&str>, role: PinRole) -> Result<PinRole, ConfigError> {
    let Some(mode) = mode else {
        return Ok(role);
    };

    match (role, mode.trim().to_ascii_lowercase().as_str()) {
        (PinRole::Input, "input") => Ok(PinRole::Input),
        (PinRole::Output | PinRole::OpenDrain, "output") => Ok(PinRole::Output),
        (PinRole::Output | PinRole::OpenDrain, "open_drain") => Ok(PinRole::OpenDrain),
        (PinRole::Input, _) => Err(ConfigError::violation(
            path.field("mode"),
            format!("mode '{mode}' is not allowed for an input pin, expected: input"),
        )),
        (_, _) => Err(ConfigError::violation(
            path.field("mode"),
            format!("mode '{mode}' is not allowed for an output pin, expected: output, open_drain"),
        )),
    }
}

fn describe(label: &PinLabel) -> String {
    match label {
        PinLabel::Number(n) => n.to_string(),
        PinLabel::Label(text) => format!("'{text}'"),
    }
}
