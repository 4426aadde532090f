//! Human-readable time and frequency literals.
//!
//! Accepted time forms: `15ms`, `1s`, `2min`, `1h`, `500us`, `1.5s`. A time
//! always needs its unit. Accepted frequency forms: `12MHz`, `400kHz`,
//! `8000000Hz`, or a bare number meaning hertz. Units are matched ignoring case.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::config::ConfigError;

use super::FieldPath;

/// Longest accepted time period (24 hours).
pub const MAX_TIME_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(us|ms|s|sec|min|h)?$").expect("time pattern is valid")
});

static FREQUENCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(hz|khz|mhz|ghz)?$").expect("frequency pattern is valid")
});

/// A scalar literal as written in the document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// Bare integer
    Integer(i64),
    /// Bare floating point number
    Float(f64),
    /// Number with a unit suffix
    Text(String),
}

/// Parses a time period literal.
///
/// # Errors
///
/// Returns a [`ConfigError::SchemaViolation`] if the literal is malformed,
/// negative, or longer than [`MAX_TIME_PERIOD`].
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn time_period(path: &FieldPath, literal: &Literal) -> Result<Duration, ConfigError> {
    let micros = match literal {
        Literal::Integer(value) => return Err(missing_time_unit(path, &value.to_string())),
        Literal::Float(value) => return Err(missing_time_unit(path, &value.to_string())),
        Literal::Text(text) => {
            let (value, unit) = split_literal(&TIME_PATTERN, text.trim())
                .ok_or_else(|| ConfigError::violation(path, format!("invalid time period '{text}'")))?;
            let unit = unit.ok_or_else(|| missing_time_unit(path, text.trim()))?;
            value * time_unit_micros(&unit)
        }
    };

    if !micros.is_finite() || micros < 0.0 {
        return Err(ConfigError::violation(path, "time period must not be negative"));
    }

    if micros > MAX_TIME_PERIOD.as_micros() as f64 {
        return Err(ConfigError::violation(
            path,
            format!(
                "time period exceeds the maximum of {}h",
                MAX_TIME_PERIOD.as_secs() / 3600
            ),
        ));
    }

    Ok(Duration::from_micros(micros.round() as u64))
}

fn missing_time_unit(path: &FieldPath, value: &str) -> ConfigError {
    ConfigError::violation(
        path,
        format!("time period '{value}' has no unit; did you mean '{value}ms'?"),
    )
}

/// Converts a time period into a positive, whole number of milliseconds.
///
/// # Errors
///
/// Returns a [`ConfigError::SchemaViolation`] if the period is zero or not a
/// whole number of milliseconds.
pub fn positive_millis(path: &FieldPath, period: Duration) -> Result<u32, ConfigError> {
    if period.is_zero() {
        return Err(ConfigError::violation(path, "time period must be greater than 0"));
    }
    whole_millis(path, period)
}

/// Converts a time period into a whole number of milliseconds, zero included.
///
/// # Errors
///
/// Returns a [`ConfigError::SchemaViolation`] if the period is not a whole
/// number of milliseconds or does not fit in 32 bits.
pub fn whole_millis(path: &FieldPath, period: Duration) -> Result<u32, ConfigError> {
    if period.as_micros() % 1_000 != 0 {
        return Err(ConfigError::violation(
            path,
            "time period must be a whole number of milliseconds",
        ));
    }
    u32::try_from(period.as_millis())
        .map_err(|_| ConfigError::violation(path, "time period is too long"))
}

/// Parses a frequency literal into hertz.
///
/// # Errors
///
/// Returns a [`ConfigError::SchemaViolation`] if the literal is malformed,
/// zero, or does not fit in 32 bits.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn frequency_hz(path: &FieldPath, literal: &Literal) -> Result<u32, ConfigError> {
    let hz = match literal {
        Literal::Integer(hz) => *hz as f64,
        Literal::Float(hz) => *hz,
        Literal::Text(text) => {
            let (value, unit) = split_literal(&FREQUENCY_PATTERN, text.trim())
                .ok_or_else(|| ConfigError::violation(path, format!("invalid frequency '{text}'")))?;
            value * frequency_unit_hz(unit.as_deref())
        }
    };

    if !hz.is_finite() || hz <= 0.0 {
        return Err(ConfigError::violation(path, "frequency must be greater than 0"));
    }
    if hz > f64::from(u32::MAX) {
        return Err(ConfigError::violation(path, "frequency is too high"));
    }

    Ok(hz.round() as u32)
}

fn split_literal(pattern: &Regex, text: &str) -> Option<(f64, Option<String>)> {
    let captures = pattern.captures(text)?;
    let value = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = captures.get(2).map(|m| m.as_str().to_ascii_lowercase());
    Some((value, unit))
}

fn time_unit_micros(unit: &str) -> f64 {
    match unit {
        "us" => 1.0,
        "s" | "sec" => 1_000_000.0,
        "min" => 60_000_000.0,
        "h" => 3_600_000_000.0,
        // ms
        _ => 1_000.0,
    }
}

fn frequency_unit_hz(unit: Option<&str>) -> f64 {
    match unit {
        Some("khz") => 1e3,
        Some("mhz") => 1e6,
        Some("ghz") => 1e9,
        _ => 1.0,
    }
}
