//! Configuration document parsing.
//!
//! The document is a TOML file whose `[target]` and `[build]` sections hold
//! settings and whose every other top-level key is a component section.
//! A component section is either one table or an array of tables. Entries
//! are visited in the order their headers appear in the text, which is the
//! order the identifier linker relies on.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;
use crate::emit::OutputFormat;
use crate::schema::FieldPath;

/// `[target]` section.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSection {
    /// Chip family: "esp32" or "esp8266"
    pub platform: Option<String>,
}

/// `[build]` section.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Artifact directory
    pub output_dir: Option<String>,

    /// Artifact format: "cpp" or "json"
    pub format: Option<OutputFormat>,

    /// Source of the IR library, `url#ref`
    pub ir_library: Option<String>,
}

/// One component entry of the document.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// Section name, e.g. `climate`
    pub section: &'a str,
    /// Path used in error messages
    pub path: &'a FieldPath,
    /// Raw entry table
    pub value: &'a toml::Value,
}

#[derive(Debug)]
struct Located {
    offset: usize,
    section: String,
    path: FieldPath,
    value: toml::Value,
}

/// A parsed configuration document.
#[derive(Debug, Default)]
pub struct Document {
    /// Target settings
    pub target: TargetSection,
    /// Build settings
    pub build: BuildSection,
    entries: Vec<Located>,
}

impl Document {
    /// Loads a document from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses a document from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlParse`] if the TOML is invalid or a
    /// settings section is malformed, and [`ConfigError::SchemaViolation`]
    /// if a component section is neither a table nor an array of tables.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;
        let offsets = entry_offsets(content)?;
        let mut document = Self::default();

        for (name, value) in table {
            match name.as_str() {
                "target" => document.target = value.try_into()?,
                "build" => document.build = value.try_into()?,
                _ => {
                    let starts = offsets.get(&name).map_or(&[][..], Vec::as_slice);
                    document.entries.extend(section_entries(name, value, starts)?);
                }
            }
        }

        // An array of tables may be reopened after another section.
        document.entries.sort_by_key(|entry| entry.offset);
        Ok(document)
    }

    /// Iterates over component entries in the order they appear in the text.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.entries.iter().map(|entry| Entry {
            section: &entry.section,
            path: &entry.path,
            value: &entry.value,
        })
    }

    /// Returns the number of component entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the document has no component entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Byte offset of every top-level entry's header, keyed by section.
fn entry_offsets(content: &str) -> Result<HashMap<String, Vec<usize>>, ConfigError> {
    let document = toml::de::DeTable::parse(content)?;

    Ok(document
        .get_ref()
        .iter()
        .map(|(key, value)| {
            let starts = match value.get_ref() {
                toml::de::DeValue::Array(items) => items.iter().map(|item| item.span().start).collect(),
                _ => vec![value.span().start],
            };
            (key.get_ref().to_string(), starts)
        })
        .collect())
}

fn section_entries(
    name: String,
    value: toml::Value,
    starts: &[usize],
) -> Result<Vec<Located>, ConfigError> {
    let offset = |i: usize| starts.get(i).copied().unwrap_or(usize::MAX);

    match value {
        toml::Value::Table(_) => Ok(vec![Located {
            offset: offset(0),
            path: FieldPath::section(&name),
            section: name,
            value,
        }]),
        toml::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let path = FieldPath::entry(&name, i);
                if !item.is_table() {
                    return Err(ConfigError::violation(path, "expected a table"));
                }
                Ok(Located {
                    offset: offset(i),
                    section: name.clone(),
                    path,
                    value: item,
                })
            })
            .collect(),
        _ => Err(ConfigError::violation(
            &name,
            "expected a table or an array of tables",
        )),
    }
}

/// Generates a default configuration document with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# periphgen device configuration
#
# Every top-level section other than [target] and [build] declares
# components. Use [section] for one entry or [[section]] for several.
# Components may only reference components declared above them.

[target]
# Chip family: "esp32" or "esp8266" (can be overridden by --target)
platform = "esp32"

[build]
# Artifact directory (default: build)
# output_dir = "build"

# Artifact format: "cpp" (setup.cpp + build_flags.txt) or "json" (plan.json)
# format = "cpp"

# IR library source, "url#ref"
# ir_library = "https://github.com/carl09/IRremoteESP8266.git#daikin_312"

# Room temperature sensor used by the climate controller
# [[sensor]]
# platform = "homeassistant"
# id = "room_temperature"
# entity_id = "sensor.living_room_temperature"

# Daikin IR climate controller
# [[climate]]
# platform = "daikin_312"
# id = "living_room_ac"
# name = "Living Room AC"
# pin = "GPIO4"
# sensor = "room_temperature"

# Feature switch of the climate controller
# [[switch]]
# platform = "daikin_312"
# daikin_312_id = "living_room_ac"
# type = "purify"
# name = "Purifier"

# IR receiver debug hub and its diagnostics
# [irremote_debug]
# pin = "GPIO14"
#
# [[button]]
# platform = "irremote_debug"
# name = "Dump IR Signals"
#
# [[text_sensor]]
# platform = "irremote_debug"
# name = "Last IR Protocol"

# 8-bit parallel ST7789 display (ESP32 only)
# [[display]]
# platform = "st7789_i80"
# model = "ESP32_2432S022C"
"#
    .to_string()
}

/// Writes the default configuration template to `path`.
///
/// # Errors
///
/// Returns [`ConfigError::FileWrite`] if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, default_config_template()).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
