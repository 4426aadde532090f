//! Board presets for the parallel-bus display.
//!
//! A preset names a board and supplies default dimensions, pin wiring and
//! color inversion for it. Presets only fill fields the user left out: an
//! explicitly written field always wins, and compound fields (the data bus)
//! are taken whole from one side, never merged element by element.

use crate::component::display::DisplayConfig;
use crate::config::ConfigError;
use crate::schema::{FieldPath, PinLabel, PinRole, RawPin, data_bus, pin_label};
use crate::target::TargetCapabilities;

/// Model name that selects no preset.
pub const CUSTOM_MODEL: &str = "CUSTOM";

/// Defaults supplied by a board preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelPreset {
    /// Canonical model name
    pub name: &'static str,
    /// Panel width
    pub width: Option<u16>,
    /// Panel height
    pub height: Option<u16>,
    /// Horizontal offset
    pub offset_width: Option<i16>,
    /// Vertical offset
    pub offset_height: Option<i16>,
    /// Data/command select
    pub dc_pin: Option<&'static str>,
    /// Write strobe
    pub wr_pin: Option<&'static str>,
    /// Chip select
    pub cs_pin: Option<&'static str>,
    /// Read strobe
    pub rd_pin: Option<&'static str>,
    /// Data bus, D0 first
    pub data_pins: Option<[&'static str; 8]>,
    /// Color inversion
    pub invert_colors: Option<bool>,
}

impl ModelPreset {
    const fn empty(name: &'static str) -> Self {
        Self {
            name,
            width: None,
            height: None,
            offset_width: None,
            offset_height: None,
            dc_pin: None,
            wr_pin: None,
            cs_pin: None,
            rd_pin: None,
            data_pins: None,
            invert_colors: None,
        }
    }
}

/// ESP32-2432S022C: 2.2" 240x320 panel on the 8-bit bus.
///
/// The backlight is left out so it can be driven by a PWM output instead.
pub const ESP32_2432S022C: ModelPreset = ModelPreset {
    name: "ESP32_2432S022C",
    width: Some(240),
    height: Some(320),
    offset_width: Some(0),
    offset_height: Some(0),
    dc_pin: Some("GPIO16"),
    wr_pin: Some("GPIO4"),
    cs_pin: Some("GPIO17"),
    rd_pin: Some("GPIO2"),
    data_pins: Some([
        "GPIO15", "GPIO13", "GPIO12", "GPIO14", "GPIO27", "GPIO25", "GPIO33", "GPIO32",
    ]),
    invert_colors: Some(true),
};

/// The model that supplies nothing.
pub const CUSTOM: ModelPreset = ModelPreset::empty(CUSTOM_MODEL);

/// Every known model.
pub const MODELS: &[ModelPreset] = &[ESP32_2432S022C, CUSTOM];

/// Canonicalizes a model name: upper case, spaces replaced by underscores.
#[must_use]
pub fn normalize_model_name(raw: &str) -> String {
    raw.trim().to_uppercase().replace(' ', "_")
}

/// Looks up a model by canonical name.
///
/// Unknown names fall back to [`CUSTOM`] with a warning.
#[must_use]
pub fn lookup(model: &str) -> &'static ModelPreset {
    MODELS.iter().find(|m| m.name == model).unwrap_or_else(|| {
        tracing::warn!("Unknown display model '{model}', using {CUSTOM_MODEL} (no preset defaults)");
        &CUSTOM
    })
}

/// Fills every field `config` leaves unset from `preset`.
///
/// Preset pins are validated against `target` exactly like user pins.
///
/// # Errors
///
/// Returns a [`ConfigError::SchemaViolation`] if a preset pin is not usable
/// on the target.
pub fn apply(
    mut config: DisplayConfig,
    preset: &ModelPreset,
    path: &FieldPath,
    target: &TargetCapabilities,
) -> Result<DisplayConfig, ConfigError> {
    config.width = config.width.or(preset.width);
    config.height = config.height.or(preset.height);
    config.offset_width = config.offset_width.or(preset.offset_width);
    config.offset_height = config.offset_height.or(preset.offset_height);
    config.invert_colors = config.invert_colors.or(preset.invert_colors);

    let control_pins = [
        ("dc_pin", &mut config.dc_pin, preset.dc_pin),
        ("wr_pin", &mut config.wr_pin, preset.wr_pin),
        ("cs_pin", &mut config.cs_pin, preset.cs_pin),
        ("rd_pin", &mut config.rd_pin, preset.rd_pin),
    ];
    for (field, slot, label) in control_pins {
        if let (true, Some(label)) = (slot.is_none(), label) {
            *slot = Some(pin_label(
                &path.field(field),
                &PinLabel::Label(label.to_string()),
                PinRole::Output,
                target,
            )?);
        }
    }

    if let (true, Some(labels)) = (config.data_pins.is_none(), preset.data_pins) {
        let raw: Vec<RawPin> = labels.into_iter().map(RawPin::from).collect();
        config.data_pins = Some(data_bus(&path.field("data_pins"), &raw, target)?);
    }

    Ok(config)
}

#[cfg(test)]
#[path = "preset_tests.rs"]
mod tests;
