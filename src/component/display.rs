//! ST7789 display on the ESP32's 8-bit parallel (i80) LCD bus.
//!
//! Validation runs in three steps: the user's fields are checked on their
//! own, then the board preset named by `model` fills whatever the user left
//! out (see [`crate::preset`]), and finally the merged record must contain
//! every field the bus needs.

use serde::Deserialize;

use crate::config::ConfigError;
use crate::emit::{Arg, InitOp};
use crate::preset;
use crate::registry::Identifier;
use crate::schema::{
    FieldPath, Literal, PinRole, PinSpec, RawPin, data_bus, frequency_hz, in_range, pin,
    positive_millis, time_period,
};
use crate::target::TargetCapabilities;

use super::{Component, ComponentKind, deserialize, optional_id};

/// Platform name in the `display` section.
pub const PLATFORM: &str = "st7789_i80";

/// Default pixel clock (12 MHz).
pub const DEFAULT_PCLK_FREQUENCY_HZ: u32 = 12_000_000;

/// Default redraw interval in milliseconds.
pub const DEFAULT_UPDATE_INTERVAL_MS: u32 = 1_000;

/// Largest accepted panel dimension.
pub const MAX_DIMENSION: i64 = 480;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDisplay {
    #[allow(dead_code)]
    platform: String,
    id: Option<String>,
    model: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
    offset_width: Option<i64>,
    offset_height: Option<i64>,
    data_pins: Option<Vec<RawPin>>,
    dc_pin: Option<RawPin>,
    wr_pin: Option<RawPin>,
    cs_pin: Option<RawPin>,
    rd_pin: Option<RawPin>,
    reset_pin: Option<RawPin>,
    backlight_pin: Option<RawPin>,
    invert_colors: Option<bool>,
    pclk_frequency: Option<Literal>,
    transform: Option<Transform>,
    rotation: Option<i64>,
    update_interval: Option<Literal>,
    lambda: Option<String>,
}

/// Panel orientation flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transform {
    /// Exchange the X and Y axes
    #[serde(default)]
    pub swap_xy: bool,
    /// Mirror along the X axis
    #[serde(default)]
    pub mirror_x: bool,
    /// Mirror along the Y axis
    #[serde(default)]
    pub mirror_y: bool,
}

/// Display settings before the preset merge.
///
/// Fields a preset can supply stay optional until [`DisplayConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Canonical model name
    pub model: String,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub offset_width: Option<i16>,
    pub offset_height: Option<i16>,
    /// Data bus, D0 first
    pub data_pins: Option<Vec<PinSpec>>,
    pub dc_pin: Option<PinSpec>,
    pub wr_pin: Option<PinSpec>,
    pub cs_pin: Option<PinSpec>,
    pub rd_pin: Option<PinSpec>,
    pub reset_pin: Option<PinSpec>,
    pub backlight_pin: Option<PinSpec>,
    pub invert_colors: Option<bool>,
    pub pclk_frequency_hz: u32,
    pub transform: Option<Transform>,
    /// Rotation in degrees
    pub rotation: Option<u16>,
    pub update_interval_ms: u32,
}

impl DisplayConfig {
    fn parse(path: &FieldPath, raw: &RawDisplay, target: &TargetCapabilities) -> Result<Self, ConfigError> {
        let output = |field: &str, raw: Option<&RawPin>| {
            raw.map(|raw| pin(&path.field(field), raw, PinRole::Output, target))
                .transpose()
        };

        let rotation = raw
            .rotation
            .map(|degrees| match degrees {
                0 | 90 | 180 | 270 => u16::try_from(degrees)
                    .map_err(|_| ConfigError::violation(path.field("rotation"), "invalid rotation")),
                _ => Err(ConfigError::violation(
                    path.field("rotation"),
                    format!("rotation {degrees} is not supported, expected one of: 0, 90, 180, 270"),
                )),
            })
            .transpose()?;

        Ok(Self {
            model: raw
                .model
                .as_deref()
                .map_or_else(|| preset::CUSTOM_MODEL.to_string(), preset::normalize_model_name),
            width: dimension(path, "width", raw.width)?,
            height: dimension(path, "height", raw.height)?,
            offset_width: offset(path, "offset_width", raw.offset_width)?,
            offset_height: offset(path, "offset_height", raw.offset_height)?,
            data_pins: raw
                .data_pins
                .as_deref()
                .filter(|pins| !pins.is_empty())
                .map(|pins| data_bus(&path.field("data_pins"), pins, target))
                .transpose()?,
            dc_pin: output("dc_pin", raw.dc_pin.as_ref())?,
            wr_pin: output("wr_pin", raw.wr_pin.as_ref())?,
            cs_pin: output("cs_pin", raw.cs_pin.as_ref())?,
            rd_pin: output("rd_pin", raw.rd_pin.as_ref())?,
            reset_pin: output("reset_pin", raw.reset_pin.as_ref())?,
            backlight_pin: output("backlight_pin", raw.backlight_pin.as_ref())?,
            invert_colors: raw.invert_colors,
            pclk_frequency_hz: raw
                .pclk_frequency
                .as_ref()
                .map_or(Ok(DEFAULT_PCLK_FREQUENCY_HZ), |f| {
                    frequency_hz(&path.field("pclk_frequency"), f)
                })?,
            transform: raw.transform,
            rotation,
            update_interval_ms: match &raw.update_interval {
                Some(literal) => {
                    let path = path.field("update_interval");
                    positive_millis(&path, time_period(&path, literal)?)?
                }
                None => DEFAULT_UPDATE_INTERVAL_MS,
            },
        })
    }

    /// Checks that every field the bus needs is present after the merge.
    ///
    /// `label` names the instance in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] for the first absent
    /// field among `width`, `height`, `data_pins`, `dc_pin` and `wr_pin`.
    pub fn resolve(self, label: &str) -> Result<ResolvedDisplay, ConfigError> {
        let missing = |field: &'static str| ConfigError::MissingRequiredField {
            component: ComponentKind::St7789I80,
            id: label.to_string(),
            field,
        };

        Ok(ResolvedDisplay {
            width: self.width.ok_or_else(|| missing("width"))?,
            height: self.height.ok_or_else(|| missing("height"))?,
            data_pins: self.data_pins.ok_or_else(|| missing("data_pins"))?,
            dc_pin: self.dc_pin.ok_or_else(|| missing("dc_pin"))?,
            wr_pin: self.wr_pin.ok_or_else(|| missing("wr_pin"))?,
            model: self.model,
            offset_width: self.offset_width.unwrap_or(0),
            offset_height: self.offset_height.unwrap_or(0),
            cs_pin: self.cs_pin,
            rd_pin: self.rd_pin,
            reset_pin: self.reset_pin,
            backlight_pin: self.backlight_pin,
            invert_colors: self.invert_colors.unwrap_or(false),
            pclk_frequency_hz: self.pclk_frequency_hz,
            transform: self.transform,
            rotation: self.rotation,
            update_interval_ms: self.update_interval_ms,
        })
    }
}

fn dimension(path: &FieldPath, field: &str, value: Option<i64>) -> Result<Option<u16>, ConfigError> {
    value
        .map(|v| {
            let v = in_range(&path.field(field), v, 1, MAX_DIMENSION)?;
            u16::try_from(v).map_err(|_| ConfigError::violation(path.field(field), "dimension out of range"))
        })
        .transpose()
}

fn offset(path: &FieldPath, field: &str, value: Option<i64>) -> Result<Option<i16>, ConfigError> {
    value
        .map(|v| {
            i16::try_from(v).map_err(|_| {
                ConfigError::violation(path.field(field), format!("offset {v} does not fit in 16 bits"))
            })
        })
        .transpose()
}

/// Display settings after the preset merge, with every required field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDisplay {
    pub model: String,
    pub width: u16,
    pub height: u16,
    pub offset_width: i16,
    pub offset_height: i16,
    pub data_pins: Vec<PinSpec>,
    pub dc_pin: PinSpec,
    pub wr_pin: PinSpec,
    pub cs_pin: Option<PinSpec>,
    pub rd_pin: Option<PinSpec>,
    pub reset_pin: Option<PinSpec>,
    pub backlight_pin: Option<PinSpec>,
    pub invert_colors: bool,
    pub pclk_frequency_hz: u32,
    pub transform: Option<Transform>,
    pub rotation: Option<u16>,
    pub update_interval_ms: u32,
}

/// A validated `st7789_i80` display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct St7789I80 {
    /// Identifier written by the user
    pub id: Option<Identifier>,
    /// Merged settings
    pub display: ResolvedDisplay,
    /// Body of the drawing callback, called with the display as `it`
    pub lambda: Option<String>,
}

impl St7789I80 {
    /// Validates a `display` entry and resolves its model preset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedTarget`] if the target has no
    /// parallel LCD bus, a [`ConfigError::SchemaViolation`] for an invalid
    /// field, or [`ConfigError::MissingRequiredField`] if a required field is
    /// absent from both the entry and the preset.
    pub fn validate(
        path: &FieldPath,
        value: &toml::Value,
        target: &TargetCapabilities,
    ) -> Result<Self, ConfigError> {
        if !target.parallel_lcd_bus {
            return Err(ConfigError::UnsupportedTarget {
                component: ComponentKind::St7789I80,
                target: target.platform,
            });
        }

        let raw: RawDisplay = deserialize(path, value)?;
        let id = optional_id(path, "id", raw.id.as_deref())?;
        let config = DisplayConfig::parse(path, &raw, target)?;

        let model = preset::lookup(&config.model);
        tracing::debug!("{path}: applying {} preset", model.name);
        let merged = preset::apply(config, model, path, target)?;

        let label = id.as_ref().map_or_else(|| path.to_string(), ToString::to_string);
        Ok(Self {
            display: merged.resolve(&label)?,
            lambda: raw.lambda.filter(|body| !body.trim().is_empty()),
            id,
        })
    }
}

impl Component for St7789I80 {
    fn kind(&self) -> ComponentKind {
        ComponentKind::St7789I80
    }

    fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    fn emit(&self, id: &Identifier, ops: &mut Vec<InitOp>) {
        let display = &self.display;

        ops.push(InitOp::construct(id, self.kind()));
        ops.push(InitOp::register(id, "register_component"));
        ops.push(InitOp::set(id, "set_update_interval", display.update_interval_ms));
        if let Some(degrees) = display.rotation {
            ops.push(InitOp::set(
                id,
                "set_rotation",
                Arg::Const(format!("display::DISPLAY_ROTATION_{degrees}_DEGREES")),
            ));
        }
        ops.push(InitOp::set_args(id, "set_dimensions", vec![display.width.into(), display.height.into()]));
        ops.push(InitOp::set_args(
            id,
            "set_offsets",
            vec![display.offset_width.into(), display.offset_height.into()],
        ));

        for (position, data_pin) in display.data_pins.iter().enumerate() {
            let position = u8::try_from(position).unwrap_or(u8::MAX);
            ops.push(InitOp::set_args(id, "add_data_pin", vec![data_pin.clone().into(), position.into()]));
        }

        let pins = [
            ("set_dc_pin", Some(&display.dc_pin)),
            ("set_wr_pin", Some(&display.wr_pin)),
            ("set_cs_pin", display.cs_pin.as_ref()),
            ("set_rd_pin", display.rd_pin.as_ref()),
            ("set_reset_pin", display.reset_pin.as_ref()),
            ("set_backlight_pin", display.backlight_pin.as_ref()),
        ];
        for (method, assigned) in pins {
            if let Some(assigned) = assigned {
                ops.push(InitOp::set(id, method, assigned.clone()));
            }
        }

        ops.push(InitOp::set(id, "set_invert_colors", display.invert_colors));
        ops.push(InitOp::set(id, "set_pclk_frequency", display.pclk_frequency_hz));

        if let Some(transform) = display.transform {
            ops.push(InitOp::set(id, "set_swap_xy", transform.swap_xy));
            ops.push(InitOp::set(id, "set_mirror_x", transform.mirror_x));
            ops.push(InitOp::set(id, "set_mirror_y", transform.mirror_y));
        }

        if let Some(body) = &self.lambda {
            ops.push(InitOp::set(id, "set_writer", Arg::Const(writer(body))));
        }
    }
}

fn writer(body: &str) -> String {
    format!("[=](display::Display &it) {{ {} }}", body.trim())
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
