//! Event automations: a trigger owned by a component and the ordered
//! actions it runs.
//!
//! Written in the document as a list of tables, each with an optional
//! trigger `id` and a `then` list of single-key action tables:
//!
//! ```toml
//! [[climate.on_turn_off]]
//! then = [
//!   { "logger.log" = "AC turned off" },
//!   { delay = "5s" },
//!   { "switch.turn_off" = "purifier" },
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::registry::Identifier;
use crate::schema::{FieldPath, Literal, Token, positive_millis, time_period};

use super::ComponentKind;

/// An automation as written in the document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAutomation {
    /// Trigger identifier
    pub id: Option<String>,

    /// Actions run when the trigger fires
    #[serde(default)]
    pub then: Vec<RawAction>,
}

/// An action as written in the document.
#[derive(Debug, Clone, Deserialize)]
pub enum RawAction {
    /// `{ "logger.log" = "text" }`
    #[serde(rename = "logger.log")]
    Log(RawLog),
    /// `{ delay = "5s" }`
    #[serde(rename = "delay")]
    Delay(Literal),
    /// `{ "switch.turn_on" = "id" }`
    #[serde(rename = "switch.turn_on")]
    SwitchTurnOn(String),
    /// `{ "switch.turn_off" = "id" }`
    #[serde(rename = "switch.turn_off")]
    SwitchTurnOff(String),
    /// `{ "button.press" = "id" }`
    #[serde(rename = "button.press")]
    ButtonPress(String),
    /// `{ "number.set" = { id = "id", value = 30 } }`
    #[serde(rename = "number.set")]
    NumberSet {
        /// Target number
        id: String,
        /// Value to set
        value: f64,
    },
    /// `{ "select.set" = { id = "id", option = "Dim" } }`
    #[serde(rename = "select.set")]
    SelectSet {
        /// Target select
        id: String,
        /// Option to select
        option: String,
    },
}

/// Log action body: a bare message or a message with a level.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLog {
    /// Message logged at debug level
    Message(String),
    /// Message with an explicit level
    Detailed {
        /// Message text
        format: String,
        /// Log level
        level: Option<String>,
    },
}

/// Severity of a log action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// `ESP_LOGE`
    Error,
    /// `ESP_LOGW`
    Warn,
    /// `ESP_LOGI`
    Info,
    /// `ESP_LOGD`
    Debug,
    /// `ESP_LOGV`
    Verbose,
}

impl Token for LogLevel {
    const ALL: &'static [Self] = &[
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Verbose,
    ];

    fn token(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Verbose => "verbose",
        }
    }
}

impl LogLevel {
    const fn macro_name(self) -> &'static str {
        match self {
            Self::Error => "ESP_LOGE",
            Self::Warn => "ESP_LOGW",
            Self::Info => "ESP_LOGI",
            Self::Debug => "ESP_LOGD",
            Self::Verbose => "ESP_LOGV",
        }
    }
}

/// A validated action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Write a message to the device log.
    Log {
        /// Message text
        message: String,
        /// Severity
        level: LogLevel,
    },
    /// Wait before running the next action.
    Delay {
        /// Delay in milliseconds
        millis: u32,
    },
    /// Turn a feature switch on.
    SwitchTurnOn {
        /// Target switch
        target: Identifier,
    },
    /// Turn a feature switch off.
    SwitchTurnOff {
        /// Target switch
        target: Identifier,
    },
    /// Press a button.
    ButtonPress {
        /// Target button
        target: Identifier,
    },
    /// Set a numeric setting.
    NumberSet {
        /// Target number
        target: Identifier,
        /// New value
        value: f64,
    },
    /// Pick an option of a select.
    SelectSet {
        /// Target select
        target: Identifier,
        /// Option text
        option: String,
    },
}

impl Action {
    /// Validates a raw action.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] for malformed identifiers,
    /// delays, levels or values.
    pub fn from_raw(path: &FieldPath, raw: &RawAction) -> Result<Self, ConfigError> {
        let action = match raw {
            RawAction::Log(RawLog::Message(message)) => Self::Log {
                message: message.clone(),
                level: LogLevel::Debug,
            },
            RawAction::Log(RawLog::Detailed { format, level }) => Self::Log {
                message: format.clone(),
                level: level
                    .as_deref()
                    .map(|l| LogLevel::parse_token(&path.field("level"), l))
                    .transpose()?
                    .unwrap_or(LogLevel::Debug),
            },
            RawAction::Delay(literal) => {
                let period = time_period(&path.field("delay"), literal)?;
                Self::Delay {
                    millis: positive_millis(&path.field("delay"), period)?,
                }
            }
            RawAction::SwitchTurnOn(id) => Self::SwitchTurnOn {
                target: Identifier::parse(path, id)?,
            },
            RawAction::SwitchTurnOff(id) => Self::SwitchTurnOff {
                target: Identifier::parse(path, id)?,
            },
            RawAction::ButtonPress(id) => Self::ButtonPress {
                target: Identifier::parse(path, id)?,
            },
            RawAction::NumberSet { id, value } => {
                if !value.is_finite() {
                    return Err(ConfigError::violation(path.field("value"), "value must be finite"));
                }
                Self::NumberSet {
                    target: Identifier::parse(&path.field("id"), id)?,
                    value: *value,
                }
            }
            RawAction::SelectSet { id, option } => {
                if option.trim().is_empty() {
                    return Err(ConfigError::violation(path.field("option"), "option must not be empty"));
                }
                Self::SelectSet {
                    target: Identifier::parse(&path.field("id"), id)?,
                    option: option.clone(),
                }
            }
        };
        Ok(action)
    }

    /// Returns the instance this action operates on and the kind it must have.
    #[must_use]
    pub fn target(&self) -> Option<(&Identifier, ComponentKind)> {
        match self {
            Self::Log { .. } | Self::Delay { .. } => None,
            Self::SwitchTurnOn { target } | Self::SwitchTurnOff { target } => {
                Some((target, ComponentKind::Daikin312Switch))
            }
            Self::ButtonPress { target } => Some((target, ComponentKind::IrRemoteDumpButton)),
            Self::NumberSet { target, .. } => Some((target, ComponentKind::Daikin312Number)),
            Self::SelectSet { target, .. } => Some((target, ComponentKind::Daikin312Select)),
        }
    }

    /// Renders the action as a runtime constructor expression.
    #[must_use]
    pub fn expression(&self) -> String {
        match self {
            Self::Log { message, level } => format!(
                "new LambdaAction<>([=]() -> void {{ {}(\"main\", \"%s\", {}); }})",
                level.macro_name(),
                cpp_string(message)
            ),
            Self::Delay { millis } => format!("new DelayAction<>({millis})"),
            Self::SwitchTurnOn { target } => format!("new switch_::TurnOnAction<>({target})"),
            Self::SwitchTurnOff { target } => format!("new switch_::TurnOffAction<>({target})"),
            Self::ButtonPress { target } => format!("new button::PressAction<>({target})"),
            Self::NumberSet { target, value } => {
                format!("new number::NumberSetAction<>({target}, {value:?})")
            }
            Self::SelectSet { target, option } => {
                format!("new select::SelectSetAction<>({target}, {})", cpp_string(option))
            }
        }
    }
}

/// Quotes `text` as a C++ string literal.
#[must_use]
pub fn cpp_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// A validated automation attached to an event of its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Automation {
    /// Event name, e.g. `on_turn_off`
    pub event: &'static str,
    /// Explicit trigger identifier
    pub trigger_id: Option<Identifier>,
    /// Kind of the trigger instance
    pub trigger_kind: ComponentKind,
    /// Owner method that installs the trigger
    pub setter: &'static str,
    /// Actions in execution order
    pub actions: Vec<Action>,
}

/// Event hook of a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHook {
    /// Event name
    pub event: &'static str,
    /// Kind of the trigger instance
    pub trigger_kind: ComponentKind,
    /// Owner method that installs the trigger
    pub setter: &'static str,
}

impl EventHook {
    /// Validates every automation listed for this event.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::SchemaViolation`] found.
    pub fn automations(
        self,
        path: &FieldPath,
        raw: &[RawAutomation],
    ) -> Result<Vec<Automation>, ConfigError> {
        raw.iter()
            .enumerate()
            .map(|(i, automation)| {
                let path = path.index(i);
                let trigger_id = automation
                    .id
                    .as_deref()
                    .map(|id| Identifier::parse(&path.field("id"), id))
                    .transpose()?;
                let actions = automation
                    .then
                    .iter()
                    .enumerate()
                    .map(|(j, action)| Action::from_raw(&path.field("then").index(j), action))
                    .collect::<Result<_, _>>()?;
                Ok(Automation {
                    event: self.event,
                    trigger_id,
                    trigger_kind: self.trigger_kind,
                    setter: self.setter,
                    actions,
                })
            })
            .collect()
    }
}

/// An installed trigger and the actions it runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerBinding {
    /// Owner of the event
    pub owner: Identifier,
    /// Event name
    pub event: &'static str,
    /// Trigger instance
    pub trigger: Identifier,
    /// Actions in execution order
    pub actions: Vec<Action>,
}

/// Triggers in registration order.
///
/// Firing an event runs every automation registered on it, in the order
/// the automations were registered, each one's actions in list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TriggerSet {
    bindings: Vec<TriggerBinding>,
}

impl TriggerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a trigger; later registrations run after earlier ones.
    pub fn register(&mut self, binding: TriggerBinding) {
        self.bindings.push(binding);
    }

    /// Runs `perform` for every action bound to `event` of `owner`.
    pub fn fire<'a>(
        &'a self,
        owner: &Identifier,
        event: &str,
        mut perform: impl FnMut(&'a Identifier, &'a Action),
    ) {
        for binding in self
            .bindings
            .iter()
            .filter(|b| &b.owner == owner && b.event == event)
        {
            for action in &binding.actions {
                perform(&binding.trigger, action);
            }
        }
    }

    /// Returns the number of registered triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no trigger is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over triggers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TriggerBinding> {
        self.bindings.iter()
    }
}

#[cfg(test)]
#[path = "automation_tests.rs"]
mod tests;
