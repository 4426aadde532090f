//! Ordered initialization operations.

use std::fmt;

use serde::Serialize;

use crate::component::{Action, ComponentKind, cpp_string};
use crate::registry::Identifier;
use crate::schema::PinSpec;

/// Argument of a setter call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Arg {
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// String literal
    Str(String),
    /// Named runtime constant, rendered verbatim
    Const(String),
    /// GPIO pin
    Pin(PinSpec),
    /// List of string literals
    Options(Vec<String>),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(&cpp_string(s)),
            Self::Const(c) => f.write_str(c),
            Self::Pin(pin) => write!(
                f,
                "new GPIOPin({}, {}, {})",
                pin.number,
                pin.role.mode(),
                pin.inverted
            ),
            Self::Options(options) => {
                let quoted: Vec<_> = options.iter().map(|o| cpp_string(o)).collect();
                write!(f, "{{{}}}", quoted.join(", "))
            }
        }
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<PinSpec> for Arg {
    fn from(value: PinSpec) -> Self {
        Self::Pin(value)
    }
}

macro_rules! int_arg {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(value: $t) -> Self {
                Self::Int(i64::from(value))
            }
        })*
    };
}

int_arg!(u8, u16, u32, i16, i32);

/// One step of the generated setup routine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InitOp {
    /// Allocate an instance.
    Construct {
        /// Instance identifier
        id: Identifier,
        /// Runtime class
        class: &'static str,
    },
    /// Hand an instance to one of the application registries.
    Register {
        /// Instance identifier
        id: Identifier,
        /// Registry method, e.g. `register_climate`
        registry: &'static str,
    },
    /// Call a setter with literal arguments.
    Set {
        /// Instance identifier
        id: Identifier,
        /// Setter method
        method: &'static str,
        /// Arguments
        args: Vec<Arg>,
    },
    /// Call a setter with another instance.
    Link {
        /// Instance whose setter is called
        id: Identifier,
        /// Setter method
        method: &'static str,
        /// Instance passed to the setter
        target: Identifier,
    },
    /// Attach an action list to a trigger.
    Automation {
        /// Trigger instance
        trigger: Identifier,
        /// Actions in execution order
        actions: Vec<Action>,
    },
}

impl InitOp {
    /// Creates a `Construct` for an instance of `kind`.
    #[must_use]
    pub fn construct(id: &Identifier, kind: ComponentKind) -> Self {
        Self::Construct {
            id: id.clone(),
            class: kind.class_name(),
        }
    }

    /// Creates a `Register`.
    #[must_use]
    pub fn register(id: &Identifier, registry: &'static str) -> Self {
        Self::Register {
            id: id.clone(),
            registry,
        }
    }

    /// Creates a single-argument `Set`.
    #[must_use]
    pub fn set(id: &Identifier, method: &'static str, arg: impl Into<Arg>) -> Self {
        Self::Set {
            id: id.clone(),
            method,
            args: vec![arg.into()],
        }
    }

    /// Creates a multi-argument `Set`.
    #[must_use]
    pub fn set_args(id: &Identifier, method: &'static str, args: Vec<Arg>) -> Self {
        Self::Set {
            id: id.clone(),
            method,
            args,
        }
    }

    /// Returns the instance the operation acts on.
    #[must_use]
    pub const fn subject(&self) -> &Identifier {
        match self {
            Self::Construct { id, .. }
            | Self::Register { id, .. }
            | Self::Set { id, .. }
            | Self::Link { id, .. } => id,
            Self::Automation { trigger, .. } => trigger,
        }
    }
}

impl fmt::Display for InitOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Construct { id, class } => write!(f, "auto *{id} = new {class}();"),
            Self::Register { id, registry } => write!(f, "App.{registry}({id});"),
            Self::Set { id, method, args } => {
                let args: Vec<_> = args.iter().map(ToString::to_string).collect();
                write!(f, "{id}->{method}({});", args.join(", "))
            }
            Self::Link { id, method, target } => write!(f, "{id}->{method}({target});"),
            Self::Automation { trigger, actions } => {
                let actions: Vec<_> = actions.iter().map(Action::expression).collect();
                writeln!(f, "auto *{trigger}_automation = new Automation<>({trigger});")?;
                write!(f, "{trigger}_automation->add_actions({{{}}});", actions.join(", "))
            }
        }
    }
}
