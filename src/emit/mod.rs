//! Code emission.
//!
//! Turns linked components into a [`BuildPlan`]: the ordered initialization
//! operations, the finalized build flags and the library declaration. The
//! plan is rendered to artifacts by [`render`] and written by [`write_plan`].

mod emitter;
mod error;
mod op;
mod render;

#[cfg(test)]
mod render_tests;

use serde::Serialize;

use crate::build_context::{BuildFlag, LibraryDeclaration};
use crate::component::{Action, TriggerSet};
use crate::registry::Identifier;
use crate::target::Platform;

pub use emitter::Emitter;
pub use error::RenderError;
pub use op::{Arg, InitOp};
pub use render::{
    Artifact, BUILD_FLAGS_FILE, OutputFormat, PLAN_FILE, SETUP_FILE, SETUP_TEMPLATE, render,
    render_build_flags, render_json, render_setup, write_plan,
};

/// Everything the firmware build needs, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildPlan {
    /// Target chip family
    pub target: Platform,
    /// Initialization operations in dependency order
    pub operations: Vec<InitOp>,
    /// Finalized preprocessor flags, sorted by name
    pub build_flags: Vec<BuildFlag>,
    /// External libraries
    pub libraries: Vec<LibraryDeclaration>,
    /// Whether the serial port must stay enabled for the IR library
    pub serial_override: bool,
    /// Installed triggers in registration order
    pub triggers: TriggerSet,
}

impl BuildPlan {
    /// Renders every operation as a statement, one line each.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        self.operations
            .iter()
            .flat_map(|op| op.to_string().lines().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    /// Returns the actions run when `event` of `owner` fires, in order.
    #[must_use]
    pub fn fire(&self, owner: &Identifier, event: &str) -> Vec<&Action> {
        let mut fired = Vec::new();
        self.triggers.fire(owner, event, |_, action| fired.push(action));
        fired
    }

    /// Returns the winning value of a build flag.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.build_flags
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}
