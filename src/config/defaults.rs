//! Default values for configuration options.
//!
//! Centralized constants to avoid magic strings scattered across the codebase.

use std::path::PathBuf;

use crate::build_context::LibraryDeclaration;
use crate::config::ConfigError;

/// Default configuration document path.
pub const CONFIG_PATH: &str = "device.toml";

/// Default artifact directory.
pub const OUTPUT_DIR: &str = "build";

/// Name of the IR library used by the climate controller and the debug hub.
pub const IR_LIBRARY_NAME: &str = "IRremoteESP8266";

/// Source of the IR library: a fork carrying the Daikin 312 protocol.
pub const IR_LIBRARY_SOURCE: &str = "https://github.com/carl09/IRremoteESP8266.git#daikin_312";

/// Default artifact directory as a path.
#[must_use]
pub fn output_dir() -> PathBuf {
    PathBuf::from(OUTPUT_DIR)
}

/// Default IR library declaration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] only if [`IR_LIBRARY_SOURCE`] were malformed.
pub fn ir_library() -> Result<LibraryDeclaration, ConfigError> {
    LibraryDeclaration::from_source(IR_LIBRARY_NAME, IR_LIBRARY_SOURCE)
}
