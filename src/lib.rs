//! periphgen: peripheral configuration generator
//!
//! A library for resolving declarative device documents (IR climate
//! control, IR debugging and parallel-bus displays) into a deterministic
//! build plan: ordered initialization statements, build flags and library
//! declarations for an embedded firmware build.

pub mod build_context;
pub mod component;
pub mod config;
pub mod emit;
pub mod pipeline;
pub mod preset;
pub mod registry;
pub mod schema;
pub mod target;
