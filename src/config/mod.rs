//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level config struct, server identity, and loading
//! - [`listen`]: Network listener configuration
//! - [`limits`]: Per-session queue and frame size limits
//! - [`validation`]: Startup checks that report every problem at once

mod defaults;
mod limits;
mod listen;
mod types;
mod validation;

pub use limits::LimitsConfig;
pub use types::Config;
pub use validation::validate;
