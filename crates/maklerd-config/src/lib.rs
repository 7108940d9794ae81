// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Maklerd.
//!
//! Layered TOML configuration (system, user, local) merged with `MAKLERD_*`
//! environment variables, followed by semantic validation.

pub mod loader;
pub mod model;
pub mod validation;

use maklerd_core::MaklerError;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::MaklerdConfig;

/// Load from the standard hierarchy and validate in one step.
pub fn load_and_validate() -> Result<MaklerdConfig, MaklerError> {
    let config = load_config().map_err(|e| MaklerError::Config(e.to_string()))?;
    validation::validate(&config)?;
    Ok(config)
}
