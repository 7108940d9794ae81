// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./maklerd.toml` > `~/.config/maklerd/maklerd.toml`
//! > `/etc/maklerd/maklerd.toml` with environment variable overrides via the
//! `MAKLERD_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MaklerdConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/maklerd/maklerd.toml` (system-wide)
/// 3. `~/.config/maklerd/maklerd.toml` (user XDG config)
/// 4. `./maklerd.toml` (local directory)
/// 5. `MAKLERD_*` environment variables
pub fn load_config() -> Result<MaklerdConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MaklerdConfig::default()))
        .merge(Toml::file("/etc/maklerd/maklerd.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("maklerd/maklerd.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("maklerd.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<MaklerdConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MaklerdConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MaklerdConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MaklerdConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MAKLERD_PROVIDER_API_KEY` must map to
/// `provider.api_key`, not `provider.api.key`.
fn env_provider() -> Env {
    Env::prefixed("MAKLERD_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("server_", "server.", 1)
            .replacen("provider_", "provider.", 1)
            .replacen("intent_", "intent.", 1)
            .replacen("uploads_", "uploads.", 1)
            .replacen("data_", "data.", 1);
        mapped.into()
    })
}
