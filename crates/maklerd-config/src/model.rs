// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Maklerd.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Maklerd configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; only the provider API key has no usable default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MaklerdConfig {
    /// Agent identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Hosted assistant-platform settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Intent-router settings.
    #[serde(default)]
    pub intent: IntentConfig,

    /// Document upload settings.
    #[serde(default)]
    pub uploads: UploadConfig,

    /// Local data file settings.
    #[serde(default)]
    pub data: DataConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// System instructions for the hosted assistant.
    #[serde(default = "default_instructions")]
    pub instructions: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            instructions: default_instructions(),
        }
    }
}

fn default_agent_name() -> String {
    "maklerd".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_instructions() -> String {
    "You are an expert performance advisor helping an account manager manage \
     the performance of his insurance broker accounts. Use your knowledge \
     base to answer questions and refer to the sources you used in your \
     response. Give your answers in German."
        .to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Hosted assistant-platform configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key. Usually supplied via `MAKLERD_PROVIDER_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model identifier used by the intent router.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature for the assistant.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum retry attempts for transient provider errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

/// Intent-router configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IntentConfig {
    /// Minimum cosine similarity a reference intent must STRICTLY exceed
    /// to be selected.
    #[serde(default = "default_intent_threshold")]
    pub threshold: f32,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            threshold: default_intent_threshold(),
        }
    }
}

fn default_intent_threshold() -> f32 {
    0.85
}

/// Document upload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UploadConfig {
    /// Directory uploaded documents are written to.
    #[serde(default = "default_upload_dir")]
    pub dir: String,

    /// Lowercase file extensions accepted for upload.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_upload_dir() -> String {
    "uploads/docs".to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    ["txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx", "xlsx", "csv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Local data file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// CSV with per-broker target and KPI columns for the target/actual report.
    #[serde(default = "default_performance_csv")]
    pub performance_csv: String,

    /// CSV with per-broker portfolio and new-business figures for the
    /// productive-broker classification.
    #[serde(default = "default_productivity_csv")]
    pub productivity_csv: String,

    /// Knowledge-base files uploaded into the assistant's vector store at
    /// startup, relative to the upload directory.
    #[serde(default)]
    pub knowledge_files: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            performance_csv: default_performance_csv(),
            productivity_csv: default_productivity_csv(),
            knowledge_files: Vec::new(),
        }
    }
}

fn default_performance_csv() -> String {
    "uploads/docs/maklervertrieb_zahlen.csv".to_string()
}

fn default_productivity_csv() -> String {
    "uploads/docs/makler_produktivitaet.csv".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_complete() {
        let config = MaklerdConfig::default();
        assert_eq!(config.agent.name, "maklerd");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert!(config.provider.api_key.is_none());
        assert!((config.intent.threshold - 0.85).abs() < f32::EPSILON);
        assert!(config.uploads.allowed_extensions.contains(&"pdf".into()));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = MaklerdConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let back: MaklerdConfig = toml::from_str(&toml).unwrap();
        assert_eq!(back.agent.name, config.agent.name);
        assert_eq!(back.provider.base_url, config.provider.base_url);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
            [agent]
            name = "maklerd"
            surprise = true
        "#;
        let result: Result<MaklerdConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
