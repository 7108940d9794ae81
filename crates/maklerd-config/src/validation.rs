// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic validation of a loaded configuration.
//!
//! Figment catches type and unknown-key errors; this module catches values
//! that parse fine but cannot work at runtime.

use maklerd_core::MaklerError;

use crate::model::MaklerdConfig;

/// Validate a loaded configuration, collecting every problem found.
pub fn validate(config: &MaklerdConfig) -> Result<(), MaklerError> {
    let mut problems = Vec::new();

    if !(0.0..=1.0).contains(&config.intent.threshold) {
        problems.push(format!(
            "intent.threshold must be within [0.0, 1.0], got {}",
            config.intent.threshold
        ));
    }

    if !(0.0..=2.0).contains(&config.provider.temperature) {
        problems.push(format!(
            "provider.temperature must be within [0.0, 2.0], got {}",
            config.provider.temperature
        ));
    }

    if config.provider.base_url.is_empty() {
        problems.push("provider.base_url must not be empty".to_string());
    }

    if config.uploads.allowed_extensions.is_empty() {
        problems.push("uploads.allowed_extensions must not be empty".to_string());
    }

    for ext in &config.uploads.allowed_extensions {
        if ext.contains('.') || ext.chars().any(|c| c.is_ascii_uppercase()) {
            problems.push(format!(
                "uploads.allowed_extensions entries must be lowercase without dots, got {ext:?}"
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(MaklerError::Config(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaklerdConfig;

    #[test]
    fn default_config_validates() {
        assert!(validate(&MaklerdConfig::default()).is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = MaklerdConfig::default();
        config.intent.threshold = 1.5;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("intent.threshold"));
    }

    #[test]
    fn malformed_extension_is_rejected() {
        let mut config = MaklerdConfig::default();
        config.uploads.allowed_extensions = vec![".PDF".to_string()];
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("allowed_extensions"));
    }

    #[test]
    fn multiple_problems_are_collected() {
        let mut config = MaklerdConfig::default();
        config.intent.threshold = -1.0;
        config.uploads.allowed_extensions.clear();
        let err = validate(&config).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("intent.threshold"));
        assert!(msg.contains("allowed_extensions"));
    }
}
