// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use parley::config::{ProviderCredentials, Settings};
use tempfile::TempDir;

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert_eq!(settings.defaults.provider, "OpenAI");
    assert_eq!(settings.defaults.model, "gpt-4o-mini");
    assert!(settings.defaults.stream);
    assert!(settings.defaults.system_prompt.is_none());
}

#[test]
fn test_settings_api_key_priority() {
    // Custom env var name to avoid test pollution
    let var = "PARLEY_TEST_API_KEY_12345";
    let mut settings = Settings::default();
    settings.providers.insert(
        "OpenRouter".to_string(),
        ProviderCredentials {
            api_key: Some("config-key".to_string()),
            api_key_env: Some(var.to_string()),
        },
    );

    std::env::remove_var(var);
    assert_eq!(settings.api_key_for("OpenRouter"), Some("config-key".to_string()));

    std::env::set_var(var, "env-key");
    assert_eq!(settings.api_key_for("OpenRouter"), Some("env-key".to_string()));

    // Blank env values fall back to the file
    std::env::set_var(var, "  ");
    assert_eq!(settings.api_key_for("OpenRouter"), Some("config-key".to_string()));
    std::env::remove_var(var);
}

#[test]
fn test_settings_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");

    let mut settings = Settings::default();
    settings.defaults.provider = "OpenRouter Stream".to_string();
    settings.defaults.system_prompt = Some("Be brief.".to_string());
    settings.remember_api_key("OpenRouter Stream", "sk-or-1");
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded.defaults.provider, "OpenRouter Stream");
    assert_eq!(loaded.defaults.system_prompt.as_deref(), Some("Be brief."));
    assert_eq!(
        loaded.providers["OpenRouter Stream"].api_key.as_deref(),
        Some("sk-or-1")
    );
}

#[test]
fn test_settings_file_omits_unset_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    Settings::default().save_to(&path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("providers_file"));
    assert!(!raw.contains("system_prompt"));
}

#[test]
fn test_unknown_fields_are_ignored() {
    let settings: Settings = serde_json::from_str(
        r#"{"defaults": {"stream": false}, "context": {"max_warm_chunks": 100}}"#,
    )
    .unwrap();
    assert!(!settings.defaults.stream);
    assert_eq!(settings.defaults.provider, "OpenAI");
}
