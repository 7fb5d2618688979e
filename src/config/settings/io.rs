// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::Settings;

impl Settings {
    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        Self::parley_home().join("settings.json")
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from a specific path. A missing file gives defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save settings to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the parley home directory (~/.parley or $PARLEY_HOME).
    pub fn parley_home() -> PathBuf {
        if let Ok(home) = std::env::var("PARLEY_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".parley")
    }

    /// Get the log file path.
    pub fn log_path() -> PathBuf {
        Self::parley_home().join("logs").join("parley.log")
    }

    /// Providers file to load, relative paths resolved against the home dir.
    pub fn resolved_providers_file(&self) -> Option<PathBuf> {
        self.providers_file.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                Self::parley_home().join(path)
            }
        })
    }
}
