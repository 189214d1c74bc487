// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::report::NumberLocale;
use crate::snapshot::{LoadError, SnapshotNames, SnapshotSource};
use crate::view::{RenderOptions, ViewParameters};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightmapConfig {
    /// Directory holding the JSON snapshots. Ignored when `base_url` is set.
    pub data_dir: PathBuf,
    pub base_url: Option<String>,
    pub files: SnapshotNames,
    /// Length of the top airports/countries/routes tables
    pub top_n: usize,
    pub locale: NumberLocale,
    pub view: ViewParameters,
    pub render: RenderOptions,
}

impl Default for FlightmapConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("docs/data"),
            base_url: None,
            files: SnapshotNames::default(),
            top_n: 50,
            locale: NumberLocale::default(),
            view: ViewParameters::default(),
            render: RenderOptions::default(),
        }
    }
}

impl FlightmapConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .view
            .validate()
            .with_context(|| format!("Invalid view parameters in {}", path.display()))?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content + "\n").context("Failed to write config")
    }

    pub fn source(&self) -> Result<SnapshotSource, LoadError> {
        match &self.base_url {
            Some(url) => SnapshotSource::http(url),
            None => Ok(SnapshotSource::directory(&self.data_dir)),
        }
    }
}
